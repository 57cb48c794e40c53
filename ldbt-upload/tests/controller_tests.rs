//! Upload Form Controller Tests
//! Test File: controller_tests.rs
//!
//! Drives the controller against a counting mock transformation service.

mod helpers;

use helpers::{archive_of, controller_with, wait_until, MockApi, Scripted};
use ldbt_common::api::TransformationId;
use ldbt_upload::session::{EmailState, UploadState};
use ldbt_upload::validation::MAX_ARCHIVE_BYTES;
use ldbt_upload::{FormError, FormState, SubmitError};
use std::sync::Arc;
use tokio::sync::Notify;
use uuid::Uuid;

/// TC-CTL-001: Oversized archive never reaches the service
#[tokio::test]
async fn tc_ctl_001_oversized_archive_rejected_before_network() {
    // Given: fresh session
    let api = Arc::new(MockApi::new());
    let controller = controller_with(api.clone());
    let session = controller.open_session().await;

    // When: archive one byte over the limit is submitted
    let state = controller
        .submit_upload(session.id, Some(archive_of(MAX_ARCHIVE_BYTES as usize + 1)))
        .await
        .unwrap();

    // Then: FileTooLarge shown, no upload call made
    assert_eq!(api.upload_calls(), 0);
    assert!(matches!(
        state.error(),
        Some(FormError::FileTooLarge { .. })
    ));
    assert_eq!(
        state.error_message().as_deref(),
        Some("Maximum file size 15Mb")
    );
    assert!(state.shows_file_form());
}

/// TC-CTL-002: Archive at the limit is uploaded exactly once
#[tokio::test]
async fn tc_ctl_002_archive_within_limit_uploaded_once() {
    let api = Arc::new(MockApi::new());
    let controller = controller_with(api.clone());
    let session = controller.open_session().await;

    let state = controller
        .submit_upload(session.id, Some(archive_of(MAX_ARCHIVE_BYTES as usize)))
        .await
        .unwrap();

    assert_eq!(api.upload_calls(), 1);
    assert_eq!(api.uploaded_files(), vec!["lookml-project.zip".to_string()]);
    assert_eq!(state.upload_state(), UploadState::Uploaded);
}

/// TC-CTL-003: Missing selection is FileRequired
#[tokio::test]
async fn tc_ctl_003_missing_archive_required() {
    let api = Arc::new(MockApi::new());
    let controller = controller_with(api.clone());
    let session = controller.open_session().await;

    let state = controller.submit_upload(session.id, None).await.unwrap();

    assert_eq!(api.upload_calls(), 0);
    assert_eq!(state.error(), Some(&FormError::FileRequired));
}

/// TC-CTL-004: Successful upload moves to the email form
#[tokio::test]
async fn tc_ctl_004_upload_success_stores_transformation_id() {
    let api = Arc::new(MockApi::new());
    let controller = controller_with(api.clone());
    let session = controller.open_session().await;

    let state = controller
        .submit_upload(session.id, Some(archive_of(1024)))
        .await
        .unwrap();

    assert_eq!(
        state,
        FormState::Uploaded {
            transformation_id: TransformationId::parse("abc123").unwrap()
        }
    );
    assert!(!state.shows_file_form());
}

/// TC-CTL-005: Network failure surfaces verbatim and allows retry
#[tokio::test]
async fn tc_ctl_005_upload_network_error_then_retry() {
    // Given: service unreachable
    let api = Arc::new(MockApi::new());
    api.set_upload_response(Scripted::Network("Network Error".to_string()));
    let controller = controller_with(api.clone());
    let session = controller.open_session().await;

    // When: upload submitted
    let state = controller
        .submit_upload(session.id, Some(archive_of(1024)))
        .await
        .unwrap();

    // Then: message verbatim, file form still active, no automatic retry
    assert_eq!(state.error_message().as_deref(), Some("Network Error"));
    assert_eq!(state.upload_state(), UploadState::Failed);
    assert!(state.shows_file_form());
    assert_eq!(api.upload_calls(), 1);
    assert_eq!(controller.last_error().await.as_deref(), Some("Network Error"));

    // When: service recovers and the user resubmits
    api.set_upload_response(Scripted::Ok("retry-42".to_string()));
    let state = controller
        .submit_upload(session.id, Some(archive_of(1024)))
        .await
        .unwrap();

    // Then: second attempt succeeds
    assert_eq!(api.upload_calls(), 2);
    assert_eq!(
        state.transformation_id().map(|id| id.as_str()),
        Some("retry-42")
    );
}

/// TC-CTL-006: Server error uses the status message
#[tokio::test]
async fn tc_ctl_006_upload_server_error_message() {
    let api = Arc::new(MockApi::new());
    api.set_upload_response(Scripted::Status(500));
    let controller = controller_with(api.clone());
    let session = controller.open_session().await;

    let state = controller
        .submit_upload(session.id, Some(archive_of(10)))
        .await
        .unwrap();

    assert_eq!(
        state.error_message().as_deref(),
        Some("Request failed with status code 500")
    );
}

/// TC-CTL-007: Malformed emails never reach the service
#[tokio::test]
async fn tc_ctl_007_invalid_email_never_submitted() {
    let api = Arc::new(MockApi::new());
    let controller = controller_with(api.clone());
    let session = controller.open_session().await;
    controller
        .submit_upload(session.id, Some(archive_of(10)))
        .await
        .unwrap();

    for address in ["", "plainaddress", "a@b", "user@@example.com", "user@example"] {
        let state = controller.submit_email(session.id, address).await.unwrap();
        let expected = if address.is_empty() {
            FormError::EmailRequired
        } else {
            FormError::InvalidEmail
        };
        assert_eq!(state.error(), Some(&expected), "{}", address);
        assert_eq!(state.email_state(), EmailState::Failed);
        assert!(!state.shows_file_form());
    }

    assert_eq!(api.email_calls(), 0);
}

/// TC-CTL-008: Successful email is terminal
#[tokio::test]
async fn tc_ctl_008_email_success_is_terminal() {
    let api = Arc::new(MockApi::new());
    let controller = controller_with(api.clone());
    let session = controller.open_session().await;
    controller
        .submit_upload(session.id, Some(archive_of(10)))
        .await
        .unwrap();

    let state = controller
        .submit_email(session.id, "dev@example.com")
        .await
        .unwrap();

    assert!(state.is_terminal());
    assert_eq!(api.email_calls(), 1);
    let requests = api.email_requests();
    assert_eq!(requests[0].transformation_id.as_str(), "abc123");
    assert_eq!(requests[0].email, "dev@example.com");

    // Further input refused, nothing sent
    let err = controller
        .submit_email(session.id, "other@example.com")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Rejected(FormError::InvalidTransition { .. })
    ));
    let err = controller
        .submit_upload(session.id, Some(archive_of(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Rejected(_)));
    assert_eq!(api.email_calls(), 1);
    assert_eq!(api.upload_calls(), 1);
}

/// TC-CTL-009: Email failure keeps the id and allows resubmission
#[tokio::test]
async fn tc_ctl_009_email_failure_then_retry() {
    let api = Arc::new(MockApi::new());
    api.set_email_response(Scripted::Status(502));
    let controller = controller_with(api.clone());
    let session = controller.open_session().await;
    controller
        .submit_upload(session.id, Some(archive_of(10)))
        .await
        .unwrap();

    let state = controller
        .submit_email(session.id, "dev@example.com")
        .await
        .unwrap();
    assert_eq!(state.email_state(), EmailState::Failed);
    assert_eq!(
        state.error_message().as_deref(),
        Some("Request failed with status code 502")
    );
    assert_eq!(state.transformation_id().map(|id| id.as_str()), Some("abc123"));

    api.set_email_response(Scripted::Ok(()));
    let state = controller
        .submit_email(session.id, "dev@example.com")
        .await
        .unwrap();
    assert!(state.is_terminal());
    assert_eq!(api.email_calls(), 2);
}

/// TC-CTL-010: Email before upload is refused
#[tokio::test]
async fn tc_ctl_010_email_without_upload_rejected() {
    let api = Arc::new(MockApi::new());
    let controller = controller_with(api.clone());
    let session = controller.open_session().await;

    let err = controller
        .submit_email(session.id, "dev@example.com")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Rejected(FormError::InvalidTransition { .. })
    ));
    assert_eq!(api.email_calls(), 0);
    let session = controller.sessions().get(session.id).await.unwrap();
    assert_eq!(session.state(), &FormState::Idle);
}

/// TC-CTL-011: Double submission while uploading is rejected
#[tokio::test]
async fn tc_ctl_011_second_upload_while_in_flight_rejected() {
    // Given: an upload held open by the mock
    let gate = Arc::new(Notify::new());
    let api = Arc::new(MockApi::new().with_upload_gate(gate.clone()));
    let controller = controller_with(api.clone());
    let session = controller.open_session().await;

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .submit_upload(session.id, Some(archive_of(10)))
                .await
        })
    };
    wait_until(|| api.upload_calls() == 1).await;

    // When: user clicks again
    let err = controller
        .submit_upload(session.id, Some(archive_of(10)))
        .await
        .unwrap_err();

    // Then: rejected without a second call, state still Uploading
    assert_eq!(err, SubmitError::Rejected(FormError::RequestInFlight));
    let snapshot = controller.sessions().get(session.id).await.unwrap();
    assert!(snapshot.state().is_in_flight());

    // And: first upload completes normally
    gate.notify_one();
    let state = first.await.unwrap().unwrap();
    assert_eq!(state.upload_state(), UploadState::Uploaded);
    assert_eq!(api.upload_calls(), 1);
}

/// TC-CTL-012: Unknown session
#[tokio::test]
async fn tc_ctl_012_unknown_session() {
    let api = Arc::new(MockApi::new());
    let controller = controller_with(api.clone());
    let missing = Uuid::new_v4();

    let err = controller
        .submit_upload(missing, Some(archive_of(10)))
        .await
        .unwrap_err();
    assert_eq!(err, SubmitError::SessionNotFound(missing));

    let err = controller
        .submit_email(missing, "dev@example.com")
        .await
        .unwrap_err();
    assert_eq!(err, SubmitError::SessionNotFound(missing));
    assert_eq!(api.upload_calls(), 0);
}

/// TC-CTL-013: Sessions are independent
#[tokio::test]
async fn tc_ctl_013_sessions_do_not_share_state() {
    let api = Arc::new(MockApi::new());
    let controller = controller_with(api.clone());
    let first = controller.open_session().await;
    let second = controller.open_session().await;

    controller
        .submit_upload(first.id, Some(archive_of(10)))
        .await
        .unwrap();

    let second = controller.sessions().get(second.id).await.unwrap();
    assert_eq!(second.state(), &FormState::Idle);
    assert_eq!(controller.sessions().len().await, 2);
}
