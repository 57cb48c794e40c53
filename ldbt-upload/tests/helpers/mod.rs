//! Test Helper Utilities
//!
//! Scripted stand-in for the transformation service that counts calls.

#![allow(dead_code)]

use async_trait::async_trait;
use ldbt_common::api::{SetEmailRequest, TransformationId, UploadArchiveResponse};
use ldbt_upload::client::{TransformationApi, TransformerError};
use ldbt_upload::models::ArchiveFile;
use ldbt_upload::store::SessionStore;
use ldbt_upload::UploadFormController;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Scripted response for one kind of call
#[derive(Debug, Clone)]
pub enum Scripted<T> {
    Ok(T),
    Network(String),
    Status(u16),
}

impl<T> Scripted<T> {
    fn into_result(self) -> Result<T, TransformerError> {
        match self {
            Scripted::Ok(value) => Ok(value),
            Scripted::Network(message) => Err(TransformerError::Network(message)),
            Scripted::Status(code) => Err(TransformerError::Status(code)),
        }
    }
}

/// Mock transformation service
pub struct MockApi {
    upload_calls: AtomicUsize,
    email_calls: AtomicUsize,
    upload_response: Mutex<Scripted<String>>,
    email_response: Mutex<Scripted<()>>,
    uploaded_files: Mutex<Vec<String>>,
    email_requests: Mutex<Vec<SetEmailRequest>>,
    /// When set, uploads wait for a notification before answering
    upload_gate: Option<Arc<Notify>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            upload_calls: AtomicUsize::new(0),
            email_calls: AtomicUsize::new(0),
            upload_response: Mutex::new(Scripted::Ok("abc123".to_string())),
            email_response: Mutex::new(Scripted::Ok(())),
            uploaded_files: Mutex::new(Vec::new()),
            email_requests: Mutex::new(Vec::new()),
            upload_gate: None,
        }
    }

    pub fn with_upload_gate(mut self, gate: Arc<Notify>) -> Self {
        self.upload_gate = Some(gate);
        self
    }

    pub fn set_upload_response(&self, response: Scripted<String>) {
        *self.upload_response.lock().unwrap() = response;
    }

    pub fn set_email_response(&self, response: Scripted<()>) {
        *self.email_response.lock().unwrap() = response;
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn email_calls(&self) -> usize {
        self.email_calls.load(Ordering::SeqCst)
    }

    pub fn uploaded_files(&self) -> Vec<String> {
        self.uploaded_files.lock().unwrap().clone()
    }

    pub fn email_requests(&self) -> Vec<SetEmailRequest> {
        self.email_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransformationApi for MockApi {
    async fn upload_archive(
        &self,
        archive: ArchiveFile,
    ) -> Result<UploadArchiveResponse, TransformerError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.uploaded_files
            .lock()
            .unwrap()
            .push(archive.file_name.clone());

        if let Some(gate) = &self.upload_gate {
            gate.notified().await;
        }

        let scripted = self.upload_response.lock().unwrap().clone();
        scripted.into_result().map(|id| UploadArchiveResponse {
            transformation_id: TransformationId::parse(id).unwrap(),
        })
    }

    async fn set_email(&self, request: &SetEmailRequest) -> Result<(), TransformerError> {
        self.email_calls.fetch_add(1, Ordering::SeqCst);
        self.email_requests.lock().unwrap().push(request.clone());

        let scripted = self.email_response.lock().unwrap().clone();
        scripted.into_result()
    }
}

/// Controller wired to a fresh mock and empty session store
pub fn controller_with(api: Arc<MockApi>) -> UploadFormController {
    UploadFormController::new(api, SessionStore::new())
}

pub fn archive_of(len: usize) -> ArchiveFile {
    ArchiveFile::new("lookml-project.zip", vec![0x50; len])
}

/// Poll until `condition` holds, failing the test after ~2 seconds
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}
