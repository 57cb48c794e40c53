//! Form input validation
//!
//! Runs before any network call; a failure here never reaches the
//! transformation service.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FormError;
use crate::models::ArchiveFile;

/// Upload limit in bytes (15 MB, decimal)
pub const MAX_ARCHIVE_BYTES: u64 = 15 * 1000 * 1000;

/// local-part@domain, where the domain is a dotted name with a 2+ letter TLD
/// or a bracketed IPv4 literal; the local part may be a quoted string
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern compiles")
});

/// Check the selected archive is present, non-empty and within the limit
pub fn validate_file(file: Option<&ArchiveFile>) -> Result<(), FormError> {
    let file = match file {
        Some(file) if !file.is_empty() => file,
        _ => return Err(FormError::FileRequired),
    };

    if file.size_bytes() > MAX_ARCHIVE_BYTES {
        return Err(FormError::FileTooLarge {
            size_bytes: file.size_bytes(),
            limit_bytes: MAX_ARCHIVE_BYTES,
        });
    }

    Ok(())
}

/// Check the address is present and email-shaped
pub fn validate_email(address: &str) -> Result<(), FormError> {
    if address.is_empty() {
        return Err(FormError::EmailRequired);
    }
    if !EMAIL_PATTERN.is_match(address) {
        return Err(FormError::InvalidEmail);
    }
    Ok(())
}
