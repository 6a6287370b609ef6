use thiserror::Error;

use crate::policy::{ALLOWED_IMAGE_TYPES, MAX_FILE_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid file type. Allowed types: {allowed}")]
    InvalidType { allowed: String },
    #[error("File too large. Maximum size: {max_mb}MB")]
    TooLarge { max_mb: u64 },
}

/// Checks a file's declared MIME type and size against upload policy.
/// Type is checked before size; the first failure wins.
pub fn validate_image(mime_type: &str, size_bytes: u64) -> Result<(), ValidationError> {
    if !ALLOWED_IMAGE_TYPES.contains(&mime_type) {
        return Err(ValidationError::InvalidType {
            allowed: ALLOWED_IMAGE_TYPES.join(", "),
        });
    }
    if size_bytes > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge {
            max_mb: MAX_FILE_SIZE / (1024 * 1024),
        });
    }
    Ok(())
}
