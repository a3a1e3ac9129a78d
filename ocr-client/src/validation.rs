//! File acceptance checks run before a file enters the workflow
//!
//! Validation is filename and size based only. The image bytes are never
//! sniffed, so a renamed non-image passes and is left for the backend to
//! reject.

use crate::config::ValidationPolicy;
use crate::formatter::format_file_size;
use crate::types::SelectedFile;
use thiserror::Error;

/// Why a candidate file was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationRejection {
    #[error("Invalid file type '{extension}'. Allowed types: {}", .allowed.join(", "))]
    FileType {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("File is too large ({}). Maximum size is {max_megabytes}MB.", display_size(.size))]
    FileSize { size: u64, max_megabytes: u64 },

    #[error("Please select an image first")]
    NoFileSelected,
}

fn display_size(size: &u64) -> String {
    format_file_size(*size)
}

/// Check a file against the policy: extension first, then size.
///
/// A file that violates both rules is reported as `FileType`.
pub fn validate(file: &SelectedFile, policy: &ValidationPolicy) -> Result<(), ValidationRejection> {
    if !policy.allows_extension(file.extension()) {
        return Err(ValidationRejection::FileType {
            extension: file.extension().to_string(),
            allowed: policy.allowed_extensions().to_vec(),
        });
    }

    if file.byte_size() > policy.max_bytes() {
        return Err(ValidationRejection::FileSize {
            size: file.byte_size(),
            max_megabytes: policy.max_megabytes(),
        });
    }

    Ok(())
}
