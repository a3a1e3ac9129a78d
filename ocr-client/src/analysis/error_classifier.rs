//! Heuristic classification of raw failure messages
//!
//! Matching is a case-insensitive substring search in a fixed priority
//! order. The backend does not send structured error codes, so the result
//! is a best-effort UX hint rather than a guarantee.

use crate::types::{ErrorCategory, TransportFailure, WorkflowError};

/// Trait for failure classification - pure business logic
pub trait ErrorClassifier: Send + Sync {
    /// Determine the category of a raw failure message
    fn categorize(&self, raw_message: &str) -> ErrorCategory;

    /// Remedies shown to the user for a category
    fn suggestions(&self, category: ErrorCategory) -> Vec<String>;

    /// Classify a bare message
    fn classify(&self, raw_message: &str) -> WorkflowError {
        let category = self.categorize(raw_message);
        WorkflowError {
            raw_message: raw_message.to_string(),
            category,
            suggestions: self.suggestions(category),
            details: None,
            reason: None,
        }
    }

    /// Classify a transport failure, keeping its details and reason
    fn classify_failure(&self, failure: &TransportFailure) -> WorkflowError {
        WorkflowError {
            details: failure.details.clone(),
            reason: Some(failure.reason.clone()),
            ..self.classify(&failure.message)
        }
    }
}

/// Default keyword-based classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifierImpl;

impl ErrorClassifierImpl {
    pub fn new() -> Self {
        Self
    }
}

impl ErrorClassifier for ErrorClassifierImpl {
    fn categorize(&self, raw_message: &str) -> ErrorCategory {
        let message = raw_message.to_lowercase();
        let contains_any = |needles: &[&str]| needles.iter().any(|needle| message.contains(needle));

        if contains_any(&["network", "connection", "response"]) {
            ErrorCategory::Network
        } else if message.contains("timeout") {
            ErrorCategory::Timeout
        } else if message.contains("file") && message.contains("size") {
            ErrorCategory::FileSize
        } else if message.contains("file") && message.contains("type") {
            ErrorCategory::FileType
        } else if contains_any(&["server", "backend"]) {
            ErrorCategory::Server
        } else {
            ErrorCategory::Unknown
        }
    }

    fn suggestions(&self, category: ErrorCategory) -> Vec<String> {
        let suggestions: &[&str] = match category {
            ErrorCategory::Network => &[
                "Check your internet connection",
                "Verify the backend server is running",
                "Check the API URL configuration",
            ],
            ErrorCategory::Timeout => &[
                "The image may be too large",
                "Try with a smaller image",
                "Check if the backend server is responding",
            ],
            ErrorCategory::FileSize => &["Maximum file size is 16MB", "Try compressing the image"],
            ErrorCategory::FileType => &[
                "Supported formats: PNG, JPG, JPEG, BMP, TIFF, WEBP",
                "Make sure the file extension is correct",
            ],
            ErrorCategory::Server => &[
                "Make sure the backend container is running",
                "Check backend logs for more details",
            ],
            ErrorCategory::Unknown => &[],
        };

        suggestions.iter().map(|s| s.to_string()).collect()
    }
}

/// Classify a raw message with the default classifier
pub fn classify(raw_message: &str) -> WorkflowError {
    ErrorClassifierImpl::new().classify(raw_message)
}
