//! OCR Client - image-to-text workflow against a remote OCR backend
//!
//! This crate validates a chosen image, uploads it to the backend with
//! progress reporting, classifies failures into user-facing categories and
//! presents the recognized text blocks.

// Core modules
pub mod config;
pub mod error;
pub mod types;
pub mod traits;

// Shared utility modules
pub mod formatter;
pub mod progress;

// Main functionality modules
pub mod analysis;
pub mod curl;
pub mod export;
pub mod http;
pub mod preview;
pub mod renderers;
pub mod validation;
pub mod workflow;

pub mod testing;

// Re-export main types for convenience
pub use analysis::{classify, ErrorClassifier, ErrorClassifierImpl};
pub use config::{ClientConfig, ClientConfigBuilder, ValidationPolicy};
pub use curl::CurlGenerator;
pub use error::{OcrClientError, Result};
pub use export::{ResultsPresenter, SystemClipboard};
pub use http::HttpTransport;
pub use preview::PreviewHandle;
pub use renderers::{CliRenderer, ErrorRenderer, JsonRenderer, OutputRenderer, TextRenderer};
pub use traits::{Clipboard, Transport};
pub use types::{
    ConfidenceLevel, ErrorCategory, FailureReason, HealthReport, HealthStatus, OcrResultSet,
    OcrTextBlock, SelectedFile, ServiceInfo, TransportFailure, WorkflowError,
};
pub use validation::{validate, ValidationRejection};
pub use workflow::{ProcessOutcome, SelectOutcome, TransitionOutcome, WorkflowController, WorkflowPhase};

/// Run one file through a fresh workflow against the configured backend.
///
/// A file the policy rejects is an error; submission failures come back as
/// [`ProcessOutcome::Failed`].
pub async fn recognize_file(
    config: ClientConfig,
    path: impl AsRef<std::path::Path>,
) -> Result<ProcessOutcome> {
    let policy = config.policy.clone();
    let transport = HttpTransport::new(config)?;
    let controller = WorkflowController::new(transport, policy);

    match controller.select_file(SelectedFile::from_path(path)?) {
        SelectOutcome::Selected => Ok(controller.process().await),
        SelectOutcome::Rejected(rejection) => Err(rejection.into()),
        SelectOutcome::Busy => Ok(ProcessOutcome::AlreadySubmitting),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let error = OcrClientError::invalid_config("test error");
        assert!(error.to_string().contains("Invalid configuration"));

        let error = OcrClientError::Api {
            status: 503,
            message: "OCR service not initialized".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Backend returned status 503: OCR service not initialized"
        );
    }

    #[tokio::test]
    async fn test_recognize_file_rejects_before_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        // Nothing listens here; a rejected file must not try to connect
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let error = recognize_file(config, &path).await.unwrap_err();
        assert!(matches!(
            error,
            OcrClientError::Validation(ValidationRejection::FileType { .. })
        ));
    }
}
