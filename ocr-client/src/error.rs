use thiserror::Error;

/// Result type alias for ocr-client operations
pub type Result<T> = std::result::Result<T, OcrClientError>;

/// Error types for OCR client operations
///
/// Submission failures are not errors at this level: they travel as
/// [`crate::types::TransportFailure`] values so the workflow can classify them.
#[derive(Debug, Error)]
pub enum OcrClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(#[from] crate::validation::ValidationRejection),

    #[error("Backend returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Clipboard unavailable: {message}")]
    Clipboard { message: String },

    #[error("General error: {message}")]
    General { message: String },
}

impl OcrClientError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new clipboard error
    pub fn clipboard<S: Into<String>>(message: S) -> Self {
        Self::Clipboard {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }
}
