use ocr_client::{OcrClientError, ValidationRejection};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR client error: {0}")]
    Client(#[from] OcrClientError),

    #[error("File rejected: {0}")]
    Rejected(#[from] ValidationRejection),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Backend unavailable at {url}: {reason}")]
    BackendUnavailable { url: String, reason: String },

    #[error("{title}: {message}")]
    ProcessingFailed { title: String, message: String },

    #[error("Processing cancelled")]
    Cancelled,

    #[error("Failed to serialize JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Dialoguer error: {0}")]
    DialoguerError(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),

    #[error("{0}: {1}")]
    WithContext(String, Box<CliError>),
}

impl CliError {
    pub fn with_context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext(context.into(), Box::new(self))
    }

    /// Failures the command already rendered in full before returning
    pub fn is_already_reported(&self) -> bool {
        matches!(self, Self::ProcessingFailed { .. } | Self::Cancelled)
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Io(err) => format!("I/O operation failed: {err}"),
            Self::Client(err) => err.to_string(),
            Self::Rejected(rejection) => rejection.to_string(),
            Self::FileNotFound(path) => format!("File not found: {}", path.display()),
            Self::BackendUnavailable { url, reason } => {
                format!("Backend at {url} is not reachable: {reason}")
            }
            Self::ProcessingFailed { title, message } => format!("{title}: {message}"),
            Self::Cancelled => "Processing cancelled by user".to_string(),
            Self::JsonParseError(err) => format!("Failed to produce JSON: {err}"),
            Self::DialoguerError(err) => format!("UI interaction error: {err}"),
            Self::Other(msg) => msg.clone(),
            Self::WithContext(ctx, err) => format!("{ctx}: {}", err.user_message()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

pub trait ResultExt<T, E> {
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Into<CliError>,
{
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| {
            let cli_err: CliError = err.into();
            cli_err.with_context(context())
        })
    }
}
