use crate::error::{OcrClientError, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the bytes of a selected file live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// Streamed from disk at submission time
    Path(PathBuf),
    /// Already in memory (e.g. read from stdin)
    Memory(Bytes),
}

/// A user-chosen image plus the metadata validation looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    byte_size: u64,
    extension: String,
    content: FileContent,
}

impl SelectedFile {
    /// Describe a file on disk. Only metadata is read here.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(OcrClientError::general(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Ok(Self {
            extension: extension_of(&name),
            name,
            byte_size: metadata.len(),
            content: FileContent::Path(path.to_path_buf()),
        })
    }

    /// Wrap in-memory content under the given display name
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let bytes = bytes.into();
        Self {
            extension: extension_of(&name),
            byte_size: bytes.len() as u64,
            name,
            content: FileContent::Memory(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Lowercased substring after the last `.`; empty when the name has none
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    /// MIME type guessed from the file name
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Pixel region locating a text block in the source image
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// One detected text block, in backend order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrTextBlock {
    pub text: String,
    pub confidence: f64,
    #[serde(rename = "position")]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub dimensions: Dimensions,
}

impl OcrTextBlock {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

/// Structured payload of one successful recognition.
///
/// Serde names follow the backend's wire format so a JSON export can be fed
/// back into anything that reads the backend response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResultSet {
    #[serde(rename = "ocr_results", default)]
    pub blocks: Vec<OcrTextBlock>,
    #[serde(rename = "total_text", default)]
    pub concatenated_text: String,
    #[serde(default)]
    pub image_info: ImageInfo,
    #[serde(
        rename = "processing_time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub processing_time_seconds: Option<f64>,
}

impl OcrResultSet {
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn character_count(&self) -> usize {
        self.concatenated_text.chars().count()
    }

    pub fn has_text(&self) -> bool {
        !self.concatenated_text.trim().is_empty()
    }

    /// Mean confidence over all blocks, if there are any
    pub fn average_confidence(&self) -> Option<f64> {
        if self.blocks.is_empty() {
            return None;
        }
        let sum: f64 = self.blocks.iter().map(|b| b.confidence).sum();
        Some(sum / self.blocks.len() as f64)
    }
}

/// Display band for a block's confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            Self::High
        } else if confidence >= 0.7 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Body of a non-2xx backend response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// Why a submission did not produce a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The request was sent but no response came back
    NoResponse,
    /// The configured wall-clock bound elapsed
    Timeout,
    /// The backend answered with a non-success status
    HttpStatus(u16),
    /// A success status carried a body we could not read
    InvalidResponse,
    /// The file could not be read for upload
    Io,
    /// The user aborted the in-flight request
    Cancelled,
}

/// Raw failure of one submission, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub message: String,
    pub details: Option<String>,
    pub reason: FailureReason,
}

impl TransportFailure {
    pub fn new<S: Into<String>>(reason: FailureReason, message: S) -> Self {
        Self {
            message: message.into(),
            details: None,
            reason,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    pub fn cancelled() -> Self {
        Self::new(FailureReason::Cancelled, "Request cancelled before the backend responded")
    }

    pub fn status_code(&self) -> Option<u16> {
        match self.reason {
            FailureReason::HttpStatus(status) => Some(status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason == FailureReason::Cancelled
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// User-facing failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    Network,
    Timeout,
    FileSize,
    FileType,
    Server,
    Unknown,
}

impl ErrorCategory {
    /// Alert title shown above the raw message
    pub fn title(&self) -> &'static str {
        match self {
            Self::Network => "Network Error",
            Self::Timeout => "Request Timeout",
            Self::FileSize | Self::FileType => "File Error",
            Self::Server => "Server Error",
            Self::Unknown => "Error",
        }
    }
}

/// A classified submission failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowError {
    pub raw_message: String,
    pub category: ErrorCategory,
    pub suggestions: Vec<String>,
    pub details: Option<String>,
    pub reason: Option<FailureReason>,
}

impl WorkflowError {
    pub fn title(&self) -> &'static str {
        self.category.title()
    }

    pub fn status_code(&self) -> Option<u16> {
        match self.reason {
            Some(FailureReason::HttpStatus(status)) => Some(status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason == Some(FailureReason::Cancelled)
    }
}

/// Body of `GET /api/health`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub ocr_initialized: Option<bool>,
}

/// Backend connectivity as seen by the last health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Connected(HealthReport),
    Disconnected { reason: String },
}

impl HealthStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

/// Body of `GET /api/ocr/info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub supported_formats: Vec<String>,
    #[serde(default)]
    pub max_file_size_mb: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}
