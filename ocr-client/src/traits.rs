use crate::error::Result;
use crate::progress::ProgressReporter;
use crate::types::{HealthStatus, OcrResultSet, SelectedFile, ServiceInfo, TransportFailure};
use std::future::Future;

/// Trait for the backend transport
pub trait Transport: Send + Sync {
    /// Probe the health endpoint. Never fails: problems become `Disconnected`.
    fn check_health(&self) -> impl Future<Output = HealthStatus> + Send;

    /// Upload one file for recognition, reporting progress while bytes are sent.
    ///
    /// Exactly one request is made per call; there is no retry.
    fn submit(
        &self,
        file: &SelectedFile,
        progress: ProgressReporter,
    ) -> impl Future<Output = std::result::Result<OcrResultSet, TransportFailure>> + Send;

    /// Fetch the backend's service description
    fn service_info(&self) -> impl Future<Output = Result<ServiceInfo>> + Send;
}

/// Trait for a text clipboard sink
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<()>;
}
