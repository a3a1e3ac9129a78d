use crate::error::{OcrClientError, Result};
use crate::progress::ProgressReporter;
use crate::traits::{Clipboard, Transport};
use crate::types::{
    HealthReport, HealthStatus, OcrResultSet, SelectedFile, ServiceInfo, TransportFailure,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Scripted transport: reports fixed progress steps, then resolves with a canned outcome
#[derive(Clone)]
pub struct MockTransport {
    pub progress_steps: Vec<u8>,
    pub outcome: std::result::Result<OcrResultSet, TransportFailure>,
    pub health: HealthStatus,
    pub info: Option<ServiceInfo>,
    submissions: Arc<AtomicUsize>,
    health_checks: Arc<AtomicUsize>,
    gate: Option<Arc<Notify>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            progress_steps: vec![0, 100],
            outcome: Ok(OcrResultSet::default()),
            health: HealthStatus::Connected(HealthReport::default()),
            info: None,
            submissions: Arc::new(AtomicUsize::new(0)),
            health_checks: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    pub fn with_results(mut self, results: OcrResultSet) -> Self {
        self.outcome = Ok(results);
        self
    }

    pub fn with_failure(mut self, failure: TransportFailure) -> Self {
        self.outcome = Err(failure);
        self
    }

    pub fn with_progress(mut self, steps: Vec<u8>) -> Self {
        self.progress_steps = steps;
        self
    }

    pub fn with_health(mut self, health: HealthStatus) -> Self {
        self.health = health;
        self
    }

    pub fn with_info(mut self, info: ServiceInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Hold every submission after its progress steps until the gate is notified
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn health_checks(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    async fn check_health(&self) -> HealthStatus {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        self.health.clone()
    }

    async fn submit(
        &self,
        _file: &SelectedFile,
        mut progress: ProgressReporter,
    ) -> std::result::Result<OcrResultSet, TransportFailure> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        for step in &self.progress_steps {
            progress.report_percent(*step);
            tokio::task::yield_now().await;
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcome.clone()
    }

    async fn service_info(&self) -> Result<ServiceInfo> {
        self.info
            .clone()
            .ok_or_else(|| OcrClientError::general("Mock service info not configured"))
    }
}

/// Clipboard that records what was copied
#[derive(Clone, Default)]
pub struct MockClipboard {
    pub contents: Arc<Mutex<Vec<String>>>,
    pub should_fail: bool,
}

impl MockClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn last(&self) -> Option<String> {
        self.contents.lock().unwrap().last().cloned()
    }
}

impl Clipboard for MockClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        if self.should_fail {
            return Err(OcrClientError::clipboard("Mock clipboard failure"));
        }
        self.contents.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub mod test_helpers {
    use crate::types::{BoundingBox, Dimensions, ImageInfo, OcrResultSet, OcrTextBlock};

    pub fn block(text: &str, confidence: f64) -> OcrTextBlock {
        OcrTextBlock {
            text: text.to_string(),
            confidence,
            bounding_box: BoundingBox {
                x_min: 10.0,
                y_min: 20.0,
                x_max: 110.0,
                y_max: 40.0,
            },
            dimensions: Dimensions {
                width: 100.0,
                height: 20.0,
            },
        }
    }

    /// Three blocks with confidences 0.95, 0.60 and 0.99
    pub fn receipt_results() -> OcrResultSet {
        OcrResultSet {
            blocks: vec![
                block("ACME STORE", 0.95),
                block("Total: 12.50", 0.60),
                block("Thank you!", 0.99),
            ],
            concatenated_text: "ACME STORE\nTotal: 12.50\nThank you!".to_string(),
            image_info: ImageInfo {
                width: 1024,
                height: 768,
            },
            processing_time_seconds: Some(1.2),
        }
    }
}
