use crate::analysis::{ErrorClassifier, ErrorClassifierImpl};
use crate::config::ValidationPolicy;
use crate::error::Result;
use crate::preview::PreviewHandle;
use crate::progress;
use crate::traits::Transport;
use crate::types::{HealthStatus, OcrResultSet, SelectedFile, TransportFailure, WorkflowError};
use crate::validation::{validate, ValidationRejection};
use crate::workflow::WorkflowPhase;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of offering a file to the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    /// Validation failed; the phase is unchanged
    Rejected(ValidationRejection),
    /// A submission is in flight
    Busy,
}

/// Result of `process` or `retry`
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Succeeded(OcrResultSet),
    Failed(WorkflowError),
    /// Nothing to submit
    NoFileSelected(ValidationRejection),
    /// Another submission is already in flight
    AlreadySubmitting,
    /// The event is not valid in the current phase
    Refused { phase: &'static str },
}

/// Result of a simple phase transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    Refused { phase: &'static str },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

enum Start {
    Begin(SelectedFile, CancellationToken),
    Skip(ProcessOutcome),
}

/// Drives one image through validation, upload and result/error display.
///
/// All methods take `&self`; the phase lives in a watch channel and every
/// transition is a compare-and-set on it, so at most one submission can
/// be in flight even if callers race.
pub struct WorkflowController<T: Transport, C: ErrorClassifier = ErrorClassifierImpl> {
    transport: T,
    classifier: C,
    policy: ValidationPolicy,
    state: watch::Sender<WorkflowPhase>,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl<T: Transport> WorkflowController<T> {
    pub fn new(transport: T, policy: ValidationPolicy) -> Self {
        Self::with_classifier(transport, policy, ErrorClassifierImpl::new())
    }
}

impl<T: Transport, C: ErrorClassifier> WorkflowController<T, C> {
    pub fn with_classifier(transport: T, policy: ValidationPolicy, classifier: C) -> Self {
        let (state, _) = watch::channel(WorkflowPhase::Idle);
        Self {
            transport,
            classifier,
            policy,
            state,
            in_flight: Mutex::new(None),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Observe phase changes; the receiver starts at the current phase
    pub fn subscribe(&self) -> watch::Receiver<WorkflowPhase> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> WorkflowPhase {
        self.state.borrow().clone()
    }

    /// Validate and store a file, replacing any previous selection
    pub fn select_file(&self, file: SelectedFile) -> SelectOutcome {
        let mut outcome = SelectOutcome::Busy;
        self.state.send_if_modified(|phase| {
            if phase.is_submitting() {
                return false;
            }
            if let Err(rejection) = validate(&file, &self.policy) {
                info!(file = file.name(), %rejection, "file rejected");
                outcome = SelectOutcome::Rejected(rejection);
                return false;
            }

            let from = phase.name();
            *phase = WorkflowPhase::FileSelected { file };
            outcome = SelectOutcome::Selected;
            log_transition("select", from, phase);
            true
        });
        outcome
    }

    /// Discard the selection before processing
    pub fn clear(&self) -> TransitionOutcome {
        self.transition("clear", |phase| match phase {
            WorkflowPhase::FileSelected { .. } => Some(WorkflowPhase::Idle),
            _ => None,
        })
    }

    /// Leave `Failed` and keep the file for another attempt
    pub fn dismiss_error(&self) -> TransitionOutcome {
        self.transition("dismiss", |phase| match phase {
            WorkflowPhase::Failed { file, .. } => {
                Some(WorkflowPhase::FileSelected { file: file.clone() })
            }
            _ => None,
        })
    }

    /// Discard file and results after a success
    pub fn reset(&self) -> TransitionOutcome {
        self.transition("reset", |phase| match phase {
            WorkflowPhase::Succeeded { .. } => Some(WorkflowPhase::Idle),
            _ => None,
        })
    }

    /// Submit the selected file and wait for the outcome
    pub async fn process(&self) -> ProcessOutcome {
        match self.start_submission("process") {
            Start::Begin(file, token) => self.run_submission(file, token).await,
            Start::Skip(outcome) => outcome,
        }
    }

    /// Resubmit the same file after a failure
    pub async fn retry(&self) -> ProcessOutcome {
        match self.start_submission("retry") {
            Start::Begin(file, token) => self.run_submission(file, token).await,
            Start::Skip(outcome) => outcome,
        }
    }

    /// Abort the in-flight submission; it resolves as a cancelled failure
    pub fn cancel(&self) -> TransitionOutcome {
        let token = self.lock_in_flight().clone();
        match token {
            Some(token) => {
                info!("cancelling in-flight submission");
                token.cancel();
                TransitionOutcome::Applied
            }
            None => TransitionOutcome::Refused {
                phase: self.state.borrow().name(),
            },
        }
    }

    /// Probe the backend. Never touches the workflow phase.
    pub async fn check_health(&self) -> HealthStatus {
        self.transport.check_health().await
    }

    /// A viewable path for the current selection, released when dropped
    pub fn preview(&self) -> Result<Option<PreviewHandle>> {
        let file = self.state.borrow().file().cloned();
        file.map(|file| PreviewHandle::acquire(&file)).transpose()
    }

    fn transition(
        &self,
        event: &'static str,
        next: impl FnOnce(&WorkflowPhase) -> Option<WorkflowPhase>,
    ) -> TransitionOutcome {
        let mut outcome = TransitionOutcome::Refused { phase: "" };
        self.state.send_if_modified(|phase| {
            let from = phase.name();
            match next(phase) {
                Some(to) => {
                    *phase = to;
                    outcome = TransitionOutcome::Applied;
                    log_transition(event, from, phase);
                    true
                }
                None => {
                    debug!(event, phase = from, "event refused");
                    outcome = TransitionOutcome::Refused { phase: from };
                    false
                }
            }
        });
        outcome
    }

    /// Move into `Submitting` if the phase allows `event`
    fn start_submission(&self, event: &'static str) -> Start {
        let token = CancellationToken::new();
        let mut start = Start::Skip(ProcessOutcome::AlreadySubmitting);

        self.state.send_if_modified(|phase| {
            let file = match (event, &*phase) {
                ("process", WorkflowPhase::FileSelected { file })
                | ("retry", WorkflowPhase::Failed { file, .. }) => file.clone(),
                (_, WorkflowPhase::Submitting { .. }) => {
                    debug!(event, "submission already in flight");
                    return false;
                }
                ("process", WorkflowPhase::Idle) => {
                    start = Start::Skip(ProcessOutcome::NoFileSelected(
                        ValidationRejection::NoFileSelected,
                    ));
                    return false;
                }
                (_, other) => {
                    debug!(event, phase = other.name(), "event refused");
                    start = Start::Skip(ProcessOutcome::Refused {
                        phase: other.name(),
                    });
                    return false;
                }
            };

            let from = phase.name();
            *phase = WorkflowPhase::Submitting {
                file: file.clone(),
                progress: 0,
            };
            *self.lock_in_flight() = Some(token.clone());
            log_transition(event, from, phase);
            start = Start::Begin(file, token.clone());
            true
        });
        start
    }

    async fn run_submission(&self, file: SelectedFile, token: CancellationToken) -> ProcessOutcome {
        let mut guard = SubmissionGuard {
            controller: self,
            resolved: false,
        };
        let (reporter, mut receiver) = progress::channel();

        let submit = self.transport.submit(&file, reporter);
        tokio::pin!(submit);

        let result = loop {
            tokio::select! {
                result = &mut submit => break result,
                _ = token.cancelled() => break Err(TransportFailure::cancelled()),
                Some(percent) = receiver.recv() => self.update_progress(percent),
            }
        };
        // Late updates from the transport now go nowhere
        drop(receiver);
        self.lock_in_flight().take();

        guard.resolved = true;
        self.finish_submission(result)
    }

    /// The submission future went away before resolving
    fn abandon_submission(&self) {
        self.lock_in_flight().take();
        info!("submission dropped before it resolved");
        self.finish_submission(Err(TransportFailure::cancelled()));
    }

    fn update_progress(&self, percent: u8) {
        self.state.send_if_modified(|phase| match phase {
            WorkflowPhase::Submitting { progress, .. } if percent > *progress => {
                *progress = percent;
                debug!(progress = percent, "upload progress");
                true
            }
            _ => false,
        });
    }

    fn finish_submission(
        &self,
        result: std::result::Result<OcrResultSet, TransportFailure>,
    ) -> ProcessOutcome {
        let outcome = match result {
            Ok(results) => ProcessOutcome::Succeeded(results),
            Err(failure) => {
                let error = self.classifier.classify_failure(&failure);
                info!(
                    category = ?error.category,
                    message = %error.raw_message,
                    "submission failed"
                );
                ProcessOutcome::Failed(error)
            }
        };

        self.state.send_if_modified(|phase| {
            let WorkflowPhase::Submitting { file, .. } = &*phase else {
                warn!(phase = phase.name(), "submission resolved outside submitting phase");
                return false;
            };
            let file = file.clone();
            *phase = match &outcome {
                ProcessOutcome::Succeeded(results) => WorkflowPhase::Succeeded {
                    file,
                    results: results.clone(),
                },
                ProcessOutcome::Failed(error) => WorkflowPhase::Failed {
                    file,
                    error: error.clone(),
                },
                _ => return false,
            };
            log_transition("resolve", "submitting", phase);
            true
        });
        outcome
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Moves the phase out of `Submitting` if the submission future is dropped early
struct SubmissionGuard<'a, T: Transport, C: ErrorClassifier> {
    controller: &'a WorkflowController<T, C>,
    resolved: bool,
}

impl<T: Transport, C: ErrorClassifier> Drop for SubmissionGuard<'_, T, C> {
    fn drop(&mut self) {
        if !self.resolved {
            self.controller.abandon_submission();
        }
    }
}

fn log_transition(event: &'static str, from: &'static str, to: &WorkflowPhase) {
    info!(event, from, to = to.name(), "workflow transition");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_helpers, MockTransport};
    use crate::types::{ErrorCategory, FailureReason, HealthReport};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    const MIB: usize = 1024 * 1024;

    fn controller(transport: MockTransport) -> WorkflowController<MockTransport> {
        WorkflowController::new(transport, ValidationPolicy::default())
    }

    fn photo() -> SelectedFile {
        SelectedFile::from_bytes("photo.png", vec![0u8; 2 * MIB])
    }

    #[tokio::test]
    async fn test_successful_cycle() {
        let transport = MockTransport::new().with_results(test_helpers::receipt_results());
        let controller = controller(transport.clone());

        assert_eq!(controller.select_file(photo()), SelectOutcome::Selected);
        let outcome = controller.process().await;

        assert!(matches!(outcome, ProcessOutcome::Succeeded(_)));
        let phase = controller.snapshot();
        let results = phase.results().unwrap();
        assert_eq!(results.blocks.len(), 3);
        let confidences: Vec<f64> = results.blocks.iter().map(|b| b.confidence).collect();
        assert_eq!(confidences, vec![0.95, 0.60, 0.99]);
        assert_eq!(results.concatenated_text, "ACME STORE\nTotal: 12.50\nThank you!");
        assert_eq!(phase.progress(), None);
        assert_eq!(transport.submissions(), 1);

        assert!(controller.reset().is_applied());
        assert_eq!(controller.snapshot(), WorkflowPhase::Idle);
    }

    #[tokio::test]
    async fn test_rejected_files_never_reach_transport() {
        let transport = MockTransport::new();
        let controller = controller(transport.clone());

        let outcome = controller.select_file(SelectedFile::from_bytes("scan.gif", vec![1u8]));
        assert!(matches!(
            outcome,
            SelectOutcome::Rejected(ValidationRejection::FileType { .. })
        ));
        assert_eq!(controller.snapshot(), WorkflowPhase::Idle);

        let outcome = controller.select_file(SelectedFile::from_bytes("huge.png", vec![0u8; 20 * MIB]));
        assert!(matches!(
            outcome,
            SelectOutcome::Rejected(ValidationRejection::FileSize { .. })
        ));
        assert_eq!(controller.snapshot(), WorkflowPhase::Idle);

        assert_eq!(
            controller.process().await,
            ProcessOutcome::NoFileSelected(ValidationRejection::NoFileSelected)
        );
        assert_eq!(transport.submissions(), 0);
    }

    #[tokio::test]
    async fn test_rejected_select_keeps_previous_selection() {
        let controller = controller(MockTransport::new());
        controller.select_file(photo());
        controller.select_file(SelectedFile::from_bytes("scan.gif", vec![1u8]));

        assert_eq!(controller.snapshot().file().map(|f| f.name()), Some("photo.png"));
    }

    #[tokio::test]
    async fn test_progress_then_timeout_fails() {
        let gate = Arc::new(Notify::new());
        let transport = MockTransport::new()
            .with_progress(vec![0, 45, 100])
            .with_failure(TransportFailure::new(
                FailureReason::Timeout,
                "timeout of 60000ms exceeded",
            ))
            .with_gate(gate.clone());
        let controller = controller(transport);
        controller.select_file(photo());

        let mut phases = controller.subscribe();
        let observed = async {
            let phase = phases
                .wait_for(|phase| phase.progress() == Some(100))
                .await
                .unwrap()
                .clone();
            gate.notify_one();
            phase
        };

        let (outcome, observed) = tokio::join!(controller.process(), observed);
        assert_eq!(observed.progress(), Some(100));

        let ProcessOutcome::Failed(error) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(error.category, ErrorCategory::Timeout);
        assert_eq!(error.raw_message, "timeout of 60000ms exceeded");

        let phase = controller.snapshot();
        assert!(matches!(phase, WorkflowPhase::Failed { .. }));
        assert_eq!(phase.progress(), None);
    }

    #[tokio::test]
    async fn test_second_process_while_submitting_is_ignored() {
        let gate = Arc::new(Notify::new());
        let transport = MockTransport::new()
            .with_results(test_helpers::receipt_results())
            .with_gate(gate.clone());
        let controller = controller(transport.clone());
        controller.select_file(photo());

        let mut phases = controller.subscribe();
        let second = async {
            phases.wait_for(WorkflowPhase::is_submitting).await.unwrap();
            let outcome = controller.process().await;
            let reselect = controller.select_file(photo());
            gate.notify_one();
            (outcome, reselect)
        };

        let (first, (second, reselect)) = tokio::join!(controller.process(), second);
        assert!(matches!(first, ProcessOutcome::Succeeded(_)));
        assert_eq!(second, ProcessOutcome::AlreadySubmitting);
        assert_eq!(reselect, SelectOutcome::Busy);
        assert_eq!(transport.submissions(), 1);
    }

    #[tokio::test]
    async fn test_cancel_resolves_as_cancelled_failure() {
        let gate = Arc::new(Notify::new());
        let transport = MockTransport::new().with_gate(gate);
        let controller = controller(transport);
        controller.select_file(photo());

        assert_eq!(
            controller.cancel(),
            TransitionOutcome::Refused {
                phase: "file_selected"
            }
        );

        let mut phases = controller.subscribe();
        let cancel = async {
            phases.wait_for(WorkflowPhase::is_submitting).await.unwrap();
            controller.cancel()
        };

        let (outcome, cancelled) = tokio::join!(controller.process(), cancel);
        assert!(cancelled.is_applied());
        let ProcessOutcome::Failed(error) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(error.is_cancelled());
        assert!(controller.snapshot().error().unwrap().is_cancelled());
    }

    #[tokio::test]
    async fn test_dropped_submission_fails_and_can_be_retried() {
        let gate = Arc::new(Notify::new());
        let transport = MockTransport::new()
            .with_results(test_helpers::receipt_results())
            .with_gate(gate.clone());
        let controller = controller(transport.clone());
        controller.select_file(photo());

        let timed_out = tokio::time::timeout(Duration::from_millis(50), controller.process()).await;
        assert!(timed_out.is_err());

        let phase = controller.snapshot();
        assert!(phase.error().unwrap().is_cancelled());
        assert_eq!(phase.file().map(|f| f.name()), Some("photo.png"));
        assert_eq!(controller.cancel(), TransitionOutcome::Refused { phase: "failed" });

        gate.notify_one();
        assert!(matches!(controller.retry().await, ProcessOutcome::Succeeded(_)));
        assert_eq!(transport.submissions(), 2);
    }

    #[tokio::test]
    async fn test_retry_and_dismiss_after_failure() {
        let transport = MockTransport::new().with_failure(TransportFailure::new(
            FailureReason::HttpStatus(500),
            "Internal server error during OCR processing",
        ));
        let controller = controller(transport.clone());
        controller.select_file(photo());

        let ProcessOutcome::Failed(error) = controller.process().await else {
            panic!("expected failure");
        };
        assert_eq!(error.category, ErrorCategory::Server);
        assert_eq!(error.status_code(), Some(500));

        assert!(matches!(controller.retry().await, ProcessOutcome::Failed(_)));
        assert_eq!(transport.submissions(), 2);

        assert!(controller.dismiss_error().is_applied());
        let phase = controller.snapshot();
        assert!(matches!(phase, WorkflowPhase::FileSelected { .. }));
        assert_eq!(phase.file().map(|f| f.name()), Some("photo.png"));
    }

    #[tokio::test]
    async fn test_events_outside_their_phase_are_refused() {
        let controller = controller(MockTransport::new());

        assert_eq!(controller.clear(), TransitionOutcome::Refused { phase: "idle" });
        assert_eq!(controller.reset(), TransitionOutcome::Refused { phase: "idle" });
        assert_eq!(controller.retry().await, ProcessOutcome::Refused { phase: "idle" });

        controller.select_file(photo());
        assert_eq!(
            controller.dismiss_error(),
            TransitionOutcome::Refused {
                phase: "file_selected"
            }
        );
        assert!(controller.clear().is_applied());
        assert_eq!(controller.snapshot(), WorkflowPhase::Idle);

        controller.select_file(photo());
        controller.process().await;
        assert_eq!(
            controller.process().await,
            ProcessOutcome::Refused { phase: "succeeded" }
        );
    }

    #[tokio::test]
    async fn test_select_replaces_results() {
        let controller = controller(MockTransport::new().with_results(test_helpers::receipt_results()));
        controller.select_file(photo());
        controller.process().await;

        let other = SelectedFile::from_bytes("other.jpg", vec![1u8; 10]);
        assert_eq!(controller.select_file(other), SelectOutcome::Selected);
        let phase = controller.snapshot();
        assert!(phase.results().is_none());
        assert_eq!(phase.file().map(|f| f.name()), Some("other.jpg"));
    }

    #[tokio::test]
    async fn test_health_check_is_idempotent_and_leaves_phase() {
        let report = HealthReport {
            status: Some("healthy".to_string()),
            service: Some("OCR Backend".to_string()),
            ocr_initialized: Some(true),
        };
        let transport = MockTransport::new().with_health(HealthStatus::Connected(report));
        let controller = controller(transport.clone());
        controller.select_file(photo());
        let before = controller.snapshot();

        let first = controller.check_health().await;
        let second = controller.check_health().await;
        assert!(first.is_connected());
        assert_eq!(first, second);
        assert_eq!(controller.snapshot(), before);
        assert_eq!(transport.health_checks(), 2);
    }

    #[tokio::test]
    async fn test_preview_follows_selection() {
        let controller = controller(MockTransport::new());
        assert!(controller.preview().unwrap().is_none());

        controller.select_file(photo());
        let preview = controller.preview().unwrap().unwrap();
        assert!(preview.path().exists());
    }
}
