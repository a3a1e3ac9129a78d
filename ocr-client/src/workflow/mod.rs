//! The upload workflow state machine
//!
//! One [`WorkflowPhase`] value holds both the phase and its payload, so a
//! result can only exist in `Succeeded` and an error only in `Failed`.
//! Every transition is a single atomic update of that value, observable
//! through [`WorkflowController::subscribe`].

pub mod controller;
pub mod phase;

pub use controller::{ProcessOutcome, SelectOutcome, TransitionOutcome, WorkflowController};
pub use phase::WorkflowPhase;
