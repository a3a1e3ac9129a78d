//! Error classification - pure business logic only
//!
//! Maps free-text failure messages onto a small set of user-facing
//! categories with suggested remedies, without any presentation concerns.

pub mod error_classifier;

pub use error_classifier::{classify, ErrorClassifier, ErrorClassifierImpl};
