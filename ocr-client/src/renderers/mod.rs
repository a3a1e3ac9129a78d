//! Result renderers for different output formats
//!
//! Renderers read a finished [`OcrResultSet`] and produce a string; they
//! never touch workflow state.

use crate::types::OcrResultSet;

/// Simple trait for rendering a result set in a specific format
pub trait OutputRenderer {
    fn render(&self, results: &OcrResultSet) -> String;
}

pub mod cli;
pub mod error_renderer;
pub mod json;
pub mod table;
pub mod text;

pub use cli::CliRenderer;
pub use error_renderer::ErrorRenderer;
pub use json::JsonRenderer;
pub use table::TableBuilder;
pub use text::TextRenderer;
