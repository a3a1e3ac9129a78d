//! Presentation of classified workflow errors

use crate::types::{ErrorCategory, WorkflowError};
use std::fmt::Write;

/// Renderer for a [`WorkflowError`]: title, raw message, suggestions
pub struct ErrorRenderer {
    /// Whether to include emoji icons in output
    pub use_emojis: bool,
}

impl ErrorRenderer {
    pub fn new() -> Self {
        Self { use_emojis: true }
    }

    /// Create an error renderer without emojis (for logs, plain text)
    pub fn without_emojis() -> Self {
        Self { use_emojis: false }
    }

    pub fn render(&self, error: &WorkflowError) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "{}{}", self.icon(error.category), error.title());
        let _ = writeln!(output, "{}", error.raw_message);

        if let Some(status) = error.status_code() {
            let _ = writeln!(output, "HTTP status: {status}");
        }
        if let Some(details) = &error.details {
            let _ = writeln!(output, "Details: {details}");
        }

        if !error.suggestions.is_empty() {
            let _ = writeln!(output, "\nSuggestions:");
            for suggestion in &error.suggestions {
                let _ = writeln!(output, "  • {suggestion}");
            }
        }

        output
    }

    fn icon(&self, category: ErrorCategory) -> &'static str {
        if !self.use_emojis {
            return "";
        }
        match category {
            ErrorCategory::Network => "📡 ",
            ErrorCategory::Timeout => "⏱️  ",
            ErrorCategory::FileSize | ErrorCategory::FileType => "💾 ",
            ErrorCategory::Server | ErrorCategory::Unknown => "❌ ",
        }
    }
}

impl Default for ErrorRenderer {
    fn default() -> Self {
        Self::new()
    }
}
