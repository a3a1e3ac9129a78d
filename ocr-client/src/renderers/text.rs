//! Plain text renderer

use super::OutputRenderer;
use crate::types::OcrResultSet;

/// Emits only the concatenated text, suitable for piping
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl OutputRenderer for TextRenderer {
    fn render(&self, results: &OcrResultSet) -> String {
        results.concatenated_text.clone()
    }
}
