//! Terminal renderer: summary, extracted text and the block table

use super::{OutputRenderer, TableBuilder};
use crate::formatter::format_confidence;
use crate::types::OcrResultSet;
use std::fmt::Write;

/// CLI renderer for a finished recognition
pub struct CliRenderer {
    /// Include the concatenated text section
    pub include_text: bool,
    /// Include the per-block table
    pub include_table: bool,
    /// Color confidence cells
    pub colored: bool,
}

impl CliRenderer {
    /// Summary plus extracted text
    pub fn new() -> Self {
        Self {
            include_text: true,
            include_table: false,
            colored: true,
        }
    }

    /// Summary plus the block table
    pub fn table() -> Self {
        Self {
            include_text: false,
            include_table: true,
            colored: true,
        }
    }

    #[must_use]
    pub fn with_colors(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// One-line stats, e.g. `3 Text Blocks · 34 Characters · 1024 × 768 px`
    pub fn format_stats(&self, results: &OcrResultSet) -> String {
        let mut parts = vec![
            format!("{} Text Blocks", results.block_count()),
            format!("{} Characters", results.character_count()),
        ];
        if results.image_info.width > 0 && results.image_info.height > 0 {
            parts.push(format!(
                "{} × {} px",
                results.image_info.width, results.image_info.height
            ));
        }
        if let Some(average) = results.average_confidence() {
            parts.push(format!("Avg confidence {}", format_confidence(average)));
        }
        if let Some(seconds) = results.processing_time_seconds {
            parts.push(format!("Processed in {seconds:.2}s"));
        }
        parts.join(" · ")
    }

    fn format_text(&self, results: &OcrResultSet) -> String {
        if results.has_text() {
            results.concatenated_text.clone()
        } else {
            "No text extracted".to_string()
        }
    }
}

impl Default for CliRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputRenderer for CliRenderer {
    fn render(&self, results: &OcrResultSet) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "Successfully extracted {} text element(s) from the image!",
            results.block_count()
        );
        let _ = writeln!(output, "{}", self.format_stats(results));

        if self.include_text {
            let _ = writeln!(output, "\nExtracted Text\n{}", "─".repeat(14));
            let _ = writeln!(output, "{}", self.format_text(results));
        }

        if self.include_table && !results.blocks.is_empty() {
            let mut table = TableBuilder::new();
            if !self.colored {
                table = table.plain();
            }
            let _ = writeln!(
                output,
                "\nDetailed Results ({} items)",
                results.block_count()
            );
            let _ = writeln!(output, "{}", table.blocks(&results.blocks).build());
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_helpers;

    #[test]
    fn test_summary_output() {
        let results = test_helpers::receipt_results();
        let output = CliRenderer::new().with_colors(false).render(&results);

        assert!(output.contains("Successfully extracted 3 text element(s)"));
        assert!(output.contains("3 Text Blocks"));
        assert!(output.contains("1024 × 768 px"));
        assert!(output.contains("Processed in 1.20s"));
        assert!(output.contains("Extracted Text"));
        assert!(output.contains("Total: 12.50"));
        assert!(!output.contains("Detailed Results"));
    }

    #[test]
    fn test_table_output() {
        let results = test_helpers::receipt_results();
        let output = CliRenderer::table().with_colors(false).render(&results);

        assert!(output.contains("Detailed Results (3 items)"));
        assert!(output.contains("60.0%"));
        assert!(!output.contains("Extracted Text"));
    }

    #[test]
    fn test_empty_results() {
        let output = CliRenderer::new().render(&OcrResultSet::default());
        assert!(output.contains("0 Text Blocks"));
        assert!(output.contains("No text extracted"));
        assert!(!output.contains("Avg confidence"));
    }

    #[test]
    fn test_stats_average_confidence() {
        let results = test_helpers::receipt_results();
        let stats = CliRenderer::new().format_stats(&results);
        assert!(stats.contains("Avg confidence 84.7%"), "{stats}");
    }
}
