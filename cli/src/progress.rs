use crate::ui;
use ocr_client::formatter::format_duration;
use std::time::Instant;

/// A simple step tracker for CLI operations
pub struct ProgressTracker {
    operation_name: String,
    start_time: Instant,
    steps: Vec<String>,
    current_step: usize,
    quiet: bool,
}

impl ProgressTracker {
    /// Create a new progress tracker with the given operation name
    pub fn new(operation_name: &str, quiet: bool) -> Self {
        if !quiet {
            ui::section_header(operation_name);
        }
        Self {
            operation_name: operation_name.to_string(),
            start_time: Instant::now(),
            steps: Vec::new(),
            current_step: 0,
            quiet,
        }
    }

    /// Add steps to the tracker
    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = steps.into_iter().map(Into::into).collect();
        self
    }

    /// Start the next step
    pub fn start_step(&self) {
        if let Some(step) = self.steps.get(self.current_step) {
            if !self.quiet {
                ui::status_message(step);
            }
        }
    }

    /// Complete the current step
    pub fn complete_step(&mut self) {
        if let Some(step) = self.steps.get(self.current_step) {
            if !self.quiet {
                ui::success_message(step);
            }
            self.current_step += 1;
        }
    }

    /// Skip the current step
    pub fn skip_step(&mut self, reason: &str) {
        if let Some(step) = self.steps.get(self.current_step) {
            if !self.quiet {
                ui::warning_message(&format!("Skipped: {step} ({reason})"));
            }
            self.current_step += 1;
        }
    }

    /// Complete the operation
    pub fn complete(&self) {
        if !self.quiet {
            ui::success_message(&format!(
                "{} completed in {}",
                self.operation_name,
                format_duration(self.start_time.elapsed())
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_advance_and_stop_at_end() {
        let mut tracker = ProgressTracker::new("Test", true).with_steps(["one", "two"]);
        tracker.complete_step();
        tracker.skip_step("not needed");
        assert_eq!(tracker.current_step, 2);

        tracker.complete_step();
        assert_eq!(tracker.current_step, 2);
    }
}
