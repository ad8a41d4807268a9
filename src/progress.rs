//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinners for the stages of a comparison
#[derive(Debug)]
pub struct ProgressReporter {
    pub loading_pb: Option<ProgressBar>,
    pub schema_pb: Option<ProgressBar>,
    pub values_pb: Option<ProgressBar>,
    show_progress: bool,
}

impl ProgressReporter {
    /// Start with the loading spinner; later stages are created on demand
    pub fn new_for_compare(show_progress: bool) -> Self {
        Self {
            loading_pb: show_progress.then(|| create_spinner("Loading tables...")),
            schema_pb: None,
            values_pb: None,
            show_progress,
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self::new_for_compare(false)
    }

    pub fn finish_loading(&mut self, message: &str) {
        if let Some(pb) = self.loading_pb.take() {
            pb.finish_with_message(message.to_string());
        }
        if self.show_progress && self.schema_pb.is_none() {
            self.schema_pb = Some(create_spinner("Comparing schemas..."));
        }
    }

    pub fn finish_schema(&mut self, message: &str) {
        if let Some(pb) = self.schema_pb.take() {
            pb.finish_with_message(message.to_string());
        }
        if self.show_progress && self.values_pb.is_none() {
            self.values_pb = Some(create_spinner("Comparing values..."));
        }
    }

    pub fn finish_values(&mut self, message: &str) {
        if let Some(pb) = self.values_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        for pb in [self.loading_pb.take(), self.schema_pb.take(), self.values_pb.take()]
            .into_iter()
            .flatten()
        {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
