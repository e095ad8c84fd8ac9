//! Spinner that follows training progress events.

use greenmodel_training::{ProgressEvent, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct SpinnerSink {
    bar: ProgressBar,
}

impl SpinnerSink {
    /// Visible spinner on stderr.
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { bar }
    }

    /// No output; used for JSON mode.
    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    pub fn for_output(json: bool) -> Self {
        if json { Self::hidden() } else { Self::new() }
    }

    /// Stop ticking after a failed run.
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for SpinnerSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { .. } => {
                self.bar.reset();
                self.bar.set_message("Training model and tracking emissions...");
                self.bar.enable_steady_tick(Duration::from_millis(100));
            }
            ProgressEvent::Message { message, .. } => self.bar.set_message(message),
            ProgressEvent::Finished { .. } => self.bar.finish_and_clear(),
        }
    }
}
