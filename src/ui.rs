//! Progress reporting for the demo binaries.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Spinner that tracks a pipeline run on a TTY; silent otherwise (the log
/// lines already cover non-interactive use).
pub struct Progress {
    label: &'static str,
    bar: Option<ProgressBar>,
}

impl Progress {
    pub fn for_run(label: &'static str) -> Self {
        if !std::io::stderr().is_terminal() {
            return Self { label, bar: None };
        }
        let bar = ProgressBar::new_spinner();
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.enable_steady_tick(Duration::from_millis(120));
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(format!("{label}…"));
        Self {
            label,
            bar: Some(bar),
        }
    }

    pub fn tick(&self, frames: u64, matches: u64) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!(
                "{}: {} frames, {} matched",
                self.label, frames, matches
            ));
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
