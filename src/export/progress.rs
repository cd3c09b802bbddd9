//! Progress tracking for export runs
//!
//! Draws an optional progress bar on stderr while batches arrive. The bar
//! starts as a spinner and switches to a bounded bar once the cluster has
//! reported a total hit count.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress tracker for export runs
pub struct ProgressTracker {
    /// Start time of the operation
    start_time: Instant,
    /// Progress bar (optional, can be disabled)
    bar: Option<ProgressBar>,
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {pos} records {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `total` - Total number of records if known (None for unknown)
    /// * `enable_bar` - Whether to display a progress bar
    pub fn new(total: Option<u64>, enable_bar: bool) -> Self {
        let bar = enable_bar.then(|| match total {
            Some(n) => {
                let bar = ProgressBar::new(n);
                bar.set_style(bar_style());
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(spinner_style());
                bar
            }
        });

        Self {
            start_time: Instant::now(),
            bar,
        }
    }

    /// Switch to a bounded bar once the total is known
    pub fn set_total(&self, total: u64) {
        if let Some(ref bar) = self.bar {
            bar.set_length(total);
            bar.set_style(bar_style());
        }
    }

    /// Update progress with new count
    ///
    /// # Arguments
    /// * `count` - Total number of records retrieved so far
    pub fn update(&self, count: u64) {
        if let Some(ref bar) = self.bar {
            bar.set_position(count);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = count as f64 / elapsed;
                bar.set_message(format!("({:.0} records/sec)", speed));
            }
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
