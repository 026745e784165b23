//! Progress reporting for downloads and installs.
//!
//! The fetcher never prints. It hands [`ProgressEvent`]s to a [`Reporter`];
//! the CLI renders them with [`ConsoleReporter`] and tests collect them with
//! [`CollectingReporter`].

use crate::utils::fs::bytes_to_mb;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// File already on disk; nothing was requested.
    EntryPresent { name: String, bytes: u64 },
    EntryStarted {
        name: String,
        size_hint_mb: Option<f64>,
    },
    Percent { name: String, percent: u8 },
    EntryFetched { name: String, bytes: u64 },
    EntryFailed { name: String, error: String },
    Extracting { archive: PathBuf },
    Installed { target_dir: PathBuf },
}

pub trait Reporter {
    fn report(&self, event: ProgressEvent);
}

impl<F> Reporter for F
where
    F: Fn(ProgressEvent),
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Reporter that drops every event.
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report(&self, _event: ProgressEvent) {}
}

/// Samples a byte count into coarse percentages.
///
/// A value is emitted only when progress reaches a new multiple of `step`;
/// 100 is always emitted once the total is reached. Without a known total
/// nothing is emitted.
#[derive(Debug)]
pub struct PercentTracker {
    total: Option<u64>,
    step: u8,
    last: Option<u8>,
}

impl PercentTracker {
    pub fn new(total: Option<u64>, step: u8) -> Self {
        Self {
            total: total.filter(|t| *t > 0),
            step: step.clamp(1, 100),
            last: None,
        }
    }

    pub fn update(&mut self, downloaded: u64) -> Option<u8> {
        let total = self.total?;
        let percent = (downloaded.saturating_mul(100) / total).min(100) as u8;
        let bucket = if percent >= 100 {
            100
        } else {
            percent - percent % self.step
        };

        match self.last {
            Some(last) if bucket <= last => None,
            _ => {
                self.last = Some(bucket);
                Some(bucket)
            }
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Percentages reported for `name`, in order.
    pub fn percents(&self, name: &str) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Percent { name: n, percent } if n == name => Some(percent),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Renders events on stdout with a per-file progress bar.
#[derive(Default)]
pub struct ConsoleReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_percent(&self, percent: u8) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        let bar = slot.get_or_insert_with(|| {
            let bar = ProgressBar::new(100);
            let style = ProgressStyle::with_template("  {bar:40.cyan/blue} {pos:>3}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar
        });
        bar.set_position(u64::from(percent));
    }

    fn clear_bar(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::EntryPresent { name, bytes } => {
                println!("✓ {name} already exists ({:.2} MB)", bytes_to_mb(bytes));
            }
            ProgressEvent::EntryStarted { name, size_hint_mb } => match size_hint_mb {
                Some(hint) => println!("⬇ Downloading {name} (about {hint} MB)..."),
                None => println!("⬇ Downloading {name}..."),
            },
            ProgressEvent::Percent { percent, .. } => self.set_percent(percent),
            ProgressEvent::EntryFetched { bytes, .. } => {
                self.clear_bar();
                println!("✓ Done: {:.2} MB", bytes_to_mb(bytes));
            }
            ProgressEvent::EntryFailed { name, error } => {
                self.clear_bar();
                println!("✗ {name} failed: {error}");
            }
            ProgressEvent::Extracting { archive } => {
                self.clear_bar();
                println!("Download complete, extracting {}...", archive.display());
            }
            ProgressEvent::Installed { target_dir } => {
                println!("✅ Installed into {}", target_dir.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tracker_emits_each_step_once() {
        let mut tracker = PercentTracker::new(Some(1000), 10);
        let emitted: Vec<u8> = [0, 50, 99, 100, 150, 420, 999, 1000]
            .iter()
            .filter_map(|d| tracker.update(*d))
            .collect();
        assert_eq!(emitted, vec![0, 10, 40, 90, 100]);
    }

    #[test]
    fn test_tracker_always_reaches_100_with_odd_step() {
        let mut tracker = PercentTracker::new(Some(100), 30);
        let emitted: Vec<u8> = (0..=100).filter_map(|d| tracker.update(d)).collect();
        assert_eq!(emitted, vec![0, 30, 60, 90, 100]);
    }

    #[test]
    fn test_tracker_without_total_is_silent() {
        let mut tracker = PercentTracker::new(None, 10);
        assert_eq!(tracker.update(12345), None);

        let mut zero = PercentTracker::new(Some(0), 10);
        assert_eq!(zero.update(0), None);
    }

    #[test]
    fn test_tracker_caps_overshoot() {
        let mut tracker = PercentTracker::new(Some(10), 10);
        assert_eq!(tracker.update(25), Some(100));
        assert_eq!(tracker.update(30), None);
    }

    #[test]
    fn test_closure_reporter() {
        let seen = Mutex::new(Vec::new());
        let reporter = |event: ProgressEvent| seen.lock().unwrap().push(event);
        reporter.report(ProgressEvent::Percent {
            name: "model.onnx".to_string(),
            percent: 40,
        });
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_collecting_reporter_percents() {
        let reporter = CollectingReporter::new();
        for (name, percent) in [("a", 0), ("b", 10), ("a", 50)] {
            reporter.report(ProgressEvent::Percent {
                name: name.to_string(),
                percent,
            });
        }
        assert_eq!(reporter.percents("a"), vec![0, 50]);
    }
}
