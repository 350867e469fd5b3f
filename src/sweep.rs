// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Periodic removal of aged files from a download directory.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::fs as async_fs;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60);
/// Shortest period between sweeps; smaller values are raised to this.
pub const MIN_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub failed: usize,
}

/// Deletes regular files in `dir` whose age is at least `max_age`.
/// Failures on individual entries are logged and counted; the sweep carries on.
pub async fn sweep_once(dir: &Path, max_age: Duration, now: SystemTime) -> SweepReport {
    let mut report = SweepReport::default();

    let mut entries = match async_fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping sweep of {}: {}", dir.display(), e);
            return report;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read entry in {}: {}", dir.display(), e);
                report.failed += 1;
                break;
            }
        };

        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                warn!("Failed to stat {}: {}", path.display(), e);
                report.failed += 1;
                continue;
            }
        };

        let Ok(modified) = metadata.modified() else {
            continue;
        };
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age < max_age {
            continue;
        }

        match async_fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed {} (age {}s)", path.display(), age.as_secs());
                report.removed += 1;
            }
            Err(e) => {
                warn!("Failed to remove {}: {}", path.display(), e);
                report.failed += 1;
            }
        }
    }

    report
}

#[derive(Debug, Clone)]
pub struct Sweeper {
    pub dir: PathBuf,
    pub max_age: Duration,
    pub period: Duration,
}

impl Sweeper {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_age: DEFAULT_MAX_AGE,
            period: DEFAULT_PERIOD,
        }
    }

    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn period(mut self, period: Duration) -> Self {
        self.period = period.max(MIN_PERIOD);
        self
    }

    pub async fn run_once(&self) -> SweepReport {
        let report = sweep_once(&self.dir, self.max_age, SystemTime::now()).await;
        if report.removed > 0 || report.failed > 0 {
            info!(
                "Swept {}: removed {}, failed {}",
                self.dir.display(),
                report.removed,
                report.failed
            );
        }
        report
    }

    /// Runs a sweep on every tick, the first one immediately. Abort the handle to stop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period.max(MIN_PERIOD));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                self.run_once().await;
            }
        })
    }
}
