//! Batch fetching of a file manifest into one directory.
//!
//! Every entry is handled on its own: a file that is already present is left
//! alone, a missing one is downloaded, and a failure is recorded without
//! stopping the rest of the batch.

use crate::core::download::Downloader;
use crate::core::manifest::ManifestEntry;
use crate::core::progress::{ProgressEvent, Reporter};
use crate::core::transport::Transport;
use crate::core::verify;
use crate::error::Result;
use crate::utils::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PARTIAL_SUFFIX: &str = ".part";

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    AlreadyPresent { bytes: u64 },
    Fetched { bytes: u64 },
    Failed { error: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryReport {
    pub file_name: String,
    pub url: String,
    pub path: PathBuf,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    pub entries: Vec<EntryReport>,
}

impl FetchReport {
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_success()).count()
    }

    pub fn all_ok(&self) -> bool {
        self.succeeded() == self.total()
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| !e.outcome.is_success())
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.entries.iter().map(|e| e.outcome.clone()).collect()
    }
}

/// Ensure every manifest entry exists under `target_dir`.
///
/// Only failing to create `target_dir` is returned as an error; per-file
/// problems end up as [`Outcome::Failed`] in the report.
pub fn fetch_all<T: Transport>(
    downloader: &Downloader<T>,
    target_dir: &Path,
    manifest: &[ManifestEntry],
    reporter: &dyn Reporter,
) -> Result<FetchReport> {
    fs::ensure_dir_exists(target_dir)?;

    let mut report = FetchReport::default();
    for entry in manifest {
        let path = target_dir.join(&entry.file_name);
        let outcome = fetch_one(downloader, entry, &path, reporter);
        report.entries.push(EntryReport {
            file_name: entry.file_name.clone(),
            url: entry.url.clone(),
            path,
            outcome,
        });
    }

    debug!(
        "fetched {}/{} entries into {}",
        report.succeeded(),
        report.total(),
        target_dir.display()
    );
    Ok(report)
}

fn fetch_one<T: Transport>(
    downloader: &Downloader<T>,
    entry: &ManifestEntry,
    path: &Path,
    reporter: &dyn Reporter,
) -> Outcome {
    let name = entry.file_name.clone();

    if path.exists() {
        let bytes = fs::file_size(path).unwrap_or(0);
        reporter.report(ProgressEvent::EntryPresent { name, bytes });
        return Outcome::AlreadyPresent { bytes };
    }

    reporter.report(ProgressEvent::EntryStarted {
        name: name.clone(),
        size_hint_mb: entry.size_hint_mb,
    });

    let partial = partial_path(path);
    match download_verified(downloader, entry, &partial, path, reporter) {
        Ok(bytes) => {
            reporter.report(ProgressEvent::EntryFetched { name, bytes });
            Outcome::Fetched { bytes }
        }
        Err(e) => {
            warn!("{} failed: {e}", entry.url);
            fs::remove_file_quietly(&partial);
            let error = e.to_string();
            reporter.report(ProgressEvent::EntryFailed {
                name,
                error: error.clone(),
            });
            Outcome::Failed { error }
        }
    }
}

fn download_verified<T: Transport>(
    downloader: &Downloader<T>,
    entry: &ManifestEntry,
    partial: &Path,
    path: &Path,
    reporter: &dyn Reporter,
) -> Result<u64> {
    let bytes = downloader.download_file(&entry.url, partial, &entry.file_name, reporter)?;

    if let Some(expected) = &entry.sha256 {
        verify::verify_sha256(partial, expected)?;
    }

    std::fs::rename(partial, path)?;
    Ok(bytes)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}
