use crate::core::archive::{install_archive, InstallOutcome};
use crate::core::config::Config;
use crate::core::download::Downloader;
use crate::core::fetcher::{fetch_all, FetchReport};
use crate::core::manifest::{ModelSet, SetKind};
use crate::core::progress::{ConsoleReporter, Reporter};
use crate::core::transport::{HttpTransport, Transport};
use crate::error::{FetchError, Result};
use crate::utils::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub sets: Vec<String>,
    pub all: bool,
    pub root: Option<PathBuf>,
    pub insecure: bool,
    pub mirror: bool,
    pub timeout_secs: Option<u64>,
}

pub fn fetch_sets(config: &Config, options: &FetchOptions) -> Result<()> {
    let selected = select_sets(config, &options.sets, options.all)?;
    let root = options
        .root
        .clone()
        .unwrap_or_else(|| config.models_root.clone());
    let reporter = ConsoleReporter::new();

    for set in selected {
        let mut client = config.client_options(set);
        if options.insecure {
            client.accept_invalid_certs = true;
        }
        if let Some(secs) = options.timeout_secs {
            client.timeout = Duration::from_secs(secs);
        }

        let downloader =
            Downloader::new(HttpTransport::new(&client)?).with_progress_step(config.progress_step);

        match set.kind() {
            SetKind::Files => {
                run_files_set(&downloader, set, &root, options.mirror, &reporter)?;
            }
            SetKind::Archive => run_archive_set(&downloader, set, &root, &reporter),
        }
    }

    Ok(())
}

/// Sets to run, in configuration order when `all` is given, otherwise in the
/// order they were named.
pub fn select_sets<'a>(config: &'a Config, names: &[String], all: bool) -> Result<Vec<&'a ModelSet>> {
    if all {
        return Ok(config.sets.iter().collect());
    }

    if names.is_empty() {
        return Err(FetchError::config_error(
            "No model set given. Name one or more sets, or pass --all (see `mtfetch list`)",
        ));
    }

    names.iter().map(|name| config.find_set(name)).collect()
}

pub fn run_files_set<T: Transport>(
    downloader: &Downloader<T>,
    set: &ModelSet,
    root: &Path,
    use_mirror: bool,
    reporter: &dyn Reporter,
) -> Result<FetchReport> {
    let target_dir = set.target_dir(root);
    let manifest = set.manifest(use_mirror)?;

    print_banner(set);
    fs::ensure_dir_exists(&target_dir)?;
    println!("Target directory: {}", fs::display_path(&target_dir).display());
    println!();

    let report = fetch_all(downloader, &target_dir, &manifest, reporter)?;

    println!();
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Downloaded: {}/{} files", report.succeeded(), report.total());
    if report.all_ok() {
        println!("All files downloaded successfully!");
    }
    println!("{}", "=".repeat(RULE_WIDTH));

    println!();
    println!("Files on disk:");
    for entry in &report.entries {
        if let Some(bytes) = fs::file_size(&entry.path) {
            println!("  {}: {:.2} MB", entry.file_name, fs::bytes_to_mb(bytes));
        }
    }

    if !report.all_ok() {
        println!();
        for line in manual_download_lines(set, &report) {
            println!("{line}");
        }
    }

    Ok(report)
}

/// Install an archive set. Failures are printed together with manual
/// download instructions and never returned.
pub fn run_archive_set<T: Transport>(
    downloader: &Downloader<T>,
    set: &ModelSet,
    root: &Path,
    reporter: &dyn Reporter,
) {
    let Some(archive) = &set.archive else {
        return;
    };
    let target_dir = set.target_dir(root);

    print_banner(set);
    println!("URL: {}", archive.url);

    match install_archive(downloader, &target_dir, archive, reporter) {
        Ok(InstallOutcome::AlreadyInstalled) => {
            println!("✓ {} is already installed", set.name);
        }
        Ok(InstallOutcome::Installed { archive_bytes }) => {
            println!(
                "✓ {} installed ({:.2} MB archive)",
                set.name,
                fs::bytes_to_mb(archive_bytes)
            );
        }
        Err(e) => {
            println!();
            println!("✗ Error: {e}");
            println!();
            println!("Please download it manually:");
            println!("  {}", archive.url);
            println!(
                "and extract it into: {}",
                fs::display_path(&target_dir).display()
            );
        }
    }
}

/// Instructions for finishing a partially failed file set by hand.
pub fn manual_download_lines(set: &ModelSet, report: &FetchReport) -> Vec<String> {
    let mut lines = vec!["Some files failed. Download them manually:".to_string()];
    for entry in report.failures() {
        lines.push(format!("  {}", entry.url));
        lines.push(format!("    -> {}", fs::display_path(&entry.path).display()));
    }
    if let Some(page) = &set.manual_url {
        lines.push(format!("Or browse the model files at: {page}"));
    }
    lines
}

fn print_banner(set: &ModelSet) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", set.description.as_deref().unwrap_or(&set.name));
    println!("{}", "=".repeat(RULE_WIDTH));
}
