use crate::core::download::Downloader;
use crate::core::manifest::ArchiveSpec;
use crate::core::progress::{ProgressEvent, Reporter};
use crate::core::transport::Transport;
use crate::error::Result;
use crate::utils::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum InstallOutcome {
    AlreadyInstalled,
    Installed { archive_bytes: u64 },
}

/// Download `archive` into `target_dir`, unpack it there and remove the
/// downloaded file.
///
/// Skips everything when `target_dir/<marker>` exists. An error leaves the
/// directory as it was when the failure happened; extracted members are not
/// rolled back.
pub fn install_archive<T: Transport>(
    downloader: &Downloader<T>,
    target_dir: &Path,
    archive: &ArchiveSpec,
    reporter: &dyn Reporter,
) -> Result<InstallOutcome> {
    let marker = target_dir.join(&archive.marker);
    if marker.exists() {
        debug!("{} exists, skipping install", marker.display());
        return Ok(InstallOutcome::AlreadyInstalled);
    }

    fs::ensure_dir_exists(target_dir)?;

    let file_name = archive.temp_file_name();
    let archive_path = target_dir.join(file_name);

    reporter.report(ProgressEvent::EntryStarted {
        name: file_name.to_string(),
        size_hint_mb: None,
    });
    let archive_bytes = downloader.download_file(&archive.url, &archive_path, file_name, reporter)?;

    reporter.report(ProgressEvent::Extracting {
        archive: archive_path.clone(),
    });
    downloader.extract_archive(&archive_path, target_dir, archive.strip_top_level)?;

    std::fs::remove_file(&archive_path)?;

    reporter.report(ProgressEvent::Installed {
        target_dir: target_dir.to_path_buf(),
    });
    Ok(InstallOutcome::Installed { archive_bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::CollectingReporter;
    use crate::core::testing::{zip_bytes, MockResponse, MockTransport};
    use crate::error::FetchError;
    use tempfile::TempDir;

    const URL: &str = "https://packages.example/translate-en_zh-1_9.zip";

    fn package_spec() -> ArchiveSpec {
        ArchiveSpec {
            url: URL.to_string(),
            marker: "model".to_string(),
            strip_top_level: false,
        }
    }

    fn package() -> Vec<u8> {
        zip_bytes(&[
            ("model/", ""),
            ("model/model.bin", "weights"),
            ("metadata.json", "{\"from\":\"en\",\"to\":\"zh\"}"),
        ])
    }

    #[test]
    fn test_install_extracts_and_removes_archive() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("argos-translate");
        let downloader = Downloader::new(MockTransport::new().ok(URL, &package()));
        let reporter = CollectingReporter::new();

        let outcome = install_archive(&downloader, &target, &package_spec(), &reporter).unwrap();

        assert!(matches!(outcome, InstallOutcome::Installed { .. }));
        assert_eq!(std::fs::read(target.join("model/model.bin")).unwrap(), b"weights");
        assert!(target.join("metadata.json").exists());
        assert!(!target.join("model.zip").exists());
        assert!(matches!(
            reporter.events().last(),
            Some(ProgressEvent::Installed { .. })
        ));
    }

    #[test]
    fn test_second_install_skips_network() {
        let temp = TempDir::new().unwrap();
        let downloader = Downloader::new(MockTransport::new().ok(URL, &package()));

        let first = install_archive(&downloader, temp.path(), &package_spec(), &CollectingReporter::new()).unwrap();
        let second = install_archive(&downloader, temp.path(), &package_spec(), &CollectingReporter::new()).unwrap();

        assert!(matches!(first, InstallOutcome::Installed { .. }));
        assert_eq!(second, InstallOutcome::AlreadyInstalled);
        assert_eq!(downloader.transport().request_count(), 1);
    }

    #[test]
    fn test_strip_top_level_reaches_marker() {
        let temp = TempDir::new().unwrap();
        let bytes = zip_bytes(&[("pkg/model/model.bin", "w"), ("pkg/sentencepiece.model", "s")]);
        let downloader = Downloader::new(MockTransport::new().ok(URL, &bytes));
        let stripped = ArchiveSpec {
            strip_top_level: true,
            ..package_spec()
        };

        install_archive(&downloader, temp.path(), &stripped, &CollectingReporter::new()).unwrap();
        assert!(temp.path().join("model").is_dir());

        let again = install_archive(&downloader, temp.path(), &stripped, &CollectingReporter::new()).unwrap();
        assert_eq!(again, InstallOutcome::AlreadyInstalled);
    }

    #[test]
    fn test_download_failure_is_returned() {
        let temp = TempDir::new().unwrap();
        let downloader = Downloader::new(MockTransport::new().with(URL, MockResponse::Status(403)));

        let result = install_archive(&downloader, temp.path(), &package_spec(), &CollectingReporter::new());

        assert!(matches!(result, Err(FetchError::Http { status: 403, .. })));
        assert!(!temp.path().join("model").exists());
        assert!(!temp.path().join("model.zip").exists());
    }

    #[test]
    fn test_corrupt_archive_is_left_in_place() {
        let temp = TempDir::new().unwrap();
        let downloader = Downloader::new(MockTransport::new().ok(URL, b"definitely not a zip"));

        let result = install_archive(&downloader, temp.path(), &package_spec(), &CollectingReporter::new());

        assert!(matches!(result, Err(FetchError::Extraction { .. })));
        // no rollback: the downloaded file stays for inspection
        assert!(temp.path().join("model.zip").exists());
        assert!(!temp.path().join("model").exists());
    }
}
