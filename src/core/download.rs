use crate::core::progress::{PercentTracker, ProgressEvent, Reporter};
use crate::core::transport::Transport;
use crate::error::{FetchError, Result};
use crate::utils::fs;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::{debug, warn};
use zip::ZipArchive;

const CHUNK_SIZE: usize = 64 * 1024;

pub struct Downloader<T: Transport> {
    transport: T,
    progress_step: u8,
}

impl<T: Transport> Downloader<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            progress_step: crate::core::config::DEFAULT_PROGRESS_STEP,
        }
    }

    pub fn with_progress_step(mut self, step: u8) -> Self {
        self.progress_step = step.clamp(1, 100);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Stream `url` into `destination`, reporting sampled percentages under `name`.
    ///
    /// Returns the number of bytes written. On any error the partially written
    /// file is removed before returning.
    pub fn download_file(
        &self,
        url: &str,
        destination: &Path,
        name: &str,
        reporter: &dyn Reporter,
    ) -> Result<u64> {
        let result = self.stream_to(url, destination, name, reporter);
        if result.is_err() {
            fs::remove_file_quietly(destination);
        }
        result
    }

    fn stream_to(
        &self,
        url: &str,
        destination: &Path,
        name: &str,
        reporter: &dyn Reporter,
    ) -> Result<u64> {
        if let Some(parent) = destination.parent() {
            fs::ensure_dir_exists(parent)?;
        }

        let body = self.transport.get(url)?;
        let expected = body.content_length;
        let mut reader = body.reader;
        let mut tracker = PercentTracker::new(expected, self.progress_step);

        let mut file = File::create(destination)?;
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut downloaded: u64 = 0;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(FetchError::network_error(url, e.to_string())),
            };

            file.write_all(&buffer[..n])?;
            downloaded += n as u64;

            if let Some(percent) = tracker.update(downloaded) {
                reporter.report(ProgressEvent::Percent {
                    name: name.to_string(),
                    percent,
                });
            }
        }

        file.flush()?;

        if let Some(expected) = expected {
            if downloaded < expected {
                return Err(FetchError::Incomplete {
                    url: url.to_string(),
                    expected,
                    received: downloaded,
                });
            }
        }

        debug!("wrote {downloaded} bytes to {}", destination.display());
        Ok(downloaded)
    }

    /// Unpack a `.zip`, `.tar.gz` or `.tgz` archive into `destination`.
    ///
    /// With `strip_top_level`, the first path component of every member is
    /// dropped, so `pkg/model/x` lands at `destination/model/x`.
    pub fn extract_archive(
        &self,
        archive_path: &Path,
        destination: &Path,
        strip_top_level: bool,
    ) -> Result<()> {
        debug!(
            "extracting {} to {}",
            archive_path.display(),
            destination.display()
        );

        fs::ensure_dir_exists(destination)?;

        let file_name = archive_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| FetchError::Extraction {
                path: archive_path.to_path_buf(),
                message: "invalid archive file name".to_string(),
            })?;

        let strip = usize::from(strip_top_level);
        let result = if file_name.ends_with(".tar.gz") || file_name.ends_with(".tgz") {
            self.extract_tar_gz(archive_path, destination, strip)
        } else if file_name.ends_with(".zip") {
            self.extract_zip(archive_path, destination, strip)
        } else {
            return Err(FetchError::Extraction {
                path: archive_path.to_path_buf(),
                message: format!("unsupported archive format: {file_name}"),
            });
        };

        result.map_err(|e| match e {
            FetchError::Extraction { .. } => e,
            other => FetchError::Extraction {
                path: archive_path.to_path_buf(),
                message: other.to_string(),
            },
        })
    }

    fn extract_tar_gz(&self, archive_path: &Path, destination: &Path, strip: usize) -> Result<()> {
        let file = File::open(archive_path)?;
        let decoder = GzDecoder::new(file);
        let mut archive = Archive::new(decoder);

        if strip == 0 {
            archive.unpack(destination)?;
            return Ok(());
        }

        let root = destination.canonicalize()?;
        for entry in archive.entries()? {
            let mut entry = entry?;
            let raw = entry.path()?.into_owned();

            let kind = entry.header().entry_type();
            if kind.is_symlink() || kind.is_hard_link() {
                warn!("skipping link member {}", raw.display());
                continue;
            }

            let Some(relative) = sanitize_member_path(&raw, strip) else {
                continue;
            };
            let outpath = destination.join(relative);
            if let Some(parent) = outpath.parent() {
                fs::ensure_dir_exists(parent)?;
                if !parent.canonicalize()?.starts_with(&root) {
                    return Err(FetchError::Extraction {
                        path: archive_path.to_path_buf(),
                        message: format!("member {} escapes the destination", raw.display()),
                    });
                }
            }
            entry.unpack(&outpath)?;
        }
        Ok(())
    }

    fn extract_zip(&self, archive_path: &Path, destination: &Path, strip: usize) -> Result<()> {
        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(file).map_err(|e| zip_error(archive_path, e))?;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(|e| zip_error(archive_path, e))?;
            let outpath = match file
                .enclosed_name()
                .and_then(|path| sanitize_member_path(&path, strip))
            {
                Some(path) => destination.join(path),
                None => continue,
            };

            if file.is_dir() {
                fs::ensure_dir_exists(&outpath)?;
            } else {
                if let Some(p) = outpath.parent() {
                    fs::ensure_dir_exists(p)?;
                }
                let mut outfile = File::create(&outpath)?;
                std::io::copy(&mut file, &mut outfile)?;
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = file.unix_mode() {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
                }
            }
        }
        Ok(())
    }
}

fn zip_error(path: &Path, error: zip::result::ZipError) -> FetchError {
    FetchError::Extraction {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Relative path of an archive member after dropping `strip` leading
/// components. `None` for members that would escape the destination or
/// that are consumed entirely by stripping.
fn sanitize_member_path(path: &Path, strip: usize) -> Option<PathBuf> {
    let mut normal = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normal.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    let kept: PathBuf = normal.into_iter().skip(strip).collect();
    if kept.as_os_str().is_empty() {
        None
    } else {
        Some(kept)
    }
}
