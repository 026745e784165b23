use crate::error::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One file to ensure on disk, resolved to a concrete URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub url: String,
    pub file_name: String,
    /// Advisory size in MB, shown to the user and never checked.
    pub size_hint_mb: Option<f64>,
    pub sha256: Option<String>,
}

impl ManifestEntry {
    pub fn new(url: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_name: file_name.into(),
            size_hint_mb: None,
            sha256: None,
        }
    }

    pub fn with_size_hint(mut self, size_mb: f64) -> Self {
        self.size_hint_mb = Some(size_mb);
        self
    }

    pub fn with_sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into());
        self
    }
}

/// A file as written in configuration; `url` may be derived from the set's base URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_hint_mb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// A single archive unpacked into the set directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSpec {
    pub url: String,
    /// Path relative to the set directory whose presence means "installed".
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Drop the archive's top-level directory while extracting.
    #[serde(default, skip_serializing_if = "is_false")]
    pub strip_top_level: bool,
}

fn default_marker() -> String {
    "model".to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ArchiveSpec {
    /// Name of the temporary download, chosen by the URL's archive suffix.
    pub fn temp_file_name(&self) -> &'static str {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            "model.tar.gz"
        } else {
            "model.zip"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetKind {
    Files,
    Archive,
}

impl std::fmt::Display for SetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetKind::Files => write!(f, "files"),
            SetKind::Archive => write!(f, "archive"),
        }
    }
}

/// A named group of artifacts installed into one directory under the models root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSet {
    pub name: String,
    pub dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_url: Option<String>,
    /// Page users can download from by hand when automated fetching fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_invalid_certs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileSpec>,
}

impl ModelSet {
    pub fn kind(&self) -> SetKind {
        if self.archive.is_some() {
            SetKind::Archive
        } else {
            SetKind::Files
        }
    }

    pub fn target_dir(&self, models_root: &Path) -> PathBuf {
        models_root.join(&self.dir)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(FetchError::config_error("Model set name is required"));
        }

        if self.dir.is_empty() {
            return Err(FetchError::config_error(format!(
                "Model set '{}' has no directory",
                self.name
            )));
        }

        match (&self.archive, self.files.is_empty()) {
            (Some(_), false) => {
                return Err(FetchError::config_error(format!(
                    "Model set '{}' lists both an archive and files",
                    self.name
                )))
            }
            (None, true) => {
                return Err(FetchError::config_error(format!(
                    "Model set '{}' lists neither an archive nor files",
                    self.name
                )))
            }
            _ => {}
        }

        if let Some(archive) = &self.archive {
            if archive.url.is_empty() {
                return Err(FetchError::config_error(format!(
                    "Archive of model set '{}' has no URL",
                    self.name
                )));
            }
            if archive.marker.is_empty() {
                return Err(FetchError::config_error(format!(
                    "Archive of model set '{}' has no marker",
                    self.name
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for file in &self.files {
            if !is_plain_file_name(&file.name) {
                return Err(FetchError::config_error(format!(
                    "Invalid file name '{}' in model set '{}'",
                    file.name, self.name
                )));
            }
            if !seen.insert(file.name.as_str()) {
                return Err(FetchError::config_error(format!(
                    "File '{}' is listed twice in model set '{}'",
                    file.name, self.name
                )));
            }
            if file.url.is_none() && self.base_url.is_none() {
                return Err(FetchError::config_error(format!(
                    "File '{}' in model set '{}' has no URL and the set has no base_url",
                    file.name, self.name
                )));
            }
        }

        Ok(())
    }

    /// Resolve the file list into an ordered manifest.
    ///
    /// With `use_mirror`, files without an explicit URL are taken from `mirror_url`
    /// instead of `base_url` when the set defines one.
    pub fn manifest(&self, use_mirror: bool) -> Result<Vec<ManifestEntry>> {
        let base = if use_mirror {
            self.mirror_url.as_ref().or(self.base_url.as_ref())
        } else {
            self.base_url.as_ref()
        };

        self.files
            .iter()
            .map(|file| {
                let url = match (&file.url, base) {
                    (Some(url), _) => url.clone(),
                    (None, Some(base)) => join_url(base, &file.name),
                    (None, None) => {
                        return Err(FetchError::config_error(format!(
                            "File '{}' in model set '{}' has no URL",
                            file.name, self.name
                        )))
                    }
                };
                Ok(ManifestEntry {
                    url,
                    file_name: file.name.clone(),
                    size_hint_mb: file.size_hint_mb,
                    sha256: file.sha256.clone(),
                })
            })
            .collect()
    }

    /// Whether everything this set describes is already on disk.
    pub fn is_complete(&self, models_root: &Path) -> bool {
        let dir = self.target_dir(models_root);
        match &self.archive {
            Some(archive) => dir.join(&archive.marker).exists(),
            None => self.files.iter().all(|f| dir.join(&f.name).exists()),
        }
    }
}

fn join_url(base: &str, file_name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), file_name)
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}
