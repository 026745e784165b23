use crate::core::manifest::ModelSet;
use crate::core::presets;
use crate::core::transport::ClientOptions;
use crate::error::{FetchError, Result};
use crate::utils::fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "mtfetch.toml";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_PROGRESS_STEP: u8 = 10;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub models_root: PathBuf,
    pub timeout_secs: u64,
    pub progress_step: u8,
    pub accept_invalid_certs: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default = "presets::builtin_sets")]
    pub sets: Vec<ModelSet>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            models_root: PathBuf::from("Models"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            progress_step: DEFAULT_PROGRESS_STEP,
            accept_invalid_certs: false,
            user_agent: None,
            sets: presets::builtin_sets(),
        }
    }
}

impl Config {
    /// Load configuration from `explicit`, or from the first config file found
    /// in the working directory or the user config directory, or fall back to
    /// the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(FetchError::config_error(format!(
                    "Config file {} does not exist",
                    path.display()
                )));
            }
            return Self::load_from(path);
        }

        for candidate in default_config_paths() {
            if candidate.exists() {
                return Self::load_from(&candidate);
            }
        }

        debug!("no config file found, using built-in model sets");
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::ensure_dir_exists(parent)?;
            }
        }

        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_step == 0 || self.progress_step > 100 {
            return Err(FetchError::config_error(
                "progress_step must be between 1 and 100",
            ));
        }

        if self.timeout_secs == 0 {
            return Err(FetchError::config_error("timeout_secs must be positive"));
        }

        let mut names = std::collections::HashSet::new();
        for set in &self.sets {
            set.validate()?;
            if !names.insert(set.name.as_str()) {
                return Err(FetchError::config_error(format!(
                    "Model set '{}' is defined twice",
                    set.name
                )));
            }
        }

        Ok(())
    }

    pub fn find_set(&self, name: &str) -> Result<&ModelSet> {
        self.sets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| FetchError::UnknownSet {
                name: name.to_string(),
            })
    }

    /// HTTP client options for `set`: per-set values win over global ones.
    pub fn client_options(&self, set: &ModelSet) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(set.timeout_secs.unwrap_or(self.timeout_secs)),
            user_agent: set
                .user_agent
                .clone()
                .or_else(|| self.user_agent.clone())
                .unwrap_or_else(default_user_agent),
            accept_invalid_certs: set
                .accept_invalid_certs
                .unwrap_or(self.accept_invalid_certs),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("mtfetch/{}", env!("CARGO_PKG_VERSION"))
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("mtfetch").join("config.toml"));
    }
    paths
}
