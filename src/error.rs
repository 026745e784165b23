use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Could not serialize configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unknown model set '{name}'")]
    UnknownSet { name: String },

    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    #[error("Download from {url} ended early: received {received} of {expected} bytes")]
    Incomplete {
        url: String,
        expected: u64,
        received: u64,
    },

    #[error("Extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },
}

impl FetchError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        FetchError::Config {
            message: message.into(),
        }
    }

    pub fn network_error<S: Into<String>>(url: &str, message: S) -> Self {
        FetchError::Network {
            url: url.to_string(),
            message: message.into(),
        }
    }
}
