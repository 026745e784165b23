use crate::error::{FetchError, Result};
use std::io::Read;
use std::time::Duration;
use tracing::debug;

/// Body of a successful GET, read sequentially.
pub struct RemoteBody {
    pub content_length: Option<u64>,
    pub reader: Box<dyn Read + Send>,
}

impl std::fmt::Debug for RemoteBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Source of remote resources. Implementations return an error for any
/// non-success status so callers only ever see readable bodies.
pub trait Transport {
    fn get(&self, url: &str) -> Result<RemoteBody>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub user_agent: String,
    /// Skip TLS certificate verification for this client only.
    pub accept_invalid_certs: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::core::config::DEFAULT_TIMEOUT_SECS),
            user_agent: crate::core::config::default_user_agent(),
            accept_invalid_certs: false,
        }
    }
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        if options.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled for this client");
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.as_str())
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()
            .map_err(|e| FetchError::config_error(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<RemoteBody> {
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::network_error(url, describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(RemoteBody {
            content_length: response.content_length(),
            reader: Box::new(response),
        })
    }
}

fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    }
}
