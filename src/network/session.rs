use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use thiserror::Error;
use tracing::debug;

use crate::relocator::{Fetch, FetchError};
use crate::utils::url::Url;

/// User-Agent header sent with every request unless configured otherwise
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:135.0) Gecko/20100101 Firefox/135.0";

/// Request timeout used unless configured otherwise, in seconds
pub const DEFAULT_TIMEOUT: u64 = 60;

/// Errors raised while setting up a session or loading the page itself
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unable to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("invalid user agent: {0}")]
    UserAgent(#[from] reqwest::header::InvalidHeaderValue),
    #[error("invalid target \"{0}\"")]
    InvalidTarget(String),
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("unable to retrieve {target}: {error}")]
    Retrieve { target: String, error: FetchError },
}

/// Options controlling how resources are requested
#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub insecure: bool,
    pub timeout: u64,
    pub user_agent: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }
}

/// Network and filesystem access for a snapshot
///
/// Serves `http`, `https` and `file` URLs; anything else is reported as a
/// fetch error.
#[derive(Clone, Debug)]
pub struct Session {
    client: Client,
}

impl Session {
    pub fn new(options: &SessionOptions) -> Result<Session, SessionError> {
        let mut header_map = HeaderMap::new();
        header_map.insert(
            USER_AGENT,
            HeaderValue::from_str(
                options
                    .user_agent
                    .as_deref()
                    .unwrap_or(DEFAULT_USER_AGENT),
            )?,
        );

        let mut builder = Client::builder()
            .default_headers(header_map)
            .danger_accept_invalid_certs(options.insecure);
        if options.timeout > 0 {
            builder = builder.timeout(Duration::from_secs(options.timeout));
        }

        Ok(Session {
            client: builder.build()?,
        })
    }

    /// Loads the page to snapshot
    ///
    /// `target` may be an `http(s)` URL, a `file` URL or a filesystem path.
    /// Returns the page bytes and the URL relative references resolve against.
    pub fn retrieve_document(&self, target: &str) -> Result<(Vec<u8>, Url), SessionError> {
        let url = if target.starts_with("http://")
            || target.starts_with("https://")
            || target.starts_with("file:")
        {
            Url::parse(target).map_err(|_| SessionError::InvalidTarget(target.to_string()))?
        } else {
            let path = Path::new(target);
            if !path.exists() {
                return Err(SessionError::FileNotFound(target.to_string()));
            }
            fs::canonicalize(path)
                .ok()
                .and_then(|canonical_path| Url::from_file_path(canonical_path).ok())
                .ok_or_else(|| SessionError::InvalidTarget(target.to_string()))?
        };

        let data = self.fetch(&url).map_err(|error| SessionError::Retrieve {
            target: target.to_string(),
            error,
        })?;

        Ok((data, url))
    }

    fn fetch_http(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|e| FetchError::new(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::new(format!("HTTP error: {}", response.status())));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::new(format!("failed to read response body: {e}")))
    }

    fn fetch_file(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|_| FetchError::new("not a local file path"))?;
        fs::read(&path).map_err(|e| FetchError::new(format!("{}: {}", path.display(), e)))
    }
}

impl Fetch for Session {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        debug!("retrieving {}", url);

        match url.scheme() {
            "http" | "https" => self.fetch_http(url),
            "file" => self.fetch_file(url),
            scheme => Err(FetchError::new(format!("unsupported scheme \"{scheme}\""))),
        }
    }
}
