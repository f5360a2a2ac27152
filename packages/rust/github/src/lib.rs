//! GitHub contents API client.
//!
//! Two kinds of request:
//! - directory listings through the REST API, authenticated when a token is
//!   available
//! - raw file bodies through each entry's `download_url`, never authenticated

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use tracing::{debug, instrument, warn};
use url::Url;

use machinesync_shared::{GitHubToken, RepoEntry, Result, SyncConfig, SyncError};

/// User-Agent string; the GitHub API rejects requests without one.
const USER_AGENT: &str = concat!("machine-sync/", env!("CARGO_PKG_VERSION"));

/// Media type for the REST API v3 JSON representation.
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// GitHubClient
// ---------------------------------------------------------------------------

/// Client bound to one content repository.
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    owner: String,
    repo: String,
    base_path: String,
    token: Option<GitHubToken>,
}

impl GitHubClient {
    /// Build a client for the repository named in `config`.
    pub fn new(config: &SyncConfig, token: Option<GitHubToken>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SyncError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            base_path: config.base_path.clone(),
            token,
        })
    }

    /// Whether listing requests carry an `Authorization` header.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// `<api_base>/repos/<owner>/<repo>/contents/<base_path>/<category>`,
    /// every segment percent-encoded.
    pub fn listing_url(&self, category: &str) -> Result<Url> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                SyncError::config(format!("{} cannot be used as a base URL", self.api_base))
            })?;
            segments
                .pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
                .extend(self.base_path.split('/').filter(|s| !s.is_empty()))
                .push(category);
        }
        Ok(url)
    }

    /// List the entries of one category directory.
    #[instrument(skip(self), fields(authenticated = self.is_authenticated()))]
    pub async fn list_directory(&self, category: &str) -> Result<Vec<RepoEntry>> {
        let url = self.listing_url(category)?;
        debug!(%url, "requesting directory listing");

        let response = self
            .client
            .get(url.clone())
            .headers(self.api_headers()?)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("{url}: {e}")))?;

        let response = check_status(response, url.as_str())?;

        let entries: Vec<RepoEntry> = response
            .json()
            .await
            .map_err(|e| SyncError::decode(format!("{url}: expected a directory listing: {e}")))?;

        debug!(entries = entries.len(), "listing received");
        Ok(entries)
    }

    /// Fetch the raw text of one file.
    #[instrument(skip(self))]
    pub async fn fetch_raw(&self, download_url: &str) -> Result<String> {
        let response = self
            .client
            .get(download_url)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("{download_url}: {e}")))?;

        let response = check_status(response, download_url)?;

        response
            .text()
            .await
            .map_err(|e| SyncError::Network(format!("{download_url}: failed to read body: {e}")))
    }

    fn api_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));

        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("token {}", token.expose()))
                .map_err(|_| SyncError::config("GitHub token contains invalid header characters"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

/// Turn a non-2xx response into [`SyncError::Http`].
fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let err = SyncError::Http {
        url: url.to_string(),
        status: status.as_u16(),
    };

    if err.is_rate_limited() {
        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        warn!(%status, remaining, "rate limit exceeded or forbidden");
    }

    Err(err)
}
