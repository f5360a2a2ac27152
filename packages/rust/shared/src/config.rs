//! Sync configuration.
//!
//! Config lives at `machinesync.toml` in the working directory. Every key is
//! optional; an absent file yields the defaults that match the published
//! write-up repository.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SyncError};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "machinesync.toml";

// ---------------------------------------------------------------------------
// SyncConfig (matching machinesync.toml schema)
// ---------------------------------------------------------------------------

/// Where to read write-ups from and where to write the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// GitHub REST API root.
    pub api_base: Url,
    /// Raw content host used for derived avatar URLs.
    pub raw_base: Url,
    /// Owner of the content repository.
    pub owner: String,
    /// Content repository name.
    pub repo: String,
    /// Branch referenced by avatar URLs.
    pub branch: String,
    /// Directory inside the repository holding one sub-directory per category.
    /// Stored unencoded; URL builders percent-encode it.
    pub base_path: String,
    /// Category sub-directories, scanned in this order.
    pub categories: Vec<String>,
    /// Content file extension, including the dot.
    pub extension: String,
    /// File name excluded from every listing.
    pub index_file: String,
    /// Output JSON path.
    pub output: PathBuf,
    /// Environment variable holding the API token.
    pub token_env: String,
    /// Untracked local file searched for the token when the variable is unset.
    pub env_file: PathBuf,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            raw_base: default_raw_base(),
            owner: "DiogoCoutoooo".into(),
            repo: "Cybersec-Obsidian".into(),
            branch: "main".into(),
            base_path: "Tought Process".into(),
            categories: ["Easy", "Medium", "Hard", "Insane"]
                .map(String::from)
                .to_vec(),
            extension: ".md".into(),
            index_file: "README.md".into(),
            output: PathBuf::from("src/data/machines.json"),
            token_env: "GITHUB_TOKEN".into(),
            env_file: PathBuf::from(".env"),
            timeout_secs: 30,
        }
    }
}

fn default_api_base() -> Url {
    Url::parse("https://api.github.com").expect("api base url")
}

fn default_raw_base() -> Url {
    Url::parse("https://raw.githubusercontent.com").expect("raw base url")
}

impl SyncConfig {
    /// Whether a listing entry name is a content file worth syncing.
    pub fn is_content_file(&self, name: &str) -> bool {
        name.ends_with(&self.extension) && name != self.index_file
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() || self.repo.trim().is_empty() {
            return Err(SyncError::config("owner and repo must not be empty"));
        }
        if self.categories.iter().any(|c| c.trim().is_empty()) {
            return Err(SyncError::config("category names must not be empty"));
        }
        for base in [&self.api_base, &self.raw_base] {
            if base.cannot_be_a_base() {
                return Err(SyncError::config(format!("{base} cannot be used as a base URL")));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load `machinesync.toml` from the working directory. Returns defaults if the
/// file does not exist.
pub fn load_config() -> Result<SyncConfig> {
    let path = Path::new(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(SyncConfig::default());
    }

    load_config_from(path)
}

/// Load the config from a specific file path. The file must exist.
pub fn load_config_from(path: &Path) -> Result<SyncConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
    let config: SyncConfig = toml::from_str(&content).map_err(|e| {
        SyncError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    tracing::debug!(?path, "loaded config");
    Ok(config)
}
