//! GitHub token resolution.
//!
//! The token is resolved once by the entry point and handed to the client as
//! a value. Lookup order: environment variable, then a `KEY=value` line in an
//! untracked local env file.

use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::config::SyncConfig;

/// Bearer credential for the GitHub contents API.
#[derive(Clone, PartialEq, Eq)]
pub struct GitHubToken(String);

impl GitHubToken {
    /// Wrap a raw token. Returns `None` for blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The token text, for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GitHubToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GitHubToken(<redacted>)")
    }
}

/// Resolve the token using the variable and env file named in `config`.
pub fn resolve_token(config: &SyncConfig) -> Option<GitHubToken> {
    let from_env = std::env::var(&config.token_env).ok();
    resolve_token_with(from_env, &config.token_env, &config.env_file)
}

/// Resolution with the environment lookup already done, so callers and tests
/// never have to mutate the process environment.
pub fn resolve_token_with(
    env_value: Option<String>,
    key: &str,
    env_file: &Path,
) -> Option<GitHubToken> {
    if let Some(token) = env_value.and_then(|v| GitHubToken::new(v)) {
        tracing::debug!(key, "using token from environment");
        return Some(token);
    }

    let content = match std::fs::read_to_string(env_file) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %env_file.display(), error = %e, "no env file, requests are unauthenticated");
            return None;
        }
    };

    let token = token_from_env_file(&content, key);
    if token.is_some() {
        tracing::debug!(key, path = %env_file.display(), "using token from env file");
    }
    token
}

/// Find `KEY = value` in env-file text. Surrounding quotes are stripped.
pub fn token_from_env_file(content: &str, key: &str) -> Option<GitHubToken> {
    let pattern = format!(
        r"(?m)^[ \t]*(?:export[ \t]+)?{}[ \t]*=[ \t]*([^\r\n]*)",
        regex::escape(key)
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(content)?;
    let value = caps[1].trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    GitHubToken::new(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_env_file(content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ms-cred-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn blank_token_is_none() {
        assert!(GitHubToken::new("   ").is_none());
        assert_eq!(GitHubToken::new(" abc \n").unwrap().expose(), "abc");
    }

    #[test]
    fn debug_is_redacted() {
        let token = GitHubToken::new("ghp_secret").unwrap();
        assert!(!format!("{token:?}").contains("ghp_secret"));
    }

    #[test]
    fn env_file_parsing() {
        let content = "OTHER=1\nGITHUB_TOKEN = ghp_abc123 \nLAST=2\n";
        let token = token_from_env_file(content, "GITHUB_TOKEN").unwrap();
        assert_eq!(token.expose(), "ghp_abc123");

        let quoted = token_from_env_file("GITHUB_TOKEN=\"ghp_q\"", "GITHUB_TOKEN").unwrap();
        assert_eq!(quoted.expose(), "ghp_q");

        assert!(token_from_env_file("GITHUB_TOKEN=", "GITHUB_TOKEN").is_none());
        assert!(token_from_env_file("NOPE=1", "GITHUB_TOKEN").is_none());
        assert!(token_from_env_file("GITHUB_TOKEN=\nNEXT=1\n", "GITHUB_TOKEN").is_none());

        let exported = token_from_env_file("export GITHUB_TOKEN=ghp_x", "GITHUB_TOKEN").unwrap();
        assert_eq!(exported.expose(), "ghp_x");
    }

    #[test]
    fn environment_wins_over_file() {
        let path = temp_env_file("GITHUB_TOKEN=from_file\n");
        let token = resolve_token_with(Some("from_env".into()), "GITHUB_TOKEN", &path).unwrap();
        assert_eq!(token.expose(), "from_env");
    }

    #[test]
    fn falls_back_to_file() {
        let path = temp_env_file("GITHUB_TOKEN=from_file\n");
        let token = resolve_token_with(Some("  ".into()), "GITHUB_TOKEN", &path).unwrap();
        assert_eq!(token.expose(), "from_file");
    }

    #[test]
    fn missing_everything_is_none() {
        let path = Path::new("/definitely/not/here/.env");
        assert!(resolve_token_with(None, "GITHUB_TOKEN", path).is_none());
    }
}
