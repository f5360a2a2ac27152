//! Header-block parser for write-up markdown files.
//!
//! Write-ups start with a delimited block of `key: value` lines:
//!
//! ```text
//! ---
//! name: Forge
//! os: Linux
//! pwn_date: 2023-01-17
//! ---
//! ```
//!
//! This is not YAML. Each line is split on its first colon; anything else is
//! ignored. Parsing never fails: a file without a block yields an empty map.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Key-value pairs from a header block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: BTreeMap<String, String>,
}

impl Frontmatter {
    /// Value for `key`, treating an empty value as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Value for `key` exactly as parsed, empty strings included.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.fields
    }
}

impl FromIterator<(String, String)> for Frontmatter {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Opening delimiter at byte 0, lazily matched body, first closing delimiter.
static BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\n(.*?)\n---").expect("frontmatter regex"));

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse the leading header block of `text`.
pub fn parse_frontmatter(text: &str) -> Frontmatter {
    split_frontmatter(text).0
}

/// Parse the header block and return it with the remaining body.
///
/// When no block is present the whole input is the body.
pub fn split_frontmatter(text: &str) -> (Frontmatter, String) {
    let normalized = text.replace("\r\n", "\n");

    let Some(caps) = BLOCK_RE.captures(&normalized) else {
        trace!("no header block");
        return (Frontmatter::default(), normalized);
    };

    let block = caps.get(1).map_or("", |m| m.as_str());
    let end = caps.get(0).map_or(0, |m| m.end());

    let fields: Frontmatter = block.lines().filter_map(parse_line).collect();
    trace!(keys = fields.len(), "parsed header block");

    let body = normalized[end..]
        .trim_start_matches(|c: char| c != '\n')
        .trim_start_matches('\n')
        .to_string();

    (fields, body)
}

/// Split one block line on its first colon. Lines without a colon are dropped.
fn parse_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim().to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forge_header() {
        let fm = parse_frontmatter(
            "---\nname: Forge\nos: Linux\ndifficulty: Medium\npwn_date: 2023-01-17\n---\n# Forge\n",
        );
        assert_eq!(fm.len(), 4);
        assert_eq!(fm.get("name"), Some("Forge"));
        assert_eq!(fm.get("os"), Some("Linux"));
        assert_eq!(fm.get("difficulty"), Some("Medium"));
        assert_eq!(fm.get("pwn_date"), Some("2023-01-17"));
    }

    #[test]
    fn parse_fixture_file() {
        let content = std::fs::read_to_string("../../../fixtures/writeups/Forge.md")
            .expect("read fixture");
        let (fm, body) = split_frontmatter(&content);

        assert_eq!(fm.get("name"), Some("Forge"));
        assert_eq!(fm.get("matrix_enum"), Some("70"));
        assert_eq!(fm.get("summary"), Some("SSRF through an upload-from-URL feature: pivot to an internal FTP."));
        assert!(body.starts_with("# Forge"));
    }

    #[test]
    fn lines_without_colon_are_skipped() {
        let fm = parse_frontmatter("---\nname: Lame\njust some words\n\nos: Linux\n---\n");
        assert_eq!(fm.len(), 2);
        assert_eq!(fm.get("name"), Some("Lame"));
        assert_eq!(fm.get("os"), Some("Linux"));
    }

    #[test]
    fn value_keeps_later_colons() {
        let fm = parse_frontmatter("---\nsummary: Port 80: a web app\nurl: https://x.y/z\n---\n");
        assert_eq!(fm.get("summary"), Some("Port 80: a web app"));
        assert_eq!(fm.get("url"), Some("https://x.y/z"));
    }

    #[test]
    fn keys_and_values_are_trimmed() {
        let fm = parse_frontmatter("---\n  os  :   Windows   \n---\n");
        assert_eq!(fm.get("os"), Some("Windows"));
    }

    #[test]
    fn empty_value_reads_as_absent() {
        let fm = parse_frontmatter("---\nname:\nos: Linux\n---\n");
        assert_eq!(fm.get_raw("name"), Some(""));
        assert_eq!(fm.get("name"), None);
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let fm = parse_frontmatter("---\nos: Linux\nos: Windows\n---\n");
        assert_eq!(fm.get("os"), Some("Windows"));
    }

    #[test]
    fn missing_block_is_empty() {
        assert!(parse_frontmatter("# Just a heading\n\nname: not a header\n").is_empty());
        assert!(parse_frontmatter("").is_empty());
    }

    #[test]
    fn block_must_start_at_first_byte() {
        assert!(parse_frontmatter("\n---\nname: Late\n---\n").is_empty());
        assert!(parse_frontmatter(" ---\nname: Late\n---\n").is_empty());
    }

    #[test]
    fn unterminated_block_is_empty() {
        assert!(parse_frontmatter("---\nname: Open\nos: Linux\n").is_empty());
    }

    #[test]
    fn empty_block_is_empty() {
        assert!(parse_frontmatter("---\n\n---\nbody").is_empty());
    }

    #[test]
    fn first_closing_delimiter_wins() {
        let (fm, body) = split_frontmatter("---\nname: A\n---\ntext\n---\nname: B\n---\n");
        assert_eq!(fm.get("name"), Some("A"));
        assert!(body.starts_with("text"));
    }

    #[test]
    fn crlf_line_endings() {
        let fm = parse_frontmatter("---\r\nname: Blue\r\nos: Windows\r\n---\r\nbody");
        assert_eq!(fm.get("name"), Some("Blue"));
        assert_eq!(fm.get("os"), Some("Windows"));
    }
}
