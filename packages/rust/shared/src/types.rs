//! Core domain types: remote listing entries and the synced machine record.

use serde::{Deserialize, Serialize};

/// Operating-system tags the consuming site's content schema accepts.
pub const KNOWN_OS: &[&str] = &["Linux", "Windows"];

/// Difficulty tags the consuming site's content schema accepts.
pub const KNOWN_DIFFICULTIES: &[&str] = &["Easy", "Medium", "Hard", "Insane"];

// ---------------------------------------------------------------------------
// RepoEntry
// ---------------------------------------------------------------------------

/// Kind of object in a GitHub contents listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryType {
    File,
    Dir,
    Symlink,
    Submodule,
    /// Any type string this client does not know about.
    Other,
}

impl From<String> for EntryType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "file" => Self::File,
            "dir" => Self::Dir,
            "symlink" => Self::Symlink,
            "submodule" => Self::Submodule,
            _ => Self::Other,
        }
    }
}

impl From<EntryType> for String {
    fn from(value: EntryType) -> Self {
        match value {
            EntryType::File => "file",
            EntryType::Dir => "dir",
            EntryType::Symlink => "symlink",
            EntryType::Submodule => "submodule",
            EntryType::Other => "other",
        }
        .to_string()
    }
}

/// One item of a `GET /repos/{owner}/{repo}/contents/{path}` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoEntry {
    /// File or directory name.
    pub name: String,
    /// Path from the repository root.
    #[serde(default)]
    pub path: String,
    /// Object kind.
    #[serde(rename = "type", default = "default_entry_type")]
    pub entry_type: EntryType,
    /// Direct raw-content URL. `null` for directories.
    #[serde(default)]
    pub download_url: Option<String>,
}

fn default_entry_type() -> EntryType {
    EntryType::File
}

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

/// The five-dimension scoring block. Each value is the header integer times ten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Matrix {
    pub r#enum: i64,
    pub real: i64,
    pub cve: i64,
    pub custom: i64,
    pub ctf: i64,
}

impl Matrix {
    /// Values in `ENUM, REAL, CVE, CUSTOM, CTF` order.
    pub fn values(&self) -> [i64; 5] {
        [self.r#enum, self.real, self.cve, self.custom, self.ctf]
    }
}

// ---------------------------------------------------------------------------
// MachineRecord
// ---------------------------------------------------------------------------

/// One synced write-up, as consumed by the site build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRecord {
    /// Lowercased title.
    pub id: String,
    pub title: String,
    pub os: String,
    pub difficulty: String,
    /// Date the machine was pwned, as written in the header.
    pub pwned_date: String,
    /// Derived logo URL.
    pub avatar: String,
    pub description: String,
    pub matrix: Matrix,
    /// Category directory the file was listed under.
    pub folder: String,
}

impl MachineRecord {
    /// Fields that the consuming site's schema would reject.
    ///
    /// The sync never drops a record for this; callers log the messages.
    pub fn schema_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !KNOWN_OS.contains(&self.os.as_str()) {
            warnings.push(format!(
                "os '{}' is not one of {}",
                self.os,
                KNOWN_OS.join(", ")
            ));
        }
        if !KNOWN_DIFFICULTIES.contains(&self.difficulty.as_str()) {
            warnings.push(format!(
                "difficulty '{}' is not one of {}",
                self.difficulty,
                KNOWN_DIFFICULTIES.join(", ")
            ));
        }
        warnings
    }
}
