//! Header → [`MachineRecord`] mapping.
//!
//! Every recognized header key and its fallback live in one place
//! ([`FIELD_DEFAULTS`] plus [`RecordBuilder::build`]) so the mapping can be
//! tested without any network code.

use url::Url;

use machinesync_frontmatter::Frontmatter;
use machinesync_shared::{MachineRecord, Matrix, Result, SyncConfig, SyncError};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Fallbacks for header keys that are absent or empty.
#[derive(Debug, Clone, Copy)]
pub struct FieldDefaults {
    /// `os` when the header has none.
    pub os: &'static str,
    /// `pwn_date` when the header has none.
    pub pwned_date: &'static str,
    /// Raw `matrix_*` score when the header has none or it is not a number.
    pub matrix_score: i64,
    /// Multiplier applied to every raw `matrix_*` score.
    pub matrix_scale: i64,
}

pub const FIELD_DEFAULTS: FieldDefaults = FieldDefaults {
    os: "Linux",
    pwned_date: "2000-01-01",
    matrix_score: 50,
    matrix_scale: 10,
};

/// Header keys for the scoring block, in `ENUM, REAL, CVE, CUSTOM, CTF` order.
pub const MATRIX_KEYS: [&str; 5] = [
    "matrix_enum",
    "matrix_real",
    "matrix_cve",
    "matrix_custom",
    "matrix_ctf",
];

// ---------------------------------------------------------------------------
// RecordBuilder
// ---------------------------------------------------------------------------

/// Builds records for one repository; owns the avatar URL template.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    /// `<raw_base>/<owner>/<repo>/<branch>/<base_path>/!Media`
    media_base: Url,
    extension: String,
}

impl RecordBuilder {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let mut media_base = config.raw_base.clone();
        {
            let mut segments = media_base.path_segments_mut().map_err(|()| {
                SyncError::config(format!("{} cannot be used as a base URL", config.raw_base))
            })?;
            segments
                .pop_if_empty()
                .extend([
                    config.owner.as_str(),
                    config.repo.as_str(),
                    config.branch.as_str(),
                ])
                .extend(config.base_path.split('/').filter(|s| !s.is_empty()))
                .push("!Media");
        }

        Ok(Self {
            media_base,
            extension: config.extension.clone(),
        })
    }

    /// Map one parsed header to a record.
    ///
    /// `file_name` supplies the title when the header has no `name`;
    /// `category` supplies the difficulty fallback and the provenance tag.
    pub fn build(&self, fm: &Frontmatter, file_name: &str, category: &str) -> MachineRecord {
        let title = fm
            .get("name")
            .map(str::to_string)
            .unwrap_or_else(|| title_from_file_name(file_name, &self.extension));

        let description = fm
            .get("summary")
            .map(str::to_string)
            .unwrap_or_else(|| format!("Write-up and thought process for {title}."));

        let [r#enum, real, cve, custom, ctf] = MATRIX_KEYS.map(|key| score(fm.get(key)));

        MachineRecord {
            id: title.to_lowercase(),
            os: fm.get("os").unwrap_or(FIELD_DEFAULTS.os).to_string(),
            difficulty: fm.get("difficulty").unwrap_or(category).to_string(),
            pwned_date: fm
                .get("pwn_date")
                .unwrap_or(FIELD_DEFAULTS.pwned_date)
                .to_string(),
            avatar: self.avatar_url(&title),
            description,
            matrix: Matrix {
                r#enum,
                real,
                cve,
                custom,
                ctf,
            },
            folder: category.to_string(),
            title,
        }
    }

    /// Logo URL for a title.
    pub fn avatar_url(&self, title: &str) -> String {
        let mut url = self.media_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&format!("!Logo_{title}.png"));
        }
        url.into()
    }
}

/// File name with the content extension stripped.
fn title_from_file_name(file_name: &str, extension: &str) -> String {
    file_name
        .strip_suffix(extension)
        .unwrap_or(file_name)
        .to_string()
}

/// Scaled score for one `matrix_*` value.
fn score(value: Option<&str>) -> i64 {
    value
        .and_then(parse_leading_int)
        .unwrap_or(FIELD_DEFAULTS.matrix_score)
        .saturating_mul(FIELD_DEFAULTS.matrix_scale)
}

/// Leading integer of a string: optional sign, then ASCII digits; anything
/// after the digits is ignored. `None` when there are no leading digits.
/// Magnitudes past `i64` saturate.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let s = value.trim();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }

    let magnitude = rest[..len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use machinesync_frontmatter::parse_frontmatter;

    use super::*;

    fn builder() -> RecordBuilder {
        RecordBuilder::new(&SyncConfig::default()).unwrap()
    }

    #[test]
    fn forge_header_maps_with_defaults() {
        let fm = parse_frontmatter(
            "---\nname: Forge\nos: Linux\ndifficulty: Medium\npwn_date: 2023-01-17\n---",
        );
        let record = builder().build(&fm, "Forge.md", "Medium");

        assert_eq!(record.title, "Forge");
        assert_eq!(record.id, "forge");
        assert_eq!(record.os, "Linux");
        assert_eq!(record.difficulty, "Medium");
        assert_eq!(record.pwned_date, "2023-01-17");
        assert_eq!(record.matrix.values(), [500; 5]);
        assert_eq!(record.description, "Write-up and thought process for Forge.");
        assert_eq!(record.folder, "Medium");
        assert_eq!(
            record.avatar,
            "https://raw.githubusercontent.com/DiogoCoutoooo/Cybersec-Obsidian/main/Tought%20Process/!Media/!Logo_Forge.png"
        );
    }

    #[test]
    fn empty_header_uses_every_default() {
        let record = builder().build(&Frontmatter::default(), "Lame.md", "Easy");

        assert_eq!(record.title, "Lame");
        assert_eq!(record.id, "lame");
        assert_eq!(record.os, "Linux");
        assert_eq!(record.difficulty, "Easy");
        assert_eq!(record.pwned_date, "2000-01-01");
        assert_eq!(record.description, "Write-up and thought process for Lame.");
        assert_eq!(record.matrix.values(), [500; 5]);
        assert_eq!(record.folder, "Easy");
    }

    #[test]
    fn id_is_lowercased_title_from_file_name() {
        let record = builder().build(&Frontmatter::default(), "SteamCloud.md", "Easy");
        assert_eq!(record.title, "SteamCloud");
        assert_eq!(record.id, "steamcloud");
    }

    #[test]
    fn empty_name_falls_back_to_file_name() {
        let fm = parse_frontmatter("---\nname:\n---\n");
        let record = builder().build(&fm, "Keeper.md", "Easy");
        assert_eq!(record.title, "Keeper");
    }

    #[test]
    fn matrix_values_are_scaled() {
        let fm = parse_frontmatter(
            "---\nmatrix_enum: 70\nmatrix_real: 0\nmatrix_cve: 100\nmatrix_custom: 7/10\nmatrix_ctf: high\n---",
        );
        let record = builder().build(&fm, "Box.md", "Hard");
        assert_eq!(record.matrix.values(), [700, 0, 1000, 70, 500]);
    }

    #[test]
    fn out_of_range_scores_pass_through() {
        let fm = parse_frontmatter("---\nmatrix_enum: 250\nmatrix_real: -3\n---");
        let record = builder().build(&fm, "Box.md", "Hard");
        assert_eq!(record.matrix.r#enum, 2500);
        assert_eq!(record.matrix.real, -30);
    }

    #[test]
    fn summary_and_unknown_keys() {
        let fm = parse_frontmatter("---\nsummary: Kerberoasting.\nauthor: me\ntags: ad\n---");
        let record = builder().build(&fm, "Active.md", "Easy");
        assert_eq!(record.description, "Kerberoasting.");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("author").is_none());
        assert!(json.get("tags").is_none());
    }

    #[test]
    fn header_difficulty_overrides_folder() {
        let fm = parse_frontmatter("---\ndifficulty: Insane\n---");
        let record = builder().build(&fm, "Box.md", "Hard");
        assert_eq!(record.difficulty, "Insane");
        assert_eq!(record.folder, "Hard");
    }

    #[test]
    fn build_is_deterministic() {
        let fm = parse_frontmatter("---\nname: Forge\nmatrix_cve: 30\n---");
        let b = builder();
        assert_eq!(b.build(&fm, "Forge.md", "Medium"), b.build(&fm, "Forge.md", "Medium"));
    }

    #[test]
    fn avatar_encodes_title() {
        let url = builder().avatar_url("Return of Box");
        assert!(url.ends_with("/!Media/!Logo_Return%20of%20Box.png"));
    }

    #[test]
    fn leading_int_parsing() {
        assert_eq!(parse_leading_int("50"), Some(50));
        assert_eq!(parse_leading_int("  42 "), Some(42));
        assert_eq!(parse_leading_int("+8"), Some(8));
        assert_eq!(parse_leading_int("-12"), Some(-12));
        assert_eq!(parse_leading_int("7/10"), Some(7));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("99999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn huge_scores_saturate() {
        assert_eq!(score(Some("99999999999999999999")), i64::MAX);
    }
}
