//! Ordering and persistence of the synced collection.

use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, instrument};

use machinesync_shared::{MachineRecord, Result, SyncError};

/// Sort key for a `pwnedDate` string.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 (compared in UTC), and
/// `YYYY-MM-DDTHH:MM:SS`. Anything else maps to the minimum date so it sorts
/// after every parsable one.
pub fn date_key(value: &str) -> NaiveDateTime {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_time(NaiveTime::MIN);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.naive_utc();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return dt;
    }

    NaiveDateTime::MIN
}

/// Newest first. Stable: equal dates keep traversal order.
pub fn sort_records(records: &mut [MachineRecord]) {
    records.sort_by_key(|r| Reverse(date_key(&r.pwned_date)));
}

/// Write `records` as a two-space indented JSON array, replacing `path`.
///
/// The JSON goes to a sibling temp file first and is renamed into place, so a
/// failure leaves any previous output untouched.
#[instrument(skip_all, fields(path = %path.display(), count = records.len()))]
pub fn write_records(path: &Path, records: &[MachineRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| SyncError::Serialize(format!("JSON serialization failed: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
    }

    let tmp = temp_path(path);
    std::fs::write(&tmp, json).map_err(|e| SyncError::io(&tmp, e))?;

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(SyncError::io(path, e));
    }

    debug!("wrote JSON file");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    path.with_file_name(format!(".{name}.tmp"))
}
