//! End-to-end sync pipeline: listings → raw files → headers → records → JSON.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use machinesync_frontmatter::parse_frontmatter;
use machinesync_github::GitHubClient;
use machinesync_shared::{GitHubToken, MachineRecord, Result, SyncConfig};

use crate::output;
use crate::record::RecordBuilder;

/// Outcome of a completed sync run.
#[derive(Debug, Clone)]
pub struct SyncResult {
    /// Where the JSON was written.
    pub output: PathBuf,
    /// Number of records in the written file.
    pub records_written: usize,
    /// Categories whose listing was fetched.
    pub categories_synced: Vec<String>,
    /// Categories skipped, with the error that caused it.
    pub categories_failed: Vec<(String, String)>,
    /// Files skipped inside otherwise healthy categories (file name, error).
    pub files_skipped: Vec<(String, String)>,
    /// Total duration of the run.
    pub elapsed: Duration,
}

/// Records gathered from the remote repository, in traversal order.
#[derive(Debug, Default)]
pub struct Collected {
    pub records: Vec<MachineRecord>,
    pub categories_synced: Vec<String>,
    pub categories_failed: Vec<(String, String)>,
    pub files_skipped: Vec<(String, String)>,
}

/// Progress callback for reporting sync status.
pub trait SyncProgress: Send + Sync {
    /// Called before a category listing is requested.
    fn category(&self, name: &str, current: usize, total: usize);
    /// Called after a file has been turned into a record.
    fn file_synced(&self, category: &str, file_name: &str, synced: usize);
    /// Called when the output has been written.
    fn done(&self, result: &SyncResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl SyncProgress for SilentProgress {
    fn category(&self, _name: &str, _current: usize, _total: usize) {}
    fn file_synced(&self, _category: &str, _file_name: &str, _synced: usize) {}
    fn done(&self, _result: &SyncResult) {}
}

/// Run the full sync.
///
/// 1. Collect records from every category (failures skip the category)
/// 2. Sort newest first
/// 3. Replace the output file
///
/// Only client construction and the final write can fail the run.
#[instrument(skip_all, fields(owner = %config.owner, repo = %config.repo))]
pub async fn sync(
    config: &SyncConfig,
    token: Option<GitHubToken>,
    progress: &dyn SyncProgress,
) -> Result<SyncResult> {
    let start = Instant::now();

    info!(
        categories = config.categories.len(),
        authenticated = token.is_some(),
        "starting sync with GitHub"
    );

    let client = GitHubClient::new(config, token)?;
    let builder = RecordBuilder::new(config)?;

    let mut collected = collect(&client, &builder, config, progress).await;

    output::sort_records(&mut collected.records);
    output::write_records(&config.output, &collected.records)?;

    let result = SyncResult {
        output: config.output.clone(),
        records_written: collected.records.len(),
        categories_synced: collected.categories_synced,
        categories_failed: collected.categories_failed,
        files_skipped: collected.files_skipped,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        records = result.records_written,
        failed_categories = result.categories_failed.len(),
        skipped_files = result.files_skipped.len(),
        path = %result.output.display(),
        elapsed_ms = result.elapsed.as_millis(),
        "sync complete"
    );

    Ok(result)
}

/// Walk every configured category in order. Never fails: listing errors skip
/// the category, file errors skip the file.
pub async fn collect(
    client: &GitHubClient,
    builder: &RecordBuilder,
    config: &SyncConfig,
    progress: &dyn SyncProgress,
) -> Collected {
    let mut collected = Collected::default();
    let total = config.categories.len();

    for (i, category) in config.categories.iter().enumerate() {
        progress.category(category, i + 1, total);
        info!(category = %category, "fetching category");

        match sync_category(client, builder, config, category, progress, &mut collected).await {
            Ok(count) => {
                debug!(category = %category, count, "category done");
                collected.categories_synced.push(category.clone());
            }
            Err(e) => {
                warn!(category = %category, error = %e, "could not fetch category, skipping");
                collected
                    .categories_failed
                    .push((category.clone(), e.to_string()));
            }
        }
    }

    collected
}

/// Sync one category into `collected`. Returns the number of records added.
#[instrument(skip(client, builder, config, progress, collected))]
async fn sync_category(
    client: &GitHubClient,
    builder: &RecordBuilder,
    config: &SyncConfig,
    category: &str,
    progress: &dyn SyncProgress,
    collected: &mut Collected,
) -> Result<usize> {
    let entries = client.list_directory(category).await?;
    let mut added = 0;

    for entry in entries.iter().filter(|e| config.is_content_file(&e.name)) {
        let Some(download_url) = entry.download_url.as_deref() else {
            debug!(name = %entry.name, "no download_url, skipping entry");
            continue;
        };

        info!(name = %entry.name, "syncing file");

        let text = match client.fetch_raw(download_url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(name = %entry.name, error = %e, "could not fetch file, skipping");
                collected
                    .files_skipped
                    .push((entry.name.clone(), e.to_string()));
                continue;
            }
        };

        let fm = parse_frontmatter(&text);
        let record = builder.build(&fm, &entry.name, category);

        for warning in record.schema_warnings() {
            warn!(id = %record.id, "{warning}");
        }

        collected.records.push(record);
        added += 1;
        progress.file_synced(category, &entry.name, collected.records.len());
    }

    Ok(added)
}
