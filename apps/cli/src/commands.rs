//! CLI definition, tracing setup, and the sync command.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use machinesync_core::{SyncProgress, SyncResult};
use machinesync_shared::{SyncConfig, load_config, load_config_from, resolve_token};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Sync write-up metadata from GitHub into the site's data file.
#[derive(Parser)]
#[command(
    name = "machine-sync",
    version,
    about = "Pull write-up headers from GitHub and write the site's machines.json.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./machinesync.toml when present).
    #[arg(long, env = "MACHINESYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "machinesync=info,machine_sync=info",
        1 => "machinesync=debug,machine_sync=debug",
        _ => "machinesync=trace,machine_sync=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Resolve config and credentials, then run the sync.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;
    let token = resolve_token(&config);

    if token.is_none() {
        info!(
            var = %config.token_env,
            "no GitHub token found, using unauthenticated requests (lower rate limit)"
        );
    }

    let reporter = CliProgress::new();
    let result = match machinesync_core::sync(&config, token, &reporter).await {
        Ok(result) => result,
        Err(e) => {
            reporter.spinner.finish_and_clear();
            return Err(e).wrap_err_with(|| {
                format!("sync failed, {} left unchanged", config.output.display())
            });
        }
    };

    for (category, error) in &result.categories_failed {
        warn!(category = %category, "skipped: {error}");
    }

    println!();
    println!(
        "  Synced {} machines to {}",
        result.records_written,
        result.output.display()
    );
    println!(
        "  Categories: {} ok, {} failed",
        result.categories_synced.len(),
        result.categories_failed.len()
    );
    if !result.files_skipped.is_empty() {
        println!("  Files skipped: {}", result.files_skipped.len());
    }
    println!("  Time: {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn resolve_config(path: Option<&std::path::Path>) -> Result<SyncConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl SyncProgress for CliProgress {
    fn category(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching {name} machines [{current}/{total}]"));
    }

    fn file_synced(&self, category: &str, file_name: &str, synced: usize) {
        self.spinner
            .set_message(format!("Synced {category}/{file_name} ({synced} total)"));
    }

    fn done(&self, _result: &SyncResult) {
        self.spinner.finish_and_clear();
    }
}
