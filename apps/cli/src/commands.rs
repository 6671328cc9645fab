//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use meeplevault_bgg::BggClient;
use meeplevault_core::enrich::{FillProgress, FillResult};
use meeplevault_core::{run_convert, run_fill};
use meeplevault_shared::{AppConfig, FillConfig, init_config, load_config};
use meeplevault_store::GameStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// MeepleVault — turn a board-game spreadsheet into an enriched catalog.
#[derive(Parser)]
#[command(
    name = "meeplevault",
    version,
    about = "Convert a tabular board-game dataset into per-game records and fill the gaps from BoardGameGeek.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Append logs to this file instead of stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert the tabular source into per-game records and the catalog file.
    Convert {
        /// CSV source file (defaults to the configured source path).
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Per-item store directory (defaults to the configured store path).
        #[arg(long)]
        store: Option<PathBuf>,

        /// Merged catalog output (defaults to the configured catalog path).
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },

    /// Fill missing covers/descriptions from BoardGameGeek.
    Fill {
        /// Per-item store directory (defaults to the configured store path).
        #[arg(long)]
        store: Option<PathBuf>,

        /// Only process the first N candidate records.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Pause between external lookups, in milliseconds.
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Per-request timeout, in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "meeplevault=info",
        1 => "meeplevault=debug",
        _ => "meeplevault=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // The log file is the append-only error-log artifact: timestamped,
    // severity-tagged lines that persist across the whole run.
    if let Some(path) = &cli.log_file {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    eyre!("cannot create log directory '{}': {e}", parent.display())
                })?;
            }
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| eyre!("cannot open log file '{}': {e}", path.display()))?;

        match cli.log_format {
            LogFormat::Text => {
                fmt()
                    .with_env_filter(env_filter)
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .init();
            }
            LogFormat::Json => {
                fmt()
                    .json()
                    .with_env_filter(env_filter)
                    .with_writer(Arc::new(file))
                    .init();
            }
        }
        return Ok(());
    }

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert {
            source,
            store,
            catalog,
        } => cmd_convert(source, store, catalog).await,
        Command::Fill {
            store,
            limit,
            delay_ms,
            timeout_secs,
        } => cmd_fill(store, limit, delay_ms, timeout_secs).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

async fn cmd_convert(
    source: Option<PathBuf>,
    store: Option<PathBuf>,
    catalog: Option<PathBuf>,
) -> Result<()> {
    let config = load_config()?;

    let source = source.unwrap_or_else(|| PathBuf::from(&config.paths.source));
    let store_dir = store.unwrap_or_else(|| PathBuf::from(&config.paths.store));
    let catalog = catalog.unwrap_or_else(|| PathBuf::from(&config.paths.catalog));

    if !source.exists() {
        return Err(eyre!("source file not found: {}", source.display()));
    }

    info!(source = %source.display(), store = %store_dir.display(), "converting dataset");

    let game_store = GameStore::open(&store_dir)?;
    let result = run_convert(&source, &game_store, &catalog)?;

    println!();
    println!("  Conversion complete!");
    println!("  Records:  {}", result.written);
    println!("  Skipped:  {} (missing id)", result.skipped_missing_id);
    println!("  Store:    {}", store_dir.display());
    println!("  Catalog:  {}", catalog.display());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// fill
// ---------------------------------------------------------------------------

async fn cmd_fill(
    store: Option<PathBuf>,
    limit: Option<usize>,
    delay_ms: Option<u64>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let config = load_config()?;
    let store_dir = store.unwrap_or_else(|| PathBuf::from(&config.paths.store));

    // Flags override config file values.
    let mut fill_config = FillConfig::from(&config);
    if let Some(ms) = delay_ms {
        fill_config.delay = std::time::Duration::from_millis(ms);
    }
    if let Some(secs) = timeout_secs {
        fill_config.timeout = std::time::Duration::from_secs(secs);
    }
    fill_config.limit = limit;

    info!(
        store = %store_dir.display(),
        delay_ms = fill_config.delay.as_millis() as u64,
        limit = limit.map(|l| l as u64),
        "filling missing fields"
    );

    let game_store = GameStore::open(&store_dir)?;
    let client = BggClient::new(&fill_config)?;
    let reporter = CliProgress::new();

    let result = run_fill(&fill_config, &client, &game_store, &reporter).await?;

    println!();
    println!("  Fill pass complete!");
    println!("  Candidates:    {}", result.candidates);
    println!("  Updated:       {}", result.updated);
    println!("  No title:      {}", result.skipped_missing_title);
    println!("  Search misses: {}", result.search_misses);
    println!("  Lookup errors: {}", result.lookup_errors);
    println!();

    Ok(())
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
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl FillProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn record(&self, title: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Filling [{current}/{total}] {title}"));
    }

    fn done(&self, _result: &FillResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
