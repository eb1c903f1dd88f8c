//! # file-locator
//!
//! Finds files under a directory by name (or content) and reduces the
//! matches per target with a selection policy.
//!
//! ## Usage
//!
//! - `file-locator ~/Downloads -t invoice -t receipt` - list all matches
//! - `file-locator . -t report --policy newest --ext .pdf` - newest PDF per target
//! - `file-locator --export-config settings.json` - write the current settings

use anyhow::{Context, Result};
use clap::Parser;
use file_locator::app::events::UserEvent;
use file_locator::app::state::AppState;
use file_locator::app::tasks::{self, SearchRequest};
use file_locator::app::view_model::ResultView;
use file_locator::config::{settings, AppConfig};
use file_locator::core::{ExtensionSet, PartialMode, SelectionPolicy, SizeRange, SortKey};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// file-locator - find files by name and keep the ones you want
#[derive(Parser, Debug)]
#[command(name = "file-locator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find files by name or content and select among the matches")]
struct Cli {
    /// Directory to search (defaults to the configured directory)
    directory: Option<PathBuf>,

    /// A file name to look for; repeat for several targets
    #[arg(short, long = "target", required_unless_present_any = ["export_config", "import_config"])]
    targets: Vec<String>,

    /// Only consider files with this extension; repeatable
    #[arg(long = "ext")]
    extensions: Vec<String>,

    /// Require the whole file name to match
    #[arg(long)]
    exact: bool,

    /// Match names and contents case-sensitively
    #[arg(long)]
    case_sensitive: bool,

    /// Also match files whose text contains the target
    #[arg(long)]
    content: bool,

    /// Fall back to fuzzy name similarity for partial matches
    #[arg(long)]
    fuzzy: bool,

    /// all, newest, oldest, largest or smallest
    #[arg(long)]
    policy: Option<SelectionPolicy>,

    /// none, size or date
    #[arg(long)]
    sort: Option<SortKey>,

    /// Minimum file size in KiB (0 = no minimum)
    #[arg(long, default_value_t = 0)]
    min_kib: u64,

    /// Maximum file size in KiB (0 = no maximum)
    #[arg(long, default_value_t = 0)]
    max_kib: u64,

    /// Inclusive modification date range, "YYYY-MM-DD - YYYY-MM-DD"
    #[arg(long, default_value = "")]
    date_range: String,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Write the current settings to a file and exit
    #[arg(long)]
    export_config: Option<PathBuf>,

    /// Replace the stored settings with a file and exit
    #[arg(long)]
    import_config: Option<PathBuf>,
}

/// Merges command line switches over the stored configuration.
fn build_request(cli: &Cli, config: &AppConfig) -> Result<SearchRequest> {
    let directory = cli
        .directory
        .clone()
        .or_else(|| config.default_directory.clone())
        .context("No directory given and no default directory configured")?;

    let mut options = config.match_options();
    options.exact_match |= cli.exact;
    options.case_sensitive |= cli.case_sensitive;
    options.search_content |= cli.content;
    if cli.fuzzy {
        options.partial_mode = PartialMode::SubstringOrFuzzy;
    }

    Ok(SearchRequest {
        directory,
        targets_text: cli.targets.join("\n"),
        extensions: cli.extensions.iter().collect::<ExtensionSet>(),
        options,
        policy: cli.policy.unwrap_or(config.selection_policy),
        sort_key: cli.sort.unwrap_or(config.sort_key),
        size_range: SizeRange::new(cli.min_kib, cli.max_kib),
        date_range: cli.date_range.clone(),
    })
}

fn print_result(view: &ResultView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    for section in &view.sections {
        if let Some(label) = &section.label {
            println!("== {} ==", label);
        }
        for row in &section.rows {
            println!(
                "{:>10}  {}  {}",
                row.size_display,
                row.last_modified,
                row.full_path.display()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    if let Some(path) = &cli.export_config {
        settings::export_config(&config, path)?;
        println!("Exported settings to {}", path.display());
        return Ok(());
    }
    if let Some(path) = &cli.import_config {
        let imported = settings::import_config(path)?;
        settings::save_config(&imported)?;
        println!("Imported settings from {}", path.display());
        return Ok(());
    }

    let request = build_request(&cli, &config)?;
    let state = Arc::new(Mutex::new(AppState::new(config)));
    let (proxy, mut events) = mpsc::unbounded_channel::<UserEvent>();

    tasks::start_search(request, proxy.clone(), state.clone())?;

    let signal_proxy = proxy.clone();
    let signal_state = state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tasks::stop_search(&signal_proxy, &signal_state);
        }
    });

    let mut finished: Option<ResultView> = None;
    while let Some(event) = events.recv().await {
        match event {
            UserEvent::SearchProgress(progress) => {
                tracing::debug!(
                    "{} files visited, {} matches, at {}",
                    progress.files_visited,
                    progress.matches_found,
                    progress.current_path
                );
            }
            UserEvent::SearchFinished(view) => finished = Some(*view),
            UserEvent::ShowError(message) => eprintln!("Error: {}", message),
            UserEvent::StateUpdate(ui_state) => {
                if ui_state.status_message == "Stopping search..." {
                    eprintln!("{}", ui_state.status_message);
                }
                if !ui_state.is_searching {
                    eprintln!("{}", ui_state.status_message);
                    break;
                }
            }
        }
    }

    if let Some(view) = finished {
        print_result(&view, cli.json)?;
    }
    Ok(())
}
