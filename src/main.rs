// eventra-board: contribution-points leaderboard for a GitHub repository.
// Entry point wiring CLI, config, logging and the cached views.

mod app;
mod board;
mod cache;
mod cli;
mod config;
mod contributors;
mod error;
mod github;
mod refresh;
mod report;
mod scoring;
mod state;
mod stats;
mod ui;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::board::Board;
use crate::cache::{CacheEnvelope, log_path};
use crate::cli::{Args, Command};
use crate::config::{CONFIG_FILE, Config};
use crate::refresh::{OpenOutcome, RefreshJob, RefreshOutcome, Revalidator};
use crate::state::{LeaderboardView, SortKey};

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    if args.command == Command::InitConfig {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle `init-config`: generate a default .eventra-board.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        bail!("{} already exists. Remove it first or edit it manually.", CONFIG_FILE);
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("Created {} with default settings.", CONFIG_FILE);
    println!("Edit it to choose the repository, labels and point values.");
    Ok(())
}

/// Initialize logging. The TUI owns the terminal, so it logs to a file.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    if args.is_tui() {
        let Some(dir) = config.cache_dir() else {
            return Ok(());
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = log_path(&dir);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    } else {
        builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::discover(args.config.as_deref()).context("Failed to load configuration")?;
    config.merge_with_args(&args)?;

    init_logging(&args, &config)?;
    debug!("Arguments: {:?}", args.command);
    info!(repo = %config.repo(), "eventra-board v{}", env!("CARGO_PKG_VERSION"));

    let board = Board::from_config(&config).context("Failed to set up GitHub client")?;

    match args.command {
        Command::Show {
            sort,
            search,
            page,
            refresh,
            json,
        } => handle_show(&board, &config, sort, search.as_deref(), page, refresh, json).await,
        Command::Refresh { all } => handle_refresh(&board, all).await,
        Command::Contributors { json } => {
            let Some((snapshot, cached)) = load_view(&board.contributors, false).await? else {
                println!("No contributors found.");
                return Ok(());
            };
            if json {
                return print_json(&snapshot);
            }
            print!("{}", report::generate_contributors(&snapshot.data));
            println!("\n{}", report::last_updated_line(snapshot.timestamp, cached));
            Ok(())
        }
        Command::Stats { json } => {
            let Some((snapshot, cached)) = load_view(&board.stats, false).await? else {
                println!("No stats available.");
                return Ok(());
            };
            if json {
                return print_json(&snapshot);
            }
            print!("{}", report::generate_stats(&snapshot.data));
            println!("\n{}", report::last_updated_line(snapshot.timestamp, cached));
            Ok(())
        }
        Command::Tui => handle_tui(board, &config).await,
        Command::InitConfig => handle_init_config(),
    }
}

/// Serve a view through its revalidator.
///
/// Fresh caches are used as-is. Stale ones are refreshed in place before
/// printing, falling back to the cached copy if that refresh fails. Returns
/// the snapshot and whether it came from the cache.
async fn load_view<J: RefreshJob>(
    revalidator: &Arc<Revalidator<J>>,
    force: bool,
) -> Result<Option<(CacheEnvelope<J::Output>, bool)>> {
    let outcome = match revalidator.open().await {
        OpenOutcome::Fresh if force => Some(revalidator.refresh().await),
        OpenOutcome::Fresh => None,
        OpenOutcome::Revalidating(handle) => Some(handle.await.context("Refresh task failed")?),
        OpenOutcome::Fetched(outcome) => Some(outcome),
    };
    let cached = !outcome.as_ref().is_some_and(RefreshOutcome::is_updated);

    match (revalidator.snapshot(), outcome) {
        (Some(snapshot), outcome) => {
            if let Some(RefreshOutcome::Failed(e)) = outcome {
                warn!("Showing cached data, refresh failed: {}", e);
            }
            Ok(Some((snapshot, cached)))
        }
        (None, Some(RefreshOutcome::Failed(e))) => {
            bail!("Could not load {}: {}", revalidator.key(), e)
        }
        (None, _) => Ok(None),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn handle_show(
    board: &Board,
    config: &Config,
    sort: SortKey,
    search: Option<&str>,
    page: usize,
    refresh: bool,
    json: bool,
) -> Result<()> {
    let Some((snapshot, cached)) = load_view(&board.leaderboard, refresh).await? else {
        println!("No contributions found.");
        return Ok(());
    };

    if json {
        return print_json(&snapshot);
    }

    let mut view = LeaderboardView::new(config.leaderboard.page_size);
    view.set_contributors(snapshot.data);
    view.set_sort(sort);
    if let Some(query) = search {
        view.set_query(query);
    }
    view.set_page(page);

    print!("{}", report::generate_leaderboard(&view));
    println!("{}", report::last_updated_line(snapshot.timestamp, cached));
    Ok(())
}

async fn handle_refresh(board: &Board, all: bool) -> Result<()> {
    let mut outcomes = vec![(board.leaderboard.key(), board.leaderboard.refresh().await)];
    if all {
        let (contributors, stats) = tokio::join!(board.contributors.refresh(), board.stats.refresh());
        outcomes.push((board.contributors.key(), contributors));
        outcomes.push((board.stats.key(), stats));
    }

    let mut failed = 0;
    for (key, outcome) in &outcomes {
        match outcome {
            RefreshOutcome::Updated { timestamp } => {
                println!("{}: updated ({})", key, report::format_local(*timestamp))
            }
            RefreshOutcome::Empty => println!("{}: no data returned, kept previous snapshot", key),
            RefreshOutcome::Failed(e) => {
                failed += 1;
                println!("{}: failed: {}", key, e);
            }
            RefreshOutcome::Skipped => println!("{}: already refreshing", key),
        }
    }

    if failed > 0 {
        bail!("{} of {} refreshes failed", failed, outcomes.len());
    }
    Ok(())
}

async fn handle_tui(board: Board, config: &Config) -> Result<()> {
    let mut app = App::new(board, config.leaderboard.page_size);
    app.start();
    let periodic = app.board.spawn_periodic();

    let result = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let mut terminal = ratatui::try_init()?;
        let result = app.run(&mut terminal);
        ratatui::restore();
        result
    })
    .await
    .context("TUI task panicked");

    for task in periodic {
        task.abort();
    }

    result?.context("Terminal error")
}
