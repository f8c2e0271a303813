// Command-line interface.
// Global flags override the config file; subcommands pick the view.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::state::SortKey;

/// Contribution-points leaderboard for a GitHub repository.
///
/// Scores merged pull requests by their labels, caches the result locally,
/// and refreshes it in the background once it goes stale.
///
/// Examples:
///   eventra-board show
///   eventra-board show --sort prs --search ali
///   eventra-board --repo octo/hello refresh --all
///   eventra-board tui
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .eventra-board.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Repository to score, as OWNER/NAME
    #[arg(long, value_name = "OWNER/NAME", global = true)]
    pub repo: Option<String>,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Directory for cached snapshots
    #[arg(long, value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print one page of the leaderboard
    Show {
        /// Sort order
        #[arg(long, value_enum, default_value_t = SortKey::Points)]
        sort: SortKey,

        /// Filter by username or name (case-insensitive)
        #[arg(long, value_name = "QUERY")]
        search: Option<String>,

        /// Page to print, starting at 1
        #[arg(long, default_value = "1", value_name = "N")]
        page: usize,

        /// Refetch before printing even if the cache is fresh
        #[arg(long)]
        refresh: bool,

        /// Print the full leaderboard as JSON
        #[arg(long)]
        json: bool,
    },

    /// Refetch and store a new snapshot
    Refresh {
        /// Also refresh contributor profiles and repository stats
        #[arg(long)]
        all: bool,
    },

    /// Print contributor profiles
    Contributors {
        #[arg(long)]
        json: bool,
    },

    /// Print repository stats
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Interactive terminal UI
    Tui,

    /// Generate a default .eventra-board.toml configuration file
    InitConfig,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default log level for the verbosity flags.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::WARN
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Whether the terminal belongs to the TUI, so logs must go elsewhere.
    pub fn is_tui(&self) -> bool {
        self.command == Command::Tui
    }
}
