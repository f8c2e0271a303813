// Configuration file handling.
// Loads `.eventra-board.toml`, fills defaults, and applies CLI overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::error::Result;
use crate::github::{GITHUB_API_BASE, MAX_PER_PAGE, PageLimits, RepoId};
use crate::scoring::ScoringRules;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".eventra-board.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub leaderboard: LeaderboardConfig,

    #[serde(default)]
    pub contributors: ContributorsConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Which repository to score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_owner")]
    pub owner: String,

    #[serde(default = "default_name")]
    pub name: String,

    /// Login shown as "Project Lead". Defaults to the owner.
    #[serde(default)]
    pub lead: Option<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            name: default_name(),
            lead: None,
        }
    }
}

fn default_owner() -> String {
    "SandeepVashishtha".to_string()
}

fn default_name() -> String {
    "Eventra".to_string()
}

/// GitHub API access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Token; usually supplied through `GITHUB_TOKEN` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_per_page")]
    pub per_page: u32,

    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token: None,
            timeout_seconds: default_timeout(),
            per_page: default_per_page(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_api_base() -> String {
    GITHUB_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_per_page() -> u32 {
    MAX_PER_PAGE
}

fn default_max_pages() -> u32 {
    50
}

/// Leaderboard scoring and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    #[serde(default = "default_leaderboard_max_age")]
    pub max_age_minutes: u64,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// A PR counts if any label contains one of these.
    #[serde(default = "default_qualifying_labels")]
    pub qualifying_labels: Vec<String>,

    /// Points per label, e.g. `"level-2" = 7`.
    #[serde(default = "default_points")]
    pub points: BTreeMap<String, u32>,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            max_age_minutes: default_leaderboard_max_age(),
            page_size: default_page_size(),
            qualifying_labels: default_qualifying_labels(),
            points: default_points(),
        }
    }
}

impl LeaderboardConfig {
    /// Scoring rules with label keys normalized.
    pub fn rules(&self) -> ScoringRules {
        ScoringRules {
            qualifying_labels: self.qualifying_labels.clone(),
            points: self.points.clone(),
        }
        .normalized()
    }
}

fn default_qualifying_labels() -> Vec<String> {
    ScoringRules::default().qualifying_labels
}

fn default_points() -> BTreeMap<String, u32> {
    ScoringRules::default().points
}

fn default_leaderboard_max_age() -> u64 {
    60
}

fn default_page_size() -> usize {
    10
}

/// Contributor profiles view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorsConfig {
    #[serde(default = "default_contributors_max_age")]
    pub max_age_minutes: u64,

    /// Concurrent `/users/{login}` lookups.
    #[serde(default = "default_profile_concurrency")]
    pub profile_concurrency: usize,
}

impl Default for ContributorsConfig {
    fn default() -> Self {
        Self {
            max_age_minutes: default_contributors_max_age(),
            profile_concurrency: default_profile_concurrency(),
        }
    }
}

fn default_contributors_max_age() -> u64 {
    60
}

fn default_profile_concurrency() -> usize {
    4
}

/// Repository stats view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_stats_max_age")]
    pub max_age_minutes: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            max_age_minutes: default_stats_max_age(),
        }
    }
}

fn default_stats_max_age() -> u64 {
    30
}

/// Where snapshots are stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Overrides the platform cache directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn minutes(m: u64) -> Duration {
    Duration::from_secs(m.max(1) * 60)
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load `path` if given, else `.eventra-board.toml` if present, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply command-line overrides.
    pub fn merge_with_args(&mut self, args: &Args) -> Result<()> {
        if let Some(repo) = &args.repo {
            let repo: RepoId = repo.parse()?;
            self.repository.owner = repo.owner;
            self.repository.name = repo.name;
        }
        if args.token.is_some() {
            self.github.token = args.token.clone();
        }
        if let Some(dir) = &args.cache_dir {
            self.cache.dir = Some(dir.clone());
        }
        Ok(())
    }

    pub fn repo(&self) -> RepoId {
        RepoId::new(&self.repository.owner, &self.repository.name)
    }

    /// Project lead login, falling back to the repository owner.
    pub fn lead(&self) -> String {
        self.repository
            .lead
            .clone()
            .unwrap_or_else(|| self.repository.owner.clone())
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            per_page: self.github.per_page.clamp(1, MAX_PER_PAGE),
            max_pages: self.github.max_pages.max(1),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.github.timeout_seconds.max(1))
    }

    pub fn leaderboard_max_age(&self) -> Duration {
        minutes(self.leaderboard.max_age_minutes)
    }

    pub fn contributors_max_age(&self) -> Duration {
        minutes(self.contributors.max_age_minutes)
    }

    pub fn stats_max_age(&self) -> Duration {
        minutes(self.stats.max_age_minutes)
    }

    /// Configured cache directory or the platform default.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache.dir.clone().or_else(crate::cache::cache_dir)
    }

    /// Default configuration as commented TOML, for `init-config`.
    pub fn default_toml() -> String {
        r#"# eventra-board configuration

[repository]
owner = "SandeepVashishtha"
name = "Eventra"
# lead = "sandeepvashishtha"

[github]
api_base = "https://api.github.com"
timeout_seconds = 30
per_page = 100
# Fail instead of committing a truncated leaderboard past this many pages
max_pages = 50

[leaderboard]
max_age_minutes = 60
page_size = 10
qualifying_labels = ["gssoc", "gsoc"]

[leaderboard.points]
"level-1" = 3
"level-2" = 7
"level-3" = 10

[contributors]
max_age_minutes = 60
profile_concurrency = 4

[stats]
max_age_minutes = 30

[cache]
# dir = "/path/to/cache"
"#
        .to_string()
    }
}
