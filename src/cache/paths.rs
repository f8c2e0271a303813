// Cache path utilities.
// Resolves the cache directory and the file behind each storage key.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Storage key for the scored leaderboard.
pub const LEADERBOARD_KEY: &str = "leaderboardData";
/// Storage key for enriched contributor profiles.
pub const CONTRIBUTORS_KEY: &str = "github_contributors";
/// Storage key for repository stats.
pub const STATS_KEY: &str = "github_stats";

/// Get the base cache directory (~/.cache/eventra-board on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "eventra-board").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the JSON file holding a storage key.
pub fn key_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", sanitize_name(key)))
}

/// Path to the log file used while the TUI owns the terminal.
pub fn log_path(dir: &Path) -> PathBuf {
    dir.join("eventra-board.log")
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("simple"), "simple");
        assert_eq!(sanitize_name("with/slash"), "with_slash");
        assert_eq!(sanitize_name("owner:name"), "owner_name");
    }

    #[test]
    fn test_key_paths() {
        let dir = Path::new("/tmp/board");
        assert!(key_path(dir, LEADERBOARD_KEY).ends_with("leaderboardData.json"));
        assert!(key_path(dir, CONTRIBUTORS_KEY).ends_with("github_contributors.json"));
        assert!(key_path(dir, "../escape").ends_with(".._escape.json"));
        assert!(log_path(dir).ends_with("eventra-board.log"));
    }
}
