// State management module.
// Presentation state for the leaderboard and the generic list views.

pub mod leaderboard;
pub mod list;

pub use leaderboard::{LeaderboardView, RankBadge, SortKey};
pub use list::{LoadingState, SelectableList};
