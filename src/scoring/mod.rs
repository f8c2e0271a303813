// Contribution scoring module.
// Label rules plus the fold from pull requests to a ranked leaderboard.

pub mod aggregate;
pub mod rules;

pub use aggregate::{Contributor, fetch_leaderboard, leaderboard_order};
pub use rules::ScoringRules;
