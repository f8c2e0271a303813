// Label rules for contribution scoring.
// Decides which pull requests qualify and how many points their labels carry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::github::Label;

/// Scoring rules shared by every leaderboard computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// A PR qualifies if any label contains one of these (case-insensitive).
    #[serde(default = "default_qualifying_labels")]
    pub qualifying_labels: Vec<String>,

    /// Points per normalized label name.
    #[serde(default = "default_points")]
    pub points: BTreeMap<String, u32>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            qualifying_labels: default_qualifying_labels(),
            points: default_points(),
        }
    }
}

fn default_qualifying_labels() -> Vec<String> {
    vec!["gssoc".to_string(), "gsoc".to_string()]
}

fn default_points() -> BTreeMap<String, u32> {
    BTreeMap::from([
        ("level-1".to_string(), 3),
        ("level-2".to_string(), 7),
        ("level-3".to_string(), 10),
    ])
}

/// Lowercase and drop all whitespace, so "Level-2 " and "level - 2" both
/// become "level-2".
pub fn normalize_label(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl ScoringRules {
    /// Whether any label marks the PR as part of the program.
    pub fn qualifies(&self, labels: &[Label]) -> bool {
        labels.iter().any(|label| {
            let name = label.name.to_lowercase();
            self.qualifying_labels
                .iter()
                .any(|token| name.contains(&token.to_lowercase()))
        })
    }

    /// Sum of points over all labels. Unknown labels score nothing.
    pub fn points_for(&self, labels: &[Label]) -> u32 {
        labels
            .iter()
            .filter_map(|label| self.points.get(&normalize_label(&label.name)))
            .sum()
    }

    /// Same rules with every points key normalized, so config files may
    /// spell keys loosely.
    pub fn normalized(mut self) -> Self {
        self.points = self
            .points
            .into_iter()
            .map(|(key, value)| (normalize_label(&key), value))
            .collect();
        self
    }
}
