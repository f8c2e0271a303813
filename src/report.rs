// Plain-text rendering for the non-interactive commands.
// Builds leaderboard, contributor and stats listings as strings.

use chrono::{DateTime, Local, TimeZone};

use crate::contributors::ContributorProfile;
use crate::state::LeaderboardView;
use crate::stats::RepoStats;

/// Format an epoch-millisecond timestamp in local time.
pub fn format_local(timestamp: i64) -> String {
    match Local.timestamp_millis_opt(timestamp).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "unknown".to_string(),
    }
}

/// "Last updated" line for a snapshot. `cached` marks data served from
/// storage rather than fetched by this run.
pub fn last_updated_line(timestamp: i64, cached: bool) -> String {
    let mut line = format!("Last updated: {}", format_local(timestamp));
    if cached {
        line.push_str(" (cached)");
    }
    line
}

/// Relative age such as "5m ago".
pub fn format_age(timestamp: i64, now: i64) -> String {
    let (Some(then), Some(now)) = (
        DateTime::from_timestamp_millis(timestamp),
        DateTime::from_timestamp_millis(now),
    ) else {
        return "unknown".to_string();
    };
    let duration = now.signed_duration_since(then);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Current page of the leaderboard as a text table.
pub fn generate_leaderboard(view: &LeaderboardView) -> String {
    let mut output = String::new();

    if view.is_empty() {
        output.push_str("No contributions found.\n");
        return output;
    }

    let rows = view.visible();
    if rows.is_empty() {
        output.push_str(&format!("No contributors match \"{}\".\n", view.query()));
        return output;
    }

    output.push_str(&format!(
        "{:<6} {:<24} {:<24} {:>6} {:>4}\n",
        "Rank", "Username", "Name", "Points", "PRs"
    ));
    output.push_str(&format!("{}\n", "-".repeat(68)));

    for row in rows {
        let rank = format!("{}{}", row.badge.symbol(), row.rank);
        output.push_str(&format!(
            "{:<6} {:<24} {:<24} {:>6} {:>4}\n",
            rank,
            truncate(&row.contributor.username, 24),
            truncate(&row.contributor.name, 24),
            row.contributor.points,
            row.contributor.prs
        ));
    }

    output.push_str(&format!(
        "\nPage {} of {} · {} contributors · sorted by {}",
        view.page(),
        view.total_pages(),
        view.filtered_len(),
        view.sort().label()
    ));
    if !view.query().is_empty() {
        output.push_str(&format!(" · search \"{}\"", view.query()));
    }
    output.push('\n');

    output
}

/// Contributor profiles, one block per person.
pub fn generate_contributors(profiles: &[ContributorProfile]) -> String {
    let mut output = String::new();

    if profiles.is_empty() {
        output.push_str("No contributors found.\n");
        return output;
    }

    for profile in profiles {
        output.push_str(&format!(
            "{} (@{}) · {}\n",
            profile.name, profile.login, profile.role
        ));
        output.push_str(&format!(
            "  {} contributions · {} followers · {} repos\n",
            profile.contributions, profile.followers, profile.public_repos
        ));
        let place: Vec<&str> = [profile.company.as_deref(), profile.location.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !place.is_empty() {
            output.push_str(&format!("  {}\n", place.join(" · ")));
        }
        output.push_str(&format!("  {}\n", profile.bio));
    }

    output
}

/// Repository stats as aligned label/value lines.
pub fn generate_stats(stats: &RepoStats) -> String {
    let mut output = format!("{}\n\n", stats.full_name);
    for (label, value) in stats.rows() {
        output.push_str(&format!("{:<14} {}\n", label, value));
    }
    output
}
