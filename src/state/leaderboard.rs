// Leaderboard view state.
// Sorting, search, paging and rank badges over the cached leaderboard.

use std::cmp::Ordering;
use std::collections::HashMap;

use ratatui::widgets::TableState;

use crate::scoring::{Contributor, leaderboard_order};

/// User-selectable sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortKey {
    /// Points, highest first
    #[default]
    Points,
    /// Merged PR count, highest first
    #[value(name = "prs")]
    PullRequests,
    /// Username A-Z, ignoring case
    Username,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Points => "Points",
            SortKey::PullRequests => "PRs",
            SortKey::Username => "Username",
        }
    }

    /// Next key in the cycle used by the `s` key.
    pub fn next(self) -> Self {
        match self {
            SortKey::Points => SortKey::PullRequests,
            SortKey::PullRequests => SortKey::Username,
            SortKey::Username => SortKey::Points,
        }
    }

    pub fn compare(&self, a: &Contributor, b: &Contributor) -> Ordering {
        match self {
            SortKey::Points => leaderboard_order(a, b),
            SortKey::PullRequests => b
                .prs
                .cmp(&a.prs)
                .then_with(|| leaderboard_order(a, b)),
            SortKey::Username => a
                .username
                .to_lowercase()
                .cmp(&b.username.to_lowercase())
                .then_with(|| a.username.cmp(&b.username)),
        }
    }
}

/// Badge for the top three places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBadge {
    Gold,
    Silver,
    Bronze,
    Plain,
}

impl RankBadge {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => RankBadge::Gold,
            2 => RankBadge::Silver,
            3 => RankBadge::Bronze,
            _ => RankBadge::Plain,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            RankBadge::Gold => "🥇",
            RankBadge::Silver => "🥈",
            RankBadge::Bronze => "🥉",
            RankBadge::Plain => "",
        }
    }
}

/// One displayed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardRow<'a> {
    pub rank: usize,
    pub badge: RankBadge,
    pub contributor: &'a Contributor,
}

/// Presentation state for the leaderboard.
#[derive(Debug, Clone)]
pub struct LeaderboardView {
    contributors: Vec<Contributor>,
    /// Rank by username over the full list in leaderboard order.
    ranks: HashMap<String, usize>,
    sort: SortKey,
    query: String,
    page: usize,
    page_size: usize,
    pub table_state: TableState,
}

impl Default for LeaderboardView {
    fn default() -> Self {
        Self::new(10)
    }
}

impl LeaderboardView {
    pub fn new(page_size: usize) -> Self {
        Self {
            contributors: Vec::new(),
            ranks: HashMap::new(),
            sort: SortKey::default(),
            query: String::new(),
            page: 1,
            page_size: page_size.max(1),
            table_state: TableState::default(),
        }
    }

    /// Replace the data. Sort, search and page are kept, with the page
    /// clamped to the new range.
    pub fn set_contributors(&mut self, mut contributors: Vec<Contributor>) {
        contributors.sort_by(leaderboard_order);
        self.ranks = contributors
            .iter()
            .enumerate()
            .map(|(i, c)| (c.username.clone(), i + 1))
            .collect();
        self.contributors = contributors;
        self.page = self.page.min(self.total_pages());
        self.reset_selection();
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.reset_selection();
    }

    pub fn cycle_sort(&mut self) {
        self.set_sort(self.sort.next());
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Set the search query. Always returns to page 1.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.page = 1;
        self.reset_selection();
    }

    pub fn push_query_char(&mut self, c: char) {
        let mut query = self.query.clone();
        query.push(c);
        self.set_query(&query);
    }

    pub fn pop_query_char(&mut self) {
        let mut query = self.query.clone();
        query.pop();
        self.set_query(&query);
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Go to `page`, clamped to 1..=total_pages.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
        self.reset_selection();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    /// Global rank of a user, unaffected by search or sort.
    pub fn rank_of(&self, username: &str) -> Option<usize> {
        self.ranks.get(username).copied()
    }

    /// Contributors matching the query, in the selected order.
    pub fn filtered(&self) -> Vec<&Contributor> {
        let needle = self.query.trim().to_lowercase();
        let mut matches: Vec<&Contributor> = self
            .contributors
            .iter()
            .filter(|c| {
                needle.is_empty()
                    || c.username.to_lowercase().contains(&needle)
                    || c.name.to_lowercase().contains(&needle)
            })
            .collect();
        matches.sort_by(|a, b| self.sort.compare(a, b));
        matches
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered().len()
    }

    /// At least one page, even when nothing matches.
    pub fn total_pages(&self) -> usize {
        self.filtered_len().div_ceil(self.page_size).max(1)
    }

    /// Rows on the current page.
    pub fn visible(&self) -> Vec<LeaderboardRow<'_>> {
        self.filtered()
            .into_iter()
            .skip((self.page - 1) * self.page_size)
            .take(self.page_size)
            .map(|contributor| {
                let rank = self.rank_of(&contributor.username).unwrap_or_default();
                LeaderboardRow {
                    rank,
                    badge: RankBadge::for_rank(rank),
                    contributor,
                }
            })
            .collect()
    }

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn select_prev(&mut self) {
        if self.visible().is_empty() {
            return;
        }
        let i = self.table_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.table_state.select(Some(i));
    }

    fn reset_selection(&mut self) {
        let selected = if self.visible().is_empty() { None } else { Some(0) };
        self.table_state.select(selected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contributor(username: &str, name: &str, points: u32, prs: u32) -> Contributor {
        Contributor {
            username: username.to_string(),
            name: name.to_string(),
            avatar: None,
            profile: None,
            points,
            prs,
        }
    }

    fn board(n: u32) -> Vec<Contributor> {
        (1..=n)
            .map(|i| contributor(&format!("user{:02}", i), &format!("User {}", i), 100 - i, 1))
            .collect()
    }

    #[test]
    fn test_pagination() {
        let mut view = LeaderboardView::new(10);
        view.set_contributors(board(23));

        assert_eq!(view.total_pages(), 3);
        assert_eq!(view.visible().len(), 10);

        view.set_page(3);
        assert_eq!(view.visible().len(), 3);
        assert_eq!(view.visible()[0].rank, 21);

        view.next_page();
        assert_eq!(view.page(), 3);
        view.set_page(0);
        assert_eq!(view.page(), 1);
        view.prev_page();
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_search_resets_page_and_keeps_global_rank() {
        let mut view = LeaderboardView::new(10);
        view.set_contributors(board(23));
        view.set_page(2);

        view.set_query("USER2");

        assert_eq!(view.page(), 1);
        let rows = view.visible();
        // user20..user23
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].contributor.username, "user20");
        assert_eq!(rows[0].rank, 20);
        assert_eq!(rows[0].badge, RankBadge::Plain);
    }

    #[test]
    fn test_search_matches_name() {
        let mut view = LeaderboardView::default();
        view.set_contributors(vec![
            contributor("alice", "Alice Liddell", 10, 1),
            contributor("bob", "Bob", 5, 1),
        ]);
        view.set_query("liddell");
        assert_eq!(view.filtered_len(), 1);

        view.set_query("nobody");
        assert_eq!(view.filtered_len(), 0);
        assert_eq!(view.total_pages(), 1);
        assert!(view.visible().is_empty());
        assert_eq!(view.table_state.selected(), None);
    }

    #[test]
    fn test_sort_keys_keep_ranks() {
        let mut view = LeaderboardView::default();
        view.set_contributors(vec![
            contributor("carol", "Carol", 3, 5),
            contributor("alice", "Alice", 10, 1),
            contributor("Bob", "Bob", 7, 2),
        ]);

        let order = |view: &LeaderboardView| {
            view.visible()
                .iter()
                .map(|r| (r.contributor.username.clone(), r.rank))
                .collect::<Vec<_>>()
        };

        assert_eq!(
            order(&view),
            vec![
                ("alice".to_string(), 1),
                ("Bob".to_string(), 2),
                ("carol".to_string(), 3)
            ]
        );

        view.set_sort(SortKey::PullRequests);
        assert_eq!(order(&view)[0], ("carol".to_string(), 3));

        view.set_sort(SortKey::Username);
        let names: Vec<_> = order(&view).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["alice", "Bob", "carol"]);
    }

    #[test]
    fn test_badges() {
        let mut view = LeaderboardView::default();
        view.set_contributors(board(4));
        let badges: Vec<_> = view.visible().iter().map(|r| r.badge).collect();
        assert_eq!(
            badges,
            vec![RankBadge::Gold, RankBadge::Silver, RankBadge::Bronze, RankBadge::Plain]
        );
    }

    #[test]
    fn test_new_data_clamps_page() {
        let mut view = LeaderboardView::new(10);
        view.set_contributors(board(30));
        view.set_page(3);

        view.set_contributors(board(12));
        assert_eq!(view.page(), 2);
        assert_eq!(view.visible().len(), 2);
    }

    #[test]
    fn test_sort_cycle() {
        let mut view = LeaderboardView::default();
        view.cycle_sort();
        assert_eq!(view.sort(), SortKey::PullRequests);
        view.cycle_sort();
        view.cycle_sort();
        assert_eq!(view.sort(), SortKey::Points);
    }

    #[test]
    fn test_query_editing() {
        let mut view = LeaderboardView::default();
        view.set_contributors(board(3));
        view.push_query_char('0');
        view.push_query_char('2');
        assert_eq!(view.query(), "02");
        assert_eq!(view.filtered_len(), 1);
        view.pop_query_char();
        assert_eq!(view.filtered_len(), 3);
    }
}
