// App state and main event loop.
// Manages tabs, syncs views from the revalidators, and handles keyboard input.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::prelude::*;

use crate::board::Board;
use crate::contributors::ContributorProfile;
use crate::refresh::{CacheState, RefreshJob, Revalidator};
use crate::state::{LeaderboardView, LoadingState, SelectableList};
use crate::stats::RepoStats;
use crate::ui;

/// Active tab in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Leaderboard,
    Contributors,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Leaderboard, Tab::Contributors, Tab::Stats];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Leaderboard => "Leaderboard",
            Tab::Contributors => "Contributors",
            Tab::Stats => "Stats",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Leaderboard => Tab::Contributors,
            Tab::Contributors => Tab::Stats,
            Tab::Stats => Tab::Leaderboard,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Tab::Leaderboard => Tab::Stats,
            Tab::Contributors => Tab::Leaderboard,
            Tab::Stats => Tab::Contributors,
        }
    }
}

/// Snapshot bookkeeping for one cached view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewStatus {
    /// Timestamp of the snapshot currently shown.
    pub updated_at: Option<i64>,
    /// Timestamp of the snapshot read from storage at startup.
    pub loaded_at: Option<i64>,
    pub refreshing: bool,
    pub last_error: Option<String>,
}

impl ViewStatus {
    /// Whether the shown snapshot came from storage rather than a fetch.
    pub fn is_cached(&self) -> bool {
        self.updated_at.is_some() && self.updated_at == self.loaded_at
    }

    /// Pick up a new snapshot timestamp. Returns true when the view needs
    /// rebuilding.
    fn observe(&mut self, timestamp: Option<i64>) -> bool {
        if timestamp == self.updated_at {
            return false;
        }
        self.updated_at = timestamp;
        true
    }
}

/// Main application state.
pub struct App {
    pub board: Board,
    /// Currently active tab.
    pub active_tab: Tab,
    pub leaderboard: LeaderboardView,
    pub contributors: SelectableList<ContributorProfile>,
    pub stats: LoadingState<RepoStats>,
    pub leaderboard_status: ViewStatus,
    pub contributors_status: ViewStatus,
    pub stats_status: ViewStatus,
    /// Search input has focus.
    pub search_active: bool,
    /// Show help overlay.
    pub show_help: bool,
    /// Whether the app should exit.
    pub should_quit: bool,
}

impl App {
    pub fn new(board: Board, page_size: usize) -> Self {
        Self {
            board,
            active_tab: Tab::default(),
            leaderboard: LeaderboardView::new(page_size),
            contributors: SelectableList::new(),
            stats: LoadingState::Idle,
            leaderboard_status: ViewStatus::default(),
            contributors_status: ViewStatus::default(),
            stats_status: ViewStatus::default(),
            search_active: false,
            show_help: false,
            should_quit: false,
        }
    }

    /// Load cached snapshots and start refreshes for anything missing or stale.
    pub fn start(&mut self) {
        self.leaderboard_status.loaded_at = revalidate(&self.board.leaderboard);
        self.contributors_status.loaded_at = revalidate(&self.board.contributors);
        self.stats_status.loaded_at = revalidate(&self.board.stats);
        self.sync();
    }

    /// Main event loop.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        while !self.should_quit {
            self.sync();
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_events()?;
        }
        Ok(())
    }

    /// Copy the latest revalidator state into the views.
    pub fn sync(&mut self) {
        if let Some(data) = sync_status(&self.board.leaderboard, &mut self.leaderboard_status) {
            self.leaderboard.set_contributors(data);
        }

        match sync_status(&self.board.contributors, &mut self.contributors_status) {
            Some(data) => self.contributors.set_loaded(data),
            None if !self.contributors.data.is_loaded() => {
                self.contributors.data = placeholder(&self.contributors_status);
            }
            None => {}
        }

        match sync_status(&self.board.stats, &mut self.stats_status) {
            Some(data) => self.stats = LoadingState::Loaded(data),
            None if !self.stats.is_loaded() => self.stats = placeholder(&self.stats_status),
            None => {}
        }
    }

    /// Status of the view on the active tab.
    pub fn active_status(&self) -> &ViewStatus {
        match self.active_tab {
            Tab::Leaderboard => &self.leaderboard_status,
            Tab::Contributors => &self.contributors_status,
            Tab::Stats => &self.stats_status,
        }
    }

    /// Handle keyboard and other events.
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.search_active {
            self.handle_search_key(key.code);
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => self.active_tab = self.active_tab.next(),
            KeyCode::BackTab => self.active_tab = self.active_tab.prev(),
            KeyCode::Char('r') => self.refresh_active(),
            KeyCode::Up | KeyCode::Char('k') => match self.active_tab {
                Tab::Leaderboard => self.leaderboard.select_prev(),
                Tab::Contributors => self.contributors.select_prev(),
                Tab::Stats => {}
            },
            KeyCode::Down | KeyCode::Char('j') => match self.active_tab {
                Tab::Leaderboard => self.leaderboard.select_next(),
                Tab::Contributors => self.contributors.select_next(),
                Tab::Stats => {}
            },
            KeyCode::Left | KeyCode::Char('h') if self.active_tab == Tab::Leaderboard => {
                self.leaderboard.prev_page()
            }
            KeyCode::Right | KeyCode::Char('l') if self.active_tab == Tab::Leaderboard => {
                self.leaderboard.next_page()
            }
            KeyCode::Char('s') if self.active_tab == Tab::Leaderboard => {
                self.leaderboard.cycle_sort()
            }
            KeyCode::Char('/') if self.active_tab == Tab::Leaderboard => {
                self.search_active = true
            }
            KeyCode::Esc if self.active_tab == Tab::Leaderboard => self.leaderboard.set_query(""),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter | KeyCode::Esc => self.search_active = false,
            KeyCode::Backspace => self.leaderboard.pop_query_char(),
            KeyCode::Char(c) => self.leaderboard.push_query_char(c),
            _ => {}
        }
    }

    /// Trigger a background refresh for the active tab.
    fn refresh_active(&mut self) {
        match self.active_tab {
            Tab::Leaderboard => drop(self.board.leaderboard.spawn_refresh()),
            Tab::Contributors => drop(self.board.contributors.spawn_refresh()),
            Tab::Stats => drop(self.board.stats.spawn_refresh()),
        }
    }
}

/// Load a snapshot and refresh it in the background unless it is fresh.
/// Returns the stored snapshot's timestamp.
fn revalidate<J: RefreshJob>(revalidator: &Arc<Revalidator<J>>) -> Option<i64> {
    let loaded = revalidator.load().map(|envelope| envelope.timestamp);
    if revalidator.state() != CacheState::Fresh {
        drop(revalidator.spawn_refresh());
    }
    loaded
}

/// Update `status` from the revalidator and return the snapshot data when
/// it changed.
fn sync_status<J: RefreshJob>(
    revalidator: &Revalidator<J>,
    status: &mut ViewStatus,
) -> Option<J::Output> {
    let snapshot = revalidator.snapshot();
    status.last_error = revalidator.last_error();
    let changed = status.observe(snapshot.as_ref().map(|s| s.timestamp));
    status.refreshing = revalidator.state() == CacheState::Refreshing;
    if changed {
        snapshot.map(|s| s.data)
    } else {
        None
    }
}

fn placeholder<T>(status: &ViewStatus) -> LoadingState<T> {
    match (&status.last_error, status.refreshing) {
        (_, true) => LoadingState::Loading,
        (Some(e), false) => LoadingState::Error(e.clone()),
        (None, false) => LoadingState::Idle,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::cache::CacheService;
    use crate::cache::clock::ManualClock;
    use crate::cache::store::MemoryStorage;
    use crate::config::Config;
    use crate::github::source::fake::{FakeSource, pull};

    fn app(source: FakeSource) -> App {
        let cache = CacheService::new(Arc::new(MemoryStorage::new()), Arc::new(ManualClock::at(1_000)));
        let board = Board::with_source(&Config::default(), Arc::new(source), cache);
        App::new(board, 10)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Leaderboard.next(), Tab::Contributors);
        assert_eq!(Tab::Stats.next(), Tab::Leaderboard);
        assert_eq!(Tab::Leaderboard.prev(), Tab::Stats);
    }

    #[tokio::test]
    async fn test_sync_picks_up_refresh() {
        let mut app = app(FakeSource::with_pulls(vec![pull(
            1,
            "alice",
            &["gssoc", "level-3"],
            true,
        )]));

        app.board.leaderboard.refresh().await;
        app.sync();

        assert_eq!(app.leaderboard.filtered_len(), 1);
        assert_eq!(app.leaderboard_status.updated_at, Some(1_000));
        assert!(!app.leaderboard_status.is_cached());
    }

    #[tokio::test]
    async fn test_failed_first_fetch_shows_error() {
        let mut app = app(FakeSource::default());

        // No repository behind the fake, so the stats lookup 404s
        app.board.stats.refresh().await;
        app.sync();

        assert!(matches!(app.stats, LoadingState::Error(_)));
        assert!(app.stats_status.last_error.is_some());
    }

    #[tokio::test]
    async fn test_start_marks_stored_snapshot_cached() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::at(1_000));
        let source = Arc::new(FakeSource::with_pulls(vec![pull(1, "alice", &["gssoc"], true)]));
        let seeded = Board::with_source(
            &Config::default(),
            source.clone(),
            CacheService::new(storage.clone(), clock.clone()),
        );
        seeded.leaderboard.refresh().await;

        let board = Board::with_source(
            &Config::default(),
            source,
            CacheService::new(storage, clock),
        );
        let mut app = App::new(board, 10);
        app.start();

        assert!(app.leaderboard_status.is_cached());
        assert_eq!(app.leaderboard.visible()[0].contributor.username, "alice");
    }

    #[test]
    fn test_search_mode_captures_keys() {
        let mut app = app(FakeSource::default());

        press(&mut app, KeyCode::Char('/'));
        assert!(app.search_active);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.leaderboard.query(), "q");

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert!(!app.search_active);
        assert_eq!(app.leaderboard.query(), "");

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut app = app(FakeSource::default());
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.active_tab, Tab::Leaderboard);

        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
    }

    #[test]
    fn test_sort_key_only_on_leaderboard() {
        let mut app = app(FakeSource::default());
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.leaderboard.sort(), crate::state::SortKey::PullRequests);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.leaderboard.sort(), crate::state::SortKey::PullRequests);
    }
}
