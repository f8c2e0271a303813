// UI module for rendering the TUI.
// Contains the tab bar, per-tab views, search line, status bar and help overlay.

mod list;
mod tabs;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Tab};
use crate::report::{format_age, format_local};

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Last updated
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    tabs::draw_tabs(frame, app, chunks[0]);
    draw_content(frame, app, chunks[1]);
    draw_updated_line(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);

    // Help overlay (rendered last, on top of everything)
    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Draw the main content area based on active tab.
fn draw_content(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.active_tab {
        Tab::Leaderboard => draw_leaderboard_tab(frame, app, area),
        Tab::Contributors => list::render_contributors_list(frame, &mut app.contributors, area),
        Tab::Stats => list::render_stats(frame, &app.stats, area),
    }
}

/// Draw the leaderboard with its search line.
fn draw_leaderboard_tab(frame: &mut Frame, app: &mut App, area: Rect) {
    let show_search = app.search_active || !app.leaderboard.query().is_empty();
    let (table_area, search_area) = if show_search {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    let status = &app.leaderboard_status;
    if app.leaderboard.is_empty() && status.updated_at.is_none() {
        let block = Block::default().borders(Borders::ALL).title(" Leaderboard ");
        let inner = block.inner(table_area);
        frame.render_widget(block, table_area);
        match (&status.last_error, status.refreshing) {
            (_, true) => list::render_loading(frame, inner, "Loading leaderboard"),
            (Some(e), false) => list::render_error(frame, inner, e),
            (None, false) => list::render_empty(frame, inner, "No contributions yet"),
        }
    } else {
        let view = &app.leaderboard;
        let title = format!(
            " Leaderboard [page {}/{}] sort: {} ",
            view.page(),
            view.total_pages(),
            view.sort().label()
        );
        list::render_leaderboard(frame, &mut app.leaderboard, &title, table_area);
    }

    if let Some(search_area) = search_area {
        let mut spans = vec![
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(app.leaderboard.query().to_string()),
        ];
        if app.search_active {
            spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
        }
        spans.push(Span::styled(
            format!("  {} matches", app.leaderboard.filtered_len()),
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), search_area);
    }
}

/// Draw the "Last updated" line for the active tab.
fn draw_updated_line(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.active_status();
    let mut spans = match status.updated_at {
        Some(timestamp) => {
            let now = chrono::Utc::now().timestamp_millis();
            let mut spans = vec![
                Span::styled(" Last updated: ", Style::default().fg(Color::DarkGray)),
                Span::raw(format_local(timestamp)),
                Span::styled(
                    format!(" ({})", format_age(timestamp, now)),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if status.is_cached() {
                spans.push(Span::styled(" cached", Style::default().fg(Color::Yellow)));
            }
            spans
        }
        None => vec![Span::styled(
            " Never updated",
            Style::default().fg(Color::DarkGray),
        )],
    };

    if status.refreshing {
        spans.push(Span::styled("  refreshing…", Style::default().fg(Color::Cyan)));
    }
    if let Some(error) = &status.last_error {
        spans.push(Span::styled(
            format!("  last refresh failed: {}", error),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the status bar with keybinding hints and rate limit.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut hints = if app.search_active {
        vec![
            Span::raw(" type "),
            Span::styled("Filter", Style::default().fg(Color::DarkGray)),
            Span::raw("  ↵/Esc "),
            Span::styled("Done", Style::default().fg(Color::DarkGray)),
        ]
    } else {
        let mut hints = vec![
            Span::raw(" ↑↓ "),
            Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
        ];
        if app.active_tab == Tab::Leaderboard {
            hints.extend([
                Span::raw("  ←→ "),
                Span::styled("Page", Style::default().fg(Color::DarkGray)),
                Span::raw("  s "),
                Span::styled("Sort", Style::default().fg(Color::DarkGray)),
                Span::raw("  / "),
                Span::styled("Search", Style::default().fg(Color::DarkGray)),
            ]);
        }
        hints.extend([
            Span::raw("  Tab "),
            Span::styled("Switch", Style::default().fg(Color::DarkGray)),
            Span::raw("  r "),
            Span::styled("Refresh", Style::default().fg(Color::DarkGray)),
            Span::raw("  ? "),
            Span::styled("Help", Style::default().fg(Color::DarkGray)),
            Span::raw("  q "),
            Span::styled("Quit", Style::default().fg(Color::DarkGray)),
        ]);
        hints
    };

    // Add rate limit info on the right if available
    if let Some(rate) = app.board.rate_limit().filter(|rate| rate.limit > 0) {
        let rate_color = if rate.remaining < 10 {
            Color::Red
        } else if rate.remaining < 30 {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        hints.push(Span::styled(
            format!("  API: {}/{}", rate.remaining, rate.limit),
            Style::default().fg(rate_color),
        ));
    }

    let status = Paragraph::new(Line::from(hints));
    frame.render_widget(status, area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Create a centered popup
    let popup_width = 50.min(area.width);
    let popup_height = 17.min(area.height);
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let key = |k: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<14}", k), Style::default().fg(Color::Cyan)),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        key("↑/↓ or k/j", "Move selection"),
        key("←/→ or h/l", "Previous/next page"),
        key("s", "Cycle sort: points, PRs, username"),
        key("/", "Search by username or name"),
        key("Esc", "Clear search / close help"),
        key("Tab", "Switch tabs"),
        key("r", "Refresh current view"),
        key("?", "Show/hide this help"),
        key("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::backend::TestBackend;

    use super::*;
    use crate::board::Board;
    use crate::cache::CacheService;
    use crate::cache::clock::ManualClock;
    use crate::cache::store::MemoryStorage;
    use crate::config::Config;
    use crate::github::source::fake::{FakeSource, pull};

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_draws_leaderboard() {
        let cache = CacheService::new(Arc::new(MemoryStorage::new()), Arc::new(ManualClock::at(0)));
        let source = FakeSource::with_pulls(vec![pull(1, "alice", &["gssoc", "level-2"], true)]);
        let board = Board::with_source(&Config::default(), Arc::new(source), cache);
        let mut app = App::new(board, 10);
        app.board.leaderboard.refresh().await;
        app.sync();

        let text = screen(&mut app);
        assert!(text.contains("Leaderboard [page 1/1] sort: Points"));
        assert!(text.contains("alice"));
        assert!(text.contains("Last updated"));
    }

    #[test]
    fn test_draws_empty_states_and_help() {
        let cache = CacheService::new(Arc::new(MemoryStorage::new()), Arc::new(ManualClock::at(0)));
        let board = Board::with_source(&Config::default(), Arc::new(FakeSource::default()), cache);
        let mut app = App::new(board, 10);

        assert!(screen(&mut app).contains("No contributions yet"));
        assert!(screen(&mut app).contains("Never updated"));

        app.show_help = true;
        assert!(screen(&mut app).contains("Keyboard Shortcuts"));
    }
}
