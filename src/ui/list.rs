// List and table rendering for each tab.
// Provides styled views with loading, error and empty states.

use ratatui::{prelude::*, widgets::*};

use crate::contributors::{ContributorProfile, Role};
use crate::state::{LeaderboardView, LoadingState, RankBadge, SelectableList};
use crate::stats::RepoStats;

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, area);
}

/// Render an error message.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let text = Paragraph::new(format!("❌ {}", error))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red));
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

fn badge_color(badge: RankBadge) -> Color {
    match badge {
        RankBadge::Gold => Color::Yellow,
        RankBadge::Silver => Color::Gray,
        RankBadge::Bronze => Color::LightRed,
        RankBadge::Plain => Color::White,
    }
}

fn role_color(role: Role) -> Color {
    match role {
        Role::ProjectLead => Color::Magenta,
        Role::CoreMaintainer => Color::Cyan,
        Role::ActiveContributor => Color::Green,
        Role::RegularContributor => Color::Blue,
        Role::NewContributor => Color::Gray,
    }
}

/// Render the current leaderboard page.
pub fn render_leaderboard(frame: &mut Frame, view: &mut LeaderboardView, title: &str, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());

    let rows: Vec<Row> = view
        .visible()
        .iter()
        .map(|row| {
            let style = Style::default().fg(badge_color(row.badge));
            Row::new(vec![
                Cell::from(format!("{} {}", row.badge.symbol(), row.rank)).style(style),
                Cell::from(row.contributor.username.clone()),
                Cell::from(row.contributor.name.clone())
                    .style(Style::default().fg(Color::DarkGray)),
                Cell::from(row.contributor.points.to_string())
                    .style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(row.contributor.prs.to_string()),
            ])
        })
        .collect();

    if rows.is_empty() {
        let message = if view.is_empty() {
            "No contributions yet"
        } else {
            "No contributors match the search"
        };
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_empty(frame, inner, message);
        return;
    }

    let header = Row::new(vec!["Rank", "Username", "Name", "Points", "PRs"])
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Length(8),
            Constraint::Length(5),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut view.table_state);
}

/// Render contributor profiles.
pub fn render_contributors_list(
    frame: &mut Frame,
    list: &mut SelectableList<ContributorProfile>,
    area: Rect,
) {
    match &list.data {
        LoadingState::Idle => render_empty(frame, area, "Press r to load contributors"),
        LoadingState::Loading => render_loading(frame, area, "Loading contributors"),
        LoadingState::Error(e) => render_error(frame, area, e),
        LoadingState::Loaded(data) => {
            if data.is_empty() {
                render_empty(frame, area, "No contributors found");
                return;
            }

            let items: Vec<ListItem> = data
                .iter()
                .map(|c| {
                    ListItem::new(vec![
                        Line::from(vec![
                            Span::styled(
                                c.name.clone(),
                                Style::default().add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(
                                format!(" @{}", c.login),
                                Style::default().fg(Color::DarkGray),
                            ),
                            Span::raw("  "),
                            Span::styled(c.role.title(), Style::default().fg(role_color(c.role))),
                        ]),
                        Line::from(Span::styled(
                            format!(
                                "  {} contributions · {} followers · {} repos · {}",
                                c.contributions, c.followers, c.public_repos, c.bio
                            ),
                            Style::default().fg(Color::Gray),
                        )),
                    ])
                })
                .collect();

            let title = format!(" Contributors ({}) ", data.len());
            let list_widget = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(title))
                .highlight_style(
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");

            frame.render_stateful_widget(list_widget, area, &mut list.list_state);
        }
    }
}

/// Render repository stats as a two-column table.
pub fn render_stats(frame: &mut Frame, stats: &LoadingState<RepoStats>, area: Rect) {
    match stats {
        LoadingState::Idle => render_empty(frame, area, "Press r to load stats"),
        LoadingState::Loading => render_loading(frame, area, "Loading repository stats"),
        LoadingState::Error(e) => render_error(frame, area, e),
        LoadingState::Loaded(stats) => {
            let rows: Vec<Row> = stats
                .rows()
                .into_iter()
                .map(|(label, value)| {
                    Row::new(vec![
                        Cell::from(label).style(Style::default().fg(Color::Cyan)),
                        Cell::from(value),
                    ])
                })
                .collect();

            let table = Table::new(rows, [Constraint::Length(16), Constraint::Min(10)]).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", stats.full_name)),
            );
            frame.render_widget(table, area);
        }
    }
}
