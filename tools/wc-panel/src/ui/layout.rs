//! Main layout orchestration.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  WIFI-CHECK v0.1.0   Last run: 12:04:31        [R]un [A]bout [Q]│
//! ├────────────────────────────────┬────────────────────────────────┤
//! │  HTTPS / MITM                  │  PUBLIC IP (STUN)              │
//! ├────────────────────────────────┼────────────────────────────────┤
//! │  LATENCY                       │  PROXIES / HEADERS             │
//! ├────────────────────────────────┴──────────────┬─────────────────┤
//! │  SECURITY SCORE                               │  THROUGHPUT     │
//! └───────────────────────────────────────────────┴─────────────────┘
//! │  disclaimer                                                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{App, AppState, PanelSnapshot};

use super::{sections, widgets};

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.area();

    // Main vertical layout: header, body, footer
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(12),   // Body
            Constraint::Length(3), // Footer
        ])
        .split(size);

    render_header(frame, main_chunks[0], &app.snapshot);
    render_body(frame, main_chunks[1], app);
    render_footer(frame, main_chunks[2], &app.snapshot);

    if app.state == AppState::About {
        widgets::render_about_overlay(frame);
    }
}

/// Render the header bar.
fn render_header(frame: &mut Frame, area: Rect, snapshot: &PanelSnapshot) {
    let title = vec![
        Span::styled(
            " WIFI-CHECK ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            concat!("v", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    // Current stage while running, otherwise the last completion time
    let status = if let Some(stage) = snapshot.stage {
        Span::styled(
            format!(" ⟳ {}... ", stage.label()),
            Style::default().fg(Color::Yellow),
        )
    } else if let Some(time) = snapshot.last_run {
        Span::styled(
            format!(
                " Last run: {} ",
                time.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
            ),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled(" Not run yet ", Style::default().fg(Color::DarkGray))
    };

    let hints = vec![
        Span::styled("[R]", Style::default().fg(Color::Yellow)),
        Span::raw("un tests "),
        Span::styled("[A]", Style::default().fg(Color::Yellow)),
        Span::raw("bout "),
        Span::styled("[Q]", Style::default().fg(Color::Yellow)),
        Span::raw("uit "),
    ];

    // Calculate spacing
    let title_len: usize = title.iter().map(|s| s.width()).sum();
    let status_len = status.width();
    let hints_len: usize = hints.iter().map(|s| s.width()).sum();
    let padding = usize::from(area.width.saturating_sub(2))
        .saturating_sub(title_len + status_len + hints_len);

    let mut spans = title;
    spans.push(status);
    spans.push(Span::raw(" ".repeat(padding)));
    spans.extend(hints);

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    frame.render_widget(header, area);
}

/// Render the section grid.
fn render_body(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let halves = |area: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area)
    };

    let snapshot = &app.snapshot;
    let top = halves(rows[0]);
    sections::render_transport(frame, top[0], snapshot);
    sections::render_public_ip(frame, top[1], snapshot);

    let middle = halves(rows[1]);
    sections::render_latency(frame, middle[0], snapshot);
    sections::render_proxies(frame, middle[1], snapshot);

    if app.throughput_enabled {
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(rows[2]);
        sections::render_score(frame, bottom[0], snapshot);
        sections::render_throughput(frame, bottom[1], snapshot);
    } else {
        sections::render_score(frame, rows[2], snapshot);
    }
}

/// Render the footer with the probed endpoint and the disclaimer.
fn render_footer(frame: &mut Frame, area: Rect, snapshot: &PanelSnapshot) {
    let line = vec![
        Span::styled(snapshot.endpoint.clone(), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(
            "Hints about the security of the route only. Not a substitute for professional traffic analysis tools.",
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let footer = Paragraph::new(Line::from(line))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .centered();

    frame.render_widget(footer, area);
}
