//! About overlay: what a network-side probe can and cannot tell.

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const DETECTABLE: [&str; 6] = [
    "Whether the endpoint is reached over HTTPS with a verified certificate chain.",
    "The approximate public address, discovered via STUN.",
    "Location and provider of that address.",
    "Round-trip latency to the probe server.",
    "Transparent proxies, through headers such as Via and X-Forwarded-*.",
    "A mismatch between the STUN address and the address the server sees.",
];

const UNDETECTABLE: [&str; 4] = [
    "Running a real traceroute from this device.",
    "Reading the routing table or the system network configuration.",
    "Telling whether the Wi-Fi uses WPA2, WPA3 or another protocol.",
    "Auditing the whole attack surface of the network: this is risk inference, not an audit.",
];

fn bullets<'a>(items: &'a [&'static str]) -> impl Iterator<Item = Line<'static>> + 'a {
    items.iter().map(|item| {
        Line::from(vec![
            Span::styled("  • ", Style::default().fg(Color::Yellow)),
            Span::raw(*item),
        ])
    })
}

/// Render a centered about overlay.
pub fn render_about_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(70, 80, frame.area());

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)))
    };

    let mut text = vec![heading("What a network-side probe can detect"), Line::raw("")];
    text.extend(bullets(&DETECTABLE));
    text.push(Line::raw(""));
    text.push(heading("What it cannot detect"));
    text.push(Line::raw(""));
    text.extend(bullets(&UNDETECTABLE));
    text.push(Line::raw(""));
    text.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" About the test ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(paragraph, popup_area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);

    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
