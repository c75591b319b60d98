//! One renderer per collector section.
//!
//! Each section shows a status badge in its top-right corner and a body that
//! depends on the signal: pending, in progress, ready or unavailable.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use shared_types::SeverityLevel;

use crate::domain::{format_ms, PanelSnapshot, Signal, Stage};

fn badge(text: impl Into<String>, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {} ", text.into()),
        Style::default().fg(Color::Black).bg(color),
    ))
    .right_aligned()
}

fn section<'a>(title: &str, status: Option<Line<'a>>) -> Block<'a> {
    let block = Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    match status {
        Some(status) => block.title_top(status),
        None => block,
    }
}

fn dim(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(text.into(), Style::default().fg(Color::DarkGray)))
}

fn warn(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(text.into(), Style::default().fg(Color::Yellow)))
}

fn field(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(value.into()),
    ])
}

fn render_lines<'a>(frame: &mut Frame, area: Rect, block: Block<'a>, lines: Vec<Line<'a>>) {
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(paragraph, area);
}

fn in_progress(snapshot: &PanelSnapshot, stages: &[Stage]) -> bool {
    snapshot.stage.is_some_and(|stage| stages.contains(&stage))
}

pub fn render_transport(frame: &mut Frame, area: Rect, snapshot: &PanelSnapshot) {
    let (status, lines) = match &snapshot.transport {
        Some(t) if t.secure => (
            Some(badge("HTTPS active", Color::Green)),
            vec![Line::raw(t.details.clone())],
        ),
        Some(t) => (
            Some(badge("Risk", Color::Red)),
            vec![Line::raw(t.details.clone())],
        ),
        None => (None, vec![dim("Not checked yet.")]),
    };

    let mut lines = lines;
    lines.push(Line::raw(""));
    lines.push(dim(
        "The certificate is verified by the TLS stack and not inspected here, so this check is heuristic.",
    ));
    render_lines(frame, area, section("HTTPS / MITM", status), lines);
}

pub fn render_public_ip(frame: &mut Frame, area: Rect, snapshot: &PanelSnapshot) {
    let (status, lines) = match &snapshot.public_ip {
        Signal::Ready(ip) => {
            let location = match &snapshot.geo {
                Signal::Pending => "Looking up...".to_string(),
                _ => snapshot
                    .location()
                    .unwrap_or_else(|| "Not available.".to_string()),
            };
            let isp = snapshot
                .geo
                .ready()
                .and_then(|geo| geo.isp.clone())
                .unwrap_or_else(|| "Not available.".to_string());
            (
                Some(badge("Detected via STUN", Color::Green)),
                vec![
                    Line::from(Span::styled(
                        ip.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::raw(""),
                    field("Location", location),
                    field("Internet provider", isp),
                ],
            )
        }
        Signal::Unavailable(reason) => (
            Some(badge("Unavailable", Color::Yellow)),
            vec![warn(reason.clone())],
        ),
        Signal::Pending if in_progress(snapshot, &[Stage::Transport, Stage::Discovery]) => {
            (None, vec![Line::raw("Discovering the public address...")])
        }
        Signal::Pending => (
            None,
            vec![dim("Run the tests to discover the public address via STUN.")],
        ),
    };
    render_lines(frame, area, section("Public IP (STUN)", status), lines);
}

pub fn render_latency(frame: &mut Frame, area: Rect, snapshot: &PanelSnapshot) {
    let samples = snapshot.latency_samples();
    let status =
        (!samples.is_empty()).then(|| badge(format!("{} samples", samples.len()), Color::Cyan));

    let lines = match (&snapshot.latency, snapshot.latency_stats()) {
        (_, Some(stats)) => vec![
            field("Average", format_ms(Some(stats.avg))),
            field("Minimum", format_ms(Some(stats.min))),
            field("Maximum", format_ms(Some(stats.max))),
        ],
        (Signal::Unavailable(reason), None) => vec![warn(reason.clone())],
        _ if in_progress(snapshot, &[Stage::Latency]) => {
            vec![Line::raw("Measuring latency... this takes a few seconds.")]
        }
        _ => vec![dim("No latency test yet. Press [R] to run the tests.")],
    };
    render_lines(frame, area, section("Latency to the server", status), lines);
}

pub fn render_proxies(frame: &mut Frame, area: Rect, snapshot: &PanelSnapshot) {
    let (status, lines) = match &snapshot.headers {
        Signal::Ready(h) if h.proxy.detected() => {
            let mut lines = vec![
                warn("Typical proxy or load-balancer headers were found, such as X-Forwarded-* or Via. Common with CDNs and providers, but they may also indicate intermediary proxies."),
                Line::raw(""),
            ];
            lines.extend(h.proxy.headers.iter().map(|(name, value)| {
                Line::from(vec![
                    Span::styled(format!("{name}: "), Style::default().fg(Color::DarkGray)),
                    Span::raw(value.clone()),
                ])
            }));
            (Some(badge("Proxy on the route", Color::Yellow)), lines)
        }
        Signal::Ready(_) => (
            Some(badge("No obvious proxy", Color::Green)),
            vec![Line::from(Span::styled(
                "No typical proxy header was found.",
                Style::default().fg(Color::Green),
            ))],
        ),
        Signal::Unavailable(reason) => (
            Some(badge("Unavailable", Color::Yellow)),
            vec![warn(reason.clone())],
        ),
        Signal::Pending => (
            None,
            vec![dim(
                "Headers not collected yet. Run the tests to see the headers the server actually receives.",
            )],
        ),
    };
    render_lines(frame, area, section("Proxies / headers", status), lines);
}

fn level_color(level: SeverityLevel) -> Color {
    match level {
        SeverityLevel::Excellent => Color::Green,
        SeverityLevel::Ok => Color::Cyan,
        SeverityLevel::Attention => Color::Yellow,
        SeverityLevel::Critical => Color::Red,
        SeverityLevel::Unknown => Color::DarkGray,
    }
}

pub fn render_score(frame: &mut Frame, area: Rect, snapshot: &PanelSnapshot) {
    let lines = match &snapshot.score {
        Signal::Ready(result) => {
            let color = level_color(result.level);
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        result.score.to_string(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(" / 100", Style::default().fg(Color::DarkGray)),
                ]),
                Line::from(vec![
                    Span::raw("Estimated level: "),
                    Span::styled(
                        result.level.as_str(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                ]),
            ];
            if !result.issues.is_empty() {
                lines.push(Line::raw(""));
                lines.extend(result.issues.iter().map(|issue| Line::raw(format!("• {issue}"))));
            }
            lines
        }
        Signal::Unavailable(reason) => vec![warn(reason.clone())],
        Signal::Pending if in_progress(snapshot, &[Stage::Score]) => {
            vec![Line::raw("Computing the score...")]
        }
        Signal::Pending => vec![dim(
            "After a run, a heuristic 0-100 score combining HTTPS, proxies and latency is shown here.",
        )],
    };
    render_lines(frame, area, section("Security score", None), lines);
}

pub fn render_throughput(frame: &mut Frame, area: Rect, snapshot: &PanelSnapshot) {
    let direction = |sample: Option<wc_02_signal_collectors::TransferSample>| {
        sample.map_or_else(|| "unavailable".to_string(), |s| format!("{:.1} Mbit/s", s.mbps()))
    };

    let lines = match &snapshot.throughput {
        Some(report) => vec![
            field("Download", direction(report.download)),
            field("Upload", direction(report.upload)),
        ],
        None if in_progress(snapshot, &[Stage::Throughput]) => {
            vec![Line::raw("Measuring throughput...")]
        }
        None => vec![dim("Measured at the end of each run.")],
    };
    render_lines(frame, area, section("Throughput", None), lines);
}
