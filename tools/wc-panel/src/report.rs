//! Headless report for `--once`.

use crate::domain::{format_ms, PanelSnapshot, Signal};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared_types::{DiscoveryOutcome, GeoInfo, HeaderSet, ScoreResult};
use std::fmt::Write;

/// Machine-readable report, printed by `--once --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<'a> {
    pub endpoint: &'a str,
    pub last_run: Option<DateTime<Utc>>,
    pub https: Option<HttpsReport<'a>>,
    pub public_ip: DiscoveryOutcome,
    pub geo: Option<&'a GeoInfo>,
    pub latency: Option<LatencyReport<'a>>,
    pub proxy: Option<ProxySection<'a>>,
    pub score: Option<&'a ScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput: Option<ThroughputMbps>,
}

#[derive(Debug, Serialize)]
pub struct HttpsReport<'a> {
    pub secure: bool,
    pub details: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LatencyReport<'a> {
    pub samples: &'a [f64],
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Serialize)]
pub struct ProxySection<'a> {
    pub detected: bool,
    pub headers: &'a HeaderSet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThroughputMbps {
    pub download_mbps: Option<f64>,
    pub upload_mbps: Option<f64>,
}

impl<'a> Report<'a> {
    pub fn from_snapshot(snapshot: &'a PanelSnapshot) -> Self {
        let public_ip = match &snapshot.public_ip {
            Signal::Ready(ip) => DiscoveryOutcome::found(ip.as_str()),
            Signal::Unavailable(reason) => DiscoveryOutcome::failed(reason.as_str()),
            Signal::Pending => DiscoveryOutcome::failed("not run"),
        };

        Self {
            endpoint: &snapshot.endpoint,
            last_run: snapshot.last_run,
            https: snapshot.transport.as_ref().map(|t| HttpsReport {
                secure: t.secure,
                details: &t.details,
            }),
            public_ip,
            geo: snapshot.geo.ready(),
            latency: snapshot.latency_stats().map(|stats| LatencyReport {
                samples: snapshot.latency_samples(),
                avg: stats.avg,
                min: stats.min,
                max: stats.max,
            }),
            proxy: snapshot.headers.ready().map(|h| ProxySection {
                detected: h.proxy.detected(),
                headers: &h.proxy.headers,
            }),
            score: snapshot.score.ready(),
            throughput: snapshot.throughput.as_ref().map(|t| ThroughputMbps {
                download_mbps: t.download.map(|s| s.mbps()),
                upload_mbps: t.upload.map(|s| s.mbps()),
            }),
        }
    }
}

pub fn render_json(snapshot: &PanelSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Report::from_snapshot(snapshot))
}

fn unavailable<T>(signal: &Signal<T>) -> &str {
    signal.unavailable_reason().unwrap_or("not run")
}

/// Plain-text report, one section per collector.
pub fn render_text(snapshot: &PanelSnapshot) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_text(&mut out, snapshot);
    out
}

fn write_text(out: &mut String, snapshot: &PanelSnapshot) -> std::fmt::Result {
    writeln!(out, "wifi-check report for {}", snapshot.endpoint)?;
    if let Some(at) = snapshot.last_run {
        writeln!(out, "Last run: {}", at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    }
    writeln!(out)?;

    match &snapshot.transport {
        Some(t) => writeln!(
            out,
            "HTTPS / MITM       {} - {}",
            if t.secure { "secure" } else { "RISK" },
            t.details
        )?,
        None => writeln!(out, "HTTPS / MITM       not checked")?,
    }

    match &snapshot.public_ip {
        Signal::Ready(ip) => {
            writeln!(out, "Public IP (STUN)   {ip}")?;
            match &snapshot.geo {
                Signal::Ready(geo) => {
                    let location = snapshot.location();
                    writeln!(
                        out,
                        "  Location         {}",
                        location.as_deref().unwrap_or("Not available.")
                    )?;
                    writeln!(
                        out,
                        "  ISP              {}",
                        geo.isp.as_deref().unwrap_or("Not available.")
                    )?;
                }
                other => writeln!(out, "  Location         unavailable ({})", unavailable(other))?,
            }
        }
        other => writeln!(out, "Public IP (STUN)   unavailable ({})", unavailable(other))?,
    }

    match snapshot.latency_stats() {
        Some(stats) => writeln!(
            out,
            "Latency            {} samples, avg {}, min {}, max {}",
            stats.count,
            format_ms(Some(stats.avg)),
            format_ms(Some(stats.min)),
            format_ms(Some(stats.max))
        )?,
        None => writeln!(out, "Latency            unavailable ({})", unavailable(&snapshot.latency))?,
    }

    match &snapshot.headers {
        Signal::Ready(h) if h.proxy.detected() => {
            writeln!(out, "Proxies / headers  proxy on the route")?;
            for (name, value) in &h.proxy.headers {
                writeln!(out, "  {name}: {value}")?;
            }
        }
        Signal::Ready(_) => writeln!(out, "Proxies / headers  no obvious proxy")?,
        other => writeln!(out, "Proxies / headers  unavailable ({})", unavailable(other))?,
    }

    match &snapshot.score {
        Signal::Ready(score) => {
            writeln!(out, "Security score     {}/100 ({})", score.score, score.level)?;
            for issue in &score.issues {
                writeln!(out, "  - {issue}")?;
            }
        }
        other => writeln!(out, "Security score     unavailable ({})", unavailable(other))?,
    }

    if let Some(report) = &snapshot.throughput {
        let direction = |sample: Option<wc_02_signal_collectors::TransferSample>| {
            sample.map_or_else(|| "unavailable".to_string(), |s| format!("{:.1} Mbit/s", s.mbps()))
        };
        writeln!(
            out,
            "Throughput         download {}, upload {}",
            direction(report.download),
            direction(report.upload)
        )?;
    }

    Ok(())
}
