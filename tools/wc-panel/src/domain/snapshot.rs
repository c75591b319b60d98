//! Immutable view of one diagnostic run.
//!
//! The runner never edits a published snapshot. Each collector result is
//! merged into a new value with one of the `with_*` methods and that value
//! replaces the previous one wholesale.

use chrono::{DateTime, Utc};
use shared_types::{GeoInfo, ScoreRequest, ScoreResult};
use std::fmt;
use wc_02_signal_collectors::{
    country_code_to_flag, HeaderSnapshot, ThroughputReport, TransportSecurity,
};
use wc_03_score::LatencyStats;

/// Outcome of one collector within the current run.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Signal<T> {
    /// Not collected yet.
    #[default]
    Pending,
    Ready(T),
    /// The collector ran and produced nothing. The text is shown to the user.
    Unavailable(String),
}

impl<T> Signal<T> {
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Unavailable(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// The collector a run is currently waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transport,
    Discovery,
    Geo,
    Latency,
    Headers,
    Score,
    Throughput,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Transport => "Checking transport security",
            Stage::Discovery => "Discovering public address via STUN",
            Stage::Geo => "Looking up address location",
            Stage::Latency => "Measuring latency",
            Stage::Headers => "Collecting request headers",
            Stage::Score => "Computing security score",
            Stage::Throughput => "Measuring throughput",
        }
    }
}

/// Everything the panel knows after the latest collector finished.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelSnapshot {
    /// Probe API base URL the collectors talk to.
    pub endpoint: String,
    /// `Some` while a run is in progress.
    pub stage: Option<Stage>,
    pub transport: Option<TransportSecurity>,
    pub public_ip: Signal<String>,
    pub geo: Signal<GeoInfo>,
    pub latency: Signal<Vec<f64>>,
    pub headers: Signal<HeaderSnapshot>,
    pub score: Signal<ScoreResult>,
    /// `None` unless throughput sampling is enabled.
    pub throughput: Option<ThroughputReport>,
    /// Completion time of the last finished run.
    pub last_run: Option<DateTime<Utc>>,
}

impl PanelSnapshot {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Fresh snapshot for a new run: previous signals are dropped, the
    /// transport verdict and last completion time carry over.
    #[must_use]
    pub fn begin_run(self) -> Self {
        Self {
            endpoint: self.endpoint,
            stage: Some(Stage::Transport),
            transport: self.transport,
            last_run: self.last_run,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn at_stage(self, stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..self
        }
    }

    #[must_use]
    pub fn with_transport(self, transport: TransportSecurity) -> Self {
        Self {
            transport: Some(transport),
            ..self
        }
    }

    #[must_use]
    pub fn with_public_ip(self, public_ip: Signal<String>) -> Self {
        Self { public_ip, ..self }
    }

    #[must_use]
    pub fn with_geo(self, geo: Signal<GeoInfo>) -> Self {
        Self { geo, ..self }
    }

    /// A run that produced no samples at all is reported as unavailable.
    #[must_use]
    pub fn with_latency(self, samples: Vec<f64>) -> Self {
        let latency = if samples.is_empty() {
            Signal::Unavailable("Latency could not be measured.".to_string())
        } else {
            Signal::Ready(samples)
        };
        Self { latency, ..self }
    }

    #[must_use]
    pub fn with_headers(self, headers: Signal<HeaderSnapshot>) -> Self {
        Self { headers, ..self }
    }

    #[must_use]
    pub fn with_score(self, score: Signal<ScoreResult>) -> Self {
        Self { score, ..self }
    }

    #[must_use]
    pub fn with_throughput(self, report: ThroughputReport) -> Self {
        Self {
            throughput: Some(report),
            ..self
        }
    }

    #[must_use]
    pub fn finished(self, at: DateTime<Utc>) -> Self {
        Self {
            stage: None,
            last_run: Some(at),
            ..self
        }
    }

    pub fn is_running(&self) -> bool {
        self.stage.is_some()
    }

    pub fn latency_samples(&self) -> &[f64] {
        self.latency.ready().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn latency_stats(&self) -> Option<LatencyStats> {
        LatencyStats::from_samples(self.latency_samples())
    }

    /// Flag emoji for the looked-up country, empty when unknown.
    pub fn flag(&self) -> String {
        self.geo
            .ready()
            .and_then(|geo| geo.country_code.as_deref())
            .map(country_code_to_flag)
            .unwrap_or_default()
    }

    /// Flag and location text of a successful lookup. `None` while pending,
    /// after a failed lookup, or when the provider named no place.
    pub fn location(&self) -> Option<String> {
        let text = self.geo.ready()?.location_text();
        if text.is_empty() {
            return None;
        }
        let flag = self.flag();
        Some(if flag.is_empty() {
            text
        } else {
            format!("{flag} {text}")
        })
    }

    /// Score payload built from whatever has been collected so far.
    pub fn score_request(&self) -> ScoreRequest {
        let headers = self.headers.ready();
        let samples = self.latency_samples();
        ScoreRequest {
            https_secure: self.transport.as_ref().is_some_and(|t| t.secure),
            public_ip: self.public_ip.ready().cloned(),
            latency_samples: (!samples.is_empty()).then(|| samples.to_vec()),
            proxy_headers: headers.map(|h| h.proxy.headers.clone()).unwrap_or_default(),
            raw_headers: headers.map(|h| h.headers.clone()).unwrap_or_default(),
        }
    }
}

/// Milliseconds rounded to whole units, `-` when absent.
pub fn format_ms(ms: Option<f64>) -> String {
    match ms {
        Some(ms) if ms.is_finite() => format!("{ms:.0} ms"),
        _ => "-".to_string(),
    }
}
