//! Subscriber installation.
//!
//! One `EnvFilter` in front of at most one `fmt` layer. The layer is JSON or
//! human-readable, and writes to stderr or to an append-only file. File
//! output goes through a background writer thread.

use crate::{TelemetryConfig, TelemetryError};
use std::fs::OpenOptions;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

fn fmt_layer<S, W>(json: bool, ansi: bool, writer: W) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed()
    }
}

/// Install the global subscriber described by `config`.
///
/// With file output, the returned guard flushes buffered lines when dropped.
pub(crate) fn init_logging(
    config: &TelemetryConfig,
) -> Result<Option<WorkerGuard>, TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Filter(format!("{}: {e}", config.log_level)))?;

    let mut writer_guard = None;
    let output = match (&config.log_file, config.console_output) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| TelemetryError::LogFile {
                    path: path.clone(),
                    source: e,
                })?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            writer_guard = Some(guard);
            Some(fmt_layer(config.json_logs, false, writer))
        }
        (None, true) => Some(fmt_layer(config.json_logs, true, std::io::stderr)),
        (None, false) => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(output)
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInitialised)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        log_file = ?config.log_file,
        "Logging initialized"
    );
    Ok(writer_guard)
}
