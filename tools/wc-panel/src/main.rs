//! wc-panel: wifi-check diagnostic panel

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use wc_panel::{report, ui, App, Args, DiagnosticRunner, PanelSnapshot};
use wc_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Nothing may write to the terminal while the TUI owns it.
    let telemetry = if args.once {
        TelemetryConfig::from_env()
    } else {
        TelemetryConfig::for_terminal_ui()
    };
    let _telemetry = init_telemetry(telemetry.with_service_name("wc-panel"))
        .context("failed to initialise logging")?;

    let runner = DiagnosticRunner::from_args(&args).context("invalid panel settings")?;
    info!(endpoint = runner.endpoint(), once = args.once, "Panel starting");

    if args.once {
        return run_once(&runner, args.json).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, Arc::new(runner)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "Panel exited with an error");
    }
    result
}

async fn run_once(runner: &DiagnosticRunner, json: bool) -> anyhow::Result<()> {
    let (updates, _rx) = watch::channel(runner.initial_snapshot());
    let snapshot = runner.run(&updates).await;

    let output = if json {
        report::render_json(&snapshot).context("failed to encode report")?
    } else {
        report::render_text(&snapshot)
    };
    println!("{output}");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    runner: Arc<DiagnosticRunner>,
) -> anyhow::Result<()> {
    let (updates, mut snapshots) = watch::channel(runner.initial_snapshot());
    let updates = Arc::new(updates);
    let mut app = App::new(snapshots.borrow().clone(), runner.measures_throughput());
    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        if snapshots.has_changed()? {
            app.update_snapshot(snapshots.borrow_and_update().clone());
        }

        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle input with timeout so runner updates keep flowing
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char(c) => app.handle_key(c),
                        KeyCode::Esc => app.handle_key('q'),
                        _ => {}
                    }
                }
            }
        }

        if app.take_run_request() && in_flight.as_ref().map_or(true, JoinHandle::is_finished) {
            in_flight = Some(spawn_run(Arc::clone(&runner), Arc::clone(&updates)));
        }

        if app.should_quit() {
            if let Some(task) = in_flight {
                task.abort();
            }
            return Ok(());
        }
    }
}

fn spawn_run(
    runner: Arc<DiagnosticRunner>,
    updates: Arc<watch::Sender<PanelSnapshot>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        runner.run(&updates).await;
    })
}
