//! Application state management.

use super::PanelSnapshot;

/// Application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Main dashboard view.
    #[default]
    Dashboard,
    /// About overlay.
    About,
    /// Quitting.
    Quit,
}

/// Main application model.
#[derive(Debug, Default)]
pub struct App {
    /// Current application state/view.
    pub state: AppState,
    /// Latest snapshot published by the runner.
    pub snapshot: PanelSnapshot,
    /// Throughput sampling is part of every run.
    pub throughput_enabled: bool,
    run_requested: bool,
}

impl App {
    pub fn new(snapshot: PanelSnapshot, throughput_enabled: bool) -> Self {
        Self {
            snapshot,
            throughput_enabled,
            ..Self::default()
        }
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: char) {
        match self.state {
            AppState::Dashboard => self.handle_dashboard_key(key),
            AppState::About => {
                // Any key closes the overlay
                self.state = AppState::Dashboard;
            }
            AppState::Quit => {}
        }
    }

    fn handle_dashboard_key(&mut self, key: char) {
        match key {
            'q' | 'Q' => self.state = AppState::Quit,
            'a' | 'A' | '?' => self.state = AppState::About,
            'r' | 'R' if !self.snapshot.is_running() => self.run_requested = true,
            _ => {}
        }
    }

    /// Consume a pending run request.
    pub fn take_run_request(&mut self) -> bool {
        std::mem::take(&mut self.run_requested)
    }

    pub fn update_snapshot(&mut self, snapshot: PanelSnapshot) {
        self.snapshot = snapshot;
    }

    /// Check if the app should quit.
    pub fn should_quit(&self) -> bool {
        self.state == AppState::Quit
    }
}
