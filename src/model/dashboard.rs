use super::resources::{ResourceSnapshot, Section};
use chrono::{DateTime, Local};

/// Coarse state of the dashboard as seen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing fetched yet.
    Loading,
    Ready,
    /// A fetch is running; the previous snapshot stays on screen.
    Refreshing,
    /// The last fetch failed.
    Error,
}

/// View state owned by the dashboard screen. A fresh value is installed
/// every time the dashboard is shown.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub snapshot: ResourceSnapshot,
    pub active_section: Section,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            snapshot: ResourceSnapshot::default(),
            active_section: Section::default(),
            loading: true,
            refreshing: false,
            error: None,
            last_updated: None,
        }
    }
}

impl DashboardState {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.refreshing {
            Phase::Refreshing
        } else if self.error.is_some() {
            Phase::Error
        } else {
            Phase::Ready
        }
    }

    pub fn begin_fetch(&mut self) {
        self.refreshing = true;
    }

    /// Installs a freshly fetched snapshot in place of the previous one.
    pub fn apply_snapshot(&mut self, snapshot: ResourceSnapshot) {
        self.snapshot = snapshot;
        self.loading = false;
        self.refreshing = false;
        self.error = None;
        self.last_updated = Some(Local::now());
    }

    /// Records a failed fetch. The snapshot from the last success is kept.
    pub fn apply_failure(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.loading = false;
        self.refreshing = false;
    }

    pub fn select_section(&mut self, section: Section) {
        self.active_section = section;
    }
}
