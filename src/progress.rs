// src/progress.rs
use std::sync::Mutex;

/// Observability sink handed to every stage of a run.
/// Frontends implement this to surface status to users; the caller owns its lifecycle.
pub trait Progress {
    /// Called once pagination starts, with the requested record count.
    fn begin(&self, _target: usize) {}

    /// Called whenever the visible-record count grows.
    fn advance(&self, _loaded: usize) {}

    /// Called at the end of pagination, target met or not.
    fn finish(&self, _loaded: usize) {}

    fn debug(&self, _msg: &str) {}
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Forwards every line to `tracing`. Default sink for library callers.
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn debug(&self, msg: &str) { tracing::debug!("{msg}"); }
    fn info(&self, msg: &str) { tracing::info!("{msg}"); }
    fn warn(&self, msg: &str) { tracing::warn!("{msg}"); }
    fn error(&self, msg: &str) { tracing::error!("{msg}"); }
}

/// A no-op sink.
pub struct NullProgress;

impl Progress for NullProgress {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level { Debug, Info, Warn, Error }

/// Keeps every line and progress tick in memory. Used by tests to assert on
/// what a run reported without installing a global subscriber.
#[derive(Default)]
pub struct RecordingProgress {
    lines: Mutex<Vec<(Level, String)>>,
    ticks: Mutex<Vec<usize>>,
}

impl RecordingProgress {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn ticks(&self) -> Vec<usize> {
        self.ticks.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines().iter().any(|(l, m)| *l == level && m.contains(needle))
    }

    fn push(&self, level: Level, msg: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, msg.to_string()));
        }
    }
}

impl Progress for RecordingProgress {
    fn advance(&self, loaded: usize) {
        if let Ok(mut t) = self.ticks.lock() {
            t.push(loaded);
        }
    }
    fn debug(&self, msg: &str) { self.push(Level::Debug, msg); }
    fn info(&self, msg: &str) { self.push(Level::Info, msg); }
    fn warn(&self, msg: &str) { self.push(Level::Warn, msg); }
    fn error(&self, msg: &str) { self.push(Level::Error, msg); }
}
