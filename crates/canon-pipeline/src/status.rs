//! Shared progress record for a batch run.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use canon_core::errors::BatchError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Log lines kept by default.
pub const DEFAULT_LOG_CAPACITY: usize = 500;
/// Log lines carried by a snapshot.
pub const SNAPSHOT_LOG_LINES: usize = 50;

#[derive(Debug, Default)]
struct Details {
    stage: String,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    log: VecDeque<String>,
}

/// Thread-safe run status. Counters are atomics; the rest sits behind one
/// mutex. The log is append-only and drops its oldest lines past capacity.
#[derive(Debug)]
pub struct RunStatus {
    running: AtomicBool,
    processed: AtomicUsize,
    total: AtomicUsize,
    log_capacity: usize,
    details: Mutex<Details>,
}

/// Owned copy of a [`RunStatus`] at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub running: bool,
    pub processed: usize,
    pub total: usize,
    pub progress_percent: f64,
    pub stage: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub log: Vec<String>,
}

impl RunStatus {
    pub fn new() -> Self {
        Self::with_log_capacity(DEFAULT_LOG_CAPACITY)
    }

    pub fn with_log_capacity(log_capacity: usize) -> Self {
        Self {
            running: AtomicBool::new(false),
            processed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            log_capacity: log_capacity.max(1),
            details: Mutex::new(Details::default()),
        }
    }

    fn details(&self) -> std::sync::MutexGuard<'_, Details> {
        self.details.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Marks a run as started. Refused while another run is active.
    pub fn try_begin(&self, total: usize) -> Result<(), BatchError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(BatchError::AlreadyRunning);
        }
        self.processed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
        let mut d = self.details();
        d.stage = "starting".to_string();
        d.started_at = Some(Utc::now());
        d.finished_at = None;
        d.last_error = None;
        Ok(())
    }

    pub fn set_stage(&self, stage: impl Into<String>) {
        self.details().stage = stage.into();
    }

    /// One more claim done, whatever its outcome.
    pub fn advance(&self) -> usize {
        self.processed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn record_error(&self, error: impl Into<String>) {
        let error = error.into();
        let mut d = self.details();
        push_bounded(&mut d.log, format!("ERROR {error}"), self.log_capacity);
        d.last_error = Some(error);
    }

    pub fn log(&self, line: impl Into<String>) {
        let mut d = self.details();
        push_bounded(&mut d.log, line.into(), self.log_capacity);
    }

    pub fn finish(&self, stage: impl Into<String>) {
        {
            let mut d = self.details();
            d.stage = stage.into();
            d.finished_at = Some(Utc::now());
        }
        self.running.store(false, Ordering::SeqCst);
    }

    /// Clears counters, timestamps and the log. Refused while running.
    pub fn reset(&self) -> Result<(), BatchError> {
        if self.is_running() {
            return Err(BatchError::AlreadyRunning);
        }
        self.processed.store(0, Ordering::SeqCst);
        self.total.store(0, Ordering::SeqCst);
        *self.details() = Details::default();
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let processed = self.processed.load(Ordering::SeqCst);
        let total = self.total.load(Ordering::SeqCst);
        let progress_percent = if total == 0 {
            0.0
        } else {
            (processed as f64 / total as f64 * 100.0).min(100.0)
        };
        let d = self.details();
        let skip = d.log.len().saturating_sub(SNAPSHOT_LOG_LINES);
        StatusSnapshot {
            running: self.is_running(),
            processed,
            total,
            progress_percent,
            stage: d.stage.clone(),
            started_at: d.started_at,
            finished_at: d.finished_at,
            last_error: d.last_error.clone(),
            log: d.log.iter().skip(skip).cloned().collect(),
        }
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::new()
    }
}

fn push_bounded(log: &mut VecDeque<String>, line: String, capacity: usize) {
    while log.len() >= capacity {
        log.pop_front();
    }
    log.push_back(line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused() {
        let status = RunStatus::new();
        status.try_begin(3).unwrap();
        assert!(matches!(status.try_begin(3), Err(BatchError::AlreadyRunning)));
        status.finish("done");
        status.try_begin(1).unwrap();
    }

    #[test]
    fn reset_refused_while_running() {
        let status = RunStatus::new();
        status.try_begin(2).unwrap();
        status.advance();
        assert!(status.reset().is_err());
        status.finish("done");
        status.reset().unwrap();
        let snap = status.snapshot();
        assert_eq!(snap.processed, 0);
        assert!(snap.started_at.is_none());
        assert!(snap.log.is_empty());
    }

    #[test]
    fn log_is_bounded_and_snapshot_takes_tail() {
        let status = RunStatus::with_log_capacity(60);
        for i in 0..100 {
            status.log(format!("line {i}"));
        }
        let snap = status.snapshot();
        assert_eq!(snap.log.len(), SNAPSHOT_LOG_LINES);
        assert_eq!(snap.log.first().map(String::as_str), Some("line 50"));
        assert_eq!(snap.log.last().map(String::as_str), Some("line 99"));
        assert_eq!(status.details().log.len(), 60);
    }

    #[test]
    fn progress_percent() {
        let status = RunStatus::new();
        assert_eq!(status.snapshot().progress_percent, 0.0);
        status.try_begin(4).unwrap();
        status.advance();
        assert_eq!(status.snapshot().progress_percent, 25.0);
        assert!(status.snapshot().running);
    }

    #[test]
    fn errors_are_logged_and_kept() {
        let status = RunStatus::new();
        status.record_error("claim 7: boom");
        let snap = status.snapshot();
        assert_eq!(snap.last_error.as_deref(), Some("claim 7: boom"));
        assert_eq!(snap.log, vec!["ERROR claim 7: boom".to_string()]);
    }
}
