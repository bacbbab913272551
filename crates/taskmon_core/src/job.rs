use std::fmt;

use crate::{Scope, ViewLocation};

/// Opaque, server-assigned job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Why a job is being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownReason {
    /// Server reported `completed`.
    Completed,
    /// Server reported `error` or sent an error field.
    Failed,
    /// The stream closed or broke before any terminal event.
    Disconnected,
    /// No terminal event before the fallback deadline.
    Stalled,
}

impl TeardownReason {
    /// Abandoned jobs never reported an outcome of their own.
    pub fn is_abandoned(self) -> bool {
        matches!(self, Self::Disconnected | Self::Stalled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Channel events are applied.
    Tracking,
    /// Teardown is pending; channel events are ignored.
    Settling(TeardownReason),
}

/// One decoded progress event, as reported by the server.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressUpdate {
    pub processed: u64,
    pub total: u64,
    /// Server-reported percentage. `None` or non-finite means "derive it".
    pub percentage: Option<f64>,
    pub message: Option<String>,
}

/// The single processing run tracked by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: JobId,
    status: JobStatus,
    processed: u64,
    total: u64,
    percentage: f64,
    message: Option<String>,
    scope: Scope,
    origin: ViewLocation,
    phase: JobPhase,
}

impl Job {
    pub fn new(id: JobId, scope: Scope, origin: ViewLocation) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            processed: 0,
            total: 0,
            percentage: 0.0,
            message: None,
            scope,
            origin,
            phase: JobPhase::Tracking,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Always within `[0, 100]`.
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Location the user was on when the job started.
    pub fn origin(&self) -> &ViewLocation {
        &self.origin
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn is_tracking(&self) -> bool {
        self.phase == JobPhase::Tracking
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self.phase, JobPhase::Settling(reason) if reason.is_abandoned())
    }

    /// Applies a non-terminal progress event.
    pub(crate) fn apply_progress(&mut self, update: &ProgressUpdate) {
        self.apply_counts(update);
        self.status = JobStatus::Running;
    }

    /// Applies the final event and stops tracking.
    pub(crate) fn finish(&mut self, update: Option<&ProgressUpdate>, reason: TeardownReason) {
        if let Some(update) = update {
            self.apply_counts(update);
        }
        self.status = match reason {
            TeardownReason::Completed => JobStatus::Completed,
            TeardownReason::Failed => JobStatus::Error,
            TeardownReason::Disconnected | TeardownReason::Stalled => self.status,
        };
        self.phase = JobPhase::Settling(reason);
    }

    fn apply_counts(&mut self, update: &ProgressUpdate) {
        self.total = update.total;
        self.processed = if update.total > 0 {
            update.processed.min(update.total)
        } else {
            update.processed
        };
        self.percentage = clamp_percentage(update.percentage, self.processed, self.total);
        if let Some(message) = update.message.as_deref().filter(|m| !m.trim().is_empty()) {
            self.message = Some(message.to_string());
        }
    }
}

/// Reported percentage clamped to `[0, 100]`, or derived from the counts
/// when the server sent none.
pub fn clamp_percentage(reported: Option<f64>, processed: u64, total: u64) -> f64 {
    let raw = match reported {
        Some(value) if value.is_finite() => value,
        _ if total > 0 => processed as f64 / total as f64 * 100.0,
        _ => 0.0,
    };
    raw.clamp(0.0, 100.0)
}
