use std::sync::{mpsc, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use taskmon_logging::{taskmon_debug, taskmon_info, taskmon_warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    ApiError, ChannelEvent, EngineEvent, JobId, ProcessingApi, ProgressPayload, ProgressStatus,
};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Why a progress stream ended without a terminal event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("could not open progress stream: {0}")]
    Open(ApiError),
    #[error("progress stream failed: {0}")]
    Transport(ApiError),
    #[error("progress stream closed before completion")]
    Closed,
}

/// Maps one payload to a channel event. An `error` field wins over `status`.
pub fn classify(payload: ProgressPayload) -> ChannelEvent {
    if let Some(error) = payload.error.clone() {
        // Error-only payloads carry no counts worth applying.
        let payload = (payload.total > 0 || payload.processed > 0).then_some(payload);
        return ChannelEvent::Failed { payload, error };
    }
    match payload.status {
        ProgressStatus::Completed => ChannelEvent::Completed(payload),
        ProgressStatus::Error => {
            let error = payload
                .message
                .clone()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "Unknown error".to_string());
            ChannelEvent::Failed {
                payload: Some(payload),
                error,
            }
        }
        ProgressStatus::Pending | ProgressStatus::Running | ProgressStatus::Unknown => {
            ChannelEvent::Progress(payload)
        }
    }
}

/// One subscription to a job's progress stream.
pub struct ProgressChannel {
    api: Arc<dyn ProcessingApi>,
    job_id: JobId,
    deadline: Duration,
    cancel: CancellationToken,
}

impl ProgressChannel {
    pub fn new(
        api: Arc<dyn ProcessingApi>,
        job_id: JobId,
        deadline: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            job_id,
            deadline,
            cancel,
        }
    }

    /// Forwards events to `sink` until a final one (terminal, disconnect or
    /// stall) has been emitted, and returns it. Returns `None` if cancelled;
    /// nothing is emitted after cancellation.
    pub async fn run(&self, sink: &dyn EventSink) -> Option<ChannelEvent> {
        let deadline = tokio::time::sleep(self.deadline);
        tokio::pin!(deadline);

        let opened = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            _ = &mut deadline => return Some(self.stall(sink)),
            opened = self.api.open_progress(&self.job_id) => opened,
        };
        let mut stream = match opened {
            Ok(stream) => stream,
            Err(err) => {
                let detail = ChannelError::Open(err).to_string();
                return Some(self.emit(sink, ChannelEvent::Disconnected { detail }));
            }
        };
        taskmon_info!("Subscribed to progress of job {}", self.job_id);

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    taskmon_debug!("Progress channel for job {} cancelled", self.job_id);
                    return None;
                }
                _ = &mut deadline => return Some(self.stall(sink)),
                next = stream.next() => next,
            };
            let event = match next {
                Some(Ok(payload)) => classify(payload),
                Some(Err(err)) => ChannelEvent::Disconnected {
                    detail: ChannelError::Transport(err).to_string(),
                },
                None => ChannelEvent::Disconnected {
                    detail: ChannelError::Closed.to_string(),
                },
            };
            if event.is_final() {
                return Some(self.emit(sink, event));
            }
            self.emit(sink, event);
        }
    }

    fn stall(&self, sink: &dyn EventSink) -> ChannelEvent {
        taskmon_warn!(
            "No terminal event for job {} within {:?}; closing progress channel",
            self.job_id,
            self.deadline
        );
        self.emit(sink, ChannelEvent::Stalled)
    }

    fn emit(&self, sink: &dyn EventSink, event: ChannelEvent) -> ChannelEvent {
        if event.is_final() {
            taskmon_info!("Job {} progress channel finished: {event:?}", self.job_id);
        }
        sink.emit(EngineEvent::Channel {
            job_id: self.job_id.clone(),
            event: event.clone(),
        });
        event
    }
}

/// Emits `TeardownDue` after `delay` unless `cancel` fires first.
pub async fn teardown_after(
    job_id: JobId,
    delay: Duration,
    cancel: CancellationToken,
    sink: &dyn EventSink,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            taskmon_debug!("Teardown of job {job_id} cancelled");
            false
        }
        _ = tokio::time::sleep(delay) => {
            sink.emit(EngineEvent::TeardownDue { job_id });
            true
        }
    }
}
