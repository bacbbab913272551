use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use taskmon_logging::{taskmon_debug, taskmon_error, taskmon_info};
use tokio_util::sync::CancellationToken;

use crate::channel::{teardown_after, ChannelEventSink, ProgressChannel};
use crate::{
    ApiError, EngineEvent, GalleryQuery, JobId, JobNegotiator, LoadKind, MonitorSettings,
    ProcessingApi, ReqwestProcessingApi, SettleKind,
};

enum EngineCommand {
    Negotiate { generation: u64, path: String },
    Subscribe { job_id: JobId },
    CloseChannel,
    ScheduleTeardown { job_id: JobId, kind: SettleKind },
    LoadGallery { kind: LoadKind, query: GalleryQuery },
}

#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: MonitorSettings) -> Result<Self, ApiError> {
        let api = Arc::new(ReqwestProcessingApi::new(&settings)?);
        Ok(Self::with_api(api, settings))
    }

    pub fn with_api(api: Arc<dyn ProcessingApi>, settings: MonitorSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    taskmon_error!("Failed to start engine runtime: {err}");
                    return;
                }
            };
            let mut worker = Worker {
                api,
                settings,
                event_tx,
                active: None,
            };
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(&runtime, command);
            }
            taskmon_debug!("Engine command channel closed");
            if let Some(active) = worker.active.take() {
                active.token.cancel();
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn negotiate(&self, generation: u64, path: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Negotiate {
            generation,
            path: path.into(),
        });
    }

    /// Opens a progress channel, closing any previous one first.
    pub fn subscribe(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::Subscribe { job_id });
    }

    /// Closes the active channel and cancels its pending teardown.
    pub fn close_channel(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CloseChannel);
    }

    pub fn schedule_teardown(&self, job_id: JobId, kind: SettleKind) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::ScheduleTeardown { job_id, kind });
    }

    pub fn load_gallery(&self, kind: LoadKind, query: GalleryQuery) {
        let _ = self.cmd_tx.send(EngineCommand::LoadGallery { kind, query });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    /// Blocks until the next event; `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv().ok()
    }
}

struct ActiveChannel {
    job_id: JobId,
    token: CancellationToken,
}

struct Worker {
    api: Arc<dyn ProcessingApi>,
    settings: MonitorSettings,
    event_tx: mpsc::Sender<EngineEvent>,
    active: Option<ActiveChannel>,
}

impl Worker {
    fn handle(&mut self, runtime: &tokio::runtime::Runtime, command: EngineCommand) {
        match command {
            EngineCommand::Negotiate { generation, path } => {
                let api = self.api.clone();
                let check_timeout = self.settings.check_timeout;
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let negotiator = JobNegotiator::new(api.as_ref(), check_timeout);
                    let result = negotiator.negotiate(&path).await;
                    let _ = event_tx.send(EngineEvent::Negotiated { generation, result });
                });
            }
            EngineCommand::Subscribe { job_id } => {
                self.close_active();
                let token = CancellationToken::new();
                let channel = ProgressChannel::new(
                    self.api.clone(),
                    job_id.clone(),
                    self.settings.fallback_deadline,
                    token.clone(),
                );
                let sink = ChannelEventSink::new(self.event_tx.clone());
                runtime.spawn(async move {
                    channel.run(&sink).await;
                });
                self.active = Some(ActiveChannel { job_id, token });
            }
            EngineCommand::CloseChannel => self.close_active(),
            EngineCommand::ScheduleTeardown { job_id, kind } => {
                let cancel = match &self.active {
                    Some(active) if active.job_id == job_id => active.token.child_token(),
                    _ => {
                        taskmon_debug!("Teardown for job {job_id} has no open channel");
                        CancellationToken::new()
                    }
                };
                let delay = self.settings.settle_delay(kind);
                taskmon_info!("Tearing down job {job_id} in {delay:?} ({kind:?})");
                let sink = ChannelEventSink::new(self.event_tx.clone());
                runtime.spawn(async move {
                    teardown_after(job_id, delay, cancel, &sink).await;
                });
            }
            EngineCommand::LoadGallery { kind, query } => {
                let api = self.api.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let result = api.load_images(&query).await;
                    let _ = event_tx.send(EngineEvent::GalleryLoaded { kind, result });
                });
            }
        }
    }

    fn close_active(&mut self) {
        if let Some(active) = self.active.take() {
            taskmon_debug!("Closing progress channel for job {}", active.job_id);
            active.token.cancel();
        }
    }
}
