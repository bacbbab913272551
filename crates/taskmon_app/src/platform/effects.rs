use std::sync::mpsc;
use std::thread;

use taskmon_core::{
    ChannelEvent, Effect, GalleryLoadKind, GalleryRequest, JobId, Msg, NegotiationOutcome,
    ProgressUpdate, TeardownReason, ViewLocation,
};
use taskmon_engine::{
    ApiError, EngineEvent, EngineHandle, GalleryQuery, LoadKind, MonitorSettings, Negotiation,
    ProgressPayload, SettleKind,
};
use taskmon_logging::{taskmon_debug, taskmon_info};

use super::ui::surface::ConsoleSurface;

/// Executes effects: IO goes to the engine, page effects to the surface.
pub struct EffectRunner {
    engine: EngineHandle,
    surface: ConsoleSurface,
    page_size: usize,
}

impl EffectRunner {
    pub fn new(settings: MonitorSettings, msg_tx: mpsc::Sender<Msg>) -> Result<Self, ApiError> {
        let page_size = settings.page_size;
        let engine = EngineHandle::new(settings)?;
        let runner = Self {
            engine,
            surface: ConsoleSurface,
            page_size,
        };
        runner.spawn_event_loop(msg_tx);
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Negotiate { generation, scope } => {
                    taskmon_info!("Negotiate generation={generation} scope={scope}");
                    self.engine.negotiate(generation, scope.request_path());
                }
                Effect::Subscribe { job_id } => {
                    self.engine.subscribe(job_id.as_str().to_string());
                }
                Effect::CloseChannel => self.engine.close_channel(),
                Effect::ScheduleTeardown { job_id, reason } => {
                    self.engine
                        .schedule_teardown(job_id.as_str().to_string(), settle_kind(reason));
                }
                Effect::LoadGallery(request) => {
                    let kind = load_kind(request.kind);
                    self.engine
                        .load_gallery(kind, gallery_query(&request, self.page_size));
                }
                Effect::ShowNotice(text) => self.surface.show_notice(&text),
                other => self.surface.apply(&other),
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || {
            while let Some(event) = engine.recv() {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            }
            taskmon_debug!("Engine event loop stopped");
        });
    }
}

fn settle_kind(reason: TeardownReason) -> SettleKind {
    match reason {
        TeardownReason::Completed => SettleKind::Success,
        TeardownReason::Failed => SettleKind::Failure,
        TeardownReason::Disconnected => SettleKind::Disconnect,
        TeardownReason::Stalled => SettleKind::Immediate,
    }
}

fn load_kind(kind: GalleryLoadKind) -> LoadKind {
    match kind {
        GalleryLoadKind::FirstPage => LoadKind::FirstPage,
        GalleryLoadKind::NextPage => LoadKind::NextPage,
        GalleryLoadKind::Reload => LoadKind::Reload,
    }
}

fn gallery_load_kind(kind: LoadKind) -> GalleryLoadKind {
    match kind {
        LoadKind::FirstPage => GalleryLoadKind::FirstPage,
        LoadKind::NextPage => GalleryLoadKind::NextPage,
        LoadKind::Reload => GalleryLoadKind::Reload,
    }
}

fn gallery_query(request: &GalleryRequest, page_size: usize) -> GalleryQuery {
    let path = match &request.location {
        ViewLocation::FolderTree => String::new(),
        ViewLocation::Gallery(path) => path.clone(),
    };
    GalleryQuery {
        path,
        search: request.search_query.clone(),
        sort_by: request.sort_by.clone(),
        offset: request.offset,
        limit: page_size,
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Negotiated { generation, result } => Msg::Negotiated {
            generation,
            outcome: match result {
                Negotiation::NotNeeded => NegotiationOutcome::NotNeeded,
                Negotiation::Started {
                    job_id,
                    failed_open,
                } => {
                    if failed_open {
                        taskmon_info!("Job {job_id} started after a failed processing check");
                    }
                    NegotiationOutcome::Started(JobId::new(job_id))
                }
                Negotiation::StartFailed(err) => NegotiationOutcome::StartFailed(err.to_string()),
            },
        },
        EngineEvent::Channel { job_id, event } => Msg::Channel {
            job_id: JobId::new(job_id),
            event: map_channel_event(event),
        },
        EngineEvent::TeardownDue { job_id } => Msg::TeardownDue {
            job_id: JobId::new(job_id),
        },
        EngineEvent::GalleryLoaded { kind, result } => Msg::GalleryLoaded {
            kind: gallery_load_kind(kind),
            result: result.map_err(|err| err.to_string()),
        },
    }
}

fn map_channel_event(event: taskmon_engine::ChannelEvent) -> ChannelEvent {
    match event {
        taskmon_engine::ChannelEvent::Progress(payload) => {
            ChannelEvent::Progress(map_payload(payload))
        }
        taskmon_engine::ChannelEvent::Completed(payload) => {
            ChannelEvent::Completed(map_payload(payload))
        }
        taskmon_engine::ChannelEvent::Failed { payload, error } => ChannelEvent::Failed {
            update: payload.map(map_payload),
            error,
        },
        taskmon_engine::ChannelEvent::Disconnected { detail } => {
            ChannelEvent::Disconnected { detail }
        }
        taskmon_engine::ChannelEvent::Stalled => ChannelEvent::Stalled,
    }
}

fn map_payload(payload: ProgressPayload) -> ProgressUpdate {
    ProgressUpdate {
        processed: payload.processed,
        total: payload.total,
        percentage: payload.percentage,
        message: payload.message,
    }
}
