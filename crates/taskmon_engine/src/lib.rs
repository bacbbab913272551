//! Taskmon engine: server API, progress channels and effect execution.
mod api;
mod channel;
mod engine;
mod negotiate;
mod settings;
mod sse;
mod types;

pub use api::{ProcessingApi, ReqwestProcessingApi};
pub use channel::{
    classify, teardown_after, ChannelError, ChannelEventSink, EventSink, ProgressChannel,
};
pub use engine::EngineHandle;
pub use negotiate::JobNegotiator;
pub use settings::MonitorSettings;
pub use sse::{decode_progress, ProgressStream, SseDecoder};
pub use types::{
    ApiError, ChannelEvent, EngineEvent, GalleryQuery, JobId, LoadKind, Negotiation,
    ProgressPayload, ProgressStatus, SettleKind,
};
