//! Task monitor core: pure state machine for the background processing job,
//! the navigation gate, and the reload decision.
mod effect;
mod gate;
mod job;
mod location;
mod msg;
mod reload;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, GalleryRequest};
pub use gate::{BulkAction, Control, ControlChange, NavigationGate, GATED_CONTROLS, GATE_NOTICE};
pub use job::{
    clamp_percentage, Job, JobId, JobPhase, JobStatus, ProgressUpdate, TeardownReason,
};
pub use location::{is_global_search, Scope, ViewLocation, GLOBAL_SEARCH_PREFIX};
pub use msg::{ChannelEvent, GalleryLoadKind, Msg, NegotiationOutcome};
pub use reload::{plan_reload, ReloadPlan};
pub use state::{AppState, DEFAULT_SORT};
pub use update::update;
pub use view_model::{AppViewModel, JobView};
