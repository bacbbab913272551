use crate::{BulkAction, ControlChange, GalleryLoadKind, JobId, Scope, TeardownReason, ViewLocation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask whether `scope` needs processing and start a job if so.
    Negotiate { generation: u64, scope: Scope },
    /// Open the progress channel for a job, replacing any open channel.
    Subscribe { job_id: JobId },
    /// Close the progress channel and cancel its pending timers.
    CloseChannel,
    /// Deliver `Msg::TeardownDue` after the delay for `reason`.
    ScheduleTeardown {
        job_id: JobId,
        reason: TeardownReason,
    },
    SetControls(Vec<ControlChange>),
    ShowNotice(String),
    PushHistory(ViewLocation),
    /// Put `location` back on the history stack after a rejected transition.
    RestoreHistory(ViewLocation),
    RestoreSearch(String),
    RestoreSort(String),
    ToggleFolder { path: String },
    RunBulkAction(BulkAction),
    LoadFolderTree,
    LoadGallery(GalleryRequest),
}

/// One page request against the gallery loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryRequest {
    pub kind: GalleryLoadKind,
    pub location: ViewLocation,
    pub search_query: String,
    pub sort_by: String,
    pub offset: usize,
}
