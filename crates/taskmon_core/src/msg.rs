use crate::{JobId, ProgressUpdate, ViewLocation};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Initial page load at a location (no history push).
    PageLoaded { location: ViewLocation },
    /// User clicked a folder link.
    FolderClicked { location: ViewLocation },
    /// Browser back/forward already moved to `location`.
    HistoryNavigated { location: ViewLocation },
    /// User expanded or collapsed a folder in the tree.
    FolderToggled { path: String },
    /// User edited the search input (debounced text).
    SearchChanged(String),
    /// User picked a new sort key, e.g. `date-desc`.
    SortChanged(String),
    /// User clicked one of the bulk action buttons.
    BulkActionClicked(crate::BulkAction),
    /// User opened a bookmark stored for `folder` (empty means root).
    BookmarkOpened { folder: String },
    /// Gallery scrolled near the end.
    LoadMoreRequested,
    /// Engine finished a negotiation.
    Negotiated {
        generation: u64,
        outcome: NegotiationOutcome,
    },
    /// Engine progress channel event for a job.
    Channel { job_id: JobId, event: ChannelEvent },
    /// A scheduled teardown delay elapsed.
    TeardownDue { job_id: JobId },
    /// Engine finished a gallery request; `Ok` carries the image count.
    GalleryLoaded {
        kind: GalleryLoadKind,
        result: Result<usize, String>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationOutcome {
    /// Everything in scope is already processed.
    NotNeeded,
    /// The server started a job.
    Started(JobId),
    /// The start request failed; the detail is user-facing.
    StartFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Progress(ProgressUpdate),
    Completed(ProgressUpdate),
    /// Terminal error, from `status: error` or an `error` field.
    Failed {
        update: Option<ProgressUpdate>,
        error: String,
    },
    /// The transport closed before any terminal event.
    Disconnected { detail: String },
    /// The fallback deadline expired.
    Stalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryLoadKind {
    FirstPage,
    NextPage,
    Reload,
}
