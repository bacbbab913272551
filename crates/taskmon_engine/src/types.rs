use serde::Deserialize;
use thiserror::Error;

/// Job identifier as issued by the server.
pub type JobId = String;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Decode(String),
    /// The server answered but refused; the text is its own explanation.
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    #[default]
    #[serde(alias = "starting")]
    Pending,
    #[serde(alias = "processing")]
    Running,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

/// One `data:` payload of the progress stream.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ProgressPayload {
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Progress(ProgressPayload),
    Completed(ProgressPayload),
    /// `payload` is `None` when the server sent only an error field.
    Failed {
        payload: Option<ProgressPayload>,
        error: String,
    },
    Disconnected { detail: String },
    Stalled,
}

impl ChannelEvent {
    /// Whether the channel stops after this event.
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Negotiation {
    NotNeeded,
    Started {
        job_id: JobId,
        /// The "needed?" check failed or timed out and was assumed true.
        failed_open: bool,
    },
    StartFailed(ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    FirstPage,
    NextPage,
    Reload,
}

/// Which settle delay a scheduled teardown waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleKind {
    Success,
    Failure,
    Disconnect,
    Immediate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryQuery {
    /// Folder path relative to the collection root.
    pub path: String,
    pub search: String,
    /// Sort key in `field-order` form, e.g. `date-desc`.
    pub sort_by: String,
    pub offset: usize,
    pub limit: usize,
}

impl GalleryQuery {
    /// Splits `sort_by` into field and order; a bare field sorts descending.
    pub fn sort_parts(&self) -> (&str, &str) {
        match self.sort_by.split_once('-') {
            Some((field, order)) => (field, order),
            None => (self.sort_by.as_str(), "desc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Negotiated {
        generation: u64,
        result: Negotiation,
    },
    Channel {
        job_id: JobId,
        event: ChannelEvent,
    },
    TeardownDue {
        job_id: JobId,
    },
    GalleryLoaded {
        kind: LoadKind,
        result: Result<usize, ApiError>,
    },
}
