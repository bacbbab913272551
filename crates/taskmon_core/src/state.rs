use taskmon_logging::{taskmon_debug, taskmon_info};

use crate::effect::GalleryRequest;
use crate::view_model::{AppViewModel, JobView};
use crate::{Effect, GalleryLoadKind, Job, NavigationGate, Scope, ViewLocation};

pub const DEFAULT_SORT: &str = "date-desc";

/// Process-wide monitor state. Only [`crate::update`] mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    location: ViewLocation,
    search_query: String,
    sort_by: String,
    gate: NavigationGate,
    job: Option<Job>,
    generation: u64,
    pending_negotiation: Option<u64>,
    loaded_images: usize,
    last_notice: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            location: ViewLocation::FolderTree,
            search_query: String::new(),
            sort_by: DEFAULT_SORT.to_string(),
            gate: NavigationGate::new(),
            job: None,
            generation: 0,
            pending_negotiation: None,
            loaded_images: 0,
            last_notice: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from saved view preferences (search text and sort key).
    pub fn with_preferences(search_query: impl Into<String>, sort_by: impl Into<String>) -> Self {
        Self {
            search_query: search_query.into(),
            sort_by: sort_by.into(),
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            location: self.location.clone(),
            search_query: self.search_query.clone(),
            sort_by: self.sort_by.clone(),
            gate_engaged: self.gate.is_engaged(),
            disabled_controls: self.gate.disabled_controls(),
            job: self.job.as_ref().map(JobView::from_job),
            negotiating: self.pending_negotiation.is_some(),
            loaded_images: self.loaded_images,
            last_notice: self.last_notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn location(&self) -> &ViewLocation {
        &self.location
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn gate(&self) -> &NavigationGate {
        &self.gate
    }

    pub fn is_negotiating(&self) -> bool {
        self.pending_negotiation.is_some()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn search_query(&self) -> &str {
        &self.search_query
    }

    pub(crate) fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub(crate) fn set_location(&mut self, location: ViewLocation) {
        self.location = location;
        self.mark_dirty();
    }

    pub(crate) fn set_search_query(&mut self, query: String) {
        self.search_query = query;
        self.mark_dirty();
    }

    pub(crate) fn set_sort_by(&mut self, sort_by: String) {
        self.sort_by = sort_by;
        self.mark_dirty();
    }

    pub(crate) fn job_mut(&mut self) -> Option<&mut Job> {
        self.job.as_mut()
    }

    pub(crate) fn notice(&mut self, text: impl Into<String>) -> Effect {
        let text = text.into();
        self.last_notice = Some(text.clone());
        self.mark_dirty();
        Effect::ShowNotice(text)
    }

    /// Starts tracking a freshly started job and locks the UI.
    pub(crate) fn track_job(&mut self, job: Job) -> Vec<Effect> {
        taskmon_info!("Tracking job {} for {}", job.id(), job.scope());
        let job_id = job.id().clone();
        self.job = Some(job);
        self.mark_dirty();
        let mut effects = Vec::with_capacity(2);
        let changes = self.gate.engage();
        if !changes.is_empty() {
            effects.push(Effect::SetControls(changes));
        }
        effects.push(Effect::Subscribe { job_id });
        effects
    }

    /// Forgets the tracked job: closes its channel and releases the gate.
    /// Does not reload; callers decide that.
    pub(crate) fn drop_job(&mut self) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if let Some(job) = self.job.take() {
            taskmon_info!("Dropping job {} ({:?})", job.id(), job.phase());
            effects.push(Effect::CloseChannel);
            self.mark_dirty();
        }
        let changes = self.gate.release();
        if !changes.is_empty() {
            effects.push(Effect::SetControls(changes));
        }
        effects
    }

    /// Begins a negotiation round, returning its generation.
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.pending_negotiation = Some(self.generation);
        self.mark_dirty();
        self.generation
    }

    /// Invalidates any negotiation in flight.
    pub(crate) fn forget_negotiation(&mut self) {
        if self.pending_negotiation.take().is_some() {
            taskmon_debug!("Discarding negotiation in flight");
            self.mark_dirty();
        }
    }

    /// Consumes the pending negotiation if `generation` is the latest.
    pub(crate) fn settle_negotiation(&mut self, generation: u64) -> bool {
        if self.pending_negotiation == Some(generation) {
            self.pending_negotiation = None;
            self.mark_dirty();
            true
        } else {
            false
        }
    }

    pub(crate) fn scope(&self) -> Option<Scope> {
        Scope::for_view(&self.location, &self.search_query)
    }

    pub(crate) fn gallery_request(&self, kind: GalleryLoadKind, location: ViewLocation) -> GalleryRequest {
        let offset = match kind {
            GalleryLoadKind::NextPage => self.loaded_images,
            GalleryLoadKind::FirstPage | GalleryLoadKind::Reload => 0,
        };
        GalleryRequest {
            kind,
            location,
            search_query: self.search_query.clone(),
            sort_by: self.sort_by.clone(),
            offset,
        }
    }

    pub(crate) fn record_loaded(&mut self, kind: GalleryLoadKind, count: usize) {
        self.loaded_images = match kind {
            GalleryLoadKind::NextPage => self.loaded_images + count,
            GalleryLoadKind::FirstPage | GalleryLoadKind::Reload => count,
        };
        self.mark_dirty();
    }

    pub(crate) fn reset_loaded(&mut self) {
        self.loaded_images = 0;
        self.mark_dirty();
    }
}
