use crate::ViewLocation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadPlan {
    /// The active view has no gallery; nothing to refresh.
    Skip,
    /// Reload the gallery for this location.
    Reload(ViewLocation),
}

/// Decides what to refresh once a job has been torn down.
///
/// The active location is passed in explicitly; it may differ from the
/// job's scope (global-search jobs cover more than the folder on screen).
pub fn plan_reload(active: &ViewLocation) -> ReloadPlan {
    match active {
        ViewLocation::FolderTree => ReloadPlan::Skip,
        ViewLocation::Gallery(_) => ReloadPlan::Reload(active.clone()),
    }
}
