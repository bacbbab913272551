use taskmon_logging::{taskmon_debug, taskmon_info, taskmon_warn};

use crate::gate::GATE_NOTICE;
use crate::reload::{plan_reload, ReloadPlan};
use crate::{
    AppState, ChannelEvent, Control, Effect, GalleryLoadKind, Job, JobId, Msg, NegotiationOutcome,
    TeardownReason, ViewLocation,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageLoaded { location } => {
            state.set_location(location);
            begin_view_load(&mut state)
        }
        Msg::FolderClicked { location } => open_location(&mut state, location),
        Msg::BookmarkOpened { folder } => {
            let location = ViewLocation::for_folder(&folder);
            open_location(&mut state, location)
        }
        Msg::HistoryNavigated { location } => {
            if &location == state.location() {
                Vec::new()
            } else if state.gate().is_engaged() {
                // The browser already moved; put the job's origin back.
                let origin = state
                    .job()
                    .map(|job| job.origin().clone())
                    .unwrap_or_else(|| state.location().clone());
                taskmon_warn!("Rejected history transition to {location} while a job runs");
                vec![Effect::RestoreHistory(origin), state.notice(GATE_NOTICE)]
            } else {
                state.set_location(location);
                begin_view_load(&mut state)
            }
        }
        Msg::FolderToggled { path } => {
            if state.gate().admits(Control::FolderLinks) {
                vec![Effect::ToggleFolder { path }]
            } else {
                vec![state.notice(GATE_NOTICE)]
            }
        }
        Msg::SearchChanged(query) => {
            if query == state.search_query() {
                Vec::new()
            } else if !state.gate().admits(Control::SearchInput) {
                let previous = state.search_query().to_string();
                vec![Effect::RestoreSearch(previous), state.notice(GATE_NOTICE)]
            } else {
                state.set_search_query(query);
                reload_if_gallery(&mut state)
            }
        }
        Msg::SortChanged(sort_by) => {
            if sort_by == state.sort_by() {
                Vec::new()
            } else if !state.gate().admits(Control::SortControl) {
                let previous = state.sort_by().to_string();
                vec![Effect::RestoreSort(previous), state.notice(GATE_NOTICE)]
            } else {
                state.set_sort_by(sort_by);
                reload_if_gallery(&mut state)
            }
        }
        Msg::BulkActionClicked(action) => {
            if state.gate().admits(action.control()) {
                vec![Effect::RunBulkAction(action)]
            } else {
                vec![state.notice(GATE_NOTICE)]
            }
        }
        Msg::LoadMoreRequested => {
            if state.job().is_some() || state.is_negotiating() {
                taskmon_debug!("Deferring pagination until processing settles");
                Vec::new()
            } else if state.location().is_gallery() {
                let location = state.location().clone();
                vec![Effect::LoadGallery(
                    state.gallery_request(GalleryLoadKind::NextPage, location),
                )]
            } else {
                Vec::new()
            }
        }
        Msg::Negotiated {
            generation,
            outcome,
        } => apply_negotiation(&mut state, generation, outcome),
        Msg::Channel { job_id, event } => apply_channel_event(&mut state, &job_id, event),
        Msg::TeardownDue { job_id } => {
            let due = state
                .job()
                .is_some_and(|job| job.id() == &job_id && !job.is_tracking());
            if due {
                finish_job(&mut state)
            } else {
                taskmon_debug!("Ignoring teardown for stale job {job_id}");
                Vec::new()
            }
        }
        Msg::GalleryLoaded { kind, result } => match result {
            Ok(count) => {
                state.record_loaded(kind, count);
                Vec::new()
            }
            Err(err) => {
                let text = match kind {
                    GalleryLoadKind::Reload => format!("Failed to reload gallery: {err}"),
                    GalleryLoadKind::FirstPage | GalleryLoadKind::NextPage => {
                        format!("Failed to load images: {err}")
                    }
                };
                vec![state.notice(text)]
            }
        },
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn open_location(state: &mut AppState, location: ViewLocation) -> Vec<Effect> {
    if &location == state.location() {
        return Vec::new();
    }
    if !state.gate().admits(Control::FolderLinks) {
        taskmon_warn!("Rejected navigation to {location} while a job runs");
        return vec![state.notice(GATE_NOTICE)];
    }
    state.set_location(location.clone());
    let mut effects = vec![Effect::PushHistory(location)];
    effects.extend(begin_view_load(state));
    effects
}

fn reload_if_gallery(state: &mut AppState) -> Vec<Effect> {
    if state.location().is_gallery() {
        begin_view_load(state)
    } else {
        Vec::new()
    }
}

/// Loads the current view. Gallery views negotiate first; any previous job
/// is torn down before the new negotiation is issued.
fn begin_view_load(state: &mut AppState) -> Vec<Effect> {
    let mut effects = state.drop_job();
    state.reset_loaded();
    match state.scope() {
        None => {
            state.forget_negotiation();
            effects.push(Effect::LoadFolderTree);
        }
        Some(scope) => {
            let generation = state.next_generation();
            taskmon_debug!("Negotiation #{generation} for {scope}");
            effects.push(Effect::Negotiate { generation, scope });
        }
    }
    effects
}

fn apply_negotiation(
    state: &mut AppState,
    generation: u64,
    outcome: NegotiationOutcome,
) -> Vec<Effect> {
    if !state.settle_negotiation(generation) {
        taskmon_debug!("Discarding stale negotiation #{generation}: {outcome:?}");
        return Vec::new();
    }

    let location = state.location().clone();
    let first_page = |state: &AppState| {
        Effect::LoadGallery(state.gallery_request(GalleryLoadKind::FirstPage, location.clone()))
    };

    match outcome {
        NegotiationOutcome::NotNeeded => vec![first_page(state)],
        NegotiationOutcome::StartFailed(detail) => {
            let notice = state.notice(format!("Failed to start metadata generation: {detail}"));
            vec![notice, first_page(state)]
        }
        NegotiationOutcome::Started(job_id) => {
            let Some(scope) = state.scope() else {
                return vec![first_page(state)];
            };
            let mut effects = state.track_job(Job::new(job_id, scope, location.clone()));
            effects.push(first_page(state));
            effects
        }
    }
}

fn apply_channel_event(state: &mut AppState, job_id: &JobId, event: ChannelEvent) -> Vec<Effect> {
    let Some(job) = state.job_mut().filter(|job| job.id() == job_id) else {
        taskmon_debug!("Ignoring channel event for untracked job {job_id}");
        return Vec::new();
    };
    if !job.is_tracking() {
        taskmon_debug!("Ignoring channel event for settling job {job_id}");
        return Vec::new();
    }

    let (reason, notice) = match event {
        ChannelEvent::Progress(progress) => {
            job.apply_progress(&progress);
            state.mark_dirty();
            return Vec::new();
        }
        ChannelEvent::Completed(progress) => {
            job.finish(Some(&progress), TeardownReason::Completed);
            (TeardownReason::Completed, None)
        }
        ChannelEvent::Failed { update, error } => {
            job.finish(update.as_ref(), TeardownReason::Failed);
            (
                TeardownReason::Failed,
                Some(format!("Metadata generation failed: {error}")),
            )
        }
        ChannelEvent::Disconnected { detail } => {
            job.finish(None, TeardownReason::Disconnected);
            (
                TeardownReason::Disconnected,
                Some(format!("Lost connection to progress stream: {detail}")),
            )
        }
        ChannelEvent::Stalled => {
            job.finish(None, TeardownReason::Stalled);
            taskmon_warn!("Job {job_id} stalled; tearing down without a terminal event");
            return finish_job(state);
        }
    };
    taskmon_info!("Job {job_id} settling ({reason:?})");

    let mut effects = Vec::with_capacity(2);
    if let Some(text) = notice {
        effects.push(state.notice(text));
    }
    effects.push(Effect::ScheduleTeardown {
        job_id: job_id.clone(),
        reason,
    });
    effects
}

/// Teardown: release the gate, forget the job, refresh the active view.
fn finish_job(state: &mut AppState) -> Vec<Effect> {
    let mut effects = state.drop_job();
    match plan_reload(state.location()) {
        ReloadPlan::Skip => taskmon_info!("Teardown complete; no gallery to reload"),
        ReloadPlan::Reload(location) => {
            taskmon_info!("Teardown complete; reloading {location}");
            effects.push(Effect::LoadGallery(
                state.gallery_request(GalleryLoadKind::Reload, location),
            ));
        }
    }
    effects
}
