use std::sync::Once;

use pretty_assertions::assert_eq;
use taskmon_core::{
    update, AppState, BulkAction, ChannelEvent, Control, Effect, GalleryLoadKind, JobId, JobStatus,
    Msg, NegotiationOutcome, ProgressUpdate, Scope, ViewLocation, DEFAULT_SORT, GATED_CONTROLS,
    GATE_NOTICE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(taskmon_logging::initialize_for_tests);
}

fn cats() -> ViewLocation {
    ViewLocation::Gallery("cats".to_string())
}

fn notice() -> Effect {
    Effect::ShowNotice(GATE_NOTICE.to_string())
}

fn gated_state() -> AppState {
    let (state, _) = update(AppState::new(), Msg::PageLoaded { location: cats() });
    let (state, _) = update(
        state,
        Msg::Negotiated {
            generation: 1,
            outcome: NegotiationOutcome::Started(JobId::new("abc")),
        },
    );
    let (state, _) = update(
        state,
        Msg::Channel {
            job_id: JobId::new("abc"),
            event: ChannelEvent::Progress(ProgressUpdate {
                processed: 1,
                total: 4,
                percentage: Some(25.0),
                message: None,
            }),
        },
    );
    state
}

fn idle_state() -> AppState {
    let (state, _) = update(AppState::new(), Msg::PageLoaded { location: cats() });
    let (state, _) = update(
        state,
        Msg::Negotiated {
            generation: 1,
            outcome: NegotiationOutcome::NotNeeded,
        },
    );
    state
}

#[test]
fn engaged_gate_disables_every_gated_control() {
    init_logging();
    let view = gated_state().view();
    assert!(view.gate_engaged);
    let mut expected = GATED_CONTROLS.to_vec();
    expected.sort();
    assert_eq!(view.disabled_controls, expected);
}

#[test]
fn back_navigation_is_reverted_to_job_origin() {
    init_logging();
    let state = gated_state();
    let job_before = state.view().job;

    let (mut state, effects) = update(
        state,
        Msg::HistoryNavigated {
            location: ViewLocation::Gallery("dogs".to_string()),
        },
    );

    assert_eq!(effects, vec![Effect::RestoreHistory(cats()), notice()]);
    assert_eq!(state.location(), &cats());
    assert_eq!(state.view().job, job_before);
    assert!(state.view().gate_engaged);
    assert!(state.consume_dirty());
    assert_eq!(state.view().last_notice.as_deref(), Some(GATE_NOTICE));
}

#[test]
fn folder_click_is_rejected_without_history_change() {
    init_logging();
    let (state, effects) = update(
        gated_state(),
        Msg::FolderClicked {
            location: ViewLocation::Gallery("dogs".to_string()),
        },
    );
    assert_eq!(effects, vec![notice()]);
    assert_eq!(state.location(), &cats());
}

#[test]
fn bookmark_in_other_folder_is_rejected() {
    init_logging();
    let (state, effects) = update(
        gated_state(),
        Msg::BookmarkOpened {
            folder: "dogs".to_string(),
        },
    );
    assert_eq!(effects, vec![notice()]);
    assert_eq!(state.location(), &cats());
}

#[test]
fn bookmark_in_same_folder_needs_no_navigation() {
    init_logging();
    let (_state, effects) = update(
        gated_state(),
        Msg::BookmarkOpened {
            folder: "cats".to_string(),
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn folder_toggle_is_rejected_while_engaged() {
    init_logging();
    let msg = Msg::FolderToggled {
        path: "cats/2024".to_string(),
    };
    let (_state, effects) = update(gated_state(), msg.clone());
    assert_eq!(effects, vec![notice()]);

    let (_state, effects) = update(idle_state(), msg);
    assert_eq!(
        effects,
        vec![Effect::ToggleFolder {
            path: "cats/2024".to_string()
        }]
    );
}

#[test]
fn sort_change_is_reverted_while_engaged() {
    init_logging();
    let (state, effects) = update(gated_state(), Msg::SortChanged("name-asc".to_string()));
    assert_eq!(
        effects,
        vec![Effect::RestoreSort(DEFAULT_SORT.to_string()), notice()]
    );
    assert_eq!(state.view().sort_by, DEFAULT_SORT);
}

#[test]
fn sort_change_renegotiates_when_idle() {
    init_logging();
    let (state, effects) = update(idle_state(), Msg::SortChanged("name-asc".to_string()));
    assert_eq!(
        effects,
        vec![Effect::Negotiate {
            generation: 2,
            scope: Scope::Folder("cats".to_string()),
        }]
    );
    assert_eq!(state.view().sort_by, "name-asc");
}

#[test]
fn search_change_is_reverted_while_engaged() {
    init_logging();
    let (state, effects) = update(gated_state(), Msg::SearchChanged("tabby".to_string()));
    assert_eq!(effects, vec![Effect::RestoreSearch(String::new()), notice()]);
    assert_eq!(state.view().search_query, "");
}

#[test]
fn bulk_actions_are_rejected_while_engaged() {
    init_logging();
    for action in [
        BulkAction::UncheckAll,
        BulkAction::DeleteChecked,
        BulkAction::DeleteMetadata,
    ] {
        let (_state, effects) = update(gated_state(), Msg::BulkActionClicked(action));
        assert_eq!(effects, vec![notice()]);

        let (_state, effects) = update(idle_state(), Msg::BulkActionClicked(action));
        assert_eq!(effects, vec![Effect::RunBulkAction(action)]);
    }
}

#[test]
fn pagination_is_deferred_while_job_runs() {
    init_logging();
    let (_state, effects) = update(gated_state(), Msg::LoadMoreRequested);
    assert!(effects.is_empty());

    let (state, _) = update(
        idle_state(),
        Msg::GalleryLoaded {
            kind: GalleryLoadKind::FirstPage,
            result: Ok(50),
        },
    );
    let (state, effects) = update(state, Msg::LoadMoreRequested);
    match effects.as_slice() {
        [Effect::LoadGallery(req)] => {
            assert_eq!(req.kind, GalleryLoadKind::NextPage);
            assert_eq!(req.offset, 50);
        }
        other => panic!("unexpected effects {other:?}"),
    }
    let (state, _) = update(
        state,
        Msg::GalleryLoaded {
            kind: GalleryLoadKind::NextPage,
            result: Ok(20),
        },
    );
    assert_eq!(state.view().loaded_images, 70);
}

#[test]
fn gate_stays_engaged_while_settling() {
    init_logging();
    let (state, _) = update(
        gated_state(),
        Msg::Channel {
            job_id: JobId::new("abc"),
            event: ChannelEvent::Completed(ProgressUpdate {
                processed: 4,
                total: 4,
                percentage: Some(100.0),
                message: None,
            }),
        },
    );
    assert_eq!(state.view().job.as_ref().unwrap().status, JobStatus::Completed);
    assert!(!state.gate().admits(Control::FolderLinks));

    let (_state, effects) = update(
        state,
        Msg::FolderClicked {
            location: ViewLocation::FolderTree,
        },
    );
    assert_eq!(effects, vec![notice()]);
}

#[test]
fn navigation_is_accepted_after_teardown() {
    init_logging();
    let (state, _) = update(
        gated_state(),
        Msg::Channel {
            job_id: JobId::new("abc"),
            event: ChannelEvent::Stalled,
        },
    );
    let (state, effects) = update(
        state,
        Msg::FolderClicked {
            location: ViewLocation::FolderTree,
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::PushHistory(ViewLocation::FolderTree),
            Effect::LoadFolderTree,
        ]
    );
    assert_eq!(state.location(), &ViewLocation::FolderTree);
}
