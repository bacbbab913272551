use std::sync::Once;

use pretty_assertions::assert_eq;
use taskmon_core::{
    update, AppState, ControlChange, Effect, GalleryLoadKind, GalleryRequest, JobId, Msg,
    NegotiationOutcome, Scope, ViewLocation, DEFAULT_SORT,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(taskmon_logging::initialize_for_tests);
}

fn cats() -> ViewLocation {
    ViewLocation::Gallery("cats".to_string())
}

fn first_page(location: ViewLocation, query: &str) -> Effect {
    Effect::LoadGallery(GalleryRequest {
        kind: GalleryLoadKind::FirstPage,
        location,
        search_query: query.to_string(),
        sort_by: DEFAULT_SORT.to_string(),
        offset: 0,
    })
}

fn load_cats() -> (AppState, Vec<Effect>) {
    update(AppState::new(), Msg::PageLoaded { location: cats() })
}

#[test]
fn gallery_load_negotiates_for_its_folder() {
    init_logging();
    let (state, effects) = load_cats();

    assert_eq!(
        effects,
        vec![Effect::Negotiate {
            generation: 1,
            scope: Scope::Folder("cats".to_string()),
        }]
    );
    assert!(state.view().negotiating);
    assert!(!state.view().gate_engaged);
}

#[test]
fn folder_tree_load_skips_negotiation() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::PageLoaded {
            location: ViewLocation::FolderTree,
        },
    );

    assert_eq!(effects, vec![Effect::LoadFolderTree]);
    assert!(!state.view().negotiating);
}

#[test]
fn not_needed_loads_gallery_without_gate() {
    init_logging();
    let (state, _) = load_cats();
    let (state, effects) = update(
        state,
        Msg::Negotiated {
            generation: 1,
            outcome: NegotiationOutcome::NotNeeded,
        },
    );

    assert_eq!(effects, vec![first_page(cats(), "")]);
    let view = state.view();
    assert!(!view.gate_engaged);
    assert!(view.job.is_none());
    assert!(!view.negotiating);
}

#[test]
fn started_job_engages_gate_and_subscribes() {
    init_logging();
    let (state, _) = load_cats();
    let (state, effects) = update(
        state,
        Msg::Negotiated {
            generation: 1,
            outcome: NegotiationOutcome::Started(JobId::new("abc")),
        },
    );

    assert_eq!(effects.len(), 3);
    match &effects[0] {
        Effect::SetControls(changes) => {
            assert!(!changes.is_empty());
            assert!(changes.iter().all(|ControlChange { enabled, .. }| !enabled));
        }
        other => panic!("expected SetControls, got {other:?}"),
    }
    assert_eq!(
        effects[1],
        Effect::Subscribe {
            job_id: JobId::new("abc")
        }
    );
    assert_eq!(effects[2], first_page(cats(), ""));

    let view = state.view();
    assert!(view.gate_engaged);
    let job = view.job.expect("job tracked");
    assert_eq!(job.job_id, JobId::new("abc"));
    assert_eq!(job.scope, Scope::Folder("cats".to_string()));
}

#[test]
fn start_failure_shows_notice_and_still_loads() {
    init_logging();
    let (state, _) = load_cats();
    let (state, effects) = update(
        state,
        Msg::Negotiated {
            generation: 1,
            outcome: NegotiationOutcome::StartFailed("disk busy".to_string()),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::ShowNotice("Failed to start metadata generation: disk busy".to_string()),
            first_page(cats(), ""),
        ]
    );
    assert!(state.view().job.is_none());
    assert!(!state.view().gate_engaged);
}

#[test]
fn global_search_negotiates_all_folders() {
    init_logging();
    let (state, _) = load_cats();
    let (state, _) = update(
        state,
        Msg::Negotiated {
            generation: 1,
            outcome: NegotiationOutcome::NotNeeded,
        },
    );
    let (state, effects) = update(state, Msg::SearchChanged("g:tabby".to_string()));

    assert_eq!(
        effects,
        vec![Effect::Negotiate {
            generation: 2,
            scope: Scope::AllFolders,
        }]
    );

    let (state, _) = update(
        state,
        Msg::Negotiated {
            generation: 2,
            outcome: NegotiationOutcome::Started(JobId::new("global")),
        },
    );
    assert_eq!(state.view().job.unwrap().scope, Scope::AllFolders);
}

#[test]
fn stale_negotiation_result_is_discarded() {
    init_logging();
    let (state, _) = load_cats();
    // Navigate again before the first negotiation answers.
    let (state, effects) = update(
        state,
        Msg::FolderClicked {
            location: ViewLocation::Gallery("dogs".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::PushHistory(ViewLocation::Gallery("dogs".to_string())),
            Effect::Negotiate {
                generation: 2,
                scope: Scope::Folder("dogs".to_string()),
            },
        ]
    );

    let (state, effects) = update(
        state,
        Msg::Negotiated {
            generation: 1,
            outcome: NegotiationOutcome::Started(JobId::new("old")),
        },
    );
    assert!(effects.is_empty());
    assert!(state.view().job.is_none());
    assert!(state.view().negotiating);
}

#[test]
fn new_negotiation_tears_down_previous_job_first() {
    init_logging();
    let (state, _) = load_cats();
    let (state, _) = update(
        state,
        Msg::Negotiated {
            generation: 1,
            outcome: NegotiationOutcome::Started(JobId::new("first")),
        },
    );
    assert!(state.view().gate_engaged);

    // A fresh page load (e.g. a manual refresh) starts over.
    let (state, effects) = update(state, Msg::PageLoaded { location: cats() });

    assert_eq!(effects.len(), 3);
    assert_eq!(effects[0], Effect::CloseChannel);
    assert!(matches!(&effects[1], Effect::SetControls(changes) if changes.iter().all(|c| c.enabled)));
    assert_eq!(
        effects[2],
        Effect::Negotiate {
            generation: 2,
            scope: Scope::Folder("cats".to_string()),
        }
    );
    assert!(state.view().job.is_none());
    assert!(!state.view().gate_engaged);

    let (state, _) = update(
        state,
        Msg::Negotiated {
            generation: 2,
            outcome: NegotiationOutcome::Started(JobId::new("second")),
        },
    );
    assert_eq!(state.view().job.unwrap().job_id, JobId::new("second"));
}

#[test]
fn leaving_for_folder_tree_invalidates_pending_negotiation() {
    init_logging();
    let (state, _) = load_cats();
    let (state, effects) = update(
        state,
        Msg::HistoryNavigated {
            location: ViewLocation::FolderTree,
        },
    );
    assert_eq!(effects, vec![Effect::LoadFolderTree]);

    let (state, effects) = update(
        state,
        Msg::Negotiated {
            generation: 1,
            outcome: NegotiationOutcome::Started(JobId::new("late")),
        },
    );
    assert!(effects.is_empty());
    assert!(state.view().job.is_none());
}
