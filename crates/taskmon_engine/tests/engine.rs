use std::time::Duration;

use pretty_assertions::assert_eq;
use taskmon_engine::{
    ApiError, ChannelEvent, EngineEvent, EngineHandle, GalleryQuery, LoadKind, MonitorSettings,
    Negotiation, ProgressStatus, SettleKind,
};

mod common;

use common::{payload, stream_of, FakeApi};

const WAIT: Duration = Duration::from_secs(2);

fn settings() -> MonitorSettings {
    MonitorSettings {
        fallback_deadline: Duration::from_millis(300),
        settle_success: Duration::from_millis(100),
        settle_error: Duration::from_millis(100),
        disconnect_grace: Duration::from_millis(50),
        ..MonitorSettings::default()
    }
}

fn next(engine: &EngineHandle) -> EngineEvent {
    engine.recv_timeout(WAIT).expect("engine event")
}

#[test]
fn negotiation_result_carries_generation() {
    common::init_logging();
    let engine = EngineHandle::with_api(FakeApi::new().into_arc(), settings());

    engine.negotiate(7, "cats");

    assert_eq!(
        next(&engine),
        EngineEvent::Negotiated {
            generation: 7,
            result: Negotiation::Started {
                job_id: "abc".to_string(),
                failed_open: false
            }
        }
    );
}

#[test]
fn subscription_and_teardown_flow() {
    common::init_logging();
    let completed = payload(10, 10, ProgressStatus::Completed);
    let api = FakeApi::new().with_stream(Ok(stream_of(
        vec![payload(5, 10, ProgressStatus::Running), completed.clone()],
        true,
    )));
    let engine = EngineHandle::with_api(api.into_arc(), settings());

    engine.subscribe("abc".to_string());
    assert!(matches!(
        next(&engine),
        EngineEvent::Channel {
            event: ChannelEvent::Progress(_),
            ..
        }
    ));
    assert_eq!(
        next(&engine),
        EngineEvent::Channel {
            job_id: "abc".to_string(),
            event: ChannelEvent::Completed(completed)
        }
    );

    engine.schedule_teardown("abc".to_string(), SettleKind::Success);
    assert_eq!(
        next(&engine),
        EngineEvent::TeardownDue {
            job_id: "abc".to_string()
        }
    );
}

#[test]
fn closing_channel_cancels_pending_teardown() {
    let engine = EngineHandle::with_api(FakeApi::new().into_arc(), settings());

    engine.subscribe("abc".to_string());
    engine.schedule_teardown("abc".to_string(), SettleKind::Failure);
    engine.close_channel();

    assert_eq!(engine.recv_timeout(Duration::from_millis(500)), None);
}

#[test]
fn resubscribing_replaces_previous_channel() {
    let api = FakeApi::new().with_stream(Ok(stream_of(
        vec![payload(1, 1, ProgressStatus::Completed)],
        true,
    )));
    let engine = EngineHandle::with_api(api.into_arc(), settings());

    engine.subscribe("old".to_string());
    engine.subscribe("abc".to_string());

    match next(&engine) {
        EngineEvent::Channel { job_id, event } => {
            assert_eq!(job_id, "abc");
            assert!(matches!(event, ChannelEvent::Completed(_)));
        }
        other => panic!("unexpected {other:?}"),
    }
    // The first channel was cancelled, so it never reports a stall.
    assert_eq!(engine.recv_timeout(Duration::from_millis(600)), None);
}

#[test]
fn silent_channel_reports_stall() {
    let engine = EngineHandle::with_api(FakeApi::new().into_arc(), settings());

    engine.subscribe("abc".to_string());

    assert_eq!(
        next(&engine),
        EngineEvent::Channel {
            job_id: "abc".to_string(),
            event: ChannelEvent::Stalled
        }
    );
}

#[test]
fn gallery_load_reports_count_or_error() {
    let query = GalleryQuery {
        path: "cats".to_string(),
        search: String::new(),
        sort_by: "date-desc".to_string(),
        offset: 0,
        limit: 50,
    };
    let engine = EngineHandle::with_api(
        FakeApi {
            images: Ok(12),
            ..FakeApi::new()
        }
        .into_arc(),
        settings(),
    );
    engine.load_gallery(LoadKind::Reload, query.clone());
    assert_eq!(
        next(&engine),
        EngineEvent::GalleryLoaded {
            kind: LoadKind::Reload,
            result: Ok(12)
        }
    );

    let engine = EngineHandle::with_api(
        FakeApi {
            images: Err(ApiError::HttpStatus(500)),
            ..FakeApi::new()
        }
        .into_arc(),
        settings(),
    );
    engine.load_gallery(LoadKind::FirstPage, query);
    assert_eq!(
        next(&engine),
        EngineEvent::GalleryLoaded {
            kind: LoadKind::FirstPage,
            result: Err(ApiError::HttpStatus(500))
        }
    );
}
