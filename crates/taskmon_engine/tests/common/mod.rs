#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use futures_util::StreamExt;
use taskmon_engine::{
    ApiError, EngineEvent, EventSink, GalleryQuery, JobId, ProcessingApi, ProgressPayload,
    ProgressStatus, ProgressStream,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(taskmon_logging::initialize_for_tests);
}

pub fn payload(processed: u64, total: u64, status: ProgressStatus) -> ProgressPayload {
    ProgressPayload {
        processed,
        total,
        percentage: Some(processed as f64 * 100.0 / total.max(1) as f64),
        status,
        message: None,
        error: None,
    }
}

/// A progress stream that yields `items`, then either ends or stays silent.
pub fn stream_of(items: Vec<ProgressPayload>, stay_open: bool) -> ProgressStream {
    let head = futures_util::stream::iter(items.into_iter().map(Ok::<_, ApiError>));
    if stay_open {
        Box::pin(head.chain(futures_util::stream::pending()))
    } else {
        Box::pin(head)
    }
}

pub struct FakeApi {
    pub needed: Result<bool, ApiError>,
    pub started: Result<JobId, ApiError>,
    pub images: Result<usize, ApiError>,
    pub streams: Mutex<HashMap<JobId, Result<ProgressStream, ApiError>>>,
    pub starts: AtomicUsize,
    pub opens: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            needed: Ok(true),
            started: Ok("abc".to_string()),
            images: Ok(0),
            streams: Mutex::new(HashMap::new()),
            starts: AtomicUsize::new(0),
            opens: AtomicUsize::new(0),
        }
    }

    /// Stream served for job `abc`; other jobs get a silent stream.
    pub fn with_stream(self, stream: Result<ProgressStream, ApiError>) -> Self {
        self.with_stream_for("abc", stream)
    }

    pub fn with_stream_for(self, job_id: &str, stream: Result<ProgressStream, ApiError>) -> Self {
        self.streams
            .lock()
            .unwrap()
            .insert(job_id.to_string(), stream);
        self
    }

    pub fn into_arc(self) -> Arc<dyn ProcessingApi> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl ProcessingApi for FakeApi {
    async fn check_needed(&self, _path: &str) -> Result<bool, ApiError> {
        self.needed.clone()
    }

    async fn start(&self, _path: &str) -> Result<JobId, ApiError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.started.clone()
    }

    async fn open_progress(&self, job_id: &str) -> Result<ProgressStream, ApiError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.streams
            .lock()
            .unwrap()
            .remove(job_id)
            .unwrap_or_else(|| {
                let silent: ProgressStream = Box::pin(futures_util::stream::pending());
                Ok(silent)
            })
    }

    async fn load_images(&self, _query: &GalleryQuery) -> Result<usize, ApiError> {
        self.images.clone()
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
