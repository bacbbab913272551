use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use taskmon_logging::{taskmon_debug, taskmon_trace};
use url::Url;

use crate::sse::{decode_progress, ProgressStream};
use crate::{ApiError, GalleryQuery, JobId, MonitorSettings};

/// Server operations the monitor depends on.
#[async_trait::async_trait]
pub trait ProcessingApi: Send + Sync {
    /// Asks whether `path` has images without generated metadata.
    async fn check_needed(&self, path: &str) -> Result<bool, ApiError>;

    /// Starts metadata generation for `path` and returns the job id.
    async fn start(&self, path: &str) -> Result<JobId, ApiError>;

    async fn open_progress(&self, job_id: &str) -> Result<ProgressStream, ApiError>;

    /// Loads one gallery page and returns the number of images in it.
    async fn load_images(&self, query: &GalleryQuery) -> Result<usize, ApiError>;
}

#[derive(Serialize)]
struct PathBody<'a> {
    path: &'a str,
}

#[derive(Deserialize)]
struct CheckResponse {
    #[serde(default)]
    needs_processing: bool,
}

#[derive(Deserialize)]
struct StartResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestProcessingApi {
    base: Url,
    client: reqwest::Client,
    /// No overall timeout; progress streams stay open for the whole job.
    stream_client: reqwest::Client,
}

impl ReqwestProcessingApi {
    pub fn new(settings: &MonitorSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", settings.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(settings.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(map_reqwest_error)?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self {
            base,
            client,
            stream_client,
        })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments.into_iter().filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    async fn post_path(&self, endpoint: &str, path: &str) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint([endpoint])?;
        let body = serde_json::to_vec(&PathBody { path })
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        taskmon_trace!("POST {url} path={path:?}");
        self.client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl ProcessingApi for ReqwestProcessingApi {
    async fn check_needed(&self, path: &str) -> Result<bool, ApiError> {
        let response = self.post_path("check_processing_needed", path).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let parsed: CheckResponse =
            serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(parsed.needs_processing)
    }

    async fn start(&self, path: &str) -> Result<JobId, ApiError> {
        let response = self.post_path("process_images", path).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let parsed = serde_json::from_slice::<StartResponse>(&body);

        if !status.is_success() {
            return Err(match parsed {
                Ok(StartResponse {
                    error: Some(error), ..
                }) => ApiError::Rejected(error),
                _ => ApiError::HttpStatus(status.as_u16()),
            });
        }

        let parsed = parsed.map_err(|err| ApiError::Decode(err.to_string()))?;
        if !parsed.success {
            return Err(ApiError::Rejected(
                parsed
                    .error
                    .unwrap_or_else(|| "server declined to start processing".to_string()),
            ));
        }
        match parsed.task_id {
            Some(task_id) if !task_id.is_empty() => Ok(task_id),
            _ => Err(ApiError::Decode("missing task_id".to_string())),
        }
    }

    async fn open_progress(&self, job_id: &str) -> Result<ProgressStream, ApiError> {
        let url = self.endpoint(["progress", job_id])?;
        taskmon_debug!("Opening progress stream {url}");
        let response = self
            .stream_client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        Ok(decode_progress(response.bytes_stream()))
    }

    async fn load_images(&self, query: &GalleryQuery) -> Result<usize, ApiError> {
        let mut url = self.endpoint(std::iter::once("images").chain(query.path.split('/')))?;
        let (sort_by, order) = query.sort_parts();
        url.query_pairs_mut()
            .append_pair("limit", &query.limit.to_string())
            .append_pair("offset", &query.offset.to_string())
            .append_pair("search", &query.search)
            .append_pair("sort_by", sort_by)
            .append_pair("order", order);

        taskmon_trace!("GET {url}");
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let images: Vec<serde_json::Value> =
            serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(images.len())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    ApiError::Network(err.to_string())
}
