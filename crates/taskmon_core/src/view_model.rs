use crate::{Control, Job, JobId, JobStatus, Scope, ViewLocation};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub location: ViewLocation,
    pub search_query: String,
    pub sort_by: String,
    pub gate_engaged: bool,
    pub disabled_controls: Vec<Control>,
    pub job: Option<JobView>,
    pub negotiating: bool,
    pub loaded_images: usize,
    pub last_notice: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobView {
    pub job_id: JobId,
    pub status: JobStatus,
    pub processed: u64,
    pub total: u64,
    pub percentage: f64,
    pub message: Option<String>,
    pub scope: Scope,
    pub settling: bool,
    pub abandoned: bool,
}

impl JobView {
    pub(crate) fn from_job(job: &Job) -> Self {
        Self {
            job_id: job.id().clone(),
            status: job.status(),
            processed: job.processed(),
            total: job.total(),
            percentage: job.percentage(),
            message: job.message().map(ToOwned::to_owned),
            scope: job.scope().clone(),
            settling: !job.is_tracking(),
            abandoned: job.is_abandoned(),
        }
    }
}
