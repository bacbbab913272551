use std::time::Duration;

use taskmon_logging::{taskmon_info, taskmon_warn};

use crate::{Negotiation, ProcessingApi};

/// Decides whether a job is needed for a scope and starts it if so.
pub struct JobNegotiator<'a> {
    api: &'a dyn ProcessingApi,
    check_timeout: Duration,
}

impl<'a> JobNegotiator<'a> {
    pub fn new(api: &'a dyn ProcessingApi, check_timeout: Duration) -> Self {
        Self { api, check_timeout }
    }

    /// The check fails open: an error or timeout counts as "needed".
    pub async fn negotiate(&self, path: &str) -> Negotiation {
        let failed_open = match tokio::time::timeout(self.check_timeout, self.api.check_needed(path))
            .await
        {
            Ok(Ok(false)) => {
                taskmon_info!("No metadata generation needed for {path:?}");
                return Negotiation::NotNeeded;
            }
            Ok(Ok(true)) => false,
            Ok(Err(err)) => {
                taskmon_warn!("Processing check for {path:?} failed ({err}); assuming needed");
                true
            }
            Err(_) => {
                taskmon_warn!(
                    "Processing check for {path:?} timed out after {:?}; assuming needed",
                    self.check_timeout
                );
                true
            }
        };

        match self.api.start(path).await {
            Ok(job_id) => {
                taskmon_info!("Started metadata generation {job_id} for {path:?}");
                Negotiation::Started {
                    job_id,
                    failed_open,
                }
            }
            Err(err) => {
                taskmon_warn!("Could not start metadata generation for {path:?}: {err}");
                Negotiation::StartFailed(err)
            }
        }
    }
}
