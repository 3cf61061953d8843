//! Deploy job tracking.
//!
//! Each cycle waits [`POLL_INTERVAL`] and then issues exactly one status
//! query. A response without a recognizable status, including one that is
//! not XML at all, is skipped; a transport failure ends polling at once. Cancellation is observed both while waiting
//! and while a query is in flight, and no query is issued after it.

use std::time::Duration;

use orgdelta_core::{DeployJob, DeployStatus, JobId, OrgCredentials};

use crate::cancel::CancelToken;
use crate::client::MetadataApi;
use crate::error::RemoteError;

/// Delay before every status query.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Failure detail used when a failed or canceled job reports no problem text.
pub const DEFAULT_FAILURE_DETAIL: &str = "Deployment Failed. Check Salesforce for details.";

pub struct JobStatusPoller<'a, A: MetadataApi + ?Sized> {
    api: &'a A,
    interval: Duration,
}

impl<'a, A: MetadataApi + ?Sized> JobStatusPoller<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Poll `job_id` until it reaches a terminal state.
    ///
    /// `on_transition` is called with each status that differs from the
    /// previously observed one, starting with the first. The returned job's
    /// `submitted_at` is the moment polling began.
    pub async fn poll<F>(
        &self,
        job_id: &JobId,
        org: &OrgCredentials,
        mut on_transition: F,
        cancel: &CancelToken,
    ) -> Result<DeployJob, RemoteError>
    where
        F: FnMut(DeployStatus),
    {
        let mut job = DeployJob::queued(job_id.clone());
        let mut last_seen: Option<DeployStatus> = None;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(job_id)),
                _ = tokio::time::sleep(self.interval) => {}
            }

            let report = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(job_id)),
                report = self.api.check_deploy_status(org, job_id) => report,
            };
            let report = match report {
                Ok(report) => report,
                Err(RemoteError::Envelope { detail, .. }) => {
                    tracing::debug!(
                        job_id = %job_id,
                        detail = %detail,
                        "unreadable status response; waiting"
                    );
                    continue;
                }
                Err(source) => {
                    tracing::warn!(job_id = %job_id, error = %source, "status query failed");
                    return Err(RemoteError::PollTransport {
                        job_id: job_id.clone(),
                        source: Box::new(source),
                    });
                }
            };

            let Some(status) = report.status else {
                tracing::debug!(job_id = %job_id, "no recognizable status; waiting");
                continue;
            };

            if last_seen != Some(status) {
                tracing::info!(job_id = %job_id, status = %status, "deploy status changed");
                on_transition(status);
                last_seen = Some(status);
            }
            job.status = status;

            if status.is_terminal() {
                if status != DeployStatus::Succeeded {
                    job.failure_detail = Some(
                        report
                            .problem
                            .unwrap_or_else(|| DEFAULT_FAILURE_DETAIL.to_string()),
                    );
                }
                return Ok(job);
            }
        }
    }
}

fn cancelled(job_id: &JobId) -> RemoteError {
    tracing::info!(job_id = %job_id, "polling cancelled");
    RemoteError::Cancelled
}
