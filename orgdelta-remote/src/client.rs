//! Metadata API client.
//!
//! [`MetadataApi`] is the seam the submitter, poller and fetcher are written
//! against; [`SoapClient`] is the HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use orgdelta_core::{JobId, OrgCredentials, TestConfig};
use orgdelta_diff::decode_base64;
use orgdelta_renderer::{unpackaged_fragment, Envelope, Renderer};

use crate::envelope::{
    fault_string, parse_deploy_status, parse_job_id, parse_retrieve_status, RetrieveOutcome,
    StatusReport,
};
use crate::error::{envelope_err, RemoteError};
use crate::poller::POLL_INTERVAL;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Operations the workflow needs from an org.
#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// Retrieve the components named by `manifest` and return the zip bytes.
    ///
    /// `manifest` is either a full `package.xml` or its inner `<types>`
    /// fragment.
    async fn retrieve(&self, org: &OrgCredentials, manifest: &str) -> Result<Vec<u8>, RemoteError>;

    /// Submit a base64 zip for deployment.
    async fn deploy(
        &self,
        org: &OrgCredentials,
        zip_base64: &str,
        options: &TestConfig,
    ) -> Result<JobId, RemoteError>;

    /// One status query for a submitted deploy.
    async fn check_deploy_status(
        &self,
        org: &OrgCredentials,
        job_id: &JobId,
    ) -> Result<StatusReport, RemoteError>;
}

/// SOAP-over-HTTPS implementation of [`MetadataApi`].
pub struct SoapClient {
    http: reqwest::Client,
    renderer: Renderer,
    retrieve_interval: Duration,
}

impl SoapClient {
    pub fn new() -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            renderer: Renderer::new()?,
            retrieve_interval: POLL_INTERVAL,
        })
    }

    /// Delay between `checkRetrieveStatus` queries while a retrieve is pending.
    pub fn with_retrieve_interval(mut self, interval: Duration) -> Self {
        self.retrieve_interval = interval;
        self
    }

    /// POST one envelope and return the success body.
    async fn call(
        &self,
        org: &OrgCredentials,
        envelope: &Envelope<'_>,
    ) -> Result<String, RemoteError> {
        let operation = envelope.operation();
        let endpoint = org.soap_endpoint();
        let body = self.renderer.render_envelope(envelope)?;

        tracing::debug!(operation, endpoint = %endpoint, "metadata API request");
        let response = self
            .http
            .post(&endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=UTF-8")
            .header("SOAPAction", "\"\"")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::warn!(operation, status = status.as_u16(), "metadata API fault");
            let message = fault_string(&text).unwrap_or(text);
            return Err(RemoteError::Fault {
                operation,
                status: status.as_u16(),
                message,
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl MetadataApi for SoapClient {
    async fn retrieve(&self, org: &OrgCredentials, manifest: &str) -> Result<Vec<u8>, RemoteError> {
        let session_id = org.session_id.expose();
        let start = Envelope::Retrieve {
            session_id,
            api_version: &org.api_version,
            unpackaged_xml: unpackaged_fragment(manifest),
        };
        let job_id = parse_job_id(&self.call(org, &start).await?, start.operation())?;
        tracing::info!(job_id = %job_id, instance = %org.instance_url, "retrieve started");

        let check = Envelope::CheckRetrieveStatus {
            session_id,
            job_id: &job_id.0,
        };
        loop {
            let body = self.call(org, &check).await?;
            match parse_retrieve_status(&body)? {
                RetrieveOutcome::Pending => {
                    tracing::debug!(job_id = %job_id, "retrieve in progress");
                    tokio::time::sleep(self.retrieve_interval).await;
                }
                RetrieveOutcome::Failed(message) => return Err(RemoteError::Retrieve { message }),
                RetrieveOutcome::Ready(zip) => {
                    tracing::info!(job_id = %job_id, "retrieve complete");
                    return decode_base64(&zip)
                        .map_err(|e| envelope_err(check.operation(), e.to_string()));
                }
            }
        }
    }

    async fn deploy(
        &self,
        org: &OrgCredentials,
        zip_base64: &str,
        options: &TestConfig,
    ) -> Result<JobId, RemoteError> {
        let envelope = Envelope::Deploy {
            session_id: org.session_id.expose(),
            zip_base64,
            options,
        };
        let body = self.call(org, &envelope).await?;
        parse_job_id(&body, envelope.operation())
    }

    async fn check_deploy_status(
        &self,
        org: &OrgCredentials,
        job_id: &JobId,
    ) -> Result<StatusReport, RemoteError> {
        let envelope = Envelope::CheckDeployStatus {
            session_id: org.session_id.expose(),
            job_id: &job_id.0,
        };
        let body = self.call(org, &envelope).await?;
        parse_deploy_status(&body)
    }
}
