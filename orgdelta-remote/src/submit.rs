use orgdelta_core::{ChangeRecord, FolderTypeTable, JobId, OrgCredentials, TestConfig};
use orgdelta_diff::build_deploy_archive;

use crate::client::MetadataApi;
use crate::error::RemoteError;

/// Package `selected` and submit it to `target` as one deploy job.
///
/// An empty selection fails before anything is built or sent. Endpoint
/// rejections surface as [`RemoteError::Submission`] with the endpoint's own
/// message. Nothing is retried.
pub async fn submit<A: MetadataApi + ?Sized>(
    api: &A,
    selected: &[ChangeRecord],
    target: &OrgCredentials,
    tests: &TestConfig,
    table: &FolderTypeTable,
    manifest_version: &str,
) -> Result<JobId, RemoteError> {
    if selected.is_empty() {
        return Err(RemoteError::SubmissionPrecondition);
    }

    let records = selected.to_vec();
    let table = table.clone();
    let version = manifest_version.to_string();
    let archive =
        tokio::task::spawn_blocking(move || build_deploy_archive(&records, &table, &version))
            .await??;

    tracing::info!(
        components = selected.len(),
        bytes = archive.bytes.len(),
        test_level = %tests.test_level,
        check_only = tests.check_only,
        "submitting deploy"
    );

    match api.deploy(target, &archive.base64, tests).await {
        Ok(job_id) => {
            tracing::info!(job_id = %job_id, "deploy queued");
            Ok(job_id)
        }
        Err(RemoteError::Fault { message, .. }) => Err(RemoteError::Submission { message }),
        Err(other) => Err(other),
    }
}
