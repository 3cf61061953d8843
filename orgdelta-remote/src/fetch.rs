//! Two-org retrieval and comparison.

use orgdelta_core::{ChangeRecord, OrgCredentials, Side};
use orgdelta_diff::diff_archives;

use crate::client::MetadataApi;
use crate::error::{side_err, RemoteError};

/// Retrieve `manifest` from both orgs concurrently.
///
/// Both must succeed. A failure is tagged with the side it came from; when
/// both fail the source error is reported.
pub async fn fetch_pair<A: MetadataApi + ?Sized>(
    api: &A,
    source: &OrgCredentials,
    target: &OrgCredentials,
    manifest: &str,
) -> Result<(Vec<u8>, Vec<u8>), RemoteError> {
    let (source_zip, target_zip) =
        tokio::join!(api.retrieve(source, manifest), api.retrieve(target, manifest));
    let source_zip = source_zip.map_err(|e| side_err(Side::Source, e))?;
    let target_zip = target_zip.map_err(|e| side_err(Side::Target, e))?;
    tracing::info!(
        source_bytes = source_zip.len(),
        target_bytes = target_zip.len(),
        "retrieved both orgs"
    );
    Ok((source_zip, target_zip))
}

/// Retrieve both orgs and diff the results off the async runtime.
pub async fn compare_orgs<A: MetadataApi + ?Sized>(
    api: &A,
    source: &OrgCredentials,
    target: &OrgCredentials,
    manifest: &str,
) -> Result<Vec<ChangeRecord>, RemoteError> {
    let (source_zip, target_zip) = fetch_pair(api, source, target, manifest).await?;
    let records =
        tokio::task::spawn_blocking(move || diff_archives(source_zip, target_zip)).await??;
    Ok(records)
}
