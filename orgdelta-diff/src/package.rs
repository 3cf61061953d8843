//! Assembly of the outbound deploy archive.

use std::collections::HashSet;

use orgdelta_core::{ChangeRecord, FolderTypeTable, MANIFEST_PATH};
use orgdelta_renderer::synthesize;

use crate::codec::{encode_base64, ZipBuilder};
use crate::error::ArchiveError;

/// A ready-to-submit archive.
#[derive(Debug, Clone)]
pub struct DeployArchive {
    /// Raw zip bytes.
    pub bytes: Vec<u8>,
    /// `bytes` in standard base64, as the deploy envelope carries it.
    pub base64: String,
    /// The manifest written at [`MANIFEST_PATH`].
    pub manifest: String,
}

/// Zip every selected record's source text at its own path, plus the
/// synthesized manifest.
///
/// A path selected twice is written once. A selected record that sits at
/// [`MANIFEST_PATH`] is replaced by the synthesized manifest.
pub fn build_deploy_archive(
    selected: &[ChangeRecord],
    table: &FolderTypeTable,
    version: &str,
) -> Result<DeployArchive, ArchiveError> {
    let manifest = synthesize(selected, table, version)?;

    let mut builder = ZipBuilder::new();
    let mut written: HashSet<&str> = HashSet::new();
    for record in selected {
        if record.path == MANIFEST_PATH || !written.insert(record.path.as_str()) {
            continue;
        }
        builder
            .write_text(&record.path, &record.source_content)
            .map_err(ArchiveError::Write)?;
    }
    builder
        .write_text(MANIFEST_PATH, &manifest)
        .map_err(ArchiveError::Write)?;
    let bytes = builder.finish().map_err(ArchiveError::Write)?;

    tracing::debug!(
        entries = written.len() + 1,
        size = bytes.len(),
        "deploy archive built"
    );

    Ok(DeployArchive {
        base64: encode_base64(&bytes),
        bytes,
        manifest,
    })
}
