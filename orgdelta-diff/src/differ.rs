//! Source-authoritative archive comparison.
//!
//! Every non-directory source entry not excluded is classified:
//!
//! 1. absent from target → [`ChangeStatus::New`] with empty target text;
//! 2. present in both with text that is not byte-for-byte equal →
//!    [`ChangeStatus::Modified`];
//! 3. otherwise nothing is emitted.
//!
//! The existence check runs before any content comparison, so an empty
//! target entry is never mistaken for a missing one. Entries that exist only
//! in the target are never reported. Output keeps source enumeration order.

use orgdelta_core::{ChangeRecord, ChangeStatus, Side, MANIFEST_PATH};

use crate::codec::{EntryCodec, ZipEntries};
use crate::error::{read_err, ArchiveError};

/// Compare two opened archives.
///
/// Fails as a whole on the first unreadable entry, tagged with its side.
pub fn diff<S, T>(
    source: &mut S,
    target: &mut T,
    exclude: &[&str],
) -> Result<Vec<ChangeRecord>, ArchiveError>
where
    S: EntryCodec,
    T: EntryCodec,
{
    let paths: Vec<String> = source
        .entry_paths()
        .iter()
        .filter(|path| !exclude.contains(&path.as_str()))
        .cloned()
        .collect();

    let mut records = Vec::new();
    for path in paths {
        let source_content = source
            .read_text(&path)
            .map_err(|e| read_err(Side::Source, e))?;

        if !target.contains(&path) {
            tracing::debug!(path = %path, "new entry");
            records.push(ChangeRecord {
                path,
                status: ChangeStatus::New,
                source_content,
                target_content: String::new(),
            });
            continue;
        }

        let target_content = target
            .read_text(&path)
            .map_err(|e| read_err(Side::Target, e))?;
        if source_content != target_content {
            tracing::debug!(path = %path, "modified entry");
            records.push(ChangeRecord {
                path,
                status: ChangeStatus::Modified,
                source_content,
                target_content,
            });
        }
    }

    Ok(records)
}

/// Open both zips and compare them, skipping the manifest descriptor.
pub fn diff_archives(
    source: Vec<u8>,
    target: Vec<u8>,
) -> Result<Vec<ChangeRecord>, ArchiveError> {
    let mut source = ZipEntries::from_bytes(source).map_err(|e| read_err(Side::Source, e))?;
    let mut target = ZipEntries::from_bytes(target).map_err(|e| read_err(Side::Target, e))?;

    let records = diff(&mut source, &mut target, &[MANIFEST_PATH])?;
    tracing::info!(
        source_entries = source.entry_paths().len(),
        target_entries = target.entry_paths().len(),
        changes = records.len(),
        "archive comparison complete",
    );
    Ok(records)
}
