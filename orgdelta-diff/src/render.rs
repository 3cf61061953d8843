//! Line-level presentation of a change record.

use similar::TextDiff;

use orgdelta_core::ChangeRecord;

/// Unified diff of `record`, target as the old side and source as the new.
///
/// Text is compared exactly as stored; a line-ending change shows up as a
/// changed line. New records diff against empty text.
pub fn unified_diff(record: &ChangeRecord) -> String {
    let old_header = format!("{} (Target)", record.path);
    let new_header = format!("{} (Source)", record.path);
    TextDiff::from_lines(&record.target_content, &record.source_content)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}
