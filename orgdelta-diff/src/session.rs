//! The change-record list an operator works from between comparing and
//! deploying.

use std::collections::BTreeSet;

use orgdelta_core::{ChangeRecord, ChangeStatus};

use crate::differ::diff_archives;
use crate::error::ArchiveError;

/// Holds the result of the latest successful comparison.
#[derive(Debug, Clone, Default)]
pub struct ComparisonSession {
    records: Vec<ChangeRecord>,
}

impl ComparisonSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session preloaded with a small offline data set.
    pub fn demo() -> Self {
        Self {
            records: demo_records(),
        }
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Swap in a fresh comparison result wholesale.
    pub fn replace(&mut self, records: Vec<ChangeRecord>) {
        self.records = records;
    }

    /// Diff two archives and, on success only, replace the held list.
    pub fn compare(
        &mut self,
        source: Vec<u8>,
        target: Vec<u8>,
    ) -> Result<&[ChangeRecord], ArchiveError> {
        let records = diff_archives(source, target)?;
        self.replace(records);
        Ok(&self.records)
    }

    /// Records at `indices`, in list order with duplicates collapsed.
    pub fn select(&self, indices: &[usize]) -> Result<Vec<ChangeRecord>, ArchiveError> {
        let len = self.records.len();
        let mut picked = BTreeSet::new();
        for &index in indices {
            if index >= len {
                return Err(ArchiveError::SelectionOutOfRange { index, len });
            }
            picked.insert(index);
        }
        Ok(picked.into_iter().map(|i| self.records[i].clone()).collect())
    }

    pub fn reset(&mut self) {
        self.records.clear();
    }
}

fn demo_records() -> Vec<ChangeRecord> {
    vec![
        ChangeRecord {
            path: "unpackaged/classes/AccountTriggerHandler.cls".to_string(),
            status: ChangeStatus::Modified,
            source_content: "public class AccountTriggerHandler {\n    public static void afterInsert(List<Account> newAccounts) {\n        // Handled insertion logic\n        System.debug('Account created');\n    }\n}".to_string(),
            target_content: "public class AccountTriggerHandler {\n    public static void afterInsert(List<Account> newAccounts) {\n        // Old logic\n    }\n}".to_string(),
        },
        ChangeRecord {
            path: "unpackaged/objects/Opportunity.object".to_string(),
            status: ChangeStatus::Modified,
            source_content: "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<CustomObject xmlns=\"http://soap.sforce.com/2006/04/metadata\">\n    <fields>\n        <fullName>Discount__c</fullName>\n        <type>Percent</type>\n    </fields>\n</CustomObject>".to_string(),
            target_content: "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<CustomObject xmlns=\"http://soap.sforce.com/2006/04/metadata\">\n    <!-- Missing Discount field -->\n</CustomObject>".to_string(),
        },
        ChangeRecord {
            path: "unpackaged/lwc/customDatatable/customDatatable.js".to_string(),
            status: ChangeStatus::New,
            source_content: "import { LightningElement } from 'lwc';\n\nexport default class CustomDatatable extends LightningElement {\n    data = [];\n    columns = [{ label: 'Name', fieldName: 'name' }];\n}".to_string(),
            target_content: String::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ZipBuilder;

    fn zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = ZipBuilder::new();
        for (path, content) in entries {
            builder.write_text(path, content).expect("write");
        }
        builder.finish().expect("finish")
    }

    #[test]
    fn select_follows_list_order_and_collapses_duplicates() {
        let session = ComparisonSession::demo();
        let picked = session.select(&[2, 0, 2]).expect("select");
        let paths: Vec<&str> = picked.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "unpackaged/classes/AccountTriggerHandler.cls",
                "unpackaged/lwc/customDatatable/customDatatable.js",
            ]
        );
    }

    #[test]
    fn select_rejects_out_of_range() {
        let session = ComparisonSession::demo();
        let err = session.select(&[0, 3]).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::SelectionOutOfRange { index: 3, len: 3 }
        ));
    }

    #[test]
    fn empty_selection_is_empty() {
        let session = ComparisonSession::demo();
        assert!(session.select(&[]).expect("select").is_empty());
    }

    #[test]
    fn reset_clears_records() {
        let mut session = ComparisonSession::demo();
        session.reset();
        assert!(session.is_empty());
    }

    #[test]
    fn replace_swaps_wholesale() {
        let mut session = ComparisonSession::demo();
        session.replace(Vec::new());
        assert!(session.is_empty());
        session.replace(demo_records()[..1].to_vec());
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn failed_compare_keeps_previous_list() {
        let mut session = ComparisonSession::demo();
        let result = session.compare(b"junk".to_vec(), zip(&[]));
        assert!(result.is_err());
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn successful_compare_replaces_list() {
        let mut session = ComparisonSession::demo();
        let records = session
            .compare(zip(&[("unpackaged/classes/Foo.cls", "A")]), zip(&[]))
            .expect("compare")
            .to_vec();
        assert_eq!(records.len(), 1);
        assert_eq!(session.records()[0].path, "unpackaged/classes/Foo.cls");
    }

    #[test]
    fn demo_statuses() {
        let session = ComparisonSession::demo();
        let statuses: Vec<ChangeStatus> = session.records().iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![ChangeStatus::Modified, ChangeStatus::Modified, ChangeStatus::New]
        );
    }
}
