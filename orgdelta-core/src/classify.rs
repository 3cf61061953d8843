//! Folder → metadata type classification.
//!
//! Segment 1 of an archive path (`unpackaged/<folder>/...`) names a
//! component-type folder. The mapping to metadata type names belongs to the
//! external metadata format, so it is kept as data rather than code and can
//! be extended from config (`folder_types:`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const DEFAULT_FOLDER_TYPES: &[(&str, &str)] = &[
    ("classes", "ApexClass"),
    ("pages", "ApexPage"),
    ("components", "ApexComponent"),
    ("triggers", "ApexTrigger"),
    ("aura", "AuraDefinitionBundle"),
    ("lwc", "LightningComponentBundle"),
    ("objects", "CustomObject"),
    ("layouts", "Layout"),
    ("permissionsets", "PermissionSet"),
    ("profiles", "Profile"),
    ("customMetadata", "CustomMetadata"),
    ("labels", "CustomLabels"),
];

/// Lookup table from archive folder name to metadata type name.
///
/// Unrecognized folders pass through as their literal name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderTypeTable {
    entries: BTreeMap<String, String>,
}

impl Default for FolderTypeTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_FOLDER_TYPES
                .iter()
                .map(|(folder, ty)| ((*folder).to_string(), (*ty).to_string()))
                .collect(),
        }
    }
}

impl FolderTypeTable {
    /// A table with no entries; every folder passes through unchanged.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Type name for `folder`, or `folder` itself when unmapped.
    pub fn type_for<'a>(&'a self, folder: &'a str) -> &'a str {
        self.entries.get(folder).map(String::as_str).unwrap_or(folder)
    }

    /// Add or replace a mapping.
    pub fn insert(&mut self, folder: impl Into<String>, type_name: impl Into<String>) {
        self.entries.insert(folder.into(), type_name.into());
    }

    /// Return a copy with `overrides` layered on top.
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        for (folder, ty) in overrides {
            self.insert(folder.clone(), ty.clone());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(folder, type)` pairs in folder-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, t)| (f.as_str(), t.as_str()))
    }
}
