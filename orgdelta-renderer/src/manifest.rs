//! Manifest synthesis: selected change records → minimal `package.xml`.
//!
//! A record at `unpackaged/<folder>/<rest>` contributes the member
//! `<rest>` truncated at its first `.`, under the type the folder maps to.
//! Paths with fewer than three segments cannot be classified and are left
//! out of the manifest without error.
//!
//! Member names are inserted verbatim; markup characters in a name would
//! produce an invalid document.

use indexmap::{IndexMap, IndexSet};

use orgdelta_core::{ChangeRecord, FolderTypeTable};

use crate::context::ManifestContext;
use crate::engine::Renderer;
use crate::error::RenderError;

/// Ordered `type → members` mapping.
///
/// Types iterate in first-encounter order and members in first-insertion
/// order; re-inserting an existing pair is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMemberMap {
    types: IndexMap<String, IndexSet<String>>,
}

impl TypeMemberMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records, classifying folders through `table`.
    pub fn from_records(records: &[ChangeRecord], table: &FolderTypeTable) -> Self {
        let mut map = Self::new();
        for record in records {
            if let Some((folder, member)) = member_name(&record.path) {
                map.insert(table.type_for(folder), member);
            }
        }
        map
    }

    /// Returns `true` if the pair was not already present.
    pub fn insert(&mut self, type_name: impl Into<String>, member: impl Into<String>) -> bool {
        self.types
            .entry(type_name.into())
            .or_default()
            .insert(member.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexSet<String>)> {
        self.types.iter()
    }

    pub fn members(&self, type_name: &str) -> Option<&IndexSet<String>> {
        self.types.get(type_name)
    }

    /// Number of type blocks.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Split an archive path into `(folder, member)`.
///
/// `unpackaged/classes/Foo.cls` → `("classes", "Foo")`. Returns `None` for
/// paths with fewer than three `/`-separated segments.
pub fn member_name(path: &str) -> Option<(&str, String)> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() < 3 {
        return None;
    }
    let rest = parts[2..].join("/");
    let member = rest.split('.').next().unwrap_or_default().to_string();
    Some((parts[1], member))
}

/// Render the manifest for `selected` with the embedded template.
pub fn synthesize(
    selected: &[ChangeRecord],
    table: &FolderTypeTable,
    version: &str,
) -> Result<String, RenderError> {
    let renderer = Renderer::new()?;
    let map = TypeMemberMap::from_records(selected, table);
    renderer.render_manifest(&ManifestContext::from_map(&map, version))
}

/// Manifest requesting every member (`*`) of each type in `table`.
///
/// Used as the default retrieve scope when no manifest is supplied.
pub fn wildcard_manifest(table: &FolderTypeTable, version: &str) -> Result<String, RenderError> {
    let renderer = Renderer::new()?;
    let mut map = TypeMemberMap::new();
    for (_, type_name) in table.iter() {
        map.insert(type_name, "*");
    }
    renderer.render_manifest(&ManifestContext::from_map(&map, version))
}

/// Inner content of a manifest, suitable for a retrieve request's
/// `<unpackaged>` element.
///
/// Accepts either a full `package.xml` (declaration and `<Package>` wrapper
/// are stripped) or a bare sequence of `<types>`/`<version>` elements, which
/// is returned trimmed.
pub fn unpackaged_fragment(xml: &str) -> &str {
    let mut body = xml.trim();
    if body.starts_with("<?xml") {
        if let Some(end) = body.find("?>") {
            body = body[end + 2..].trim_start();
        }
    }
    if body.starts_with("<Package") {
        if let Some(open_end) = body.find('>') {
            let inner = &body[open_end + 1..];
            let inner = inner
                .rfind("</Package>")
                .map(|close| &inner[..close])
                .unwrap_or(inner);
            return inner.trim();
        }
    }
    body
}
