//! Template contexts: serializable rendering payloads.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::manifest::TypeMemberMap;

/// Payload for `package.xml.tera`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestContext {
    /// One block per type, in first-encounter order.
    pub types: Vec<TypeBlock>,
    /// Trailing `<version>` tag.
    pub version: String,
}

/// One `<types>` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBlock {
    pub name: String,
    pub members: Vec<String>,
}

impl ManifestContext {
    /// Flatten a [`TypeMemberMap`] into render order.
    pub fn from_map(map: &TypeMemberMap, version: impl Into<String>) -> Self {
        let types = map
            .iter()
            .map(|(name, members)| TypeBlock {
                name: name.clone(),
                members: members.iter().cloned().collect(),
            })
            .collect();
        Self {
            types,
            version: version.into(),
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
