//! # orgdelta-renderer
//!
//! Tera-based rendering of the two XML documents orgdelta produces: the
//! synthesized `package.xml` manifest and the SOAP request envelopes sent to
//! the metadata API.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use orgdelta_core::{ChangeRecord, FolderTypeTable};
//! use orgdelta_renderer::manifest;
//!
//! fn package_for(selected: &[ChangeRecord]) -> String {
//!     manifest::synthesize(selected, &FolderTypeTable::default(), "58.0")
//!         .unwrap_or_default()
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod manifest;

pub use context::{ManifestContext, TypeBlock};
pub use engine::{Envelope, Renderer};
pub use error::RenderError;
pub use manifest::{
    member_name, synthesize, unpackaged_fragment, wildcard_manifest, TypeMemberMap,
};
