//! # orgdelta-diff
//!
//! Archive comparison and repackaging.
//!
//! Call [`diff_archives`] to compare a source and target archive, hold the
//! result in a [`ComparisonSession`], and pass a selection to
//! [`build_deploy_archive`] to produce the zip that gets deployed.

pub mod codec;
pub mod differ;
pub mod error;
pub mod package;
pub mod render;
pub mod session;

pub use codec::{decode_base64, encode_base64, EntryCodec, ZipBuilder, ZipEntries};
pub use differ::{diff, diff_archives};
pub use error::{ArchiveError, CodecError};
pub use package::{build_deploy_archive, DeployArchive};
pub use render::unified_diff;
pub use session::ComparisonSession;
