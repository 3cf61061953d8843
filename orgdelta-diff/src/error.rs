//! Error types for orgdelta-diff.

use thiserror::Error;

use orgdelta_core::Side;
use orgdelta_renderer::RenderError;

/// Low-level archive codec failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// All errors that can arise from comparing or building archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// One side's archive could not be opened, or one of its entries read.
    #[error("{side} archive unreadable: {source}")]
    Read {
        side: Side,
        #[source]
        source: CodecError,
    },

    /// The outbound archive could not be assembled.
    #[error("failed to build archive: {0}")]
    Write(#[source] CodecError),

    /// A selection index does not name a change record.
    #[error("selection index {index} is out of range ({len} change records)")]
    SelectionOutOfRange { index: usize, len: usize },

    /// Manifest rendering failed.
    #[error("manifest error: {0}")]
    Render(#[from] RenderError),
}

/// Convenience constructor for [`ArchiveError::Read`].
pub(crate) fn read_err(side: Side, source: impl Into<CodecError>) -> ArchiveError {
    ArchiveError::Read {
        side,
        source: source.into(),
    }
}
