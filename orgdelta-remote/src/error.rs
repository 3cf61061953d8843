use thiserror::Error;

use orgdelta_core::{JobId, Side};
use orgdelta_diff::ArchiveError;
use orgdelta_renderer::RenderError;

/// Error surface for metadata API calls, submission and polling.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success HTTP status.
    #[error("{operation} failed (HTTP {status}): {message}")]
    Fault {
        operation: &'static str,
        status: u16,
        message: String,
    },

    /// A success response was missing a required element or was not XML.
    #[error("malformed {operation} response: {detail}")]
    Envelope {
        operation: &'static str,
        detail: String,
    },

    #[error("retrieve failed: {message}")]
    Retrieve { message: String },

    #[error("nothing selected to deploy")]
    SubmissionPrecondition,

    #[error("deploy submission rejected: {message}")]
    Submission { message: String },

    #[error("status query for job {job_id} failed: {source}")]
    PollTransport {
        job_id: JobId,
        #[source]
        source: Box<RemoteError>,
    },

    #[error("polling cancelled")]
    Cancelled,

    /// One half of a two-org operation failed.
    #[error("{side} org: {source}")]
    Side {
        side: Side,
        #[source]
        source: Box<RemoteError>,
    },

    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub(crate) fn envelope_err(operation: &'static str, detail: impl Into<String>) -> RemoteError {
    RemoteError::Envelope {
        operation,
        detail: detail.into(),
    }
}

pub(crate) fn side_err(side: Side, source: RemoteError) -> RemoteError {
    RemoteError::Side {
        side,
        source: Box::new(source),
    }
}
