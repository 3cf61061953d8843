//! Remote side of orgdelta: metadata API access, two-org retrieval, deploy
//! submission and job polling.

pub mod cancel;
pub mod client;
pub mod envelope;
mod error;
pub mod fetch;
pub mod logging;
pub mod poller;
pub mod submit;

pub use cancel::CancelToken;
pub use client::{MetadataApi, SoapClient};
pub use envelope::{RetrieveOutcome, StatusReport};
pub use error::RemoteError;
pub use fetch::{compare_orgs, fetch_pair};
pub use logging::{init_tracing, LogFormat};
pub use poller::{JobStatusPoller, DEFAULT_FAILURE_DETAIL, POLL_INTERVAL};
pub use submit::submit;
