pub mod compare;
pub mod deploy;
pub mod env;
mod input;
pub mod manifest;
pub mod show;
pub mod status;

use anyhow::{Context, Result};

/// Multi-threaded runtime for commands that talk to an org or poll.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
