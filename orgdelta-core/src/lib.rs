//! orgdelta core library: domain types, folder classification, config, errors.
//!
//! Public API surface:
//! - [`types`]: change records, deploy jobs, credentials, test options
//! - [`classify`]: [`FolderTypeTable`], the folder → metadata type lookup
//! - [`config`]: load / save of `~/.orgdelta/config.yaml`
//! - [`error`]: [`ConfigError`]

pub mod classify;
pub mod config;
pub mod error;
pub mod types;

pub use classify::FolderTypeTable;
pub use config::{Config, Environment};
pub use error::ConfigError;
pub use types::{
    ChangeRecord, ChangeStatus, DeployJob, DeployStatus, JobId, OrgCredentials, SessionId, Side,
    TestConfig, TestLevel, ARCHIVE_ROOT, DEFAULT_API_VERSION, MANIFEST_PATH,
};
