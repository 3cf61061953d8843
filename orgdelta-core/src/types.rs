//! Domain types shared by the diff, renderer, and remote crates.
//!
//! Everything here is plain data: no I/O, no network. Types that cross the
//! CLI's `--json` output derive serde.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::FolderTypeTable;

/// Root folder every entry of a retrieved or deployed archive lives under.
pub const ARCHIVE_ROOT: &str = "unpackaged";

/// Well-known location of the manifest descriptor inside an archive.
pub const MANIFEST_PATH: &str = "unpackaged/package.xml";

/// Metadata API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "58.0";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque identifier of an asynchronous deploy job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Session token for an org. Never printed: `Debug` and `Display` redact it.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token, for placing into a request envelope.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which side of a comparison an operation or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// Classification of a differing entry. Unchanged entries are never materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeStatus {
    /// Present in source, absent from target.
    New,
    /// Present in both with differing text.
    Modified,
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeStatus::New => write!(f, "New"),
            ChangeStatus::Modified => write!(f, "Modified"),
        }
    }
}

/// Lifecycle state of a deploy job as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeployStatus {
    Queued,
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl DeployStatus {
    /// Parse the status text returned by `checkDeployStatus`.
    ///
    /// `Pending` is the API's spelling of queued; `Canceling` is still in
    /// flight. Anything else yields `None`.
    pub fn from_api(text: &str) -> Option<Self> {
        match text.trim() {
            "Queued" | "Pending" => Some(DeployStatus::Queued),
            "InProgress" | "Canceling" => Some(DeployStatus::InProgress),
            "Succeeded" => Some(DeployStatus::Succeeded),
            "Failed" => Some(DeployStatus::Failed),
            "Canceled" => Some(DeployStatus::Canceled),
            _ => None,
        }
    }

    /// Succeeded, Failed and Canceled end polling.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DeployStatus::Succeeded | DeployStatus::Failed | DeployStatus::Canceled
        )
    }
}

impl fmt::Display for DeployStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployStatus::Queued => write!(f, "Queued"),
            DeployStatus::InProgress => write!(f, "InProgress"),
            DeployStatus::Succeeded => write!(f, "Succeeded"),
            DeployStatus::Failed => write!(f, "Failed"),
            DeployStatus::Canceled => write!(f, "Canceled"),
        }
    }
}

/// Test execution level passed through to the deploy endpoint verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TestLevel {
    #[default]
    NoTestRun,
    RunSpecifiedTests,
    RunLocalTests,
    RunAllTestsInOrg,
}

impl fmt::Display for TestLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestLevel::NoTestRun => write!(f, "NoTestRun"),
            TestLevel::RunSpecifiedTests => write!(f, "RunSpecifiedTests"),
            TestLevel::RunLocalTests => write!(f, "RunLocalTests"),
            TestLevel::RunAllTestsInOrg => write!(f, "RunAllTestsInOrg"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One entry that is new in, or differs from, the target archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Archive-relative path, e.g. `unpackaged/classes/Foo.cls`.
    pub path: String,
    pub status: ChangeStatus,
    pub source_content: String,
    /// Empty when `status` is [`ChangeStatus::New`].
    pub target_content: String,
}

impl ChangeRecord {
    /// Display pair `(type, component)` for listings.
    ///
    /// The archive root is stripped first; with fewer than two remaining
    /// segments the type is `Unknown` and the component is the whole path.
    pub fn component(&self, table: &FolderTypeTable) -> (String, String) {
        let root = format!("{ARCHIVE_ROOT}/");
        let raw = self.path.replacen(&root, "", 1);
        let parts: Vec<&str> = raw.split('/').collect();
        if parts.len() >= 2 {
            (table.type_for(parts[0]).to_string(), parts[1..].join("/"))
        } else {
            ("Unknown".to_string(), raw)
        }
    }
}

/// Connection details for one org.
#[derive(Debug, Clone)]
pub struct OrgCredentials {
    /// Base URL, e.g. `https://example.my.salesforce.com`.
    pub instance_url: String,
    pub session_id: SessionId,
    pub api_version: String,
}

impl OrgCredentials {
    pub fn new(instance_url: impl Into<String>, session_id: SessionId) -> Self {
        Self {
            instance_url: instance_url.into(),
            session_id,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// SOAP endpoint for the metadata API at this org's configured version.
    pub fn soap_endpoint(&self) -> String {
        format!(
            "{}/services/Soap/m/{}",
            self.instance_url.trim_end_matches('/'),
            self.api_version
        )
    }
}

/// Test execution options for a deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConfig {
    pub test_level: TestLevel,
    /// Named test classes; an empty list is sent as-is and left to the endpoint.
    #[serde(default)]
    pub test_classes: Vec<String>,
    /// Validate only; nothing is committed in the target org.
    pub check_only: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            test_level: TestLevel::NoTestRun,
            test_classes: Vec::new(),
            check_only: true,
        }
    }
}

/// A submitted deploy and its last observed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployJob {
    pub job_id: JobId,
    pub status: DeployStatus,
    /// Populated only for Failed and Canceled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_detail: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl DeployJob {
    pub fn queued(job_id: JobId) -> Self {
        Self {
            job_id,
            status: DeployStatus::Queued,
            failure_detail: None,
            submitted_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
