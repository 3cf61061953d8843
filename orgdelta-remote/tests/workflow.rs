use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio_test::{assert_err, assert_ok};

use orgdelta_core::{
    ChangeRecord, ChangeStatus, DeployStatus, FolderTypeTable, JobId, OrgCredentials, SessionId,
    Side, TestConfig, MANIFEST_PATH,
};
use orgdelta_diff::{EntryCodec, ZipBuilder, ZipEntries};
use orgdelta_remote::envelope::parse_deploy_status;
use orgdelta_remote::{
    compare_orgs, fetch_pair, submit, CancelToken, JobStatusPoller, MetadataApi, RemoteError,
    StatusReport, DEFAULT_FAILURE_DETAIL,
};

const SOURCE_URL: &str = "https://source.example.com";
const TARGET_URL: &str = "https://target.example.com";

/// One scripted answer to a status query.
#[derive(Clone)]
enum Reply {
    Status(&'static str),
    Failed(&'static str, &'static str),
    NoStatus,
    /// Raw response body, run through the real parser.
    Body(&'static str),
    TransportDown,
}

#[derive(Default)]
struct FakeApi {
    replies: Mutex<VecDeque<Reply>>,
    status_queries: AtomicUsize,
    deploys: Mutex<Vec<String>>,
    deploy_fault: Option<&'static str>,
    source_zip: Option<Vec<u8>>,
    target_zip: Option<Vec<u8>>,
    cancel_after: Option<(usize, CancelToken)>,
}

impl FakeApi {
    fn scripted(replies: &[Reply]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().cloned().collect()),
            ..Self::default()
        }
    }

    fn queries(&self) -> usize {
        self.status_queries.load(Ordering::SeqCst)
    }

    fn deploy_count(&self) -> usize {
        self.deploys.lock().expect("lock").len()
    }
}

fn fault(operation: &'static str, message: &str) -> RemoteError {
    RemoteError::Fault {
        operation,
        status: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl MetadataApi for FakeApi {
    async fn retrieve(&self, org: &OrgCredentials, _manifest: &str) -> Result<Vec<u8>, RemoteError> {
        let zip = if org.instance_url == SOURCE_URL {
            &self.source_zip
        } else {
            &self.target_zip
        };
        zip.clone()
            .ok_or_else(|| fault("retrieve", "INVALID_SESSION_ID: Invalid Session ID"))
    }

    async fn deploy(
        &self,
        _org: &OrgCredentials,
        zip_base64: &str,
        _options: &TestConfig,
    ) -> Result<JobId, RemoteError> {
        self.deploys.lock().expect("lock").push(zip_base64.to_string());
        match self.deploy_fault {
            Some(message) => Err(fault("deploy", message)),
            None => Ok(JobId::from("0Af000000000001")),
        }
    }

    async fn check_deploy_status(
        &self,
        _org: &OrgCredentials,
        _job_id: &JobId,
    ) -> Result<StatusReport, RemoteError> {
        let count = self.status_queries.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, token)) = &self.cancel_after {
            if count >= *after {
                token.cancel();
            }
        }
        let reply = self
            .replies
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or(Reply::Status("InProgress"));
        match reply {
            Reply::Status(text) => Ok(StatusReport {
                status: DeployStatus::from_api(text),
                problem: None,
            }),
            Reply::Failed(text, problem) => Ok(StatusReport {
                status: DeployStatus::from_api(text),
                problem: Some(problem.to_string()),
            }),
            Reply::NoStatus => Ok(StatusReport {
                status: None,
                problem: None,
            }),
            Reply::Body(xml) => parse_deploy_status(xml),
            Reply::TransportDown => Err(fault("checkDeployStatus", "connection reset")),
        }
    }
}

fn org(url: &str) -> OrgCredentials {
    OrgCredentials::new(url, SessionId::new("00D!token"))
}

fn record(path: &str) -> ChangeRecord {
    ChangeRecord {
        path: path.to_string(),
        status: ChangeStatus::New,
        source_content: format!("// {path}"),
        target_content: String::new(),
    }
}

fn zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = ZipBuilder::new();
    for (path, content) in entries {
        builder.write_text(path, content).expect("write");
    }
    builder.finish().expect("finish")
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn queued_to_succeeded_takes_four_queries() {
    let api = FakeApi::scripted(&[
        Reply::Status("Queued"),
        Reply::Status("InProgress"),
        Reply::Status("InProgress"),
        Reply::Status("Succeeded"),
    ]);
    let mut seen = Vec::new();
    let job = assert_ok!(
        JobStatusPoller::new(&api)
            .poll(
                &JobId::from("0Af1"),
                &org(TARGET_URL),
                |s| seen.push(s),
                &CancelToken::new(),
            )
            .await
    );

    assert_eq!(job.status, DeployStatus::Succeeded);
    assert_eq!(job.failure_detail, None);
    assert_eq!(api.queries(), 4);
    assert_eq!(
        seen,
        vec![
            DeployStatus::Queued,
            DeployStatus::InProgress,
            DeployStatus::Succeeded
        ]
    );
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn waits_the_interval_before_each_query() {
    let api = FakeApi::scripted(&[Reply::Status("Queued"), Reply::Status("Succeeded")]);
    let started = tokio::time::Instant::now();
    assert_ok!(
        JobStatusPoller::new(&api)
            .poll(&JobId::from("0Af1"), &org(TARGET_URL), |_| {}, &CancelToken::new())
            .await
    );
    assert_eq!(started.elapsed(), Duration::from_secs(6));
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn transport_failure_stops_polling() {
    let api = FakeApi::scripted(&[
        Reply::Status("Queued"),
        Reply::TransportDown,
        Reply::Status("Succeeded"),
    ]);
    let err = assert_err!(
        JobStatusPoller::new(&api)
            .poll(&JobId::from("0Af1"), &org(TARGET_URL), |_| {}, &CancelToken::new())
            .await
    );
    assert!(matches!(err, RemoteError::PollTransport { .. }), "got: {err}");
    assert_eq!(api.queries(), 2);
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn missing_status_skips_the_cycle() {
    let api = FakeApi::scripted(&[
        Reply::NoStatus,
        Reply::Status("SucceededPartial"),
        Reply::Status("Succeeded"),
    ]);
    let mut seen = Vec::new();
    let job = assert_ok!(
        JobStatusPoller::new(&api)
            .poll(
                &JobId::from("0Af1"),
                &org(TARGET_URL),
                |s| seen.push(s),
                &CancelToken::new(),
            )
            .await
    );
    assert_eq!(job.status, DeployStatus::Succeeded);
    assert_eq!(api.queries(), 3);
    assert_eq!(seen, vec![DeployStatus::Succeeded]);
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn unreadable_status_body_skips_the_cycle() {
    let api = FakeApi::scripted(&[
        Reply::Body("<html><body>Service busy<br></body></html>"),
        Reply::Body(
            "<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\">\
             <soapenv:Body><checkDeployStatusResponse><result>\
             <status>Succeeded</status></result></checkDeployStatusResponse>\
             </soapenv:Body></soapenv:Envelope>",
        ),
    ]);
    let mut seen = Vec::new();
    let job = assert_ok!(
        JobStatusPoller::new(&api)
            .poll(
                &JobId::from("0Af1"),
                &org(TARGET_URL),
                |s| seen.push(s),
                &CancelToken::new(),
            )
            .await
    );
    assert_eq!(job.status, DeployStatus::Succeeded);
    assert_eq!(api.queries(), 2);
    assert_eq!(seen, vec![DeployStatus::Succeeded]);
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn failure_carries_problem_text() {
    let api = FakeApi::scripted(&[Reply::Failed("Failed", "Variable does not exist: x")]);
    let job = assert_ok!(
        JobStatusPoller::new(&api)
            .poll(&JobId::from("0Af1"), &org(TARGET_URL), |_| {}, &CancelToken::new())
            .await
    );
    assert_eq!(job.status, DeployStatus::Failed);
    assert_eq!(job.failure_detail.as_deref(), Some("Variable does not exist: x"));
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn failure_without_problem_uses_generic_detail() {
    for terminal in ["Failed", "Canceled"] {
        let api = FakeApi::scripted(&[Reply::Status(terminal)]);
        let job = assert_ok!(
            JobStatusPoller::new(&api)
                .poll(&JobId::from("0Af1"), &org(TARGET_URL), |_| {}, &CancelToken::new())
                .await
        );
        assert!(job.status.is_terminal());
        assert_eq!(job.failure_detail.as_deref(), Some(DEFAULT_FAILURE_DETAIL));
    }
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn cancellation_stops_further_queries() {
    let token = CancelToken::new();
    let api = FakeApi {
        cancel_after: Some((2, token.clone())),
        ..FakeApi::default()
    };
    let err = assert_err!(
        JobStatusPoller::new(&api)
            .poll(&JobId::from("0Af1"), &org(TARGET_URL), |_| {}, &token)
            .await
    );
    assert!(matches!(err, RemoteError::Cancelled));
    assert_eq!(api.queries(), 2);
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn cancellation_interrupts_the_wait() {
    let api = FakeApi::default();
    let token = CancelToken::new();
    let target = org(TARGET_URL);
    let job_id = JobId::from("0Af1");
    let poller = JobStatusPoller::new(&api);

    let (result, ()) = tokio::join!(poller.poll(&job_id, &target, |_| {}, &token), async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();
    });
    assert!(matches!(result, Err(RemoteError::Cancelled)));
    assert_eq!(api.queries(), 0);
}

#[tokio::test(start_paused = true, flavor = "current_thread")]
async fn overall_timeout_bounds_a_stuck_job() {
    let api = FakeApi::default();
    let outcome = tokio::time::timeout(
        Duration::from_secs(31),
        JobStatusPoller::new(&api).poll(
            &JobId::from("0Af1"),
            &org(TARGET_URL),
            |_| {},
            &CancelToken::new(),
        ),
    )
    .await;
    assert!(outcome.is_err(), "poll must still be running at the deadline");
    assert_eq!(api.queries(), 10);
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_selection_makes_no_call() {
    let api = FakeApi::default();
    let err = assert_err!(
        submit(
            &api,
            &[],
            &org(TARGET_URL),
            &TestConfig::default(),
            &FolderTypeTable::default(),
            "58.0",
        )
        .await
    );
    assert!(matches!(err, RemoteError::SubmissionPrecondition));
    assert_eq!(api.deploy_count(), 0);
}

#[tokio::test]
async fn submit_sends_archive_with_manifest() {
    let api = FakeApi::default();
    let selected = vec![
        record("unpackaged/classes/Foo.cls"),
        record("unpackaged/classes/Bar.cls"),
    ];
    let job_id = assert_ok!(
        submit(
            &api,
            &selected,
            &org(TARGET_URL),
            &TestConfig::default(),
            &FolderTypeTable::default(),
            "58.0",
        )
        .await
    );
    assert_eq!(job_id, JobId::from("0Af000000000001"));

    let sent = api.deploys.lock().expect("lock")[0].clone();
    let mut entries = ZipEntries::from_base64(&sent).expect("valid zip");
    assert_eq!(
        entries.entry_paths(),
        &["unpackaged/classes/Foo.cls", "unpackaged/classes/Bar.cls", MANIFEST_PATH]
    );
    assert_eq!(
        entries.read_text("unpackaged/classes/Bar.cls").expect("bar"),
        "// unpackaged/classes/Bar.cls"
    );
    let manifest = entries.read_text(MANIFEST_PATH).expect("manifest");
    assert_eq!(manifest.matches("<name>ApexClass</name>").count(), 1);
}

#[tokio::test]
async fn endpoint_rejection_keeps_its_message() {
    let api = FakeApi {
        deploy_fault: Some("INVALID_SESSION_ID: Invalid Session ID"),
        ..FakeApi::default()
    };
    let err = assert_err!(
        submit(
            &api,
            &[record("unpackaged/classes/Foo.cls")],
            &org(TARGET_URL),
            &TestConfig::default(),
            &FolderTypeTable::default(),
            "58.0",
        )
        .await
    );
    match err {
        RemoteError::Submission { message } => {
            assert_eq!(message, "INVALID_SESSION_ID: Invalid Session ID")
        }
        other => panic!("expected submission error, got {other}"),
    }
    assert_eq!(api.deploy_count(), 1);
}

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_failure_names_the_side() {
    let api = FakeApi {
        source_zip: Some(zip(&[])),
        target_zip: None,
        ..FakeApi::default()
    };
    let err = assert_err!(fetch_pair(&api, &org(SOURCE_URL), &org(TARGET_URL), "").await);
    match err {
        RemoteError::Side { side, .. } => assert_eq!(side, Side::Target),
        other => panic!("expected side error, got {other}"),
    }
}

#[tokio::test]
async fn both_failing_reports_source() {
    let api = FakeApi::default();
    let err = assert_err!(fetch_pair(&api, &org(SOURCE_URL), &org(TARGET_URL), "").await);
    assert!(matches!(err, RemoteError::Side { side: Side::Source, .. }));
}

#[tokio::test]
async fn compare_orgs_diffs_retrieved_archives() {
    let api = FakeApi {
        source_zip: Some(zip(&[
            ("unpackaged/classes/Foo.cls", "A"),
            ("unpackaged/objects/Opp.object", "new"),
            (MANIFEST_PATH, "<Package/>"),
        ])),
        target_zip: Some(zip(&[("unpackaged/objects/Opp.object", "old")])),
        ..FakeApi::default()
    };
    let records = assert_ok!(compare_orgs(&api, &org(SOURCE_URL), &org(TARGET_URL), "").await);
    let summary: Vec<(&str, ChangeStatus)> =
        records.iter().map(|r| (r.path.as_str(), r.status)).collect();
    assert_eq!(
        summary,
        vec![
            ("unpackaged/classes/Foo.cls", ChangeStatus::New),
            ("unpackaged/objects/Opp.object", ChangeStatus::Modified),
        ]
    );
}
