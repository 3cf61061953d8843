//! `orgdelta deploy`: submit the selected changes and follow the job.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use orgdelta_core::{DeployJob, DeployStatus, JobId, OrgCredentials, TestConfig, TestLevel};
use orgdelta_remote::{submit, CancelToken, JobStatusPoller, SoapClient};

use super::input::{home_and_config, InputArgs};
use crate::TestLevelArg;

/// Arguments for `orgdelta deploy`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Row numbers from `orgdelta compare`, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub select: Vec<usize>,

    /// NoTestRun | RunSpecifiedTests | RunLocalTests | RunAllTestsInOrg.
    #[arg(long, default_value = "NoTestRun", value_name = "LEVEL")]
    pub test_level: TestLevelArg,

    /// Test classes for RunSpecifiedTests, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub tests: Vec<String>,

    /// Commit the deploy. Without this flag the deploy only validates.
    #[arg(long)]
    pub commit: bool,

    /// Stop waiting after this many seconds. The job keeps running remotely.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the job id and exit without polling.
    #[arg(long)]
    pub no_wait: bool,

    /// Emit the final job as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub input: InputArgs,
}

impl DeployArgs {
    pub fn run(self) -> Result<()> {
        let (home, config) = home_and_config()?;
        let target = self.input.target_credentials(&home, &config)?;
        let session = self.input.load(&home, &config)?;
        let selected = session.select(&self.select).context("invalid selection")?;

        let tests = TestConfig {
            test_level: self.test_level.into(),
            test_classes: self.tests.clone(),
            check_only: !self.commit,
        };
        if tests.test_level == TestLevel::RunSpecifiedTests && tests.test_classes.is_empty() {
            eprintln!(
                "{} RunSpecifiedTests with no --tests; the org will decide what that means",
                "warning:".yellow()
            );
        }

        let table = config.folder_table();
        super::runtime()?.block_on(async {
            let client = SoapClient::new().context("failed to build HTTP client")?;
            let job_id = submit(
                &client,
                &selected,
                &target,
                &tests,
                &table,
                &config.manifest_version,
            )
            .await
            .context("deploy submission failed")?;

            if !self.json {
                println!(
                    "{} {} component(s) submitted as job {}{}",
                    "✓".green(),
                    selected.len(),
                    job_id.to_string().bold(),
                    if tests.check_only { " (validation only)" } else { "" }
                );
            }
            if self.no_wait {
                if self.json {
                    println!("{}", serde_json::json!({ "job_id": job_id.0 }));
                }
                return Ok(());
            }

            let job = follow(&client, &job_id, &target, self.timeout, self.json).await?;
            report(&job, self.json)
        })
    }
}

/// Poll `job_id` to completion, printing transitions unless `quiet`.
///
/// Ctrl-C cancels polling; `timeout` bounds the whole wait.
pub(crate) async fn follow(
    client: &SoapClient,
    job_id: &JobId,
    target: &OrgCredentials,
    timeout: Option<u64>,
    quiet: bool,
) -> Result<DeployJob> {
    let cancel = CancelToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let poller = JobStatusPoller::new(client);
    let on_transition = |status: DeployStatus| {
        if !quiet {
            println!("  {} {}", "→".cyan(), status);
        }
    };
    let polling = poller.poll(job_id, target, on_transition, &cancel);

    let outcome = match timeout {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), polling).await {
            Ok(result) => result,
            Err(_) => {
                interrupt.abort();
                bail!(gave_up_message(secs, job_id));
            }
        },
        None => polling.await,
    };
    interrupt.abort();
    outcome.with_context(|| format!("tracking job {job_id} failed"))
}

fn gave_up_message(secs: u64, job_id: &JobId) -> String {
    let hint = format!("check with 'orgdelta status {job_id}'");
    format!("gave up after {secs}s; job {job_id} is still running ({hint})")
}

pub(crate) fn report(job: &DeployJob, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(job).context("failed to serialize deploy job")?
        );
    } else {
        let waited = (chrono::Utc::now() - job.submitted_at).num_seconds();
        match &job.failure_detail {
            None => println!("{} {} after {}s", "✓".green(), job.status, waited),
            Some(detail) => println!("{} {}: {}", "✗".red(), job.status, detail),
        }
    }
    if job.failure_detail.is_some() {
        bail!("job {} ended {}", job.job_id, job.status);
    }
    Ok(())
}
