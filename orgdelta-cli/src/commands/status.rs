//! `orgdelta status <job-id>`: check a deploy job.

use anyhow::{Context, Result};
use clap::Args;

use orgdelta_core::{JobId, SessionId};
use orgdelta_remote::{MetadataApi, SoapClient};

use super::deploy::{follow, report};
use super::input::home_and_config;

/// Arguments for `orgdelta status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Job id printed by `orgdelta deploy`.
    pub job_id: String,

    /// Environment the job was submitted to.
    #[arg(long)]
    pub env: String,

    /// Session id for that org.
    #[arg(long, env = "ORGDELTA_TARGET_SESSION", hide_env_values = true)]
    pub session: String,

    /// Poll until the job finishes.
    #[arg(long)]
    pub watch: bool,

    /// Stop watching after this many seconds.
    #[arg(long, value_name = "SECS", requires = "watch")]
    pub timeout: Option<u64>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let (home, config) = home_and_config()?;
        let target = config
            .environment_at(&home, &self.env)?
            .credentials(SessionId::new(self.session.clone()));
        let job_id = JobId::from(self.job_id.as_str());

        super::runtime()?.block_on(async {
            let client = SoapClient::new().context("failed to build HTTP client")?;
            if self.watch {
                let job = follow(&client, &job_id, &target, self.timeout, self.json).await?;
                return report(&job, self.json);
            }

            let status = client
                .check_deploy_status(&target, &job_id)
                .await
                .with_context(|| format!("status query for job {job_id} failed"))?;
            let label = status
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            if self.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "job_id": job_id.0,
                        "status": label,
                        "problem": status.problem,
                    })
                );
            } else {
                println!("{job_id}: {label}");
                if let Some(problem) = status.problem {
                    println!("  {problem}");
                }
            }
            Ok(())
        })
    }
}
