//! Where the change records come from: two local zips, two configured
//! environments, or the built-in demo set.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use orgdelta_core::{config, Config, OrgCredentials, SessionId};
use orgdelta_diff::ComparisonSession;
use orgdelta_remote::{compare_orgs, SoapClient};
use orgdelta_renderer::wildcard_manifest;

/// Comparison inputs shared by every command that needs change records.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Source archive (the side whose content gets deployed).
    #[arg(long, requires = "target_zip", conflicts_with_all = ["source_env", "demo"])]
    pub source_zip: Option<PathBuf>,

    /// Target archive to compare against.
    #[arg(long, requires = "source_zip")]
    pub target_zip: Option<PathBuf>,

    /// Source environment name from config.
    #[arg(long, conflicts_with = "demo")]
    pub source_env: Option<String>,

    /// Target environment name from config.
    #[arg(long)]
    pub target_env: Option<String>,

    /// package.xml (or bare <types> fragment) scoping the retrieve.
    /// Defaults to every type in the folder table.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Session id for the source org.
    #[arg(long, env = "ORGDELTA_SOURCE_SESSION", hide_env_values = true)]
    pub source_session: Option<String>,

    /// Session id for the target org.
    #[arg(long, env = "ORGDELTA_TARGET_SESSION", hide_env_values = true)]
    pub target_session: Option<String>,

    /// Use the built-in three-record demo set instead of real archives.
    #[arg(long)]
    pub demo: bool,
}

impl InputArgs {
    /// Produce the change records for this invocation.
    pub fn load(&self, home: &Path, config: &Config) -> Result<ComparisonSession> {
        if self.demo {
            return Ok(ComparisonSession::demo());
        }

        let mut session = ComparisonSession::new();
        if let (Some(source), Some(target)) = (&self.source_zip, &self.target_zip) {
            let source_bytes = std::fs::read(source)
                .with_context(|| format!("cannot read source archive '{}'", source.display()))?;
            let target_bytes = std::fs::read(target)
                .with_context(|| format!("cannot read target archive '{}'", target.display()))?;
            session
                .compare(source_bytes, target_bytes)
                .context("archive comparison failed")?;
            return Ok(session);
        }

        let Some(source_env) = self.source_env.as_deref() else {
            bail!("no input given: pass --source-zip/--target-zip, --source-env/--target-env, or --demo");
        };
        let source = self.source_credentials(home, config, source_env)?;
        let target = self.target_credentials(home, config)?;
        let manifest = match &self.manifest {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("cannot read manifest '{}'", path.display()))?,
            None => wildcard_manifest(&config.folder_table(), &config.manifest_version)
                .context("failed to render default retrieve manifest")?,
        };

        let records = super::runtime()?.block_on(async {
            let client = SoapClient::new().context("failed to build HTTP client")?;
            compare_orgs(&client, &source, &target, &manifest)
                .await
                .context("org comparison failed")
        })?;
        session.replace(records);
        Ok(session)
    }

    fn source_credentials(
        &self,
        home: &Path,
        config: &Config,
        name: &str,
    ) -> Result<OrgCredentials> {
        let env = config.environment_at(home, name)?;
        let session = session_id(
            self.source_session.as_deref(),
            "source",
            "ORGDELTA_SOURCE_SESSION",
        )?;
        Ok(env.credentials(session))
    }

    /// Credentials for `--target-env`, which deploy needs even with zip inputs.
    pub fn target_credentials(&self, home: &Path, config: &Config) -> Result<OrgCredentials> {
        let Some(name) = self.target_env.as_deref() else {
            bail!("--target-env is required");
        };
        let env = config.environment_at(home, name)?;
        let session = session_id(
            self.target_session.as_deref(),
            "target",
            "ORGDELTA_TARGET_SESSION",
        )?;
        Ok(env.credentials(session))
    }
}

fn session_id(value: Option<&str>, side: &str, var: &str) -> Result<SessionId> {
    match value.map(SessionId::new) {
        Some(session) if !session.is_empty() => Ok(session),
        _ => bail!("no {side} session id: pass --{side}-session or set {var}"),
    }
}

/// Resolve the home directory and load config, as every command does first.
pub fn home_and_config() -> Result<(PathBuf, Config)> {
    let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
    let config = config::load_at(&home)
        .with_context(|| format!("failed to load {}", config::config_path_at(&home).display()))?;
    Ok((home, config))
}
