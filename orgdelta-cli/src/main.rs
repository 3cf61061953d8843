//! orgdelta: compare two metadata archives and deploy the difference.
//!
//! # Usage
//!
//! ```text
//! orgdelta compare  (--source-zip <P> --target-zip <P> | --source-env <E> --target-env <E> | --demo) [--json]
//! orgdelta show <index> <inputs>
//! orgdelta manifest --select 0,2 <inputs>
//! orgdelta deploy --select 0,2 --target-env <E> [--test-level ...] [--tests A,B] [--commit] [--timeout <secs>] <inputs>
//! orgdelta status <job-id> --env <E> [--watch] [--json]
//! orgdelta env add|list|remove
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    compare::CompareArgs, deploy::DeployArgs, env::EnvCommand, manifest::ManifestArgs,
    show::ShowArgs, status::StatusArgs,
};
use orgdelta_core::TestLevel;
use orgdelta_remote::{init_tracing, LogFormat};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "orgdelta",
    version,
    about = "Compare two org metadata snapshots and deploy the selected changes",
    long_about = None,
)]
struct Cli {
    /// Emit log lines as JSON on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List entries that are new in, or differ from, the target.
    Compare(CompareArgs),

    /// Show the line diff of one change record.
    Show(ShowArgs),

    /// Print the package.xml that a deploy of the selection would carry.
    Manifest(ManifestArgs),

    /// Package selected changes, deploy them to the target, and track the job.
    Deploy(DeployArgs),

    /// Query or watch a submitted deploy job.
    Status(StatusArgs),

    /// Manage named org environments in ~/.orgdelta/config.yaml.
    Env {
        #[command(subcommand)]
        command: EnvCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared TestLevel argument: parsed from CLI strings, converts to core type
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `TestLevel` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestLevelArg(pub TestLevel);

impl FromStr for TestLevelArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "notestrun" | "none" => Ok(Self(TestLevel::NoTestRun)),
            "runspecifiedtests" | "specified" => Ok(Self(TestLevel::RunSpecifiedTests)),
            "runlocaltests" | "local" => Ok(Self(TestLevel::RunLocalTests)),
            "runalltestsinorg" | "all" => Ok(Self(TestLevel::RunAllTestsInOrg)),
            other => Err(format!(
                "unknown test level '{other}'; expected: NoTestRun, RunSpecifiedTests, RunLocalTests, RunAllTestsInOrg"
            )),
        }
    }
}

impl fmt::Display for TestLevelArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<TestLevelArg> for TestLevel {
    fn from(t: TestLevelArg) -> Self {
        t.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    match cli.command {
        Commands::Compare(args) => args.run(),
        Commands::Show(args) => args.run(),
        Commands::Manifest(args) => args.run(),
        Commands::Deploy(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Env { command } => commands::env::run(command),
    }
}
