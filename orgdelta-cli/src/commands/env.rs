//! `orgdelta env add|list|remove`: named orgs in config.yaml.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use orgdelta_core::{config, Environment, DEFAULT_API_VERSION};

use super::input::home_and_config;

/// Manage named org environments.
#[derive(Subcommand, Debug)]
pub enum EnvCommand {
    /// Add or update an environment.
    Add(AddArgs),

    /// List configured environments.
    List,

    /// Remove an environment.
    Remove {
        /// Environment name.
        name: String,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Environment name (e.g. "dev", "uat", "prod").
    pub name: String,

    /// Instance base URL, e.g. https://acme.my.salesforce.com
    #[arg(long)]
    pub url: String,

    /// Metadata API version for this org.
    #[arg(long, default_value = DEFAULT_API_VERSION)]
    pub api_version: String,
}

#[derive(Tabled)]
struct EnvRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "instance")]
    instance_url: String,
    #[tabled(rename = "api")]
    api_version: String,
}

pub fn run(cmd: EnvCommand) -> Result<()> {
    match cmd {
        EnvCommand::Add(args) => add(args),
        EnvCommand::List => list(),
        EnvCommand::Remove { name } => remove(&name),
    }
}

fn add(args: AddArgs) -> Result<()> {
    if !args.url.starts_with("https://") && !args.url.starts_with("http://") {
        bail!("instance URL must start with https:// (got '{}')", args.url);
    }
    let (home, mut config) = home_and_config()?;
    let name = args.name.clone();
    config.upsert_environment(Environment {
        name: args.name,
        instance_url: args.url.trim_end_matches('/').to_string(),
        api_version: args.api_version,
    });
    config::save_at(&home, &config).context("failed to save config")?;
    println!("✓ Saved environment '{name}'");
    Ok(())
}

fn list() -> Result<()> {
    let (_home, config) = home_and_config()?;
    if config.environments.is_empty() {
        println!("No environments configured.");
        println!("Run: orgdelta env add <name> --url <instance-url>");
        return Ok(());
    }
    let rows: Vec<EnvRow> = config
        .environments
        .into_iter()
        .map(|env| EnvRow {
            name: env.name,
            instance_url: env.instance_url,
            api_version: env.api_version,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn remove(name: &str) -> Result<()> {
    let (home, mut config) = home_and_config()?;
    if !config.remove_environment(name) {
        bail!("no environment named '{name}'");
    }
    config::save_at(&home, &config).context("failed to save config")?;
    println!("✓ Removed environment '{name}'");
    Ok(())
}
