//! `orgdelta manifest --select …`: preview the synthesized package.xml.

use anyhow::{Context, Result};
use clap::Args;

use orgdelta_renderer::synthesize;

use super::input::{home_and_config, InputArgs};

/// Arguments for `orgdelta manifest`.
#[derive(Args, Debug)]
pub struct ManifestArgs {
    /// Row numbers from `orgdelta compare`, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub select: Vec<usize>,

    #[command(flatten)]
    pub input: InputArgs,
}

impl ManifestArgs {
    pub fn run(self) -> Result<()> {
        let (home, config) = home_and_config()?;
        let session = self.input.load(&home, &config)?;
        let selected = session.select(&self.select).context("invalid selection")?;
        let xml = synthesize(&selected, &config.folder_table(), &config.manifest_version)
            .context("failed to render manifest")?;
        println!("{xml}");
        Ok(())
    }
}
