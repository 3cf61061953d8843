//! `orgdelta show <index>`: line diff of one change record.

use anyhow::{Context, Result};
use clap::Args;

use orgdelta_diff::unified_diff;

use super::input::{home_and_config, InputArgs};

/// Arguments for `orgdelta show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Row number from `orgdelta compare`.
    pub index: usize,

    #[command(flatten)]
    pub input: InputArgs,
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let (home, config) = home_and_config()?;
        let session = self.input.load(&home, &config)?;
        let record = session
            .select(&[self.index])
            .context("cannot show change record")?
            .remove(0);

        let diff = unified_diff(&record);
        print!("{diff}");
        if !diff.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
