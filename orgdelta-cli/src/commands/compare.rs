//! `orgdelta compare`: list the change records.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use orgdelta_core::{ChangeRecord, ChangeStatus, FolderTypeTable};

use super::input::{home_and_config, InputArgs};

/// Arguments for `orgdelta compare`.
#[derive(Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RecordJson<'a> {
    index: usize,
    path: &'a str,
    status: ChangeStatus,
    #[serde(rename = "type")]
    type_name: String,
    component: String,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "type")]
    type_name: String,
    #[tabled(rename = "component")]
    component: String,
}

impl CompareArgs {
    pub fn run(self) -> Result<()> {
        let (home, config) = home_and_config()?;
        let session = self.input.load(&home, &config)?;
        let table = config.folder_table();

        if self.json {
            print_json(session.records(), &table)?;
        } else {
            print_table(session.records(), &table);
        }
        Ok(())
    }
}

fn print_json(records: &[ChangeRecord], table: &FolderTypeTable) -> Result<()> {
    let payload: Vec<RecordJson<'_>> = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let (type_name, component) = record.component(table);
            RecordJson {
                index,
                path: &record.path,
                status: record.status,
                type_name,
                component,
            }
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize change records")?
    );
    Ok(())
}

fn print_table(records: &[ChangeRecord], table: &FolderTypeTable) {
    if records.is_empty() {
        println!("No differences: every source entry matches the target.");
        return;
    }

    let new = records
        .iter()
        .filter(|r| r.status == ChangeStatus::New)
        .count();
    println!(
        "{} changed entries ({} new, {} modified)",
        records.len(),
        new,
        records.len() - new
    );

    let rows: Vec<RecordRow> = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let (type_name, component) = record.component(table);
            RecordRow {
                index,
                status: status_label(record.status),
                type_name,
                component,
            }
        })
        .collect();
    let mut out = Table::new(rows);
    out.with(Style::rounded());
    println!("{out}");
    println!("Use 'orgdelta show <#>' to inspect, 'orgdelta deploy --select <#,#>' to deploy.");
}

pub(crate) fn status_label(status: ChangeStatus) -> String {
    match status {
        ChangeStatus::New => "New".green().to_string(),
        ChangeStatus::Modified => "Modified".yellow().to_string(),
    }
}
