//! Snapshot commands - save and restore named copies of the dataset

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment};
use dialoguer::Confirm;

use super::{get_context, is_interactive};
use crate::output::create_table;

#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// Save the current records under a new name
    Save { name: String },
    /// Replace an existing snapshot with the current records
    Overwrite { name: String },
    /// Replace the current records with a snapshot
    Load {
        name: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// List saved snapshots
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a snapshot
    Rename { from: String, to: String },
    /// Delete a snapshot
    Delete {
        name: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Delete every snapshot
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

fn confirm(prompt: String, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    if !is_interactive() {
        bail!("Refusing to continue without confirmation; pass --force");
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

pub fn run(command: SnapshotCommands) -> Result<()> {
    let mut ctx = get_context()?;
    let service = &ctx.snapshot_service;

    match command {
        SnapshotCommands::Save { name } => {
            service.save(&name, ctx.collection())?;
            println!(
                "{} Saved {} record(s) as {}",
                "✓".green(),
                ctx.collection().len(),
                name.trim().bold()
            );
        }
        SnapshotCommands::Overwrite { name } => {
            service.overwrite(&name, ctx.collection())?;
            println!("{} Replaced snapshot {}", "✓".green(), name.bold());
        }
        SnapshotCommands::Load { name, force } => {
            let loaded = service.load(&name)?;
            let prompt = format!(
                "Replace the current {} record(s) with '{}' ({} records)?",
                ctx.collection().len(),
                name,
                loaded.len()
            );
            if !ctx.collection().is_empty() && !confirm(prompt, force)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            let count = loaded.len();
            ctx.replace(loaded.into_records());
            ctx.persist()?;
            println!("{} Loaded {} record(s) from {}", "✓".green(), count, name.bold());
        }
        SnapshotCommands::List { json } => {
            let snapshots = service.list_with_sizes()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshots)?);
                return Ok(());
            }
            if snapshots.is_empty() {
                println!("No snapshots saved.");
                return Ok(());
            }
            let mut table = create_table();
            table.set_header(vec!["Name", "Records"]);
            for info in &snapshots {
                table.add_row(vec![
                    Cell::new(&info.name),
                    Cell::new(info.records).set_alignment(CellAlignment::Right),
                ]);
            }
            println!("{}", table);
        }
        SnapshotCommands::Rename { from, to } => {
            service.rename(&from, &to)?;
            println!("{} Renamed {} to {}", "✓".green(), from, to.trim().bold());
        }
        SnapshotCommands::Delete { name, force } => {
            if !confirm(format!("Delete snapshot '{}'?", name), force)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            service.delete(&name)?;
            println!("{} Deleted snapshot {}", "✓".green(), name);
        }
        SnapshotCommands::Clear { force } => {
            let count = service.list()?.len();
            if count == 0 {
                println!("No snapshots saved.");
                return Ok(());
            }
            if !confirm(format!("Delete all {} snapshot(s)?", count), force)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            let removed = service.clear()?;
            println!("{} Deleted {} snapshot(s)", "✓".green(), removed.snapshots.len());
        }
    }

    Ok(())
}
