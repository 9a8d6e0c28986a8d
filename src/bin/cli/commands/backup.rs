use std::path::Path;

use anyhow::{Context, Result};

use leitbox_lib::backup::{create_backup, list_backups, resolve_backup, restore_backup};

use crate::app::{confirm, App};
use crate::OutputFormat;

pub fn run_create(app: &App, dir: Option<&Path>, format: &OutputFormat) -> Result<()> {
    let backups_dir = app.backup_dir(dir);
    let summary = create_backup(&app.db, &backups_dir).context("Backup failed")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Plain => {
            println!("Backup written to {}", summary.path.display());
            println!("  Users: {}", summary.users);
            println!("  Cards: {}", summary.cards);
        }
    }
    Ok(())
}

pub fn run_list(app: &App, dir: Option<&Path>, format: &OutputFormat) -> Result<()> {
    let backups_dir = app.backup_dir(dir);
    let backups = list_backups(&backups_dir).context("Failed to list backups")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&backups)?),
        OutputFormat::Plain => {
            if backups.is_empty() {
                println!("No backups in {}", backups_dir.display());
                return Ok(());
            }
            for (i, backup) in backups.iter().enumerate() {
                let when = backup
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown time".to_string());
                println!("{:>3}. {}  ({})", i + 1, backup.name, when);
            }
        }
    }
    Ok(())
}

pub fn run_restore(
    app: &App,
    selector: &str,
    dir: Option<&Path>,
    assume_yes: bool,
    format: &OutputFormat,
) -> Result<()> {
    let backups_dir = app.backup_dir(dir);
    let backup = resolve_backup(&backups_dir, selector)
        .with_context(|| format!("No backup matching '{}'", selector))?;

    let question = format!(
        "Replace {} with {}? The current file is kept as a .before-restore copy.",
        app.db.path().display(),
        backup.display()
    );
    if !confirm(&question, assume_yes)? {
        println!("Restore cancelled");
        return Ok(());
    }
    let summary = restore_backup(app.db.path(), &backup).context("Restore failed")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Plain => {
            println!("Restored {} from {}", app.db.path().display(), backup.display());
            println!("  Users: {}", summary.users);
            println!("  Cards: {}", summary.cards);
            if summary.skipped_cards > 0 {
                println!("  Skipped cards without an owner: {}", summary.skipped_cards);
            }
            println!("Passwords are not backed up. Run `leitbox-cli set-password <email>` for each account.");
        }
    }
    Ok(())
}
