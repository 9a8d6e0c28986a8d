mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use leitbox_lib::cards::CardInput;

#[derive(Parser)]
#[command(name = "leitbox-cli", about = "Leitner-box review tracker for solved problems", version)]
struct Cli {
    /// SQLite database file (default: from configuration)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Account email for card commands
    #[arg(long, global = true)]
    user: Option<String>,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    today: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,

    /// Create an account
    Register {
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Set a new password, e.g. after a restore
    SetPassword {
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Add a solved problem
    Add {
        /// Problem title (derived from a LeetCode link when omitted)
        #[arg(long)]
        title: Option<String>,
        /// Problem URL
        #[arg(long)]
        link: Option<String>,
        /// Solution idea
        #[arg(long)]
        note: Option<String>,
        /// Date solved (default: today)
        #[arg(long)]
        solved: Option<String>,
        /// Starting box, clamped to 1-5
        #[arg(long = "box")]
        leitner_box: Option<i64>,
    },

    /// List cards, newest first
    List {
        /// Filter by title or note
        #[arg(long, short)]
        query: Option<String>,
        /// Show links and notes
        #[arg(long, short)]
        verbose: bool,
    },

    /// Show cards due for review
    Due,

    /// Record a review outcome
    Review {
        card_id: i64,
        /// pass or fail
        outcome: String,
        /// Reject the review if the card changed since this version
        #[arg(long)]
        expected_version: Option<i64>,
    },

    /// Delete a card
    Delete { card_id: i64 },

    /// Show counts per box
    Stats,

    /// CSV backups
    #[command(subcommand)]
    Backup(BackupCommand),
}

#[derive(Subcommand)]
enum BackupCommand {
    /// Write a new backup folder
    Create {
        /// Backups directory (default: from configuration)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// List backups, newest first
    List {
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Replace the database with a backup
    Restore {
        /// Backup folder name or its number in `backup list`
        backup: String,
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let format = cli.format;

    let app = app::App::new(cli.db, cli.today, cli.user)?;

    match cli.command {
        Command::Serve => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime
                .block_on(leitbox_lib::server::serve(&app.config))
                .context("Server failed")?;
        }
        Command::Register { email, password } => {
            let password = app::resolve_password(password)?;
            commands::account::run_register(&app, &email, &password, &format)?;
        }
        Command::SetPassword { email, password } => {
            let password = app::resolve_password(password)?;
            commands::account::run_set_password(&app, &email, &password, &format)?;
        }
        Command::Add { title, link, note, solved, leitner_box } => {
            let input = CardInput {
                title,
                link,
                note,
                solved_date: solved,
                leitner_box,
            };
            commands::cards::run_add(&app, input, &format, use_color)?;
        }
        Command::List { query, verbose } => {
            commands::cards::run_list(&app, query.as_deref(), verbose, &format, use_color)?;
        }
        Command::Due => {
            commands::review::run_due(&app, &format, use_color)?;
        }
        Command::Review { card_id, outcome, expected_version } => {
            commands::review::run_review(&app, card_id, &outcome, expected_version, &format)?;
        }
        Command::Delete { card_id } => {
            commands::cards::run_delete(&app, card_id, &format)?;
        }
        Command::Stats => {
            commands::stats::run(&app, &format, use_color)?;
        }
        Command::Backup(subcmd) => match subcmd {
            BackupCommand::Create { dir } => {
                commands::backup::run_create(&app, dir.as_deref(), &format)?;
            }
            BackupCommand::List { dir } => {
                commands::backup::run_list(&app, dir.as_deref(), &format)?;
            }
            BackupCommand::Restore { backup, dir, yes } => {
                commands::backup::run_restore(&app, &backup, dir.as_deref(), yes, &format)?;
            }
        },
    }

    Ok(())
}
