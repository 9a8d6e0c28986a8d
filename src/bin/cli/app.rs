use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use leitbox_lib::cards::validate::resolve_today;
use leitbox_lib::config::Config;
use leitbox_lib::database::Database;
use leitbox_lib::service::Tracker;
use leitbox_lib::users::User;

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub db: Database,
    pub tracker: Tracker,
    today: Option<String>,
    user_email: Option<String>,
}

impl App {
    /// Load configuration and open the database, honoring `--db`
    pub fn new(db_path: Option<PathBuf>, today: Option<String>, user_email: Option<String>) -> Result<Self> {
        let mut config = Config::load().context("Failed to load configuration")?;
        if let Some(path) = db_path {
            config.database = path;
        }

        let db = Database::open(config.database.clone())
            .with_context(|| format!("Failed to open database {}", config.database.display()))?;
        let tracker = Tracker::new(db.clone());

        Ok(Self {
            config,
            db,
            tracker,
            today,
            user_email,
        })
    }

    /// The raw `--today` override, passed through to the tracker
    pub fn today_arg(&self) -> Option<&str> {
        self.today.as_deref()
    }

    /// The effective current date
    pub fn today(&self) -> Result<NaiveDate> {
        resolve_today(self.today_arg()).context("Invalid --today")
    }

    /// The account named by `--user`
    pub fn user(&self) -> Result<User> {
        let Some(email) = self.user_email.as_deref() else {
            bail!("This command needs an account: pass --user <email>");
        };
        self.tracker
            .users()
            .find_by_email(email)
            .with_context(|| format!("No account for '{}'", email))
    }

    /// Backup folder, `--dir` winning over configuration
    pub fn backup_dir(&self, dir: Option<&Path>) -> PathBuf {
        dir.map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.backup_dir.clone())
    }
}

fn read_stdin_line(prompt: &str) -> Result<String> {
    eprint!("{}", prompt);
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Use the given password or read one line from stdin
pub fn resolve_password(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => read_stdin_line("Password: "),
    }
}

/// Ask a yes/no question on stderr, reading the answer from stdin.
/// `assume_yes` skips the question.
pub fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let answer = read_stdin_line(&format!("{} [y/N] ", question))?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("yep"));
    }

    #[test]
    fn test_confirm_assume_yes() {
        assert!(confirm("Replace the database?", true).unwrap());
    }
}
