//! CSV backup and restore.
//!
//! Directory layout:
//! ```text
//! backups/
//! └── backup_{YYYYMMDD_HHMMSS}/
//!     ├── users.csv   # id, email, created_at (no password hashes)
//!     └── cards.csv   # one row per card
//! ```
//!
//! Password hashes are never written to a backup. Restored accounts are locked
//! until their password is set again.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::validate::clamp_box;
use crate::database::{Database, DatabaseError};
use crate::users::password::LOCKED_PASSWORD_HASH;

const BACKUP_PREFIX: &str = "backup_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const USERS_FILE: &str = "users.csv";
const CARDS_FILE: &str = "cards.csv";

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Backup not found: {0}")]
    NotFound(String),

    #[error("Backup file missing: {0}")]
    MissingFile(PathBuf),
}

pub type Result<T> = std::result::Result<T, BackupError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct UserRow {
    id: i64,
    email: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CardRow {
    id: i64,
    user_id: i64,
    title: String,
    link: Option<String>,
    idea: Option<String>,
    solved_date: NaiveDate,
    leitner_box: i64,
    next_review: NaiveDate,
    last_reviewed: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

/// What a backup or restore touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSummary {
    pub path: PathBuf,
    pub users: usize,
    pub cards: usize,
    /// Cards dropped on restore because their owner was not in the backup
    pub skipped_cards: usize,
}

/// A backup folder found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    pub created_at: Option<NaiveDateTime>,
}

/// Export all users and cards into a new timestamped folder under `backups_dir`
pub fn create_backup(db: &Database, backups_dir: &Path) -> Result<BackupSummary> {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let folder = backups_dir.join(format!("{}{}", BACKUP_PREFIX, timestamp));
    fs::create_dir_all(backups_dir)?;
    fs::create_dir(&folder)?;

    let conn = db.connect()?;

    let mut stmt = conn.prepare("SELECT id, email, created_at FROM users ORDER BY id")?;
    let users = stmt
        .query_map([], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut writer = csv::Writer::from_path(folder.join(USERS_FILE))?;
    for user in &users {
        writer.serialize(user)?;
    }
    writer.flush()?;

    let mut stmt = conn.prepare(
        "SELECT id, user_id, title, link, idea, solved_date, leitner_box, next_review,
                last_reviewed, created_at
         FROM cards ORDER BY id",
    )?;
    let cards = stmt
        .query_map([], |row| {
            Ok(CardRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                title: row.get(2)?,
                link: row.get(3)?,
                idea: row.get(4)?,
                solved_date: row.get(5)?,
                leitner_box: row.get(6)?,
                next_review: row.get(7)?,
                last_reviewed: row.get(8)?,
                created_at: row.get(9)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut writer = csv::Writer::from_path(folder.join(CARDS_FILE))?;
    for card in &cards {
        writer.serialize(card)?;
    }
    writer.flush()?;

    log::info!(
        "Backed up {} users and {} cards to {}",
        users.len(),
        cards.len(),
        folder.display()
    );

    Ok(BackupSummary {
        path: folder,
        users: users.len(),
        cards: cards.len(),
        skipped_cards: 0,
    })
}

/// Backups under `backups_dir`, newest first
pub fn list_backups(backups_dir: &Path) -> Result<Vec<BackupInfo>> {
    if !backups_dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();
    for entry in fs::read_dir(backups_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(stamp) = name.strip_prefix(BACKUP_PREFIX) else {
            continue;
        };
        let created_at = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok();
        backups.push(BackupInfo {
            name,
            path,
            created_at,
        });
    }

    backups.sort_by(|a, b| b.name.cmp(&a.name));
    Ok(backups)
}

/// Find a backup by folder name or by its 1-based position in [`list_backups`]
pub fn resolve_backup(backups_dir: &Path, selector: &str) -> Result<PathBuf> {
    let backups = list_backups(backups_dir)?;

    if let Some(found) = backups.iter().find(|b| b.name == selector) {
        return Ok(found.path.clone());
    }

    selector
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| backups.get(idx))
        .map(|b| b.path.clone())
        .ok_or_else(|| BackupError::NotFound(selector.to_string()))
}

/// Replace the database at `db_path` with the contents of `backup_dir`.
///
/// The backup is imported into `<name>.restoring` first. Only after that import
/// commits is the current database moved to `<name>.before-restore-<timestamp>`
/// and the staged file renamed into place, so a failed restore leaves the live
/// database untouched.
pub fn restore_backup(db_path: &Path, backup_dir: &Path) -> Result<BackupSummary> {
    if !backup_dir.is_dir() {
        return Err(BackupError::NotFound(backup_dir.display().to_string()));
    }
    let users_file = backup_dir.join(USERS_FILE);
    let cards_file = backup_dir.join(CARDS_FILE);
    for file in [&users_file, &cards_file] {
        if !file.exists() {
            return Err(BackupError::MissingFile(file.clone()));
        }
    }

    let users = csv::Reader::from_path(&users_file)?
        .deserialize()
        .collect::<std::result::Result<Vec<UserRow>, csv::Error>>()?;
    let cards = csv::Reader::from_path(&cards_file)?
        .deserialize()
        .collect::<std::result::Result<Vec<CardRow>, csv::Error>>()?;

    let staging = sibling_path(db_path, ".restoring");
    if staging.exists() {
        fs::remove_file(&staging)?;
    }

    let (restored, skipped) = match import_rows(&staging, &users, &cards) {
        Ok(counts) => counts,
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&staging) {
                log::warn!("Could not remove {}: {}", staging.display(), cleanup);
            }
            return Err(e);
        }
    };

    if db_path.exists() {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let aside = sibling_path(db_path, &format!(".before-restore-{}", timestamp));
        fs::rename(db_path, &aside)?;
        log::info!("Moved current database to {}", aside.display());
    }
    fs::rename(&staging, db_path)?;

    log::info!(
        "Restored {} users and {} cards from {} ({} skipped)",
        users.len(),
        restored,
        backup_dir.display(),
        skipped
    );

    Ok(BackupSummary {
        path: backup_dir.to_path_buf(),
        users: users.len(),
        cards: restored,
        skipped_cards: skipped,
    })
}

/// `path` with `suffix` appended to its file name
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Load users and cards into a fresh database at `path` in one transaction.
/// Returns (restored cards, skipped cards).
fn import_rows(path: &Path, users: &[UserRow], cards: &[CardRow]) -> Result<(usize, usize)> {
    let db = Database::open(path)?;
    let mut conn = db.connect()?;
    let tx = conn.transaction()?;

    let mut known_users = HashSet::new();
    for user in users {
        tx.execute(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user.id, user.email, LOCKED_PASSWORD_HASH, user.created_at],
        )?;
        known_users.insert(user.id);
    }

    let mut restored = 0;
    let mut skipped = 0;
    for card in cards {
        if !known_users.contains(&card.user_id) {
            log::warn!("Skipping card {}: owner {} not in backup", card.id, card.user_id);
            skipped += 1;
            continue;
        }
        tx.execute(
            "INSERT INTO cards (id, user_id, title, link, idea, solved_date, leitner_box,
                                next_review, last_reviewed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                card.id,
                card.user_id,
                card.title,
                card.link,
                card.idea,
                card.solved_date,
                clamp_box(card.leitner_box),
                card.next_review,
                card.last_reviewed,
                card.created_at,
            ],
        )?;
        restored += 1;
    }

    tx.commit()?;
    Ok((restored, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardInput, CardStorage};
    use crate::service::Tracker;
    use crate::users::UserStorage;
    use tempfile::TempDir;

    fn seeded_db(dir: &Path) -> (Database, i64) {
        let db = Database::open(dir.join("db.sqlite3")).unwrap();
        let tracker = Tracker::new(db.clone());
        let user = tracker.register("me@example.com", "Secret123").unwrap();
        tracker
            .add_card(
                user.id,
                CardInput {
                    title: Some("Two Sum".to_string()),
                    link: Some("https://leetcode.com/problems/two-sum/".to_string()),
                    note: Some("hash map, one pass".to_string()),
                    solved_date: Some("2024-06-01".to_string()),
                    leitner_box: Some(2),
                },
                None,
            )
            .unwrap();
        tracker
            .add_card(
                user.id,
                CardInput {
                    title: Some("Jump Game".to_string()),
                    solved_date: Some("2024-06-03".to_string()),
                    ..Default::default()
                },
                None,
            )
            .unwrap();
        (db, user.id)
    }

    #[test]
    fn test_backup_writes_csv_files() {
        let temp = TempDir::new().unwrap();
        let (db, _) = seeded_db(temp.path());
        let backups_dir = temp.path().join("backups");

        let summary = create_backup(&db, &backups_dir).unwrap();
        assert_eq!(summary.users, 1);
        assert_eq!(summary.cards, 2);

        let users_csv = fs::read_to_string(summary.path.join(USERS_FILE)).unwrap();
        assert!(users_csv.starts_with("id,email,created_at"));
        assert!(!users_csv.contains("argon2"));

        let cards_csv = fs::read_to_string(summary.path.join(CARDS_FILE)).unwrap();
        assert!(cards_csv.starts_with(
            "id,user_id,title,link,idea,solved_date,leitner_box,next_review,last_reviewed,created_at"
        ));
        assert!(cards_csv.contains("Two Sum"));
    }

    #[test]
    fn test_backup_and_restore() {
        let temp = TempDir::new().unwrap();
        let (db, owner) = seeded_db(temp.path());
        let before = CardStorage::new(db.clone()).list_cards(owner, None).unwrap();

        let summary = create_backup(&db, &temp.path().join("backups")).unwrap();

        let restored = restore_backup(db.path(), &summary.path).unwrap();
        assert_eq!(restored.users, 1);
        assert_eq!(restored.cards, 2);
        assert_eq!(restored.skipped_cards, 0);

        // The previous database was moved aside
        let moved: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".before-restore-"))
            .collect();
        assert_eq!(moved.len(), 1);

        let db = Database::open(db.path()).unwrap();
        let after = CardStorage::new(db.clone()).list_cards(owner, None).unwrap();
        assert_eq!(after.len(), before.len());
        for (a, b) in after.iter().zip(before.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.title, b.title);
            assert_eq!(a.link, b.link);
            assert_eq!(a.note, b.note);
            assert_eq!(a.leitner_box, b.leitner_box);
            assert_eq!(a.next_review, b.next_review);
        }

        // Restored accounts must set a new password before logging in
        let users = UserStorage::new(db);
        assert!(users.login("me@example.com", "Secret123").is_err());
        users.set_password("me@example.com", "Secret123").unwrap();
        assert!(users.login("me@example.com", "Secret123").is_ok());
    }

    #[test]
    fn test_restore_skips_orphan_cards() {
        let temp = TempDir::new().unwrap();
        let backup = temp.path().join("backups").join("backup_20240101_000000");
        fs::create_dir_all(&backup).unwrap();
        fs::write(
            backup.join(USERS_FILE),
            "id,email,created_at\n1,me@example.com,2024-01-01T00:00:00Z\n",
        )
        .unwrap();
        fs::write(
            backup.join(CARDS_FILE),
            "id,user_id,title,link,idea,solved_date,leitner_box,next_review,last_reviewed,created_at\n\
             1,1,Two Sum,,,2024-01-01,9,2024-01-31,,2024-01-01T00:00:00Z\n\
             2,7,Orphan,,,2024-01-01,1,2024-01-02,,2024-01-01T00:00:00Z\n",
        )
        .unwrap();

        let db_path = temp.path().join("db.sqlite3");
        let summary = restore_backup(&db_path, &backup).unwrap();
        assert_eq!(summary.cards, 1);
        assert_eq!(summary.skipped_cards, 1);

        let db = Database::open(&db_path).unwrap();
        let card = CardStorage::new(db).get_card(1, 1).unwrap();
        assert_eq!(card.leitner_box, 5);
        assert_eq!(card.link, None);
        assert_eq!(card.last_reviewed, None);
    }

    #[test]
    fn test_failed_restore_keeps_live_database() {
        let temp = TempDir::new().unwrap();
        let (db, owner) = seeded_db(temp.path());

        let backup = temp.path().join("backups").join("backup_20240101_000000");
        fs::create_dir_all(&backup).unwrap();
        fs::write(
            backup.join(USERS_FILE),
            "id,email,created_at\n\
             1,dup@example.com,2024-01-01T00:00:00Z\n\
             2,dup@example.com,2024-01-01T00:00:00Z\n",
        )
        .unwrap();
        fs::write(
            backup.join(CARDS_FILE),
            "id,user_id,title,link,idea,solved_date,leitner_box,next_review,last_reviewed,created_at\n",
        )
        .unwrap();

        let result = restore_backup(db.path(), &backup);
        assert!(matches!(result, Err(BackupError::Sqlite(_))));

        // Same data at the live path, and nothing left beside it
        let cards = CardStorage::new(db.clone()).list_cards(owner, None).unwrap();
        assert_eq!(cards.len(), 2);
        assert!(UserStorage::new(db.clone()).login("me@example.com", "Secret123").is_ok());

        let leftovers: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.contains(".before-restore-") || name.ends_with(".restoring"))
            .collect();
        assert!(leftovers.is_empty(), "unexpected files: {:?}", leftovers);
    }

    #[test]
    fn test_restore_missing_files() {
        let temp = TempDir::new().unwrap();
        let backup = temp.path().join("backup_20240101_000000");
        fs::create_dir_all(&backup).unwrap();
        fs::write(backup.join(USERS_FILE), "id,email,created_at\n").unwrap();

        let result = restore_backup(&temp.path().join("db.sqlite3"), &backup);
        assert!(matches!(result, Err(BackupError::MissingFile(_))));
    }

    #[test]
    fn test_list_and_resolve_backups() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        for name in ["backup_20240101_120000", "backup_20240301_080000", "not_a_backup"] {
            fs::create_dir_all(dir.join(name)).unwrap();
        }

        let backups = list_backups(dir).unwrap();
        let names: Vec<&str> = backups.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["backup_20240301_080000", "backup_20240101_120000"]);
        assert_eq!(
            backups[0].created_at.unwrap().to_string(),
            "2024-03-01 08:00:00"
        );

        assert_eq!(resolve_backup(dir, "1").unwrap(), dir.join("backup_20240301_080000"));
        assert_eq!(
            resolve_backup(dir, "backup_20240101_120000").unwrap(),
            dir.join("backup_20240101_120000")
        );
        assert!(matches!(resolve_backup(dir, "0"), Err(BackupError::NotFound(_))));
        assert!(matches!(resolve_backup(dir, "3"), Err(BackupError::NotFound(_))));
    }

    #[test]
    fn test_list_backups_missing_dir() {
        let temp = TempDir::new().unwrap();
        assert!(list_backups(&temp.path().join("nope")).unwrap().is_empty());
    }
}
