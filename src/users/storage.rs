//! SQLite storage for users and sessions

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::{params, OptionalExtension};

use super::errors::{AuthError, AuthResult};
use super::models::{Session, User};
use super::password::{
    check_password_strength, hash_password, normalize_email, validate_email, verify_password,
};
use crate::database::Database;

/// Session token length in characters
const TOKEN_LEN: usize = 32;

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Storage manager for accounts
#[derive(Debug, Clone)]
pub struct UserStorage {
    db: Database,
}

impl UserStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create an account after validating the email and password strength
    pub fn register(&self, email: &str, password: &str) -> AuthResult<User> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        validate_email(&email)?;
        check_password_strength(password)?;

        let password_hash = hash_password(password)?;
        let created_at = Utc::now();

        let conn = self.db.connect()?;
        let inserted = conn.execute(
            "INSERT INTO users (email, password_hash, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(email) DO NOTHING",
            params![email, password_hash, created_at],
        )?;
        if inserted == 0 {
            return Err(AuthError::EmailTaken);
        }

        let id = conn.last_insert_rowid();
        log::info!("Registered user {} ({})", id, email);

        Ok(User {
            id,
            email,
            created_at,
        })
    }

    /// Look up a user by email
    pub fn find_by_email(&self, email: &str) -> AuthResult<User> {
        let email = normalize_email(email);
        let conn = self.db.connect()?;
        conn.query_row(
            "SELECT id, email, created_at FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()?
        .ok_or(AuthError::UserNotFound(email))
    }

    /// Verify credentials and open a session
    pub fn login(&self, email: &str, password: &str) -> AuthResult<Session> {
        let email = normalize_email(email);
        let conn = self.db.connect()?;

        let row: Option<(i64, String, DateTime<Utc>)> = conn
            .query_row(
                "SELECT id, password_hash, created_at FROM users WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let (id, _, user_created_at) = match row {
            Some(r) if verify_password(password, &r.1) => r,
            _ => {
                log::warn!("Failed login attempt for {}", email);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = generate_token();
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![token, id, created_at],
        )?;

        log::info!("User {} logged in", id);

        Ok(Session {
            token,
            user: User {
                id,
                email,
                created_at: user_created_at,
            },
            created_at,
        })
    }

    /// Resolve a session token to its user
    pub fn user_for_token(&self, token: &str) -> AuthResult<User> {
        let conn = self.db.connect()?;
        conn.query_row(
            "SELECT u.id, u.email, u.created_at
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ?1",
            params![token],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()?
        .ok_or(AuthError::Unauthenticated)
    }

    /// End a session. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) -> AuthResult<()> {
        let conn = self.db.connect()?;
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }

    /// Replace a user's password and drop their existing sessions
    pub fn set_password(&self, email: &str, password: &str) -> AuthResult<()> {
        check_password_strength(password)?;
        let user = self.find_by_email(email)?;
        let password_hash = hash_password(password)?;

        let mut conn = self.db.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, user.id],
        )?;
        tx.execute("DELETE FROM sessions WHERE user_id = ?1", params![user.id])?;
        tx.commit()?;

        log::info!("Password updated for user {}", user.id);
        Ok(())
    }
}
