//! SQLite storage for cards.
//!
//! All queries are scoped to an owner: a card belonging to someone else behaves
//! exactly like a card that does not exist.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::algorithm::{compute_next_review, review_card, select_due_cards};
use super::errors::{CardError, CardResult};
use super::models::*;
use super::validate::clamp_box;
use crate::database::Database;

const CARD_COLUMNS: &str = "id, user_id, title, link, idea, solved_date, leitner_box, \
                            next_review, last_reviewed, created_at, version";

/// Storage manager for card operations
#[derive(Debug, Clone)]
pub struct CardStorage {
    db: Database,
}

fn card_from_row(row: &Row) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        owner: row.get(1)?,
        title: row.get(2)?,
        link: row.get(3)?,
        note: row.get(4)?,
        solved_date: row.get(5)?,
        leitner_box: clamp_box(row.get(6)?),
        next_review: row.get(7)?,
        last_reviewed: row.get(8)?,
        created_at: row.get(9)?,
        version: row.get(10)?,
    })
}

/// Escape LIKE wildcards so a search matches the literal text
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl CardStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn fetch(conn: &Connection, owner: i64, card_id: i64) -> CardResult<Card> {
        let sql = format!("SELECT {} FROM cards WHERE id = ?1 AND user_id = ?2", CARD_COLUMNS);
        conn.query_row(&sql, params![card_id, owner], card_from_row)
            .optional()?
            .ok_or(CardError::CardNotFound(card_id))
    }

    /// Insert a new card, scheduling its first review from the solve date
    pub fn create_card(&self, owner: i64, new_card: NewCard) -> CardResult<Card> {
        let conn = self.db.connect()?;

        let next_review = compute_next_review(new_card.solved_date, new_card.leitner_box);
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO cards (user_id, title, link, idea, solved_date, leitner_box, next_review, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                owner,
                new_card.title,
                new_card.link,
                new_card.note,
                new_card.solved_date,
                new_card.leitner_box,
                next_review,
                created_at,
            ],
        )?;
        let id = conn.last_insert_rowid();

        log::debug!("Created card {} for user {} (box {}, due {})", id, owner, new_card.leitner_box, next_review);

        Self::fetch(&conn, owner, id)
    }

    /// Get a specific card
    pub fn get_card(&self, owner: i64, card_id: i64) -> CardResult<Card> {
        let conn = self.db.connect()?;
        Self::fetch(&conn, owner, card_id)
    }

    /// List cards newest first, optionally filtered by a substring of title or note
    pub fn list_cards(&self, owner: i64, query: Option<&str>) -> CardResult<Vec<Card>> {
        let conn = self.db.connect()?;

        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let cards = match query {
            Some(q) => {
                let sql = format!(
                    "SELECT {} FROM cards
                     WHERE user_id = ?1 AND (title LIKE ?2 ESCAPE '\\' OR idea LIKE ?2 ESCAPE '\\')
                     ORDER BY created_at DESC, id DESC",
                    CARD_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![owner, like_pattern(q)], card_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM cards WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
                    CARD_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![owner], card_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };

        Ok(cards)
    }

    /// Delete a card
    pub fn delete_card(&self, owner: i64, card_id: i64) -> CardResult<()> {
        let conn = self.db.connect()?;
        let deleted = conn.execute(
            "DELETE FROM cards WHERE id = ?1 AND user_id = ?2",
            params![card_id, owner],
        )?;

        if deleted == 0 {
            return Err(CardError::CardNotFound(card_id));
        }
        log::debug!("Deleted card {} for user {}", card_id, owner);
        Ok(())
    }

    /// Cards due on `today`, in review order
    pub fn due_cards(&self, owner: i64, today: NaiveDate) -> CardResult<Vec<Card>> {
        let conn = self.db.connect()?;
        let sql = format!(
            "SELECT {} FROM cards WHERE user_id = ?1 AND next_review <= ?2",
            CARD_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let candidates = stmt
            .query_map(params![owner, today], card_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(select_due_cards(candidates, today))
    }

    /// Record a review outcome.
    ///
    /// The read of the current box and the write of the new schedule happen in one
    /// write transaction, and the write only applies if the card's version is still
    /// the one that was read. When `expected_version` is given it must also match,
    /// which makes a stale or repeated submission fail with `CardError::Conflict`.
    pub fn submit_review(
        &self,
        owner: i64,
        card_id: i64,
        outcome: Outcome,
        today: NaiveDate,
        expected_version: Option<i64>,
    ) -> CardResult<ReviewedCard> {
        let mut conn = self.db.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let card = Self::fetch(&tx, owner, card_id)?;
        if let Some(expected) = expected_version {
            if expected != card.version {
                return Err(CardError::Conflict {
                    card_id,
                    expected,
                    actual: card.version,
                });
            }
        }

        let read_version = card.version;
        let previous_box = card.leitner_box;
        let mut reviewed = review_card(card, outcome, today);

        let updated = tx.execute(
            "UPDATE cards
             SET leitner_box = ?1, last_reviewed = ?2, next_review = ?3, version = version + 1
             WHERE id = ?4 AND user_id = ?5 AND version = ?6",
            params![
                reviewed.leitner_box,
                reviewed.last_reviewed,
                reviewed.next_review,
                card_id,
                owner,
                read_version,
            ],
        )?;

        if updated == 0 {
            let actual = Self::fetch(&tx, owner, card_id)?.version;
            return Err(CardError::Conflict {
                card_id,
                expected: read_version,
                actual,
            });
        }

        tx.commit()?;
        reviewed.version = read_version + 1;

        log::info!(
            "Card {} reviewed ({}): box {} -> {}, next review {}",
            card_id,
            outcome,
            previous_box,
            reviewed.leitner_box,
            reviewed.next_review
        );

        Ok(ReviewedCard {
            card: reviewed,
            previous_box,
        })
    }

    /// Get review statistics for one user
    pub fn review_stats(&self, owner: i64, today: NaiveDate) -> CardResult<ReviewStats> {
        let conn = self.db.connect()?;

        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cards WHERE user_id = ?1",
            params![owner],
            |row| row.get(0),
        )?;

        let due_today: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cards WHERE user_id = ?1 AND next_review <= ?2",
            params![owner, today],
            |row| row.get(0),
        )?;

        let reviewed_today: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cards WHERE user_id = ?1 AND last_reviewed = ?2",
            params![owner, today],
            |row| row.get(0),
        )?;

        let mut box_counts = BoxCounts::default();
        let mut stmt = conn.prepare(
            "SELECT leitner_box, COUNT(*) FROM cards WHERE user_id = ?1 GROUP BY leitner_box",
        )?;
        let rows = stmt.query_map(params![owner], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (leitner_box, count) = row?;
            *box_counts.0.entry(clamp_box(leitner_box)).or_insert(0) += count as usize;
        }

        Ok(ReviewStats {
            total_cards: total as usize,
            due_today: due_today as usize,
            reviewed_today: reviewed_today as usize,
            box_counts,
        })
    }
}
