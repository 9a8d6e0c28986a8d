//! Tracker service: the boundary between callers (HTTP handlers, CLI commands)
//! and the scheduler.
//!
//! Raw input is validated here once. The storage layer and the scheduler below it
//! only ever see a parsed [`Outcome`], a calendar date and a box in [1, 5].

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::cards::algorithm::preview_outcomes;
use crate::cards::validate::{resolve_today, validate_new_card};
use crate::cards::{
    Card, CardInput, CardResult, CardStorage, DueCard, LeetCodeSlugTitle, Outcome, ReviewStats,
    ReviewedCard, TitleResolver,
};
use crate::database::Database;
use crate::users::{AuthResult, Session, User, UserStorage};

/// Cards and counts shown on a user's dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub cards: Vec<Card>,
    pub stats: ReviewStats,
}

#[derive(Clone)]
pub struct Tracker {
    cards: CardStorage,
    users: UserStorage,
    titles: Arc<dyn TitleResolver>,
}

impl Tracker {
    /// Tracker over `db` deriving titles from LeetCode problem links
    pub fn new(db: Database) -> Self {
        Self::with_title_resolver(db, Arc::new(LeetCodeSlugTitle))
    }

    pub fn with_title_resolver(db: Database, titles: Arc<dyn TitleResolver>) -> Self {
        Self {
            cards: CardStorage::new(db.clone()),
            users: UserStorage::new(db),
            titles,
        }
    }

    pub fn users(&self) -> &UserStorage {
        &self.users
    }

    // ==================== Accounts ====================

    pub fn register(&self, email: &str, password: &str) -> AuthResult<User> {
        self.users.register(email, password)
    }

    pub fn login(&self, email: &str, password: &str) -> AuthResult<Session> {
        self.users.login(email, password)
    }

    pub fn logout(&self, token: &str) -> AuthResult<()> {
        self.users.logout(token)
    }

    pub fn authenticate(&self, token: &str) -> AuthResult<User> {
        self.users.user_for_token(token)
    }

    // ==================== Cards ====================

    /// Add a solved problem. `today` is the default solve date.
    pub fn add_card(&self, owner: i64, input: CardInput, today: Option<&str>) -> CardResult<Card> {
        let today = resolve_today(today)?;
        let new_card = validate_new_card(input, today, self.titles.as_ref())?;
        self.cards.create_card(owner, new_card)
    }

    pub fn get_card(&self, owner: i64, card_id: i64) -> CardResult<Card> {
        self.cards.get_card(owner, card_id)
    }

    pub fn delete_card(&self, owner: i64, card_id: i64) -> CardResult<()> {
        self.cards.delete_card(owner, card_id)
    }

    pub fn dashboard(
        &self,
        owner: i64,
        query: Option<&str>,
        today: Option<&str>,
    ) -> CardResult<Dashboard> {
        let today = resolve_today(today)?;
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        let cards = self.cards.list_cards(owner, query.as_deref())?;
        let stats = self.cards.review_stats(owner, today)?;

        Ok(Dashboard {
            today,
            query,
            cards,
            stats,
        })
    }

    /// Due cards in review order, each with the dates a pass or fail would set
    pub fn review_queue(&self, owner: i64, today: Option<&str>) -> CardResult<Vec<DueCard>> {
        let today = resolve_today(today)?;
        let due = self.cards.due_cards(owner, today)?;

        Ok(due
            .into_iter()
            .map(|card| DueCard {
                preview: preview_outcomes(card.leitner_box, today),
                card,
            })
            .collect())
    }

    /// Record a review. The outcome token is rejected before anything is read.
    pub fn review(
        &self,
        owner: i64,
        card_id: i64,
        outcome: &str,
        today: Option<&str>,
        expected_version: Option<i64>,
    ) -> CardResult<ReviewedCard> {
        let outcome: Outcome = outcome.parse()?;
        let today = resolve_today(today)?;
        self.cards
            .submit_review(owner, card_id, outcome, today, expected_version)
    }
}
