//! Data models for tracked problems

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lowest Leitner box
pub const MIN_BOX: u8 = 1;
/// Highest Leitner box
pub const MAX_BOX: u8 = 5;

/// A solved problem tracked for review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub owner: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub solved_date: NaiveDate,
    #[serde(rename = "box")]
    pub leitner_box: u8,
    pub next_review: NaiveDate,
    pub last_reviewed: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    /// Bumped on every review write
    pub version: i64,
}

/// A card as written by a review, with the box it was in before
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedCard {
    #[serde(flatten)]
    pub card: Card,
    pub previous_box: u8,
}

/// A validated card ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub title: String,
    pub link: Option<String>,
    pub note: Option<String>,
    pub solved_date: NaiveDate,
    /// Already clamped to [MIN_BOX, MAX_BOX]
    pub leitner_box: u8,
}

/// Raw add-card input as it arrives from a form, request body or command line
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub solved_date: Option<String>,
    #[serde(default, rename = "box")]
    pub leitner_box: Option<i64>,
}

/// Result of a review attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Promote one box
    Pass,
    /// Back to box 1
    Fail,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of cards per box, always containing every box from 1 to 5
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxCounts(pub BTreeMap<u8, usize>);

impl Default for BoxCounts {
    fn default() -> Self {
        Self((MIN_BOX..=MAX_BOX).map(|b| (b, 0)).collect())
    }
}

impl BoxCounts {
    pub fn get(&self, leitner_box: u8) -> usize {
        self.0.get(&leitner_box).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

/// Dashboard summary for one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    pub due_today: usize,
    pub reviewed_today: usize,
    pub box_counts: BoxCounts,
}

/// Next-review dates each outcome would produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomePreview {
    pub pass: NaiveDate,
    pub fail: NaiveDate,
}

/// A due card together with what reviewing it would do
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueCard {
    pub card: Card,
    pub preview: OutcomePreview,
}
