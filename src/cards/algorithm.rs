//! Leitner box scheduling
//!
//! Each box maps to a fixed review interval:
//! - Box 1: 1 day
//! - Box 2: 3 days
//! - Box 3: 7 days
//! - Box 4: 14 days
//! - Box 5: 30 days
//!
//! A pass moves a card up one box (capped at 5), a fail sends it back to box 1.
//! The next review is always counted from the anchor date: the solve date when a
//! card is created, the review date afterwards.

use chrono::{Duration, NaiveDate};

use super::models::{BoxCounts, Card, Outcome, OutcomePreview, MAX_BOX, MIN_BOX};

/// (box, interval in days)
const LEITNER_SCHEDULE: [(u8, i64); 5] = [(1, 1), (2, 3), (3, 7), (4, 14), (5, 30)];

/// Interval used for a box outside the schedule
const FALLBACK_INTERVAL: i64 = 1;

/// Review interval in days for a box
pub fn interval_days(leitner_box: u8) -> i64 {
    LEITNER_SCHEDULE
        .iter()
        .find(|(b, _)| *b == leitner_box)
        .map(|(_, days)| *days)
        .unwrap_or(FALLBACK_INTERVAL)
}

/// Longest interval any box can schedule
pub fn longest_interval() -> i64 {
    LEITNER_SCHEDULE
        .iter()
        .map(|(_, days)| *days)
        .max()
        .unwrap_or(FALLBACK_INTERVAL)
}

/// Date a card in `leitner_box` becomes due, counted from `anchor`
pub fn compute_next_review(anchor: NaiveDate, leitner_box: u8) -> NaiveDate {
    anchor + Duration::days(interval_days(leitner_box))
}

/// Box a card moves to after a review
pub fn apply_review_outcome(current_box: u8, outcome: Outcome) -> u8 {
    match outcome {
        Outcome::Pass => current_box.saturating_add(1).min(MAX_BOX),
        Outcome::Fail => MIN_BOX,
    }
}

/// Apply a review outcome to a card, anchoring the next review on `today`.
///
/// Calling this twice with the same `today` advances the card twice.
pub fn review_card(mut card: Card, outcome: Outcome, today: NaiveDate) -> Card {
    let new_box = apply_review_outcome(card.leitner_box, outcome);
    card.last_reviewed = Some(today);
    card.next_review = compute_next_review(today, new_box);
    card.leitner_box = new_box;
    card
}

/// Whether a card should be reviewed on `today`
pub fn is_due(card: &Card, today: NaiveDate) -> bool {
    card.next_review <= today
}

/// Cards due on `today`, oldest review date first, ties broken by id
pub fn select_due_cards<I>(cards: I, today: NaiveDate) -> Vec<Card>
where
    I: IntoIterator<Item = Card>,
{
    let mut due: Vec<Card> = cards.into_iter().filter(|c| is_due(c, today)).collect();
    due.sort_by(|a, b| (a.next_review, a.id).cmp(&(b.next_review, b.id)));
    due
}

/// Tally cards per box
pub fn box_counts<'a, I>(cards: I) -> BoxCounts
where
    I: IntoIterator<Item = &'a Card>,
{
    let mut counts = BoxCounts::default();
    for card in cards {
        *counts.0.entry(card.leitner_box).or_insert(0) += 1;
    }
    counts
}

/// Where a card in `leitner_box` would land for each outcome if reviewed on `today`
pub fn preview_outcomes(leitner_box: u8, today: NaiveDate) -> OutcomePreview {
    OutcomePreview {
        pass: compute_next_review(today, apply_review_outcome(leitner_box, Outcome::Pass)),
        fail: compute_next_review(today, apply_review_outcome(leitner_box, Outcome::Fail)),
    }
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: i64) -> String {
    if days <= 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn card(id: i64, leitner_box: u8, next_review: &str) -> Card {
        Card {
            id,
            owner: 1,
            title: format!("Problem {}", id),
            link: None,
            note: None,
            solved_date: date("2024-01-01"),
            leitner_box,
            next_review: date(next_review),
            last_reviewed: None,
            created_at: Utc::now(),
            version: 1,
        }
    }

    #[test]
    fn test_schedule_table() {
        assert_eq!(interval_days(1), 1);
        assert_eq!(interval_days(2), 3);
        assert_eq!(interval_days(3), 7);
        assert_eq!(interval_days(4), 14);
        assert_eq!(interval_days(5), 30);
    }

    #[test]
    fn test_out_of_range_box_falls_back_to_one_day() {
        assert_eq!(interval_days(0), 1);
        assert_eq!(interval_days(6), 1);
        assert_eq!(compute_next_review(date("2024-02-28"), 42), date("2024-02-29"));
    }

    #[test]
    fn test_compute_next_review_crosses_month() {
        assert_eq!(compute_next_review(date("2024-01-20"), 4), date("2024-02-03"));
        assert_eq!(compute_next_review(date("2024-12-15"), 5), date("2025-01-14"));
    }

    #[test]
    fn test_pass_promotes_and_caps() {
        assert_eq!(apply_review_outcome(1, Outcome::Pass), 2);
        assert_eq!(apply_review_outcome(4, Outcome::Pass), 5);
        assert_eq!(apply_review_outcome(5, Outcome::Pass), 5);
    }

    #[test]
    fn test_fail_resets() {
        for b in 1..=5 {
            assert_eq!(apply_review_outcome(b, Outcome::Fail), 1);
        }
    }

    #[test]
    fn test_review_anchors_on_review_date() {
        let c = card(1, 2, "2024-03-01");
        let reviewed = review_card(c, Outcome::Pass, date("2024-03-10"));

        assert_eq!(reviewed.leitner_box, 3);
        assert_eq!(reviewed.last_reviewed, Some(date("2024-03-10")));
        assert_eq!(reviewed.next_review, date("2024-03-17"));
    }

    #[test]
    fn test_review_is_not_idempotent() {
        let c = card(1, 4, "2024-03-01");
        let once = review_card(c, Outcome::Pass, date("2024-03-01"));
        assert_eq!(once.leitner_box, 5);
        assert_eq!(once.next_review, date("2024-03-31"));

        let twice = review_card(once.clone(), Outcome::Pass, date("2024-03-31"));
        assert_eq!(twice.leitner_box, 5);
        assert!(twice.next_review > once.next_review);
    }

    #[test]
    fn test_due_ordering() {
        let cards = vec![
            card(5, 1, "2024-01-01"),
            card(2, 1, "2024-01-01"),
            card(9, 1, "2023-12-31"),
        ];

        let due = select_due_cards(cards, date("2024-01-02"));
        let ids: Vec<i64> = due.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }

    #[test]
    fn test_due_boundary() {
        let today = date("2024-05-10");
        assert!(is_due(&card(1, 1, "2024-05-10"), today));
        assert!(!is_due(&card(2, 1, "2024-05-11"), today));

        let due = select_due_cards(
            vec![card(1, 1, "2024-05-10"), card(2, 1, "2024-05-11")],
            today,
        );
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, 1);
    }

    #[test]
    fn test_box_counts_zero_filled() {
        let cards = vec![card(1, 1, "2024-01-01"), card(2, 1, "2024-01-01"), card(3, 4, "2024-01-01")];
        let counts = box_counts(&cards);

        assert_eq!(counts.get(1), 2);
        assert_eq!(counts.get(2), 0);
        assert_eq!(counts.get(4), 1);
        assert_eq!(counts.0.len(), 5);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_preview_outcomes() {
        let preview = preview_outcomes(3, date("2024-06-01"));
        assert_eq!(preview.pass, date("2024-06-15"));
        assert_eq!(preview.fail, date("2024-06-02"));
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(3), "3d");
        assert_eq!(format_interval(7), "1w");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(400), "1y");
    }
}
