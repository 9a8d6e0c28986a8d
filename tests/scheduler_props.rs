use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;

use leitbox_lib::cards::algorithm::{
    apply_review_outcome, compute_next_review, interval_days, is_due, review_card,
    select_due_cards,
};
use leitbox_lib::cards::{Card, Outcome, MAX_BOX, MIN_BOX};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn card(id: i64, leitner_box: u8, next_review: NaiveDate) -> Card {
    Card {
        id,
        owner: 1,
        title: format!("Problem {}", id),
        link: None,
        note: None,
        solved_date: date("2024-01-01"),
        leitner_box,
        next_review,
        last_reviewed: None,
        created_at: Utc::now(),
        version: 1,
    }
}

fn any_date() -> impl Strategy<Value = NaiveDate> {
    // 2000-01-01 through roughly 2060
    (0i64..22_000).prop_map(|offset| date("2000-01-01") + Duration::days(offset))
}

fn any_box() -> impl Strategy<Value = u8> {
    MIN_BOX..=MAX_BOX
}

proptest! {
    #[test]
    fn next_review_is_anchor_plus_interval(anchor in any_date(), leitner_box in any_box()) {
        let next = compute_next_review(anchor, leitner_box);
        prop_assert_eq!((next - anchor).num_days(), interval_days(leitner_box));
        prop_assert!(next > anchor);
    }

    #[test]
    fn pass_never_demotes_or_overflows(leitner_box in any_box()) {
        let promoted = apply_review_outcome(leitner_box, Outcome::Pass);
        prop_assert!(promoted >= leitner_box);
        prop_assert!(promoted <= MAX_BOX);
    }

    #[test]
    fn fail_always_resets(leitner_box in any_box()) {
        prop_assert_eq!(apply_review_outcome(leitner_box, Outcome::Fail), MIN_BOX);
    }

    #[test]
    fn review_anchors_on_review_day(
        leitner_box in any_box(),
        today in any_date(),
        pass in any::<bool>(),
    ) {
        let outcome = if pass { Outcome::Pass } else { Outcome::Fail };
        let reviewed = review_card(card(1, leitner_box, today), outcome, today);

        prop_assert_eq!(reviewed.last_reviewed, Some(today));
        prop_assert_eq!(
            reviewed.next_review,
            compute_next_review(today, reviewed.leitner_box)
        );
        prop_assert!(!is_due(&reviewed, today));
    }

    #[test]
    fn due_selection_is_sorted_and_complete(
        dates in prop::collection::vec(any_date(), 0..40),
        today in any_date(),
    ) {
        let cards: Vec<Card> = dates
            .iter()
            .enumerate()
            .map(|(i, next)| card(i as i64 + 1, 1, *next))
            .collect();
        let expected = cards.iter().filter(|c| c.next_review <= today).count();

        let due = select_due_cards(cards, today);
        prop_assert_eq!(due.len(), expected);
        prop_assert!(due.iter().all(|c| c.next_review <= today));
        prop_assert!(due
            .windows(2)
            .all(|w| (w[0].next_review, w[0].id) <= (w[1].next_review, w[1].id)));
    }
}

#[test]
fn end_to_end_schedule() {
    let created = card(1, 1, compute_next_review(date("2024-06-01"), 1));
    assert_eq!(created.next_review, date("2024-06-02"));

    let passed = review_card(created, Outcome::Pass, date("2024-06-02"));
    assert_eq!(passed.leitner_box, 2);
    assert_eq!(passed.next_review, date("2024-06-05"));

    let failed = review_card(passed, Outcome::Fail, date("2024-06-05"));
    assert_eq!(failed.leitner_box, 1);
    assert_eq!(failed.next_review, date("2024-06-06"));
}

#[test]
fn passing_at_the_top_box_still_moves_the_date() {
    let start = card(1, 4, date("2024-01-10"));

    let first = review_card(start, Outcome::Pass, date("2024-01-10"));
    assert_eq!(first.leitner_box, 5);
    assert_eq!(first.next_review, date("2024-02-09"));

    // A repeated pass is not idempotent: the box stays put but the anchor moves
    let second = review_card(first.clone(), Outcome::Pass, date("2024-01-11"));
    assert_eq!(second.leitner_box, 5);
    assert_eq!(second.next_review, date("2024-02-10"));
    assert_ne!(second.next_review, first.next_review);
}

#[test]
fn due_boundary() {
    let today = date("2024-06-05");
    assert!(is_due(&card(1, 2, today), today));
    assert!(!is_due(&card(1, 2, today + Duration::days(1)), today));
}
