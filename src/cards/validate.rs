//! Input validation for card operations.
//!
//! Every value coming from a request or the command line passes through here
//! before it reaches the scheduler, which can then assume a box in [1, 5] and a
//! well-formed outcome.

use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};

use super::algorithm::longest_interval;
use super::errors::{CardError, CardResult};
use super::models::{CardInput, NewCard, Outcome, MAX_BOX, MIN_BOX};
use super::title::TitleResolver;

/// Clamp any requested box into the valid range
pub fn clamp_box(raw: i64) -> u8 {
    raw.clamp(MIN_BOX as i64, MAX_BOX as i64) as u8
}

impl FromStr for Outcome {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass" => Ok(Outcome::Pass),
            "fail" => Ok(Outcome::Fail),
            _ => Err(CardError::InvalidOutcome(s.to_string())),
        }
    }
}

/// Latest year a stored date may fall in. Dates are compared as `YYYY-MM-DD` text.
const MAX_YEAR: i32 = 9999;

/// Whether `date` and every review scheduled from it keep a four-digit year
fn is_storable(date: NaiveDate) -> bool {
    date.year() >= 1
        && date
            .checked_add_signed(Duration::days(longest_interval()))
            .is_some_and(|last| last.year() <= MAX_YEAR)
}

/// Parse a calendar date. A full ISO datetime is accepted and truncated to its date.
pub fn parse_date(raw: &str) -> CardResult<NaiveDate> {
    let raw = raw.trim();
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|dt| dt.date())
    });

    match parsed {
        Some(date) if is_storable(date) => Ok(date),
        _ => Err(CardError::InvalidDate(raw.to_string())),
    }
}

/// The system clock's local calendar date
pub fn system_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Caller-supplied date, or the system date when none was given
pub fn resolve_today(raw: Option<&str>) -> CardResult<NaiveDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_date(s),
        None => Ok(system_today()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Turn raw add-card input into a card ready to be stored
pub fn validate_new_card(
    input: CardInput,
    today: NaiveDate,
    titles: &dyn TitleResolver,
) -> CardResult<NewCard> {
    let link = non_empty(input.link);
    let note = non_empty(input.note);

    let title = non_empty(input.title)
        .or_else(|| link.as_deref().and_then(|l| titles.resolve(l)))
        .ok_or(CardError::MissingTitle)?;

    let solved_date = match non_empty(input.solved_date) {
        Some(raw) => parse_date(&raw)?,
        None => today,
    };

    let leitner_box = clamp_box(input.leitner_box.unwrap_or(MIN_BOX as i64));

    Ok(NewCard {
        title,
        link,
        note,
        solved_date,
        leitner_box,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::title::{LeetCodeSlugTitle, NoTitleResolver};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_clamp_box() {
        assert_eq!(clamp_box(-3), 1);
        assert_eq!(clamp_box(0), 1);
        assert_eq!(clamp_box(3), 3);
        assert_eq!(clamp_box(9), 5);
        assert_eq!(clamp_box(i64::MAX), 5);
    }

    #[test]
    fn test_parse_outcome() {
        assert_eq!("pass".parse::<Outcome>().unwrap(), Outcome::Pass);
        assert_eq!(" FAIL ".parse::<Outcome>().unwrap(), Outcome::Fail);
        assert!(matches!(
            "skip".parse::<Outcome>(),
            Err(CardError::InvalidOutcome(s)) if s == "skip"
        ));
        assert!("".parse::<Outcome>().is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-06-01").unwrap(), date("2024-06-01"));
        assert_eq!(parse_date("2024-06-01T13:45:00").unwrap(), date("2024-06-01"));
        assert!(matches!(parse_date("06/01/2024"), Err(CardError::InvalidDate(_))));
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_parse_date_rejects_years_beyond_four_digits() {
        assert!(matches!(parse_date("+10000-01-01"), Err(CardError::InvalidDate(_))));
        assert!(matches!(parse_date("0000-06-01"), Err(CardError::InvalidDate(_))));
        // The longest interval would push the next review past 9999
        assert!(parse_date("9999-12-31").is_err());
        assert_eq!(parse_date("9999-11-01").unwrap(), date("9999-11-01"));
        assert!(matches!(resolve_today(Some("+10000-01-01")), Err(CardError::InvalidDate(_))));
    }

    #[test]
    fn test_resolve_today() {
        assert_eq!(resolve_today(Some("2024-01-02")).unwrap(), date("2024-01-02"));
        assert_eq!(resolve_today(Some("  ")).unwrap(), system_today());
        assert_eq!(resolve_today(None).unwrap(), system_today());
        assert!(resolve_today(Some("tomorrow")).is_err());
    }

    #[test]
    fn test_validate_defaults() {
        let input = CardInput {
            title: Some("  Two Sum ".to_string()),
            link: Some("   ".to_string()),
            ..Default::default()
        };
        let card = validate_new_card(input, date("2024-06-01"), &NoTitleResolver).unwrap();

        assert_eq!(card.title, "Two Sum");
        assert_eq!(card.link, None);
        assert_eq!(card.note, None);
        assert_eq!(card.solved_date, date("2024-06-01"));
        assert_eq!(card.leitner_box, 1);
    }

    #[test]
    fn test_validate_clamps_box() {
        let input = CardInput {
            title: Some("Graph Valid Tree".to_string()),
            leitner_box: Some(12),
            solved_date: Some("2024-05-20".to_string()),
            ..Default::default()
        };
        let card = validate_new_card(input, date("2024-06-01"), &NoTitleResolver).unwrap();
        assert_eq!(card.leitner_box, 5);
        assert_eq!(card.solved_date, date("2024-05-20"));
    }

    #[test]
    fn test_validate_derives_title_from_link() {
        let input = CardInput {
            link: Some("https://leetcode.com/problems/valid-anagram/".to_string()),
            ..Default::default()
        };
        let card = validate_new_card(input, date("2024-06-01"), &LeetCodeSlugTitle).unwrap();
        assert_eq!(card.title, "Valid Anagram");
    }

    #[test]
    fn test_validate_missing_title() {
        let input = CardInput {
            link: Some("https://example.com/x".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            validate_new_card(input, date("2024-06-01"), &LeetCodeSlugTitle),
            Err(CardError::MissingTitle)
        ));
    }

    #[test]
    fn test_validate_bad_solved_date() {
        let input = CardInput {
            title: Some("Two Sum".to_string()),
            solved_date: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            validate_new_card(input, date("2024-06-01"), &NoTitleResolver),
            Err(CardError::InvalidDate(_))
        ));
    }
}
