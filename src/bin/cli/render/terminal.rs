use chrono::NaiveDate;

use leitbox_lib::cards::algorithm::format_interval;
use leitbox_lib::cards::{BoxCounts, Card, MAX_BOX, MIN_BOX};

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Wrap `text` in `color` when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// When a card is due, relative to `today`
pub fn due_label(card: &Card, today: NaiveDate, use_color: bool) -> String {
    let days = (card.next_review - today).num_days();
    if days <= 0 {
        let label = if days == 0 {
            "due today".to_string()
        } else {
            format!("overdue {}", format_interval(-days))
        };
        paint(&label, Color::RED, use_color)
    } else {
        paint(&format!("in {}", format_interval(days)), Color::GREEN, use_color)
    }
}

/// One-line summary of a card
pub fn card_line(card: &Card, today: NaiveDate, use_color: bool) -> String {
    let id = paint(&format!("#{:<4}", card.id), Color::DIM, use_color);
    let title = paint(&card.title, Color::BOLD, use_color);
    format!(
        "{} {}  [box {}]  next {} ({})",
        id,
        title,
        card.leitner_box,
        card.next_review,
        due_label(card, today, use_color)
    )
}

/// Detail lines printed under a card
pub fn card_details(card: &Card, use_color: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(link) = &card.link {
        lines.push(format!("      {}", paint(link, Color::CYAN, use_color)));
    }
    if let Some(note) = &card.note {
        for line in note.lines() {
            lines.push(format!("      {}", line));
        }
    }
    lines
}

/// Horizontal bar chart of cards per box
pub fn box_chart(counts: &BoxCounts, use_color: bool) -> Vec<String> {
    let widest = counts.0.values().copied().max().unwrap_or(0).max(1);
    (MIN_BOX..=MAX_BOX)
        .map(|b| {
            let n = counts.get(b);
            let width = (n * 30).div_ceil(widest);
            let bar = paint(&"#".repeat(width), Color::YELLOW, use_color);
            format!("  box {}  {:>4}  {}", b, n, bar)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(next_review: &str) -> Card {
        Card {
            id: 7,
            owner: 1,
            title: "Two Sum".to_string(),
            link: None,
            note: Some("hash map\none pass".to_string()),
            solved_date: "2024-06-01".parse().unwrap(),
            leitner_box: 2,
            next_review: next_review.parse().unwrap(),
            last_reviewed: None,
            created_at: Utc::now(),
            version: 1,
        }
    }

    #[test]
    fn test_due_label() {
        let today: NaiveDate = "2024-06-05".parse().unwrap();
        assert_eq!(due_label(&card("2024-06-05"), today, false), "due today");
        assert_eq!(due_label(&card("2024-06-03"), today, false), "overdue 2d");
        assert_eq!(due_label(&card("2024-06-19"), today, false), "in 2w");
    }

    #[test]
    fn test_card_line_plain() {
        let today: NaiveDate = "2024-06-05".parse().unwrap();
        let line = card_line(&card("2024-06-05"), today, false);
        assert_eq!(line, "#7    Two Sum  [box 2]  next 2024-06-05 (due today)");
        assert_eq!(card_details(&card("2024-06-05"), false).len(), 2);
    }

    #[test]
    fn test_box_chart() {
        let mut counts = BoxCounts::default();
        counts.0.insert(1, 4);
        counts.0.insert(3, 2);
        let lines = box_chart(&counts, false);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with(&"#".repeat(30)));
        assert!(lines[2].ends_with(&"#".repeat(15)));
        assert!(lines[1].trim_end().ends_with('0'));
    }
}
