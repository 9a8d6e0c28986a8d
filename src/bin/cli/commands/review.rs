use anyhow::{Context, Result};

use crate::app::App;
use crate::render::terminal::{card_details, card_line, paint, Color};
use crate::OutputFormat;

pub fn run_due(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let user = app.user()?;
    let today = app.today()?;
    let queue = app
        .tracker
        .review_queue(user.id, app.today_arg())
        .context("Failed to load review queue")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&queue)?),
        OutputFormat::Plain => {
            if queue.is_empty() {
                println!("Nothing due on {}", today);
                return Ok(());
            }
            println!("{} due on {}", queue.len(), today);
            println!();
            for due in &queue {
                println!("{}", card_line(&due.card, today, use_color));
                for line in card_details(&due.card, use_color) {
                    println!("{}", line);
                }
                println!(
                    "      pass -> {}   fail -> {}",
                    paint(&due.preview.pass.to_string(), Color::GREEN, use_color),
                    paint(&due.preview.fail.to_string(), Color::RED, use_color),
                );
            }
        }
    }
    Ok(())
}

pub fn run_review(
    app: &App,
    card_id: i64,
    outcome: &str,
    expected_version: Option<i64>,
    format: &OutputFormat,
) -> Result<()> {
    let user = app.user()?;
    let reviewed = app
        .tracker
        .review(user.id, card_id, outcome, app.today_arg(), expected_version)
        .with_context(|| format!("Review of card {} failed", card_id))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reviewed)?),
        OutputFormat::Plain => {
            let card = &reviewed.card;
            println!(
                "\"{}\": box {} -> {}, next review {}",
                card.title, reviewed.previous_box, card.leitner_box, card.next_review
            );
        }
    }
    Ok(())
}
