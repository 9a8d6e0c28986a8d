use anyhow::{Context, Result};

use leitbox_lib::cards::CardInput;

use crate::app::App;
use crate::render::terminal::{card_details, card_line};
use crate::OutputFormat;

pub fn run_add(app: &App, input: CardInput, format: &OutputFormat, use_color: bool) -> Result<()> {
    let user = app.user()?;
    let card = app
        .tracker
        .add_card(user.id, input, app.today_arg())
        .context("Failed to add card")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card)?),
        OutputFormat::Plain => {
            println!("Added \"{}\" to box {}", card.title, card.leitner_box);
            println!("  ID: {}", card.id);
            println!("  Solved: {}", card.solved_date);
            println!("  Next review: {}", card.next_review);
            for line in card_details(&card, use_color) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

pub fn run_list(
    app: &App,
    query: Option<&str>,
    verbose: bool,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let user = app.user()?;
    let dashboard = app
        .tracker
        .dashboard(user.id, query, app.today_arg())
        .context("Failed to list cards")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dashboard)?),
        OutputFormat::Plain => {
            if dashboard.cards.is_empty() {
                match &dashboard.query {
                    Some(q) => println!("No cards matching '{}'", q),
                    None => println!("No cards yet. Add one with `leitbox-cli add`."),
                }
                return Ok(());
            }
            for card in &dashboard.cards {
                println!("{}", card_line(card, dashboard.today, use_color));
                if verbose {
                    for line in card_details(card, use_color) {
                        println!("{}", line);
                    }
                }
            }
            println!();
            println!(
                "{} cards, {} due",
                dashboard.stats.total_cards, dashboard.stats.due_today
            );
        }
    }
    Ok(())
}

pub fn run_delete(app: &App, card_id: i64, format: &OutputFormat) -> Result<()> {
    let user = app.user()?;
    let card = app
        .tracker
        .get_card(user.id, card_id)
        .with_context(|| format!("Card {} not found", card_id))?;
    app.tracker
        .delete_card(user.id, card_id)
        .context("Failed to delete card")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "id": card.id, "title": card.title, "deleted": true });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Deleted \"{}\"", card.title),
    }
    Ok(())
}
