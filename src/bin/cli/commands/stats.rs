use anyhow::{Context, Result};

use crate::app::App;
use crate::render::terminal::box_chart;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let user = app.user()?;
    let dashboard = app
        .tracker
        .dashboard(user.id, None, app.today_arg())
        .context("Failed to load stats")?;
    let stats = &dashboard.stats;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(stats)?),
        OutputFormat::Plain => {
            println!("{} on {}", user.email, dashboard.today);
            println!("  Total cards:    {}", stats.total_cards);
            println!("  Due today:      {}", stats.due_today);
            println!("  Reviewed today: {}", stats.reviewed_today);
            println!();
            for line in box_chart(&stats.box_counts, use_color) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
