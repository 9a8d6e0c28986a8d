use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run_register(app: &App, email: &str, password: &str, format: &OutputFormat) -> Result<()> {
    let user = app
        .tracker
        .register(email, password)
        .context("Registration failed")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
        OutputFormat::Plain => println!("Registered {} (id {})", user.email, user.id),
    }
    Ok(())
}

pub fn run_set_password(app: &App, email: &str, password: &str, format: &OutputFormat) -> Result<()> {
    app.tracker
        .users()
        .set_password(email, password)
        .context("Failed to set password")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "email": email, "updated": true });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Password updated for {}", email),
    }
    Ok(())
}
