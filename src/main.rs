use anyhow::Context;

use leitbox_lib::config::Config;
use leitbox_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().context("Failed to load configuration")?;
    server::serve(&config).await.context("Server failed")?;

    Ok(())
}
