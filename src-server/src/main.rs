//! Grocery backend entry point.

use grocery_server_lib::config::{Config, LogSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger first so config warnings reach the log
    let log = LogSettings::load()?;
    rolling_logger::init_with(log.options("grocery-server"))?;
    let _ = rolling_logger::info("Grocery backend starting");

    let config = Config::load(log)?;
    if let Err(e) = grocery_server_lib::run(config).await {
        let _ = rolling_logger::error(&format!("Server stopped with error: {e}"));
        return Err(e);
    }
    Ok(())
}
