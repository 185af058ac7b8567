//! Thyrocast: thyroid cancer recurrence prediction
//!
//! Main entry point for the terminal form application.

use anyhow::{Context, Result};

use thyrocast::config::{self, AppConfig};
use thyrocast::tui::App;

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // Logs must not reach the terminal while the alternate screen is active;
    // see `LogMode::Auto`.
    let _guard = config::init_logging(&config)
        .with_context(|| format!("Failed to open log file {:?}", config.log_file))?;

    tracing::info!("Starting Thyrocast...");

    let mut app = App::new(&config)?;
    app.run()?;

    tracing::info!("Thyrocast shutdown complete.");
    Ok(())
}
