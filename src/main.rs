#[macro_use]
extern crate rust_i18n;

mod shutdown;
mod startup;

use tracing::info;

// Initialize i18n
i18n!("locales", fallback = "en");

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting calendar agent");

    // Load configuration
    let config = startup::load_config()?;

    // Anything on the command line is handled once; otherwise read stdin
    let utterance: Vec<String> = std::env::args().skip(1).collect();
    startup::start_agent(config, utterance.join(" ")).await
}
