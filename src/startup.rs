use calendar_agent::components::intent::IntentModel;
use calendar_agent::components::{GoogleCalendarHandle, Response};
use calendar_agent::config::Config;
use calendar_agent::error::Error;
use calendar_agent::CalendarAgent;
use rust_i18n::t;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::shutdown;

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,rig=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

#[cfg(feature = "llm")]
fn intent_model(config: &Config) -> miette::Result<Option<Arc<dyn IntentModel>>> {
    use calendar_agent::components::intent::RigIntentModel;

    Ok(RigIntentModel::from_config(config)?.map(|model| Arc::new(model) as Arc<dyn IntentModel>))
}

#[cfg(not(feature = "llm"))]
fn intent_model(_config: &Config) -> miette::Result<Option<Arc<dyn IntentModel>>> {
    Ok(None)
}

/// Build the agent and answer `utterance`, or every stdin line when it is empty
pub async fn start_agent(config: Arc<Config>, utterance: String) -> miette::Result<()> {
    calendar_agent::utils::i18n::set_locale(&config.bot_locale);
    info!("Setting locale to {}", config.bot_locale);

    let model = intent_model(&config)?;
    if model.is_none() {
        info!("No LLM API key configured, using keyword classification only");
    }

    let calendar = GoogleCalendarHandle::new(Arc::clone(&config))?;
    let agent = CalendarAgent::from_config(&config, Arc::new(calendar.clone()), model)?;

    if !utterance.trim().is_empty() {
        let response = agent.handle_text(&utterance).await;
        print_response(&response);
        calendar.shutdown().await?;
        return Ok(());
    }

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();
    tokio::spawn(shutdown::handle_signals(shutdown_send, calendar.clone()));

    tokio::select! {
        result = run_repl(&agent) => {
            calendar.shutdown().await?;
            result
        }
        _ = shutdown_recv => {
            info!("Received shutdown signal, exiting");
            Ok(())
        }
    }
}

/// Read utterances line by line until EOF or "exit"
async fn run_repl(agent: &CalendarAgent) -> miette::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout
            .write_all(t!("repl_prompt").as_bytes())
            .await
            .map_err(Error::from)?;
        stdout.flush().await.map_err(Error::from)?;

        let Some(line) = lines.next_line().await.map_err(Error::from)? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let response = agent.handle_text(line).await;
        print_response(&response);
    }

    println!("{}", t!("repl_goodbye"));
    Ok(())
}

fn print_response(response: &Response) {
    println!("{}", response.message);
    println!("{}", t!("repl_confidence", confidence = format!("{:.2}", response.confidence)));
    for suggestion in &response.suggestions {
        println!("  {}", suggestion);
    }
}
