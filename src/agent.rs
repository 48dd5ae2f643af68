use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::info;

use crate::components::calendar_store::CalendarStore;
use crate::components::intent::{IntentModel, PrimaryIntentResolver};
use crate::components::orchestrator::ActionOrchestrator;
use crate::components::response::{synthesize, Response};
use crate::config::Config;
use crate::error::AgentResult;
use crate::utils::time::TemporalResolver;

/// Resolve, execute and answer one utterance at a time
#[derive(Clone)]
pub struct CalendarAgent {
    resolver: PrimaryIntentResolver,
    orchestrator: ActionOrchestrator,
    timezone: Tz,
}

impl CalendarAgent {
    pub fn new(resolver: PrimaryIntentResolver, orchestrator: ActionOrchestrator, timezone: Tz) -> Self {
        Self {
            resolver,
            orchestrator,
            timezone,
        }
    }

    /// Wire the pipeline from configuration
    pub fn from_config(
        config: &Config,
        store: Arc<dyn CalendarStore>,
        model: Option<Arc<dyn IntentModel>>,
    ) -> AgentResult<Self> {
        let timezone = config.tz()?;
        let resolver = PrimaryIntentResolver::new(model, config.default_calendar_id.clone());
        let orchestrator =
            ActionOrchestrator::new(store, TemporalResolver::new(timezone), config.max_results);
        Ok(Self::new(resolver, orchestrator, timezone))
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Handle `text` at the current time
    pub async fn handle_text(&self, text: &str) -> Response {
        let now = Utc::now().with_timezone(&self.timezone);
        self.handle_text_at(text, now).await
    }

    /// Handle `text` as if it were said at `now`
    pub async fn handle_text_at(&self, text: &str, now: DateTime<Tz>) -> Response {
        let command = self.resolver.resolve(text, now).await;
        let result = self.orchestrator.execute_at(&command, now).await;
        let response = synthesize(&command, &result);

        info!(
            "{:?} -> success={} confidence={:.2}",
            command.action, response.success, response.confidence
        );
        response
    }
}
