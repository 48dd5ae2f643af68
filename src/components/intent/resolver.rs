use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::heuristic::HeuristicClassifier;
use super::models::{Action, Command, IntentPayload, RawEvent};
use super::prompt::PromptContext;
use crate::error::{AgentResult, Error};

const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Language model that turns an utterance into a JSON intent payload
#[async_trait]
pub trait IntentModel: Send + Sync {
    /// Return the raw model reply for `utterance`
    async fn infer(&self, context: &PromptContext, utterance: &str) -> AgentResult<String>;
}

/// Resolves utterances with the language model, falling back to keywords
#[derive(Clone)]
pub struct PrimaryIntentResolver {
    model: Option<Arc<dyn IntentModel>>,
    fallback: HeuristicClassifier,
    default_calendar_id: String,
}

impl PrimaryIntentResolver {
    /// Create a resolver; without a model every utterance goes to the heuristic classifier
    pub fn new(model: Option<Arc<dyn IntentModel>>, default_calendar_id: impl Into<String>) -> Self {
        let default_calendar_id = default_calendar_id.into();
        Self {
            model,
            fallback: HeuristicClassifier::new(default_calendar_id.clone()),
            default_calendar_id,
        }
    }

    /// Resolve `text` into a command relative to `now`. Never fails.
    pub async fn resolve(&self, text: &str, now: DateTime<Tz>) -> Command {
        let Some(model) = &self.model else {
            debug!("No language model configured, using heuristic classifier");
            return self.fallback.classify(text, now);
        };

        let context = PromptContext::new(now);
        let reply = match model.infer(&context, text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Language model unavailable, falling back to heuristics: {}", e);
                return self.fallback.classify(text, now);
            }
        };

        match self.command_from_reply(text, &reply, now) {
            Ok(command) => {
                info!(
                    "Resolved {:?} with confidence {:.2} ({} extra events)",
                    command.action,
                    command.confidence,
                    command.additional_events.len()
                );
                command
            }
            Err(e) => {
                warn!("Unusable model reply, falling back to heuristics: {}", e);
                debug!("Model reply: {}", reply);
                self.fallback.classify(text, now)
            }
        }
    }

    /// Build a command from a model reply
    fn command_from_reply(&self, text: &str, reply: &str, now: DateTime<Tz>) -> AgentResult<Command> {
        let payload = parse_payload(reply)?;
        let action = payload.action;
        let query = payload.query.clone().unwrap_or_default();
        let confidence = payload.confidence.unwrap_or(DEFAULT_CONFIDENCE);

        let mut events = payload.into_events();
        if events.is_empty() && matches!(action, Action::Create | Action::Update) {
            return Err(Error::IntentPayload(format!(
                "{:?} without any event",
                action
            )));
        }

        for event in &mut events {
            if event.calendar_id.as_deref().map_or(true, |id| id.trim().is_empty()) {
                event.calendar_id = Some(self.default_calendar_id.clone());
            }
        }

        let mut command = Command::new(action, text, confidence).with_query(&query);

        let mut events = events.into_iter();
        if let Some(primary) = events.next() {
            command = command
                .with_event_id(primary.id.clone())
                .with_event(primary.to_draft(now, None))
                .with_additional_events(events.collect::<Vec<RawEvent>>());
        }

        Ok(command)
    }
}

/// Parse a model reply into an [`IntentPayload`].
///
/// Accepts bare JSON, JSON inside a markdown fence, or a JSON object
/// surrounded by prose.
pub fn parse_payload(reply: &str) -> AgentResult<IntentPayload> {
    let trimmed = reply.trim();

    if let Ok(payload) = serde_json::from_str::<IntentPayload>(trimmed) {
        return Ok(payload);
    }

    // Try to extract the outermost JSON object from the text
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return serde_json::from_str::<IntentPayload>(&trimmed[start..=end])
                .map_err(|e| Error::IntentPayload(e.to_string()));
        }
    }

    Err(Error::IntentPayload(
        "no JSON object in model reply".to_string(),
    ))
}
