mod result;

pub use result::ActionResult;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use rust_i18n::t;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::calendar_store::CalendarStore;
use super::intent::{Action, Command, EventDraft};
use crate::error::Error;
use crate::utils::time::{DateRange, TemporalResolver};

/// How far ahead a read with no dates and no query looks
pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 7;

/// Executes resolved commands against the calendar store
#[derive(Clone)]
pub struct ActionOrchestrator {
    store: Arc<dyn CalendarStore>,
    temporal: TemporalResolver,
    max_results: usize,
}

impl ActionOrchestrator {
    pub fn new(store: Arc<dyn CalendarStore>, temporal: TemporalResolver, max_results: usize) -> Self {
        Self {
            store,
            temporal,
            max_results,
        }
    }

    /// Execute `command` using the current time
    pub async fn execute(&self, command: &Command) -> ActionResult {
        let now = Utc::now().with_timezone(&self.temporal.timezone());
        self.execute_at(command, now).await
    }

    /// Execute `command` relative to `now`
    pub async fn execute_at(&self, command: &Command, now: DateTime<Tz>) -> ActionResult {
        debug!("Executing {:?} for '{}'", command.action, command.raw_input);
        match command.action {
            Action::Create => self.create(command, now).await,
            Action::Read => self.read(command, now).await,
            Action::Update => self.update(command).await,
            Action::Delete => self.delete(command).await,
            Action::List => self.list(command).await,
        }
    }

    /// Create the primary event, then every additional one independently
    async fn create(&self, command: &Command, now: DateTime<Tz>) -> ActionResult {
        let Some(primary) = &command.event else {
            return ActionResult::failure(t!("create_missing_event"), t!("error_missing_event"));
        };

        let primary_id = match self.store.create_event(primary).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Failed to create event '{}': {}", primary.summary, e);
                return ActionResult::failure(
                    t!("create_failed", error = e.to_string()),
                    e.to_string(),
                );
            }
        };
        info!("Created event '{}' ({})", primary.summary, primary_id);

        if command.additional_events.is_empty() {
            return ActionResult::success(t!("event_created", summary = primary.summary.as_str()))
                .with_event_id(Some(primary_id));
        }

        let drafts: Vec<EventDraft> = command
            .additional_events
            .iter()
            .map(|raw| raw.to_draft(now, Some(primary)))
            .collect();

        // No transaction: each submission stands on its own
        let outcomes = join_all(drafts.iter().map(|draft| self.store.create_event(draft))).await;

        let mut errors = Vec::new();
        for (draft, outcome) in drafts.iter().zip(outcomes) {
            match outcome {
                Ok(id) => info!("Created additional event '{}' ({})", draft.summary, id),
                Err(e) => {
                    warn!("Failed to create additional event '{}': {}", draft.summary, e);
                    errors.push(e.to_string());
                }
            }
        }

        let total = 1 + drafts.len();
        let created = total - errors.len();

        if errors.is_empty() {
            ActionResult::success(t!("events_created", count = total))
                .with_event_id(Some(primary_id))
        } else {
            ActionResult::failure(
                t!("events_partially_created", created = created, total = total),
                errors.join("; "),
            )
            .with_event_id(Some(primary_id))
        }
    }

    /// Explicit dates beat a relative phrase, which beats free-text search,
    /// which beats the default window
    async fn read(&self, command: &Command, now: DateTime<Tz>) -> ActionResult {
        if let Some(event) = &command.event {
            debug!(
                "Reading explicit range {} - {}",
                event.start_time, event.end_time
            );
            let range = DateRange::new(event.start_time, event.end_time);
            return self
                .fetch(Some(event.start_time), Some(event.end_time), range)
                .await;
        }

        if let Some(query) = &command.query {
            if let Some(range) = self.temporal.resolve(query, &now) {
                debug!("Query '{}' resolved to {} - {}", query, range.start, range.end);
                return self.fetch(Some(range.start), Some(range.end), Some(range)).await;
            }

            debug!("Query '{}' has no date, searching", query);
            return match self.store.search_events(query, self.max_results).await {
                Ok(mut events) => {
                    sort_by_start(&mut events);
                    ActionResult::success(t!(
                        "events_found_matching",
                        count = events.len(),
                        query = query.as_str()
                    ))
                    .with_events(events)
                }
                Err(e) => {
                    warn!("Search for '{}' failed: {}", query, e);
                    failed_lookup(e)
                }
            };
        }

        let end = now + Duration::days(DEFAULT_LOOKAHEAD_DAYS);
        debug!("Reading default window {} - {}", now, end);
        self.fetch(Some(now), Some(end), DateRange::new(now, end)).await
    }

    async fn update(&self, command: &Command) -> ActionResult {
        let Some(event_id) = &command.event_id else {
            return ActionResult::failure(t!("update_missing_id"), t!("error_missing_id"));
        };
        let Some(event) = &command.event else {
            return ActionResult::failure(t!("update_missing_event"), t!("error_missing_event"));
        };

        match self.store.update_event(event_id, event).await {
            Ok(id) => {
                info!("Updated event {}", id);
                ActionResult::success(t!("event_updated", summary = event.summary.as_str()))
                    .with_event_id(Some(id))
            }
            Err(e) => {
                warn!("Failed to update event {}: {}", event_id, e);
                ActionResult::failure(t!("update_failed", error = e.to_string()), e.to_string())
            }
        }
    }

    async fn delete(&self, command: &Command) -> ActionResult {
        let Some(event_id) = &command.event_id else {
            return ActionResult::failure(t!("delete_missing_id"), t!("error_missing_id"));
        };

        match self.store.delete_event(event_id).await {
            Ok(()) => {
                info!("Deleted event {}", event_id);
                ActionResult::success(t!("event_deleted")).with_event_id(Some(event_id.clone()))
            }
            Err(e) => {
                warn!("Failed to delete event {}: {}", event_id, e);
                ActionResult::failure(t!("delete_failed", error = e.to_string()), e.to_string())
            }
        }
    }

    /// List the configured calendar with whatever bounds the event carries
    async fn list(&self, command: &Command) -> ActionResult {
        let start = command.event.as_ref().map(|event| event.start_time);
        let end = command.event.as_ref().map(|event| event.end_time);
        let range = start.zip(end).and_then(|(start, end)| DateRange::new(start, end));

        match self.store.list_events(start, end, self.max_results).await {
            Ok(events) => found(events).with_range(range),
            Err(e) => {
                warn!("Failed to list events: {}", e);
                failed_lookup(e).with_range(range)
            }
        }
    }

    async fn fetch(
        &self,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        range: Option<DateRange>,
    ) -> ActionResult {
        match self.store.query_events(start, end, self.max_results).await {
            Ok(events) => found(events).with_range(range),
            Err(e) => {
                warn!("Failed to fetch events: {}", e);
                failed_lookup(e).with_range(range)
            }
        }
    }
}

fn found(mut events: Vec<EventDraft>) -> ActionResult {
    sort_by_start(&mut events);
    ActionResult::success(t!("events_found", count = events.len())).with_events(events)
}

fn failed_lookup(e: Error) -> ActionResult {
    ActionResult::failure(t!("events_fetch_failed", error = e.to_string()), e.to_string())
}

fn sort_by_start(events: &mut [EventDraft]) {
    events.sort_by_key(|event| event.start_time);
}
