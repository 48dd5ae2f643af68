use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle};
use crate::components::calendar_store::CalendarStore;
use crate::components::intent::EventDraft;
use crate::config::Config;
use crate::error::AgentResult;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: Arc<Config>) -> AgentResult<Self> {
        let (mut actor, handle) = GoogleCalendarActor::new(config)?;

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AgentResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl CalendarStore for GoogleCalendarHandle {
    async fn create_event(&self, event: &EventDraft) -> AgentResult<String> {
        self.actor_handle.create_event(event.clone()).await
    }

    async fn query_events(
        &self,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        max_results: usize,
    ) -> AgentResult<Vec<EventDraft>> {
        self.actor_handle.query_events(start, end, max_results).await
    }

    async fn list_events(
        &self,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        max_results: usize,
    ) -> AgentResult<Vec<EventDraft>> {
        self.actor_handle.list_events(start, end, max_results).await
    }

    async fn search_events(&self, text: &str, max_results: usize) -> AgentResult<Vec<EventDraft>> {
        self.actor_handle.search_events(text.to_string(), max_results).await
    }

    async fn update_event(&self, event_id: &str, event: &EventDraft) -> AgentResult<String> {
        self.actor_handle
            .update_event(event_id.to_string(), event.clone())
            .await
    }

    async fn delete_event(&self, event_id: &str) -> AgentResult<()> {
        self.actor_handle.delete_event(event_id.to_string()).await
    }
}
