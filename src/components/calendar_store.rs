use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;

use super::intent::EventDraft;
use crate::error::AgentResult;

/// Remote calendar that owns the durable copy of every event
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Insert an event, returning its id
    async fn create_event(&self, event: &EventDraft) -> AgentResult<String>;

    /// Events between `start` and `end` across every calendar; the store picks a window when either is absent
    async fn query_events(
        &self,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        max_results: usize,
    ) -> AgentResult<Vec<EventDraft>>;

    /// Events between `start` and `end` from the configured calendar only
    async fn list_events(
        &self,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        max_results: usize,
    ) -> AgentResult<Vec<EventDraft>>;

    /// Free-text search
    async fn search_events(&self, text: &str, max_results: usize) -> AgentResult<Vec<EventDraft>>;

    /// Replace an existing event, returning its id
    async fn update_event(&self, event_id: &str, event: &EventDraft) -> AgentResult<String>;

    async fn delete_event(&self, event_id: &str) -> AgentResult<()>;
}
