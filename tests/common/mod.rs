#![allow(dead_code)]

use async_trait::async_trait;
use calendar_agent::components::intent::{EventDraft, IntentModel, PromptContext};
use calendar_agent::components::CalendarStore;
use calendar_agent::error::{calendar_store_error, nlp_error, AgentResult};
use chrono::{DateTime, Duration, TimeZone};
use chrono_tz::America::Chicago;
use chrono_tz::Tz;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Wednesday 2024-03-13, 10:00 in Chicago
pub fn now() -> DateTime<Tz> {
    Chicago.with_ymd_and_hms(2024, 3, 13, 10, 0, 0).unwrap()
}

/// A one hour event on March `day` at `hour`
pub fn event(id: &str, summary: &str, day: u32, hour: u32) -> EventDraft {
    let start = Chicago.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap();
    let mut event = EventDraft::placeholder(start, "family");
    event.id = Some(id.to_string());
    event.summary = summary.to_string();
    event.end_time = start + Duration::hours(1);
    event
}

/// Mock calendar store that records every call
#[derive(Default)]
pub struct MockCalendarStore {
    events: Vec<EventDraft>,
    fail_summaries: Vec<String>,
    outage: Option<String>,
    next_id: AtomicUsize,
    pub created: Mutex<Vec<EventDraft>>,
    pub queries: Mutex<Vec<(Option<DateTime<Tz>>, Option<DateTime<Tz>>)>>,
    pub listings: Mutex<Vec<(Option<DateTime<Tz>>, Option<DateTime<Tz>>)>>,
    pub searches: Mutex<Vec<String>>,
    pub updated: Mutex<Vec<(String, EventDraft)>>,
    pub deleted: Mutex<Vec<String>>,
}

impl MockCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events returned by queries and searches
    pub fn with_events(mut self, events: Vec<EventDraft>) -> Self {
        self.events = events;
        self
    }

    /// Reject creation of events with this summary
    pub fn failing_on(mut self, summary: &str) -> Self {
        self.fail_summaries.push(summary.to_string());
        self
    }

    /// Fail every call with `message`
    pub fn unavailable(mut self, message: &str) -> Self {
        self.outage = Some(message.to_string());
        self
    }

    fn check_outage(&self) -> AgentResult<()> {
        match &self.outage {
            Some(message) => Err(calendar_store_error(message)),
            None => Ok(()),
        }
    }

    pub fn created_summaries(&self) -> Vec<String> {
        let mut summaries: Vec<String> = self
            .created
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.summary.clone())
            .collect();
        summaries.sort();
        summaries
    }
}

#[async_trait]
impl CalendarStore for MockCalendarStore {
    async fn create_event(&self, event: &EventDraft) -> AgentResult<String> {
        self.check_outage()?;
        if self.fail_summaries.contains(&event.summary) {
            return Err(calendar_store_error(&format!("{} rejected", event.summary)));
        }
        self.created.lock().unwrap().push(event.clone());
        Ok(format!("evt-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn query_events(
        &self,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        max_results: usize,
    ) -> AgentResult<Vec<EventDraft>> {
        self.queries.lock().unwrap().push((start, end));
        self.check_outage()?;
        Ok(self.events.iter().take(max_results).cloned().collect())
    }

    async fn list_events(
        &self,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        max_results: usize,
    ) -> AgentResult<Vec<EventDraft>> {
        self.listings.lock().unwrap().push((start, end));
        self.check_outage()?;
        Ok(self.events.iter().take(max_results).cloned().collect())
    }

    async fn search_events(&self, text: &str, max_results: usize) -> AgentResult<Vec<EventDraft>> {
        self.searches.lock().unwrap().push(text.to_string());
        self.check_outage()?;
        let text = text.to_lowercase();
        Ok(self
            .events
            .iter()
            .filter(|event| event.summary.to_lowercase().contains(&text))
            .take(max_results)
            .cloned()
            .collect())
    }

    async fn update_event(&self, event_id: &str, event: &EventDraft) -> AgentResult<String> {
        self.check_outage()?;
        self.updated
            .lock()
            .unwrap()
            .push((event_id.to_string(), event.clone()));
        Ok(event_id.to_string())
    }

    async fn delete_event(&self, event_id: &str) -> AgentResult<()> {
        self.check_outage()?;
        self.deleted.lock().unwrap().push(event_id.to_string());
        Ok(())
    }
}

/// Language model stand-in that always gives the same reply
pub struct ScriptedIntentModel {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedIntentModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl IntentModel for ScriptedIntentModel {
    async fn infer(&self, context: &PromptContext, utterance: &str) -> AgentResult<String> {
        self.prompts.lock().unwrap().push(context.user_prompt(utterance));
        self.reply.clone().map_err(|message| nlp_error(&message))
    }
}
