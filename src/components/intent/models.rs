use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::time::parse_event_time;

/// Calendar operation requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

/// A single reminder override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReminderOverride {
    /// "popup" or "email"
    pub method: String,
    /// Minutes before the event starts
    pub minutes: u32,
}

/// Reminder settings attached to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSpec {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

impl ReminderSpec {
    /// Explicit overrides replacing the calendar defaults
    pub fn overrides(overrides: Vec<ReminderOverride>) -> Self {
        Self {
            use_default: false,
            overrides,
        }
    }
}

/// A fully resolved event that has not been committed to a calendar yet
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    /// Set on events read back from the calendar store
    pub id: Option<String>,
    pub summary: String,
    pub description: Option<String>,
    pub start_time: DateTime<Tz>,
    pub end_time: DateTime<Tz>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub reminders: Option<ReminderSpec>,
    pub calendar_id: Option<String>,
}

impl EventDraft {
    /// Untitled one hour placeholder starting at `now`
    pub fn placeholder(now: DateTime<Tz>, calendar_id: &str) -> Self {
        Self {
            id: None,
            summary: String::new(),
            description: None,
            start_time: now,
            end_time: now + Duration::hours(1),
            location: None,
            attendees: Vec::new(),
            reminders: None,
            calendar_id: Some(calendar_id.to_string()),
        }
    }
}

/// Event object as returned by the language model, before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawEvent {
    /// Id of an existing event, for updates and deletes
    #[serde(default)]
    pub id: Option<String>,
    /// Event title
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Local time in YYYY-MM-DDTHH:MM:SS format
    #[serde(default)]
    pub start_time: Option<String>,
    /// Local time in YYYY-MM-DDTHH:MM:SS format
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Attendee email addresses
    #[serde(default)]
    pub attendees: Option<Vec<String>>,
    /// Calendar name or id, e.g. "family" or "work"
    #[serde(default)]
    pub calendar_id: Option<String>,
    #[serde(default)]
    pub reminders: Option<Vec<ReminderOverride>>,
}

impl RawEvent {
    /// Normalize into an [`EventDraft`], filling gaps from `fallback`.
    ///
    /// A missing or unparseable start becomes `now`; a missing or unparseable
    /// end becomes one hour after the start. Reminders are never inherited.
    pub fn to_draft(&self, now: DateTime<Tz>, fallback: Option<&EventDraft>) -> EventDraft {
        let tz = now.timezone();

        let start_time = self
            .start_time
            .as_deref()
            .and_then(|value| parse_event_time(value, &tz))
            .unwrap_or(now);

        let end_time = self
            .end_time
            .as_deref()
            .and_then(|value| parse_event_time(value, &tz))
            .unwrap_or(start_time + Duration::hours(1));

        let summary = self
            .summary
            .clone()
            .or_else(|| fallback.map(|event| event.summary.clone()))
            .unwrap_or_default();

        EventDraft {
            id: None,
            summary,
            description: self
                .description
                .clone()
                .or_else(|| fallback.and_then(|event| event.description.clone())),
            start_time,
            end_time,
            location: self
                .location
                .clone()
                .or_else(|| fallback.and_then(|event| event.location.clone())),
            attendees: self
                .attendees
                .clone()
                .or_else(|| fallback.map(|event| event.attendees.clone()))
                .unwrap_or_default(),
            reminders: self.reminders.clone().map(ReminderSpec::overrides),
            calendar_id: self
                .calendar_id
                .clone()
                .or_else(|| fallback.and_then(|event| event.calendar_id.clone())),
        }
    }
}

/// Structured reply expected from the language model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IntentPayload {
    pub action: Action,
    /// One entry per event; several when the user asks for multiple events
    #[serde(default)]
    pub events: Vec<RawEvent>,
    /// Single event form, accepted when `events` is empty
    #[serde(default)]
    pub event: Option<RawEvent>,
    /// Search text or relative date phrase for read/list actions
    #[serde(default)]
    pub query: Option<String>,
    /// Between 0 and 1
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl IntentPayload {
    /// All events, folding the single `event` form into the list
    pub fn into_events(self) -> Vec<RawEvent> {
        if self.events.is_empty() {
            self.event.into_iter().collect()
        } else {
            self.events
        }
    }
}

/// Structured interpretation of one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub action: Action,
    pub event: Option<EventDraft>,
    pub query: Option<String>,
    pub confidence: f64,
    pub raw_input: String,
    /// Extra events of a multi-event request, normalized at execution time
    pub additional_events: Vec<RawEvent>,
    /// Target of an update or delete
    pub event_id: Option<String>,
}

impl Command {
    /// Command with no event data
    pub fn new(action: Action, raw_input: &str, confidence: f64) -> Self {
        Self {
            action,
            event: None,
            query: None,
            confidence: confidence.clamp(0.0, 1.0),
            raw_input: raw_input.to_string(),
            additional_events: Vec::new(),
            event_id: None,
        }
    }

    pub fn with_event(mut self, event: EventDraft) -> Self {
        self.event = Some(event);
        self
    }

    /// Attach a query; blank queries are dropped
    pub fn with_query(mut self, query: &str) -> Self {
        let query = query.trim();
        self.query = (!query.is_empty()).then(|| query.to_string());
        self
    }

    pub fn with_additional_events(mut self, events: Vec<RawEvent>) -> Self {
        self.additional_events = events;
        self
    }

    pub fn with_event_id(mut self, event_id: Option<String>) -> Self {
        self.event_id = event_id.filter(|id| !id.trim().is_empty());
        self
    }
}
