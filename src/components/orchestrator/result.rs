use crate::components::intent::EventDraft;
use crate::utils::time::DateRange;

/// Outcome of executing one command against the calendar store
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    pub events: Option<Vec<EventDraft>>,
    pub event_id: Option<String>,
    pub error: Option<String>,
    /// Date range a read actually queried
    pub range: Option<DateRange>,
}

impl ActionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            events: None,
            event_id: None,
            error: None,
            range: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            events: None,
            event_id: None,
            error: Some(error.into()),
            range: None,
        }
    }

    pub fn with_events(mut self, events: Vec<EventDraft>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_event_id(mut self, event_id: Option<String>) -> Self {
        self.event_id = event_id;
        self
    }

    pub fn with_range(mut self, range: Option<DateRange>) -> Self {
        self.range = range;
        self
    }
}
