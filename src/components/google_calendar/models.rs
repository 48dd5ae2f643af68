use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::components::intent::{EventDraft, ReminderOverride, ReminderSpec};
use crate::utils::time::parse_event_time;

/// Reminders applied when an event doesn't carry its own
pub fn default_reminders() -> ReminderSpec {
    ReminderSpec::overrides(vec![
        ReminderOverride {
            method: "email".to_string(),
            minutes: 24 * 60,
        },
        ReminderOverride {
            method: "popup".to_string(),
            minutes: 10,
        },
    ])
}

/// Start or end of an event as the Calendar API encodes it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// All-day events carry a date instead of a date-time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    fn from_datetime(dt: &DateTime<Tz>) -> Self {
        Self {
            date_time: Some(dt.to_rfc3339()),
            date: None,
            time_zone: Some(dt.timezone().name().to_string()),
        }
    }

    fn to_datetime(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        self.date_time
            .as_deref()
            .or(self.date.as_deref())
            .and_then(|value| parse_event_time(value, tz))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
}

/// Request body for inserting or replacing an event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventBody {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
    pub reminders: ReminderSpec,
}

impl From<&EventDraft> for EventBody {
    fn from(draft: &EventDraft) -> Self {
        Self {
            summary: draft.summary.clone(),
            description: draft.description.clone(),
            start: EventTime::from_datetime(&draft.start_time),
            end: EventTime::from_datetime(&draft.end_time),
            location: draft.location.clone(),
            attendees: draft
                .attendees
                .iter()
                .map(|email| Attendee {
                    email: email.clone(),
                })
                .collect(),
            reminders: draft.reminders.clone().unwrap_or_else(default_reminders),
        }
    }
}

/// Event as returned by the Calendar API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

impl ApiEvent {
    /// Convert into a draft in `tz`; events without a start are dropped
    pub fn into_draft(self, tz: &Tz, calendar_id: &str) -> Option<EventDraft> {
        let start_time = self.start.to_datetime(tz)?;
        let end_time = self
            .end
            .to_datetime(tz)
            .unwrap_or(start_time + Duration::hours(1));

        Some(EventDraft {
            id: Some(self.id),
            summary: self.summary.unwrap_or_default(),
            description: self.description,
            start_time,
            end_time,
            location: self.location,
            attendees: self.attendees.into_iter().map(|a| a.email).collect(),
            reminders: None,
            calendar_id: Some(calendar_id.to_string()),
        })
    }
}

/// Page of events
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarListEntry {
    pub id: String,
}

/// Calendars visible to the authenticated user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarList {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
}
