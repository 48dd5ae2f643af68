//! Keyword based intent classifier.
//!
//! Deterministic fallback used whenever the language model is not configured,
//! fails, or returns something unusable.

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::debug;

use super::models::{Action, Command, EventDraft};

/// Words that signal the user wants to look at existing events
const READ_KEYWORDS: [&str; 11] = [
    "what",
    "show",
    "list",
    "check",
    "see",
    "tell me",
    "what's",
    "what is",
    "events",
    "appointments",
    "meetings",
];

/// "schedule" only reads as a lookup in its noun form
const SCHEDULE_NOUN_FORMS: [&str; 4] = [
    "my schedule",
    "the schedule",
    "our schedule",
    "your schedule",
];

/// Words that signal the user wants a new event
const CREATE_KEYWORDS: [&str; 7] = [
    "schedule", "add", "create", "book", "set up", "arrange", "plan",
];

/// Relative periods that the temporal resolver (or a search) handles later
const RELATIVE_PHRASES: [&str; 14] = [
    "this week",
    "the week",
    "week",
    "current week",
    "next week",
    "last week",
    "previous week",
    "today",
    "tomorrow",
    "this month",
    "current month",
    "next month",
    "last month",
    "previous month",
];

const KEYWORD_CONFIDENCE: f64 = 0.3;
const GUESS_CONFIDENCE: f64 = 0.1;

/// Classifies utterances by keyword lookup
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    default_calendar_id: String,
}

impl HeuristicClassifier {
    /// Create a classifier that files placeholder events under `default_calendar_id`
    pub fn new(default_calendar_id: impl Into<String>) -> Self {
        Self {
            default_calendar_id: default_calendar_id.into(),
        }
    }

    /// Classify `text` relative to `now`
    pub fn classify(&self, text: &str, now: DateTime<Tz>) -> Command {
        let lower = text.to_lowercase();

        if is_read_request(&lower) {
            if contains_any(&lower, &RELATIVE_PHRASES) {
                // Leave the period to the temporal resolver
                debug!("Heuristic: read with relative period");
                return Command::new(Action::Read, text, KEYWORD_CONFIDENCE).with_query(text);
            }

            debug!("Heuristic: read");
            return Command::new(Action::Read, text, KEYWORD_CONFIDENCE)
                .with_event(self.placeholder(now))
                .with_query(text);
        }

        if contains_any(&lower, &CREATE_KEYWORDS) {
            debug!("Heuristic: create");
            let mut event = self.placeholder(now);
            event.summary = text.to_string();
            return Command::new(Action::Create, text, KEYWORD_CONFIDENCE).with_event(event);
        }

        debug!("Heuristic: no keywords, guessing read");
        Command::new(Action::Read, text, GUESS_CONFIDENCE)
            .with_event(self.placeholder(now))
            .with_query(text)
    }

    fn placeholder(&self, now: DateTime<Tz>) -> EventDraft {
        EventDraft::placeholder(now, &self.default_calendar_id)
    }
}

fn is_read_request(lower: &str) -> bool {
    contains_any(lower, &READ_KEYWORDS) || contains_any(lower, &SCHEDULE_NOUN_FORMS)
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::America::Chicago;

    fn now() -> DateTime<Tz> {
        Chicago.with_ymd_and_hms(2024, 3, 13, 10, 0, 0).unwrap()
    }

    fn classifier() -> HeuristicClassifier {
        HeuristicClassifier::new("family")
    }

    #[test]
    fn test_read_with_relative_period() {
        let text = "what's on my calendar this week";
        let command = classifier().classify(text, now());
        assert_eq!(command.action, Action::Read);
        assert_eq!(command.event, None);
        assert_eq!(command.query.as_deref(), Some(text));
        assert_eq!(command.confidence, 0.3);
        assert_eq!(command.raw_input, text);
    }

    #[test]
    fn test_read_without_period_gets_placeholder() {
        let command = classifier().classify("Show my dentist appointments", now());
        assert_eq!(command.action, Action::Read);
        assert_eq!(command.confidence, 0.3);

        let event = command.event.unwrap();
        assert_eq!(event.start_time, now());
        assert_eq!(event.end_time, now() + Duration::hours(1));
        assert_eq!(event.calendar_id.as_deref(), Some("family"));
        assert_eq!(
            command.query.as_deref(),
            Some("Show my dentist appointments")
        );
    }

    #[test]
    fn test_create() {
        let command = classifier().classify("schedule a haircut", now());
        assert_eq!(command.action, Action::Create);
        assert_eq!(command.confidence, 0.3);
        assert_eq!(command.query, None);

        let event = command.event.unwrap();
        assert_eq!(event.summary, "schedule a haircut");
        assert_eq!(event.start_time, now());
        assert_eq!(event.calendar_id.as_deref(), Some("family"));
    }

    #[test]
    fn test_schedule_as_noun_reads() {
        let command = classifier().classify("my schedule tomorrow", now());
        assert_eq!(command.action, Action::Read);
        assert_eq!(command.event, None);

        let command = classifier().classify("Book the dentist", now());
        assert_eq!(command.action, Action::Create);
    }

    #[test]
    fn test_read_keywords_win_over_create() {
        // "add" is present but "what" is checked first
        let command = classifier().classify("what should I add", now());
        assert_eq!(command.action, Action::Read);
    }

    #[test]
    fn test_no_keywords() {
        let command = classifier().classify("xyz banana", now());
        assert_eq!(command.action, Action::Read);
        assert_eq!(command.confidence, 0.1);
        assert_eq!(command.query.as_deref(), Some("xyz banana"));
        assert!(command.event.is_some());
    }
}
