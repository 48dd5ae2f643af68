//! Turns an executed command into the reply shown to the user.

use rust_i18n::t;

use super::intent::{Action, Command};
use super::orchestrator::ActionResult;
use crate::utils::time::{format_event_time, DateRange, QueryView};

/// Events listed individually in a reply
const MAX_LISTED_EVENTS: usize = 5;

/// Below this confidence the reply asks for a clearer request
const CLARIFY_BELOW: f64 = 0.7;

/// Final reply for one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub success: bool,
    pub message: String,
    pub confidence: f64,
    pub suggestions: Vec<String>,
    pub queried_range: Option<DateRange>,
    pub queried_view: Option<QueryView>,
}

/// Build the reply for `command` given how it went
pub fn synthesize(command: &Command, result: &ActionResult) -> Response {
    Response {
        success: result.success,
        message: message(command, result),
        confidence: command.confidence,
        suggestions: suggestions(command),
        queried_range: result.range,
        queried_view: result.range.map(|range| range.view()),
    }
}

fn message(command: &Command, result: &ActionResult) -> String {
    if !result.success {
        return result.message.clone();
    }

    match command.action {
        Action::Create => t!("response_created", message = result.message.as_str()).to_string(),
        Action::Read | Action::List => match &result.events {
            Some(events) => match events.as_slice() {
                [] => t!("response_no_events").to_string(),
                [event] => t!(
                    "response_one_event",
                    summary = event.summary.as_str(),
                    time = format_event_time(&event.start_time)
                )
                .to_string(),
                _ => {
                    let mut message = t!("response_many_events", count = events.len()).to_string();
                    for event in events.iter().take(MAX_LISTED_EVENTS) {
                        message.push('\n');
                        message.push_str(&t!(
                            "response_event_line",
                            summary = event.summary.as_str(),
                            time = format_event_time(&event.start_time)
                        ));
                    }
                    message
                }
            },
            None => result.message.clone(),
        },
        Action::Update | Action::Delete => result.message.clone(),
    }
}

/// Advisory follow-up hints; never affect control flow
fn suggestions(command: &Command) -> Vec<String> {
    let mut suggestions = Vec::new();

    if command.confidence < CLARIFY_BELOW {
        suggestions.push(t!("suggest_more_specific").to_string());
        suggestions.push(t!("suggest_date_time").to_string());
    }

    match command.action {
        Action::Create if command.event.is_none() => {
            suggestions.push(t!("suggest_create_meeting").to_string());
            suggestions.push(t!("suggest_create_dentist").to_string());
        }
        Action::Read | Action::List => {
            suggestions.push(t!("suggest_read_tomorrow").to_string());
            suggestions.push(t!("suggest_read_week").to_string());
        }
        _ => {}
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::intent::EventDraft;
    use chrono::{Duration, TimeZone};
    use chrono_tz::America::Chicago;

    fn event(summary: &str, day: u32, hour: u32) -> EventDraft {
        let start = Chicago.with_ymd_and_hms(2024, 7, day, hour, 0, 0).unwrap();
        let mut event = EventDraft::placeholder(start, "family");
        event.summary = summary.to_string();
        event.end_time = start + Duration::hours(1);
        event
    }

    #[test]
    fn test_failure_message_is_untouched() {
        let command = Command::new(Action::Create, "add", 0.9);
        let result = ActionResult::failure("Nope", "boom");
        let response = synthesize(&command, &result);
        assert!(!response.success);
        assert_eq!(response.message, "Nope");
    }

    #[test]
    fn test_create_gets_marker() {
        let command = Command::new(Action::Create, "add", 0.9).with_event(event("Dentist", 17, 14));
        let result = ActionResult::success("Event 'Dentist' created successfully");
        let response = synthesize(&command, &result);
        assert_eq!(response.message, "✅ Event 'Dentist' created successfully");
        assert!(response.suggestions.is_empty());
    }

    #[test]
    fn test_read_messages() {
        let command = Command::new(Action::Read, "what's up", 0.9);

        let none = ActionResult::success("Found 0 events").with_events(vec![]);
        assert_eq!(
            synthesize(&command, &none).message,
            "📅 No events found for the specified time period."
        );

        let one = ActionResult::success("Found 1 events").with_events(vec![event("Swim", 17, 14)]);
        assert_eq!(
            synthesize(&command, &one).message,
            "📅 Found 1 event: Swim on July 17 at 02:00 PM"
        );
    }

    #[test]
    fn test_read_lists_first_five() {
        let events: Vec<EventDraft> = (1..=7)
            .map(|day| event(&format!("Event {}", day), day, 9))
            .collect();
        let command = Command::new(Action::List, "list", 0.9);
        let result = ActionResult::success("Found 7 events").with_events(events);

        let message = synthesize(&command, &result).message;
        let lines: Vec<&str> = message.lines().collect();
        assert_eq!(lines[0], "📅 Found 7 events:");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "• Event 1 - July 01 at 09:00 AM");
        assert!(!message.contains("Event 6"));
    }

    #[test]
    fn test_suggestions() {
        let low = Command::new(Action::Create, "hmm", 0.3);
        let suggestions = synthesize(&low, &ActionResult::failure("x", "y")).suggestions;
        assert_eq!(suggestions.len(), 4);
        assert_eq!(suggestions[0], "Try being more specific about the event details");
        assert_eq!(suggestions[2], "Try: 'Schedule a meeting tomorrow at 2pm'");
        assert_eq!(suggestions[3], "Try: 'Add dentist appointment on Friday at 3pm'");

        let read = Command::new(Action::Read, "what's on", 0.9);
        let suggestions = synthesize(&read, &ActionResult::success("ok")).suggestions;
        assert_eq!(
            suggestions,
            vec![
                "Try: 'What's on my calendar tomorrow?'".to_string(),
                "Try: 'Show my events this week'".to_string()
            ]
        );

        let delete = Command::new(Action::Delete, "delete it", 0.95);
        assert!(synthesize(&delete, &ActionResult::success("ok")).suggestions.is_empty());
    }
}
