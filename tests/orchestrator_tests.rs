mod common;

use calendar_agent::components::intent::{Action, Command, RawEvent};
use calendar_agent::components::ActionOrchestrator;
use calendar_agent::utils::time::{QueryView, TemporalResolver};
use chrono::{Duration, TimeZone, Timelike};
use chrono_tz::America::Chicago;
use common::{event, now, MockCalendarStore};
use std::sync::Arc;

fn orchestrator(store: &Arc<MockCalendarStore>) -> ActionOrchestrator {
    ActionOrchestrator::new(store.clone(), TemporalResolver::new(Chicago), 10)
}

fn raw(summary: &str, start: &str) -> RawEvent {
    RawEvent {
        summary: Some(summary.to_string()),
        start_time: Some(start.to_string()),
        ..RawEvent::default()
    }
}

#[tokio::test]
async fn test_create_single_event() {
    let store = Arc::new(MockCalendarStore::new());
    let command = Command::new(Action::Create, "dentist thursday", 0.9)
        .with_event(event("", "Dentist", 14, 14));

    let result = orchestrator(&store).execute_at(&command, now()).await;

    assert!(result.success);
    assert_eq!(result.message, "Event 'Dentist' created successfully");
    assert_eq!(result.event_id.as_deref(), Some("evt-1"));
    assert_eq!(store.created_summaries(), vec!["Dentist"]);
}

#[tokio::test]
async fn test_create_without_event_touches_nothing() {
    let store = Arc::new(MockCalendarStore::new());
    let command = Command::new(Action::Create, "add something", 0.3);

    let result = orchestrator(&store).execute_at(&command, now()).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Missing event details"));
    assert!(store.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_multiple_events() {
    let store = Arc::new(MockCalendarStore::new());
    let command = Command::new(Action::Create, "swim and piano", 0.95)
        .with_event(event("", "Tryouts", 14, 15))
        .with_additional_events(vec![
            raw("Swim", "2024-03-15T16:00:00"),
            raw("Piano", "2024-03-16T10:00:00"),
        ]);

    let result = orchestrator(&store).execute_at(&command, now()).await;

    assert!(result.success);
    assert_eq!(result.message, "Successfully created 3 events");
    assert_eq!(store.created_summaries(), vec!["Piano", "Swim", "Tryouts"]);

    // Additional events are normalized against the primary one
    let created = store.created.lock().unwrap();
    let piano = created.iter().find(|e| e.summary == "Piano").unwrap();
    assert_eq!(piano.start_time, Chicago.with_ymd_and_hms(2024, 3, 16, 10, 0, 0).unwrap());
    assert_eq!(piano.end_time, piano.start_time + Duration::hours(1));
    assert_eq!(piano.calendar_id.as_deref(), Some("family"));
}

#[tokio::test]
async fn test_create_partial_failure_keeps_created_events() {
    let store = Arc::new(MockCalendarStore::new().failing_on("Swim"));
    let command = Command::new(Action::Create, "three things", 0.95)
        .with_event(event("", "Tryouts", 14, 15))
        .with_additional_events(vec![
            raw("Swim", "2024-03-15T16:00:00"),
            raw("Piano", "2024-03-16T10:00:00"),
        ]);

    let result = orchestrator(&store).execute_at(&command, now()).await;

    assert!(!result.success);
    assert_eq!(
        result.message,
        "Created 2 out of 3 events. Some events failed to create."
    );
    assert_eq!(result.error.as_deref(), Some("Swim rejected"));
    assert_eq!(result.event_id.as_deref(), Some("evt-1"));
    // No rollback
    assert_eq!(store.created_summaries(), vec!["Piano", "Tryouts"]);
}

#[tokio::test]
async fn test_create_primary_failure_skips_the_rest() {
    let store = Arc::new(MockCalendarStore::new().failing_on("Tryouts"));
    let command = Command::new(Action::Create, "tryouts and swim", 0.95)
        .with_event(event("", "Tryouts", 14, 15))
        .with_additional_events(vec![raw("Swim", "2024-03-15T16:00:00")]);

    let result = orchestrator(&store).execute_at(&command, now()).await;

    assert!(!result.success);
    assert_eq!(result.message, "Failed to create event: Tryouts rejected");
    assert!(store.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_read_explicit_bounds_win_over_query() {
    let store = Arc::new(MockCalendarStore::new());
    let explicit = event("", "", 20, 8);
    let command = Command::new(Action::Read, "next week", 0.9)
        .with_event(explicit.clone())
        .with_query("next week");

    let result = orchestrator(&store).execute_at(&command, now()).await;

    assert!(result.success);
    let queries = store.queries.lock().unwrap();
    assert_eq!(
        queries.as_slice(),
        &[(Some(explicit.start_time), Some(explicit.end_time))]
    );
}

#[tokio::test]
async fn test_read_relative_query() {
    let store = Arc::new(MockCalendarStore::new().with_events(vec![
        event("b", "Swim", 19, 16),
        event("a", "Standup", 18, 9),
    ]));
    let command = Command::new(Action::Read, "what's on next week", 0.9).with_query("next week");

    let result = orchestrator(&store).execute_at(&command, now()).await;

    assert!(result.success);
    assert_eq!(result.message, "Found 2 events");

    let (start, end) = store.queries.lock().unwrap()[0];
    assert_eq!(start, Some(Chicago.with_ymd_and_hms(2024, 3, 18, 0, 0, 0).unwrap()));
    let end = end.unwrap();
    assert_eq!(end.date_naive().to_string(), "2024-03-24");
    assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));

    let range = result.range.unwrap();
    assert_eq!(range.view(), QueryView::Week);

    // Sorted by start time
    let events = result.events.unwrap();
    assert_eq!(events[0].summary, "Standup");
    assert_eq!(events[1].summary, "Swim");
}

#[tokio::test]
async fn test_read_free_text_query_searches() {
    let store = Arc::new(MockCalendarStore::new().with_events(vec![
        event("a", "Dentist", 14, 14),
        event("b", "Swim", 15, 16),
    ]));
    let command = Command::new(Action::Read, "when is the dentist", 0.9).with_query("dentist");

    let result = orchestrator(&store).execute_at(&command, now()).await;

    assert!(result.success);
    assert_eq!(result.message, "Found 1 events matching 'dentist'");
    assert_eq!(store.searches.lock().unwrap().as_slice(), &["dentist".to_string()]);
    assert!(store.queries.lock().unwrap().is_empty());
    assert!(result.range.is_none());
}

#[tokio::test]
async fn test_read_defaults_to_next_seven_days() {
    let store = Arc::new(MockCalendarStore::new());
    let command = Command::new(Action::Read, "anything coming up", 0.6);

    let result = orchestrator(&store).execute_at(&command, now()).await;

    assert!(result.success);
    assert_eq!(
        store.queries.lock().unwrap().as_slice(),
        &[(Some(now()), Some(now() + Duration::days(7)))]
    );
}

#[tokio::test]
async fn test_store_errors_are_passed_through() {
    let store = Arc::new(MockCalendarStore::new().unavailable("Calendar offline"));
    let command = Command::new(Action::Read, "today", 0.9).with_query("today");

    let result = orchestrator(&store).execute_at(&command, now()).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Calendar offline"));
    assert_eq!(result.message, "Failed to retrieve events: Calendar offline");
    assert_eq!(result.range.unwrap().view(), QueryView::Day);
}

#[tokio::test]
async fn test_update_and_delete_require_an_id() {
    let store = Arc::new(MockCalendarStore::new());
    let orchestrator = orchestrator(&store);

    let update = Command::new(Action::Update, "move my dentist", 0.9)
        .with_event(event("", "Dentist", 15, 9));
    let result = orchestrator.execute_at(&update, now()).await;
    assert!(!result.success);
    assert!(result.message.contains("ID"));
    assert_eq!(result.error.as_deref(), Some("Missing event ID"));

    let delete = Command::new(Action::Delete, "cancel swim", 0.9);
    let result = orchestrator.execute_at(&delete, now()).await;
    assert!(!result.success);
    assert!(result.message.contains("ID"));

    assert!(store.updated.lock().unwrap().is_empty());
    assert!(store.deleted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_and_delete_with_id() {
    let store = Arc::new(MockCalendarStore::new());
    let orchestrator = orchestrator(&store);

    let update = Command::new(Action::Update, "move it", 0.9)
        .with_event_id(Some("evt-9".to_string()))
        .with_event(event("", "Dentist", 15, 9));
    let result = orchestrator.execute_at(&update, now()).await;
    assert!(result.success);
    assert_eq!(result.message, "Event 'Dentist' updated successfully");
    assert_eq!(store.updated.lock().unwrap()[0].0, "evt-9");

    let delete = Command::new(Action::Delete, "delete it", 0.9)
        .with_event_id(Some("evt-9".to_string()));
    let result = orchestrator.execute_at(&delete, now()).await;
    assert!(result.success);
    assert_eq!(result.message, "Event deleted successfully");
    assert_eq!(store.deleted.lock().unwrap().as_slice(), &["evt-9".to_string()]);
}

#[tokio::test]
async fn test_list_reads_configured_calendar_only() {
    let store = Arc::new(MockCalendarStore::new().with_events(vec![
        event("b", "Swim", 15, 16),
        event("a", "Standup", 14, 9),
    ]));
    let command = Command::new(Action::List, "list", 0.9);

    let result = orchestrator(&store).execute_at(&command, now()).await;

    assert!(result.success);
    assert_eq!(result.message, "Found 2 events");
    assert_eq!(store.listings.lock().unwrap().as_slice(), &[(None, None)]);
    assert!(store.queries.lock().unwrap().is_empty());
    assert!(result.range.is_none());
    assert_eq!(result.events.unwrap()[0].summary, "Standup");
}

#[tokio::test]
async fn test_list_with_bounds_reports_store_errors() {
    let store = Arc::new(MockCalendarStore::new().unavailable("Token expired"));
    let bounds = event("", "", 18, 0);
    let command = Command::new(Action::List, "list", 0.9).with_event(bounds.clone());

    let result = orchestrator(&store).execute_at(&command, now()).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Token expired"));
    assert_eq!(
        store.listings.lock().unwrap().as_slice(),
        &[(Some(bounds.start_time), Some(bounds.end_time))]
    );
    assert!(result.range.is_some());
}
