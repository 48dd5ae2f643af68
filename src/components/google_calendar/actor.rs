use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use super::models::{ApiEvent, CalendarList, EventBody, EventList};
use super::token::TokenManager;
use crate::components::intent::EventDraft;
use crate::config::Config;
use crate::error::{calendar_store_error, AgentResult};

pub const API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Window used when a query gives no bounds
const DEFAULT_WINDOW_DAYS: i64 = 7;

type Reply<T> = mpsc::Sender<AgentResult<T>>;

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    Create {
        event: EventDraft,
        respond_to: Reply<String>,
    },
    Query {
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        max_results: usize,
        respond_to: Reply<Vec<EventDraft>>,
    },
    List {
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        max_results: usize,
        respond_to: Reply<Vec<EventDraft>>,
    },
    Search {
        text: String,
        max_results: usize,
        respond_to: Reply<Vec<EventDraft>>,
    },
    Update {
        event_id: String,
        event: EventDraft,
        respond_to: Reply<String>,
    },
    Delete {
        event_id: String,
        respond_to: Reply<()>,
    },
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> GoogleCalendarCommand,
    ) -> AgentResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(build(response_tx))
            .await
            .map_err(|e| calendar_store_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| calendar_store_error("Response channel closed"))?
    }

    pub async fn create_event(&self, event: EventDraft) -> AgentResult<String> {
        self.request(|respond_to| GoogleCalendarCommand::Create { event, respond_to })
            .await
    }

    pub async fn query_events(
        &self,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        max_results: usize,
    ) -> AgentResult<Vec<EventDraft>> {
        self.request(|respond_to| GoogleCalendarCommand::Query {
            start,
            end,
            max_results,
            respond_to,
        })
        .await
    }

    pub async fn list_events(
        &self,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        max_results: usize,
    ) -> AgentResult<Vec<EventDraft>> {
        self.request(|respond_to| GoogleCalendarCommand::List {
            start,
            end,
            max_results,
            respond_to,
        })
        .await
    }

    pub async fn search_events(&self, text: String, max_results: usize) -> AgentResult<Vec<EventDraft>> {
        self.request(|respond_to| GoogleCalendarCommand::Search {
            text,
            max_results,
            respond_to,
        })
        .await
    }

    pub async fn update_event(&self, event_id: String, event: EventDraft) -> AgentResult<String> {
        self.request(|respond_to| GoogleCalendarCommand::Update {
            event_id,
            event,
            respond_to,
        })
        .await
    }

    pub async fn delete_event(&self, event_id: String) -> AgentResult<()> {
        self.request(|respond_to| GoogleCalendarCommand::Delete {
            event_id,
            respond_to,
        })
        .await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AgentResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

/// Everything a single API call needs; cloned into each request task
#[derive(Clone)]
struct CalendarApi {
    config: Arc<Config>,
    tz: Tz,
    token_manager: TokenManager,
    client: Client,
}

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    api: CalendarApi,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(config: Arc<Config>) -> AgentResult<(Self, GoogleCalendarActorHandle)> {
        let (command_tx, command_rx) = mpsc::channel(32);
        let client = Client::new();

        let api = CalendarApi {
            tz: config.tz()?,
            token_manager: TokenManager::new(
                config.google_token_path.clone(),
                config.google_client_id.clone(),
                config.google_client_secret.clone(),
                client.clone(),
            ),
            client,
            config,
        };

        Ok((Self { api, command_rx }, GoogleCalendarActorHandle { command_tx }))
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            if let GoogleCalendarCommand::Shutdown = cmd {
                info!("Google Calendar actor shutting down");
                break;
            }

            // Requests run independently so concurrent submissions overlap
            let api = self.api.clone();
            tokio::spawn(async move { api.handle(cmd).await });
        }

        info!("Google Calendar actor shut down");
    }
}

impl CalendarApi {
    async fn handle(&self, cmd: GoogleCalendarCommand) {
        match cmd {
            GoogleCalendarCommand::Create { event, respond_to } => {
                let _ = respond_to.send(self.create_event(&event).await).await;
            }
            GoogleCalendarCommand::Query {
                start,
                end,
                max_results,
                respond_to,
            } => {
                let _ = respond_to
                    .send(self.query_all_calendars(start, end, max_results).await)
                    .await;
            }
            GoogleCalendarCommand::List {
                start,
                end,
                max_results,
                respond_to,
            } => {
                let _ = respond_to
                    .send(self.query_configured_calendar(start, end, max_results).await)
                    .await;
            }
            GoogleCalendarCommand::Search {
                text,
                max_results,
                respond_to,
            } => {
                let _ = respond_to.send(self.search_events(&text, max_results).await).await;
            }
            GoogleCalendarCommand::Update {
                event_id,
                event,
                respond_to,
            } => {
                let _ = respond_to.send(self.update_event(&event_id, &event).await).await;
            }
            GoogleCalendarCommand::Delete {
                event_id,
                respond_to,
            } => {
                let _ = respond_to.send(self.delete_event(&event_id).await).await;
            }
            GoogleCalendarCommand::Shutdown => {}
        }
    }

    async fn create_event(&self, event: &EventDraft) -> AgentResult<String> {
        let calendar_id = self.config.resolve_calendar_id(event.calendar_id.as_deref());
        let mut url = events_url(&calendar_id, None)?;
        url.query_pairs_mut().append_pair("sendUpdates", "all");

        debug!("Creating '{}' in calendar {}", event.summary, calendar_id);
        let token = self.token_manager.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&EventBody::from(event))
            .send()
            .await
            .map_err(|e| calendar_store_error(&format!("Failed to create event: {}", e)))?;

        let created: ApiEvent = check(response, "create event")
            .await?
            .json()
            .await
            .map_err(|e| calendar_store_error(&format!("Failed to parse created event: {}", e)))?;

        info!("Created event {} in calendar {}", created.id, calendar_id);
        Ok(created.id)
    }

    /// Merge events from every calendar the user can see
    async fn query_all_calendars(
        &self,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        max_results: usize,
    ) -> AgentResult<Vec<EventDraft>> {
        let (start, end) = self.window(start, end);

        let mut calendar_ids = self.calendar_ids().await?;
        if calendar_ids.is_empty() {
            calendar_ids.push(self.config.google_calendar_id.clone());
        }

        let mut results = Vec::with_capacity(calendar_ids.len());
        for calendar_id in calendar_ids {
            let url = window_url(&calendar_id, start, end, max_results)?;
            let found = self.list_events(url, &calendar_id).await;
            results.push((calendar_id, found));
        }

        merge_calendar_results(results)
    }

    /// Events from the configured calendar only
    async fn query_configured_calendar(
        &self,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        max_results: usize,
    ) -> AgentResult<Vec<EventDraft>> {
        let (start, end) = self.window(start, end);
        let calendar_id = self.config.resolve_calendar_id(None);
        let url = window_url(&calendar_id, start, end, max_results)?;
        self.list_events(url, &calendar_id).await
    }

    fn window(
        &self,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
    ) -> (DateTime<Tz>, DateTime<Tz>) {
        let start = start.unwrap_or_else(|| Utc::now().with_timezone(&self.tz));
        let end = end.unwrap_or(start + Duration::days(DEFAULT_WINDOW_DAYS));
        (start, end)
    }

    async fn search_events(&self, text: &str, max_results: usize) -> AgentResult<Vec<EventDraft>> {
        let calendar_id = self.config.resolve_calendar_id(None);
        let mut url = events_url(&calendar_id, None)?;
        url.query_pairs_mut()
            .append_pair("q", text)
            .append_pair("timeMin", &Utc::now().to_rfc3339())
            .append_pair("maxResults", &max_results.to_string())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        self.list_events(url, &calendar_id).await
    }

    async fn update_event(&self, event_id: &str, event: &EventDraft) -> AgentResult<String> {
        let calendar_id = self.config.resolve_calendar_id(event.calendar_id.as_deref());
        let mut url = events_url(&calendar_id, Some(event_id))?;
        url.query_pairs_mut().append_pair("sendUpdates", "all");

        let token = self.token_manager.access_token().await?;
        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&EventBody::from(event))
            .send()
            .await
            .map_err(|e| calendar_store_error(&format!("Failed to update event: {}", e)))?;

        let updated: ApiEvent = check(response, "update event")
            .await?
            .json()
            .await
            .map_err(|e| calendar_store_error(&format!("Failed to parse updated event: {}", e)))?;

        Ok(updated.id)
    }

    async fn delete_event(&self, event_id: &str) -> AgentResult<()> {
        let calendar_id = self.config.resolve_calendar_id(None);
        let mut url = events_url(&calendar_id, Some(event_id))?;
        url.query_pairs_mut().append_pair("sendUpdates", "all");

        let token = self.token_manager.access_token().await?;
        let response = self
            .client
            .delete(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| calendar_store_error(&format!("Failed to delete event: {}", e)))?;

        check(response, "delete event").await?;
        Ok(())
    }

    async fn calendar_ids(&self) -> AgentResult<Vec<String>> {
        let url = format!("{}/users/me/calendarList", API_BASE);
        let token = self.token_manager.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| calendar_store_error(&format!("Failed to list calendars: {}", e)))?;

        let list: CalendarList = check(response, "list calendars")
            .await?
            .json()
            .await
            .map_err(|e| calendar_store_error(&format!("Failed to parse calendar list: {}", e)))?;

        Ok(list.items.into_iter().map(|entry| entry.id).collect())
    }

    async fn list_events(&self, url: Url, calendar_id: &str) -> AgentResult<Vec<EventDraft>> {
        let token = self.token_manager.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| calendar_store_error(&format!("Failed to fetch events: {}", e)))?;

        let list: EventList = check(response, "fetch events")
            .await?
            .json()
            .await
            .map_err(|e| calendar_store_error(&format!("Failed to parse events response: {}", e)))?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|event| event.into_draft(&self.tz, calendar_id))
            .collect())
    }
}

/// Combine per-calendar results, sorted by start.
///
/// Unreadable calendars are skipped as long as one calendar was read;
/// when none was, the last error is returned.
fn merge_calendar_results(
    results: Vec<(String, AgentResult<Vec<EventDraft>>)>,
) -> AgentResult<Vec<EventDraft>> {
    let mut events = Vec::new();
    let mut read_any = false;
    let mut last_error = None;

    for (calendar_id, result) in results {
        match result {
            Ok(mut found) => {
                read_any = true;
                events.append(&mut found);
            }
            Err(e) => {
                warn!("Skipping calendar {}: {}", calendar_id, e);
                last_error = Some(e);
            }
        }
    }

    if let (false, Some(e)) = (read_any, last_error) {
        return Err(e);
    }

    events.sort_by_key(|event| event.start_time);
    Ok(events)
}

/// Events URL limited to `start..end`, expanded to single instances
fn window_url(
    calendar_id: &str,
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    max_results: usize,
) -> AgentResult<Url> {
    let mut url = events_url(calendar_id, None)?;
    url.query_pairs_mut()
        .append_pair("timeMin", &start.to_rfc3339())
        .append_pair("timeMax", &end.to_rfc3339())
        .append_pair("maxResults", &max_results.to_string())
        .append_pair("singleEvents", "true")
        .append_pair("orderBy", "startTime");
    Ok(url)
}

/// `.../calendars/{calendar_id}/events[/{event_id}]` with both ids escaped
pub fn events_url(calendar_id: &str, event_id: Option<&str>) -> AgentResult<Url> {
    let mut url = Url::parse(API_BASE)
        .map_err(|e| calendar_store_error(&format!("Failed to parse URL: {}", e)))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| calendar_store_error("Calendar API URL cannot be a base"))?;
        segments.extend(["calendars", calendar_id, "events"]);
        if let Some(event_id) = event_id {
            segments.push(event_id);
        }
    }
    Ok(url)
}

async fn check(response: Response, what: &str) -> AgentResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return Err(calendar_store_error(&format!("Failed to {}: event not found", what)));
    }

    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());
    Err(calendar_store_error(&format!(
        "Failed to {}: HTTP {} - {}",
        what, status, error_body
    )))
}
