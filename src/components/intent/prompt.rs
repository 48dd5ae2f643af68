use chrono::{DateTime, Datelike, Duration, NaiveDate, Weekday};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use schemars::schema_for;

use super::models::IntentPayload;

lazy_static! {
    /// JSON schema of the reply the model must produce
    static ref PAYLOAD_SCHEMA: String = serde_json::to_string_pretty(&schema_for!(IntentPayload))
        .unwrap_or_default();
}

const BASE_PROMPT: &str = "You are a positive, helpful and friendly assistant that manages a family calendar. \
You convert natural language commands into structured calendar actions.

Your task is to:
1. Identify the intended action (create, update, delete, read, list)
2. Extract event details (title, date/time, location, attendees, description, calendar, reminders)
3. Return one entry in `events` per event when the user asks for several
4. Reply with a single JSON object and nothing else

Distinguish CREATE from READ:
- CREATE: the user wants to add or schedule a new event (schedule, add, create, book, set up, arrange, plan)
- READ: the user wants to see existing events (what, show, list, check, see, tell me, events, appointments, meetings, my schedule)

If a read asks about a specific day (\"on July 17th\", \"tomorrow\", \"next Friday\"), return one event whose \
start_time and end_time cover that whole day (00:00:00 to 23:59:59). For periods such as \"this week\", \
\"next week\" or \"this month\", leave `events` empty and put the period in `query`.

If the same event is requested on several dates, create a separate event for each date.

Calendar names: \"family calendar\" or \"shared family calendar\" -> \"family\", \"work calendar\" -> \"work\".
Reminders: \"remind me 2 hours before\" -> [{\"method\": \"popup\", \"minutes\": 120}], \
\"email reminder 1 day before\" -> [{\"method\": \"email\", \"minutes\": 1440}].
Times are local wall-clock times in YYYY-MM-DDTHH:MM:SS format without an offset.

The reply must match this JSON schema:
";

/// Reference dates handed to the model so it never derives them itself
#[derive(Debug, Clone)]
pub struct PromptContext {
    now: DateTime<Tz>,
}

impl PromptContext {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self { now }
    }

    /// Full system prompt: instructions, payload schema and date context
    pub fn system_prompt(&self) -> String {
        format!("{}{}\n{}", BASE_PROMPT, *PAYLOAD_SCHEMA, self.date_context())
    }

    /// User message for an utterance
    pub fn user_prompt(&self, utterance: &str) -> String {
        format!("Process this command: {}", utterance)
    }

    /// Concrete dates for the relative words the model is likely to meet
    pub fn date_context(&self) -> String {
        let today = self.now.date_naive();
        let day = |date: NaiveDate| date.format("%Y-%m-%d").to_string();

        let mut context = format!(
            "\nCURRENT DATE AND TIME: {} at {} ({}), timezone {}\n\n\
            When resolving relative dates, use this as the reference point:\n\
            - \"today\" = {}\n\
            - \"tomorrow\" = {}\n\
            - \"yesterday\" = {}\n\
            - \"next week\" = {}\n\n\
            For weekday references, use these EXACT dates:\n",
            day(today),
            self.now.format("%H:%M:%S"),
            today.format("%A"),
            self.now.timezone().name(),
            day(today),
            day(today + Duration::days(1)),
            day(today - Duration::days(1)),
            day(today + Duration::days(7)),
        );

        for (weekday, date) in upcoming_weekdays(today) {
            context.push_str(&format!("- \"{}\" = {}\n", weekday_name(weekday), day(date)));
        }

        context.push_str(
            "\nUse the EXACT dates listed above. Do not calculate them yourself.\n",
        );
        context
    }
}

/// Next occurrence of every weekday, strictly after `today`, Monday first
pub fn upcoming_weekdays(today: NaiveDate) -> [(Weekday, NaiveDate); 7] {
    let current = today.weekday().num_days_from_monday() as i64;
    std::array::from_fn(|index| {
        let mut days_ahead = index as i64 - current;
        if days_ahead <= 0 {
            days_ahead += 7;
        }
        let date = today + Duration::days(days_ahead);
        (date.weekday(), date)
    })
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
