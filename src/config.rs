use crate::error::{config_error, AgentResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;

/// Default reference timezone for resolving dates
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

/// Calendar id given to events that don't name one
pub const DEFAULT_CALENDAR_ID: &str = "family";

/// Default number of events fetched per query
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// File holding calendar alias overrides
pub const CALENDAR_ALIASES_PATH: &str = "config/calendars.toml";

/// Main configuration structure for the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA timezone all resolved dates are expressed in
    pub timezone: String,
    /// Calendar id given to events without an explicit calendar
    pub default_calendar_id: String,
    /// Google Calendar used for inserts and searches
    pub google_calendar_id: String,
    /// Google Calendar API client ID
    pub google_client_id: String,
    /// Google Calendar API client secret
    pub google_client_secret: String,
    /// Where the OAuth token is stored
    pub google_token_path: String,
    /// LLM provider name ("gemini" or "openai")
    pub llm_provider: String,
    /// LLM API key; without one the heuristic classifier is used
    pub llm_api_key: Option<String>,
    /// LLM model name
    pub llm_model: String,
    /// Maximum number of events fetched per query
    pub max_results: usize,
    /// Locale for user-facing messages
    pub bot_locale: String,
    /// Friendly calendar names mapped to Google calendar ids
    pub calendar_aliases: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            default_calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            google_calendar_id: "primary".to_string(),
            google_client_id: String::new(),
            google_client_secret: String::new(),
            google_token_path: "token.json".to_string(),
            llm_provider: "gemini".to_string(),
            llm_api_key: None,
            llm_model: "gemini-2.0-flash".to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            bot_locale: "en".to_string(),
            calendar_aliases: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AgentResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Config::default();

        let timezone = env::var("TIMEZONE").unwrap_or(defaults.timezone);
        let default_calendar_id =
            env::var("DEFAULT_CALENDAR_ID").unwrap_or(defaults.default_calendar_id);
        let google_calendar_id =
            env::var("GOOGLE_CALENDAR_ID").unwrap_or(defaults.google_calendar_id);
        let google_client_id = env::var("GOOGLE_CLIENT_ID").unwrap_or_default();
        let google_client_secret = env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default();
        let google_token_path =
            env::var("GOOGLE_TOKEN_PATH").unwrap_or(defaults.google_token_path);

        let llm_provider = env::var("LLM_PROVIDER")
            .unwrap_or(defaults.llm_provider)
            .to_lowercase();

        // Provider specific key names are accepted as a fallback
        let llm_api_key = env::var("LLM_API_KEY")
            .or_else(|_| match llm_provider.as_str() {
                "openai" => env::var("OPENAI_API_KEY"),
                _ => env::var("GEMINI_API_KEY"),
            })
            .ok()
            .filter(|key| !key.trim().is_empty());

        let llm_model = env::var("LLM_MODEL").unwrap_or_else(|_| match llm_provider.as_str() {
            "openai" => "gpt-4o".to_string(),
            _ => defaults.llm_model.clone(),
        });

        let max_results = match env::var("MAX_RESULTS") {
            Ok(value) => value
                .parse::<usize>()
                .map_err(|_| config_error("Invalid MAX_RESULTS format"))?,
            Err(_) => defaults.max_results,
        };

        let bot_locale = env::var("BOT_LOCALE").unwrap_or(defaults.bot_locale);

        // Load calendar aliases from file if it exists
        let mut calendar_aliases = HashMap::new();
        if let Ok(content) = fs::read_to_string(CALENDAR_ALIASES_PATH) {
            calendar_aliases = toml::from_str::<HashMap<String, String>>(&content)?;
        }

        let config = Config {
            timezone,
            default_calendar_id,
            google_calendar_id,
            google_client_id,
            google_client_secret,
            google_token_path,
            llm_provider,
            llm_api_key,
            llm_model,
            max_results,
            bot_locale,
            calendar_aliases,
        };

        // Fail early on an unknown timezone
        config.tz()?;

        Ok(config)
    }

    /// Parse the configured timezone
    pub fn tz(&self) -> AgentResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid timezone: {}", self.timezone)))
    }

    /// Map a requested calendar (or the configured one) to a Google calendar id
    pub fn resolve_calendar_id(&self, requested: Option<&str>) -> String {
        let calendar = requested
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(self.google_calendar_id.as_str());

        self.calendar_aliases
            .get(&calendar.to_lowercase())
            .cloned()
            .unwrap_or_else(|| calendar.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timezone_parses() {
        let config = Config::default();
        assert_eq!(config.tz().unwrap(), chrono_tz::America::Chicago);
    }

    #[test]
    fn test_invalid_timezone() {
        let config = Config {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Config::default()
        };
        assert!(config.tz().is_err());
    }

    #[test]
    fn test_resolve_calendar_id() {
        let mut config = Config::default();
        config.calendar_aliases.insert(
            "family".to_string(),
            "family123@group.calendar.google.com".to_string(),
        );

        // Alias lookup is case insensitive
        assert_eq!(
            config.resolve_calendar_id(Some("Family")),
            "family123@group.calendar.google.com"
        );
        // Unknown names pass through
        assert_eq!(config.resolve_calendar_id(Some("work")), "work");
        // Missing or blank falls back to the configured calendar
        assert_eq!(config.resolve_calendar_id(None), "primary");
        assert_eq!(config.resolve_calendar_id(Some("  ")), "primary");
    }
}
