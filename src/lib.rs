#[macro_use]
extern crate rust_i18n;

pub mod agent;
pub mod components;
pub mod config;
pub mod error;
pub mod utils;

pub use agent::CalendarAgent;

// Initialize i18n
i18n!("locales", fallback = "en");
