//! Google Calendar backed [`CalendarStore`](crate::components::calendar_store::CalendarStore).

mod actor;
mod handle;
pub mod models;
pub mod token;

pub use actor::{events_url, API_BASE};
pub use handle::GoogleCalendarHandle;
pub use token::{StoredToken, TokenManager};
