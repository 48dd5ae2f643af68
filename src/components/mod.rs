// Export components
pub mod calendar_store;
pub mod google_calendar;
pub mod intent;
pub mod orchestrator;
pub mod response;

pub use calendar_store::CalendarStore;
// Re-export Google Calendar handle
pub use google_calendar::GoogleCalendarHandle;
pub use orchestrator::{ActionOrchestrator, ActionResult};
pub use response::{synthesize, Response};
