pub mod heuristic;
pub mod models;
pub mod prompt;
pub mod resolver;
#[cfg(feature = "llm")]
pub mod rig_model;

pub use heuristic::HeuristicClassifier;
pub use models::{Action, Command, EventDraft, IntentPayload, RawEvent, ReminderOverride, ReminderSpec};
pub use prompt::PromptContext;
pub use resolver::{IntentModel, PrimaryIntentResolver};
#[cfg(feature = "llm")]
pub use rig_model::{LlmProvider, RigIntentModel};
