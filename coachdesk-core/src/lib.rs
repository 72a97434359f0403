pub mod config;
pub mod desk;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod planner;
pub mod thumbnail;

pub use desk::CoachDesk;
pub use errors::GenerationError;
pub use planner::{LlmPlanRequester, PlanGenerator};
pub use thumbnail::youtube_thumbnail;
