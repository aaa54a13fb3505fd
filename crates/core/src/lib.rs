pub mod intent;
pub mod models;
pub mod planner;

pub use intent::extract_intent;
pub use models::*;
pub use planner::{compose_reply, follow_up_question};
