pub mod analyze;
pub mod compare;
pub mod health;
pub mod recommend;

pub use analyze::analyze_handler;
pub use compare::compare_handler;
pub use health::{health_handler, ready_handler};
pub use recommend::recommend_handler;
