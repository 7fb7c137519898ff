//! Reviews domain - user reviews of points of sale and their approval workflow

pub mod approval;
pub mod data;
pub mod engine;
pub mod errors;
pub mod models;
pub mod routes;

// Re-export commonly used types
pub use approval::{with_approval_status, ApprovalConfig};
pub use data::{ReviewData, ReviewInput};
pub use engine::ReviewRuleEngine;
pub use errors::{Reference, ReviewError};
pub use models::Review;
