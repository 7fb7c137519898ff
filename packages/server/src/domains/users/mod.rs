//! Users domain - review authors and approvers

pub mod models;

// Re-export commonly used types
pub use models::{CreateUser, User};
