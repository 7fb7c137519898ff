//! Points of sale - looked up by reviews for existence checks

pub mod models;

// Re-export commonly used types
pub use models::{CreatePos, Pos};
