pub mod review;

pub use review::{ApproveQuery, ReviewData, ReviewFilterQuery, ReviewInput};
