// Business domains
pub mod pos;
pub mod reviews;
pub mod users;
