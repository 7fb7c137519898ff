// Campus Coffee Reviews - API Core
//
// This crate provides the backend API for user reviews of points of sale and
// the multi-user approval workflow that publishes them.
// Architecture follows domain-driven design with trait-injected collaborators.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
