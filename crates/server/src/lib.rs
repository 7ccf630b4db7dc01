//! Server crate for the Filmorate catalog.
//!
//! This crate contains the service facade that coordinates the entity
//! store, the social relations and the query engines, plus loading a
//! catalog directory into it.

pub mod loader;
pub mod service;

pub use loader::LoadSummary;
pub use service::{DEFAULT_POPULAR_LIMIT, FilmorateService, ServiceStats};
