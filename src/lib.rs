//! Rally Queue - queue/matchmaking engine for badge rally check-in events
//!
//! This crate admits challengers into leaders' battle queues, enforces
//! eligibility and capacity rules, tracks ordering and hold/resume
//! semantics, assigns ephemeral pairing codes, and triggers "it's your
//! turn" notifications.

pub mod board;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{QueueError, Result};
pub use types::*;

// Re-export key components
pub use cache::Caches;
pub use engine::QueueEngine;
pub use notify::{MockNotifier, NotificationTrigger};
pub use store::{InMemoryStore, MatchStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
