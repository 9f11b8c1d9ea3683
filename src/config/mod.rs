//! Configuration management for the queue engine
//!
//! This module provides configuration structures and environment
//! variable loading for all engine components.

pub mod app;
pub mod board;
pub mod rules;

pub use app::{AppConfig, ServiceSettings};
pub use board::BoardSettings;
pub use rules::QueueRules;
