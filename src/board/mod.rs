//! Bingo board generation and inflation
//!
//! Each challenger carries a personalized grid of opponent ids stored as a
//! flat comma-separated string. Generation draws from the eligibility
//! pools; inflation turns the flat string back into a grid and marks which
//! opponents the challenger has already earned a badge from.

pub mod generator;

pub use generator::{generate, inflate, BoardGrid, FREE_SPACE};
