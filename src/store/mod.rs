//! Persistence adapter for leaders, challengers, and match rows
//!
//! This module defines the storage interface the engine runs against, with
//! an in-memory implementation used by tests and as the reference semantics
//! for a SQL-backed store. Implementations fail closed: every transport or
//! storage problem is returned as a [`StoreError`] value, never a panic
//! across the boundary.

pub mod memory;

pub use memory::InMemoryStore;

use crate::error::StoreError;
use crate::types::{Challenger, ChallengerId, Leader, MatchRow, MatchStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Storage interface consumed by the queue engine.
///
/// Each method is one parameterized query intent; the engine composes them
/// into multi-step operations under its per-leader lock.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Fetch a leader by id
    async fn get_leader(&self, leader_id: &str) -> Result<Option<Leader>, StoreError>;

    /// Fetch a challenger by id
    async fn get_challenger(&self, challenger_id: &str) -> Result<Option<Challenger>, StoreError>;

    /// Fetch every leader, used to seed the eligibility pools at startup
    async fn all_leaders(&self) -> Result<Vec<Leader>, StoreError>;

    /// Fetch every push-token registration, used to seed the token cache
    async fn all_push_tokens(&self) -> Result<HashMap<ChallengerId, Vec<String>>, StoreError>;

    /// Count `InQueue` rows for a leader
    async fn count_in_queue(&self, leader_id: &str) -> Result<usize, StoreError>;

    /// Count active rows for a challenger across all leaders
    async fn count_active_for_challenger(&self, challenger_id: &str)
        -> Result<usize, StoreError>;

    /// Fetch the challenger's active row against a leader, if any
    async fn active_row(
        &self,
        leader_id: &str,
        challenger_id: &str,
    ) -> Result<Option<MatchRow>, StoreError>;

    /// Whether the challenger already holds a `Win` row against the leader
    async fn has_badge_win(&self, leader_id: &str, challenger_id: &str)
        -> Result<bool, StoreError>;

    /// `InQueue` rows for a leader, ascending by timestamp (serving order)
    async fn queue_entries(&self, leader_id: &str) -> Result<Vec<MatchRow>, StoreError>;

    /// Resolved rows counting toward the challenger's badges and emblems
    async fn resolved_matches(&self, challenger_id: &str) -> Result<Vec<MatchRow>, StoreError>;

    /// Insert a new match row
    async fn insert_match(&self, row: MatchRow) -> Result<(), StoreError>;

    /// Delete the challenger's active row against a leader; returns rows affected
    async fn delete_active(&self, leader_id: &str, challenger_id: &str)
        -> Result<u64, StoreError>;

    /// Transition the challenger's row from one of `from` to `to`, optionally
    /// rewriting its timestamp; returns rows affected
    async fn update_status(
        &self,
        leader_id: &str,
        challenger_id: &str,
        from: &[MatchStatus],
        to: MatchStatus,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<u64, StoreError>;

    /// Resolve the targeted `InQueue` rows to a final status; returns rows affected
    async fn resolve_matches(
        &self,
        leader_id: &str,
        challenger_ids: &[ChallengerId],
        status: MatchStatus,
    ) -> Result<u64, StoreError>;

    /// Persist a challenger's flat bingo board
    async fn set_challenger_board(&self, challenger_id: &str, board: &str)
        -> Result<(), StoreError>;
}
