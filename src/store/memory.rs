//! In-memory match store implementation

use crate::error::StoreError;
use crate::store::MatchStore;
use crate::types::{Challenger, ChallengerId, Leader, LeaderId, MatchRow, MatchStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage backed by `RwLock`ed maps.
///
/// Match rows live in insertion order; `queue_entries` sorts stably by
/// timestamp so equal timestamps keep their insertion order across reads.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    leaders: RwLock<HashMap<LeaderId, Leader>>,
    challengers: RwLock<HashMap<ChallengerId, Challenger>>,
    matches: RwLock<Vec<MatchRow>>,
    push_tokens: RwLock<HashMap<ChallengerId, Vec<String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a leader (setup helper, not part of the engine-facing interface)
    pub fn put_leader(&self, leader: Leader) {
        if let Ok(mut leaders) = self.leaders.write() {
            leaders.insert(leader.id.clone(), leader);
        }
    }

    /// Seed a challenger
    pub fn put_challenger(&self, challenger: Challenger) {
        if let Ok(mut challengers) = self.challengers.write() {
            challengers.insert(challenger.id.clone(), challenger);
        }
    }

    /// Seed a push-token registration
    pub fn put_push_token(&self, challenger_id: &str, token: &str) {
        if let Ok(mut tokens) = self.push_tokens.write() {
            tokens
                .entry(challenger_id.to_string())
                .or_default()
                .push(token.to_string());
        }
    }

    /// All rows for a leader regardless of status (debugging/tests)
    pub fn rows_for_leader(&self, leader_id: &str) -> Vec<MatchRow> {
        self.matches
            .read()
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.leader_id == leader_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn read_matches(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<MatchRow>>, StoreError> {
        self.matches
            .read()
            .map_err(|_| StoreError::new("failed to acquire matches read lock"))
    }

    fn write_matches(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<MatchRow>>, StoreError> {
        self.matches
            .write()
            .map_err(|_| StoreError::new("failed to acquire matches write lock"))
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn get_leader(&self, leader_id: &str) -> Result<Option<Leader>, StoreError> {
        let leaders = self
            .leaders
            .read()
            .map_err(|_| StoreError::new("failed to acquire leaders read lock"))?;
        Ok(leaders.get(leader_id).cloned())
    }

    async fn get_challenger(&self, challenger_id: &str) -> Result<Option<Challenger>, StoreError> {
        let challengers = self
            .challengers
            .read()
            .map_err(|_| StoreError::new("failed to acquire challengers read lock"))?;
        Ok(challengers.get(challenger_id).cloned())
    }

    async fn all_leaders(&self) -> Result<Vec<Leader>, StoreError> {
        let leaders = self
            .leaders
            .read()
            .map_err(|_| StoreError::new("failed to acquire leaders read lock"))?;
        Ok(leaders.values().cloned().collect())
    }

    async fn all_push_tokens(&self) -> Result<HashMap<ChallengerId, Vec<String>>, StoreError> {
        let tokens = self
            .push_tokens
            .read()
            .map_err(|_| StoreError::new("failed to acquire push tokens read lock"))?;
        Ok(tokens.clone())
    }

    async fn count_in_queue(&self, leader_id: &str) -> Result<usize, StoreError> {
        let rows = self.read_matches()?;
        Ok(rows
            .iter()
            .filter(|r| r.leader_id == leader_id && r.status == MatchStatus::InQueue)
            .count())
    }

    async fn count_active_for_challenger(
        &self,
        challenger_id: &str,
    ) -> Result<usize, StoreError> {
        let rows = self.read_matches()?;
        Ok(rows
            .iter()
            .filter(|r| r.challenger_id == challenger_id && r.status.is_active())
            .count())
    }

    async fn active_row(
        &self,
        leader_id: &str,
        challenger_id: &str,
    ) -> Result<Option<MatchRow>, StoreError> {
        let rows = self.read_matches()?;
        Ok(rows
            .iter()
            .find(|r| {
                r.leader_id == leader_id
                    && r.challenger_id == challenger_id
                    && r.status.is_active()
            })
            .cloned())
    }

    async fn has_badge_win(
        &self,
        leader_id: &str,
        challenger_id: &str,
    ) -> Result<bool, StoreError> {
        let rows = self.read_matches()?;
        Ok(rows.iter().any(|r| {
            r.leader_id == leader_id
                && r.challenger_id == challenger_id
                && r.status == MatchStatus::Win
        }))
    }

    async fn queue_entries(&self, leader_id: &str) -> Result<Vec<MatchRow>, StoreError> {
        let rows = self.read_matches()?;
        let mut entries: Vec<MatchRow> = rows
            .iter()
            .filter(|r| r.leader_id == leader_id && r.status == MatchStatus::InQueue)
            .cloned()
            .collect();
        // Stable sort: ties keep insertion order
        entries.sort_by_key(|r| r.timestamp);
        Ok(entries)
    }

    async fn resolved_matches(&self, challenger_id: &str) -> Result<Vec<MatchRow>, StoreError> {
        let rows = self.read_matches()?;
        Ok(rows
            .iter()
            .filter(|r| r.challenger_id == challenger_id && r.status.counts_as_badge())
            .cloned()
            .collect())
    }

    async fn insert_match(&self, row: MatchRow) -> Result<(), StoreError> {
        let mut rows = self.write_matches()?;
        rows.push(row);
        Ok(())
    }

    async fn delete_active(
        &self,
        leader_id: &str,
        challenger_id: &str,
    ) -> Result<u64, StoreError> {
        let mut rows = self.write_matches()?;
        let before = rows.len();
        rows.retain(|r| {
            !(r.leader_id == leader_id
                && r.challenger_id == challenger_id
                && r.status.is_active())
        });
        Ok((before - rows.len()) as u64)
    }

    async fn update_status(
        &self,
        leader_id: &str,
        challenger_id: &str,
        from: &[MatchStatus],
        to: MatchStatus,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<u64, StoreError> {
        let mut rows = self.write_matches()?;
        let mut affected = 0;
        for row in rows.iter_mut() {
            if row.leader_id == leader_id
                && row.challenger_id == challenger_id
                && from.contains(&row.status)
            {
                row.status = to;
                if let Some(ts) = timestamp {
                    row.timestamp = ts;
                }
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn resolve_matches(
        &self,
        leader_id: &str,
        challenger_ids: &[ChallengerId],
        status: MatchStatus,
    ) -> Result<u64, StoreError> {
        let mut rows = self.write_matches()?;
        let mut affected = 0;
        for row in rows.iter_mut() {
            if row.leader_id == leader_id
                && row.status == MatchStatus::InQueue
                && challenger_ids.contains(&row.challenger_id)
            {
                row.status = status;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn set_challenger_board(
        &self,
        challenger_id: &str,
        board: &str,
    ) -> Result<(), StoreError> {
        let mut challengers = self
            .challengers
            .write()
            .map_err(|_| StoreError::new("failed to acquire challengers write lock"))?;
        let challenger = challengers
            .get_mut(challenger_id)
            .ok_or_else(|| StoreError::new(format!("no such challenger: {}", challenger_id)))?;
        challenger.board = Some(board.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BattleFormat, LeaderClass};
    use crate::utils::current_timestamp;

    fn test_leader(id: &str) -> Leader {
        Leader {
            id: id.to_string(),
            name: format!("Leader {}", id),
            class: LeaderClass::VETERAN,
            format: BattleFormat::SINGLES,
            queue_open: true,
            duo_mode: false,
            link_code: None,
        }
    }

    fn test_row(leader: &str, challenger: &str, status: MatchStatus) -> MatchRow {
        MatchRow {
            leader_id: leader.to_string(),
            challenger_id: challenger.to_string(),
            battle_difficulty: LeaderClass::VETERAN,
            battle_format: BattleFormat::SINGLES,
            status,
            timestamp: current_timestamp(),
        }
    }

    #[tokio::test]
    async fn test_leader_round_trip() {
        let store = InMemoryStore::new();
        assert!(store.get_leader("l1").await.unwrap().is_none());

        store.put_leader(test_leader("l1"));
        let fetched = store.get_leader("l1").await.unwrap().unwrap();
        assert_eq!(fetched.id, "l1");
        assert_eq!(store.all_leaders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_queue_entries_ordered_by_timestamp() {
        let store = InMemoryStore::new();
        for name in ["c1", "c2", "c3"] {
            store
                .insert_match(test_row("l1", name, MatchStatus::InQueue))
                .await
                .unwrap();
        }

        let entries = store.queue_entries("l1").await.unwrap();
        let order: Vec<&str> = entries.iter().map(|r| r.challenger_id.as_str()).collect();
        assert_eq!(order, vec!["c1", "c2", "c3"]);

        // Repeated reads never change relative order
        let again = store.queue_entries("l1").await.unwrap();
        let order_again: Vec<&str> = again.iter().map(|r| r.challenger_id.as_str()).collect();
        assert_eq!(order, order_again);
    }

    #[tokio::test]
    async fn test_active_counts_and_lookup() {
        let store = InMemoryStore::new();
        store
            .insert_match(test_row("l1", "c1", MatchStatus::InQueue))
            .await
            .unwrap();
        store
            .insert_match(test_row("l2", "c1", MatchStatus::OnHold))
            .await
            .unwrap();
        store
            .insert_match(test_row("l3", "c1", MatchStatus::Loss))
            .await
            .unwrap();

        assert_eq!(store.count_in_queue("l1").await.unwrap(), 1);
        assert_eq!(store.count_in_queue("l2").await.unwrap(), 0);
        assert_eq!(store.count_active_for_challenger("c1").await.unwrap(), 2);
        assert!(store.active_row("l2", "c1").await.unwrap().is_some());
        assert!(store.active_row("l3", "c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_active_leaves_history() {
        let store = InMemoryStore::new();
        store
            .insert_match(test_row("l1", "c1", MatchStatus::InQueue))
            .await
            .unwrap();
        store
            .insert_match(test_row("l1", "c1", MatchStatus::Win))
            .await
            .unwrap();

        assert_eq!(store.delete_active("l1", "c1").await.unwrap(), 1);
        assert_eq!(store.delete_active("l1", "c1").await.unwrap(), 0);
        // The resolved row survives
        assert!(store.has_badge_win("l1", "c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_status_filters_on_from() {
        let store = InMemoryStore::new();
        store
            .insert_match(test_row("l1", "c1", MatchStatus::InQueue))
            .await
            .unwrap();

        // Wrong source status matches nothing
        let affected = store
            .update_status("l1", "c1", &[MatchStatus::OnHold], MatchStatus::InQueue, None)
            .await
            .unwrap();
        assert_eq!(affected, 0);

        let affected = store
            .update_status("l1", "c1", &[MatchStatus::InQueue], MatchStatus::OnHold, None)
            .await
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(store.count_in_queue("l1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_resolve_matches_counts_targets_only() {
        let store = InMemoryStore::new();
        store
            .insert_match(test_row("l1", "c1", MatchStatus::InQueue))
            .await
            .unwrap();
        store
            .insert_match(test_row("l1", "c2", MatchStatus::InQueue))
            .await
            .unwrap();

        let affected = store
            .resolve_matches(
                "l1",
                &["c1".to_string(), "c3".to_string()],
                MatchStatus::Ash,
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let resolved = store.resolved_matches("c1").await.unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].status, MatchStatus::Ash);
    }

    #[tokio::test]
    async fn test_set_challenger_board() {
        let store = InMemoryStore::new();
        store.put_challenger(Challenger {
            id: "c1".to_string(),
            display_name: "Casey".to_string(),
            board: None,
        });

        store.set_challenger_board("c1", "a,b,c,d").await.unwrap();
        let challenger = store.get_challenger("c1").await.unwrap().unwrap();
        assert_eq!(challenger.board.as_deref(), Some("a,b,c,d"));

        assert!(store.set_challenger_board("ghost", "a").await.is_err());
    }
}
