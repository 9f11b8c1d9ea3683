//! Queue engine implementation
//!
//! Every public operation runs its whole read/write sequence under a
//! per-leader async mutex, closing the race windows between the capacity
//! and duplicate checks and the writes that follow them. Storage failures
//! surface verbatim as `QueueError::StorageFailure`; the engine never
//! retries.

use crate::board::{self, BoardGrid};
use crate::cache::Caches;
use crate::config::{AppConfig, BoardSettings, QueueRules};
use crate::engine::eligibility::{check_eligibility, BattleRecord};
use crate::engine::pairing::build_queue_view;
use crate::error::{QueueError, Result};
use crate::notify::NotificationTrigger;
use crate::store::MatchStore;
use crate::types::{
    BattleFormat, ChallengerId, LeaderClass, LeaderId, MatchRow, MatchStatus, QueueEntryView,
    ReportOutcome,
};
use crate::utils::current_timestamp;
use chrono::Duration;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// The queue/match engine
pub struct QueueEngine {
    store: Arc<dyn MatchStore>,
    caches: Arc<Caches>,
    notifier: Arc<dyn NotificationTrigger>,
    rules: QueueRules,
    board: BoardSettings,
    /// Per-leader serialization points; operations for one leader never
    /// interleave across their storage calls
    leader_locks: Mutex<HashMap<LeaderId, Arc<tokio::sync::Mutex<()>>>>,
}

impl QueueEngine {
    pub fn new(
        store: Arc<dyn MatchStore>,
        caches: Arc<Caches>,
        notifier: Arc<dyn NotificationTrigger>,
        rules: QueueRules,
        board: BoardSettings,
    ) -> Self {
        Self {
            store,
            caches,
            notifier,
            rules,
            board,
            leader_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create an engine from loaded application configuration
    pub fn from_config(
        store: Arc<dyn MatchStore>,
        caches: Arc<Caches>,
        notifier: Arc<dyn NotificationTrigger>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            store,
            caches,
            notifier,
            config.rules.clone(),
            config.board.clone(),
        )
    }

    /// Get (or create) the serialization mutex for a leader
    fn leader_lock(&self, leader_id: &str) -> Result<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .leader_locks
            .lock()
            .map_err(|_| QueueError::lock("leader locks"))?;
        Ok(locks
            .entry(leader_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone())
    }

    /// Admit a challenger into a leader's queue.
    ///
    /// Preconditions are checked in a fixed order so the first violated
    /// rule is the one reported. On success the row is inserted with the
    /// current timestamp, and the challenger is notified immediately when
    /// the queue was empty beforehand (they are first in line).
    pub async fn enqueue(
        &self,
        leader_id: &str,
        challenger_id: &str,
        difficulty: LeaderClass,
        format: BattleFormat,
    ) -> Result<()> {
        let lock = self.leader_lock(leader_id)?;
        let _guard = lock.lock().await;

        info!(
            "Enqueue request - leader: {}, challenger: {}, difficulty: {}, format: {}",
            leader_id, challenger_id, difficulty.0, format.0
        );

        // 1. Leader exists
        let leader = self
            .store
            .get_leader(leader_id)
            .await?
            .ok_or_else(|| QueueError::NotFound {
                leader_id: leader_id.to_string(),
            })?;

        // 2. Queue is open
        if !leader.queue_open {
            return Err(QueueError::QueueClosed);
        }

        // 3. + 4. Requested difficulty and format are offered
        if !leader.class.contains(difficulty) {
            return Err(QueueError::UnsupportedDifficulty);
        }
        if !leader.format.contains(format) {
            return Err(QueueError::UnsupportedFormat);
        }

        // 5. Capacity
        let queued = self.store.count_in_queue(leader_id).await?;
        if queued >= self.rules.max_queue_size {
            return Err(QueueError::QueueFull);
        }

        // 6. Badge/emblem eligibility for elite and champion tiers
        if leader.class.is_elite() || leader.class.is_champion() {
            let resolved = self.store.resolved_matches(challenger_id).await?;
            let record = BattleRecord::tally(&resolved);
            debug!(
                "Eligibility check - challenger: {}, badges: {}, emblems: {}",
                challenger_id, record.badges, record.emblems
            );
            check_eligibility(&leader, record, &self.rules)?;
        }

        // 7. No active or badge-winning row against this leader
        if self
            .store
            .active_row(leader_id, challenger_id)
            .await?
            .is_some()
        {
            return Err(QueueError::AlreadyInQueue);
        }
        if self.store.has_badge_win(leader_id, challenger_id).await? {
            return Err(QueueError::AlreadyWon);
        }

        // 8. Challenger-wide active limit
        let active = self
            .store
            .count_active_for_challenger(challenger_id)
            .await?;
        if active >= self.rules.max_queues_per_challenger {
            return Err(QueueError::TooManyChallenges);
        }

        self.store
            .insert_match(MatchRow {
                leader_id: leader_id.to_string(),
                challenger_id: challenger_id.to_string(),
                battle_difficulty: difficulty,
                battle_format: format,
                status: MatchStatus::InQueue,
                timestamp: current_timestamp(),
            })
            .await?;

        info!(
            "Challenger {} joined queue for {} at position {}",
            challenger_id, leader_id, queued
        );

        // The queue was empty: this challenger is first in line
        if queued == 0 {
            self.notifier.notify(challenger_id).await;
        }

        Ok(())
    }

    /// Remove a challenger's active entry from a leader's queue.
    ///
    /// Clears the pairing code for the pair and notifies the new head of
    /// queue, covering the case where the removed entry was the head.
    pub async fn dequeue(&self, leader_id: &str, challenger_id: &str) -> Result<()> {
        let lock = self.leader_lock(leader_id)?;
        let _guard = lock.lock().await;

        let affected = self.store.delete_active(leader_id, challenger_id).await?;
        if affected == 0 {
            return Err(QueueError::NotInQueue);
        }

        info!(
            "Challenger {} left queue for {}",
            challenger_id, leader_id
        );
        self.caches
            .clear_link_codes_for(leader_id, challenger_id)?;
        self.notify_head(leader_id, 1).await?;

        Ok(())
    }

    /// Suspend a challenger's `InQueue` entry without losing its timestamp
    pub async fn hold(&self, leader_id: &str, challenger_id: &str) -> Result<()> {
        let lock = self.leader_lock(leader_id)?;
        let _guard = lock.lock().await;

        let affected = self
            .store
            .update_status(
                leader_id,
                challenger_id,
                &[MatchStatus::InQueue],
                MatchStatus::OnHold,
                None,
            )
            .await?;
        if affected == 0 {
            return Err(QueueError::NotInQueue);
        }

        info!("Challenger {} on hold for {}", challenger_id, leader_id);
        // The hold may have promoted a new head
        self.notify_head(leader_id, 1).await?;

        Ok(())
    }

    /// Resume a held entry at the back (default) or front of the queue.
    ///
    /// Front placement rewinds the timestamp one minute before the current
    /// head so the entry sorts first; with no queued entries it degrades to
    /// back placement. A front-placed challenger is notified immediately.
    pub async fn unhold(
        &self,
        leader_id: &str,
        challenger_id: &str,
        place_at_front: bool,
    ) -> Result<()> {
        let lock = self.leader_lock(leader_id)?;
        let _guard = lock.lock().await;

        let timestamp = if place_at_front {
            match self.store.queue_entries(leader_id).await?.first() {
                Some(head) => head.timestamp - Duration::minutes(1),
                None => current_timestamp(),
            }
        } else {
            current_timestamp()
        };

        let affected = self
            .store
            .update_status(
                leader_id,
                challenger_id,
                &[MatchStatus::OnHold],
                MatchStatus::InQueue,
                Some(timestamp),
            )
            .await?;
        if affected == 0 {
            return Err(QueueError::NotInQueue);
        }

        info!(
            "Challenger {} back in queue for {} ({})",
            challenger_id,
            leader_id,
            if place_at_front { "front" } else { "back" }
        );
        if place_at_front {
            self.notifier.notify(challenger_id).await;
        }

        Ok(())
    }

    /// Resolve the targeted entries of a finished battle.
    ///
    /// Accepts 1 challenger, or 2 for duo-mode leaders. When fewer rows
    /// than requested were updated the call reports `NotInQueue` without
    /// undoing the partial update (known limitation). Returns whether the
    /// result counts for the Hall of Fame.
    pub async fn report_result(
        &self,
        leader_id: &str,
        challenger_ids: &[ChallengerId],
        challenger_win: bool,
        badge_awarded: bool,
    ) -> Result<ReportOutcome> {
        if challenger_ids.is_empty() || challenger_ids.len() > 2 {
            return Err(QueueError::BadRequest {
                reason: format!(
                    "expected 1 or 2 challengers, got {}",
                    challenger_ids.len()
                ),
            });
        }

        let lock = self.leader_lock(leader_id)?;
        let _guard = lock.lock().await;

        let leader = self
            .store
            .get_leader(leader_id)
            .await?
            .ok_or_else(|| QueueError::NotFound {
                leader_id: leader_id.to_string(),
            })?;
        if challenger_ids.len() == 2 && !leader.is_duo() {
            return Err(QueueError::BadRequest {
                reason: "two challengers are only valid for duo-mode leaders".to_string(),
            });
        }

        let status = MatchStatus::from_outcome(challenger_win, badge_awarded);
        let affected = self
            .store
            .resolve_matches(leader_id, challenger_ids, status)
            .await?;
        if affected != challenger_ids.len() as u64 {
            warn!(
                "Partial resolution for {} - requested: {}, affected: {}",
                leader_id,
                challenger_ids.len(),
                affected
            );
            return Err(QueueError::NotInQueue);
        }

        let hof = challenger_win && leader.class.is_champion();
        info!(
            "Reported result for {} - challengers: {:?}, status: {}, hof: {}",
            leader_id, challenger_ids, status, hof
        );

        for challenger_id in challenger_ids {
            self.caches
                .clear_link_codes_for(leader_id, challenger_id)?;
        }

        // The resolved entries were the head; notify the new front (a pair
        // of challengers for duo leaders)
        let heads = if leader.is_duo() { 2 } else { 1 };
        self.notify_head(leader_id, heads).await?;

        Ok(ReportOutcome { hof })
    }

    /// Ordered view of a leader's queue with positions and pairing codes
    pub async fn queue_view(&self, leader_id: &str) -> Result<Vec<QueueEntryView>> {
        let leader = self
            .store
            .get_leader(leader_id)
            .await?
            .ok_or_else(|| QueueError::NotFound {
                leader_id: leader_id.to_string(),
            })?;
        let entries = self.store.queue_entries(leader_id).await?;
        build_queue_view(&leader, &entries, &self.caches)
    }

    /// A challenger's serving position in a leader's queue, if queued
    pub async fn position_of(
        &self,
        leader_id: &str,
        challenger_id: &str,
    ) -> Result<Option<usize>> {
        let entries = self.store.queue_entries(leader_id).await?;
        Ok(entries
            .iter()
            .position(|e| e.challenger_id == challenger_id))
    }

    /// Fetch a challenger's bingo board, generating it on first access.
    ///
    /// A stored board whose cell count no longer matches the configured
    /// size is regenerated. When the pools cannot fill a board the failure
    /// is soft: the board stays unset and an empty grid is returned.
    pub async fn get_bingo_board(&self, challenger_id: &str) -> Result<BoardGrid> {
        let challenger = self
            .store
            .get_challenger(challenger_id)
            .await?
            .ok_or_else(|| QueueError::ChallengerNotFound {
                challenger_id: challenger_id.to_string(),
            })?;

        let flat = match challenger
            .board
            .filter(|b| b.split(',').count() == self.board.cell_count())
        {
            Some(flat) => flat,
            None => {
                let pools = self.caches.pools()?;
                match board::generate(&pools, &self.board) {
                    Some(flat) => {
                        self.store
                            .set_challenger_board(challenger_id, &flat)
                            .await?;
                        info!("Generated bingo board for {}", challenger_id);
                        flat
                    }
                    None => {
                        warn!(
                            "Board generation failed for {}; left unset",
                            challenger_id
                        );
                        return Ok(BoardGrid::new());
                    }
                }
            }
        };

        let resolved = self.store.resolved_matches(challenger_id).await?;
        let earned: HashSet<String> = resolved
            .iter()
            .map(|row| self.board.canonical(&row.leader_id).to_string())
            .collect();

        board::inflate(&flat, &earned, &self.board)
    }

    /// Notify the first `count` challengers of a leader's queue, if any
    async fn notify_head(&self, leader_id: &str, count: usize) -> Result<()> {
        let entries = self.store.queue_entries(leader_id).await?;
        for entry in entries.iter().take(count) {
            debug!(
                "Notifying head of queue - leader: {}, challenger: {}",
                leader_id, entry.challenger_id
            );
            self.notifier.notify(&entry.challenger_id).await;
        }
        Ok(())
    }
}
