//! Process-lifetime caches for pairing codes, eligibility pools, and
//! push-token registrations
//!
//! The caches are an explicitly owned object handed to the engine rather
//! than ambient module state. Pairing codes are never persisted; they are
//! created lazily on first request and destroyed when the underlying match
//! leaves active state, and are lost on process restart. The eligibility
//! pools are loaded once at startup and not refreshed.

use crate::error::{QueueError, Result};
use crate::store::MatchStore;
use crate::types::ChallengerId;
use crate::utils::generate_link_code;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info};

/// Leader and elite id pools used for bingo board generation
#[derive(Debug, Clone, Default)]
pub struct EligibilityPools {
    pub leaders: Vec<String>,
    pub elites: Vec<String>,
}

/// Cache key for a pairing code: a leader plus the sorted challenger set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LinkCodeKey {
    leader_id: String,
    challengers: Vec<String>,
}

impl LinkCodeKey {
    fn new(leader_id: &str, challengers: &[&str]) -> Self {
        let mut sorted: Vec<String> = challengers.iter().map(|c| c.to_string()).collect();
        sorted.sort();
        Self {
            leader_id: leader_id.to_string(),
            challengers: sorted,
        }
    }
}

/// Owned cache state shared by the engine and the notification trigger
#[derive(Debug, Default)]
pub struct Caches {
    link_codes: RwLock<HashMap<LinkCodeKey, String>>,
    pools: RwLock<EligibilityPools>,
    push_tokens: RwLock<HashMap<ChallengerId, Vec<String>>>,
}

impl Caches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the pools and push-token cache from the store.
    ///
    /// Called once at startup; pool membership is not refreshed afterwards.
    /// Champions belong to neither pool.
    pub async fn load(&self, store: &dyn MatchStore) -> Result<()> {
        let all = store.all_leaders().await?;
        let mut pools = EligibilityPools::default();
        for leader in &all {
            if leader.class.is_champion() {
                continue;
            }
            if leader.class.is_elite() {
                pools.elites.push(leader.id.clone());
            } else {
                pools.leaders.push(leader.id.clone());
            }
        }
        // Deterministic pool order regardless of store iteration order
        pools.leaders.sort();
        pools.elites.sort();

        info!(
            "Loaded eligibility pools - leaders: {}, elites: {}",
            pools.leaders.len(),
            pools.elites.len()
        );
        *self
            .pools
            .write()
            .map_err(|_| QueueError::lock("pools"))? = pools;

        let tokens = store.all_push_tokens().await?;
        info!("Loaded push tokens for {} challengers", tokens.len());
        *self
            .push_tokens
            .write()
            .map_err(|_| QueueError::lock("push tokens"))? = tokens;

        Ok(())
    }

    /// Snapshot of the eligibility pools
    pub fn pools(&self) -> Result<EligibilityPools> {
        Ok(self
            .pools
            .read()
            .map_err(|_| QueueError::lock("pools"))?
            .clone())
    }

    /// Get the pairing code for a challenger set, generating and caching it
    /// on first request
    pub fn link_code(&self, leader_id: &str, challengers: &[&str]) -> Result<String> {
        let key = LinkCodeKey::new(leader_id, challengers);
        let mut codes = self
            .link_codes
            .write()
            .map_err(|_| QueueError::lock("link codes"))?;
        Ok(codes
            .entry(key)
            .or_insert_with(|| {
                let code = generate_link_code();
                debug!(
                    "Generated pairing code for leader {} / {:?}",
                    leader_id, challengers
                );
                code
            })
            .clone())
    }

    /// Drop every cached code involving this challenger at this leader.
    ///
    /// Covers both solo keys and duo keys where the challenger is one half
    /// of the pair.
    pub fn clear_link_codes_for(&self, leader_id: &str, challenger_id: &str) -> Result<()> {
        let mut codes = self
            .link_codes
            .write()
            .map_err(|_| QueueError::lock("link codes"))?;
        codes.retain(|key, _| {
            !(key.leader_id == leader_id
                && key.challengers.iter().any(|c| c == challenger_id))
        });
        Ok(())
    }

    /// Push tokens registered for a challenger
    pub fn tokens_for(&self, challenger_id: &str) -> Result<Vec<String>> {
        Ok(self
            .push_tokens
            .read()
            .map_err(|_| QueueError::lock("push tokens"))?
            .get(challenger_id)
            .cloned()
            .unwrap_or_default())
    }

    /// Register a push token for a challenger
    pub fn register_token(&self, challenger_id: &str, token: &str) -> Result<()> {
        let mut tokens = self
            .push_tokens
            .write()
            .map_err(|_| QueueError::lock("push tokens"))?;
        let entry = tokens.entry(challenger_id.to_string()).or_default();
        if !entry.iter().any(|t| t == token) {
            entry.push(token.to_string());
        }
        Ok(())
    }

    /// Number of cached pairing codes (for monitoring)
    pub fn cached_code_count(&self) -> usize {
        self.link_codes
            .read()
            .map(|codes| codes.len())
            .unwrap_or(0)
    }
}
