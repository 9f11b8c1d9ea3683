//! Admission-control rule settings

use serde::{Deserialize, Serialize};

/// Capacity and eligibility thresholds enforced by the queue engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueRules {
    /// Maximum `InQueue` rows per leader
    pub max_queue_size: usize,
    /// Maximum active rows per challenger across all leaders
    pub max_queues_per_challenger: usize,
    /// Badges required to face an elite leader
    pub badge_threshold: u32,
    /// Emblems required to face a champion; 0 for events with no elites
    pub emblem_threshold: u32,
    /// How many badges one emblem is worth when the emblem threshold is 0
    pub emblem_weight: u32,
}

impl Default for QueueRules {
    fn default() -> Self {
        Self {
            max_queue_size: 20,
            max_queues_per_challenger: 3,
            badge_threshold: 8,
            emblem_threshold: 4,
            emblem_weight: 2,
        }
    }
}
