//! Badge and emblem gating for elite and champion queues

use crate::config::QueueRules;
use crate::error::{QueueError, Result};
use crate::types::{Leader, MatchRow};

/// A challenger's tally of badge-counting results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BattleRecord {
    /// Results against regular (non-elite, non-champion) leaders
    pub badges: u32,
    /// Results against elite leaders
    pub emblems: u32,
}

impl BattleRecord {
    /// Tally a challenger's resolved matches.
    ///
    /// The difficulty bit recorded at enqueue time decides the bucket:
    /// elite results count as emblems, regular results as badges, and
    /// champion results as neither.
    pub fn tally(resolved: &[MatchRow]) -> Self {
        let mut record = BattleRecord::default();
        for row in resolved {
            if row.battle_difficulty.is_elite() {
                record.emblems += 1;
            } else if !row.battle_difficulty.is_champion() {
                record.badges += 1;
            }
        }
        record
    }

    /// Badge total with emblems weighted in, for events without elites
    pub fn weighted_badges(&self, emblem_weight: u32) -> u32 {
        self.badges + self.emblems * emblem_weight
    }
}

/// Check whether a challenger may enter an elite or champion queue.
///
/// Regular leaders gate nothing. Elites require the badge threshold.
/// Champions require the emblem threshold when one is configured; when the
/// event has no elites (threshold 0), a weighted badge sum must reach the
/// badge threshold instead.
pub fn check_eligibility(
    leader: &Leader,
    record: BattleRecord,
    rules: &QueueRules,
) -> Result<()> {
    if leader.class.is_champion() {
        if rules.emblem_threshold > 0 {
            if record.emblems < rules.emblem_threshold {
                return Err(QueueError::NotEnoughEmblems {
                    have: record.emblems,
                    need: rules.emblem_threshold,
                });
            }
        } else {
            let have = record.weighted_badges(rules.emblem_weight);
            if have < rules.badge_threshold {
                return Err(QueueError::NotEnoughBadges {
                    have,
                    need: rules.badge_threshold,
                });
            }
        }
    } else if leader.class.is_elite() && record.badges < rules.badge_threshold {
        return Err(QueueError::NotEnoughBadges {
            have: record.badges,
            need: rules.badge_threshold,
        });
    }

    Ok(())
}
