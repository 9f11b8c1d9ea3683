//! Common types used throughout the queue engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for leaders
pub type LeaderId = String;

/// Unique identifier for challengers
pub type ChallengerId = String;

/// Leader tier bitmask.
///
/// The raw bit values are stored in the database and travel on the wire;
/// they must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaderClass(pub u32);

impl LeaderClass {
    pub const CASUAL: LeaderClass = LeaderClass(1);
    pub const INTERMEDIATE: LeaderClass = LeaderClass(2);
    pub const VETERAN: LeaderClass = LeaderClass(4);
    pub const ELITE: LeaderClass = LeaderClass(8);
    pub const CHAMPION: LeaderClass = LeaderClass(16);

    /// True if any bit of `other` is set in `self`
    pub fn contains(self, other: LeaderClass) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_elite(self) -> bool {
        self.contains(LeaderClass::ELITE)
    }

    pub fn is_champion(self) -> bool {
        self.contains(LeaderClass::CHAMPION)
    }
}

impl std::ops::BitOr for LeaderClass {
    type Output = LeaderClass;

    fn bitor(self, rhs: LeaderClass) -> LeaderClass {
        LeaderClass(self.0 | rhs.0)
    }
}

/// Battle format bitmask, same storage rules as [`LeaderClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleFormat(pub u32);

impl BattleFormat {
    pub const SINGLES: BattleFormat = BattleFormat(1);
    pub const DOUBLES: BattleFormat = BattleFormat(2);
    pub const MULTI: BattleFormat = BattleFormat(4);
    pub const SPECIAL: BattleFormat = BattleFormat(8);

    /// True if any bit of `other` is set in `self`
    pub fn contains(self, other: BattleFormat) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for BattleFormat {
    type Output = BattleFormat;

    fn bitor(self, rhs: BattleFormat) -> BattleFormat {
        BattleFormat(self.0 | rhs.0)
    }
}

/// Status of a match row.
///
/// The resolved statuses are named from the historical wire values and read
/// from the challenger's perspective with inverted win/loss naming: `Win`
/// means the challenger lost but was awarded the badge, `Loss` means they
/// lost without one, `Ash` means they won with the badge, and `Gary` means
/// they won without it. External consumers depend on these exact values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    #[serde(rename = "inQueue")]
    InQueue,
    #[serde(rename = "onHold")]
    OnHold,
    #[serde(rename = "loss")]
    Loss,
    #[serde(rename = "win")]
    Win,
    #[serde(rename = "ash")]
    Ash,
    #[serde(rename = "gary")]
    Gary,
}

/// Lookup table indexed by `[challenger_win][badge_awarded]`
const OUTCOME_TABLE: [[MatchStatus; 2]; 2] = [
    [MatchStatus::Loss, MatchStatus::Win],
    [MatchStatus::Gary, MatchStatus::Ash],
];

impl MatchStatus {
    /// Resolve the status for a reported battle outcome
    pub fn from_outcome(challenger_win: bool, badge_awarded: bool) -> MatchStatus {
        OUTCOME_TABLE[challenger_win as usize][badge_awarded as usize]
    }

    /// True for rows that occupy a place in a leader's queue
    pub fn is_active(self) -> bool {
        matches!(self, MatchStatus::InQueue | MatchStatus::OnHold)
    }

    /// True for resolved rows that count toward badges and emblems
    pub fn counts_as_badge(self) -> bool {
        matches!(self, MatchStatus::Win | MatchStatus::Ash)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchStatus::InQueue => "inQueue",
            MatchStatus::OnHold => "onHold",
            MatchStatus::Loss => "loss",
            MatchStatus::Win => "win",
            MatchStatus::Ash => "ash",
            MatchStatus::Gary => "gary",
        };
        write!(f, "{}", name)
    }
}

/// A leader running a battle queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leader {
    pub id: LeaderId,
    pub name: String,
    pub class: LeaderClass,
    pub format: BattleFormat,
    pub queue_open: bool,
    /// Pair consecutive queue entries, only meaningful with a multi format
    pub duo_mode: bool,
    /// Static pairing code that overrides generation entirely when set
    pub link_code: Option<String>,
}

impl Leader {
    /// True when queue entries are served as pairs
    pub fn is_duo(&self) -> bool {
        self.duo_mode && self.format.contains(BattleFormat::MULTI)
    }
}

/// A challenger checked in to the event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenger {
    pub id: ChallengerId,
    pub display_name: String,
    /// Flat comma-separated bingo board, unset until first generated
    pub board: Option<String>,
}

/// A queue entry or historical battle result.
///
/// At most one row per (leader, challenger) pair may be active at a time.
/// For a given leader the `InQueue` rows, ordered by timestamp ascending,
/// are the serving order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRow {
    pub leader_id: LeaderId,
    pub challenger_id: ChallengerId,
    /// One bit of the leader class, recorded at enqueue time
    pub battle_difficulty: LeaderClass,
    /// One bit of the battle format, recorded at enqueue time
    pub battle_format: BattleFormat,
    pub status: MatchStatus,
    pub timestamp: DateTime<Utc>,
}

/// Pairing code state for one queue entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "code")]
pub enum PairingState {
    /// Entry has a pairing code (shared with its partner for duo leaders)
    Code(String),
    /// Duo entry at an even index with no following entry yet
    AwaitingPartner,
}

/// One entry of a leader's active queue as seen by callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntryView {
    pub challenger_id: ChallengerId,
    /// Serving position, 0 is head of queue
    pub position: usize,
    pub pairing: PairingState,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a `report_result` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutcome {
    /// True only when the challenger beat a champion leader
    pub hof: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_class_bits_are_stable() {
        assert_eq!(LeaderClass::CASUAL.0, 1);
        assert_eq!(LeaderClass::INTERMEDIATE.0, 2);
        assert_eq!(LeaderClass::VETERAN.0, 4);
        assert_eq!(LeaderClass::ELITE.0, 8);
        assert_eq!(LeaderClass::CHAMPION.0, 16);

        assert_eq!(BattleFormat::SINGLES.0, 1);
        assert_eq!(BattleFormat::DOUBLES.0, 2);
        assert_eq!(BattleFormat::MULTI.0, 4);
        assert_eq!(BattleFormat::SPECIAL.0, 8);
    }

    #[test]
    fn test_bitmask_contains() {
        let class = LeaderClass::VETERAN | LeaderClass::ELITE;
        assert!(class.contains(LeaderClass::VETERAN));
        assert!(class.contains(LeaderClass::ELITE));
        assert!(!class.contains(LeaderClass::CASUAL));
        assert!(class.is_elite());
        assert!(!class.is_champion());
    }

    #[test]
    fn test_outcome_table() {
        // Challenger lost, no badge
        assert_eq!(MatchStatus::from_outcome(false, false), MatchStatus::Loss);
        // Challenger lost but earned the badge (historical inverted naming)
        assert_eq!(MatchStatus::from_outcome(false, true), MatchStatus::Win);
        // Challenger won and earned the badge
        assert_eq!(MatchStatus::from_outcome(true, true), MatchStatus::Ash);
        // Challenger won without the badge
        assert_eq!(MatchStatus::from_outcome(true, false), MatchStatus::Gary);
    }

    #[test]
    fn test_status_predicates() {
        assert!(MatchStatus::InQueue.is_active());
        assert!(MatchStatus::OnHold.is_active());
        assert!(!MatchStatus::Loss.is_active());

        assert!(MatchStatus::Win.counts_as_badge());
        assert!(MatchStatus::Ash.counts_as_badge());
        assert!(!MatchStatus::Gary.counts_as_badge());
        assert!(!MatchStatus::Loss.counts_as_badge());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&MatchStatus::InQueue).unwrap(),
            "\"inQueue\""
        );
        assert_eq!(
            serde_json::to_string(&MatchStatus::Ash).unwrap(),
            "\"ash\""
        );
        let parsed: MatchStatus = serde_json::from_str("\"onHold\"").unwrap();
        assert_eq!(parsed, MatchStatus::OnHold);
    }

    #[test]
    fn test_is_duo_requires_multi_format() {
        let mut leader = Leader {
            id: "l1".to_string(),
            name: "Test".to_string(),
            class: LeaderClass::VETERAN,
            format: BattleFormat::SINGLES,
            queue_open: true,
            duo_mode: true,
            link_code: None,
        };
        assert!(!leader.is_duo());

        leader.format = BattleFormat::SINGLES | BattleFormat::MULTI;
        assert!(leader.is_duo());

        leader.duo_mode = false;
        assert!(!leader.is_duo());
    }
}
