//! Queue/match engine
//!
//! This module owns admission control (enqueue), removal (dequeue),
//! suspension (hold/unhold), resolution (report_result), queue position
//! and pairing-code computation, and the decision of when to fire
//! "it's your turn" notifications.

pub mod eligibility;
pub mod pairing;
pub mod queue;

pub use eligibility::BattleRecord;
pub use queue::QueueEngine;
