//! Queue position and pairing-code assignment
//!
//! Positions are sequential indices over a leader's `InQueue` rows in
//! timestamp order. Non-duo leaders get one code per challenger; duo
//! leaders pair entries by index parity (1 with 0, 3 with 2, ...), and an
//! even-index entry with no follower reports an awaiting-partner state
//! instead of a code.

use crate::cache::Caches;
use crate::error::Result;
use crate::types::{Leader, MatchRow, PairingState, QueueEntryView};

/// Build the caller-facing view of a leader's active queue
pub fn build_queue_view(
    leader: &Leader,
    entries: &[MatchRow],
    caches: &Caches,
) -> Result<Vec<QueueEntryView>> {
    let mut view = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        view.push(QueueEntryView {
            challenger_id: entry.challenger_id.clone(),
            position,
            pairing: pairing_state(leader, entries, position, caches)?,
            timestamp: entry.timestamp,
        });
    }
    Ok(view)
}

/// Pairing state for the entry at `index`.
///
/// A leader's static link code overrides generation entirely.
fn pairing_state(
    leader: &Leader,
    entries: &[MatchRow],
    index: usize,
    caches: &Caches,
) -> Result<PairingState> {
    if let Some(fixed) = &leader.link_code {
        return Ok(PairingState::Code(fixed.clone()));
    }

    let entry = &entries[index];
    if !leader.is_duo() {
        let code = caches.link_code(&leader.id, &[entry.challenger_id.as_str()])?;
        return Ok(PairingState::Code(code));
    }

    let partner = if index % 2 == 0 {
        entries.get(index + 1)
    } else {
        entries.get(index - 1)
    };
    match partner {
        Some(partner) => {
            let code = caches.link_code(
                &leader.id,
                &[entry.challenger_id.as_str(), partner.challenger_id.as_str()],
            )?;
            Ok(PairingState::Code(code))
        }
        None => Ok(PairingState::AwaitingPartner),
    }
}
