//! Bingo board generator implementation

use crate::cache::EligibilityPools;
use crate::config::BoardSettings;
use crate::error::{QueueError, Result};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Sentinel id for the center free space
pub const FREE_SPACE: &str = "free";

/// Inflated board: width x width grid of single-entry `{id: earned}` maps.
///
/// The single-entry-map cell shape is odd but matches what existing
/// consumers of the board payload expect.
pub type BoardGrid = Vec<Vec<HashMap<String, bool>>>;

/// Generate a flat board for a challenger.
///
/// Draws without replacement from the leader pool first, then the elite
/// pool, until the required count is reached. Excluded ids are skipped;
/// multi ids contribute two suffixed slots. Returns `None` when the pools
/// cannot fill the board; callers treat that as a soft failure and leave
/// the board unset.
pub fn generate(pools: &EligibilityPools, settings: &BoardSettings) -> Option<String> {
    let required = settings.required_draws();
    let mut rng = rand::thread_rng();

    let mut drawn: Vec<String> = Vec::with_capacity(required);
    draw_from(&pools.leaders, settings, required, &mut drawn, &mut rng);
    draw_from(&pools.elites, settings, required, &mut drawn, &mut rng);

    if drawn.len() < required {
        warn!(
            "Cannot fill board: need {} slots, pools provide {}",
            required,
            drawn.len()
        );
        return None;
    }

    // Full shuffle: remove a uniformly random remaining element repeatedly
    let mut cells: Vec<String> = Vec::with_capacity(settings.cell_count());
    while !drawn.is_empty() {
        let idx = rng.gen_range(0..drawn.len());
        cells.push(drawn.remove(idx));
    }

    if settings.has_free_space() {
        cells.insert(settings.center_index(), FREE_SPACE.to_string());
    }

    Some(cells.join(","))
}

/// Draw from one pool until `required` total slots are collected
fn draw_from(
    pool: &[String],
    settings: &BoardSettings,
    required: usize,
    drawn: &mut Vec<String>,
    rng: &mut impl Rng,
) {
    let mut slots: Vec<String> = Vec::new();
    for id in pool {
        if settings.excluded.contains(id) {
            continue;
        }
        if settings.multi.contains(id) {
            slots.push(format!("{}-1", id));
            slots.push(format!("{}-2", id));
        } else {
            slots.push(id.clone());
        }
    }

    while drawn.len() < required && !slots.is_empty() {
        let idx = rng.gen_range(0..slots.len());
        drawn.push(slots.remove(idx));
    }
}

/// Inflate a stored flat board into a grid, marking earned cells.
///
/// `earned_opponents` is the set of leader ids the challenger holds a
/// badge-counting result against, already canonicalized for shared ids.
pub fn inflate(
    flat: &str,
    earned_opponents: &HashSet<String>,
    settings: &BoardSettings,
) -> Result<BoardGrid> {
    let tokens: Vec<&str> = flat.split(',').collect();
    let expected = settings.cell_count();
    if tokens.len() != expected {
        return Err(QueueError::BoardSizeMismatch {
            expected,
            found: tokens.len(),
        });
    }

    let mut grid: BoardGrid = Vec::with_capacity(settings.width);
    for row_tokens in tokens.chunks(settings.width) {
        let mut row = Vec::with_capacity(settings.width);
        for &token in row_tokens {
            let base = multi_base(token, settings);
            let canonical = settings.canonical(base);
            let earned = token == FREE_SPACE || earned_opponents.contains(canonical);

            let mut cell = HashMap::with_capacity(1);
            cell.insert(token.to_string(), earned);
            row.push(cell);
        }
        grid.push(row);
    }

    Ok(grid)
}

/// Base id of a board token.
///
/// The `-1`/`-2` suffix is stripped only when the remainder is a configured
/// multi id, so a plain leader id that happens to end in `-1` or `-2` is
/// kept as-is.
fn multi_base<'a>(token: &'a str, settings: &BoardSettings) -> &'a str {
    if let Some(base) = token
        .strip_suffix("-1")
        .or_else(|| token.strip_suffix("-2"))
    {
        if settings.multi.contains(base) {
            return base;
        }
    }
    token
}
