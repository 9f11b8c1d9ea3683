//! Bingo board generation settings

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Settings controlling board generation and inflation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardSettings {
    /// Board width; the board is a width x width grid
    pub width: usize,
    /// Ids skipped entirely during generation
    pub excluded: HashSet<String>,
    /// Ids contributing two draw-able slots instead of one
    pub multi: HashSet<String>,
    /// Variant id to canonical id, for eligibility matching only
    pub shared: HashMap<String, String>,
}

impl BoardSettings {
    /// Settings with the given width and no id lists
    pub fn with_width(width: usize) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Total number of cells on the board
    pub fn cell_count(&self) -> usize {
        self.width * self.width
    }

    /// Whether the board carries a free space at its center
    pub fn has_free_space(&self) -> bool {
        self.width % 2 == 1 && self.width >= 5
    }

    /// Number of opponent ids generation must draw
    pub fn required_draws(&self) -> usize {
        if self.has_free_space() {
            self.cell_count() - 1
        } else {
            self.cell_count()
        }
    }

    /// Index of the free-space cell in the flattened board
    pub fn center_index(&self) -> usize {
        self.cell_count() / 2
    }

    /// Map a shared variant id to its canonical id
    pub fn canonical<'a>(&'a self, id: &'a str) -> &'a str {
        self.shared.get(id).map(String::as_str).unwrap_or(id)
    }
}
