//! Game settings and the scoring table.
//!
//! Settings are created once per session and never mutated afterwards; every
//! component receives them explicitly instead of reading a global.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use zwap_types::{
    BlockKind, DEFAULT_COLUMNS, DEFAULT_PROGRESS_NEEDED, DEFAULT_ROWS, NORMAL_KIND_COUNT,
    PALETTE_SIZE,
};

/// Per-kind base values and the set/combo multipliers
///
/// Kinds without an explicit entry in `values` score `normal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTable {
    pub normal: u64,
    pub values: ArrayVec<(BlockKind, u64), 12>,
    pub pure_set_multiplier: u64,
    pub pure_set_bonus: u64,
    pub bomb_multiplier: u64,
    pub combo_multiplier: u64,
    pub combo_bonus: u64,
}

impl ScoringTable {
    /// Base value of one block of the given kind
    pub fn value_for(&self, kind: BlockKind) -> u64 {
        self.values
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|&(_, v)| v)
            .unwrap_or(self.normal)
    }

    /// Set (or replace) the explicit value of a kind
    pub fn with_value(mut self, kind: BlockKind, value: u64) -> Self {
        if let Some(entry) = self.values.iter_mut().find(|(k, _)| *k == kind) {
            entry.1 = value;
        } else if self.values.try_push((kind, value)).is_err() {
            log::warn!("scoring table full, ignoring value for {}", kind.as_str());
        }
        self
    }

    /// A table where every block is worth `normal` and no bonus applies
    pub fn flat(normal: u64) -> Self {
        Self {
            normal,
            values: ArrayVec::new(),
            pure_set_multiplier: 1,
            pure_set_bonus: 0,
            bomb_multiplier: 1,
            combo_multiplier: 1,
            combo_bonus: 0,
        }
    }
}

impl Default for ScoringTable {
    fn default() -> Self {
        let mut table = Self::flat(1)
            .with_value(BlockKind::Lock, 5)
            .with_value(BlockKind::Key, 5)
            .with_value(BlockKind::WirelessKey, 5)
            .with_value(BlockKind::Bomb, 3);
        table.pure_set_multiplier = 5;
        table.bomb_multiplier = 2;
        table
    }
}

/// Immutable per-session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub columns: u8,
    pub rows: u8,
    /// Colors in play, taken from the front of the palette
    pub max_colors: u8,
    /// Normal shapes in play, taken from the front of the shape list
    pub max_block_types: u8,
    pub max_keys: u8,
    pub max_locks: u8,
    pub max_bombs: u8,
    /// Level progress (collected blocks) needed for a level-up
    pub progress_needed: u32,
    pub scoring: ScoringTable,
}

impl GameSettings {
    /// The standard 8x12 board with six colors and six shapes
    pub fn normal() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            max_colors: 6,
            max_block_types: 6,
            max_keys: 3,
            max_locks: 3,
            max_bombs: 3,
            progress_needed: DEFAULT_PROGRESS_NEEDED,
            scoring: ScoringTable::default(),
        }
    }

    pub fn with_board_size(mut self, columns: u8, rows: u8) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    pub fn with_colors(mut self, max_colors: u8) -> Self {
        self.max_colors = max_colors;
        self
    }

    pub fn with_block_types(mut self, max_block_types: u8) -> Self {
        self.max_block_types = max_block_types;
        self
    }

    pub fn with_specials(mut self, keys: u8, locks: u8, bombs: u8) -> Self {
        self.max_keys = keys;
        self.max_locks = locks;
        self.max_bombs = bombs;
        self
    }

    pub fn without_specials(self) -> Self {
        self.with_specials(0, 0, 0)
    }

    pub fn with_progress_needed(mut self, progress_needed: u32) -> Self {
        self.progress_needed = progress_needed;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringTable) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn special_count(&self) -> usize {
        self.max_keys as usize + self.max_locks as usize + self.max_bombs as usize
    }

    /// Reject settings a board cannot be built from
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.columns == 0 {
            return Err(SettingsError::ZeroColumns);
        }
        if self.rows == 0 {
            return Err(SettingsError::ZeroRows);
        }
        if self.max_colors == 0 {
            return Err(SettingsError::NoColors);
        }
        if self.max_colors > PALETTE_SIZE {
            return Err(SettingsError::TooManyColors);
        }
        if self.max_block_types == 0 {
            return Err(SettingsError::NoBlockTypes);
        }
        if self.max_block_types > NORMAL_KIND_COUNT {
            return Err(SettingsError::TooManyBlockTypes);
        }
        if self.special_count() > self.cell_count() {
            return Err(SettingsError::TooManySpecials);
        }
        if self.progress_needed == 0 {
            return Err(SettingsError::ZeroProgressNeeded);
        }
        Ok(())
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::normal()
    }
}
