//! Board module - owns the grid of blocks
//!
//! The board is a list of columns, each a bottom-to-top stack of blocks:
//! `columns[col][row]`, row 0 at the bottom. Blocks fall towards row 0, so a
//! column's order is its fall order and removing blocks is a plain filter.
//! New blocks are appended on top of short columns.
//!
//! Operations on ids that are not on the board are no-ops or return
//! [`Position::NOT_FOUND`]; they never panic.

use std::collections::HashSet;
use std::fmt;

use arrayvec::ArrayVec;
use log::debug;

use crate::block::Block;
use crate::error::{BoardError, SettingsError};
use crate::recolor::{unchain_by_recoloring, RecolorReport};
use crate::rng::BlockRng;
use crate::settings::GameSettings;
use zwap_types::{BlockId, BlockKind, Position};

/// Result of topping up the columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillReport {
    /// Ids of the freshly generated blocks, column by column, bottom to top
    pub added: Vec<BlockId>,
    pub recolor: RecolorReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    settings: GameSettings,
    columns: Vec<Vec<Block>>,
    next_id: u32,
}

impl Board {
    /// Create an empty board. Malformed settings are refused.
    pub fn new(settings: &GameSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings: settings.clone(),
            columns: vec![Vec::with_capacity(settings.rows as usize); settings.columns as usize],
            next_id: 1,
        })
    }

    /// Create a full board of random blocks with no pre-formed sets
    pub fn generate(settings: &GameSettings, rng: &mut BlockRng) -> Result<Self, SettingsError> {
        let mut board = Self::new(settings)?;
        let report = board.fill_columns_to_capacity(rng);
        debug!(
            "generated board: {} blocks, {} recolor passes",
            report.added.len(),
            report.recolor.passes
        );
        Ok(board)
    }

    /// Rebuild a board from column data (snapshots, fixtures)
    pub fn from_columns(
        settings: &GameSettings,
        columns: Vec<Vec<Block>>,
    ) -> Result<Self, BoardError> {
        settings.validate()?;
        if columns.len() != settings.columns as usize {
            return Err(BoardError::ColumnCount {
                expected: settings.columns as usize,
                found: columns.len(),
            });
        }
        let mut seen = HashSet::new();
        let mut max_id = 0;
        for (col, column) in columns.iter().enumerate() {
            if column.len() > settings.rows as usize {
                return Err(BoardError::ColumnOverflow {
                    col,
                    len: column.len(),
                });
            }
            for block in column {
                if !seen.insert(block.id()) {
                    return Err(BoardError::DuplicateId(block.id()));
                }
                max_id = max_id.max(block.id().0);
            }
        }
        Ok(Self {
            settings: settings.clone(),
            columns,
            next_id: max_id + 1,
        })
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows (column capacity)
    pub fn height(&self) -> usize {
        self.settings.rows as usize
    }

    pub fn columns(&self) -> &[Vec<Block>] {
        &self.columns
    }

    /// Blocks of one column, bottom to top. Empty for out-of-range columns.
    pub fn column(&self, col: usize) -> &[Block] {
        self.columns.get(col).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Copy of the grid in `[column][row]` order
    pub fn to_columns(&self) -> Vec<Vec<Block>> {
        self.columns.clone()
    }

    /// Block at (col, row), `None` when out of bounds or empty
    pub fn get(&self, col: i16, row: i16) -> Option<&Block> {
        if col < 0 || row < 0 {
            return None;
        }
        self.columns.get(col as usize)?.get(row as usize)
    }

    pub fn get_at(&self, pos: Position) -> Option<&Block> {
        self.get(pos.col, pos.row)
    }

    fn get_mut(&mut self, pos: Position) -> Option<&mut Block> {
        if !pos.is_found() {
            return None;
        }
        self.columns
            .get_mut(pos.col as usize)?
            .get_mut(pos.row as usize)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.find(id).and_then(|pos| self.get_at(pos))
    }

    /// Mutable access for the UI-hint flags; colors and kinds stay read-only
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        let pos = self.find(id)?;
        self.get_mut(pos)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.find(id).is_some()
    }

    /// Grid position of a block (linear scan, exact id match)
    pub fn find(&self, id: BlockId) -> Option<Position> {
        self.columns.iter().enumerate().find_map(|(c, column)| {
            column
                .iter()
                .position(|b| b.id() == id)
                .map(|r| Position::new(c as i16, r as i16))
        })
    }

    /// Like [`Board::find`], with the `(-1, -1)` sentinel for missing blocks
    pub fn position_of(&self, id: BlockId) -> Position {
        self.find(id).unwrap_or(Position::NOT_FOUND)
    }

    /// All blocks in column-major, bottom-to-top order
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Block)> + '_ {
        self.columns.iter().enumerate().flat_map(|(c, column)| {
            column
                .iter()
                .enumerate()
                .map(move |(r, b)| (Position::new(c as i16, r as i16), b))
        })
    }

    pub fn ids(&self) -> Vec<BlockId> {
        self.iter().map(|(_, b)| b.id()).collect()
    }

    pub fn count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn is_full(&self) -> bool {
        self.columns.iter().all(|c| c.len() == self.height())
    }

    /// Exchange the grid positions of two blocks.
    ///
    /// Returns the new positions of `a` and `b`, or `None` (and changes
    /// nothing) when either block is missing.
    pub fn swap(&mut self, a: BlockId, b: BlockId) -> Option<(Position, Position)> {
        let pa = self.find(a)?;
        let pb = self.find(b)?;
        if pa == pb {
            return Some((pa, pb));
        }
        let block_a = *self.get_at(pa)?;
        let block_b = *self.get_at(pb)?;
        *self.get_mut(pa)? = block_b;
        *self.get_mut(pb)? = block_a;
        Some((pb, pa))
    }

    /// Delete every block whose id is in `ids`.
    ///
    /// The remaining blocks keep their relative order within each column.
    /// Returns the removed blocks.
    pub fn remove_blocks(&mut self, ids: &HashSet<BlockId>) -> Vec<Block> {
        let mut removed = Vec::new();
        for column in &mut self.columns {
            column.retain(|b| {
                if ids.contains(&b.id()) {
                    removed.push(*b);
                    false
                } else {
                    true
                }
            });
        }
        removed
    }

    pub(crate) fn allocate_id(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append random blocks to every short column, without recoloring
    pub(crate) fn append_random_blocks(&mut self, rng: &mut BlockRng) -> Vec<BlockId> {
        let mut added = Vec::new();
        for c in 0..self.columns.len() {
            while self.columns[c].len() < self.height() {
                let id = self.allocate_id();
                let block = Block::new(id, rng.color(&self.settings), rng.kind(&self.settings));
                self.columns[c].push(block);
                added.push(id);
            }
        }
        added
    }

    /// Top up every column to capacity with random blocks, then break any set
    /// that contains one of the new blocks by recoloring new blocks only.
    pub fn fill_columns_to_capacity(&mut self, rng: &mut BlockRng) -> FillReport {
        let added = self.append_random_blocks(rng);
        let recolor = unchain_by_recoloring(self, rng, Some(&added));
        FillReport { added, recolor }
    }

    /// Occupied orthogonal neighbors in up, down, left, right order
    pub fn neighbors(&self, id: BlockId) -> ArrayVec<Block, 4> {
        let mut out = ArrayVec::new();
        if let Some(pos) = self.find(id) {
            for p in pos.around() {
                if let Some(b) = self.get_at(p) {
                    out.push(*b);
                }
            }
        }
        out
    }

    /// Every other block of the same kind, any color
    pub fn all_swappable_with(&self, id: BlockId) -> Vec<BlockId> {
        let Some(block) = self.block(id).copied() else {
            return Vec::new();
        };
        self.iter()
            .filter(|(_, b)| block.can_swap_with(b))
            .map(|(_, b)| b.id())
            .collect()
    }

    /// Put `block` where `id` is. Refused when `block` carries an id that
    /// already lives elsewhere on the board. Returns the replaced block.
    pub fn replace_block(&mut self, id: BlockId, block: Block) -> Option<Block> {
        if block.id() != id && self.contains(block.id()) {
            return None;
        }
        let pos = self.find(id)?;
        let slot = self.get_mut(pos)?;
        Some(std::mem::replace(slot, block))
    }

    /// Explicit kind change (special placement, unlock bookkeeping)
    pub fn change_type(&mut self, id: BlockId, kind: BlockKind) -> bool {
        match self.find(id).and_then(|pos| self.get_mut(pos)) {
            Some(block) => {
                block.change_type(kind);
                true
            }
            None => false,
        }
    }

    pub(crate) fn change_color(&mut self, id: BlockId, color: u8) -> bool {
        match self.find(id).and_then(|pos| self.get_mut(pos)) {
            Some(block) => {
                block.change_color(color);
                true
            }
            None => false,
        }
    }

    /// Turn random normal blocks into locks, keys (alternating plain and
    /// wireless) and bombs, up to the configured counts.
    pub fn place_special_blocks(&mut self, rng: &mut BlockRng) -> Vec<BlockId> {
        let mut candidates: Vec<BlockId> = self
            .iter()
            .filter(|(_, b)| b.kind().is_normal())
            .map(|(_, b)| b.id())
            .collect();
        rng.shuffle(&mut candidates);

        let mut kinds = Vec::with_capacity(self.settings.special_count());
        kinds.extend(std::iter::repeat(BlockKind::Lock).take(self.settings.max_locks as usize));
        kinds.extend((0..self.settings.max_keys).map(|i| {
            if i % 2 == 0 {
                BlockKind::Key
            } else {
                BlockKind::WirelessKey
            }
        }));
        kinds.extend(std::iter::repeat(BlockKind::Bomb).take(self.settings.max_bombs as usize));

        let mut placed = Vec::with_capacity(kinds.len());
        for (id, kind) in candidates.into_iter().zip(kinds) {
            if self.change_type(id, kind) {
                placed.push(id);
            }
        }
        placed
    }

    /// Clear the selected/matchable hints on every block
    pub fn clear_hints(&mut self) {
        for block in self.columns.iter_mut().flatten() {
            block.set_selected(false);
            block.set_matchable(false);
        }
    }
}

impl fmt::Display for Board {
    /// Text dump, top row first, one `color+symbol` cell per block
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.height() as i16).rev() {
            for col in 0..self.width() as i16 {
                match self.get(col, row) {
                    Some(b) => write!(f, "{}{} ", b.color(), b.kind().symbol())?,
                    None => write!(f, ".. ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
