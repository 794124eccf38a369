//! Set finder - flood-fill grouping of same-color blocks
//!
//! A set is a maximal 4-connected group of same-color blocks holding at least
//! [`MIN_SET_LENGTH`] members. Shapes are ignored for connectivity. Every bomb
//! inside a kept set sweeps its grid neighbors into the set's extra blocks.
//!
//! Sets returned by one call are disjoint over all their ids (primary and
//! extra), so the caller can remove them in any order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::board::Board;
use zwap_types::{BlockId, Position, MIN_SET_LENGTH};

/// Average grid position of a set's members, in cell units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub x: f32,
    pub y: f32,
}

impl Center {
    /// Mean of the given positions, the origin for an empty list
    pub fn of(positions: &[Position]) -> Self {
        if positions.is_empty() {
            return Self::default();
        }
        let n = positions.len() as f32;
        let (sx, sy) = positions
            .iter()
            .fold((0.0, 0.0), |(x, y), p| (x + p.col as f32, y + p.row as f32));
        Self { x: sx / n, y: sy / n }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSet {
    /// The connected same-color group; `blocks[0]` is the block the fill started from
    pub blocks: Vec<Block>,
    /// Grid positions of `blocks`, index-aligned
    pub positions: Vec<Position>,
    /// Blocks swept in by bombs, outside the color group
    pub extra_blocks: Vec<Block>,
    pub center: Center,
    /// Filled in by scoring
    pub score: u64,
}

impl BlockSet {
    fn new(members: Vec<(Position, Block)>) -> Self {
        let (positions, blocks): (Vec<_>, Vec<_>) = members.into_iter().unzip();
        Self {
            center: Center::of(&positions),
            blocks,
            positions,
            extra_blocks: Vec::new(),
            score: 0,
        }
    }

    /// Number of primary blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn has_minimum_length(&self) -> bool {
        self.blocks.len() >= MIN_SET_LENGTH
    }

    /// Primary and extra blocks
    pub fn all_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().chain(self.extra_blocks.iter())
    }

    /// Ids of primary and extra blocks
    pub fn ids(&self) -> Vec<BlockId> {
        self.all_blocks().map(Block::id).collect()
    }

    pub fn bombs(&self) -> Vec<&Block> {
        self.blocks.iter().filter(|b| b.kind().is_bomb()).collect()
    }

    /// Every block shares one shape; bombs and keys count as any shape.
    pub fn is_pure_type(&self) -> bool {
        let mut shape = None;
        self.blocks
            .iter()
            .map(Block::kind)
            .filter(|k| !k.is_bomb() && !k.is_key())
            .all(|k| *shape.get_or_insert(k) == k)
    }

    pub fn contains_lock(&self) -> bool {
        self.blocks.iter().any(|b| b.kind().is_lock())
    }

    pub fn contains_key(&self) -> bool {
        self.blocks.iter().any(|b| b.kind().is_key())
    }

    /// Compact form for logs, e.g. `[#3 0● #4 0■ ...]`
    pub fn to_log(&self) -> String {
        let parts: Vec<String> = self.blocks.iter().map(Block::to_log).collect();
        format!("[{}]", parts.join(" "))
    }
}

/// Collect the same-color component containing `start`
fn flood_fill(board: &Board, start: Position, seen: &mut HashSet<Position>) -> Vec<(Position, Block)> {
    let Some(&seed) = board.get_at(start) else {
        return Vec::new();
    };
    let mut component = Vec::new();
    let mut stack = vec![start];
    seen.insert(start);

    while let Some(pos) = stack.pop() {
        let Some(&block) = board.get_at(pos) else {
            continue;
        };
        component.push((pos, block));
        for next in pos.around() {
            if seen.contains(&next) {
                continue;
            }
            if let Some(neighbor) = board.get_at(next) {
                if neighbor.has_same_color_as(&seed) {
                    seen.insert(next);
                    stack.push(next);
                }
            }
        }
    }
    component
}

/// Find every set reachable from the candidates (the whole board when `None`).
///
/// Candidates are visited in column-major, bottom-to-top order; candidate ids
/// that are not on the board are skipped.
pub fn find_sets(board: &Board, candidates: Option<&[BlockId]>) -> Vec<BlockSet> {
    let mut starts: Vec<Position> = match candidates {
        None => board.iter().map(|(pos, _)| pos).collect(),
        Some(ids) => ids.iter().filter_map(|&id| board.find(id)).collect(),
    };
    starts.sort_by_key(|p| (p.col, p.row));

    let mut seen = HashSet::new();
    let mut sets = Vec::new();
    for start in starts {
        if seen.contains(&start) {
            continue;
        }
        let component = flood_fill(board, start, &mut seen);
        if component.len() >= MIN_SET_LENGTH {
            sets.push(BlockSet::new(component));
        }
    }

    sweep_bomb_neighbors(board, &mut sets);
    sets
}

/// Add bomb neighbors as extra blocks. A block already owned by any set is
/// never swept again.
fn sweep_bomb_neighbors(board: &Board, sets: &mut [BlockSet]) {
    let mut claimed: HashSet<BlockId> = sets
        .iter()
        .flat_map(|s| s.blocks.iter().map(Block::id))
        .collect();

    for set in sets.iter_mut() {
        let bomb_positions: Vec<Position> = set
            .blocks
            .iter()
            .zip(&set.positions)
            .filter(|(b, _)| b.kind().is_bomb())
            .map(|(_, &p)| p)
            .collect();
        for pos in bomb_positions {
            for next in pos.around() {
                if let Some(&neighbor) = board.get_at(next) {
                    if claimed.insert(neighbor.id()) {
                        set.extra_blocks.push(neighbor);
                    }
                }
            }
        }
    }
}
