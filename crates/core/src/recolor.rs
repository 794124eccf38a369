//! Anti-deadlock recoloring
//!
//! After generation or a refill the board must not contain a set the player
//! did not make. Each pass finds the sets touching the candidate blocks and
//! gives one block per set a new color, until a pass finds nothing.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::rng::BlockRng;
use crate::sets::find_sets;
use zwap_types::{BlockId, MAX_RECOLOR_PASSES};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecolorReport {
    /// Detection passes that found at least one set
    pub passes: usize,
    /// Color changes applied, fallback included
    pub recolored: usize,
    /// False when the pass cap was hit and the fallback ran
    pub converged: bool,
}

/// Recolor until no set contains a candidate (the whole board when `None`).
///
/// Only `blocks[0]` of each found set changes, and `blocks[0]` is always a
/// candidate, so blocks outside the candidates keep their colors.
pub fn unchain_by_recoloring(
    board: &mut Board,
    rng: &mut BlockRng,
    candidates: Option<&[BlockId]>,
) -> RecolorReport {
    let max_colors = board.settings().max_colors as u32;
    let mut report = RecolorReport {
        converged: true,
        ..RecolorReport::default()
    };

    loop {
        let sets = find_sets(board, candidates);
        if sets.is_empty() {
            return report;
        }
        if report.passes >= MAX_RECOLOR_PASSES {
            break;
        }
        report.passes += 1;
        debug!("recolor pass {}: {} sets", report.passes, sets.len());
        for set in &sets {
            let block = set.blocks[0];
            let offset = 1 + rng.next_range(max_colors);
            let color = ((block.color() as u32 + offset) % max_colors) as u8;
            board.change_color(block.id(), color);
            report.recolored += 1;
        }
    }

    warn!(
        "recoloring did not converge after {} passes, forcing neighbor-free colors",
        MAX_RECOLOR_PASSES
    );
    report.converged = false;
    for set in find_sets(board, candidates) {
        let id = set.blocks[0].id();
        let color = least_conflicting_color(board, id, max_colors as u8);
        board.change_color(id, color);
        report.recolored += 1;
    }
    report
}

/// A color no neighbor has, or else the rarest neighbor color
fn least_conflicting_color(board: &Board, id: BlockId, max_colors: u8) -> u8 {
    let mut counts = vec![0usize; max_colors as usize];
    for neighbor in board.neighbors(id) {
        if let Some(n) = counts.get_mut(neighbor.color() as usize) {
            *n += 1;
        }
    }
    counts
        .iter()
        .enumerate()
        .min_by_key(|&(color, &n)| (n, color))
        .map(|(color, _)| color as u8)
        .unwrap_or(0)
}
