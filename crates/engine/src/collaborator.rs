//! Hooks the turn engine calls while resolving a turn.
//!
//! Renderers, sound, and storage implement [`Collaborator`]. Every method has
//! a no-op default, so an implementation only overrides what it cares about.

use zwap_core::{Block, BlockSet, GameSnapshot, LevelUp, Turn, Unlock};
use zwap_types::BlockId;

/// Answer to a settle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// Blocks are at rest, resolution continues immediately
    Done,
    /// Resolution waits for [`crate::TurnEngine::acknowledge_settle`]
    Pending,
}

pub trait Collaborator {
    /// Selection or matchable highlights changed
    fn on_selection_changed(&mut self, _selected: Option<BlockId>, _matchable: &[BlockId]) {}

    /// Two blocks exchanged grid positions
    fn on_swap_start(&mut self, _a: BlockId, _b: BlockId) {}

    fn on_unlock(&mut self, _unlock: &Unlock) {}

    /// One set was collected, with its bomb sweeps
    fn on_blocks_removed(&mut self, _set: &BlockSet) {}

    /// Refill blocks entered the board
    fn on_blocks_added(&mut self, _blocks: &[Block]) {}

    /// Blocks need to come to rest before the next round
    fn on_settle_requested(&mut self, _blocks: &[BlockId]) -> Settle {
        Settle::Done
    }

    fn on_level_up(&mut self, _level_up: LevelUp) {}

    fn on_turn_finished(&mut self, _turn: &Turn) {}

    /// Store the settled board after a turn
    fn persist(&mut self, _snapshot: &GameSnapshot) {}
}

/// Collaborator that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCollaborator;

impl Collaborator for NoopCollaborator {}

impl<C: Collaborator + ?Sized> Collaborator for Box<C> {
    fn on_selection_changed(&mut self, selected: Option<BlockId>, matchable: &[BlockId]) {
        (**self).on_selection_changed(selected, matchable)
    }

    fn on_swap_start(&mut self, a: BlockId, b: BlockId) {
        (**self).on_swap_start(a, b)
    }

    fn on_unlock(&mut self, unlock: &Unlock) {
        (**self).on_unlock(unlock)
    }

    fn on_blocks_removed(&mut self, set: &BlockSet) {
        (**self).on_blocks_removed(set)
    }

    fn on_blocks_added(&mut self, blocks: &[Block]) {
        (**self).on_blocks_added(blocks)
    }

    fn on_settle_requested(&mut self, blocks: &[BlockId]) -> Settle {
        (**self).on_settle_requested(blocks)
    }

    fn on_level_up(&mut self, level_up: LevelUp) {
        (**self).on_level_up(level_up)
    }

    fn on_turn_finished(&mut self, turn: &Turn) {
        (**self).on_turn_finished(turn)
    }

    fn persist(&mut self, snapshot: &GameSnapshot) {
        (**self).persist(snapshot)
    }
}
