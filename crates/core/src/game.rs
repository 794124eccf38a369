//! Game aggregate - board, progress and randomness of one session
//!
//! [`Game`] exposes the resolution of a turn as small steps so a driver can
//! pause between rounds (the turn engine waits for animations there):
//!
//! 1. [`Game::begin_swap`] or [`Game::begin_unlock`] opens the turn
//! 2. [`Game::collect_round`] resolves one chain reaction, until it returns `None`
//! 3. [`Game::finish_turn`] closes the turn and applies level-ups
//!
//! [`Game::play`] runs all three at once.

use std::collections::HashSet;

use log::{debug, info, warn};

use crate::block::Block;
use crate::board::Board;
use crate::error::{SettingsError, SnapshotError};
use crate::progress::{ChainReaction, GameProgress, LevelUp, MatchInfo, Turn};
use crate::rng::BlockRng;
use crate::scoring::{calculate_unlock_score, score_reaction};
use crate::sets::find_sets;
use crate::settings::GameSettings;
use crate::snapshot::GameSnapshot;
use zwap_types::{BlockId, BlockKind, MatchKind};

/// One resolved chain reaction and the blocks that replaced the collected ones
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub reaction: ChainReaction,
    /// Every block taken off the board, bomb sweeps included
    pub removed: Vec<Block>,
    /// Refill blocks as they sit on the board after recoloring
    pub added: Vec<Block>,
}

/// Result of resolving a key onto a lock
#[derive(Debug, Clone, PartialEq)]
pub struct Unlock {
    pub match_info: MatchInfo,
    pub removed: [Block; 2],
    pub added: Vec<Block>,
    pub score: u64,
}

#[derive(Debug, Clone)]
pub struct Game {
    id: u64,
    settings: GameSettings,
    board: Board,
    progress: GameProgress,
    rng: BlockRng,
}

impl Game {
    /// Start a new game: a full, set-free board with special blocks placed.
    /// The seed doubles as the game id.
    pub fn new(settings: GameSettings, seed: u64) -> Result<Self, SettingsError> {
        let mut rng = BlockRng::new(seed);
        let mut board = Board::new(&settings)?;
        let report = board.fill_columns_to_capacity(&mut rng).recolor;
        let specials = board.place_special_blocks(&mut rng);
        info!(
            "new game {}: {}x{} board, {} special blocks, recolor converged: {}",
            seed,
            settings.columns,
            settings.rows,
            specials.len(),
            report.converged
        );
        Ok(Self {
            id: seed,
            settings,
            board,
            progress: GameProgress::new(),
            rng,
        })
    }

    /// Restore a saved game. `seed` drives the blocks generated from now on.
    pub fn from_snapshot(snapshot: GameSnapshot, seed: u64) -> Result<Self, SnapshotError> {
        snapshot.check_version()?;
        let board = Board::from_columns(&snapshot.settings, snapshot.data)?;
        let mut progress = snapshot.progress;
        // a save taken mid-turn would otherwise refuse every later match
        if progress.close_open_turn() {
            warn!("game {} was saved mid-turn; closing that turn", snapshot.id);
        }
        debug!("restored game {} with {} blocks", snapshot.id, board.count());
        Ok(Self {
            id: snapshot.id,
            settings: snapshot.settings,
            board,
            progress,
            rng: BlockRng::new(seed),
        })
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::new(
            self.id,
            self.settings.clone(),
            self.progress.clone(),
            self.board.to_columns(),
        )
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn progress(&self) -> &GameProgress {
        &self.progress
    }

    /// Classify `second` as a target for `selected`
    pub fn match_kind(&self, selected: BlockId, second: BlockId) -> MatchKind {
        let (Some(a), Some(b)) = (self.board.block(selected), self.board.block(second)) else {
            return MatchKind::None;
        };
        if a.can_swap_with(b) {
            return MatchKind::Swap;
        }
        match (a.kind(), b.kind()) {
            (BlockKind::Key, BlockKind::Lock) => MatchKind::Unlock,
            (BlockKind::WirelessKey, BlockKind::Lock) => MatchKind::UnlockWireless,
            _ => MatchKind::None,
        }
    }

    /// Every legal target for `selected`: same-kind blocks, plus locks for keys
    pub fn matchable_for(&self, selected: BlockId) -> Vec<BlockId> {
        let mut ids = self.board.all_swappable_with(selected);
        if self.board.block(selected).is_some_and(|b| b.kind().is_key()) {
            ids.extend(
                self.board
                    .iter()
                    .filter(|(_, b)| b.kind().is_lock())
                    .map(|(_, b)| b.id()),
            );
        }
        ids
    }

    /// Any match left for the player
    pub fn has_legal_move(&self) -> bool {
        let mut kinds = HashSet::new();
        let mut has_key = false;
        let mut has_lock = false;
        for (_, block) in self.board.iter() {
            if !kinds.insert(block.kind()) {
                return true;
            }
            has_key |= block.kind().is_key();
            has_lock |= block.kind().is_lock();
        }
        has_key && has_lock
    }

    /// Validate and commit a same-kind swap, opening a turn.
    ///
    /// Returns `None` and changes nothing when the pair is not a swap or a
    /// turn is already open.
    pub fn begin_swap(&mut self, selected: BlockId, second: BlockId) -> Option<MatchInfo> {
        if self.progress.has_open_turn() || self.match_kind(selected, second) != MatchKind::Swap {
            return None;
        }
        self.board.swap(selected, second)?;
        let info = MatchInfo {
            kind: MatchKind::Swap,
            selected,
            second,
        };
        self.progress.add_turn(info);
        debug!("swap {} <-> {}", selected, second);
        Some(info)
    }

    /// Resolve a key onto a lock: both leave the board, their values are
    /// scored and the columns are refilled. Opens a turn like a swap does.
    pub fn begin_unlock(&mut self, key: BlockId, lock: BlockId) -> Option<Unlock> {
        if self.progress.has_open_turn() {
            return None;
        }
        let kind = self.match_kind(key, lock);
        if !kind.is_unlock() {
            return None;
        }
        let key_block = *self.board.block(key)?;
        let lock_block = *self.board.block(lock)?;
        let info = MatchInfo {
            kind,
            selected: key,
            second: lock,
        };
        self.progress.add_turn(info);

        let score = calculate_unlock_score(&lock_block, &key_block, &self.settings.scoring);
        self.board.remove_blocks(&HashSet::from([key, lock]));
        let fill = self.board.fill_columns_to_capacity(&mut self.rng);
        self.progress.record_unlock(score, fill.added.len());
        debug!("unlock {} with {}: +{}", lock, key, score);

        Some(Unlock {
            match_info: info,
            removed: [key_block, lock_block],
            added: self.blocks_by_id(&fill.added),
            score,
        })
    }

    /// Resolve one chain reaction on the open turn.
    ///
    /// Finds every set on the board, scores and removes them, refills the
    /// columns and records the reaction. `None` once the board is stable or
    /// when no turn is open.
    pub fn collect_round(&mut self) -> Option<Round> {
        if !self.progress.has_open_turn() {
            return None;
        }
        let mut sets = find_sets(&self.board, None);
        if sets.is_empty() {
            return None;
        }
        let scores = score_reaction(&mut sets, &self.settings.scoring);
        let ids: HashSet<BlockId> = sets.iter().flat_map(|s| s.ids()).collect();
        let removed = self.board.remove_blocks(&ids);
        let fill = self.board.fill_columns_to_capacity(&mut self.rng);
        let added = self.blocks_by_id(&fill.added);

        let reaction = self
            .progress
            .record_reaction(sets, fill.added, scores)?
            .clone();
        debug!(
            "chain reaction {}: {} sets, {} blocks, total {}",
            reaction.reaction_nr,
            reaction.sets.len(),
            removed.len(),
            reaction.scores.total
        );
        Some(Round {
            reaction,
            removed,
            added,
        })
    }

    /// Close the open turn. Marks the game over when no match is left.
    pub fn finish_turn(&mut self) -> Option<LevelUp> {
        let level_up = self.progress.finish_turn(self.settings.progress_needed);
        if let Some(turn) = self.progress.turn() {
            info!(
                "turn {} finished: {} reactions, +{} points, score {}",
                self.progress.statistics.turns_played,
                turn.chain_reactions.len(),
                turn.total_score(),
                self.progress.score
            );
        }
        if !self.has_legal_move() {
            info!("no legal move left, game over");
            self.progress.game_over = true;
        }
        level_up
    }

    /// Resolve a whole turn without pausing between rounds
    pub fn play(&mut self, selected: BlockId, second: BlockId) -> Option<&Turn> {
        match self.match_kind(selected, second) {
            MatchKind::Swap => {
                self.begin_swap(selected, second)?;
            }
            MatchKind::Unlock | MatchKind::UnlockWireless => {
                self.begin_unlock(selected, second)?;
            }
            MatchKind::None => return None,
        }
        while self.collect_round().is_some() {}
        self.finish_turn();
        self.progress.turn()
    }

    fn blocks_by_id(&self, ids: &[BlockId]) -> Vec<Block> {
        ids.iter()
            .filter_map(|&id| self.board.block(id).copied())
            .collect()
    }
}
