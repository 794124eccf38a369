//! Progress module - score, level and turn history
//!
//! [`GameProgress`] is the only writer of score and level. The turn engine
//! opens a [`Turn`] per player match, records one [`ChainReaction`] per
//! resolved round and closes the turn, which is where level-ups happen.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::scoring::ReactionScores;
use crate::sets::{BlockSet, Center};
use zwap_types::{BlockId, MatchKind, LEVEL_UP_BONUS, TURN_HISTORY_LIMIT};

/// The two blocks of a player match and how they matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    pub kind: MatchKind,
    pub selected: BlockId,
    pub second: BlockId,
}

/// One round of set removal and refill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReaction {
    /// Zero-based round index within the turn
    pub reaction_nr: usize,
    pub sets: Vec<BlockSet>,
    /// Ids of the blocks generated by the refill
    pub added_blocks: Vec<BlockId>,
    pub scores: ReactionScores,
    /// Average of the set centers
    pub center: Center,
}

impl ChainReaction {
    /// Primary and extra blocks collected this round
    pub fn collected_blocks(&self) -> usize {
        self.sets.iter().map(|s| s.blocks.len() + s.extra_blocks.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub match_info: MatchInfo,
    pub chain_reactions: Vec<ChainReaction>,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_score: Option<u64>,
}

impl Turn {
    pub fn new(match_info: MatchInfo) -> Self {
        Self {
            match_info,
            chain_reactions: Vec::new(),
            done: false,
            unlock_score: None,
        }
    }

    /// Points this turn earned, unlock included
    pub fn total_score(&self) -> u64 {
        self.chain_reactions
            .iter()
            .map(|r| r.scores.total)
            .fold(self.unlock_score.unwrap_or(0), u64::saturating_add)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    /// Every turn ever opened, including those dropped from the history
    pub turns_played: u64,
    pub sets_collected: u64,
    pub blocks_collected: u64,
    /// Most chain reactions in a single turn
    pub longest_chain: u32,
    pub unlocks: u64,
    pub level_ups: u32,
}

/// Outcome of closing a turn that crossed the progress threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    /// Level after the level-up
    pub level: u32,
    pub bonus: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameProgress {
    pub started: bool,
    pub game_over: bool,
    pub score: u64,
    pub level: u32,
    pub level_progress: u32,
    pub moves_without_reaction: u32,
    /// Latest turns, at most [`TURN_HISTORY_LIMIT`]
    pub turns: Vec<Turn>,
    pub statistics: Statistics,
}

impl Default for GameProgress {
    fn default() -> Self {
        Self {
            started: false,
            game_over: false,
            score: 0,
            level: 1,
            level_progress: 0,
            moves_without_reaction: 0,
            turns: Vec::new(),
            statistics: Statistics::default(),
        }
    }
}

impl GameProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_over(&self) -> bool {
        self.started && self.game_over
    }

    /// Open a new turn for a player match
    pub fn add_turn(&mut self, match_info: MatchInfo) -> &mut Turn {
        self.started = true;
        self.statistics.turns_played += 1;
        if self.turns.len() >= TURN_HISTORY_LIMIT {
            let excess = self.turns.len() + 1 - TURN_HISTORY_LIMIT;
            self.turns.drain(..excess);
        }
        self.turns.push(Turn::new(match_info));
        let last = self.turns.len() - 1;
        &mut self.turns[last]
    }

    /// The latest turn, open or done
    pub fn turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    fn open_turn_mut(&mut self) -> Option<&mut Turn> {
        self.turns.last_mut().filter(|t| !t.done)
    }

    pub fn has_open_turn(&self) -> bool {
        self.turns.last().is_some_and(|t| !t.done)
    }

    /// Mark an unfinished turn done without touching score or streaks.
    /// Returns whether a turn was open.
    pub fn close_open_turn(&mut self) -> bool {
        let Some(turn) = self.open_turn_mut() else {
            return false;
        };
        turn.done = true;
        debug!(
            "closed unfinished turn with {} reactions",
            turn.chain_reactions.len()
        );
        true
    }

    /// Record a resolved round on the open turn and apply its score.
    ///
    /// Returns `None` (and changes nothing) without an open turn.
    pub fn record_reaction(
        &mut self,
        sets: Vec<BlockSet>,
        added_blocks: Vec<BlockId>,
        scores: ReactionScores,
    ) -> Option<&ChainReaction> {
        let centers: Vec<Center> = sets.iter().map(|s| s.center).collect();
        let center = if centers.is_empty() {
            Center::default()
        } else {
            let n = centers.len() as f32;
            Center {
                x: centers.iter().map(|c| c.x).sum::<f32>() / n,
                y: centers.iter().map(|c| c.y).sum::<f32>() / n,
            }
        };

        let turn = self.turns.last_mut().filter(|t| !t.done)?;
        let reaction = ChainReaction {
            reaction_nr: turn.chain_reactions.len(),
            sets,
            added_blocks,
            scores,
            center,
        };

        self.score = self.score.saturating_add(reaction.scores.total);
        self.level_progress = self
            .level_progress
            .saturating_add(reaction.added_blocks.len() as u32);
        self.statistics.sets_collected += reaction.sets.len() as u64;
        self.statistics.blocks_collected += reaction.collected_blocks() as u64;

        turn.chain_reactions.push(reaction);
        turn.chain_reactions.last()
    }

    /// Record a key/lock unlock on the open turn
    pub fn record_unlock(&mut self, score: u64, added_blocks: usize) -> bool {
        let Some(turn) = self.open_turn_mut() else {
            return false;
        };
        turn.unlock_score = Some(score);
        self.score = self.score.saturating_add(score);
        self.level_progress = self.level_progress.saturating_add(added_blocks as u32);
        self.statistics.unlocks += 1;
        true
    }

    /// Close the open turn, update the reaction streak and apply a level-up
    /// when `level_progress` has reached `progress_needed`.
    pub fn finish_turn(&mut self, progress_needed: u32) -> Option<LevelUp> {
        let turn = self.open_turn_mut()?;
        turn.done = true;
        let reactions = turn.chain_reactions.len() as u32;

        self.statistics.longest_chain = self.statistics.longest_chain.max(reactions);
        if reactions == 0 {
            self.moves_without_reaction += 1;
        } else {
            self.moves_without_reaction = 0;
        }
        self.check_level_up(progress_needed)
    }

    /// Apply a level-up when the threshold is reached
    pub fn check_level_up(&mut self, progress_needed: u32) -> Option<LevelUp> {
        if self.level_progress < progress_needed {
            return None;
        }
        let bonus = u64::from(self.level).saturating_mul(LEVEL_UP_BONUS);
        self.level_progress = 0;
        self.score = self.score.saturating_add(bonus);
        self.level += 1;
        self.moves_without_reaction = 0;
        self.statistics.level_ups += 1;
        info!("level up: now level {} (+{} points)", self.level, bonus);
        Some(LevelUp {
            level: self.level,
            bonus,
        })
    }
}
