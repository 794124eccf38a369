//! Turn engine - the selection and resolution state machine
//!
//! ```text
//! Idle --select A--> AwaitingSecondSelection --select A / non-matchable--> Idle
//!                            |
//!                            +--select B in matchable(A)--> Resolving --turn done--> Idle
//! ```
//!
//! While `Resolving`, player input is ignored. Each chain reaction ends at a
//! settle point; when the collaborator answers [`Settle::Pending`] the engine
//! stops until [`TurnEngine::acknowledge_settle`] is called.

use log::{debug, info};

use crate::collaborator::{Collaborator, Settle};
use zwap_core::{Block, Game};
use zwap_types::{BlockId, MatchKind};

/// Where the resolution of a turn stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStep {
    /// Swap or unlock committed, waiting before the first round
    Matched,
    /// A chain reaction was collected and refilled
    Round(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    AwaitingSecondSelection {
        selected: BlockId,
        matchable: Vec<BlockId>,
        /// Matchable block the pointer is hovering, if any
        second: Option<BlockId>,
    },
    Resolving {
        step: ResolveStep,
    },
}

impl FlowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::AwaitingSecondSelection { .. } => "awaiting_second_selection",
            FlowState::Resolving { .. } => "resolving",
        }
    }
}

/// What an input did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// No state change
    Ignored,
    Selected(BlockId),
    Deselected,
    /// The hovered second option changed
    SecondOption(BlockId),
    /// A match was committed; the turn may still be waiting on a settle
    Matched(MatchKind),
    /// A pending settle was acknowledged and resolution continued
    Resumed,
}

pub struct TurnEngine<C> {
    game: Game,
    state: FlowState,
    collaborator: C,
}

impl<C: Collaborator> TurnEngine<C> {
    pub fn new(game: Game, collaborator: C) -> Self {
        Self {
            game,
            state: FlowState::Idle,
            collaborator,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn collaborator(&self) -> &C {
        &self.collaborator
    }

    pub fn collaborator_mut(&mut self) -> &mut C {
        &mut self.collaborator
    }

    /// Player input is rejected while a turn resolves or once the game is over
    pub fn interaction_disabled(&self) -> bool {
        matches!(self.state, FlowState::Resolving { .. }) || self.game.progress().is_over()
    }

    pub fn selected(&self) -> Option<BlockId> {
        match &self.state {
            FlowState::AwaitingSecondSelection { selected, .. } => Some(*selected),
            _ => None,
        }
    }

    pub fn matchable(&self) -> &[BlockId] {
        match &self.state {
            FlowState::AwaitingSecondSelection { matchable, .. } => matchable,
            _ => &[],
        }
    }

    /// Discard the current game, including a turn in progress
    pub fn replace_game(&mut self, game: Game) -> Game {
        info!("replacing game {} with {}", self.game.id(), game.id());
        self.state = FlowState::Idle;
        std::mem::replace(&mut self.game, game)
    }

    pub fn into_parts(self) -> (Game, C) {
        (self.game, self.collaborator)
    }

    /// Select a block, or pick the second block of a match.
    ///
    /// With nothing selected the block becomes selected. Selecting the
    /// selected block again, or a block that is not matchable, deselects.
    /// A matchable block starts the turn.
    pub fn select(&mut self, id: BlockId) -> InputOutcome {
        if self.interaction_disabled() || !self.game.board().contains(id) {
            return InputOutcome::Ignored;
        }
        let leaves_selection = match &self.state {
            FlowState::Idle => return self.select_first(id),
            FlowState::AwaitingSecondSelection {
                selected,
                matchable,
                ..
            } => *selected == id || !matchable.contains(&id),
            FlowState::Resolving { .. } => return InputOutcome::Ignored,
        };
        if leaves_selection {
            self.deselect()
        } else {
            self.attempt_match(id)
        }
    }

    fn select_first(&mut self, id: BlockId) -> InputOutcome {
        let matchable = self.game.matchable_for(id);
        let board = self.game.board_mut();
        if let Some(block) = board.block_mut(id) {
            block.set_selected(true);
        }
        for &m in &matchable {
            if let Some(block) = board.block_mut(m) {
                block.set_matchable(true);
            }
        }
        debug!("selected {} ({} matchable)", id, matchable.len());
        self.collaborator.on_selection_changed(Some(id), &matchable);
        self.state = FlowState::AwaitingSecondSelection {
            selected: id,
            matchable,
            second: None,
        };
        InputOutcome::Selected(id)
    }

    /// Drop the current selection
    pub fn deselect(&mut self) -> InputOutcome {
        if !matches!(self.state, FlowState::AwaitingSecondSelection { .. }) {
            return InputOutcome::Ignored;
        }
        self.game.board_mut().clear_hints();
        self.state = FlowState::Idle;
        self.collaborator.on_selection_changed(None, &[]);
        InputOutcome::Deselected
    }

    /// Remember the matchable block the pointer hovers
    pub fn set_second_option(&mut self, id: Option<BlockId>) -> InputOutcome {
        let FlowState::AwaitingSecondSelection {
            selected,
            matchable,
            second,
        } = &mut self.state
        else {
            return InputOutcome::Ignored;
        };
        match id {
            Some(id) if id != *selected && matchable.contains(&id) && *second != Some(id) => {
                *second = Some(id);
                InputOutcome::SecondOption(id)
            }
            None if second.is_some() => {
                *second = None;
                InputOutcome::Ignored
            }
            _ => InputOutcome::Ignored,
        }
    }

    /// Match the selected block with `second`; anything but a legal target
    /// leaves the state unchanged.
    pub fn attempt_match(&mut self, second: BlockId) -> InputOutcome {
        let Some(selected) = self.selected() else {
            return InputOutcome::Ignored;
        };
        if self.interaction_disabled() {
            return InputOutcome::Ignored;
        }
        let kind = self.game.match_kind(selected, second);
        // blocks the presentation has to settle before the first round
        let moved = match kind {
            MatchKind::None => return InputOutcome::Ignored,
            MatchKind::Swap => {
                if self.game.begin_swap(selected, second).is_none() {
                    return InputOutcome::Ignored;
                }
                self.enter_resolving();
                self.collaborator.on_swap_start(selected, second);
                vec![selected, second]
            }
            MatchKind::Unlock | MatchKind::UnlockWireless => {
                let Some(unlock) = self.game.begin_unlock(selected, second) else {
                    return InputOutcome::Ignored;
                };
                self.enter_resolving();
                self.collaborator.on_unlock(&unlock);
                self.collaborator.on_blocks_added(&unlock.added);
                unlock.added.iter().map(Block::id).collect()
            }
        };

        if self.collaborator.on_settle_requested(&moved) == Settle::Done {
            self.advance();
        }
        InputOutcome::Matched(kind)
    }

    fn enter_resolving(&mut self) {
        self.game.board_mut().clear_hints();
        self.collaborator.on_selection_changed(None, &[]);
        self.state = FlowState::Resolving {
            step: ResolveStep::Matched,
        };
    }

    /// Continue a turn that waits on a settle
    pub fn acknowledge_settle(&mut self) -> InputOutcome {
        if !matches!(self.state, FlowState::Resolving { .. }) {
            return InputOutcome::Ignored;
        }
        self.advance();
        InputOutcome::Resumed
    }

    /// Run chain reactions until one needs a settle or the board is stable
    fn advance(&mut self) {
        while let Some(round) = self.game.collect_round() {
            for set in &round.reaction.sets {
                self.collaborator.on_blocks_removed(set);
            }
            self.collaborator.on_blocks_added(&round.added);
            self.state = FlowState::Resolving {
                step: ResolveStep::Round(round.reaction.reaction_nr),
            };
            let ids: Vec<BlockId> = round.added.iter().map(|b| b.id()).collect();
            if self.collaborator.on_settle_requested(&ids) == Settle::Pending {
                return;
            }
        }
        self.complete_turn();
    }

    fn complete_turn(&mut self) {
        if let Some(level_up) = self.game.finish_turn() {
            self.collaborator.on_level_up(level_up);
        }
        if let Some(turn) = self.game.progress().turn() {
            self.collaborator.on_turn_finished(turn);
        }
        self.collaborator.persist(&self.game.snapshot());
        self.state = FlowState::Idle;
    }
}
