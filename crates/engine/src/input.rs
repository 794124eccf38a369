//! Pointer input in board coordinates
//!
//! The input collaborator turns screen events into grid cells; this module
//! maps them onto selection and match calls:
//!
//! | Event | Nothing selected | Something selected |
//! |-------|------------------|--------------------|
//! | down  | select the block | deselect when it is the selected block |
//! | up    | nothing          | attempt the match, then deselect when the block differs |
//! | move  | nothing          | remember a hovered matchable block |

use serde::{Deserialize, Serialize};

use crate::collaborator::Collaborator;
use crate::flow::{FlowState, InputOutcome, TurnEngine};
use zwap_types::{BlockId, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Up,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub col: i16,
    pub row: i16,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, col: i16, row: i16) -> Self {
        Self { kind, col, row }
    }

    pub fn position(&self) -> Position {
        Position::new(self.col, self.row)
    }
}

impl<C: Collaborator> TurnEngine<C> {
    pub fn handle_pointer(&mut self, event: PointerEvent) -> InputOutcome {
        match event.kind {
            PointerKind::Down => self.pointer_down(event.position()),
            PointerKind::Up => self.pointer_up(event.position()),
            PointerKind::Move => self.pointer_move(event.position()),
        }
    }

    fn block_at(&self, pos: Position) -> Option<BlockId> {
        self.game().board().get_at(pos).map(|b| b.id())
    }

    pub fn pointer_down(&mut self, pos: Position) -> InputOutcome {
        if self.interaction_disabled() {
            return InputOutcome::Ignored;
        }
        let Some(id) = self.block_at(pos) else {
            return InputOutcome::Ignored;
        };
        match self.selected() {
            None => self.select(id),
            Some(selected) if selected == id => self.deselect(),
            Some(_) => InputOutcome::Ignored,
        }
    }

    pub fn pointer_up(&mut self, pos: Position) -> InputOutcome {
        if self.interaction_disabled() {
            return InputOutcome::Ignored;
        }
        let Some(id) = self.block_at(pos) else {
            return InputOutcome::Ignored;
        };
        let Some(selected) = self.selected() else {
            return InputOutcome::Ignored;
        };
        if selected == id {
            return InputOutcome::Ignored;
        }
        match self.attempt_match(id) {
            InputOutcome::Ignored => self.deselect(),
            outcome => outcome,
        }
    }

    pub fn pointer_move(&mut self, pos: Position) -> InputOutcome {
        if self.interaction_disabled() || !matches!(self.state(), FlowState::AwaitingSecondSelection { .. }) {
            return InputOutcome::Ignored;
        }
        let target = self
            .block_at(pos)
            .filter(|id| self.matchable().contains(id));
        self.set_second_option(target)
    }
}
