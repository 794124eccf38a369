//! Block module - one tile on the board
//!
//! A block is a plain value: id, color index, kind and two transient UI-hint
//! flags. Bombs additionally carry a counter. Rendering handles for a block are
//! owned by the collaborator and keyed by [`BlockId`].

use serde::{Deserialize, Serialize};

use zwap_types::{BlockId, BlockKind, BOMB_FUSE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    id: BlockId,
    color: u8,
    #[serde(rename = "type")]
    kind: BlockKind,
    #[serde(default)]
    is_selected: bool,
    #[serde(default)]
    is_matchable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    counter: Option<i32>,
}

impl Block {
    /// Create a block. Bombs start with an armed counter.
    pub fn new(id: BlockId, color: u8, kind: BlockKind) -> Self {
        Self {
            id,
            color,
            kind,
            is_selected: false,
            is_matchable: false,
            counter: kind.is_bomb().then_some(BOMB_FUSE),
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn color(&self) -> u8 {
        self.color
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn is_matchable(&self) -> bool {
        self.is_matchable
    }

    /// Bomb counter, `None` for every other kind
    pub fn counter(&self) -> Option<i32> {
        self.counter
    }

    pub fn has_same_color_as(&self, other: &Block) -> bool {
        self.color == other.color
    }

    pub fn has_same_type_as(&self, other: &Block) -> bool {
        self.kind == other.kind
    }

    /// A different block of the same kind, in any color
    pub fn can_swap_with(&self, other: &Block) -> bool {
        self.id != other.id && self.has_same_type_as(other)
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.is_selected = selected;
    }

    pub fn set_matchable(&mut self, matchable: bool) {
        self.is_matchable = matchable;
    }

    /// Only the recolorer changes colors.
    pub(crate) fn change_color(&mut self, color: u8) {
        self.color = color;
    }

    /// Turning into a bomb arms the counter; leaving bomb kind clears it.
    pub(crate) fn change_type(&mut self, kind: BlockKind) {
        if kind.is_bomb() && !self.kind.is_bomb() {
            self.counter = Some(BOMB_FUSE);
        } else if !kind.is_bomb() {
            self.counter = None;
        }
        self.kind = kind;
    }

    /// Has no effect on non-bomb blocks.
    pub fn set_counter(&mut self, counter: i32) {
        if self.kind.is_bomb() {
            self.counter = Some(counter);
        }
    }

    /// Decrement a bomb's counter, returning the new value
    pub fn decrement_counter(&mut self) -> Option<i32> {
        let counter = self.counter.as_mut()?;
        *counter -= 1;
        Some(*counter)
    }

    /// Compact `color+symbol` form for logs
    pub fn to_log(&self) -> String {
        format!("{}{}{}", self.id, self.color, self.kind.symbol())
    }
}
