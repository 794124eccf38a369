//! Core types module - shared data structures and constants
//!
//! This module defines the plain data used throughout the workspace: block
//! identifiers, block kinds, the color palette, grid positions and match kinds.
//! Nothing here carries game logic beyond conversions, so the types can be used
//! from the core, the turn engine and the adapters alike.
//!
//! # Grid Coordinates
//!
//! The board is indexed `[column][row]`:
//!
//! - **Columns**: `0..columns`, left to right
//! - **Rows**: `0..rows`, row 0 is the **bottom** row, blocks fall towards it
//!
//! # Block Kinds
//!
//! | Index | Kind | Notes |
//! |-------|------|-------|
//! | 0-7 | `Circle` .. `Wave` | Normal shapes, drawn randomly |
//! | 8 | `Lock` | Opened by a key |
//! | 9 | `Key` | Unlocks a lock |
//! | 10 | `WirelessKey` | Unlocks a lock |
//! | 11 | `Bomb` | Sweeps its neighbors when collected |
//!
//! # Rule Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_SET_LENGTH` | 4 | Smallest connected group that is removed |
//! | `MAX_RECOLOR_PASSES` | 100 | Anti-deadlock iteration cap |
//! | `LEVEL_UP_BONUS` | 100 | Score bonus per level on level-up |
//! | `BOMB_FUSE` | 5 | Counter given to a freshly armed bomb |
//!
//! # Examples
//!
//! ```
//! use zwap_types::{BlockKind, MatchKind, Position};
//!
//! let kind = BlockKind::from_index(11).unwrap();
//! assert_eq!(kind, BlockKind::Bomb);
//! assert!(kind.is_bomb());
//!
//! assert!(BlockKind::WirelessKey.is_key());
//! assert!(!Position::NOT_FOUND.is_found());
//! assert_eq!(MatchKind::from_str("unlock-wireless"), Some(MatchKind::UnlockWireless));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum number of connected same-color blocks that form a removable set
pub const MIN_SET_LENGTH: usize = 4;

/// Maximum number of anti-deadlock detection passes before the fallback kicks in
pub const MAX_RECOLOR_PASSES: usize = 100;

/// Score bonus multiplied by the current level when levelling up
pub const LEVEL_UP_BONUS: u64 = 100;

/// Counter value given to a block when it becomes a bomb
pub const BOMB_FUSE: i32 = 5;

/// Snapshot format version written by this build
pub const SNAPSHOT_VERSION: u32 = 1;

/// Number of normal (randomly drawn) block shapes
pub const NORMAL_KIND_COUNT: u8 = 8;

/// Number of colors in the palette
pub const PALETTE_SIZE: u8 = 10;

/// Default board width (columns)
pub const DEFAULT_COLUMNS: u8 = 8;

/// Default board height (rows)
pub const DEFAULT_ROWS: u8 = 12;

/// Default level progress needed to level up
pub const DEFAULT_PROGRESS_NEEDED: u32 = 100;

/// Finished turns kept in the saved history; older ones are dropped
pub const TURN_HISTORY_LIMIT: usize = 64;

/// Unique, stable identifier of a block on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cell coordinate on the board (`row` 0 is the bottom row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub col: i16,
    pub row: i16,
}

impl Position {
    /// Sentinel returned for blocks that are not on the board
    pub const NOT_FOUND: Position = Position { col: -1, row: -1 };

    pub const fn new(col: i16, row: i16) -> Self {
        Self { col, row }
    }

    pub fn is_found(&self) -> bool {
        self.col >= 0 && self.row >= 0
    }

    /// The four orthogonal neighbors in up, down, left, right order.
    /// Callers filter out-of-bounds positions.
    pub fn around(&self) -> [Position; 4] {
        [
            Position::new(self.col, self.row + 1),
            Position::new(self.col, self.row - 1),
            Position::new(self.col - 1, self.row),
            Position::new(self.col + 1, self.row),
        ]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Block kinds (the block "type")
///
/// The eight normal shapes are the only kinds drawn at random. The four
/// special kinds are placed explicitly:
/// - **Lock**: removed by matching a key onto it
/// - **Key** / **WirelessKey**: consumed when unlocking a lock
/// - **Bomb**: sweeps its grid neighbors when its set is collected
///
/// Serialized as its integer type index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BlockKind {
    Circle,
    Square,
    Triangle,
    Star,
    Plus,
    Xmark,
    Heart,
    Wave,
    Lock,
    Key,
    WirelessKey,
    Bomb,
}

impl BlockKind {
    /// All kinds in type-index order
    pub const ALL: [BlockKind; 12] = [
        BlockKind::Circle,
        BlockKind::Square,
        BlockKind::Triangle,
        BlockKind::Star,
        BlockKind::Plus,
        BlockKind::Xmark,
        BlockKind::Heart,
        BlockKind::Wave,
        BlockKind::Lock,
        BlockKind::Key,
        BlockKind::WirelessKey,
        BlockKind::Bomb,
    ];

    /// Look up a kind by its type index
    ///
    /// # Examples
    ///
    /// ```
    /// use zwap_types::BlockKind;
    ///
    /// assert_eq!(BlockKind::from_index(0), Some(BlockKind::Circle));
    /// assert_eq!(BlockKind::from_index(8), Some(BlockKind::Lock));
    /// assert_eq!(BlockKind::from_index(12), None);
    /// ```
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// The `n`-th normal shape, wrapping around the normal range
    pub fn normal(n: u8) -> Self {
        Self::ALL[(n % NORMAL_KIND_COUNT) as usize]
    }

    pub fn is_normal(self) -> bool {
        self.index() < NORMAL_KIND_COUNT
    }

    /// Key or wireless key
    pub fn is_key(self) -> bool {
        matches!(self, BlockKind::Key | BlockKind::WirelessKey)
    }

    pub fn is_lock(self) -> bool {
        self == BlockKind::Lock
    }

    pub fn is_bomb(self) -> bool {
        self == BlockKind::Bomb
    }

    /// Single-character symbol for logs and text dumps
    pub fn symbol(self) -> char {
        match self {
            BlockKind::Circle => '●',
            BlockKind::Square => '■',
            BlockKind::Triangle => '▲',
            BlockKind::Star => '★',
            BlockKind::Plus => '✚',
            BlockKind::Xmark => '✖',
            BlockKind::Heart => '♥',
            BlockKind::Wave => '⬟',
            BlockKind::Lock => 'L',
            BlockKind::Key => 'K',
            BlockKind::WirelessKey => 'W',
            BlockKind::Bomb => 'B',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Circle => "circle",
            BlockKind::Square => "square",
            BlockKind::Triangle => "triangle",
            BlockKind::Star => "star",
            BlockKind::Plus => "plus",
            BlockKind::Xmark => "xmark",
            BlockKind::Heart => "heart",
            BlockKind::Wave => "wave",
            BlockKind::Lock => "lock",
            BlockKind::Key => "key",
            BlockKind::WirelessKey => "keyWireless",
            BlockKind::Bomb => "bomb",
        }
    }
}

impl From<BlockKind> for u8 {
    fn from(kind: BlockKind) -> u8 {
        kind.index()
    }
}

impl TryFrom<u8> for BlockKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        BlockKind::from_index(value).ok_or_else(|| format!("unknown block type index {}", value))
    }
}

/// The color palette
///
/// Blocks store a color index; `max_colors` in the settings selects how many
/// palette entries (from the front) are in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockColor {
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
    Orange,
    Pink,
    White,
    Black,
}

impl BlockColor {
    pub const ALL: [BlockColor; PALETTE_SIZE as usize] = [
        BlockColor::Red,
        BlockColor::Green,
        BlockColor::Blue,
        BlockColor::Yellow,
        BlockColor::Magenta,
        BlockColor::Cyan,
        BlockColor::Orange,
        BlockColor::Pink,
        BlockColor::White,
        BlockColor::Black,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// RGB hex code
    pub fn hex(self) -> &'static str {
        match self {
            BlockColor::Red => "#ff0000",
            BlockColor::Green => "#00ff00",
            BlockColor::Blue => "#0000ff",
            BlockColor::Yellow => "#ffff00",
            BlockColor::Magenta => "#ff22ff",
            BlockColor::Cyan => "#00ffff",
            BlockColor::Orange => "#ff9900",
            BlockColor::Pink => "#ff64c8",
            BlockColor::White => "#ffffff",
            BlockColor::Black => "#000000",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockColor::Red => "red",
            BlockColor::Green => "green",
            BlockColor::Blue => "blue",
            BlockColor::Yellow => "yellow",
            BlockColor::Magenta => "magenta",
            BlockColor::Cyan => "cyan",
            BlockColor::Orange => "orange",
            BlockColor::Pink => "pink",
            BlockColor::White => "white",
            BlockColor::Black => "black",
        }
    }
}

/// How a second selection relates to the first one
///
/// - **None**: not a legal target, nothing happens
/// - **Swap**: same kind, the two blocks exchange positions
/// - **Unlock**: a key selected onto a lock
/// - **UnlockWireless**: a wireless key selected onto a lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    None,
    Swap,
    Unlock,
    UnlockWireless,
}

impl MatchKind {
    /// Parse a match kind from its wire name
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(MatchKind::None),
            "swap" => Some(MatchKind::Swap),
            "unlock" => Some(MatchKind::Unlock),
            "unlock-wireless" => Some(MatchKind::UnlockWireless),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::None => "none",
            MatchKind::Swap => "swap",
            MatchKind::Unlock => "unlock",
            MatchKind::UnlockWireless => "unlock-wireless",
        }
    }

    pub fn is_unlock(&self) -> bool {
        matches!(self, MatchKind::Unlock | MatchKind::UnlockWireless)
    }
}
