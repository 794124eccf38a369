//! Error types for construction-time faults.
//!
//! Player-facing operations never fail; they report "ignored" outcomes instead.
//! These errors cover configuration and restored data, which the session owner
//! must handle (typically by starting a fresh game).

use std::fmt;

use zwap_types::BlockId;

/// Malformed game settings. A board is never constructed from these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    ZeroColumns,
    ZeroRows,
    NoColors,
    TooManyColors,
    NoBlockTypes,
    TooManyBlockTypes,
    TooManySpecials,
    ZeroProgressNeeded,
}

impl SettingsError {
    pub fn code(self) -> &'static str {
        match self {
            SettingsError::ZeroColumns | SettingsError::ZeroRows => "invalid_dimensions",
            SettingsError::NoColors | SettingsError::TooManyColors => "invalid_colors",
            SettingsError::NoBlockTypes | SettingsError::TooManyBlockTypes => "invalid_block_types",
            SettingsError::TooManySpecials => "invalid_specials",
            SettingsError::ZeroProgressNeeded => "invalid_progress",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SettingsError::ZeroColumns => "board needs at least one column",
            SettingsError::ZeroRows => "board needs at least one row",
            SettingsError::NoColors => "at least one color is required",
            SettingsError::TooManyColors => "more colors requested than the palette holds",
            SettingsError::NoBlockTypes => "at least one block type is required",
            SettingsError::TooManyBlockTypes => "more block types requested than normal shapes exist",
            SettingsError::TooManySpecials => "special blocks do not fit on the board",
            SettingsError::ZeroProgressNeeded => "level progress threshold must be positive",
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

impl std::error::Error for SettingsError {}

/// Inconsistent grid data handed to [`crate::Board::from_columns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    Settings(SettingsError),
    ColumnCount { expected: usize, found: usize },
    ColumnOverflow { col: usize, len: usize },
    DuplicateId(BlockId),
}

impl BoardError {
    pub fn code(self) -> &'static str {
        match self {
            BoardError::Settings(e) => e.code(),
            BoardError::ColumnCount { .. } | BoardError::ColumnOverflow { .. } => "invalid_grid",
            BoardError::DuplicateId(_) => "duplicate_id",
        }
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Settings(e) => write!(f, "{}", e),
            BoardError::ColumnCount { expected, found } => {
                write!(f, "expected {} columns, found {}", expected, found)
            }
            BoardError::ColumnOverflow { col, len } => {
                write!(f, "column {} holds {} blocks, more than the board has rows", col, len)
            }
            BoardError::DuplicateId(id) => write!(f, "block id {} appears twice", id),
        }
    }
}

impl std::error::Error for BoardError {}

impl From<SettingsError> for BoardError {
    fn from(e: SettingsError) -> Self {
        BoardError::Settings(e)
    }
}

/// A persisted snapshot that cannot be restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    UnsupportedVersion(u32),
    Board(BoardError),
}

impl SnapshotError {
    pub fn code(self) -> &'static str {
        match self {
            SnapshotError::UnsupportedVersion(_) => "unsupported_version",
            SnapshotError::Board(e) => e.code(),
        }
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::UnsupportedVersion(v) => write!(f, "unsupported snapshot version {}", v),
            SnapshotError::Board(e) => write!(f, "invalid snapshot board: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<BoardError> for SnapshotError {
    fn from(e: BoardError) -> Self {
        SnapshotError::Board(e)
    }
}

impl From<SettingsError> for SnapshotError {
    fn from(e: SettingsError) -> Self {
        SnapshotError::Board(BoardError::Settings(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_group_related_faults() {
        assert_eq!(SettingsError::ZeroColumns.code(), SettingsError::ZeroRows.code());
        assert_eq!(
            SnapshotError::from(SettingsError::NoColors).code(),
            "invalid_colors"
        );
        assert_eq!(BoardError::DuplicateId(BlockId(3)).code(), "duplicate_id");
    }

    #[test]
    fn display_mentions_offending_values() {
        let e = BoardError::ColumnCount { expected: 8, found: 7 };
        assert_eq!(e.to_string(), "expected 8 columns, found 7");
        let e = SnapshotError::UnsupportedVersion(9);
        assert!(e.to_string().contains('9'));
    }
}
