//! Persisted game state
//!
//! A snapshot is plain data: it carries no behavior and is restored through
//! [`crate::Game::from_snapshot`], which re-validates settings and grid.

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::error::SnapshotError;
use crate::progress::GameProgress;
use crate::settings::GameSettings;
use zwap_types::SNAPSHOT_VERSION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    pub id: u64,
    pub settings: GameSettings,
    pub progress: GameProgress,
    /// Blocks in `[column][row]` order, row 0 at the bottom
    pub data: Vec<Vec<Block>>,
}

impl GameSnapshot {
    pub fn new(id: u64, settings: GameSettings, progress: GameProgress, data: Vec<Vec<Block>>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id,
            settings,
            progress,
            data,
        }
    }

    pub fn check_version(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    pub fn block_count(&self) -> usize {
        self.data.iter().map(Vec::len).sum()
    }
}
