//! Collaborator that saves the settled board after every turn.

use log::{debug, warn};

use crate::store::SnapshotStore;
use zwap_core::{GameSnapshot, LevelUp, Turn};
use zwap_engine::{Collaborator, Settle};
use zwap_types::BlockId;

pub struct PersistingCollaborator<S> {
    store: S,
    manual_settle: bool,
    saved: usize,
    failures: usize,
}

impl<S: SnapshotStore> PersistingCollaborator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            manual_settle: false,
            saved: 0,
            failures: 0,
        }
    }

    /// Pause after every round until the engine's settle is acknowledged
    pub fn with_manual_settle(mut self, manual: bool) -> Self {
        self.manual_settle = manual;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn saved(&self) -> usize {
        self.saved
    }

    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl<S: SnapshotStore> Collaborator for PersistingCollaborator<S> {
    fn on_settle_requested(&mut self, _blocks: &[BlockId]) -> Settle {
        if self.manual_settle {
            Settle::Pending
        } else {
            Settle::Done
        }
    }

    fn on_level_up(&mut self, level_up: LevelUp) {
        debug!("reached level {} (+{})", level_up.level, level_up.bonus);
    }

    fn on_turn_finished(&mut self, turn: &Turn) {
        debug!(
            "{} turn finished with {} reactions",
            turn.match_info.kind.as_str(),
            turn.chain_reactions.len()
        );
    }

    /// Storage failures are logged; the game goes on.
    fn persist(&mut self, snapshot: &GameSnapshot) {
        match self.store.save(snapshot) {
            Ok(()) => self.saved += 1,
            Err(e) => {
                self.failures += 1;
                warn!("could not persist game {}: {}", snapshot.id, e);
            }
        }
    }
}
