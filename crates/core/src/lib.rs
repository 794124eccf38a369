//! Core puzzle logic - pure, deterministic, and testable
//!
//! This crate holds every game rule and the board state. It has no
//! dependency on rendering, networking or storage, so it is:
//!
//! - **Deterministic**: the same seed produces the same boards and refills
//! - **Testable**: boards can be built from explicit column data
//! - **Portable**: the turn engine, the TCP adapter and the benches all drive it
//!
//! # Module Structure
//!
//! - [`block`]: one tile (id, color, kind, hint flags, bomb counter)
//! - [`board`]: the column grid with lookups, swap, removal and refill
//! - [`sets`]: flood-fill set detection
//! - [`recolor`]: anti-deadlock recoloring after generation and refills
//! - [`scoring`]: set, reaction and unlock scores
//! - [`progress`]: score, level, turns and chain reactions
//! - [`settings`]: immutable per-session settings and the scoring table
//! - [`snapshot`]: the persisted form of a game
//! - [`game`]: the aggregate that resolves turns step by step
//! - [`rng`]: seeded randomness for every random decision
//!
//! # Rules
//!
//! - A **set** is 4 or more orthogonally connected blocks of one color.
//! - The player swaps two blocks of the same kind (any color), or matches a
//!   key onto a lock.
//! - Sets are removed, the blocks above fall, columns are refilled from the
//!   top, and the board is searched again: each round is a chain reaction.
//! - Refilled blocks never form a set on arrival; they are recolored until
//!   the board is stable.
//!
//! # Example
//!
//! ```
//! use zwap_core::{find_sets, Game, GameSettings};
//!
//! let mut game = Game::new(GameSettings::normal(), 12345).unwrap();
//! assert!(find_sets(game.board(), None).is_empty());
//!
//! let (first, target) = game
//!     .board()
//!     .iter()
//!     .find_map(|(_, b)| {
//!         let partners = game.board().all_swappable_with(b.id());
//!         partners.first().map(|&t| (b.id(), t))
//!     })
//!     .unwrap();
//! let turn = game.play(first, target).unwrap();
//! assert!(turn.done);
//! assert!(game.board().is_full());
//! ```

pub mod block;
pub mod board;
pub mod error;
pub mod game;
pub mod progress;
pub mod recolor;
pub mod rng;
pub mod scoring;
pub mod sets;
pub mod settings;
pub mod snapshot;

pub use zwap_types as types;

// Re-export commonly used types for convenience
pub use block::Block;
pub use board::{Board, FillReport};
pub use error::{BoardError, SettingsError, SnapshotError};
pub use game::{Game, Round, Unlock};
pub use progress::{ChainReaction, GameProgress, LevelUp, MatchInfo, Statistics, Turn};
pub use recolor::{unchain_by_recoloring, RecolorReport};
pub use rng::BlockRng;
pub use scoring::{calculate_set_score, calculate_unlock_score, score_reaction, ReactionScores};
pub use sets::{find_sets, BlockSet, Center};
pub use settings::{GameSettings, ScoringTable};
pub use snapshot::GameSnapshot;
