//! Turn engine - drives the core through selection, matching and chain
//! reactions.
//!
//! The engine owns a [`zwap_core::Game`] and a [`Collaborator`]. Input comes
//! in as block selections or pointer events in board coordinates; side
//! effects (animation, settling, persistence) go out through the
//! collaborator. Everything runs on the caller's thread: a pending settle is
//! a pause, not a background task.
//!
//! # Example
//!
//! ```
//! use zwap_core::{Game, GameSettings};
//! use zwap_engine::{FlowState, InputOutcome, NoopCollaborator, TurnEngine};
//!
//! let game = Game::new(GameSettings::normal(), 7).unwrap();
//! let mut engine = TurnEngine::new(game, NoopCollaborator);
//!
//! let first = engine.game().board().ids()[0];
//! assert_eq!(engine.select(first), InputOutcome::Selected(first));
//! assert_eq!(engine.select(first), InputOutcome::Deselected);
//! assert_eq!(engine.state(), &FlowState::Idle);
//! ```

pub mod collaborator;
pub mod flow;
pub mod input;

pub use collaborator::{Collaborator, NoopCollaborator, Settle};
pub use flow::{FlowState, InputOutcome, ResolveStep, TurnEngine};
pub use input::{PointerEvent, PointerKind};
