//! Zwap (workspace facade crate).
//!
//! Re-exports the member crates as `zwap::{core,engine,adapter,types}` and
//! carries the session plumbing of the `zwap` binary.

pub mod config;
pub mod logging;

pub use zwap_adapter as adapter;
pub use zwap_core as core;
pub use zwap_engine as engine;
pub use zwap_types as types;
