//! Adapter - outer surfaces of the puzzle engine
//!
//! Everything the core leaves to collaborators lives here:
//!
//! - [`store`]: where snapshots are kept (JSON file or memory) and how a
//!   settings file is read
//! - [`persist`]: a [`Collaborator`](zwap_engine::Collaborator) that saves the
//!   game after every turn
//! - [`protocol`], [`server`], [`runtime`]: remote control over TCP
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Handshake**: client sends `hello`, server responds with `welcome`
//! 2. **Controller Assignment**: first client to hello becomes the controller
//! 3. **Observations**: the full board and progress, sent after every
//!    command that changed something
//! 4. **Commanding**: the controller sends `pointer`, `select`, `deselect`
//!    or `settle` commands; each is answered with an `ack` naming the outcome
//!
//! # Environment Variables
//!
//! - `ZWAP_AI_HOST`: bind address (default: "127.0.0.1")
//! - `ZWAP_AI_PORT`: port number (default: 7878)
//! - `ZWAP_AI_MAX_PENDING`: command queue size (default: 10)
//! - `ZWAP_AI_MANUAL_SETTLE`: hold every chain reaction until `settle`
//! - `ZWAP_AI_DISABLED`: set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"ts":...,"board":{"columns":8,"rows":12,"cells":[...]},...}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"mode":"select","block":14}
//! Server -> Client: {"type":"ack","seq":2,"ts":...,"status":"ok","outcome":"selected"}
//! ```

pub mod persist;
pub mod protocol;
pub mod runtime;
pub mod server;
pub mod store;

pub use zwap_core as core;
pub use zwap_engine as engine;
pub use zwap_types as types;

pub use persist::PersistingCollaborator;
pub use protocol::*;
pub use runtime::{
    apply_inbound, outcome_label, Adapter, ClientCommand, InboundCommand, InboundPayload,
    OutboundMessage,
};
pub use server::{build_observation, map_command, run_server, ServerConfig, ServerState};
pub use store::{load_settings_file, JsonFileStore, MemoryStore, SnapshotStore, StoreError};
