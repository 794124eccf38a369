//! Adapter runtime integration.
//!
//! Bridges the synchronous turn engine with the async TCP server.

use std::net::SocketAddr;

use anyhow::Context;
use log::{info, warn};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};

use crate::protocol::{create_ack, AckMessage, ErrorMessage, ObservationMessage};
use crate::server::{build_observation, run_server, ServerConfig, ServerState};
use zwap_engine::{Collaborator, InputOutcome, PointerEvent, TurnEngine};
use zwap_types::BlockId;

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: u64,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// A client just said hello and wants the current state
    SnapshotRequest,
}

/// Command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Pointer(PointerEvent),
    Select(BlockId),
    Deselect,
    Settle,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: u64, ack: AckMessage },
    ToClientError { client_id: u64, err: ErrorMessage },
    ToClientObservation { client_id: u64, obs: ObservationMessage },
    BroadcastObservation { obs: ObservationMessage },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    local_addr: SocketAddr,
    manual_settle: bool,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `ZWAP_AI_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerState::is_disabled() {
            info!("remote control disabled via ZWAP_AI_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    /// Bind the server and wait until it listens
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let manual_settle = config.manual_settle;
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await {
                warn!("adapter server stopped: {:#}", e);
            }
        });
        let local_addr = rt
            .block_on(ready_rx)
            .context("adapter server failed to start")?;

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            local_addr,
            manual_settle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Whether the controller acknowledges every settle itself
    pub fn manual_settle(&self) -> bool {
        self.manual_settle
    }

    /// Wait for the next command; `None` once the server is gone
    pub fn blocking_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.blocking_recv()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}

/// Wire name of an input outcome
pub fn outcome_label(outcome: InputOutcome) -> String {
    match outcome {
        InputOutcome::Ignored => "ignored".to_string(),
        InputOutcome::Selected(_) => "selected".to_string(),
        InputOutcome::Deselected => "deselected".to_string(),
        InputOutcome::SecondOption(_) => "second_option".to_string(),
        InputOutcome::Matched(kind) => format!("matched:{}", kind.as_str()),
        InputOutcome::Resumed => "resumed".to_string(),
    }
}

/// Apply one command to the engine and return the messages to send back.
///
/// `obs_seq` numbers outgoing observations and is advanced for each one.
pub fn apply_inbound<C: Collaborator>(
    engine: &mut TurnEngine<C>,
    inbound: InboundCommand,
    obs_seq: &mut u64,
) -> Vec<OutboundMessage> {
    let client_id = inbound.client_id;
    let command = match inbound.payload {
        InboundPayload::SnapshotRequest => {
            *obs_seq += 1;
            return vec![OutboundMessage::ToClientObservation {
                client_id,
                obs: build_observation(engine, *obs_seq),
            }];
        }
        InboundPayload::Command(command) => command,
    };

    let outcome = match command {
        ClientCommand::Pointer(event) => engine.handle_pointer(event),
        ClientCommand::Select(id) => engine.select(id),
        ClientCommand::Deselect => engine.deselect(),
        ClientCommand::Settle => engine.acknowledge_settle(),
    };

    let mut out = vec![OutboundMessage::ToClientAck {
        client_id,
        ack: create_ack(inbound.seq, &outcome_label(outcome)),
    }];
    if outcome != InputOutcome::Ignored {
        *obs_seq += 1;
        out.push(OutboundMessage::BroadcastObservation {
            obs: build_observation(engine, *obs_seq),
        });
    }
    out
}
