//! TCP server for the remote control adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use zwap_core::Game;
use zwap_engine::{Collaborator, TurnEngine};
use zwap_types::BlockId;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    /// Hold every chain reaction until the controller sends `settle`
    pub manual_settle: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
            manual_settle: false,
        }
    }
}

impl ServerConfig {
    /// Create from `ZWAP_AI_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("ZWAP_AI_HOST").unwrap_or(defaults.host);
        let port = env::var("ZWAP_AI_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("ZWAP_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);
        let manual_settle = env::var("ZWAP_AI_MANUAL_SETTLE")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        Self {
            host,
            port,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands,
            manual_settle,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

fn is_truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<u64>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("ZWAP_AI_DISABLED")
            .map(|v| is_truthy(&v))
            .unwrap_or(false)
    }

    async fn is_handshaken(&self, client_id: u64) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: u64) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Accept `seq` only when it is greater than the last one seen
    async fn check_and_update_seq(&self, client_id: u64, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn send_to(&self, client_id: u64, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }

    async fn broadcast(&self, obs: ObservationMessage) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.stream_observations) {
            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: u64,
    pub addr: SocketAddr,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

impl ClientOutbound {
    fn write_json(&self, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        match self {
            ClientOutbound::Welcome(m) => serde_json::to_writer(buf, m),
            ClientOutbound::Ack(m) => serde_json::to_writer(buf, m),
            ClientOutbound::Error(m) => serde_json::to_writer(buf, m),
            ClientOutbound::Observation(m) => serde_json::to_writer(buf, m),
        }
    }
}

/// Start the TCP server. The bound address is reported on `ready_tx`.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr).await?;
    let bound = listener.local_addr()?;
    info!("adapter listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0u64;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        state.send_to(client_id, ClientOutbound::Ack(ack)).await
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        state.send_to(client_id, ClientOutbound::Error(err)).await
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        state.send_to(client_id, ClientOutbound::Observation(obs)).await
                    }
                    OutboundMessage::BroadcastObservation { obs } => state.broadcast(obs).await,
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!("client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx).await {
                warn!("client {} error: {}", client_id, e);
            }
            info!("client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: u64,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        addr,
        stream_observations: false,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if msg.write_json(&mut buf).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!("client {} <- {}", client_id, trimmed);

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    let _ = tx.send(seq_error(hello.seq));
                    continue;
                }

                if !is_supported_version(&hello.protocol_version) {
                    let error = create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("protocol version {} not supported", hello.protocol_version),
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    break;
                }

                {
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.requested.stream_observations;
                    }
                }

                // First client to hello becomes controller
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    if controller.is_none() {
                        *controller = Some(client_id);
                        info!("client {} ({}) is now controller", client_id, hello.client.name);
                    }
                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, *controller)
                };

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id,
                    role,
                    controller_id,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    let error = create_error(
                        cmd.seq,
                        ErrorCode::HandshakeRequired,
                        "send hello before command",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    let _ = tx.send(seq_error(cmd.seq));
                    continue;
                }
                if !state.is_controller(client_id).await {
                    let error = create_error(
                        cmd.seq,
                        ErrorCode::NotController,
                        "only the controller may send commands",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err((code, message)) => {
                        let _ = tx.send(ClientOutbound::Error(create_error(cmd.seq, code, &message)));
                        continue;
                    }
                };

                // Backpressure: bounded queue. The ack comes from the game loop.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(mapped),
                    })
                    .is_err()
                {
                    let error =
                        create_error(cmd.seq, ErrorCode::Backpressure, "command queue is full");
                    let _ = tx.send(ClientOutbound::Error(error));
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, unknown.seq).await
                {
                    let _ = tx.send(seq_error(unknown.seq));
                    continue;
                }
                let error =
                    create_error(unknown.seq, ErrorCode::InvalidCommand, "unknown message type");
                let _ = tx.send(ClientOutbound::Error(error));
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                let error = create_error(
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {}", e),
                );
                let _ = tx.send(ClientOutbound::Error(error));
            }
        }
    }

    // Remove the client; promote the lowest remaining id when it was controller.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);
        if *controller == Some(client_id) {
            *controller = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            match *controller {
                Some(new_id) => info!("client {} promoted to controller", new_id),
                None => info!("controller {} released", client_id),
            }
        }
    }

    drop(tx);
    let _ = write_task.await;
    Ok(())
}

fn seq_error(seq: u64) -> ClientOutbound {
    ClientOutbound::Error(create_error(
        seq,
        ErrorCode::InvalidCommand,
        "seq must be strictly increasing",
    ))
}

/// Map a protocol command into an engine command
pub fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, (ErrorCode, String)> {
    match cmd.mode {
        CommandMode::Pointer => cmd
            .pointer
            .map(ClientCommand::Pointer)
            .ok_or_else(|| (ErrorCode::InvalidCommand, "missing pointer".to_string())),
        CommandMode::Select => cmd
            .block
            .map(|id| ClientCommand::Select(BlockId(id)))
            .ok_or_else(|| (ErrorCode::InvalidCommand, "missing block".to_string())),
        CommandMode::Deselect => Ok(ClientCommand::Deselect),
        CommandMode::Settle => Ok(ClientCommand::Settle),
    }
}

/// Build observation message from the engine state
pub fn build_observation<C: Collaborator>(engine: &TurnEngine<C>, seq: u64) -> ObservationMessage {
    let game: &Game = engine.game();
    let board = game.board();
    let progress = game.progress();

    let cells = board
        .columns()
        .iter()
        .map(|column| {
            column
                .iter()
                .map(|b| CellSnapshot {
                    id: b.id().0,
                    color: b.color(),
                    kind: b.kind().index(),
                })
                .collect()
        })
        .collect();

    let last_turn = progress.turn().map(|turn| TurnSummary {
        kind: turn.match_info.kind.as_str().to_string(),
        reactions: turn.chain_reactions.len(),
        score: turn.total_score(),
    });

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        game_id: game.id(),
        board: BoardSnapshot {
            columns: game.settings().columns,
            rows: game.settings().rows,
            cells,
        },
        score: progress.score,
        level: progress.level,
        level_progress: progress.level_progress,
        progress_needed: game.settings().progress_needed,
        moves_without_reaction: progress.moves_without_reaction,
        turns: progress.statistics.turns_played,
        flow: engine.state().as_str().to_string(),
        selected: engine.selected().map(|id| id.0),
        matchable: engine.matchable().iter().map(|id| id.0).collect(),
        interaction_disabled: engine.interaction_disabled(),
        game_over: progress.is_over(),
        last_turn,
    }
}
