//! Adapter server tests over real TCP connections

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use zwap::adapter::{
    apply_inbound, run_server, ClientCommand, InboundCommand, InboundPayload, OutboundMessage,
    ServerConfig,
};
use zwap::core::{Game, GameSettings};
use zwap::engine::{NoopCollaborator, TurnEngine};
use zwap::types::BlockId;

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    async fn send(&mut self, msg: Value) {
        let mut line = serde_json::to_string(&msg).unwrap();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.unwrap();
    }

    async fn read(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timeout waiting for line")
            .expect("io error")
            .expect("connection closed");
        serde_json::from_str(&line).expect("invalid json")
    }

    async fn hello(&mut self, seq: u64, stream_observations: bool) -> Value {
        self.send(hello_msg(seq, "1.0.0", stream_observations)).await;
        self.read().await
    }
}

fn hello_msg(seq: u64, version: &str, stream_observations: bool) -> Value {
    json!({
        "type": "hello",
        "seq": seq,
        "ts": 0,
        "client": {"name": "test-bot", "version": "0.0.1"},
        "protocol_version": version,
        "requested": {"stream_observations": stream_observations},
    })
}

fn select_msg(seq: u64, block: u32) -> Value {
    json!({"type": "command", "seq": seq, "ts": 0, "mode": "select", "block": block})
}

async fn spawn_server(
    cmd_capacity: usize,
) -> (
    SocketAddr,
    mpsc::Receiver<InboundCommand>,
    mpsc::UnboundedSender<OutboundMessage>,
) {
    let config = ServerConfig {
        port: 0,
        ..ServerConfig::default()
    };
    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(cmd_capacity);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .unwrap()
        .unwrap();
    (addr, cmd_rx, out_tx)
}

/// Game loop stand-in: applies every command to a fresh engine
async fn engine_task(
    mut cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
) {
    let game = Game::new(GameSettings::normal(), 1234).unwrap();
    let mut engine = TurnEngine::new(game, NoopCollaborator);
    let mut obs_seq = 0u64;
    while let Some(inbound) = cmd_rx.recv().await {
        for msg in apply_inbound(&mut engine, inbound, &mut obs_seq) {
            let _ = out_tx.send(msg);
        }
    }
}

#[tokio::test]
async fn test_first_client_becomes_controller() {
    let (addr, _cmd_rx, _out_tx) = spawn_server(10).await;
    let mut client = Client::connect(addr).await;

    let welcome = client.hello(1, false).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["seq"], 1);
    assert_eq!(welcome["role"], "controller");
    assert_eq!(welcome["client_id"], welcome["controller_id"]);
    assert_eq!(welcome["game_id"], "zwap");
    assert_eq!(welcome["protocol_version"], "1.0.0");
    assert_eq!(
        welcome["command_modes"],
        json!(["pointer", "select", "deselect", "settle"])
    );
}

#[tokio::test]
async fn test_second_client_only_observes() {
    let (addr, _cmd_rx, _out_tx) = spawn_server(10).await;
    let mut first = Client::connect(addr).await;
    let controller = first.hello(1, false).await["client_id"].clone();

    let mut second = Client::connect(addr).await;
    let welcome = second.hello(1, false).await;
    assert_eq!(welcome["role"], "observer");
    assert_eq!(welcome["controller_id"], controller);
    assert_ne!(welcome["client_id"], controller);

    second.send(select_msg(2, 1)).await;
    let err = second.read().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "not_controller");
    assert_eq!(err["seq"], 2);
}

#[tokio::test]
async fn test_command_before_hello_is_rejected() {
    let (addr, _cmd_rx, _out_tx) = spawn_server(10).await;
    let mut client = Client::connect(addr).await;

    client.send(select_msg(1, 1)).await;
    let err = client.read().await;
    assert_eq!(err["code"], "handshake_required");
}

#[tokio::test]
async fn test_seq_must_increase() {
    let (addr, mut cmd_rx, _out_tx) = spawn_server(10).await;
    let mut client = Client::connect(addr).await;
    client.hello(5, false).await;

    client.send(select_msg(5, 1)).await;
    let err = client.read().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 5);

    client.send(select_msg(6, 1)).await;
    let inbound = tokio::time::timeout(Duration::from_secs(2), cmd_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(inbound.seq, 6);
}

#[tokio::test]
async fn test_unsupported_protocol_closes_the_connection() {
    let (addr, _cmd_rx, _out_tx) = spawn_server(10).await;
    let mut client = Client::connect(addr).await;

    client.send(hello_msg(1, "2.0.0", false)).await;
    let err = client.read().await;
    assert_eq!(err["code"], "protocol_mismatch");

    let next = tokio::time::timeout(Duration::from_secs(2), client.lines.next_line())
        .await
        .unwrap()
        .unwrap();
    assert!(next.is_none());
}

#[tokio::test]
async fn test_garbage_and_unknown_types() {
    let (addr, _cmd_rx, _out_tx) = spawn_server(10).await;
    let mut client = Client::connect(addr).await;
    client.hello(1, false).await;

    client
        .writer
        .write_all(b"{\"seq\": 7, \"type\": \"command\", oops\n")
        .await
        .unwrap();
    let err = client.read().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 7);

    client.send(json!({"type": "dance", "seq": 8, "ts": 0})).await;
    let err = client.read().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 8);

    // select without a block id
    client.send(json!({"type": "command", "seq": 9, "ts": 0, "mode": "select"})).await;
    let err = client.read().await;
    assert_eq!(err["code"], "invalid_command");
}

#[tokio::test]
async fn test_full_queue_reports_backpressure() {
    let (addr, mut cmd_rx, _out_tx) = spawn_server(1).await;
    let mut client = Client::connect(addr).await;
    client.hello(1, false).await;

    // nobody drains the queue: the first command fills it
    client.send(select_msg(2, 1)).await;
    client.send(select_msg(3, 1)).await;
    let err = client.read().await;
    assert_eq!(err["code"], "backpressure");
    assert_eq!(err["seq"], 3);

    let queued = cmd_rx.recv().await.unwrap();
    assert_eq!(queued.seq, 2);
    assert!(matches!(
        queued.payload,
        InboundPayload::Command(ClientCommand::Select(BlockId(1)))
    ));
}

#[tokio::test]
async fn test_commands_reach_the_game_loop() {
    let (addr, mut cmd_rx, _out_tx) = spawn_server(10).await;
    let mut client = Client::connect(addr).await;
    let welcome = client.hello(1, false).await;
    let client_id = welcome["client_id"].as_u64().unwrap();

    client
        .send(json!({
            "type": "command", "seq": 2, "ts": 0, "mode": "pointer",
            "pointer": {"kind": "down", "col": 2, "row": 3},
        }))
        .await;
    client.send(json!({"type": "command", "seq": 3, "ts": 0, "mode": "settle"})).await;

    let first = cmd_rx.recv().await.unwrap();
    assert_eq!(first.client_id, client_id);
    match first.payload {
        InboundPayload::Command(ClientCommand::Pointer(event)) => {
            assert_eq!((event.col, event.row), (2, 3));
        }
        other => panic!("unexpected payload {:?}", other),
    }
    let second = cmd_rx.recv().await.unwrap();
    assert!(matches!(
        second.payload,
        InboundPayload::Command(ClientCommand::Settle)
    ));
}

#[tokio::test]
async fn test_closed_loop_select_and_observe() {
    let (addr, cmd_rx, out_tx) = spawn_server(10).await;
    tokio::spawn(engine_task(cmd_rx, out_tx));

    let mut client = Client::connect(addr).await;
    let welcome = client.hello(1, true).await;
    assert_eq!(welcome["type"], "welcome");

    let obs = client.read().await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["flow"], "idle");
    assert_eq!(obs["board"]["columns"], 8);
    assert_eq!(obs["board"]["rows"], 12);
    assert_eq!(obs["board"]["cells"].as_array().unwrap().len(), 8);
    assert_eq!(obs["score"], 0);
    assert_eq!(obs["level"], 1);

    let block = obs["board"]["cells"][0][0]["id"].as_u64().unwrap();
    client.send(select_msg(2, block as u32)).await;

    let ack = client.read().await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);
    assert_eq!(ack["status"], "ok");
    assert_eq!(ack["outcome"], "selected");

    let obs = client.read().await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["flow"], "awaiting_second_selection");
    assert_eq!(obs["selected"], block);

    // deselect, then an ignored command yields an ack only
    client.send(json!({"type": "command", "seq": 3, "ts": 0, "mode": "deselect"})).await;
    assert_eq!(client.read().await["outcome"], "deselected");
    assert_eq!(client.read().await["flow"], "idle");
    client.send(json!({"type": "command", "seq": 4, "ts": 0, "mode": "settle"})).await;
    assert_eq!(client.read().await["outcome"], "ignored");
}

#[tokio::test]
async fn test_controller_released_on_disconnect() {
    let (addr, cmd_rx, out_tx) = spawn_server(10).await;
    tokio::spawn(engine_task(cmd_rx, out_tx));

    let mut first = Client::connect(addr).await;
    first.hello(1, false).await;
    let mut second = Client::connect(addr).await;
    assert_eq!(second.hello(1, false).await["role"], "observer");

    drop(first);
    tokio::time::sleep(Duration::from_millis(200)).await;

    second.send(json!({"type": "command", "seq": 2, "ts": 0, "mode": "deselect"})).await;
    let ack = second.read().await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["outcome"], "ignored");
}
