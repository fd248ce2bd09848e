//! Per-connection state machine for the live sync channel.
//!
//! A connection moves Connecting -> Authenticated -> Active -> Closing ->
//! Closed. Authentication happens before registration; a credential
//! without a device association never reaches the registry and the socket
//! closes with a policy-violation code. Once active, a receive loop and a
//! heartbeat loop run under one `select!`, so whichever terminates first
//! cancels its sibling, and teardown runs exactly once on every exit path.

use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;
use warp::ws::{Message, WebSocket};

use crate::domain::DeviceIdentity;
use crate::infrastructure::connection::{ConnectionId, ConnectionRegistry};
use crate::interface::AccessTokenCodec;
use crate::message::{parse_client_message, ClientMessage, ServerMessage};

/// RFC 6455 close code for policy violations (bad or device-less token).
const CLOSE_POLICY_VIOLATION: u16 = 1008;

/// Registration handle for one live connection.
///
/// `teardown` is callable from any exit path, any number of times;
/// unregistration happens on the first call only.
pub struct SyncSession {
    connection_id: ConnectionId,
    identity: DeviceIdentity,
    registry: Arc<ConnectionRegistry>,
    closed: AtomicBool,
}

impl SyncSession {
    pub fn new(identity: DeviceIdentity, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            identity,
            registry,
            closed: AtomicBool::new(false),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Register with the connection registry, making this connection a
    /// broadcast target.
    pub async fn activate(&self, sender: mpsc::UnboundedSender<ServerMessage>) {
        self.registry
            .register(
                self.connection_id,
                self.identity.user_id,
                self.identity.device_id,
                sender,
            )
            .await;
    }

    /// Unregister exactly once, no matter how many exit paths race here.
    pub async fn teardown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.registry
            .unregister(self.connection_id, self.identity.user_id)
            .await;
    }
}

/// Drive one upgraded websocket until it dies.
pub async fn run(
    socket: WebSocket,
    token: String,
    registry: Arc<ConnectionRegistry>,
    codec: Arc<dyn AccessTokenCodec>,
    heartbeat_interval: Duration,
) {
    // Connecting -> Authenticated
    let claims = match codec.decode(&token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("websocket auth failed: {}", e);
            close_policy_violation(socket, "invalid token").await;
            return;
        }
    };
    let Some(identity) = claims.device_identity() else {
        warn!(
            "websocket credential for user {} lacks device association",
            claims.user_id
        );
        close_policy_violation(socket, "no device_id in token").await;
        return;
    };

    // Authenticated -> Active
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Send pump: drains the session queue into the socket. When it exits
    // the channel closes, which both loops observe as send failures.
    let pump = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match message.to_json() {
                Ok(text) => {
                    if sink.send(Message::text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("failed to encode outbound message: {}", e),
            }
        }
        let _ = sink.close().await;
    });

    let session = SyncSession::new(identity, registry);
    session.activate(tx.clone()).await;
    let _ = tx.send(ServerMessage::connected(identity.device_id));
    info!(
        "sync session active: user={} device={}",
        identity.user_id, identity.device_id
    );

    // Active: whichever loop finishes first cancels the other.
    tokio::select! {
        _ = receive_loop(&mut stream, &tx) => {}
        _ = heartbeat_loop(&tx, heartbeat_interval) => {}
    }

    // Closing -> Closed
    session.teardown().await;
    drop(tx);
    let _ = pump.await;
    info!(
        "sync session closed: user={} device={}",
        identity.user_id, identity.device_id
    );
}

async fn close_policy_violation(socket: WebSocket, reason: &'static str) {
    let (mut sink, _) = socket.split();
    let _ = sink
        .send(Message::close_with(CLOSE_POLICY_VIOLATION, reason))
        .await;
    let _ = sink.close().await;
}

/// Read inbound frames until the peer disconnects or the transport errors.
async fn receive_loop(
    stream: &mut SplitStream<WebSocket>,
    tx: &mpsc::UnboundedSender<ServerMessage>,
) {
    while let Some(next) = stream.next().await {
        let frame = match next {
            Ok(frame) => frame,
            Err(e) => {
                warn!("websocket read error: {}", e);
                return;
            }
        };
        if frame.is_close() {
            debug!("peer sent close frame");
            return;
        }
        let Ok(text) = frame.to_str() else {
            // Binary frames carry nothing we understand.
            continue;
        };
        match parse_client_message(text) {
            Some(ClientMessage::Pong) => debug!("received pong"),
            Some(ClientMessage::Ping { timestamp }) => {
                if tx.send(ServerMessage::pong(timestamp)).is_err() {
                    return;
                }
            }
            Some(ClientMessage::Unknown(kind)) => warn!("unknown message type: {}", kind),
            None => warn!("ignoring unreadable frame"),
        }
    }
}

/// Queue a liveness probe on a fixed interval. Ends when the outbound
/// channel closes, which means the connection is on its way down.
async fn heartbeat_loop(tx: &mpsc::UnboundedSender<ServerMessage>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately; skip it so probes start one
    // full interval after connect.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if tx.send(ServerMessage::ping()).is_err() {
            return;
        }
    }
}
