use log::{debug, info};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::message::ServerMessage;

pub type ConnectionId = Uuid;

/// A live connection's entry: which device it speaks for and the outbound
/// channel its session drains into the socket.
#[derive(Debug, Clone)]
struct Registration {
    device_id: Uuid,
    sender: UnboundedSender<ServerMessage>,
}

/// Live mapping from users to their active connections.
///
/// Not a process-wide singleton: an instance is built at startup and
/// injected wherever needed, so tests run against isolated registries.
/// One lock guards the nested map, which makes register/unregister atomic
/// across both the per-user index and the per-connection device record.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<Uuid, HashMap<ConnectionId, Registration>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to the user's active set and record its device.
    pub async fn register(
        &self,
        connection_id: ConnectionId,
        user_id: Uuid,
        device_id: Uuid,
        sender: UnboundedSender<ServerMessage>,
    ) {
        let mut connections = self.connections.write().await;
        let entry = connections.entry(user_id).or_default();
        entry.insert(connection_id, Registration { device_id, sender });
        info!(
            "connection registered: user={} device={} total={}",
            user_id,
            device_id,
            entry.len()
        );
    }

    /// Remove a connection from the user's set. Removing an unknown
    /// connection is a no-op. Empty user entries are pruned so churn
    /// cannot grow the index without bound.
    pub async fn unregister(&self, connection_id: ConnectionId, user_id: Uuid) {
        let mut connections = self.connections.write().await;
        if let Some(entry) = connections.get_mut(&user_id) {
            entry.remove(&connection_id);
            if entry.is_empty() {
                connections.remove(&user_id);
            }
            info!("connection unregistered: user={}", user_id);
        }
    }

    /// Hand `message` to every registered connection of `user_id` whose
    /// device differs from `exclude_device_id`.
    ///
    /// Senders are snapshotted under the read guard and dispatched after
    /// it is released, so a concurrent register/unregister never races the
    /// iteration. A failed hand-off means the receiving session is already
    /// gone; its own teardown removes the registration, so the failure is
    /// logged and otherwise ignored.
    pub async fn broadcast(
        &self,
        user_id: Uuid,
        message: ServerMessage,
        exclude_device_id: Option<Uuid>,
    ) {
        let targets: Vec<(ConnectionId, Registration)> = {
            let connections = self.connections.read().await;
            let Some(entry) = connections.get(&user_id) else {
                debug!("no active connections for user {}", user_id);
                return;
            };
            entry
                .iter()
                .filter(|(_, registration)| Some(registration.device_id) != exclude_device_id)
                .map(|(id, registration)| (*id, registration.clone()))
                .collect()
        };

        debug!(
            "broadcasting to {} connections for user {}",
            targets.len(),
            user_id
        );

        for (connection_id, registration) in targets {
            if registration.sender.send(message.clone()).is_err() {
                debug!(
                    "dropping message for closed connection {} (device {})",
                    connection_id, registration.device_id
                );
            }
        }
    }

    /// Current live connection count for a user; 0 for unknown users.
    pub async fn connection_count(&self, user_id: Uuid) -> usize {
        self.connections
            .read()
            .await
            .get(&user_id)
            .map_or(0, |entry| entry.len())
    }
}
