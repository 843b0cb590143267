pub mod replica;

use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// The node's replication role, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Master,
    Slave,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Master => write!(f, "master"),
            Role::Slave => write!(f, "slave"),
        }
    }
}

/// A connected replica, from the master's perspective.
#[derive(Debug)]
pub struct ReplicaInfo {
    pub id: u64,
    pub addr: String,
    pub tx: mpsc::UnboundedSender<Bytes>,
}

/// The set of replicas registered to receive the mutation stream.
///
/// Membership follows the socket lifetime: a connection joins when its
/// handshake is processed and leaves when the connection task ends or a
/// send fails. Missed commands are never buffered or retried.
#[derive(Debug, Default)]
pub struct ReplicaSet {
    replicas: Vec<ReplicaInfo>,
}

impl ReplicaSet {
    pub fn new() -> Self {
        ReplicaSet {
            replicas: Vec::new(),
        }
    }

    /// Register a replica. Re-registering the same connection is a no-op.
    pub fn register(&mut self, info: ReplicaInfo) {
        if !self.replicas.iter().any(|r| r.id == info.id) {
            self.replicas.push(info);
        }
    }

    /// Remove the replica tied to the given connection, if registered.
    pub fn unregister(&mut self, id: u64) {
        self.replicas.retain(|r| r.id != id);
    }

    /// Send a command to every registered replica. Replicas whose channel
    /// is gone are dropped in the same pass.
    pub fn propagate(&mut self, data: &[u8]) {
        let data = Bytes::copy_from_slice(data);
        self.replicas.retain(|r| r.tx.send(data.clone()).is_ok());
    }

    pub fn count(&self) -> usize {
        self.replicas.len()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.replicas.iter().any(|r| r.id == id)
    }
}

pub type SharedReplicaSet = Arc<RwLock<ReplicaSet>>;
