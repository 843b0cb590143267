use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Per-connection state.
#[derive(Debug)]
pub struct ClientState {
    pub id: u64,
    pub addr: String,
    /// Sender half of this connection's outbound channel. Handing a clone
    /// to the replica set turns the connection into a replica link: the
    /// connection task writes whatever arrives here to the socket.
    pub repl_tx: mpsc::UnboundedSender<Bytes>,
}

impl ClientState {
    pub fn new(addr: String, repl_tx: mpsc::UnboundedSender<Bytes>) -> Self {
        ClientState {
            id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
            addr,
            repl_tx,
        }
    }
}
