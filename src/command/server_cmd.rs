use crate::config::Config;
use crate::connection::ClientState;
use crate::replication::{ReplicaInfo, Role, SharedReplicaSet};
use crate::resp::Reply;
use std::sync::Arc;
use tracing::info;

/// `PING` — liveness check.
pub fn cmd_ping() -> Option<Reply> {
    Some(Reply::pong())
}

/// `REPLCONF ...` — the replica handshake. On a master the sender joins
/// the replica set and starts receiving the mutation stream; a slave
/// acknowledges the handshake but registers nothing, since it never fans
/// out commands itself.
pub async fn cmd_replconf(
    _args: &[&str],
    config: &Arc<Config>,
    client: &ClientState,
    replicas: &SharedReplicaSet,
) -> Option<Reply> {
    if config.role() == Role::Master {
        let mut set = replicas.write().await;
        set.register(ReplicaInfo {
            id: client.id,
            addr: client.addr.clone(),
            tx: client.repl_tx.clone(),
        });
        info!("New replica registered: {}", client.addr);
    }
    Some(Reply::ok())
}
