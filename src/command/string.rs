use crate::command::protocol_error;
use crate::config::Config;
use crate::error::CommandError;
use crate::persistence::aof::SharedAofWriter;
use crate::replication::{Role, SharedReplicaSet};
use crate::resp::Reply;
use crate::store::entry::Entry;
use crate::store::SharedStore;
use std::sync::Arc;
use tracing::warn;

/// `SET key value...` — store the key with the remaining tokens joined as
/// the value, log the write, and fan it out if this node is the master.
/// A slave applies the write without replying.
pub async fn cmd_set(
    args: &[&str],
    store: &SharedStore,
    config: &Arc<Config>,
    replicas: &SharedReplicaSet,
    aof: &SharedAofWriter,
) -> Option<Reply> {
    if args.len() < 2 {
        return protocol_error(CommandError::WrongArity);
    }
    let key = args[0];
    let value = args[1..].join(" ");

    store.set(key.to_string(), Entry::new(value.clone()));

    {
        let mut aof = aof.lock().await;
        if let Err(e) = aof.append(&format!("SET {key} {value}")) {
            warn!("Append log write failed: {e}");
        }
    }

    match config.role() {
        Role::Master => {
            replicas
                .write()
                .await
                .propagate(format!("SET {key} {value}\r\n").as_bytes());
            Some(Reply::ok())
        }
        Role::Slave => None,
    }
}

/// `GET key` — the value if present and unexpired; expired entries are
/// removed on the way out. Extra trailing arguments are ignored.
pub fn cmd_get(args: &[&str], store: &SharedStore) -> Option<Reply> {
    if args.is_empty() {
        return protocol_error(CommandError::WrongArity);
    }
    match store.get(args[0]) {
        Some(value) => Some(Reply::bulk(value)),
        None => Some(Reply::nil()),
    }
}
