use crate::command::protocol_error;
use crate::config::Config;
use crate::error::CommandError;
use crate::persistence::aof::SharedAofWriter;
use crate::replication::{Role, SharedReplicaSet};
use crate::resp::Reply;
use crate::store::entry::now_millis;
use crate::store::SharedStore;
use std::sync::Arc;
use tracing::warn;

/// `EXPIRE key seconds` — set an absolute expiry of now + seconds on an
/// existing key. Master replies `:1` when the key exists (and propagates)
/// or `:0` when it does not; a slave applies silently either way.
pub async fn cmd_expire(
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
    let seconds: i64 = match args[1].parse() {
        Ok(n) => n,
        Err(_) => return protocol_error(CommandError::NotInteger),
    };

    // Negative seconds clamp to an expiry already in the past.
    let expires_at = (now_millis() as i64)
        .saturating_add(seconds.saturating_mul(1000))
        .max(0) as u64;
    let existed = store.set_expiry(key, expires_at);

    if existed {
        let mut aof = aof.lock().await;
        if let Err(e) = aof.append(&format!("EXPIRE {key} {seconds}")) {
            warn!("Append log write failed: {e}");
        }
    }

    match config.role() {
        Role::Master => {
            if existed {
                replicas
                    .write()
                    .await
                    .propagate(format!("EXPIRE {key} {seconds}\r\n").as_bytes());
                Some(Reply::integer(1))
            } else {
                Some(Reply::integer(0))
            }
        }
        Role::Slave => None,
    }
}
