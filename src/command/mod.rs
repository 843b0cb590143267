pub mod key;
pub mod server_cmd;
pub mod string;

use crate::config::Config;
use crate::connection::ClientState;
use crate::error::CommandError;
use crate::persistence::aof::SharedAofWriter;
use crate::replication::SharedReplicaSet;
use crate::resp::Reply;
use crate::store::SharedStore;
use std::sync::Arc;

/// Parse one command line and dispatch it.
///
/// Returns the reply to send back, or `None` when the command produces no
/// response — a slave applying a replicated mutation stays silent.
pub async fn process_line(
    line: &str,
    store: &SharedStore,
    config: &Arc<Config>,
    client: &ClientState,
    replicas: &SharedReplicaSet,
    aof: &SharedAofWriter,
) -> Option<Reply> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let cmd_name = parts.first()?.to_uppercase();
    dispatch(&cmd_name, &parts[1..], store, config, client, replicas, aof).await
}

/// Dispatch a parsed command to the appropriate handler.
pub async fn dispatch(
    cmd_name: &str,
    args: &[&str],
    store: &SharedStore,
    config: &Arc<Config>,
    client: &ClientState,
    replicas: &SharedReplicaSet,
    aof: &SharedAofWriter,
) -> Option<Reply> {
    match cmd_name {
        "SET" => string::cmd_set(args, store, config, replicas, aof).await,
        "GET" => string::cmd_get(args, store),
        "EXPIRE" => key::cmd_expire(args, store, config, replicas, aof).await,
        "REPLCONF" => server_cmd::cmd_replconf(args, config, client, replicas).await,
        "PING" => server_cmd::cmd_ping(),
        _ => protocol_error(CommandError::UnknownCommand),
    }
}

/// Build the `-ERR` reply for a protocol error.
pub(crate) fn protocol_error(err: CommandError) -> Option<Reply> {
    Some(Reply::error(err.to_string()))
}
