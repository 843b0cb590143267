use crate::command;
use crate::config::Config;
use crate::connection::ClientState;
use crate::persistence::aof::SharedAofWriter;
use crate::replication::SharedReplicaSet;
use crate::resp::take_line;
use crate::store::SharedStore;
use bytes::BytesMut;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Run the slave side of replication: connect to the master, send the
/// handshake line, then apply the incoming command stream.
///
/// Nothing is ever written back over this link — the master must not see
/// acks, errors, or re-propagated commands from a slave. Connection
/// failure or EOF ends the link without retry.
pub async fn run_replica(
    host: String,
    port: u16,
    store: SharedStore,
    config: Arc<Config>,
    replicas: SharedReplicaSet,
    aof: SharedAofWriter,
    shutdown: CancellationToken,
) {
    let addr = format!("{host}:{port}");
    info!("Connecting to master at {addr}...");

    let mut stream = match TcpStream::connect(&addr).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Failed to connect to master at {addr}: {e}");
            return;
        }
    };

    if let Err(e) = stream.write_all(b"REPLCONF listening-port\r\n").await {
        warn!("Replication handshake failed: {e}");
        return;
    }
    info!("Connected to master at {addr}, applying replication stream");

    // Commands applied off this link are never answered; the sender half
    // of the dummy channel is unused because a slave does not register
    // replicas of its own.
    let (repl_tx, _repl_rx) = mpsc::unbounded_channel();
    let client = ClientState::new(addr.clone(), repl_tx);

    let mut buf = BytesMut::with_capacity(4096);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            result = stream.read_buf(&mut buf) => {
                match result {
                    Ok(0) => {
                        info!("Master at {addr} closed the replication link");
                        return;
                    }
                    Ok(_) => {
                        while let Some(line) = take_line(&mut buf) {
                            apply_line(&line, &store, &config, &client, &replicas, &aof).await;
                        }
                    }
                    Err(e) => {
                        warn!("Replication link error: {e}");
                        return;
                    }
                }
            }
        }
    }
}

/// Apply one line received from the master, discarding any reply.
async fn apply_line(
    line: &str,
    store: &SharedStore,
    config: &Arc<Config>,
    client: &ClientState,
    replicas: &SharedReplicaSet,
    aof: &SharedAofWriter,
) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    // Reply-typed lines (the master's handshake ack) are not commands.
    if matches!(line.as_bytes()[0], b'+' | b'-' | b':' | b'$') {
        return;
    }
    let _ = command::process_line(line, store, config, client, replicas, aof).await;
}
