use crate::command;
use crate::config::Config;
use crate::connection::ClientState;
use crate::persistence::aof::SharedAofWriter;
use crate::replication::{replica, SharedReplicaSet};
use crate::resp::take_line;
use crate::store::SharedStore;
use bytes::{Bytes, BytesMut};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Run the server until shutdown.
///
/// Binds the listener, starts the background expiration sweep and the
/// append-log flush task, connects to the master when configured as a
/// slave, then accepts connections until ctrl-c. Shutdown stops the
/// background tasks and forces a final log flush before returning.
pub async fn run_server(
    store: SharedStore,
    config: Arc<Config>,
    replicas: SharedReplicaSet,
    aof: SharedAofWriter,
) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Ember listening on {addr} [{}]", config.role());

    let shutdown = CancellationToken::new();

    let sweeper = tokio::spawn(active_expiration_loop(
        store.clone(),
        config.clone(),
        shutdown.clone(),
    ));
    let flusher = tokio::spawn(aof_flush_loop(
        aof.clone(),
        config.clone(),
        shutdown.clone(),
    ));

    if let Some((host, port)) = config.slaveof.clone() {
        tokio::spawn(replica::run_replica(
            host,
            port,
            store.clone(),
            config.clone(),
            replicas.clone(),
            aof.clone(),
            shutdown.clone(),
        ));
    }

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = result?;
                debug!("New connection from {peer_addr}");

                let store = store.clone();
                let config = config.clone();
                let replicas = replicas.clone();
                let aof = aof.clone();

                tokio::spawn(async move {
                    if let Err(e) =
                        handle_connection(stream, peer_addr.to_string(), store, config, replicas, aof).await
                    {
                        debug!("Connection error from {peer_addr}: {e}");
                    }
                    debug!("Connection closed: {peer_addr}");
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                shutdown.cancel();
                let _ = sweeper.await;
                let _ = flusher.await;
                let mut aof = aof.lock().await;
                aof.close();
                return Ok(());
            }
        }
    }
}

/// Serve one connection; on any exit path the connection is dropped from
/// the replica set so a dead replica stops receiving the stream.
async fn handle_connection(
    mut stream: TcpStream,
    peer_addr: String,
    store: SharedStore,
    config: Arc<Config>,
    replicas: SharedReplicaSet,
    aof: SharedAofWriter,
) -> std::io::Result<()> {
    let (repl_tx, repl_rx) = mpsc::unbounded_channel();
    let client = ClientState::new(peer_addr, repl_tx);

    let result =
        connection_loop(&mut stream, &client, repl_rx, &store, &config, &replicas, &aof).await;

    replicas.write().await.unregister(client.id);
    result
}

async fn connection_loop(
    stream: &mut TcpStream,
    client: &ClientState,
    mut repl_rx: mpsc::UnboundedReceiver<Bytes>,
    store: &SharedStore,
    config: &Arc<Config>,
    replicas: &SharedReplicaSet,
    aof: &SharedAofWriter,
) -> std::io::Result<()> {
    let mut buf = BytesMut::with_capacity(1024);

    loop {
        // Drain complete lines first, in arrival order; each reply is
        // written before the next line is dispatched.
        while let Some(line) = take_line(&mut buf) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(reply) =
                command::process_line(line, store, config, client, replicas, aof).await
            {
                stream.write_all(&reply.serialize()).await?;
            }
        }

        // Wait for more input, or for replicated commands to forward when
        // this connection has registered as a replica.
        tokio::select! {
            result = stream.read_buf(&mut buf) => {
                match result {
                    Ok(0) => return Ok(()),
                    Ok(_) => {}
                    Err(e) => return Err(e),
                }
            }
            Some(data) = repl_rx.recv() => {
                stream.write_all(&data).await?;
            }
        }
    }
}

/// Background task that periodically evicts expired keys.
async fn active_expiration_loop(
    store: SharedStore,
    config: Arc<Config>,
    shutdown: CancellationToken,
) {
    let interval = Duration::from_millis(config.sweep_interval_ms);
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.cancelled() => return,
        }
        if store.is_empty() {
            continue;
        }
        let removed = store.active_expire(config.expire_sample_size);
        if removed > 0 {
            debug!("Active expiration removed {removed} keys");
        }
    }
}

/// Background task that flushes the append log once per interval.
async fn aof_flush_loop(aof: SharedAofWriter, config: Arc<Config>, shutdown: CancellationToken) {
    let interval = Duration::from_millis(config.flush_interval_ms);
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.cancelled() => return,
        }
        let mut aof = aof.lock().await;
        if let Err(e) = aof.flush() {
            warn!("Append log flush failed: {e}");
        }
    }
}
