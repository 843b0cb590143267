use ember::config::Config;
use ember::persistence::aof::{self, AofWriter};
use ember::replication::ReplicaSet;
use ember::server;
use ember::store::Store;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_args(&args);

    // Rebuild the store from the append log, if one exists.
    let store = Store::new();
    if std::path::Path::new(&config.aof_path).exists() {
        info!("Restoring data from {}...", config.aof_path);
        match aof::replay(&config.aof_path, &store) {
            Ok(count) => info!("Replayed {count} commands"),
            Err(e) => tracing::warn!("Failed to replay append log: {e}"),
        }
    }

    // A log that cannot be opened for appending is fatal at startup.
    let mut aof_writer = AofWriter::new();
    aof_writer.open(&config.aof_path)?;
    info!("Append log open: {}", config.aof_path);

    let config = Arc::new(config);
    let store = Arc::new(store);
    let replicas = Arc::new(RwLock::new(ReplicaSet::new()));
    let aof = Arc::new(Mutex::new(aof_writer));

    server::run_server(store, config, replicas, aof).await
}
