use grafton::http::HttpServer;
use grafton::{GraphRegistry, MemoryStore, ServerConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("grafton graph service v{}", grafton::version());

    let config = ServerConfig::from_env();
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(GraphRegistry::open(store)?);

    let server = HttpServer::new(registry, config);
    server.start().await?;

    Ok(())
}
