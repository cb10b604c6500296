//! Llama.io task tracker API server.

use clap::Parser;
use llamaio_rest::{ServerConfig, create_app_with_config, init_logging};
use llamaio_store::backends::MemoryBackend;
use tracing::info;

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        "Starting Llama.io API server"
    );

    let backend = MemoryBackend::new();
    let app = create_app_with_config(backend, config.clone());
    serve(app, &config).await
}
