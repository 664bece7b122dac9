//! `codeserver` – serves capability definitions to satellites over HTTP.

use std::sync::Arc;

use anyhow::Context;
use satellite::distribution::DefinitionStore;
use satellite::distribution::server::serve;
use tokio::net::TcpListener;

const DEFAULT_PORT: u16 = 8090;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let port: u16 = match std::env::var("CODE_SERVER_PORT") {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("invalid CODE_SERVER_PORT '{}'", raw))?,
        Err(_) => DEFAULT_PORT,
    };

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind code server port {}", port))?;

    serve(listener, Arc::new(DefinitionStore::with_defaults()))
        .await
        .context("code server stopped")
}
