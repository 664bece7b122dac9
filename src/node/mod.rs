//! Satellite worker node: accept loop and per-connection dispatch.
//!
//! `Satellite::bind` moves the node from created to listening; `run` accepts
//! connections forever and spawns one task per connection. A failing
//! connection task never affects the accept loop or other connections.

pub mod handler;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::capabilities::CapabilityResolver;
use crate::config::{AddressRecord, DEFAULT_BIND_HOST, NodeConfig};
use crate::distribution::CodeSource;
use crate::error::{JobError, NodeError};

pub use handler::{ConnectionHandler, HandlerOptions};

/// Pause after a failed accept.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// A listening satellite node.
pub struct Satellite {
    info: AddressRecord,
    listener: TcpListener,
    handler: Arc<ConnectionHandler>,
    resolver: Arc<CapabilityResolver>,
    limiter: Option<Arc<Semaphore>>,
}

impl Satellite {
    /// Bind the node's listening socket using the built-in capability catalog.
    pub async fn bind(config: NodeConfig, source: Arc<dyn CodeSource>) -> Result<Self, NodeError> {
        let resolver = Arc::new(CapabilityResolver::with_builtins(source));
        Self::bind_with_resolver(config, resolver).await
    }

    /// Bind with a caller-supplied resolver.
    pub async fn bind_with_resolver(
        config: NodeConfig,
        resolver: Arc<CapabilityResolver>,
    ) -> Result<Self, NodeError> {
        let addr = config.satellite.authority(DEFAULT_BIND_HOST);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| NodeError::Bind {
                addr: addr.clone(),
                source,
            })?;

        let options = HandlerOptions {
            io_timeout: config.io_timeout,
            error_replies: config.error_replies,
            max_frame_len: config.max_frame_len,
        };
        let handler = Arc::new(ConnectionHandler::new(Arc::clone(&resolver), options));
        let limiter = config
            .max_connections
            .map(|max| Arc::new(Semaphore::new(max)));

        info!(
            satellite = %config.satellite.display_name(),
            addr = %addr,
            code_server = %config.code_server.authority("?"),
            max_connections = ?config.max_connections,
            "Satellite listening"
        );

        Ok(Self {
            info: config.satellite,
            listener,
            handler,
            resolver,
            limiter,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn info(&self) -> &AddressRecord {
        &self.info
    }

    pub fn resolver(&self) -> &Arc<CapabilityResolver> {
        &self.resolver
    }

    /// Accept connections until the process ends.
    pub async fn run(self) {
        loop {
            let permit = match &self.limiter {
                Some(limiter) => match Arc::clone(limiter).acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => {
                        error!("Connection limiter closed");
                        return;
                    }
                },
                None => None,
            };

            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            };

            let handler = Arc::clone(&self.handler);
            let span = info_span!("connection", id = %Uuid::new_v4(), peer = %peer);
            tokio::spawn(
                async move {
                    serve_connection(&handler, stream).await;
                    drop(permit);
                }
                .instrument(span),
            );
        }
    }

    /// Spawn [`run`](Self::run) in the background and return the bound address.
    pub fn spawn(self) -> std::io::Result<SocketAddr> {
        let addr = self.local_addr()?;
        tokio::spawn(self.run());
        Ok(addr)
    }
}

async fn serve_connection(handler: &ConnectionHandler, stream: TcpStream) {
    if let Err(e) = stream.set_nodelay(true) {
        warn!(error = %e, "Failed to set TCP_NODELAY");
    }
    match handler.handle(stream).await {
        Ok(()) => {}
        Err(e @ (JobError::Protocol(_) | JobError::UnsupportedMessageKind { .. })) => {
            warn!(kind = e.kind(), error = %e, "Dropping connection without response");
        }
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "Job failed");
        }
    }
}
