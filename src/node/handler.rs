//! Per-connection job handling.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::capabilities::CapabilityResolver;
use crate::config::ErrorReplyPolicy;
use crate::error::{JobError, ProtocolError};
use crate::protocol::{Envelope, ErrorReply, read_frame, write_value};

/// Settings a handler needs from the node configuration.
#[derive(Debug, Clone, Copy)]
pub struct HandlerOptions {
    pub io_timeout: Option<Duration>,
    pub error_replies: ErrorReplyPolicy,
    pub max_frame_len: usize,
}

/// Handles exactly one job on one connection.
pub struct ConnectionHandler {
    resolver: Arc<CapabilityResolver>,
    options: HandlerOptions,
}

impl ConnectionHandler {
    pub fn new(resolver: Arc<CapabilityResolver>, options: HandlerOptions) -> Self {
        Self { resolver, options }
    }

    /// Read one envelope, run its job, and write the bare result.
    ///
    /// Decode failures and unsupported kinds never get a response. Resolution
    /// and execution failures get one only under [`ErrorReplyPolicy::Explicit`].
    /// The stream is dropped (closed) when this returns.
    pub async fn handle<S>(&self, mut stream: S) -> Result<(), JobError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let body = self
            .with_timeout(read_frame(&mut stream, self.options.max_frame_len))
            .await??;
        let job = Envelope::decode(&body)?.into_job()?;
        debug!(capability = %job.capability_id, "Job received");

        let outcome = self.run(&job.capability_id, job.parameters).await;

        let value = match outcome {
            Ok(value) => value,
            Err(err) => {
                if self.options.error_replies == ErrorReplyPolicy::Explicit {
                    let reply = ErrorReply::from_job_error(&err);
                    match self.with_timeout(write_value(&mut stream, &reply)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => debug!(error = %e, "Failed to send error reply"),
                        Err(e) => debug!(error = %e, "Timed out sending error reply"),
                    }
                }
                return Err(err);
            }
        };

        self.with_timeout(write_value(&mut stream, &value)).await??;
        info!(capability = %job.capability_id, "Job completed");
        Ok(())
    }

    async fn run(
        &self,
        capability_id: &str,
        parameters: serde_json::Value,
    ) -> Result<serde_json::Value, JobError> {
        let capability = self.resolver.resolve(capability_id).await?;
        Ok(capability.execute(parameters).await?)
    }

    async fn with_timeout<F, T>(&self, fut: F) -> Result<Result<T, ProtocolError>, JobError>
    where
        F: Future<Output = Result<T, ProtocolError>>,
    {
        match self.options.io_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| JobError::Timeout(limit)),
            None => Ok(fut.await),
        }
    }
}
