//! Error types for the satellite node.

use std::time::Duration;

/// Configuration-related errors. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read properties file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Worker node startup errors. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("Failed to bind listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not construct capability resolver: {0}")]
    Resolver(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Wire protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Frame of {len} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { len: usize, max: usize },

    #[error("Connection closed before a complete frame arrived")]
    ConnectionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the code-distribution service.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Capability {id} is unknown to the code-distribution service")]
    NotFound { id: String },

    #[error("Transport failure while fetching {id}: {reason}")]
    Transport { id: String, reason: String },

    #[error("Invalid definition for {id}: {reason}")]
    InvalidDefinition { id: String, reason: String },
}

/// Capability resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Unknown capability: {id:?}")]
    UnknownCapability { id: String },

    #[error("Failed to load capability {id}: {reason}")]
    LoadFailure { id: String, reason: String },
}

/// Capability execution errors.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("Invalid parameters for capability {name}: {reason}")]
    InvalidParameters { name: String, reason: String },

    #[error("Capability {name} execution failed: {reason}")]
    ExecutionFailed { name: String, reason: String },
}

/// Per-connection errors. Contained to the connection handler.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Unsupported message kind: {kind}")]
    UnsupportedMessageKind { kind: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Execution failure: {0}")]
    Execution(#[from] CapabilityError),

    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),
}

impl JobError {
    /// Short machine-readable name of the failure, used in explicit error replies.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::Protocol(ProtocolError::MalformedEnvelope(_)) => "malformed_envelope",
            JobError::Protocol(_) => "protocol",
            JobError::UnsupportedMessageKind { .. } => "unsupported_message_kind",
            JobError::Resolve(ResolveError::UnknownCapability { .. }) => "unknown_capability",
            JobError::Resolve(ResolveError::LoadFailure { .. }) => "load_failure",
            JobError::Execution(_) => "execution_failure",
            JobError::Timeout(_) => "timeout",
        }
    }
}
