//! Satellite — a worker node that executes named capabilities on demand.
//!
//! Clients send a job naming a capability; the node resolves the name,
//! fetching the definition from a code-distribution service on first use,
//! runs it and writes the result back on the same connection.

pub mod capabilities;
pub mod client;
pub mod config;
pub mod distribution;
pub mod error;
pub mod job;
pub mod node;
pub mod protocol;

pub use client::JobClient;
pub use config::{AddressRecord, NodeConfig};
pub use job::Job;
pub use node::Satellite;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
