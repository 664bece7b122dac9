//! Code distribution: where capability definitions come from.
//!
//! - `definition` — the definition document a node materializes from
//! - `source` — the [`CodeSource`] fetch contract and an in-memory source
//! - `http` — client for a remote code server
//! - `server` — a small HTTP code server

pub mod definition;
pub mod http;
pub mod server;
pub mod source;

pub use definition::{CapabilityDefinition, default_definitions};
pub use http::HttpCodeSource;
pub use server::{DefinitionStore, code_server_routes};
pub use source::{CodeSource, StaticCodeSource};
