//! Capabilities: the units of work a satellite executes.
//!
//! - `capability` — the [`Capability`] trait
//! - `builtin` — statically linked implementations
//! - `catalog` — implementation name → factory
//! - `cache` — single-flight identifier → instance cache
//! - `resolver` — cache lookup with fetch-and-materialize on miss

pub mod builtin;
pub mod cache;
pub mod capability;
pub mod catalog;
pub mod resolver;

pub use cache::CapabilityCache;
pub use capability::Capability;
pub use catalog::{CapabilityCatalog, CapabilityFactory};
pub use resolver::CapabilityResolver;
