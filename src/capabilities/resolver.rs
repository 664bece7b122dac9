//! Capability resolution: cache lookup, then fetch and materialize on miss.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::capabilities::cache::CapabilityCache;
use crate::capabilities::capability::Capability;
use crate::capabilities::catalog::CapabilityCatalog;
use crate::distribution::CodeSource;
use crate::error::ResolveError;

/// Turns capability identifiers into ready-to-run instances.
///
/// Owned by a single node; two resolvers never share cached entries.
pub struct CapabilityResolver {
    cache: CapabilityCache,
    source: Arc<dyn CodeSource>,
    catalog: CapabilityCatalog,
}

impl CapabilityResolver {
    pub fn new(source: Arc<dyn CodeSource>, catalog: CapabilityCatalog) -> Self {
        Self {
            cache: CapabilityCache::new(),
            source,
            catalog,
        }
    }

    /// Resolver backed by the built-in catalog.
    pub fn with_builtins(source: Arc<dyn CodeSource>) -> Self {
        Self::new(source, CapabilityCatalog::with_builtins())
    }

    pub fn cache(&self) -> &CapabilityCache {
        &self.cache
    }

    /// Resolve `id` to a capability, fetching it on first reference.
    ///
    /// Concurrent calls for the same uncached identifier share one fetch.
    /// Failures are not cached.
    pub async fn resolve(&self, id: &str) -> Result<Arc<dyn Capability>, ResolveError> {
        if !is_nameable(id) {
            return Err(ResolveError::UnknownCapability { id: id.to_string() });
        }

        if let Some(capability) = self.cache.get(id).await {
            debug!(capability = id, "Capability already in cache");
            return Ok(capability);
        }

        self.cache.get_or_try_init(id, || self.load(id)).await
    }

    async fn load(&self, id: &str) -> Result<Arc<dyn Capability>, ResolveError> {
        info!(capability = id, source = %self.source.label(), "Fetching capability");

        let load_failure = |reason: String| {
            warn!(capability = id, reason = %reason, "Capability load failed");
            ResolveError::LoadFailure {
                id: id.to_string(),
                reason,
            }
        };

        let definition = self
            .source
            .fetch(id)
            .await
            .map_err(|e| load_failure(e.to_string()))?;

        if definition.id != id {
            return Err(load_failure(format!(
                "code server returned definition for '{}'",
                definition.id
            )));
        }

        let capability = self.catalog.materialize(&definition).map_err(load_failure)?;
        info!(
            capability = id,
            implementation = %definition.implementation,
            "Capability loaded"
        );
        Ok(capability)
    }
}

impl std::fmt::Debug for CapabilityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityResolver")
            .field("source", &self.source.label())
            .field("catalog", &self.catalog)
            .finish()
    }
}

fn is_nameable(id: &str) -> bool {
    !id.trim().is_empty() && !id.chars().any(char::is_control)
}
