//! Catalog of statically linked implementations.
//!
//! A fetched [`CapabilityDefinition`] names an implementation; the catalog
//! turns that name plus the definition's config into a live capability.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::capabilities::builtin::{AddConstant, Echo, Fibonacci};
use crate::capabilities::capability::Capability;
use crate::distribution::CapabilityDefinition;

/// Builds a capability from its definition. Errors are human-readable reasons.
pub type CapabilityFactory =
    Arc<dyn Fn(&CapabilityDefinition) -> Result<Arc<dyn Capability>, String> + Send + Sync>;

/// Implementation name → factory.
#[derive(Clone, Default)]
pub struct CapabilityCatalog {
    factories: HashMap<String, CapabilityFactory>,
}

impl CapabilityCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in implementation.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register("fibonacci", |def| {
            Ok(Arc::new(Fibonacci::new(def.id.clone())) as Arc<dyn Capability>)
        });
        catalog.register("add_constant", |def| {
            #[derive(Deserialize)]
            struct AddConstantConfig {
                addend: i64,
            }
            let config: AddConstantConfig = serde_json::from_value(def.config.clone())
                .map_err(|e| format!("invalid add_constant config: {}", e))?;
            Ok(Arc::new(AddConstant::new(def.id.clone(), config.addend)) as Arc<dyn Capability>)
        });
        catalog.register("echo", |def| {
            Ok(Arc::new(Echo::new(def.id.clone())) as Arc<dyn Capability>)
        });
        catalog
    }

    /// Register (or replace) the factory for an implementation name.
    pub fn register<F>(&mut self, implementation: impl Into<String>, factory: F)
    where
        F: Fn(&CapabilityDefinition) -> Result<Arc<dyn Capability>, String> + Send + Sync + 'static,
    {
        let implementation = implementation.into();
        tracing::debug!(implementation = %implementation, "Registered capability implementation");
        self.factories.insert(implementation, Arc::new(factory));
    }

    pub fn has(&self, implementation: &str) -> bool {
        self.factories.contains_key(implementation)
    }

    pub fn implementations(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Materialize a capability from a fetched definition.
    pub fn materialize(&self, def: &CapabilityDefinition) -> Result<Arc<dyn Capability>, String> {
        let factory = self
            .factories
            .get(&def.implementation)
            .ok_or_else(|| format!("no implementation named '{}'", def.implementation))?;
        factory(def)
    }
}

impl std::fmt::Debug for CapabilityCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityCatalog")
            .field("implementations", &self.implementations())
            .finish()
    }
}
