//! The fetch contract of the code-distribution service.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::distribution::definition::CapabilityDefinition;
use crate::error::FetchError;

/// Somewhere capability definitions can be fetched from by identifier.
#[async_trait]
pub trait CodeSource: Send + Sync {
    /// Short label for logs.
    fn label(&self) -> String;

    /// Fetch the definition for `id`.
    async fn fetch(&self, id: &str) -> Result<CapabilityDefinition, FetchError>;
}

/// In-memory source, for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCodeSource {
    definitions: HashMap<String, CapabilityDefinition>,
}

impl StaticCodeSource {
    pub fn new(definitions: impl IntoIterator<Item = CapabilityDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|def| (def.id.clone(), def))
                .collect(),
        }
    }

    /// Source serving the stock definitions.
    pub fn with_defaults() -> Self {
        Self::new(crate::distribution::definition::default_definitions())
    }
}

#[async_trait]
impl CodeSource for StaticCodeSource {
    fn label(&self) -> String {
        format!("static ({} definitions)", self.definitions.len())
    }

    async fn fetch(&self, id: &str) -> Result<CapabilityDefinition, FetchError> {
        self.definitions
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_fetch() {
        let source = StaticCodeSource::with_defaults();
        let def = source.fetch("fibonacci").await.unwrap();
        assert_eq!(def.implementation, "fibonacci");

        let err = source.fetch("no-such-tool").await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound { ref id } if id == "no-such-tool"));
    }
}
