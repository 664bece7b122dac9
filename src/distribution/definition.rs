//! Capability definitions as served by the code-distribution service.

use serde::{Deserialize, Serialize};

/// Everything a node needs to materialize a capability.
///
/// `implementation` names an entry in the node's
/// [`CapabilityCatalog`](crate::capabilities::CapabilityCatalog); `config` is
/// handed to that entry's factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDefinition {
    pub id: String,
    pub implementation: String,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CapabilityDefinition {
    pub fn new(id: impl Into<String>, implementation: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            implementation: implementation.into(),
            config: serde_json::Value::Null,
            description: None,
        }
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The definitions a stock code server publishes.
pub fn default_definitions() -> Vec<CapabilityDefinition> {
    vec![
        CapabilityDefinition::new("fibonacci", "fibonacci")
            .with_description("n-th Fibonacci number"),
        CapabilityDefinition::new("plus_one", "add_constant")
            .with_config(serde_json::json!({ "addend": 1 }))
            .with_description("Adds one to an integer"),
        CapabilityDefinition::new("echo", "echo").with_description("Returns its parameters"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_defaults_when_fields_missing() {
        let def: CapabilityDefinition =
            serde_json::from_str(r#"{"id": "echo", "implementation": "echo"}"#).unwrap();
        assert_eq!(def, CapabilityDefinition::new("echo", "echo"));
    }

    #[test]
    fn test_default_definitions_have_unique_ids() {
        let defs = default_definitions();
        let mut ids: Vec<&str> = defs.iter().map(|d| d.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), defs.len());
    }
}
