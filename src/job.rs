//! Job — a request naming a capability and carrying its parameters.

use serde::{Deserialize, Serialize};

/// A unit of work submitted by a client.
///
/// `parameters` is opaque to the node; only the capability named by
/// `capability_id` interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub capability_id: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl Job {
    pub fn new(capability_id: impl Into<String>, parameters: serde_json::Value) -> Self {
        Self {
            capability_id: capability_id.into(),
            parameters,
        }
    }
}
