//! Small arithmetic and passthrough capabilities.

use async_trait::async_trait;

use crate::capabilities::capability::{Capability, require_i64};
use crate::error::CapabilityError;

/// Adds a configured constant to an integer parameter.
#[derive(Debug)]
pub struct AddConstant {
    name: String,
    addend: i64,
}

impl AddConstant {
    pub fn new(name: impl Into<String>, addend: i64) -> Self {
        Self {
            name: name.into(),
            addend,
        }
    }
}

#[async_trait]
impl Capability for AddConstant {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Adds a fixed constant to an integer."
    }

    async fn execute(&self, params: serde_json::Value) -> Result<serde_json::Value, CapabilityError> {
        let n = require_i64(&self.name, &params)?;
        n.checked_add(self.addend)
            .map(serde_json::Value::from)
            .ok_or_else(|| CapabilityError::ExecutionFailed {
                name: self.name.clone(),
                reason: format!("{} + {} overflows", n, self.addend),
            })
    }
}

/// Returns its parameters unchanged.
#[derive(Debug)]
pub struct Echo {
    name: String,
}

impl Echo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Capability for Echo {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Returns the job parameters unchanged."
    }

    async fn execute(&self, params: serde_json::Value) -> Result<serde_json::Value, CapabilityError> {
        Ok(params)
    }
}
