//! The capability contract.

use std::fmt;

use async_trait::async_trait;

use crate::error::CapabilityError;

/// A named unit of computation exposing a single operation.
///
/// Instances are shared across connection handlers and may be executed
/// concurrently, so implementations must not keep per-call mutable state.
#[async_trait]
pub trait Capability: Send + Sync + fmt::Debug {
    /// Identifier the capability was resolved under.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Run the capability against the job parameters.
    async fn execute(&self, params: serde_json::Value) -> Result<serde_json::Value, CapabilityError>;
}

/// Interpret the parameters as a single non-negative integer.
pub fn require_u64(name: &str, params: &serde_json::Value) -> Result<u64, CapabilityError> {
    params
        .as_u64()
        .ok_or_else(|| CapabilityError::InvalidParameters {
            name: name.to_string(),
            reason: format!("expected a non-negative integer, got {}", params),
        })
}

/// Interpret the parameters as a single signed integer.
pub fn require_i64(name: &str, params: &serde_json::Value) -> Result<i64, CapabilityError> {
    params
        .as_i64()
        .ok_or_else(|| CapabilityError::InvalidParameters {
            name: name.to_string(),
            reason: format!("expected an integer, got {}", params),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_u64() {
        assert_eq!(require_u64("t", &json!(7)).unwrap(), 7);
        assert!(require_u64("t", &json!(-1)).is_err());
        assert!(require_u64("t", &json!("7")).is_err());
        assert!(require_u64("t", &json!(1.5)).is_err());
    }

    #[test]
    fn test_require_i64() {
        assert_eq!(require_i64("t", &json!(-3)).unwrap(), -3);
        assert!(require_i64("t", &json!(null)).is_err());
    }
}
