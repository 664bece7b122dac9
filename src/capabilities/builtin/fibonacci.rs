//! Fibonacci capability.

use async_trait::async_trait;

use crate::capabilities::capability::{Capability, require_u64};
use crate::error::CapabilityError;

/// Computes F(n) with F(0) = 0 and F(1) = 1.
///
/// Parameters: a non-negative integer `n`. Result: the integer F(n).
/// F(94) and above do not fit in a u64 and fail with `ExecutionFailed`.
#[derive(Debug)]
pub struct Fibonacci {
    name: String,
}

impl Fibonacci {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn compute(n: u64) -> Option<u64> {
        if n == 0 {
            return Some(0);
        }
        let (mut a, mut b) = (0u64, 1u64);
        for _ in 1..n {
            let next = a.checked_add(b)?;
            a = b;
            b = next;
        }
        Some(b)
    }
}

#[async_trait]
impl Capability for Fibonacci {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Computes the n-th Fibonacci number (F(0) = 0, F(1) = 1)."
    }

    async fn execute(&self, params: serde_json::Value) -> Result<serde_json::Value, CapabilityError> {
        let n = require_u64(&self.name, &params)?;
        let value = Self::compute(n).ok_or_else(|| CapabilityError::ExecutionFailed {
            name: self.name.clone(),
            reason: format!("F({}) overflows a 64-bit integer", n),
        })?;
        Ok(serde_json::Value::from(value))
    }
}
