//! Statically linked capability implementations.

pub mod arithmetic;
pub mod fibonacci;

pub use arithmetic::{AddConstant, Echo};
pub use fibonacci::Fibonacci;
