//! securewatch-common — Shared types and errors used across all SecureWatch crates.

pub mod error;
pub mod catalog;

// Re-export commonly used types
pub use catalog::{Severity, Source};
pub use error::{Result, SecureWatchError};
