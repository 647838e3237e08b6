//! Error handling for decoder operations
//!
//! This module defines the error types used throughout the crate.
//! It uses thiserror for ergonomic error handling and provides one variant
//! per failure class a decoder call can report.

pub use crate::common::MsDecompError;
pub use crate::common::Result;
