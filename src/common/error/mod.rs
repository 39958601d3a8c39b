//! Unified error types for lesson-deck.
//!
//! Only structural faults surface as [`Error`]. Per-shape and per-slide faults
//! are recorded as diagnostics by the composers instead.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
