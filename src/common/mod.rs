//! Common types and utilities shared by the package layer and the composers.

// Submodule declarations
pub mod error;
pub mod unit;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use unit::{Emu, EMUS_PER_INCH, EMUS_PER_PT};
