//! Office Open XML support for presentation packages.
//!
//! - [`opc`]: the packaging layer (parts, relationships, content types, ZIP)
//! - [`pptx`]: the PresentationML document model and writers

pub mod error;
pub mod opc;
pub mod pptx;

pub use error::{OoxmlError, Result};
pub use opc::{OpcPackage, PackURI};
