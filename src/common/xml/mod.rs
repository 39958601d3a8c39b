//! XML text helpers shared by the part writers.

mod escape;

pub use escape::{escape_xml, unescape_xml};
