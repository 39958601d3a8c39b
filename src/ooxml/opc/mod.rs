/// Open Packaging Conventions (OPC) layer.
///
/// Reads a presentation package into an in-memory part graph, lets callers
/// add, replace and drop parts and relationships, and writes the graph back
/// out as a ZIP archive with a regenerated `[Content_Types].xml`.
///
/// - Package structure (parts, relationships)
/// - Content type discovery and generation
/// - ZIP-based physical packaging via the `zip` crate
pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::{BlobPart, Part, XmlPart};
pub use rel::{Relationship, Relationships};
