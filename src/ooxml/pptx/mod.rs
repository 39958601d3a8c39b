//! PowerPoint (.pptx) generation.
//!
//! A [`Document`] is opened from a style source (or the built-in blank
//! presentation), slides are added on one of its layouts, and the result is
//! written as a new package:
//!
//! - [`layout`]: the layout catalog and blank-layout resolution
//! - [`writer`]: slides, shapes and the presentation part
//! - [`timing`]: slide timing graphs for media auto-play
//! - [`media`] and [`format`]: embeddable audio and images

pub mod document;
pub mod format;
pub mod layout;
pub mod media;
pub mod props;
pub mod template;
pub mod timing;
pub mod writer;

pub use document::Document;
pub use format::{Alignment, ImageFormat, ImageInfo, RgbColor, TextFormat};
pub use layout::{Layout, LayoutCatalog, LayoutPlaceholder};
pub use media::{AudioClip, AudioFormat};
pub use timing::TimingGraph;
pub use writer::{Canvas, Geometry, Paragraph, Shape, ShapeId, ShapeKind, Slide, TextBody};
