//! Writer components for generated slides.

pub mod pres;
pub(crate) mod relmap;
pub mod shape;
pub mod slide;

pub use pres::{
    Canvas, FIRST_SLIDE_ID, PresentationEdit, PresentationInfo, SlideEntry, strip_outline_slide_list,
};
pub use shape::{
    Geometry, InheritedShape, MediaClip, Paragraph, Picture, Shape, ShapeId, ShapeKind, TextBody,
};
pub use slide::Slide;
