//! Lesson deck composition.
//!
//! Turns a [`GenerateRequest`] into a presentation. Every slide is created on
//! the style source's blank layout, stripped of inherited placeholders, laid
//! out by one of the composers, then given its notes and narration:
//!
//! - [`title`]: lesson title and subtitle
//! - [`agenda`]: two-column agenda or objectives
//! - [`content`]: bullets or flat lines, with an optional picture
//! - [`media`]: pictures, backgrounds, narration audio and its auto-play timing
//! - [`sanitize`]: placeholder removal
//! - [`generator`]: the end-to-end run and output allocation
//!
//! # Example
//!
//! ```rust,no_run
//! use lesson_deck::composer::{GenerateRequest, PresentationGenerator};
//! use lesson_deck::config::GeneratorConfig;
//!
//! let request = GenerateRequest::from_json(r#"{
//!     "templatePath": "blank",
//!     "lessonTitle": "Cells",
//!     "slides": [{"slideType": "title", "title": "Cells", "content": ["Biology 101"]}]
//! }"#)?;
//! let deck = PresentationGenerator::new(GeneratorConfig::default()).generate(&request)?;
//! println!("{} slides at {}", deck.slide_count, deck.path.display());
//! # Ok::<(), lesson_deck::Error>(())
//! ```

pub mod agenda;
pub mod content;
pub mod diagnostics;
pub mod generator;
pub mod media;
pub mod record;
pub mod sanitize;
pub mod style;
pub mod title;

pub use diagnostics::{Diagnostic, DiagnosticReason, Diagnostics, Level, MediaKind};
pub use generator::{GeneratedDeck, OutputAllocator, PresentationGenerator, TempFileAllocator};
pub use record::{Bullet, GenerateRequest, SlideContentRecord, SlideKind, SlideType};

use crate::ooxml::pptx::{Canvas, ShapeId, Slide};
use std::path::Path;

/// Per-slide state handed to the composers.
pub struct SlideContext<'a> {
    /// Dispatch index of the slide
    pub index: usize,
    pub canvas: Canvas,
    /// Background picture for this kind of slide
    pub background: Option<&'a Path>,
    pub diagnostics: &'a mut Diagnostics,
}

impl<'a> SlideContext<'a> {
    pub fn new(
        index: usize,
        canvas: Canvas,
        background: Option<&'a Path>,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            index,
            canvas,
            background,
            diagnostics,
        }
    }

    /// Record a diagnostic against this slide.
    pub fn report(&mut self, reason: DiagnosticReason) {
        self.diagnostics.record(Some(self.index), reason);
    }

    /// Add the background picture, if one is configured, behind everything
    /// already on the slide.
    pub fn place_background(&mut self, slide: &mut Slide) -> Option<ShapeId> {
        let path = self.background?;
        match media::attach_background(slide, path, self.canvas) {
            Ok(id) => Some(id),
            Err(reason) => {
                self.report(reason);
                None
            },
        }
    }
}

/// Lay out `record` on `slide` with the composer for `kind`.
pub fn compose_slide(slide: &mut Slide, kind: SlideKind, record: &SlideContentRecord, ctx: &mut SlideContext<'_>) {
    match kind {
        SlideKind::Title => title::compose_title(slide, record, ctx),
        SlideKind::Agenda => agenda::compose_agenda(slide, record, ctx),
        SlideKind::Content => content::compose_content(slide, record, ctx),
    }
}

/// Attach the narration audio at `path` and make it play on entry.
///
/// Returns the media shape's id, or `None` when the audio was skipped.
pub fn attach_narration(slide: &mut Slide, path: &Path, ctx: &mut SlideContext<'_>) -> Option<ShapeId> {
    let id = match media::attach_audio(slide, path) {
        Ok(id) => id,
        Err(reason) => {
            ctx.report(reason);
            return None;
        },
    };
    if let Err(reason) = media::install_auto_play(slide, id) {
        ctx.report(reason);
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::Document;
    use std::io::Cursor;

    #[test]
    fn test_missing_background_is_reported() {
        let mut doc = Document::blank().unwrap();
        let slide = doc.add_slide(6).unwrap();
        let mut diagnostics = Diagnostics::new();
        let background = Path::new("/nonexistent/bg.png");
        let mut ctx = SlideContext::new(0, Canvas::DEFAULT, Some(background), &mut diagnostics);

        assert_eq!(ctx.place_background(slide), None);
        assert_eq!(diagnostics.count(Level::Info), 1);
    }

    #[test]
    fn test_background_behind_title() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bg.jpg");
        let img = image::RgbImage::from_pixel(32, 18, image::Rgb([0, 0, 0]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Jpeg).unwrap();
        std::fs::write(&path, out.into_inner()).unwrap();

        let mut doc = Document::blank().unwrap();
        let slide = doc.add_slide(6).unwrap();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = SlideContext::new(0, Canvas::DEFAULT, Some(path.as_path()), &mut diagnostics);
        compose_slide(
            slide,
            SlideKind::Title,
            &SlideContentRecord::new(SlideType::Title, "Lesson 1"),
            &mut ctx,
        );

        assert_eq!(slide.shape_count(), 2);
        assert!(matches!(slide.shapes()[0].kind(), crate::ooxml::pptx::ShapeKind::Picture(_)));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_auto_play_reinstall_keeps_one_media_shape() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("voice.wav");
        std::fs::write(&path, b"RIFF\x00\x00\x00\x00WAVE").unwrap();

        let mut doc = Document::blank().unwrap();
        let slide = doc.add_slide(6).unwrap();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = SlideContext::new(3, Canvas::DEFAULT, None, &mut diagnostics);

        let id = attach_narration(slide, &path, &mut ctx).unwrap();
        media::install_auto_play(slide, id).unwrap();

        let media_shapes = slide
            .shapes()
            .iter()
            .filter(|s| matches!(s.kind(), crate::ooxml::pptx::ShapeKind::Media(_)))
            .count();
        assert_eq!(media_shapes, 1);
        assert_eq!(slide.timing().unwrap().target_shape_ids(), vec![id]);
        assert!(diagnostics.is_empty());
    }
}
