//! Typography and frames shared by the slide composers.

use crate::common::unit::inches;
use crate::ooxml::pptx::{Alignment, Geometry, Paragraph, RgbColor, ShapeId, Slide, TextBody, TextFormat};

pub const FONT_NAME: &str = "Arial";

/// Body text colour, `3A664D`.
pub const BODY_COLOR: RgbColor = RgbColor::new(0x3A, 0x66, 0x4D);

/// Titles sit on a dark background image.
pub const TITLE_COLOR: RgbColor = RgbColor::WHITE;

/// Heading size on agenda and content slides.
pub const HEADING_SIZE: f64 = 28.0;

/// A frame given in inches.
#[inline]
pub fn frame(x: f64, y: f64, width: f64, height: f64) -> Geometry {
    Geometry::new(inches(x), inches(y), inches(width), inches(height))
}

/// Arial at `size` points.
pub fn text(size: f64) -> TextFormat {
    TextFormat::new().font(FONT_NAME).size(size)
}

/// Arial at `size` points in the body colour.
pub fn body_text(size: f64) -> TextFormat {
    text(size).color(BODY_COLOR)
}

/// Add the centred white heading used by agenda and content slides.
pub fn add_heading(slide: &mut Slide, title: &str) -> ShapeId {
    let mut body = TextBody::new();
    body.push(
        Paragraph::new(title)
            .format(text(HEADING_SIZE).color(TITLE_COLOR))
            .align(Alignment::Center),
    );
    slide.add_text_box(frame(0.5, 0.2, 9.0, 0.8), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame() {
        let geometry = frame(0.5, 1.2, 9.0, 4.0);
        assert_eq!(geometry.x, 457_200);
        assert_eq!(geometry.y, 1_097_280);
        assert_eq!(geometry.cx, 8_229_600);
        assert_eq!(geometry.cy, 3_657_600);
    }

    #[test]
    fn test_body_text() {
        let format = body_text(24.0);
        assert_eq!(format.font.as_deref(), Some(FONT_NAME));
        assert_eq!(format.size, Some(24.0));
        assert_eq!(format.color, Some(BODY_COLOR));
        assert!(!format.bold);
    }
}
