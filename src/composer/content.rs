//! Content slides: a heading, a text area and an optional picture.
//!
//! Structured bullets take precedence over the flat `content` lines. Each
//! bullet becomes a bold point with an indented description under it, or a
//! single definition paragraph when it has no point. Flat lines are bulleted
//! with `•`, capped at [`MAX_FLAT_ITEMS`], and shrink as their number grows.
//!
//! The picture sits to the right of the text area; when there is no text at
//! all it is centred wide instead.

use crate::common::unit::inches;
use crate::composer::SlideContext;
use crate::composer::diagnostics::{DiagnosticReason, MediaKind};
use crate::composer::media::{PictureSize, attach_picture};
use crate::composer::record::{Bullet, SlideContentRecord};
use crate::composer::style::{add_heading, body_text, frame};
use crate::ooxml::pptx::{Paragraph, Slide, TextBody};
use smallvec::SmallVec;

/// Flat content lines kept on one slide.
pub const MAX_FLAT_ITEMS: usize = 6;

pub const POINT_SIZE: f64 = 22.0;
pub const DESCRIPTION_SIZE: f64 = 18.0;
pub const DEFINITION_SIZE: f64 = 20.0;

const FLAT_MARKER: char = '•';

/// Font size for `count` flat lines. Never grows with the count.
#[inline]
pub fn flat_font_size(count: usize) -> f64 {
    match count {
        0..=3 => 18.0,
        4 | 5 => 16.0,
        _ => 14.0,
    }
}

/// Paragraphs for one bullet: the point and its description, or the
/// description alone.
pub fn bullet_paragraphs(bullet: &Bullet) -> SmallVec<[Paragraph; 2]> {
    let mut paragraphs = SmallVec::new();
    let point = bullet.point();
    let description = bullet.description();

    if point.is_empty() {
        paragraphs.push(
            Paragraph::new(description)
                .format(body_text(DEFINITION_SIZE))
                .space_after(8.0),
        );
        return paragraphs;
    }

    let heading = if bullet.emoji().is_empty() {
        point.to_string()
    } else {
        format!("{} {}", bullet.emoji(), point)
    };
    paragraphs.push(
        Paragraph::new(heading)
            .format(body_text(POINT_SIZE).bold(true))
            .space_after(2.0),
    );
    if !description.is_empty() {
        paragraphs.push(
            Paragraph::new(description)
                .format(body_text(DESCRIPTION_SIZE))
                .level(1)
                .space_before(0.0)
                .space_after(8.0),
        );
    }
    paragraphs
}

/// Paragraphs for flat content lines, and how many lines were dropped.
pub fn flat_paragraphs(items: &[String]) -> (Vec<Paragraph>, usize) {
    let kept = &items[..items.len().min(MAX_FLAT_ITEMS)];
    let size = flat_font_size(kept.len());
    let paragraphs = kept
        .iter()
        .map(|item| {
            let text = if item.starts_with(FLAT_MARKER) {
                item.clone()
            } else {
                format!("{} {}", FLAT_MARKER, item)
            };
            Paragraph::new(text).format(body_text(size)).space_after(6.0)
        })
        .collect();
    (paragraphs, items.len() - kept.len())
}

pub fn compose_content(slide: &mut Slide, record: &SlideContentRecord, ctx: &mut SlideContext<'_>) {
    ctx.place_background(slide);
    add_heading(slide, &record.title);

    let image = match record.image_path() {
        Some(path) if path.exists() => Some(path),
        Some(path) => {
            ctx.report(DiagnosticReason::MissingFile {
                kind: MediaKind::Image,
                path: path.to_path_buf(),
            });
            None
        },
        None => None,
    };

    let mut body = TextBody::wrapped();
    if let Some(bullets) = record.bullets() {
        for bullet in bullets {
            body.paragraphs.extend(bullet_paragraphs(bullet));
        }
    } else {
        let (paragraphs, dropped) = flat_paragraphs(&record.content);
        if dropped > 0 {
            ctx.report(DiagnosticReason::ContentTruncated {
                kept: paragraphs.len(),
                dropped,
            });
        }
        body.paragraphs = paragraphs;
    }
    let has_text = !body.paragraphs.is_empty();

    let width = if image.is_some() { 4.5 } else { 9.0 };
    slide.add_text_box(frame(0.5, 1.2, width, 4.0), body);

    let Some(path) = image else {
        return;
    };
    let placed = if has_text {
        attach_picture(slide, path, MediaKind::Image, inches(5.5), inches(1.5), PictureSize::Height(inches(3.0)))
    } else {
        attach_picture(slide, path, MediaKind::Image, inches(1.5), inches(1.5), PictureSize::Width(inches(7.0)))
    };
    if let Err(reason) = placed {
        ctx.report(reason);
    }
}
