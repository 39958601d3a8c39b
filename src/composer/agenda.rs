//! Agenda and objectives slides: a heading over two balanced columns.

use crate::composer::SlideContext;
use crate::composer::record::SlideContentRecord;
use crate::composer::style::{add_heading, body_text, frame};
use crate::ooxml::pptx::{Paragraph, Slide, TextBody};

/// Heading used when the record carries no title.
pub const DEFAULT_AGENDA_TITLE: &str = "Nội dung bài học";

pub const ITEM_SIZE: f64 = 24.0;
pub const ITEM_SPACE_AFTER: f64 = 16.0;

/// Number of items in the left column: the larger half.
#[inline]
pub fn split_columns(count: usize) -> usize {
    count.div_ceil(2)
}

/// Column items: one per bullet when bullets are present, else the flat
/// content lines.
pub fn agenda_items(record: &SlideContentRecord) -> Vec<String> {
    match record.bullets() {
        Some(bullets) => bullets
            .iter()
            .map(|b| {
                let label = if b.point().is_empty() { b.description() } else { b.point() };
                format!("{} {}", b.emoji(), label)
            })
            .collect(),
        None => record.content.clone(),
    }
}

fn column(items: &[String]) -> TextBody {
    let mut body = TextBody::wrapped();
    for item in items {
        body.push(
            Paragraph::new(item.as_str())
                .format(body_text(ITEM_SIZE))
                .space_after(ITEM_SPACE_AFTER),
        );
    }
    body
}

pub fn compose_agenda(slide: &mut Slide, record: &SlideContentRecord, ctx: &mut SlideContext<'_>) {
    ctx.place_background(slide);
    let heading = if record.title.trim().is_empty() { DEFAULT_AGENDA_TITLE } else { record.title.as_str() };
    add_heading(slide, heading);

    let items = agenda_items(record);
    if items.is_empty() {
        return;
    }

    let (left, right) = items.split_at(split_columns(items.len()));
    slide.add_text_box(frame(0.5, 1.2, 4.5, 4.0), column(left));
    slide.add_text_box(frame(5.0, 1.2, 4.5, 4.0), column(right));
}
