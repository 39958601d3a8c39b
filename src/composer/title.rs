//! Title slide: the lesson title and an optional subtitle, centred.

use crate::composer::SlideContext;
use crate::composer::record::SlideContentRecord;
use crate::composer::style::{TITLE_COLOR, frame, text};
use crate::ooxml::pptx::{Alignment, Paragraph, Slide, TextBody};

pub const TITLE_SIZE: f64 = 44.0;
pub const SUBTITLE_SIZE: f64 = 22.0;

pub fn compose_title(slide: &mut Slide, record: &SlideContentRecord, ctx: &mut SlideContext<'_>) {
    ctx.place_background(slide);

    let mut title = TextBody::new();
    title.push(
        Paragraph::new(record.title.as_str())
            .format(text(TITLE_SIZE).bold(true).color(TITLE_COLOR))
            .align(Alignment::Center),
    );
    slide.add_text_box(frame(1.0, 2.0, 8.0, 1.5), title);

    // The first content line doubles as the subtitle
    if let Some(subtitle) = record.content.first().filter(|line| !line.is_empty()) {
        let mut body = TextBody::new();
        body.push(
            Paragraph::new(subtitle.as_str())
                .format(text(SUBTITLE_SIZE).color(TITLE_COLOR))
                .align(Alignment::Center),
        );
        slide.add_text_box(frame(1.0, 3.5, 8.0, 1.0), body);
    }
}
