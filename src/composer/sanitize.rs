//! Placeholder sanitizer.
//!
//! A new slide may carry placeholders cloned from its layout. Left in place,
//! PowerPoint renders their prompt text ("Click to edit Master title style")
//! on top of the composed content, so they are removed before composing.

use crate::composer::diagnostics::{DiagnosticReason, Diagnostics};
use crate::ooxml::pptx::{ShapeId, Slide};
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use once_cell::sync::Lazy;
use tracing::debug;

/// Editor prompt fragments, matched ASCII case-insensitively.
const PROMPT_PATTERNS: [&str; 2] = ["click to", "master"];

static PROMPT_MATCHER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostFirst)
        .build(PROMPT_PATTERNS)
        .expect("prompt patterns are valid")
});

/// Whether `text` contains an editor prompt.
#[inline]
pub fn is_prompt_text(text: &str) -> bool {
    PROMPT_MATCHER.is_match(text)
}

/// Strip placeholders and prompt-text shapes from `slide`.
///
/// Returns the number of shapes removed. A shape whose text cannot be read
/// stays on the slide and a warning is recorded for it.
pub fn sanitize(slide: &mut Slide, slide_index: usize, diagnostics: &mut Diagnostics) -> usize {
    let mut doomed: Vec<ShapeId> = Vec::new();

    for shape in slide.shapes() {
        if shape.is_placeholder() {
            doomed.push(shape.id());
            continue;
        }
        match shape.text() {
            Ok(Some(text)) if is_prompt_text(&text) => doomed.push(shape.id()),
            Ok(_) => {},
            Err(e) => diagnostics.record(
                Some(slide_index),
                DiagnosticReason::PlaceholderUninspectable {
                    shape_id: shape.id(),
                    detail: e.to_string(),
                },
            ),
        }
    }

    for id in &doomed {
        if let Some(shape) = slide.remove_shape(*id) {
            debug!(slide = slide_index, shape = %shape.name(), "removed placeholder");
        }
    }
    doomed.len()
}
