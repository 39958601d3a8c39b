//! Non-fatal faults recorded while composing a deck.
//!
//! Only structural faults abort a generation run. Everything else (a missing
//! image, an unsupported audio file, a placeholder whose markup cannot be
//! read) is recorded here, mirrored to `tracing`, and returned with the
//! output.

use crate::ooxml::pptx::ShapeId;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Info,
    Warn,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "info",
            Level::Warn => "warn",
        })
    }
}

/// What kind of input file a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Background,
    Image,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaKind::Background => "background image",
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
        })
    }
}

/// Why a degraded path was taken.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagnosticReason {
    #[error("style source {} not found, using the blank canvas", .0.display())]
    StyleSourceMissing(PathBuf),

    #[error("{kind} {} not found, skipped", path.display())]
    MissingFile { kind: MediaKind, path: PathBuf },

    #[error("{kind} {} could not be used: {detail}", path.display())]
    UnreadableFile {
        kind: MediaKind,
        path: PathBuf,
        detail: String,
    },

    #[error("audio {} has an unsupported extension, skipped", .0.display())]
    UnsupportedAudio(PathBuf),

    #[error("{dropped} content item(s) beyond the first {kept} were dropped")]
    ContentTruncated { kept: usize, dropped: usize },

    #[error("shape {shape_id} could not be inspected and was kept: {detail}")]
    PlaceholderUninspectable { shape_id: ShapeId, detail: String },

    #[error("auto-play timing could not be installed: {0}")]
    TimingRejected(String),
}

impl DiagnosticReason {
    pub fn level(&self) -> Level {
        match self {
            Self::MissingFile { .. } => Level::Info,
            _ => Level::Warn,
        }
    }
}

/// One recorded fault.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: Level,
    /// Slide the fault belongs to; `None` for deck-level faults
    pub slide_index: Option<usize>,
    pub reason: DiagnosticReason,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slide_index {
            Some(index) => write!(f, "[{}] slide {}: {}", self.level, index, self.reason),
            None => write!(f, "[{}] {}", self.level, self.reason),
        }
    }
}

/// Collects the diagnostics of one generation run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fault and emit it as a tracing event.
    pub fn record(&mut self, slide_index: Option<usize>, reason: DiagnosticReason) {
        let level = reason.level();
        match level {
            Level::Info => info!(slide = ?slide_index, "{}", reason),
            Level::Warn => warn!(slide = ?slide_index, "{}", reason),
        }
        self.entries.push(Diagnostic {
            level,
            slide_index,
            reason,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, level: Level) -> usize {
        self.entries.iter().filter(|d| d.level == level).count()
    }

    /// Diagnostics recorded against one slide.
    pub fn for_slide(&self, slide_index: usize) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(move |d| d.slide_index == Some(slide_index))
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        let missing = DiagnosticReason::MissingFile {
            kind: MediaKind::Audio,
            path: PathBuf::from("narration.mp3"),
        };
        assert_eq!(missing.level(), Level::Info);
        assert_eq!(
            DiagnosticReason::UnsupportedAudio(PathBuf::from("a.ogg")).level(),
            Level::Warn
        );
        assert_eq!(
            DiagnosticReason::ContentTruncated { kept: 6, dropped: 2 }.level(),
            Level::Warn
        );
    }

    #[test]
    fn test_record_and_count() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.record(None, DiagnosticReason::StyleSourceMissing(PathBuf::from("t.pptx")));
        diagnostics.record(
            Some(2),
            DiagnosticReason::MissingFile {
                kind: MediaKind::Image,
                path: PathBuf::from("cell.png"),
            },
        );

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.count(Level::Warn), 1);
        assert_eq!(diagnostics.count(Level::Info), 1);
        assert_eq!(diagnostics.for_slide(2).count(), 1);
        assert_eq!(diagnostics.for_slide(0).count(), 0);
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic {
            level: Level::Info,
            slide_index: Some(3),
            reason: DiagnosticReason::MissingFile {
                kind: MediaKind::Background,
                path: PathBuf::from("bg.png"),
            },
        };
        assert_eq!(
            diagnostic.to_string(),
            "[info] slide 3: background image bg.png not found, skipped"
        );
    }
}
