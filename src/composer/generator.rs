//! End-to-end generation: style source in, `.pptx` artifact out.

use crate::common::error::{Error, Result};
use crate::composer::diagnostics::{Diagnostic, DiagnosticReason, Diagnostics, Level};
use crate::composer::record::{GenerateRequest, SlideKind};
use crate::composer::sanitize::sanitize;
use crate::composer::{SlideContext, attach_narration, compose_slide};
use crate::config::GeneratorConfig;
use crate::ooxml::pptx::Document;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Hands out a fresh, unique path for each generated artifact.
pub trait OutputAllocator {
    fn allocate(&self) -> Result<PathBuf>;
}

/// Allocates `lesson-*.pptx` files in a directory.
///
/// Each call creates a new empty file, so concurrent runs never share a
/// name. The file outlives the allocator; removing it is the caller's job.
#[derive(Debug, Clone)]
pub struct TempFileAllocator {
    dir: PathBuf,
}

impl TempFileAllocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl OutputAllocator for TempFileAllocator {
    fn allocate(&self) -> Result<PathBuf> {
        let unwritable = |source| Error::OutputUnwritable {
            path: self.dir.clone(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(unwritable)?;
        let file = tempfile::Builder::new()
            .prefix("lesson-")
            .suffix(".pptx")
            .tempfile_in(&self.dir)
            .map_err(unwritable)?;
        let (_, path) = file.keep().map_err(|e| unwritable(e.error))?;
        Ok(path)
    }
}

/// A generated deck.
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    pub path: PathBuf,
    pub slide_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratedDeck {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == Level::Warn)
    }
}

/// Composes lesson decks.
#[derive(Debug, Clone, Default)]
pub struct PresentationGenerator {
    config: GeneratorConfig,
}

impl PresentationGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Open the request's style source, falling back to the blank canvas
    /// when none is named or the named file does not exist.
    pub fn open_style_source(&self, request: &GenerateRequest, diagnostics: &mut Diagnostics) -> Result<Document> {
        let template = match request.template_path() {
            Some(template) if !self.config.is_blank(template) => template,
            _ => return Ok(Document::blank()?),
        };

        let path = self.config.resolve_template(template);
        if !path.exists() {
            diagnostics.record(None, DiagnosticReason::StyleSourceMissing(path));
            return Ok(Document::blank()?);
        }
        Ok(Document::open(&path)?)
    }

    /// Build the in-memory document for `request`.
    pub fn compose(&self, request: &GenerateRequest, diagnostics: &mut Diagnostics) -> Result<Document> {
        let mut doc = self.open_style_source(request, diagnostics)?;
        let layout = doc.layouts().resolve_blank().ok_or(Error::EmptyLayoutCatalog)?;
        let canvas = doc.canvas();
        doc.set_title(&request.lesson_title);

        for (position, record) in request.slides.iter().enumerate() {
            let index = record.index_or(position);
            let kind = record.slide_type.kind(index);
            let background = match kind {
                SlideKind::Title | SlideKind::Agenda => request.title_background(),
                SlideKind::Content => request.content_background(),
            };
            debug!(slide = index, ?kind, layout, "composing slide");

            let slide = doc.add_slide(layout)?;
            sanitize(slide, index, diagnostics);

            let mut ctx = SlideContext::new(index, canvas, background, diagnostics);
            compose_slide(slide, kind, record, &mut ctx);
            if let Some(note) = record.speaker_note() {
                slide.set_notes(note);
            }
            if let Some(audio) = record.audio_path() {
                attach_narration(slide, audio, &mut ctx);
            }
        }
        Ok(doc)
    }

    /// Generate into the configured output directory.
    pub fn generate(&self, request: &GenerateRequest) -> Result<GeneratedDeck> {
        self.generate_with(request, &TempFileAllocator::new(&self.config.output_dir))
    }

    /// Generate into a path handed out by `allocator`.
    pub fn generate_with(&self, request: &GenerateRequest, allocator: &dyn OutputAllocator) -> Result<GeneratedDeck> {
        info!(
            lesson = %request.lesson_title,
            slides = request.slides.len(),
            template = request.template_path().unwrap_or_default(),
            "generating lesson deck"
        );

        let mut diagnostics = Diagnostics::new();
        let doc = self.compose(request, &mut diagnostics)?;
        let slide_count = doc.slide_count();
        let bytes = doc.to_bytes()?;

        let path = allocator.allocate()?;
        persist(&path, &bytes)?;

        info!(
            path = %path.display(),
            slides = slide_count,
            warnings = diagnostics.count(Level::Warn),
            "lesson deck written"
        );
        Ok(GeneratedDeck {
            path,
            slide_count,
            diagnostics: diagnostics.into_vec(),
        })
    }
}

fn persist(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|source| {
        // Best effort: do not leave an empty artifact behind
        let _ = std::fs::remove_file(path);
        Error::OutputUnwritable {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::record::{SlideContentRecord, SlideType};
    use crate::ooxml::pptx::ShapeKind;
    use tempfile::TempDir;

    fn generator(dir: &TempDir) -> PresentationGenerator {
        PresentationGenerator::new(GeneratorConfig {
            templates_dir: dir.path().join("templates"),
            output_dir: dir.path().join("out"),
            ..GeneratorConfig::default()
        })
    }

    fn request(template: &str) -> GenerateRequest {
        let mut agenda = SlideContentRecord::new(SlideType::Other("overview".to_string()), "Plan");
        agenda.content = vec!["One".to_string(), "Two".to_string()];
        let mut body = SlideContentRecord::new(SlideType::Content, "Body");
        body.speaker_note = Some("Say hello".to_string());
        GenerateRequest {
            template_path: Some(template.to_string()),
            lesson_title: "Cells".to_string(),
            slides: vec![SlideContentRecord::new(SlideType::Title, "Cells"), agenda, body],
            ..GenerateRequest::default()
        }
    }

    #[test]
    fn test_compose_blank() {
        let dir = TempDir::new().unwrap();
        let mut diagnostics = Diagnostics::new();
        let doc = generator(&dir).compose(&request("blank"), &mut diagnostics).unwrap();

        assert_eq!(doc.slide_count(), 3);
        assert!(diagnostics.is_empty());
        // position 1 is an agenda: heading plus two columns
        assert_eq!(doc.slide(1).unwrap().shape_count(), 3);
        assert_eq!(doc.slide(2).unwrap().notes(), Some("Say hello"));
        for slide in doc.slides() {
            assert!(slide.shapes().iter().all(|s| !s.is_placeholder()));
            assert!(slide.shapes().iter().all(|s| !matches!(s.kind(), ShapeKind::Inherited(_))));
        }
    }

    #[test]
    fn test_missing_style_source_falls_back() {
        let dir = TempDir::new().unwrap();
        let mut diagnostics = Diagnostics::new();
        let doc = generator(&dir)
            .compose(&request("/nonexistent/ocean.pptx"), &mut diagnostics)
            .unwrap();

        assert_eq!(doc.slide_count(), 3);
        assert_eq!(diagnostics.count(Level::Warn), 1);
        assert!(matches!(
            diagnostics.iter().next().unwrap().reason,
            DiagnosticReason::StyleSourceMissing(_)
        ));
    }

    #[test]
    fn test_invalid_style_source_is_fatal() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("broken.pptx");
        std::fs::write(&template, b"this is not a zip archive").unwrap();

        let mut diagnostics = Diagnostics::new();
        let err = generator(&dir)
            .compose(&request(&template.to_string_lossy()), &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, Error::Ooxml(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_generate_allocates_unique_files() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir);
        let first = generator.generate(&request("blank")).unwrap();
        let second = generator.generate(&request("blank")).unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(first.slide_count, 3);
        assert!(first.path.starts_with(dir.path().join("out")));
        assert_eq!(first.path.extension().unwrap(), "pptx");
        assert!(std::fs::metadata(&first.path).unwrap().len() > 0);
    }

    #[test]
    fn test_unwritable_output() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();

        let allocator = TempFileAllocator::new(blocker.join("out"));
        let err = generator(&dir)
            .generate_with(&request("blank"), &allocator)
            .unwrap_err();
        assert!(matches!(err, Error::OutputUnwritable { .. }));
    }
}
