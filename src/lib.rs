//! lesson-deck - composes narrated lesson presentations
//!
//! This library turns a lesson's structured content (titles, bullet points,
//! pictures, narration audio, speaker notes) into an Office Open XML
//! presentation (`.pptx`), reusing an existing presentation as the style
//! source.
//!
//! # Features
//!
//! - **Style sources**: masters, layouts and theme come from any `.pptx`; its
//!   own slides are dropped
//! - **Placeholder-free slides**: every slide is built on the emptiest layout
//!   and stripped of editor prompts
//! - **Layout rules**: title, two-column agenda and content slides with an
//!   optional picture
//! - **Narration**: audio embedded off-canvas and started automatically when
//!   the slide is shown
//! - **Diagnostics**: missing or unusable inputs degrade the slide instead of
//!   failing the run
//!
//! # Example - Generating a deck
//!
//! ```no_run
//! use lesson_deck::composer::{GenerateRequest, PresentationGenerator};
//! use lesson_deck::config::GeneratorConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = GenerateRequest::from_json(&std::fs::read_to_string("lesson.json")?)?;
//! let generator = PresentationGenerator::new(GeneratorConfig::load(None)?);
//! let deck = generator.generate(&request)?;
//!
//! for diagnostic in &deck.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! println!("wrote {} slides to {}", deck.slide_count, deck.path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Building slides directly
//!
//! ```no_run
//! use lesson_deck::ooxml::pptx::{Document, Geometry, Paragraph, TextBody};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::open("style.pptx")?;
//! let layout = doc.layouts().resolve_blank().unwrap_or(0);
//! let slide = doc.add_slide(layout)?;
//!
//! let mut body = TextBody::new();
//! body.push(Paragraph::new("Photosynthesis"));
//! slide.add_text_box(Geometry::new(914_400, 914_400, 7_315_200, 914_400), body);
//! doc.save("out.pptx")?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod composer;
pub mod config;
pub mod ooxml;
pub mod templates;

pub use common::{Error, Result};
pub use composer::{GenerateRequest, GeneratedDeck, PresentationGenerator};
pub use config::GeneratorConfig;
