//! Generation requests and the per-slide content records they carry.
//!
//! Records arrive as camelCase JSON. Every field is optional on the wire;
//! absent strings read as empty and absent lists as empty.

use crate::common::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// A structured bullet point.
///
/// A bullet without a point is a definition: only its description is shown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bullet {
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub point: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Bullet {
    pub fn new(emoji: &str, point: &str, description: &str) -> Self {
        Self {
            emoji: Some(emoji.to_string()),
            point: Some(point.to_string()),
            description: Some(description.to_string()),
        }
    }

    pub fn emoji(&self) -> &str {
        self.emoji.as_deref().unwrap_or_default()
    }

    pub fn point(&self) -> &str {
        self.point.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// The `slideType` tag of a record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SlideType {
    Title,
    Agenda,
    Objectives,
    #[default]
    Content,
    /// Any tag the composers do not know; dispatched by position
    Other(String),
}

impl From<String> for SlideType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "title" => Self::Title,
            "agenda" => Self::Agenda,
            "objectives" => Self::Objectives,
            "content" => Self::Content,
            _ => Self::Other(tag),
        }
    }
}

impl From<SlideType> for String {
    fn from(slide_type: SlideType) -> Self {
        slide_type.as_str().to_string()
    }
}

impl SlideType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Title => "title",
            Self::Agenda => "agenda",
            Self::Objectives => "objectives",
            Self::Content => "content",
            Self::Other(tag) => tag,
        }
    }

    /// Composer for a slide with this tag at `slide_index`.
    ///
    /// The first slide is always a title and the second is an agenda unless
    /// tagged as a title; everywhere else the tag decides.
    pub fn kind(&self, slide_index: usize) -> SlideKind {
        match self {
            Self::Title => SlideKind::Title,
            _ if slide_index == 0 => SlideKind::Title,
            Self::Agenda | Self::Objectives => SlideKind::Agenda,
            _ if slide_index == 1 => SlideKind::Agenda,
            _ => SlideKind::Content,
        }
    }
}

/// Which composer lays out a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideKind {
    Title,
    Agenda,
    Content,
}

/// One slide of lesson content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideContentRecord {
    /// Position in the lesson; defaults to the record's position in the request
    #[serde(default)]
    pub slide_index: Option<usize>,
    #[serde(default)]
    pub slide_type: SlideType,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub content: Vec<String>,
    #[serde(default)]
    pub bullets: Option<Vec<Bullet>>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub audio_path: Option<String>,
    #[serde(default)]
    pub speaker_note: Option<String>,
}

impl SlideContentRecord {
    pub fn new(slide_type: SlideType, title: &str) -> Self {
        Self {
            slide_type,
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Index used for dispatch, given the record's position in the request.
    pub fn index_or(&self, position: usize) -> usize {
        self.slide_index.unwrap_or(position)
    }

    /// Structured bullets, if any were supplied. An empty list counts as none.
    pub fn bullets(&self) -> Option<&[Bullet]> {
        self.bullets.as_deref().filter(|bullets| !bullets.is_empty())
    }

    pub fn image_path(&self) -> Option<&Path> {
        non_empty_path(self.image_path.as_deref())
    }

    pub fn audio_path(&self) -> Option<&Path> {
        non_empty_path(self.audio_path.as_deref())
    }

    /// Speaker notes, if non-empty.
    pub fn speaker_note(&self) -> Option<&str> {
        self.speaker_note.as_deref().filter(|note| !note.is_empty())
    }
}

/// A request to generate one lesson deck.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Style source path, or the blank sentinel
    #[serde(default)]
    pub template_path: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub lesson_title: String,
    #[serde(default)]
    pub slides: Vec<SlideContentRecord>,
    #[serde(default)]
    pub title_bg_path: Option<String>,
    #[serde(default)]
    pub content_bg_path: Option<String>,
}

impl GenerateRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn template_path(&self) -> Option<&str> {
        self.template_path.as_deref().filter(|path| !path.is_empty())
    }

    pub fn title_background(&self) -> Option<&Path> {
        non_empty_path(self.title_bg_path.as_deref())
    }

    pub fn content_background(&self) -> Option<&Path> {
        non_empty_path(self.content_bg_path.as_deref())
    }

    /// File name offered for the generated deck.
    pub fn filename(&self) -> String {
        let stem = self.lesson_title.trim();
        let stem = if stem.is_empty() { "lesson" } else { stem };
        let stem: String = stem
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        format!("{}.pptx", stem)
    }
}

fn non_empty_path(path: Option<&str>) -> Option<&Path> {
    path.filter(|p| !p.is_empty()).map(Path::new)
}

fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `content` is normally a list but a bare string is accepted as one item.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(item)) if item.is_empty() => Vec::new(),
        Some(OneOrMany::One(item)) => vec![item],
        Some(OneOrMany::Many(items)) => items,
    })
}
