//! Document properties (`docProps/core.xml` and `docProps/app.xml`).

use crate::common::xml::escape_xml;
use chrono::{DateTime, SecondsFormat, Utc};

/// Name recorded as creator and application.
pub const GENERATOR_NAME: &str = "lesson-deck";

/// Core properties of a generated deck.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreProperties {
    pub title: String,
    pub creator: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl CoreProperties {
    /// Properties stamped with the current time.
    pub fn now(title: &str) -> Self {
        let now = Utc::now();
        Self {
            title: title.to_string(),
            creator: GENERATOR_NAME.to_string(),
            created: now,
            modified: now,
        }
    }

    pub fn to_xml(&self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
                r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
                r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
                "<dc:title>{title}</dc:title>",
                "<dc:creator>{creator}</dc:creator>",
                "<cp:lastModifiedBy>{creator}</cp:lastModifiedBy>",
                "<cp:revision>1</cp:revision>",
                r#"<dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>"#,
                r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{modified}</dcterms:modified>"#,
                "</cp:coreProperties>"
            ),
            title = escape_xml(&self.title),
            creator = escape_xml(&self.creator),
            created = self.created.to_rfc3339_opts(SecondsFormat::Secs, true),
            modified = self.modified.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }
}

/// Extended properties: the application name and part counts.
pub fn app_xml(slides: usize, notes: usize, media_clips: usize) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>{app}</Application>",
            "<Slides>{slides}</Slides>",
            "<Notes>{notes}</Notes>",
            "<HiddenSlides>0</HiddenSlides>",
            "<MMClips>{media_clips}</MMClips>",
            "</Properties>"
        ),
        app = GENERATOR_NAME,
        slides = slides,
        notes = notes,
        media_clips = media_clips,
    )
}
