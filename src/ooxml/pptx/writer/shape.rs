/// Shapes placed on a generated slide.
///
/// Composed shapes (text boxes, pictures, narration media) are built from
/// typed values and serialized here. Placeholders cloned from a layout are
/// kept as [`InheritedShape`] until the sanitizer decides whether they stay.
use crate::common::unit::{Emu, centipoints};
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::pptx::format::{Alignment, ImageFormat, TextFormat};
use crate::ooxml::pptx::media::AudioClip;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write as FmtWrite;

/// Slide-local shape id (`p:cNvPr/@id`).
pub type ShapeId = u32;

/// Extension URI of the PowerPoint 2010 media element.
const P14_MEDIA_EXT_URI: &str = "{DAA4B4D4-6D71-4841-9C94-3DE7FCFB9230}";

/// Position and size of a shape, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: Emu,
    pub y: Emu,
    pub cx: Emu,
    pub cy: Emu,
}

impl Geometry {
    pub const fn new(x: Emu, y: Emu, cx: Emu, cy: Emu) -> Self {
        Self { x, y, cx, cy }
    }

    fn write_xfrm(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            self.x, self.y, self.cx, self.cy
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))
    }
}

/// One paragraph of a text body. The whole paragraph is a single run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub text: String,
    pub format: TextFormat,
    pub alignment: Option<Alignment>,
    /// Outline level, 0 for top-level text
    pub level: u8,
    /// Space before, in points
    pub space_before: Option<f64>,
    /// Space after, in points
    pub space_after: Option<f64>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn format(mut self, format: TextFormat) -> Self {
        self.format = format;
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn space_before(mut self, points: f64) -> Self {
        self.space_before = Some(points);
        self
    }

    pub fn space_after(mut self, points: f64) -> Self {
        self.space_after = Some(points);
        self
    }

    fn write_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<a:p>");

        let has_ppr = self.level > 0
            || self.alignment.is_some()
            || self.space_before.is_some()
            || self.space_after.is_some();
        if has_ppr {
            xml.push_str("<a:pPr");
            if self.level > 0 {
                write!(xml, r#" lvl="{}""#, self.level)
                    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            }
            if let Some(alignment) = self.alignment {
                write!(xml, r#" algn="{}""#, alignment.as_str())
                    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            }
            xml.push('>');
            if let Some(points) = self.space_before {
                write!(
                    xml,
                    r#"<a:spcBef><a:spcPts val="{}"/></a:spcBef>"#,
                    centipoints(points)
                )
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            }
            if let Some(points) = self.space_after {
                write!(
                    xml,
                    r#"<a:spcAft><a:spcPts val="{}"/></a:spcAft>"#,
                    centipoints(points)
                )
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            }
            xml.push_str("</a:pPr>");
        }

        xml.push_str("<a:r>");
        xml.push_str(r#"<a:rPr lang="en-US" dirty="0""#);
        if let Some(size) = self.format.size {
            write!(xml, r#" sz="{}""#, centipoints(size))
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        }
        if self.format.bold {
            xml.push_str(r#" b="1""#);
        }
        if self.format.italic {
            xml.push_str(r#" i="1""#);
        }
        xml.push('>');
        // CT_TextCharacterProperties: fill precedes the typeface
        if let Some(color) = self.format.color {
            write!(
                xml,
                r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
                color.hex()
            )
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        }
        if let Some(ref font) = self.format.font {
            write!(xml, r#"<a:latin typeface="{}"/>"#, escape_xml(font))
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        }
        xml.push_str("</a:rPr>");
        write!(xml, "<a:t>{}</a:t>", escape_xml(&self.text))
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        xml.push_str("</a:r>");

        xml.push_str("</a:p>");
        Ok(())
    }
}

/// Text frame content of a text box.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBody {
    pub word_wrap: bool,
    pub paragraphs: Vec<Paragraph>,
}

impl TextBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wrapped() -> Self {
        Self {
            word_wrap: true,
            paragraphs: Vec::new(),
        }
    }

    pub fn push(&mut self, paragraph: Paragraph) -> &mut Self {
        self.paragraphs.push(paragraph);
        self
    }

    /// Plain text of all paragraphs, joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn write_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<p:txBody>");
        write!(
            xml,
            r#"<a:bodyPr wrap="{}" rtlCol="0"/>"#,
            if self.word_wrap { "square" } else { "none" }
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        xml.push_str("<a:lstStyle/>");
        if self.paragraphs.is_empty() {
            xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
        }
        for paragraph in &self.paragraphs {
            paragraph.write_xml(xml)?;
        }
        xml.push_str("</p:txBody>");
        Ok(())
    }
}

/// An embedded raster image.
#[derive(Debug, Clone)]
pub struct Picture {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub description: String,
}

/// Narration audio with its poster frame.
#[derive(Debug, Clone)]
pub struct MediaClip {
    pub audio: AudioClip,
    /// PNG shown in place of the media
    pub poster: Vec<u8>,
}

/// A placeholder copied from the slide's layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InheritedShape {
    pub ph_type: Option<String>,
    pub ph_idx: Option<u32>,
    /// Raw `p:txBody` markup from the layout, if any
    pub body_xml: Option<String>,
}

impl InheritedShape {
    /// Concatenated `a:t` text of the inherited body.
    ///
    /// Fails when the body markup is not well formed.
    pub fn text(&self) -> Result<String> {
        let Some(ref body) = self.body_xml else {
            return Ok(String::new());
        };

        let mut reader = Reader::from_str(body);
        let mut text = String::new();
        let mut in_text = false;
        let mut paragraphs = 0usize;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"t" => in_text = true,
                    b"p" => {
                        if paragraphs > 0 {
                            text.push('\n');
                        }
                        paragraphs += 1;
                    },
                    _ => {},
                },
                Event::End(e) if e.local_name().as_ref() == b"t" => in_text = false,
                Event::Text(t) if in_text => {
                    let raw = std::str::from_utf8(&t)
                        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                    text.push_str(&crate::common::xml::unescape_xml(raw));
                },
                Event::GeneralRef(r) if in_text => {
                    let name = std::str::from_utf8(&r)
                        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                    text.push_str(&crate::common::xml::unescape_xml(&format!("&{};", name)));
                },
                Event::Eof => break,
                _ => {},
            }
        }

        Ok(text)
    }

    fn write_xml(&self, xml: &mut String, id: ShapeId, name: &str) -> Result<()> {
        xml.push_str("<p:sp><p:nvSpPr>");
        write!(
            xml,
            r#"<p:cNvPr id="{}" name="{}"/>"#,
            id,
            escape_xml(name)
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>"#);
        xml.push_str("<p:ph");
        if let Some(ref ph_type) = self.ph_type {
            write!(xml, r#" type="{}""#, escape_xml(ph_type))
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        }
        if let Some(idx) = self.ph_idx {
            write!(xml, r#" idx="{}""#, idx).map_err(|e| OoxmlError::Xml(e.to_string()))?;
        }
        xml.push_str("/></p:nvPr></p:nvSpPr><p:spPr/>");

        // Malformed layout markup is never copied into the slide
        match self.body_xml {
            Some(ref body) if self.text().is_ok() => xml.push_str(body),
            _ => xml.push_str(
                r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody>"#,
            ),
        }
        xml.push_str("</p:sp>");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum ShapeKind {
    TextBox(TextBody),
    Picture(Picture),
    Media(MediaClip),
    Inherited(InheritedShape),
}

/// Relationship ids a shape's markup refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeRelIds {
    /// Picture blip
    pub image: Option<String>,
    /// `a:audioFile/@r:link`
    pub audio_link: Option<String>,
    /// `p14:media/@r:embed`
    pub media_embed: Option<String>,
    /// Poster frame blip of a media shape
    pub poster: Option<String>,
}

/// A shape on a slide.
#[derive(Debug, Clone)]
pub struct Shape {
    pub(crate) id: ShapeId,
    pub(crate) name: String,
    pub(crate) geometry: Geometry,
    pub(crate) placeholder: bool,
    pub(crate) kind: ShapeKind,
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Whether this shape was inherited from a layout placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn text_body(&self) -> Option<&TextBody> {
        match self.kind {
            ShapeKind::TextBox(ref body) => Some(body),
            _ => None,
        }
    }

    /// Visible text of the shape. Pictures and media have none.
    pub fn text(&self) -> Result<Option<String>> {
        match self.kind {
            ShapeKind::TextBox(ref body) => Ok(Some(body.text())),
            ShapeKind::Inherited(ref inherited) => inherited.text().map(Some),
            ShapeKind::Picture(_) | ShapeKind::Media(_) => Ok(None),
        }
    }

    /// Append the shape's `p:spTree` child element to `xml`.
    pub(crate) fn write_xml(&self, xml: &mut String, rel_ids: Option<&ShapeRelIds>) -> Result<()> {
        match self.kind {
            ShapeKind::TextBox(ref body) => {
                xml.push_str("<p:sp><p:nvSpPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="{}"/>"#,
                    self.id,
                    escape_xml(&self.name)
                )
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);
                xml.push_str("<p:spPr>");
                self.geometry.write_xfrm(xml)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/>"#);
                xml.push_str("</p:spPr>");
                body.write_xml(xml)?;
                xml.push_str("</p:sp>");
            },
            ShapeKind::Picture(ref picture) => {
                let image_rid = rel_ids
                    .and_then(|ids| ids.image.as_deref())
                    .ok_or_else(|| missing_rel(self.id, "image"))?;
                xml.push_str("<p:pic><p:nvPicPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="{}" descr="{}"/>"#,
                    self.id,
                    escape_xml(&self.name),
                    escape_xml(&picture.description)
                )
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                xml.push_str(
                    r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
                );
                write!(
                    xml,
                    r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
                    image_rid
                )
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                xml.push_str("<p:spPr>");
                self.geometry.write_xfrm(xml)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#);
                xml.push_str("</p:pic>");
            },
            ShapeKind::Media(_) => self.write_media_xml(xml, rel_ids)?,
            ShapeKind::Inherited(ref inherited) => inherited.write_xml(xml, self.id, &self.name)?,
        }
        Ok(())
    }

    fn write_media_xml(&self, xml: &mut String, rel_ids: Option<&ShapeRelIds>) -> Result<()> {
        let ids = rel_ids.ok_or_else(|| missing_rel(self.id, "media"))?;
        let audio_rid = ids
            .audio_link
            .as_deref()
            .ok_or_else(|| missing_rel(self.id, "audio"))?;
        let media_rid = ids
            .media_embed
            .as_deref()
            .ok_or_else(|| missing_rel(self.id, "media"))?;
        let poster_rid = ids
            .poster
            .as_deref()
            .ok_or_else(|| missing_rel(self.id, "poster"))?;

        xml.push_str("<p:pic><p:nvPicPr>");
        write!(
            xml,
            r#"<p:cNvPr id="{}" name="{}">"#,
            self.id,
            escape_xml(&self.name)
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        // Clicking the shape toggles playback
        xml.push_str(r#"<a:hlinkClick r:id="" action="ppaction://media"/>"#);
        xml.push_str("</p:cNvPr>");
        xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
        xml.push_str("<p:nvPr>");
        write!(xml, r#"<a:audioFile r:link="{}"/>"#, audio_rid)
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        write!(
            xml,
            r#"<p:extLst><p:ext uri="{}"><p14:media xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main" r:embed="{}"/></p:ext></p:extLst>"#,
            P14_MEDIA_EXT_URI, media_rid
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        xml.push_str("</p:nvPr></p:nvPicPr>");
        write!(
            xml,
            r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
            poster_rid
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        xml.push_str("<p:spPr>");
        self.geometry.write_xfrm(xml)?;
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#);
        xml.push_str("</p:pic>");
        Ok(())
    }
}

fn missing_rel(shape_id: ShapeId, what: &str) -> OoxmlError {
    OoxmlError::InvalidFormat(format!("shape {} has no {} relationship", shape_id, what))
}
