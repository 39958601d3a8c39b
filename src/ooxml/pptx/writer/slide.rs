/// A slide being composed, and its serialization to PresentationML.
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::pptx::layout::LayoutPlaceholder;
use crate::ooxml::pptx::timing::TimingGraph;
use std::fmt::Write as FmtWrite;

use super::relmap::RelationshipMapper;
use super::shape::{
    Geometry, InheritedShape, MediaClip, Picture, Shape, ShapeId, ShapeKind, TextBody,
};

/// Id of the slide's root group shape. Shape ids start after it.
const ROOT_GROUP_ID: ShapeId = 1;

/// A slide in a generated presentation.
#[derive(Debug, Clone)]
pub struct Slide {
    /// Index into the layout catalog
    layout: usize,
    /// Shapes in z-order, back to front
    shapes: Vec<Shape>,
    /// Next free shape id; ids are never reused within a slide
    next_shape_id: ShapeId,
    notes: Option<String>,
    timing: Option<TimingGraph>,
}

impl Slide {
    pub(crate) fn new(layout: usize) -> Self {
        Self {
            layout,
            shapes: Vec::new(),
            next_shape_id: ROOT_GROUP_ID + 1,
            notes: None,
            timing: None,
        }
    }

    /// Copy the layout placeholders a new slide inherits.
    pub(crate) fn clone_placeholders(&mut self, placeholders: &[LayoutPlaceholder]) {
        for ph in placeholders.iter().filter(|ph| ph.is_cloneable()) {
            let inherited = InheritedShape {
                ph_type: ph.ph_type.clone(),
                ph_idx: ph.ph_idx,
                body_xml: ph.body_xml.clone(),
            };
            self.add_inherited(&ph.name, inherited, true);
        }
    }

    /// Index of the layout this slide was created from.
    pub fn layout_index(&self) -> usize {
        self.layout
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    fn push(&mut self, name_base: &str, geometry: Geometry, placeholder: bool, kind: ShapeKind) -> ShapeId {
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        self.shapes.push(Shape {
            id,
            name: format!("{} {}", name_base, id - 1),
            geometry,
            placeholder,
            kind,
        });
        id
    }

    /// Add a text box on top of the existing shapes.
    pub fn add_text_box(&mut self, geometry: Geometry, body: TextBody) -> ShapeId {
        self.push("TextBox", geometry, false, ShapeKind::TextBox(body))
    }

    pub fn add_picture(&mut self, geometry: Geometry, picture: Picture) -> ShapeId {
        self.push("Picture", geometry, false, ShapeKind::Picture(picture))
    }

    /// Add a narration media shape.
    pub fn add_media(&mut self, geometry: Geometry, clip: MediaClip) -> ShapeId {
        self.push("Media", geometry, false, ShapeKind::Media(clip))
    }

    /// Add a shape carried over from a layout.
    pub fn add_inherited(&mut self, name: &str, inherited: InheritedShape, placeholder: bool) -> ShapeId {
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        self.shapes.push(Shape {
            id,
            name: name.to_string(),
            geometry: Geometry::default(),
            placeholder,
            kind: ShapeKind::Inherited(inherited),
        });
        id
    }

    /// Remove a shape. A timing graph that targets it is dropped too.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let pos = self.shapes.iter().position(|s| s.id == id)?;
        if self
            .timing
            .as_ref()
            .is_some_and(|t| t.target_shape_ids().contains(&id))
        {
            self.timing = None;
        }
        Some(self.shapes.remove(pos))
    }

    /// Move a shape behind every other shape. Returns false if no such shape.
    pub fn send_to_back(&mut self, id: ShapeId) -> bool {
        match self.shapes.iter().position(|s| s.id == id) {
            Some(pos) => {
                let shape = self.shapes.remove(pos);
                self.shapes.insert(0, shape);
                true
            },
            None => false,
        }
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.notes = Some(notes.to_string());
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn has_notes(&self) -> bool {
        self.notes.is_some()
    }

    /// Install the slide's timing graph, replacing any previous one.
    ///
    /// Every shape the graph targets must be on the slide.
    pub fn set_timing(&mut self, timing: TimingGraph) -> Result<()> {
        if let Some(missing) = timing
            .target_shape_ids()
            .into_iter()
            .find(|id| self.shape(*id).is_none())
        {
            return Err(OoxmlError::InvalidFormat(format!(
                "timing targets shape {} which is not on the slide",
                missing
            )));
        }
        self.timing = Some(timing);
        Ok(())
    }

    pub fn timing(&self) -> Option<&TimingGraph> {
        self.timing.as_ref()
    }

    pub(crate) fn to_xml(&self, slide_index: usize, rel_mapper: &RelationshipMapper) -> Result<String> {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" "#,
        );
        xml.push_str(r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
        xml.push_str(
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        xml.push_str("<p:cSld><p:spTree>");
        write_group_properties(&mut xml)?;
        for shape in &self.shapes {
            shape.write_xml(&mut xml, rel_mapper.shape_ids(slide_index, shape.id))?;
        }
        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");

        // p:timing follows p:clrMapOvr (and p:transition, never written here)
        if let Some(ref timing) = self.timing {
            timing.write_xml(&mut xml);
        }

        xml.push_str("</p:sld>");
        Ok(xml)
    }

    /// Notes slide markup, one paragraph per line of the notes.
    pub(crate) fn notes_xml(&self) -> Option<Result<String>> {
        let notes_text = self.notes.as_ref()?;
        Some(write_notes_xml(notes_text))
    }
}

fn write_group_properties(xml: &mut String) -> Result<()> {
    xml.push_str("<p:nvGrpSpPr>");
    write!(xml, r#"<p:cNvPr id="{}" name=""/>"#, ROOT_GROUP_ID)
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    xml.push_str("<p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>");
    xml.push_str("<p:grpSpPr><a:xfrm>");
    xml.push_str(r#"<a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#);
    xml.push_str(r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/>"#);
    xml.push_str("</a:xfrm></p:grpSpPr>");
    Ok(())
}

fn write_notes_xml(notes_text: &str) -> Result<String> {
    let mut xml = String::with_capacity(2048);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<p:notes xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" "#,
    );
    xml.push_str(r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
    xml.push_str(
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );
    xml.push_str("<p:cSld><p:spTree>");
    write_group_properties(&mut xml)?;

    xml.push_str("<p:sp><p:nvSpPr>");
    xml.push_str(r#"<p:cNvPr id="2" name="Slide Image Placeholder 1"/>"#);
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr>"#);
    xml.push_str(r#"<p:nvPr><p:ph type="sldImg"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#);

    xml.push_str("<p:sp><p:nvSpPr>");
    xml.push_str(r#"<p:cNvPr id="3" name="Notes Placeholder 2"/>"#);
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
    xml.push_str(r#"<p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr>"#);
    xml.push_str("<p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>");
    for line in notes_text.lines() {
        if line.is_empty() {
            xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
            continue;
        }
        write!(
            xml,
            r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
            escape_xml(line)
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    }
    if notes_text.is_empty() {
        xml.push_str("<a:p/>");
    }
    xml.push_str("</p:txBody></p:sp>");

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:notes>");
    Ok(xml)
}
