//! Slide layouts of a style source.
//!
//! The catalog lists layouts in the order PowerPoint shows them: masters in
//! `p:sldMasterIdLst` order, and within a master its `p:sldLayoutIdLst`.
//! Each layout records its placeholders so new slides can inherit them and
//! the blank-layout resolver can count them.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type as RT;
use crate::ooxml::opc::{OpcPackage, PackURI};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;
use tracing::debug;

/// Layout index PowerPoint's stock templates use for "Blank".
pub const PREFERRED_BLANK_INDEX: usize = 6;

/// Placeholder types a new slide does not inherit.
const NON_CLONEABLE_TYPES: [&str; 3] = ["dt", "ftr", "sldNum"];

/// A placeholder declared by a layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutPlaceholder {
    pub name: String,
    /// `p:ph/@type`; absent means a body placeholder
    pub ph_type: Option<String>,
    pub ph_idx: Option<u32>,
    /// Raw `p:txBody` markup, prompt text included
    pub body_xml: Option<String>,
}

impl LayoutPlaceholder {
    /// Date, footer and slide-number placeholders stay on the layout.
    pub fn is_cloneable(&self) -> bool {
        !self
            .ph_type
            .as_deref()
            .is_some_and(|t| NON_CLONEABLE_TYPES.contains(&t))
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    name: String,
    partname: PackURI,
    placeholders: Vec<LayoutPlaceholder>,
}

impl Layout {
    /// Parse a `p:sldLayout` part.
    pub fn parse(partname: PackURI, xml: &str) -> Result<Self> {
        let (name, placeholders) = parse_layout_xml(xml)?;
        Ok(Self {
            name,
            partname,
            placeholders,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    pub fn placeholders(&self) -> &[LayoutPlaceholder] {
        &self.placeholders
    }

    /// Number of placeholders, non-cloneable ones included.
    pub fn placeholder_count(&self) -> usize {
        self.placeholders.len()
    }
}

/// Ordered layouts of a presentation.
#[derive(Debug, Clone, Default)]
pub struct LayoutCatalog {
    layouts: Vec<Layout>,
}

impl LayoutCatalog {
    pub fn new(layouts: Vec<Layout>) -> Self {
        Self { layouts }
    }

    /// Collect the layouts of every master, in master order.
    pub fn load(package: &OpcPackage, masters: &[PackURI]) -> Result<Self> {
        let mut layouts = Vec::new();

        for master_name in masters {
            let master = package.get_part(master_name)?;
            let xml = std::str::from_utf8(master.blob())
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;

            let mut partnames: Vec<PackURI> = Vec::new();
            for r_id in layout_rids(xml)? {
                partnames.push(master.related_partname(&r_id)?);
            }
            if partnames.is_empty() {
                // No id list: fall back to relationship order
                for rel in master.rels().iter().filter(|r| r.reltype() == RT::SLIDE_LAYOUT) {
                    partnames.push(rel.target_partname()?);
                }
            }

            for partname in partnames {
                let part = package.get_part(&partname)?;
                let layout_xml = std::str::from_utf8(part.blob())
                    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                let layout = Layout::parse(partname.clone(), layout_xml)?;
                debug!(
                    layout = %layout.partname,
                    name = %layout.name,
                    placeholders = layout.placeholder_count(),
                    "catalogued layout"
                );
                layouts.push(layout);
            }
        }

        Ok(Self { layouts })
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Layout> {
        self.layouts.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layout> {
        self.layouts.iter()
    }

    /// Pick the layout composed slides are created on.
    ///
    /// Index 6 wins when it has no placeholders; otherwise the first layout
    /// without placeholders; otherwise the first layout with the fewest.
    /// `None` only for an empty catalog.
    pub fn resolve_blank(&self) -> Option<usize> {
        if self
            .layouts
            .get(PREFERRED_BLANK_INDEX)
            .is_some_and(|l| l.placeholder_count() == 0)
        {
            return Some(PREFERRED_BLANK_INDEX);
        }
        if let Some(index) = self.layouts.iter().position(|l| l.placeholder_count() == 0) {
            return Some(index);
        }
        self.layouts
            .iter()
            .enumerate()
            .min_by_key(|(index, l)| (l.placeholder_count(), *index))
            .map(|(index, _)| index)
    }
}

/// `r:id` values of `p:sldLayoutId` entries, in document order.
fn layout_rids(master_xml: &str) -> Result<SmallVec<[String; 12]>> {
    let mut reader = Reader::from_str(master_xml);
    let mut rids = SmallVec::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"sldLayoutId" =>
            {
                if let Some(r_id) = relationship_id(e)? {
                    rids.push(r_id);
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(rids)
}

/// Value of a namespaced `id` attribute (`r:id`), as opposed to a plain `id`.
pub(crate) fn relationship_id(e: &BytesStart) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"id" && attr.key.prefix().is_some() {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

pub(crate) fn attr_value(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

/// A top-level shape of the shape tree, while its subtree is being read.
struct PendingShape {
    depth: usize,
    name: String,
    ph: Option<(Option<String>, Option<u32>)>,
    body_start: Option<usize>,
    body_xml: Option<String>,
}

impl PendingShape {
    fn observe(&mut self, e: &BytesStart, depth: usize, start: usize) -> Result<()> {
        match e.local_name().as_ref() {
            // shape > nvXxPr > cNvPr
            b"cNvPr" if depth == self.depth + 2 => {
                self.name = attr_value(e, b"name")?.unwrap_or_default();
            },
            // shape > nvXxPr > nvPr > ph
            b"ph" if depth == self.depth + 3 => {
                let ph_type = attr_value(e, b"type")?;
                let ph_idx = attr_value(e, b"idx")?
                    .and_then(|v| atoi_simd::parse::<u32, false, false>(v.as_bytes()).ok());
                self.ph = Some((ph_type, ph_idx));
            },
            b"txBody" if depth == self.depth + 1 => self.body_start = Some(start),
            _ => {},
        }
        Ok(())
    }

    fn finish(self) -> Option<LayoutPlaceholder> {
        let (ph_type, ph_idx) = self.ph?;
        Some(LayoutPlaceholder {
            name: self.name,
            ph_type,
            ph_idx,
            body_xml: self.body_xml,
        })
    }
}

/// Layout name (`p:cSld/@name`) and its placeholders in z-order.
fn parse_layout_xml(xml: &str) -> Result<(String, Vec<LayoutPlaceholder>)> {
    let mut reader = Reader::from_str(xml);
    let mut name = String::new();
    let mut placeholders = Vec::new();

    let mut depth = 0usize;
    let mut tree_depth: Option<usize> = None;
    let mut tree_done = false;
    let mut current: Option<PendingShape> = None;

    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(ref e) => {
                depth += 1;
                match e.local_name().as_ref() {
                    b"cSld" => name = attr_value(e, b"name")?.unwrap_or_default(),
                    b"spTree" if tree_depth.is_none() && !tree_done => tree_depth = Some(depth),
                    _ => {},
                }
                if current.is_none()
                    && let Some(tree) = tree_depth
                    && depth == tree + 1
                {
                    current = Some(PendingShape {
                        depth,
                        name: String::new(),
                        ph: None,
                        body_start: None,
                        body_xml: None,
                    });
                }
                if let Some(ref mut shape) = current {
                    shape.observe(e, depth, start)?;
                }
            },
            Event::Empty(ref e) => {
                if let Some(ref mut shape) = current {
                    shape.observe(e, depth + 1, start)?;
                }
            },
            Event::End(ref e) => {
                let end = reader.buffer_position() as usize;
                let mut closed = false;
                if let Some(ref mut shape) = current {
                    if e.local_name().as_ref() == b"txBody"
                        && depth == shape.depth + 1
                        && let Some(body_start) = shape.body_start.take()
                    {
                        shape.body_xml = xml.get(body_start..end).map(str::to_string);
                    }
                    closed = depth == shape.depth;
                }
                if closed && let Some(placeholder) = current.take().and_then(PendingShape::finish) {
                    placeholders.push(placeholder);
                }
                if tree_depth == Some(depth) {
                    tree_depth = None;
                    tree_done = true;
                }
                depth = depth.saturating_sub(1);
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok((name, placeholders))
}
