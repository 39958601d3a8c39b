/// The presentation part: reading its lists and rewriting its slide list.
///
/// The style source's `presentation.xml` is kept, not regenerated, so master
/// ids, text styles and extensions written by other producers survive. Only
/// the slide id list, the custom shows, the section list and (when notes are
/// added) the notes master list are replaced.
use crate::common::unit::Emu;
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::pptx::layout::{attr_value, relationship_id};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write as FmtWrite;

/// First id PowerPoint accepts in `p:sldId/@id`.
pub const FIRST_SLIDE_ID: u32 = 256;

/// Extension carrying the PowerPoint 2010 section list.
const SECTION_LIST_EXT_URI: &str = "{521415D9-36F7-43E2-AB2F-B90AF26B5E84}";

/// Slide size of a presentation, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: Emu,
    pub height: Emu,
}

impl Canvas {
    /// 10in x 5.625in, 16:9.
    pub const DEFAULT: Canvas = Canvas {
        width: 9_144_000,
        height: 5_143_500,
    };
}

impl Default for Canvas {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Lists read from `presentation.xml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentationInfo {
    pub master_rids: Vec<String>,
    pub slide_rids: Vec<String>,
    pub notes_master_rid: Option<String>,
    pub canvas: Option<Canvas>,
}

impl PresentationInfo {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut info = Self::default();

        loop {
            match reader.read_event()? {
                Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"sldMasterId" => info.master_rids.extend(relationship_id(e)?),
                    b"sldId" => info.slide_rids.extend(relationship_id(e)?),
                    b"notesMasterId" => info.notes_master_rid = relationship_id(e)?,
                    b"sldSz" => {
                        let cx = attr_value(e, b"cx")?.and_then(|v| parse_emu(&v));
                        let cy = attr_value(e, b"cy")?.and_then(|v| parse_emu(&v));
                        if let (Some(width), Some(height)) = (cx, cy) {
                            info.canvas = Some(Canvas { width, height });
                        }
                    },
                    _ => {},
                },
                Event::Eof => break,
                _ => {},
            }
        }

        Ok(info)
    }
}

fn parse_emu(value: &str) -> Option<Emu> {
    atoi_simd::parse::<i64, false, false>(value.as_bytes()).ok()
}

/// A `p:sldId` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideEntry {
    pub id: u32,
    pub r_id: String,
}

/// The changes applied to `presentation.xml` when a deck is written.
#[derive(Debug, Clone, Default)]
pub struct PresentationEdit {
    /// New slide list, replacing every inherited entry
    pub slides: Vec<SlideEntry>,
    /// Notes master to list, replacing any existing entry
    pub notes_master_rid: Option<String>,
}

/// A byte range of the source replaced by `insert`. Pure insertions have an
/// empty range.
#[derive(Debug)]
struct Splice {
    start: usize,
    end: usize,
    insert: String,
}

/// Apply `edit` to the presentation part markup.
pub fn rewrite_presentation_xml(xml: &str, edit: &PresentationEdit) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut splices: Vec<Splice> = Vec::new();

    let mut depth = 0usize;
    let mut pml_prefix = String::new();
    let mut rel_prefix: Option<String> = None;
    // (depth, start) of an element being dropped
    let mut dropping: Option<(usize, usize)> = None;
    let mut slide_list_at: Option<usize> = None;
    let mut master_list_end: Option<usize> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                if !is_empty {
                    depth += 1;
                }
                let element_depth = if is_empty { depth + 1 } else { depth };

                if element_depth == 1 {
                    if let Some(prefix) = e.name().prefix() {
                        pml_prefix = format!("{}:", String::from_utf8_lossy(prefix.as_ref()));
                    }
                    rel_prefix = relationships_prefix(e)?;
                }
                if dropping.is_some() {
                    continue;
                }

                let local = e.local_name();
                let drop = match local.as_ref() {
                    b"sldIdLst" | b"custShowLst" => element_depth == 2,
                    b"notesMasterIdLst" => element_depth == 2 && edit.notes_master_rid.is_some(),
                    b"ext" => {
                        element_depth == 3
                            && attr_value(e, b"uri")?.as_deref() == Some(SECTION_LIST_EXT_URI)
                    },
                    b"sldMasterIdLst" if is_empty && element_depth == 2 => {
                        master_list_end = Some(end);
                        false
                    },
                    b"sldSz" | b"notesSz" if element_depth == 2 => {
                        slide_list_at.get_or_insert(start);
                        false
                    },
                    _ => false,
                };

                if drop {
                    if is_empty {
                        splices.push(Splice {
                            start,
                            end,
                            insert: String::new(),
                        });
                    } else {
                        dropping = Some((depth, start));
                    }
                }
            },
            Event::End(ref e) => {
                if let Some((drop_depth, drop_start)) = dropping
                    && drop_depth == depth
                {
                    splices.push(Splice {
                        start: drop_start,
                        end,
                        insert: String::new(),
                    });
                    dropping = None;
                } else if depth == 2 && e.local_name().as_ref() == b"sldMasterIdLst" {
                    master_list_end = Some(end);
                }
                depth = depth.saturating_sub(1);
            },
            Event::Eof => break,
            _ => {},
        }
    }

    let slide_list_at = slide_list_at.ok_or_else(|| {
        OoxmlError::InvalidFormat("presentation has neither sldSz nor notesSz".to_string())
    })?;

    let (r_prefix, r_decl) = match rel_prefix {
        Some(prefix) => (prefix, String::new()),
        None => (
            "r:".to_string(),
            format!(r#" xmlns:r="{}""#, namespace::OFC_RELATIONSHIPS),
        ),
    };

    if !edit.slides.is_empty() {
        let mut list = String::with_capacity(64 + edit.slides.len() * 48);
        write!(list, "<{}sldIdLst{}>", pml_prefix, r_decl)
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        for slide in &edit.slides {
            write!(
                list,
                r#"<{}sldId id="{}" {}id="{}"/>"#,
                pml_prefix,
                slide.id,
                r_prefix,
                escape_xml(&slide.r_id)
            )
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        }
        write!(list, "</{}sldIdLst>", pml_prefix).map_err(|e| OoxmlError::Xml(e.to_string()))?;
        splices.push(Splice {
            start: slide_list_at,
            end: slide_list_at,
            insert: list,
        });
    }

    if let Some(ref r_id) = edit.notes_master_rid {
        let at = master_list_end.ok_or_else(|| {
            OoxmlError::InvalidFormat("presentation has no sldMasterIdLst".to_string())
        })?;
        let mut list = String::with_capacity(160);
        write!(
            list,
            r#"<{p}notesMasterIdLst{decl}><{p}notesMasterId {r}id="{id}"/></{p}notesMasterIdLst>"#,
            p = pml_prefix,
            decl = r_decl,
            r = r_prefix,
            id = escape_xml(r_id)
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        splices.push(Splice {
            start: at,
            end: at,
            insert: list,
        });
    }

    splices.sort_by_key(|s| (s.start, s.end));

    let mut out = String::with_capacity(xml.len() + 1024);
    let mut cursor = 0usize;
    for splice in splices {
        if splice.start < cursor {
            continue;
        }
        out.push_str(&xml[cursor..splice.start]);
        out.push_str(&splice.insert);
        cursor = splice.end;
    }
    out.push_str(&xml[cursor..]);
    Ok(out)
}

/// Remove the outline view's slide list (`p:sldLst`) from view properties
/// markup. Its entries reference slides by rId.
pub fn strip_outline_slide_list(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut depth = 0usize;
    let mut dropping: Option<(usize, usize)> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) => {
                depth += 1;
                if dropping.is_none() && e.local_name().as_ref() == b"sldLst" {
                    dropping = Some((depth, start));
                }
            },
            Event::Empty(ref e) => {
                if dropping.is_none() && e.local_name().as_ref() == b"sldLst" {
                    ranges.push((start, end));
                }
            },
            Event::End(_) => {
                if let Some((drop_depth, drop_start)) = dropping
                    && drop_depth == depth
                {
                    ranges.push((drop_start, end));
                    dropping = None;
                }
                depth = depth.saturating_sub(1);
            },
            Event::Eof => break,
            _ => {},
        }
    }

    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0usize;
    for (start, end) in ranges {
        out.push_str(&xml[cursor..start]);
        cursor = end;
    }
    out.push_str(&xml[cursor..]);
    Ok(out)
}

/// Prefix (with colon) the root element binds to the relationships namespace.
fn relationships_prefix(root: &quick_xml::events::BytesStart) -> Result<Option<String>> {
    for attr in root.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if let Some(prefix) = key.strip_prefix(b"xmlns:")
            && attr.unescape_value()? == namespace::OFC_RELATIONSHIPS
        {
            return Ok(Some(format!("{}:", String::from_utf8_lossy(prefix))));
        }
    }
    Ok(None)
}
