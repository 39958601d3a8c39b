//! A presentation opened from a style source and extended with new slides.
//!
//! The style source's masters, layouts, theme and presentation-level
//! settings are carried into the output. Its own slides are not: when the
//! document is written, every inherited slide (with its notes and its
//! entries in the slide and custom-show lists) is dropped, the composed
//! slides are added, and parts nothing refers to any more are pruned.
//!
//! # Example
//!
//! ```rust,no_run
//! use lesson_deck::ooxml::pptx::Document;
//! use lesson_deck::ooxml::pptx::writer::{Geometry, Paragraph, TextBody};
//!
//! let mut doc = Document::blank()?;
//! let layout = doc.layouts().resolve_blank().unwrap_or(0);
//! let slide = doc.add_slide(layout)?;
//! let mut body = TextBody::new();
//! body.push(Paragraph::new("Hello"));
//! slide.add_text_box(Geometry::new(914400, 914400, 7315200, 914400), body);
//! doc.save("hello.pptx")?;
//! # Ok::<(), lesson_deck::ooxml::OoxmlError>(())
//! ```

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as CT, relationship_type as RT};
use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::{BlobPart, OpcPackage, PackURI, Part, XmlPart};
use crate::ooxml::pptx::layout::LayoutCatalog;
use crate::ooxml::pptx::props::{CoreProperties, app_xml};
use crate::ooxml::pptx::template;
use crate::ooxml::pptx::writer::pres::{
    Canvas, FIRST_SLIDE_ID, PresentationEdit, PresentationInfo, SlideEntry,
    rewrite_presentation_xml, strip_outline_slide_list,
};
use crate::ooxml::pptx::writer::relmap::RelationshipMapper;
use crate::ooxml::pptx::writer::shape::ShapeKind;
use crate::ooxml::pptx::writer::slide::Slide;
use std::collections::{HashMap, HashSet};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Document {
    package: OpcPackage,
    presentation: PackURI,
    info: PresentationInfo,
    layouts: LayoutCatalog,
    canvas: Canvas,
    slides: Vec<Slide>,
    title: Option<String>,
}

impl Document {
    /// A document on the built-in blank style.
    pub fn blank() -> Result<Self> {
        Self::from_package(template::blank_package()?)
    }

    /// Open a `.pptx` style source.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening style source");
        Self::from_package(OpcPackage::open(path)?)
    }

    pub fn from_package(package: OpcPackage) -> Result<Self> {
        let presentation = package.main_partname()?;
        let part = package.get_part(&presentation)?;
        if !CT::is_presentation_main(part.content_type()) {
            return Err(OpcError::NotAPresentation(part.content_type().to_string()).into());
        }

        let xml = std::str::from_utf8(part.blob()).map_err(|e| OoxmlError::Xml(e.to_string()))?;
        let info = PresentationInfo::parse(xml)?;
        let masters = info
            .master_rids
            .iter()
            .map(|r_id| part.related_partname(r_id))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let layouts = LayoutCatalog::load(&package, &masters)?;
        let canvas = info.canvas.unwrap_or_default();

        debug!(
            layouts = layouts.len(),
            inherited_slides = info.slide_rids.len(),
            width = canvas.width,
            height = canvas.height,
            "loaded presentation"
        );

        Ok(Self {
            package,
            presentation,
            info,
            layouts,
            canvas,
            slides: Vec::new(),
            title: None,
        })
    }

    /// Slide size. Fixed by the style source.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn layouts(&self) -> &LayoutCatalog {
        &self.layouts
    }

    /// Number of slides the style source itself contains.
    pub fn inherited_slide_count(&self) -> usize {
        self.info.slide_rids.len()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Append a slide created from layout `layout_index`. The layout's
    /// cloneable placeholders are copied onto it.
    pub fn add_slide(&mut self, layout_index: usize) -> Result<&mut Slide> {
        let layout = self.layouts.get(layout_index).ok_or_else(|| {
            OoxmlError::InvalidFormat(format!(
                "layout index {} out of range ({} layouts)",
                layout_index,
                self.layouts.len()
            ))
        })?;

        let mut slide = Slide::new(layout_index);
        slide.clone_placeholders(layout.placeholders());

        let index = self.slides.len();
        self.slides.push(slide);
        Ok(&mut self.slides[index])
    }

    /// Title recorded in the core properties.
    pub fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    /// Serialize to `.pptx` bytes.
    pub fn to_bytes(self) -> Result<Vec<u8>> {
        Ok(self.into_package()?.to_bytes()?)
    }

    /// Write the `.pptx` to `path`.
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<()> {
        let package = self.into_package()?;
        package.save(path)?;
        Ok(())
    }

    /// Assemble the final package.
    pub fn into_package(mut self) -> Result<OpcPackage> {
        self.drop_inherited_slides()?;

        let notes_master = if self.slides.iter().any(Slide::has_notes) {
            Some(self.ensure_notes_master()?)
        } else {
            None
        };
        let added_notes_master_rid = notes_master
            .as_ref()
            .and_then(|(_, r_id, added)| added.then(|| r_id.clone()));

        let mut mapper = RelationshipMapper::new();
        let mut media = MediaParts::default();
        let mut entries = Vec::with_capacity(self.slides.len());
        let mut notes_count = 0usize;
        let mut media_count = 0usize;

        for (index, slide) in self.slides.iter().enumerate() {
            let slide_name = self.package.next_partname("/ppt/slides/slide%d.xml")?;
            self.package
                .add_part(Box::new(XmlPart::new(slide_name.clone(), CT::PML_SLIDE, Vec::new())));

            let layout = self
                .layouts
                .get(slide.layout_index())
                .ok_or_else(|| OoxmlError::PartNotFound(format!("layout {}", slide.layout_index())))?
                .partname()
                .clone();
            relate(&mut self.package, &slide_name, &layout, RT::SLIDE_LAYOUT)?;

            for shape in slide.shapes() {
                match shape.kind() {
                    ShapeKind::Picture(picture) => {
                        let image = media.intern(
                            &mut self.package,
                            &format!("/ppt/media/image%d.{}", picture.format.extension()),
                            picture.format.mime_type(),
                            &picture.data,
                        )?;
                        let r_id = relate(&mut self.package, &slide_name, &image, RT::IMAGE)?;
                        mapper.add_image(index, shape.id(), r_id);
                    },
                    ShapeKind::Media(clip) => {
                        let audio = media.intern(
                            &mut self.package,
                            &format!("/ppt/media/media%d.{}", clip.audio.format.extension()),
                            clip.audio.format.mime_type(),
                            &clip.audio.data,
                        )?;
                        let poster = media.intern(
                            &mut self.package,
                            "/ppt/media/image%d.png",
                            CT::PNG,
                            &clip.poster,
                        )?;
                        let audio_link = relate(&mut self.package, &slide_name, &audio, RT::AUDIO)?;
                        let media_embed = relate(&mut self.package, &slide_name, &audio, RT::MEDIA)?;
                        let poster_rid = relate(&mut self.package, &slide_name, &poster, RT::IMAGE)?;
                        mapper.add_media(index, shape.id(), audio_link, media_embed, poster_rid);
                        media_count += 1;
                    },
                    ShapeKind::TextBox(_) | ShapeKind::Inherited(_) => {},
                }
            }

            if let Some(notes_xml) = slide.notes_xml() {
                let notes_xml = notes_xml?;
                let notes_name = self.package.next_partname("/ppt/notesSlides/notesSlide%d.xml")?;
                self.package.add_part(Box::new(XmlPart::new(
                    notes_name.clone(),
                    CT::PML_NOTES_SLIDE,
                    notes_xml,
                )));
                if let Some((ref notes_master, _, _)) = notes_master {
                    relate(&mut self.package, &notes_name, notes_master, RT::NOTES_MASTER)?;
                }
                relate(&mut self.package, &notes_name, &slide_name, RT::SLIDE)?;
                let r_id = relate(&mut self.package, &slide_name, &notes_name, RT::NOTES_SLIDE)?;
                mapper.add_notes(index, r_id);
                notes_count += 1;
            }

            let xml = slide.to_xml(index, &mapper)?;
            self.package
                .get_part_mut(&slide_name)?
                .set_blob(xml.into_bytes());

            let r_id = relate(&mut self.package, &self.presentation, &slide_name, RT::SLIDE)?;
            entries.push(SlideEntry {
                id: FIRST_SLIDE_ID + index as u32,
                r_id,
            });
        }

        let edit = PresentationEdit {
            slides: entries,
            notes_master_rid: added_notes_master_rid,
        };
        let presentation = self.package.get_part_mut(&self.presentation)?;
        let xml = std::str::from_utf8(presentation.blob())
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        let rewritten = rewrite_presentation_xml(xml, &edit)?;
        presentation.set_blob(rewritten.into_bytes());

        let core_xml = CoreProperties::now(self.title.as_deref().unwrap_or_default()).to_xml();
        let app_xml = app_xml(self.slides.len(), notes_count, media_count);
        self.set_doc_prop(
            "/docProps/core.xml",
            CT::OPC_CORE_PROPERTIES,
            RT::CORE_PROPERTIES,
            core_xml,
        )?;
        self.set_doc_prop(
            "/docProps/app.xml",
            CT::OFC_EXTENDED_PROPERTIES,
            RT::EXTENDED_PROPERTIES,
            app_xml,
        )?;

        let pruned = self.package.prune_unreachable();
        info!(
            slides = self.slides.len(),
            notes = notes_count,
            media = media_count,
            pruned,
            "assembled presentation package"
        );
        Ok(self.package)
    }

    /// Remove the style source's slides from the presentation part and drop
    /// the parts only they used. Slide relationships held by other parts
    /// (the outline view in `viewProps.xml`) would keep them reachable, so
    /// those go first.
    fn drop_inherited_slides(&mut self) -> Result<()> {
        if self.info.slide_rids.is_empty() {
            return Ok(());
        }
        let presentation = self.package.get_part_mut(&self.presentation)?;
        let mut inherited = HashSet::with_capacity(self.info.slide_rids.len());
        for r_id in &self.info.slide_rids {
            if let Ok(partname) = presentation.related_partname(r_id) {
                inherited.insert(partname);
            }
            presentation.rels_mut().remove(r_id);
        }

        let mut holders: Vec<(PackURI, Vec<String>)> = Vec::new();
        for part in self.package.iter_parts() {
            if inherited.contains(part.partname()) {
                continue;
            }
            let r_ids: Vec<String> = part
                .rels()
                .with_reltype(RT::SLIDE)
                .filter(|rel| {
                    rel.target_partname()
                        .is_ok_and(|target| inherited.contains(&target))
                })
                .map(|rel| rel.r_id().to_string())
                .collect();
            if !r_ids.is_empty() {
                holders.push((part.partname().clone(), r_ids));
            }
        }
        for (partname, r_ids) in &holders {
            let part = self.package.get_part_mut(partname)?;
            for r_id in r_ids {
                part.rels_mut().remove(r_id);
            }
            if part.content_type() == CT::PML_VIEW_PROPS {
                let xml = strip_outline_slide_list(&String::from_utf8_lossy(part.blob()))?;
                part.set_blob(xml.into_bytes());
            }
        }

        let pruned = self.package.prune_unreachable();
        debug!(
            slides = self.info.slide_rids.len(),
            unlinked = holders.len(),
            pruned,
            "dropped inherited slides"
        );
        Ok(())
    }

    /// The notes master partname and its rId, adding the stock one when the
    /// style source has none. The flag tells whether it was added.
    fn ensure_notes_master(&mut self) -> Result<(PackURI, String, bool)> {
        let presentation = self.package.get_part(&self.presentation)?;
        if let Some(ref r_id) = self.info.notes_master_rid
            && let Ok(partname) = presentation.related_partname(r_id)
            && self.package.contains_part(&partname)
        {
            return Ok((partname, r_id.clone(), false));
        }

        let r_id = template::add_default_notes_master(&mut self.package, &self.presentation)?;
        let partname = self
            .package
            .get_part(&self.presentation)?
            .related_partname(&r_id)?;
        debug!(notes_master = %partname, "added default notes master");
        Ok((partname, r_id, true))
    }

    /// Replace or create a document properties part.
    fn set_doc_prop(&mut self, default_name: &str, content_type: &str, reltype: &str, xml: String) -> Result<()> {
        let existing = self
            .package
            .rels()
            .part_with_reltype(reltype)
            .ok()
            .and_then(|rel| rel.target_partname().ok())
            .filter(|partname| self.package.contains_part(partname));

        match existing {
            Some(partname) => self.package.get_part_mut(&partname)?.set_blob(xml.into_bytes()),
            None => {
                let partname = PackURI::new(default_name)?;
                self.package
                    .add_part(Box::new(XmlPart::new(partname.clone(), content_type, xml)));
                self.package.relate_to(&partname, reltype);
            },
        }
        Ok(())
    }
}

fn relate(package: &mut OpcPackage, source: &PackURI, target: &PackURI, reltype: &str) -> Result<String> {
    Ok(package.get_part_mut(source)?.relate_to(target, reltype))
}

/// Media parts added during assembly, deduplicated by content.
#[derive(Debug, Default)]
struct MediaParts {
    by_digest: HashMap<u64, Vec<PackURI>>,
}

impl MediaParts {
    /// Partname holding `data`, adding a part from `template` if no
    /// identical blob was added yet.
    fn intern(
        &mut self,
        package: &mut OpcPackage,
        template: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<PackURI> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let digest = hasher.finish();

        if let Some(candidates) = self.by_digest.get(&digest) {
            for partname in candidates {
                if let Ok(part) = package.get_part(partname)
                    && part.blob() == data
                    && part.content_type() == content_type
                {
                    return Ok(partname.clone());
                }
            }
        }

        let partname = package.next_partname(template)?;
        package.add_part(Box::new(BlobPart::new(
            partname.clone(),
            content_type,
            data.to_vec(),
        )));
        self.by_digest.entry(digest).or_default().push(partname.clone());
        Ok(partname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::format::ImageFormat;
    use crate::ooxml::pptx::media::{AudioClip, AudioFormat};
    use crate::ooxml::pptx::timing::TimingGraph;
    use crate::ooxml::pptx::writer::shape::{Geometry, MediaClip, Paragraph, Picture, TextBody};

    fn reopen(bytes: Vec<u8>) -> OpcPackage {
        OpcPackage::from_reader(std::io::Cursor::new(bytes)).unwrap()
    }

    fn part_xml(package: &OpcPackage, partname: &str) -> String {
        let part = package.get_part(&PackURI::new(partname).unwrap()).unwrap();
        String::from_utf8(part.blob().to_vec()).unwrap()
    }

    #[test]
    fn test_blank_document() {
        let doc = Document::blank().unwrap();
        assert_eq!(doc.canvas(), Canvas::DEFAULT);
        assert_eq!(doc.layouts().len(), 7);
        assert_eq!(doc.inherited_slide_count(), 0);
        assert_eq!(doc.slide_count(), 0);
    }

    #[test]
    fn test_add_slide_clones_placeholders() {
        let mut doc = Document::blank().unwrap();
        let slide = doc.add_slide(0).unwrap();
        // Title Slide: title and subtitle; date, footer and number stay behind
        assert_eq!(slide.shape_count(), 2);
        assert!(slide.shapes().iter().all(|s| s.is_placeholder()));
        assert!(doc.add_slide(7).is_err());
    }

    #[test]
    fn test_round_trip_with_media_and_notes() {
        let mut doc = Document::blank().unwrap();
        doc.set_title("Cells");
        let png = crate::ooxml::pptx::media::speaker_poster_png().unwrap();

        let slide = doc.add_slide(6).unwrap();
        let mut body = TextBody::new();
        body.push(Paragraph::new("Cells"));
        slide.add_text_box(Geometry::new(0, 0, 914400, 914400), body);
        slide.add_picture(
            Geometry::new(0, 0, 914400, 914400),
            Picture {
                data: png.clone(),
                format: ImageFormat::Png,
                description: "bg".to_string(),
            },
        );
        let media = slide.add_media(
            Geometry::new(-548640, -548640, 365760, 365760),
            MediaClip {
                audio: AudioClip {
                    data: b"ID3fake".to_vec(),
                    format: AudioFormat::Mp3,
                },
                poster: png.clone(),
            },
        );
        slide.set_timing(TimingGraph::auto_play(media)).unwrap();
        slide.set_notes("Say hello");

        let package = reopen(doc.to_bytes().unwrap());

        let presentation = part_xml(&package, "/ppt/presentation.xml");
        assert!(presentation.contains(r#"<p:sldId id="256" "#));
        assert!(presentation.contains("<p:notesMasterIdLst>"));

        let slide_xml = part_xml(&package, "/ppt/slides/slide1.xml");
        assert!(slide_xml.contains("<a:audioFile r:link="));
        assert!(slide_xml.contains("<p:timing>"));

        // The picture and the poster share one deduplicated image part
        assert!(package.contains_part(&PackURI::new("/ppt/media/image1.png").unwrap()));
        assert!(!package.contains_part(&PackURI::new("/ppt/media/image2.png").unwrap()));
        assert!(package.contains_part(&PackURI::new("/ppt/media/media1.mp3").unwrap()));
        assert!(package.contains_part(&PackURI::new("/ppt/notesSlides/notesSlide1.xml").unwrap()));

        let core = part_xml(&package, "/docProps/core.xml");
        assert!(core.contains("<dc:title>Cells</dc:title>"));
    }

    #[test]
    fn test_inherited_slides_are_dropped() {
        let mut doc = Document::blank().unwrap();
        doc.add_slide(1).unwrap().set_notes("old notes");
        doc.add_slide(6).unwrap();
        let source = reopen(doc.to_bytes().unwrap());

        let mut doc = Document::from_package(source).unwrap();
        assert_eq!(doc.inherited_slide_count(), 2);
        doc.add_slide(6).unwrap();
        let package = reopen(doc.to_bytes().unwrap());

        let presentation = part_xml(&package, "/ppt/presentation.xml");
        let info = PresentationInfo::parse(&presentation).unwrap();
        assert_eq!(info.slide_rids.len(), 1);
        assert!(package.contains_part(&PackURI::new("/ppt/slides/slide1.xml").unwrap()));
        assert!(!package.contains_part(&PackURI::new("/ppt/slides/slide2.xml").unwrap()));
        assert!(!package.contains_part(&PackURI::new("/ppt/notesSlides/notesSlide1.xml").unwrap()));
    }

    #[test]
    fn test_outline_view_does_not_keep_inherited_slides() {
        let mut doc = Document::blank().unwrap();
        doc.add_slide(1).unwrap();
        doc.add_slide(6).unwrap();
        let mut source = reopen(doc.to_bytes().unwrap());

        // Point the outline view at both old slides, as PowerPoint does
        let view_props = PackURI::new("/ppt/viewProps.xml").unwrap();
        let part = source.get_part_mut(&view_props).unwrap();
        let first = part.relate_to(&PackURI::new("/ppt/slides/slide1.xml").unwrap(), RT::SLIDE);
        let second = part.relate_to(&PackURI::new("/ppt/slides/slide2.xml").unwrap(), RT::SLIDE);
        let xml = String::from_utf8(part.blob().to_vec()).unwrap().replace(
            "</p:viewPr>",
            &format!(
                r#"<p:outlineViewPr><p:cViewPr><p:origin x="0" y="0"/></p:cViewPr><p:sldLst><p:sld r:id="{}"/><p:sld r:id="{}"/></p:sldLst></p:outlineViewPr></p:viewPr>"#,
                first, second
            ),
        );
        part.set_blob(xml.into_bytes());

        let mut doc = Document::from_package(source).unwrap();
        doc.add_slide(6).unwrap();
        let package = reopen(doc.to_bytes().unwrap());

        assert!(package.contains_part(&PackURI::new("/ppt/slides/slide1.xml").unwrap()));
        assert!(!package.contains_part(&PackURI::new("/ppt/slides/slide2.xml").unwrap()));
        let view = package.get_part(&view_props).unwrap();
        assert_eq!(view.rels().with_reltype(RT::SLIDE).count(), 0);
        assert!(!part_xml(&package, "/ppt/viewProps.xml").contains("sldLst"));
    }
}
