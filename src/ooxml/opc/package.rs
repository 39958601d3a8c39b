//! In-memory OPC package.
//!
//! [`OpcPackage`] holds the package-level relationships and every part keyed by
//! partname. The presentation document mutates it (adding slides, media and
//! notes, dropping inherited slides) and hands it to the package writer.

use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::{Part, PartFactory};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::Relationships;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;

/// Upper bound when searching for a free tuple partname.
const MAX_PARTNAME_INDEX: u32 = 100_000;

/// An Open Packaging Convention package held in memory.
pub struct OpcPackage {
    rels: Relationships,
    parts: HashMap<PackURI, Box<dyn Part>>,
}

impl OpcPackage {
    /// Create a new empty package.
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI.to_string()),
            parts: HashMap::new(),
        }
    }

    /// Open a package file (.pptx, .potx, ...).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::unmarshal(PackageReader::from_phys_reader(PhysPkgReader::open(path)?)?)
    }

    /// Load a package from a seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::unmarshal(PackageReader::from_phys_reader(PhysPkgReader::from_reader(reader)?)?)
    }

    fn unmarshal(mut pkg_reader: PackageReader) -> Result<Self> {
        let mut package = Self::new();

        for srel in pkg_reader.pkg_srels() {
            package.rels.add_relationship(
                srel.reltype.clone(),
                srel.target_ref.clone(),
                srel.r_id.clone(),
                srel.is_external(),
            );
        }

        for spart in pkg_reader.take_sparts() {
            let mut part = PartFactory::load(spart.partname, spart.content_type, spart.blob)?;
            for srel in spart.srels {
                let is_external = srel.is_external();
                part.rels_mut().add_relationship(
                    srel.reltype,
                    srel.target_ref,
                    srel.r_id,
                    is_external,
                );
            }
            package.add_part(part);
        }

        Ok(package)
    }

    /// Partname of the main document (`/ppt/presentation.xml` for decks).
    pub fn main_partname(&self) -> Result<PackURI> {
        self.rels
            .part_with_reltype(relationship_type::OFFICE_DOCUMENT)?
            .target_partname()
    }

    /// The main document part.
    pub fn main_document_part(&self) -> Result<&dyn Part> {
        let partname = self.main_partname()?;
        self.get_part(&partname)
    }

    pub fn get_part(&self, partname: &PackURI) -> Result<&dyn Part> {
        self.parts
            .get(partname)
            .map(|b| &**b as &dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn get_part_mut(&mut self, partname: &PackURI) -> Result<&mut dyn Part> {
        self.parts
            .get_mut(partname)
            .map(|b| &mut **b as &mut dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Part reached from the package root through `reltype`.
    pub fn part_by_reltype(&self, reltype: &str) -> Result<&dyn Part> {
        let partname = self.rels.part_with_reltype(reltype)?.target_partname()?;
        self.get_part(&partname)
    }

    /// Add a part, replacing any part with the same partname.
    pub fn add_part(&mut self, part: Box<dyn Part>) {
        self.parts.insert(part.partname().clone(), part);
    }

    /// Remove a part. Relationships pointing at it are left to the caller.
    pub fn remove_part(&mut self, partname: &PackURI) -> Option<Box<dyn Part>> {
        self.parts.remove(partname)
    }

    /// All parts, ordered by partname.
    pub fn iter_parts(&self) -> impl Iterator<Item = &dyn Part> {
        let mut parts: Vec<&dyn Part> = self.parts.values().map(|b| &**b as &dyn Part).collect();
        parts.sort_by(|a, b| a.partname().cmp(b.partname()));
        parts.into_iter()
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Relate the package root to a part. Returns the rId.
    pub fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        self.rels.get_or_add(reltype, &target.relative_ref(PACKAGE_URI))
    }

    /// First free partname for a `%d` template, e.g. `/ppt/media/image%d.png`.
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        for n in 1..=MAX_PARTNAME_INDEX {
            let candidate = PackURI::new(template.replace("%d", &n.to_string()))?;
            if !self.parts.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
        Err(OpcError::PartnameExhausted(template.to_string()))
    }

    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.parts.contains_key(partname)
    }

    /// Drop every part no longer reachable from the package relationships.
    ///
    /// Returns the number of parts removed.
    pub fn prune_unreachable(&mut self) -> usize {
        let mut reachable: HashSet<PackURI> = HashSet::with_capacity(self.parts.len());
        let mut queue: Vec<PackURI> = self
            .rels
            .iter()
            .filter(|rel| !rel.is_external())
            .filter_map(|rel| rel.target_partname().ok())
            .collect();

        while let Some(partname) = queue.pop() {
            if !reachable.insert(partname.clone()) {
                continue;
            }
            if let Some(part) = self.parts.get(&partname) {
                queue.extend(
                    part.rels()
                        .iter()
                        .filter(|rel| !rel.is_external())
                        .filter_map(|rel| rel.target_partname().ok()),
                );
            }
        }

        let before = self.parts.len();
        self.parts.retain(|partname, _| reachable.contains(partname));
        before - self.parts.len()
    }

    /// Serialize the package to ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    /// Write the package to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PackageWriter::write(path, self)
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OpcPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpcPackage")
            .field("parts", &self.iter_parts().map(|p| p.partname().as_str()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
    use crate::ooxml::opc::part::{BlobPart, XmlPart};
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn minimal_pptx() -> Vec<u8> {
        let mut zip_data = Vec::new();
        {
            let mut writer = ZipWriter::new(Cursor::new(&mut zip_data));
            let options = SimpleFileOptions::default();

            writer.start_file("[Content_Types].xml", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#).unwrap();

            writer.start_file("_rels/.rels", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#).unwrap();

            writer.start_file("ppt/presentation.xml", options).unwrap();
            writer
                .write_all(br#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#)
                .unwrap();

            // Not referenced by any relationship
            writer.start_file("ppt/orphan.xml", options).unwrap();
            writer.write_all(b"<orphan/>").unwrap();

            writer.finish().unwrap();
        }
        zip_data
    }

    #[test]
    fn test_open_walks_relationship_graph() {
        let pkg = OpcPackage::from_reader(Cursor::new(minimal_pptx())).unwrap();
        assert_eq!(pkg.part_count(), 1);
        assert_eq!(pkg.main_document_part().unwrap().content_type(), ct::PML_PRESENTATION_MAIN);
    }

    #[test]
    fn test_next_partname() {
        let mut pkg = OpcPackage::new();
        let first = pkg.next_partname("/ppt/media/image%d.png").unwrap();
        assert_eq!(first.as_str(), "/ppt/media/image1.png");
        pkg.add_part(Box::new(BlobPart::new(first, ct::PNG, vec![1])));
        assert_eq!(
            pkg.next_partname("/ppt/media/image%d.png").unwrap().as_str(),
            "/ppt/media/image2.png"
        );
    }

    #[test]
    fn test_prune_unreachable() {
        let mut pkg = OpcPackage::new();
        let pres = PackURI::new("/ppt/presentation.xml").unwrap();
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        let image = PackURI::new("/ppt/media/image1.png").unwrap();

        let mut slide_part = XmlPart::new(slide.clone(), ct::PML_SLIDE, "<p:sld/>");
        slide_part.relate_to(&image, rt::IMAGE);
        pkg.add_part(Box::new(XmlPart::new(pres.clone(), ct::PML_PRESENTATION_MAIN, "<p/>")));
        pkg.add_part(Box::new(slide_part));
        pkg.add_part(Box::new(BlobPart::new(image.clone(), ct::PNG, vec![0])));
        pkg.relate_to(&pres, rt::OFFICE_DOCUMENT);

        // The slide is not related from the presentation, so it and its image go
        assert_eq!(pkg.prune_unreachable(), 2);
        assert!(pkg.contains_part(&pres));
        assert!(!pkg.contains_part(&image));
    }

    #[test]
    fn test_round_trip_through_writer() {
        let pkg = OpcPackage::from_reader(Cursor::new(minimal_pptx())).unwrap();
        let bytes = pkg.to_bytes().unwrap();
        let reopened = OpcPackage::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(reopened.part_count(), 1);
        assert_eq!(reopened.main_partname().unwrap().as_str(), "/ppt/presentation.xml");
    }

    #[test]
    fn test_debug_lists_partnames() {
        let mut pkg = OpcPackage::new();
        pkg.add_part(Box::new(BlobPart::new(
            PackURI::new("/ppt/media/image2.png").unwrap(),
            ct::PNG,
            vec![0],
        )));
        pkg.add_part(Box::new(BlobPart::new(
            PackURI::new("/ppt/media/image1.png").unwrap(),
            ct::PNG,
            vec![0],
        )));
        assert_eq!(
            format!("{:?}", pkg),
            r#"OpcPackage { parts: ["/ppt/media/image1.png", "/ppt/media/image2.png"] }"#
        );
    }
}
