//! Built-in blank presentation.
//!
//! Used when no style template is requested or the requested one is
//! missing: a 16:9 deck with one master, the seven stock layouts (Blank at
//! index 6), a theme, and no slides. Also supplies the notes master added to
//! style sources that have none.

use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::{content_type as CT, relationship_type as RT};
use crate::ooxml::opc::{OpcPackage, PackURI, Part, XmlPart};

const PRESENTATION_XML: &str = include_str!("../../../resources/pptx/presentation.xml");
const SLIDE_MASTER_XML: &str = include_str!("../../../resources/pptx/slideMaster1.xml");
const THEME_XML: &str = include_str!("../../../resources/pptx/theme1.xml");
const NOTES_MASTER_XML: &str = include_str!("../../../resources/pptx/notesMaster1.xml");
const PRES_PROPS_XML: &str = include_str!("../../../resources/pptx/presProps.xml");
const VIEW_PROPS_XML: &str = include_str!("../../../resources/pptx/viewProps.xml");
const TABLE_STYLES_XML: &str = include_str!("../../../resources/pptx/tableStyles.xml");

/// Stock layouts in master order: Title Slide, Title and Content, Section
/// Header, Two Content, Comparison, Title Only, Blank.
const SLIDE_LAYOUTS: [&str; 7] = [
    include_str!("../../../resources/pptx/slideLayout1.xml"),
    include_str!("../../../resources/pptx/slideLayout2.xml"),
    include_str!("../../../resources/pptx/slideLayout3.xml"),
    include_str!("../../../resources/pptx/slideLayout4.xml"),
    include_str!("../../../resources/pptx/slideLayout5.xml"),
    include_str!("../../../resources/pptx/slideLayout6.xml"),
    include_str!("../../../resources/pptx/slideLayout7.xml"),
];

fn add_xml_part(
    package: &mut OpcPackage,
    partname: PackURI,
    content_type: &str,
    xml: &str,
) -> PackURI {
    package.add_part(Box::new(XmlPart::new(partname.clone(), content_type, xml)));
    partname
}

fn relate(package: &mut OpcPackage, source: &PackURI, target: &PackURI, reltype: &str) -> Result<String> {
    Ok(package.get_part_mut(source)?.relate_to(target, reltype))
}

/// Build the blank presentation package.
pub fn blank_package() -> Result<OpcPackage> {
    let mut package = OpcPackage::new();

    let presentation = add_xml_part(
        &mut package,
        PackURI::new("/ppt/presentation.xml")?,
        CT::PML_PRESENTATION_MAIN,
        PRESENTATION_XML,
    );
    package.relate_to(&presentation, RT::OFFICE_DOCUMENT);

    let master = add_xml_part(
        &mut package,
        PackURI::new("/ppt/slideMasters/slideMaster1.xml")?,
        CT::PML_SLIDE_MASTER,
        SLIDE_MASTER_XML,
    );
    // rId1 here matches the master's entry in presentation.xml
    relate(&mut package, &presentation, &master, RT::SLIDE_MASTER)?;

    // The master's rIds must come out as rId1..rId7, in layout order
    for (n, xml) in SLIDE_LAYOUTS.iter().enumerate() {
        let layout = add_xml_part(
            &mut package,
            PackURI::new(format!("/ppt/slideLayouts/slideLayout{}.xml", n + 1))?,
            CT::PML_SLIDE_LAYOUT,
            xml,
        );
        relate(&mut package, &master, &layout, RT::SLIDE_LAYOUT)?;
        relate(&mut package, &layout, &master, RT::SLIDE_MASTER)?;
    }

    let theme = add_xml_part(
        &mut package,
        PackURI::new("/ppt/theme/theme1.xml")?,
        CT::OFC_THEME,
        THEME_XML,
    );
    relate(&mut package, &master, &theme, RT::THEME)?;

    for (partname, content_type, reltype, xml) in [
        ("/ppt/presProps.xml", CT::PML_PRES_PROPS, RT::PRES_PROPS, PRES_PROPS_XML),
        ("/ppt/viewProps.xml", CT::PML_VIEW_PROPS, RT::VIEW_PROPS, VIEW_PROPS_XML),
        ("/ppt/tableStyles.xml", CT::PML_TABLE_STYLES, RT::TABLE_STYLES, TABLE_STYLES_XML),
    ] {
        let part = add_xml_part(&mut package, PackURI::new(partname)?, content_type, xml);
        relate(&mut package, &presentation, &part, reltype)?;
    }
    relate(&mut package, &presentation, &theme, RT::THEME)?;

    Ok(package)
}

/// Add the stock notes master, with its own theme, and relate it from the
/// presentation part. Returns the presentation's rId for it.
pub fn add_default_notes_master(package: &mut OpcPackage, presentation: &PackURI) -> Result<String> {
    let notes_master = package.next_partname("/ppt/notesMasters/notesMaster%d.xml")?;
    let notes_master = add_xml_part(package, notes_master, CT::PML_NOTES_MASTER, NOTES_MASTER_XML);

    let theme = package.next_partname("/ppt/theme/theme%d.xml")?;
    let theme = add_xml_part(package, theme, CT::OFC_THEME, THEME_XML);
    relate(package, &notes_master, &theme, RT::THEME)?;

    relate(package, presentation, &notes_master, RT::NOTES_MASTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::layout::LayoutCatalog;
    use crate::ooxml::pptx::writer::PresentationInfo;

    #[test]
    fn test_blank_package_structure() {
        let package = blank_package().unwrap();
        let presentation = package.main_partname().unwrap();
        assert_eq!(presentation.as_str(), "/ppt/presentation.xml");

        let part = package.get_part(&presentation).unwrap();
        let info = PresentationInfo::parse(std::str::from_utf8(part.blob()).unwrap()).unwrap();
        assert!(info.slide_rids.is_empty());
        assert_eq!(info.master_rids, vec!["rId1"]);
        assert_eq!(
            part.related_partname("rId1").unwrap().as_str(),
            "/ppt/slideMasters/slideMaster1.xml"
        );
    }

    #[test]
    fn test_blank_layouts() {
        let package = blank_package().unwrap();
        let master = PackURI::new("/ppt/slideMasters/slideMaster1.xml").unwrap();
        let catalog = LayoutCatalog::load(&package, &[master]).unwrap();

        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.get(0).unwrap().name(), "Title Slide");
        assert_eq!(catalog.get(6).unwrap().name(), "Blank");
        assert_eq!(catalog.get(6).unwrap().placeholder_count(), 0);
        assert_eq!(catalog.resolve_blank(), Some(6));
    }

    #[test]
    fn test_add_notes_master() {
        let mut package = blank_package().unwrap();
        let presentation = package.main_partname().unwrap();
        let r_id = add_default_notes_master(&mut package, &presentation).unwrap();

        let part = package.get_part(&presentation).unwrap();
        let notes_master = part.related_partname(&r_id).unwrap();
        assert_eq!(notes_master.as_str(), "/ppt/notesMasters/notesMaster1.xml");
        let theme = package
            .get_part(&notes_master)
            .unwrap()
            .rels()
            .part_with_reltype(RT::THEME)
            .unwrap()
            .target_partname()
            .unwrap();
        assert_eq!(theme.as_str(), "/ppt/theme/theme2.xml");
    }
}
