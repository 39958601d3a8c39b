//! Generates decks through the public API, writes them to disk and reads the
//! packages back through the OPC reader.

use lesson_deck::composer::{
    Bullet, Diagnostics, GenerateRequest, Level, PresentationGenerator, SlideContentRecord, SlideType,
};
use lesson_deck::config::GeneratorConfig;
use lesson_deck::ooxml::opc::constants::relationship_type as RT;
use lesson_deck::ooxml::opc::{OpcPackage, PackURI, Part};
use lesson_deck::ooxml::pptx::writer::PresentationInfo;
use lesson_deck::ooxml::pptx::{Document, ShapeKind};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn generator(dir: &TempDir) -> PresentationGenerator {
    PresentationGenerator::new(GeneratorConfig {
        templates_dir: dir.path().join("templates"),
        output_dir: dir.path().join("out"),
        ..GeneratorConfig::default()
    })
}

fn request(slides: Vec<SlideContentRecord>) -> GenerateRequest {
    GenerateRequest {
        template_path: Some("blank".to_string()),
        lesson_title: "Plant Cells".to_string(),
        slides,
        ..GenerateRequest::default()
    }
}

/// Slide XML in presentation order.
fn slide_xml(path: &Path) -> Vec<String> {
    let package = OpcPackage::open(path).unwrap();
    let presentation = package.main_document_part().unwrap();
    let info = PresentationInfo::parse(std::str::from_utf8(presentation.blob()).unwrap()).unwrap();
    info.slide_rids
        .iter()
        .map(|r_id| {
            let partname = presentation.related_partname(r_id).unwrap();
            let part = package.get_part(&partname).unwrap();
            String::from_utf8(part.blob().to_vec()).unwrap()
        })
        .collect()
}

fn write_audio(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("narration.mp3");
    std::fs::write(&path, b"ID3\x04\x00\x00\x00\x00\x00\x00narration").unwrap();
    path
}

fn write_png(dir: &TempDir, name: &str) -> PathBuf {
    let img = image::RgbImage::from_pixel(64, 36, image::Rgb([12, 34, 56]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, out.into_inner()).unwrap();
    path
}

#[test]
fn title_slide_with_subtitle() {
    let dir = TempDir::new().unwrap();
    let mut record = SlideContentRecord::new(SlideType::Title, "Lesson 1");
    record.content = vec!["Intro course".to_string()];
    let request = request(vec![record]);

    let mut diagnostics = Diagnostics::new();
    let doc = generator(&dir).compose(&request, &mut diagnostics).unwrap();
    let texts: Vec<String> = doc.slide(0).unwrap().shapes().iter().map(|s| s.text_body().unwrap().text()).collect();
    assert_eq!(texts, vec!["Lesson 1", "Intro course"]);

    let deck = generator(&dir).generate(&request).unwrap();
    assert_eq!(deck.slide_count, 1);
    let slides = slide_xml(&deck.path);
    assert_eq!(slides.len(), 1);
    assert!(slides[0].contains("<a:t>Lesson 1</a:t>"));
    assert!(slides[0].contains("<a:t>Intro course</a:t>"));
    assert_eq!(slides[0].matches("<p:sp>").count(), 2);
    assert!(!slides[0].contains("<p:ph"));
}

#[test]
fn agenda_splits_into_columns() {
    let dir = TempDir::new().unwrap();
    let mut record = SlideContentRecord::new(SlideType::Agenda, "Today");
    record.slide_index = Some(1);
    record.content = ["Cell wall", "Membrane", "Nucleus", "Chloroplast", "Vacuole"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let request = request(vec![record]);

    let mut diagnostics = Diagnostics::new();
    let doc = generator(&dir).compose(&request, &mut diagnostics).unwrap();
    let counts: Vec<usize> = doc
        .slide(0)
        .unwrap()
        .shapes()
        .iter()
        .map(|s| s.text_body().unwrap().paragraphs.len())
        .collect();
    assert_eq!(counts, vec![1, 3, 2]);

    let deck = generator(&dir).generate(&request).unwrap();
    let slides = slide_xml(&deck.path);
    assert_eq!(slides[0].matches("<a:p>").count(), 6);
}

#[test]
fn content_bullets_and_definition() {
    let dir = TempDir::new().unwrap();
    let mut record = SlideContentRecord::new(SlideType::Content, "Organelles");
    record.bullets = Some(vec![Bullet::new("", "A", "d1"), Bullet::new("", "", "d2")]);
    let request = request(vec![
        SlideContentRecord::new(SlideType::Title, "Plant Cells"),
        SlideContentRecord::new(SlideType::Objectives, "Goals"),
        record,
    ]);

    let mut diagnostics = Diagnostics::new();
    let doc = generator(&dir).compose(&request, &mut diagnostics).unwrap();
    let body = doc.slide(2).unwrap().shapes()[1].text_body().unwrap();
    assert_eq!(body.paragraphs.len(), 3);
    assert_eq!(body.paragraphs[0].text, "A");
    assert!(body.paragraphs[0].format.bold);
    assert_eq!(body.paragraphs[1].text, "d1");
    assert_eq!(body.paragraphs[1].level, 1);
    assert_eq!(body.paragraphs[2].text, "d2");
    assert_eq!(body.paragraphs[2].format.size, Some(20.0));

    let deck = generator(&dir).generate(&request).unwrap();
    let slides = slide_xml(&deck.path);
    assert_eq!(slides.len(), 3);
    assert!(slides[2].contains(r#"lvl="1""#));
    assert!(slides[2].contains(r#"sz="2000""#));
    assert!(slides[2].contains(r#"b="1""#));
}

#[test]
fn narration_auto_plays() {
    let dir = TempDir::new().unwrap();
    let mut record = SlideContentRecord::new(SlideType::Content, "Listen");
    record.slide_index = Some(2);
    record.content = vec!["Photosynthesis".to_string()];
    record.audio_path = Some(write_audio(&dir).to_string_lossy().into_owned());
    record.speaker_note = Some("Read slowly".to_string());
    let request = request(vec![record]);

    let mut diagnostics = Diagnostics::new();
    let doc = generator(&dir).compose(&request, &mut diagnostics).unwrap();
    let slide = doc.slide(0).unwrap();
    let media: Vec<_> = slide
        .shapes()
        .iter()
        .filter(|s| matches!(s.kind(), ShapeKind::Media(_)))
        .collect();
    assert_eq!(media.len(), 1);
    assert!(media[0].geometry().x < 0 && media[0].geometry().y < 0);
    assert_eq!(slide.timing().unwrap().target_shape_ids(), vec![media[0].id()]);
    let media_id = media[0].id();

    let deck = generator(&dir).generate(&request).unwrap();
    let slides = slide_xml(&deck.path);
    assert_eq!(slides[0].matches("<p:timing>").count(), 1);
    assert!(slides[0].contains(&format!(r#"<p:spTgt spid="{}"/>"#, media_id)));
    assert!(slides[0].contains(r#"cmd="playFrom(0.0)""#));
    assert!(slides[0].find("<p:clrMapOvr>").unwrap() < slides[0].find("<p:timing>").unwrap());

    let package = OpcPackage::open(&deck.path).unwrap();
    assert!(package.contains_part(&PackURI::new("/ppt/media/media1.mp3").unwrap()));
    assert!(package.contains_part(&PackURI::new("/ppt/notesSlides/notesSlide1.xml").unwrap()));
    assert!(package.contains_part(&PackURI::new("/ppt/notesMasters/notesMaster1.xml").unwrap()));
}

#[test]
fn unusable_inputs_degrade() {
    let dir = TempDir::new().unwrap();
    let ogg = dir.path().join("voice.ogg");
    std::fs::write(&ogg, b"OggS").unwrap();

    let mut record = SlideContentRecord::new(SlideType::Content, "Degraded");
    record.slide_index = Some(2);
    record.content = vec!["Still here".to_string()];
    record.image_path = Some(dir.path().join("missing.png").to_string_lossy().into_owned());
    record.audio_path = Some(ogg.to_string_lossy().into_owned());
    let mut request = request(vec![record]);
    request.template_path = Some(dir.path().join("gone.pptx").to_string_lossy().into_owned());

    let deck = generator(&dir).generate(&request).unwrap();
    assert_eq!(deck.slide_count, 1);
    // missing template and unsupported audio warn, missing image is informational
    assert_eq!(deck.warnings().count(), 2);
    assert_eq!(deck.diagnostics.iter().filter(|d| d.level == Level::Info).count(), 1);
    assert!(!slide_xml(&deck.path)[0].contains("<p:timing>"));
}

#[test]
fn style_source_slides_are_replaced() {
    let dir = TempDir::new().unwrap();
    let title_bg = write_png(&dir, "title-bg.png");
    let content_bg = write_png(&dir, "content-bg.png");

    // A style source with three slides of its own, one of them with notes
    let mut with_notes = SlideContentRecord::new(SlideType::Content, "Old");
    with_notes.speaker_note = Some("old notes".to_string());
    let source = generator(&dir)
        .generate(&request(vec![
            SlideContentRecord::new(SlideType::Title, "Old deck"),
            SlideContentRecord::new(SlideType::Agenda, "Old agenda"),
            with_notes,
        ]))
        .unwrap();
    assert_eq!(Document::open(&source.path).unwrap().inherited_slide_count(), 3);

    let mut content = SlideContentRecord::new(SlideType::Content, "New content");
    content.slide_index = Some(2);
    let mut request = request(vec![SlideContentRecord::new(SlideType::Title, "New deck"), content]);
    request.template_path = Some(source.path.to_string_lossy().into_owned());
    request.title_bg_path = Some(title_bg.to_string_lossy().into_owned());
    request.content_bg_path = Some(content_bg.to_string_lossy().into_owned());

    let deck = generator(&dir).generate(&request).unwrap();
    assert!(deck.diagnostics.is_empty());
    assert_eq!(deck.slide_count, 2);

    let slides = slide_xml(&deck.path);
    assert_eq!(slides.len(), 2);
    assert!(slides.iter().all(|xml| !xml.contains("Old")));
    assert!(slides[0].contains("New deck"));
    // the background is the first shape in the tree
    assert!(slides[0].find("<p:pic>").unwrap() < slides[0].find("<p:sp>").unwrap());

    let package = OpcPackage::open(&deck.path).unwrap();
    let notes_slides = package
        .iter_parts()
        .filter(|part| part.partname().as_str().starts_with("/ppt/notesSlides/"))
        .count();
    assert_eq!(notes_slides, 0);
    let presentation = package.main_document_part().unwrap();
    assert_eq!(presentation.rels().with_reltype(RT::SLIDE).count(), 2);
}

#[test]
fn request_json_round_trips_through_generator() {
    let dir = TempDir::new().unwrap();
    let json = r#"{
        "templatePath": "",
        "lessonTitle": "Water Cycle",
        "slides": [
            {"slideIndex": 0, "slideType": "title", "title": "Water Cycle", "content": ["Grade 4"]},
            {"slideIndex": 1, "slideType": "overview", "title": "Plan",
             "bullets": [{"emoji": "☁️", "point": "Clouds"}, {"emoji": "🌧️", "description": "Rain"}]},
            {"slideIndex": 2, "title": "Evaporation", "content": ["Heat", "Vapour"]}
        ]
    }"#;
    let request = GenerateRequest::from_json(json).unwrap();
    let deck = generator(&dir).generate(&request).unwrap();

    assert_eq!(deck.slide_count, 3);
    let slides = slide_xml(&deck.path);
    assert!(slides[1].contains("<a:t>☁️ Clouds</a:t>"));
    assert!(slides[1].contains("<a:t>🌧️ Rain</a:t>"));
    assert!(slides[2].contains("<a:t>• Heat</a:t>"));
}

#[test]
fn leading_slides_follow_their_position() {
    let dir = TempDir::new().unwrap();
    let mut first = SlideContentRecord::new(SlideType::Content, "Plant Cells");
    first.content = vec!["Grade 6".to_string()];
    let mut second = SlideContentRecord::new(SlideType::Content, "Goals");
    second.content = ["Name", "Draw", "Compare"].iter().map(|s| s.to_string()).collect();
    let request = request(vec![first, second]);

    let mut diagnostics = Diagnostics::new();
    let doc = generator(&dir).compose(&request, &mut diagnostics).unwrap();
    // title then subtitle
    let texts: Vec<String> = doc.slide(0).unwrap().shapes().iter().map(|s| s.text_body().unwrap().text()).collect();
    assert_eq!(texts, vec!["Plant Cells", "Grade 6"]);
    // heading then two columns
    let counts: Vec<usize> = doc
        .slide(1)
        .unwrap()
        .shapes()
        .iter()
        .map(|s| s.text_body().unwrap().paragraphs.len())
        .collect();
    assert_eq!(counts, vec![1, 2, 1]);
}
