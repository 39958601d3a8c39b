//! Media attacher: pictures, slide backgrounds and narration audio.
//!
//! Every operation reads its input from the local filesystem and either
//! returns the new shape's id or the reason the shape was not added. Callers
//! record the reason as a diagnostic and carry on.

use crate::common::unit::{DEFAULT_IMAGE_DPI, Emu, inches, px_to_emu, scale_to};
use crate::composer::diagnostics::{DiagnosticReason, MediaKind};
use crate::ooxml::pptx::media::speaker_poster_png;
use crate::ooxml::pptx::writer::{MediaClip, Picture};
use crate::ooxml::pptx::{AudioClip, AudioFormat, Canvas, Geometry, ImageInfo, ShapeId, Slide, TimingGraph};
use std::path::Path;
use tracing::info;

/// Off-canvas frame of the narration shape: (-0.6in, -0.6in), 0.4in square.
pub fn audio_frame() -> Geometry {
    Geometry::new(inches(-0.6), inches(-0.6), inches(0.4), inches(0.4))
}

/// How a picture's extent is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureSize {
    /// Fixed height; width follows the aspect ratio
    Height(Emu),
    /// Fixed width; height follows the aspect ratio
    Width(Emu),
    /// Stretched to exactly this extent
    Exact { cx: Emu, cy: Emu },
}

impl PictureSize {
    fn resolve(self, info: &ImageInfo) -> (Emu, Emu) {
        let native_cx = px_to_emu(info.width_px, DEFAULT_IMAGE_DPI);
        let native_cy = px_to_emu(info.height_px, DEFAULT_IMAGE_DPI);
        match self {
            Self::Height(cy) => (scale_to(cy, native_cy, native_cx), cy),
            Self::Width(cx) => (cx, scale_to(cx, native_cx, native_cy)),
            Self::Exact { cx, cy } => (cx, cy),
        }
    }
}

fn read_input(path: &Path, kind: MediaKind) -> Result<Vec<u8>, DiagnosticReason> {
    if !path.exists() {
        return Err(DiagnosticReason::MissingFile {
            kind,
            path: path.to_path_buf(),
        });
    }
    std::fs::read(path).map_err(|e| DiagnosticReason::UnreadableFile {
        kind,
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Add the picture at `path` with its top-left corner at (`x`, `y`).
pub fn attach_picture(
    slide: &mut Slide,
    path: &Path,
    kind: MediaKind,
    x: Emu,
    y: Emu,
    size: PictureSize,
) -> Result<ShapeId, DiagnosticReason> {
    let data = read_input(path, kind)?;
    let info = ImageInfo::probe(&data).map_err(|e| DiagnosticReason::UnreadableFile {
        kind,
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let (cx, cy) = size.resolve(&info);
    let description = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(slide.add_picture(
        Geometry::new(x, y, cx, cy),
        Picture {
            data,
            format: info.format,
            description,
        },
    ))
}

/// Cover the whole canvas with the picture at `path` and move it behind
/// every other shape.
pub fn attach_background(slide: &mut Slide, path: &Path, canvas: Canvas) -> Result<ShapeId, DiagnosticReason> {
    let id = attach_picture(
        slide,
        path,
        MediaKind::Background,
        0,
        0,
        PictureSize::Exact {
            cx: canvas.width,
            cy: canvas.height,
        },
    )?;
    slide.send_to_back(id);
    Ok(id)
}

/// Embed the narration audio at `path` as an off-canvas media shape.
pub fn attach_audio(slide: &mut Slide, path: &Path) -> Result<ShapeId, DiagnosticReason> {
    if !path.exists() {
        return Err(DiagnosticReason::MissingFile {
            kind: MediaKind::Audio,
            path: path.to_path_buf(),
        });
    }
    let format =
        AudioFormat::from_path(path).ok_or_else(|| DiagnosticReason::UnsupportedAudio(path.to_path_buf()))?;
    let data = read_input(path, MediaKind::Audio)?;
    let poster = speaker_poster_png().map_err(|e| DiagnosticReason::UnreadableFile {
        kind: MediaKind::Audio,
        path: path.to_path_buf(),
        detail: format!("poster frame: {}", e),
    })?;

    let id = slide.add_media(
        audio_frame(),
        MediaClip {
            audio: AudioClip { data, format },
            poster,
        },
    );
    info!(path = %path.display(), mime = format.mime_type(), shape = id, "attached narration audio");
    Ok(id)
}

/// Make the media shape `shape_id` play as soon as the slide is shown.
///
/// Any timing graph already on the slide is replaced.
pub fn install_auto_play(slide: &mut Slide, shape_id: ShapeId) -> Result<(), DiagnosticReason> {
    slide
        .set_timing(TimingGraph::auto_play(shape_id))
        .map_err(|e| DiagnosticReason::TimingRejected(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::{Document, ShapeKind};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([20, 40, 60]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, out.into_inner()).unwrap();
        path
    }

    fn blank_slide(doc: &mut Document) -> &mut Slide {
        doc.add_slide(6).unwrap()
    }

    #[test]
    fn test_picture_keeps_aspect_ratio() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "wide.png", 400, 200);
        let mut doc = Document::blank().unwrap();
        let slide = blank_slide(&mut doc);

        let id = attach_picture(
            slide,
            &path,
            MediaKind::Image,
            inches(5.5),
            inches(1.5),
            PictureSize::Height(inches(3.0)),
        )
        .unwrap();
        let geometry = slide.shape(id).unwrap().geometry();
        assert_eq!(geometry.cy, inches(3.0));
        assert_eq!(geometry.cx, inches(6.0));
        assert_eq!(geometry.x, inches(5.5));

        let id = attach_picture(slide, &path, MediaKind::Image, 0, 0, PictureSize::Width(inches(7.0))).unwrap();
        let geometry = slide.shape(id).unwrap().geometry();
        assert_eq!(geometry.cx, inches(7.0));
        assert_eq!(geometry.cy, inches(3.5));
    }

    #[test]
    fn test_background_goes_to_back() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "bg.png", 16, 9);
        let mut doc = Document::blank().unwrap();
        let canvas = doc.canvas();
        let slide = blank_slide(&mut doc);
        crate::composer::style::add_heading(slide, "Title");

        let id = attach_background(slide, &path, canvas).unwrap();
        assert_eq!(slide.shapes()[0].id(), id);
        assert_eq!(
            slide.shapes()[0].geometry(),
            Geometry::new(0, 0, canvas.width, canvas.height)
        );
    }

    #[test]
    fn test_missing_and_corrupt_pictures() {
        let dir = TempDir::new().unwrap();
        let mut doc = Document::blank().unwrap();
        let slide = blank_slide(&mut doc);

        let missing = dir.path().join("none.png");
        let err = attach_picture(slide, &missing, MediaKind::Image, 0, 0, PictureSize::Width(1)).unwrap_err();
        assert!(matches!(err, DiagnosticReason::MissingFile { kind: MediaKind::Image, .. }));

        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"not an image").unwrap();
        let err = attach_picture(slide, &corrupt, MediaKind::Image, 0, 0, PictureSize::Width(1)).unwrap_err();
        assert!(matches!(err, DiagnosticReason::UnreadableFile { .. }));
        assert_eq!(slide.shape_count(), 0);
    }

    #[test]
    fn test_audio_off_canvas() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("narration.MP3");
        std::fs::write(&path, b"ID3\x03\x00").unwrap();
        let mut doc = Document::blank().unwrap();
        let slide = blank_slide(&mut doc);

        let id = attach_audio(slide, &path).unwrap();
        let shape = slide.shape(id).unwrap();
        assert!(matches!(shape.kind(), ShapeKind::Media(_)));
        let geometry = shape.geometry();
        assert!(geometry.x < 0 && geometry.y < 0);
        assert_eq!(geometry.cx, inches(0.4));

        install_auto_play(slide, id).unwrap();
        assert_eq!(slide.timing().unwrap().target_shape_ids(), vec![id]);
    }

    #[test]
    fn test_audio_rejections() {
        let dir = TempDir::new().unwrap();
        let mut doc = Document::blank().unwrap();
        let slide = blank_slide(&mut doc);

        let ogg = dir.path().join("narration.ogg");
        std::fs::write(&ogg, b"OggS").unwrap();
        assert_eq!(
            attach_audio(slide, &ogg).unwrap_err(),
            DiagnosticReason::UnsupportedAudio(ogg.clone())
        );

        let missing = dir.path().join("gone.mp3");
        assert!(matches!(
            attach_audio(slide, &missing).unwrap_err(),
            DiagnosticReason::MissingFile { kind: MediaKind::Audio, .. }
        ));
        assert_eq!(slide.shape_count(), 0);
    }

    #[test]
    fn test_auto_play_rejects_unknown_shape() {
        let mut doc = Document::blank().unwrap();
        let slide = blank_slide(&mut doc);
        assert!(matches!(
            install_auto_play(slide, 99),
            Err(DiagnosticReason::TimingRejected(_))
        ));
    }
}
