//! Narration audio support.
//!
//! Recognises the audio containers that can be embedded as slide media, maps
//! them to MIME types, and renders the poster frame shown for the media shape.

use phf::phf_map;
use std::io::Cursor;
use std::path::Path;

/// MIME type used when an extension has no entry in the table.
pub const DEFAULT_AUDIO_MIME: &str = "audio/mpeg";

/// Edge length, in pixels, of the generated poster frame.
const POSTER_SIZE: u32 = 48;

/// Embeddable audio containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Mp3,
    Wav,
    M4a,
    Wma,
}

static AUDIO_EXTENSIONS: phf::Map<&'static str, AudioFormat> = phf_map! {
    "mp3" => AudioFormat::Mp3,
    "wav" => AudioFormat::Wav,
    "m4a" => AudioFormat::M4a,
    "wma" => AudioFormat::Wma,
};

static AUDIO_MIME_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "mp3" => "audio/mpeg",
    "wav" => "audio/wav",
    "m4a" => "audio/mp4",
    "wma" => "audio/x-ms-wma",
};

impl AudioFormat {
    /// Look up a format by extension, case-insensitively, with or without a
    /// leading period.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        AUDIO_EXTENSIONS.get(ext.as_str()).copied()
    }

    /// Look up a format from a file path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Extension used for the media partname.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::M4a => "m4a",
            Self::Wma => "wma",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        mime_for_extension(self.extension())
    }
}

/// MIME type for an audio extension, falling back to [`DEFAULT_AUDIO_MIME`].
pub fn mime_for_extension(ext: &str) -> &'static str {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    AUDIO_MIME_TYPES
        .get(ext.as_str())
        .copied()
        .unwrap_or(DEFAULT_AUDIO_MIME)
}

/// Audio bytes ready to embed.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub data: Vec<u8>,
    pub format: AudioFormat,
}

/// Render the speaker icon used as the media shape's poster frame.
pub fn speaker_poster_png() -> image::ImageResult<Vec<u8>> {
    let ink = image::Rgba([0x40, 0x40, 0x40, 0xFF]);
    let clear = image::Rgba([0, 0, 0, 0]);
    let mid = POSTER_SIZE as i32 / 2;

    let img = image::RgbaImage::from_fn(POSTER_SIZE, POSTER_SIZE, |x, y| {
        let (x, y) = (x as i32, y as i32);
        let body = (10..18).contains(&x) && (mid - 6..mid + 6).contains(&y);
        let cone = (18..32).contains(&x) && (y - mid).abs() <= (x - 18) + 6;
        if body || cone { ink } else { clear }
    });

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert_eq!(AudioFormat::from_extension("mp3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_extension(".WAV"), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_extension("M4a"), Some(AudioFormat::M4a));
        assert_eq!(AudioFormat::from_extension("wma"), Some(AudioFormat::Wma));
        assert_eq!(AudioFormat::from_extension("ogg"), None);
        assert_eq!(AudioFormat::from_extension(""), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            AudioFormat::from_path(Path::new("/tmp/narration/slide_1.MP3")),
            Some(AudioFormat::Mp3)
        );
        assert_eq!(AudioFormat::from_path(Path::new("/tmp/narration")), None);
    }

    #[test]
    fn test_mime_table() {
        assert_eq!(AudioFormat::Mp3.mime_type(), "audio/mpeg");
        assert_eq!(AudioFormat::Wav.mime_type(), "audio/wav");
        assert_eq!(AudioFormat::M4a.mime_type(), "audio/mp4");
        assert_eq!(AudioFormat::Wma.mime_type(), "audio/x-ms-wma");
        assert_eq!(mime_for_extension("aac"), DEFAULT_AUDIO_MIME);
    }

    #[test]
    fn test_poster_is_png() {
        let png = speaker_poster_png().unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
