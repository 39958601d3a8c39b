/// Relationship ID mapper for slides being written.
///
/// Parts and relationships are created before any slide markup is produced,
/// so the markup can refer to the actual relationship ids. The mapper is
/// organized per slide, as each slide part owns its own relationships.
use super::shape::{ShapeId, ShapeRelIds};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct RelationshipMapper {
    /// Maps (slide_index, shape_id) to the ids used by that shape's markup
    shape_ids: HashMap<(usize, ShapeId), ShapeRelIds>,
    /// Maps slide_index to the notes slide relationship id
    notes_ids: HashMap<usize, String>,
}

impl RelationshipMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the blip relationship of a picture.
    pub fn add_image(&mut self, slide_index: usize, shape_id: ShapeId, rel_id: String) {
        self.shape_ids
            .entry((slide_index, shape_id))
            .or_default()
            .image = Some(rel_id);
    }

    /// Record the three relationships of a media shape.
    pub fn add_media(
        &mut self,
        slide_index: usize,
        shape_id: ShapeId,
        audio_link: String,
        media_embed: String,
        poster: String,
    ) {
        let ids = self.shape_ids.entry((slide_index, shape_id)).or_default();
        ids.audio_link = Some(audio_link);
        ids.media_embed = Some(media_embed);
        ids.poster = Some(poster);
    }

    pub fn add_notes(&mut self, slide_index: usize, rel_id: String) {
        self.notes_ids.insert(slide_index, rel_id);
    }

    /// Relationship ids for one shape, if it needs any.
    pub fn shape_ids(&self, slide_index: usize, shape_id: ShapeId) -> Option<&ShapeRelIds> {
        self.shape_ids.get(&(slide_index, shape_id))
    }

    pub fn notes_id(&self, slide_index: usize) -> Option<&str> {
        self.notes_ids.get(&slide_index).map(|s| s.as_str())
    }

    /// Drop every mapping.
    pub fn clear(&mut self) {
        self.shape_ids.clear();
        self.notes_ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mappings_are_per_slide() {
        let mut mapper = RelationshipMapper::new();
        mapper.add_image(0, 3, "rId2".to_string());
        mapper.add_media(1, 3, "rId2".to_string(), "rId3".to_string(), "rId4".to_string());
        mapper.add_notes(1, "rId5".to_string());

        assert_eq!(mapper.shape_ids(0, 3).and_then(|ids| ids.image.as_deref()), Some("rId2"));
        let media = mapper.shape_ids(1, 3).unwrap();
        assert_eq!(media.image, None);
        assert_eq!(media.media_embed.as_deref(), Some("rId3"));
        assert_eq!(mapper.notes_id(1), Some("rId5"));
        assert_eq!(mapper.notes_id(0), None);

        mapper.clear();
        assert!(mapper.shape_ids(0, 3).is_none());
    }
}
