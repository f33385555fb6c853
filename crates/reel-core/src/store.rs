use crate::models::{MediaItem, MediaType, NewMedia, SeasonRating, Tag};

/// The ordered collection of media items. Owns item lifetime.
///
/// Mutations report whether anything changed so the owner can decide
/// whether to persist and notify. Unknown ids are silent no-ops.
#[derive(Debug, Clone, Default)]
pub struct MediaStore {
    items: Vec<MediaItem>,
}

impl MediaStore {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self { items }
    }

    pub fn all(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Assign a fresh id and timestamp, append, and return the stored item.
    pub fn add_media(&mut self, data: NewMedia) -> MediaItem {
        let item = MediaItem::from_new(data);
        self.items.push(item.clone());
        item
    }

    /// Replace the item with the same id wholesale.
    pub fn update_media(&mut self, item: MediaItem) -> bool {
        match self.items.iter_mut().find(|m| m.id == item.id) {
            Some(existing) => {
                *existing = item;
                true
            }
            None => false,
        }
    }

    /// Remove an item, keeping the order of the rest.
    pub fn delete_media(&mut self, id: &str) -> Option<MediaItem> {
        let pos = self.items.iter().position(|m| m.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn get_media_by_id(&self, id: &str) -> Option<&MediaItem> {
        self.items.iter().find(|m| m.id == id)
    }

    pub fn get_media_by_type(&self, media_type: MediaType) -> Vec<&MediaItem> {
        self.items
            .iter()
            .filter(|m| m.media_type == media_type)
            .collect()
    }

    /// Flip the favorite flag, returning the new value.
    pub fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let item = self.get_mut(id)?;
        item.is_favorite = !item.is_favorite;
        Some(item.is_favorite)
    }

    /// Overwrite a season's progress flags.
    ///
    /// `rating: None` keeps the current rating. `Some(r)` sets it, or clears
    /// it when the season already carries `r`.
    pub fn update_season_status(
        &mut self,
        media_id: &str,
        season_number: u32,
        completed: bool,
        in_progress: bool,
        rating: Option<SeasonRating>,
    ) -> bool {
        let Some(season) = self
            .get_mut(media_id)
            .and_then(|m| m.season_mut(season_number))
        else {
            return false;
        };
        season.completed = completed;
        season.in_progress = in_progress;
        if let Some(rating) = rating {
            season.toggle_rating(rating);
        }
        true
    }

    /// Attach a tag copy to one item. No-op if the item already has it.
    pub fn add_tag_to_media(&mut self, media_id: &str, tag: &Tag) -> bool {
        match self.get_mut(media_id) {
            Some(item) if !item.has_tag(&tag.id) => {
                item.tags.push(tag.clone());
                true
            }
            _ => false,
        }
    }

    pub fn remove_tag_from_media(&mut self, media_id: &str, tag_id: &str) -> bool {
        let Some(item) = self.get_mut(media_id) else {
            return false;
        };
        let before = item.tags.len();
        item.tags.retain(|t| t.id != tag_id);
        item.tags.len() != before
    }

    /// Overwrite every embedded copy of `tag`. Returns the number of items touched.
    pub fn propagate_tag(&mut self, tag: &Tag) -> usize {
        let mut touched = 0;
        for item in &mut self.items {
            for embedded in item.tags.iter_mut().filter(|t| t.id == tag.id) {
                *embedded = tag.clone();
                touched += 1;
            }
        }
        touched
    }

    /// Strip a tag from every item. Returns the number of items touched.
    pub fn strip_tag(&mut self, tag_id: &str) -> usize {
        let mut touched = 0;
        for item in &mut self.items {
            let before = item.tags.len();
            item.tags.retain(|t| t.id != tag_id);
            if item.tags.len() != before {
                touched += 1;
            }
        }
        touched
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut MediaItem> {
        self.items.iter_mut().find(|m| m.id == id)
    }
}
