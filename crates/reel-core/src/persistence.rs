//! Mirrors the collection and the tag registry into a key-value store.
//!
//! Both lists are written in full on every change. Loading never fails:
//! missing keys start empty, and unreadable documents are logged and
//! replaced with empty lists.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ReelError;
use crate::models::{MediaItem, Tag};
use crate::storage::KeyValueStore;

/// Key holding the JSON array of media items.
pub const MEDIA_KEY: &str = "media-tracker-data";
/// Key holding the JSON array of tags.
pub const TAGS_KEY: &str = "media-tracker-tags";

/// State read back from storage.
#[derive(Debug, Default)]
pub struct LoadedState {
    pub media: Vec<MediaItem>,
    pub tags: Vec<Tag>,
    /// Set when the stored collection existed but could not be read.
    /// Tag failures are not reported.
    pub media_error: Option<String>,
}

pub struct Persistence {
    store: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Read both lists, falling back to empty state on any problem.
    pub fn load(&self) -> LoadedState {
        let (media, media_error) = match self.load_list::<MediaItem>(MEDIA_KEY) {
            Ok(media) => (media, None),
            Err(e) => {
                tracing::warn!(key = MEDIA_KEY, error = %e, "Failed to load saved collection");
                (Vec::new(), Some(e.to_string()))
            }
        };

        let tags = self.load_list::<Tag>(TAGS_KEY).unwrap_or_else(|e| {
            tracing::warn!(key = TAGS_KEY, error = %e, "Failed to load saved tags");
            Vec::new()
        });

        tracing::debug!(media = media.len(), tags = tags.len(), "Loaded library state");
        LoadedState {
            media,
            tags,
            media_error,
        }
    }

    pub fn save_media(&mut self, media: &[MediaItem]) -> Result<(), ReelError> {
        self.save_list(MEDIA_KEY, media)
    }

    pub fn save_tags(&mut self, tags: &[Tag]) -> Result<(), ReelError> {
        self.save_list(TAGS_KEY, tags)
    }

    fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, ReelError> {
        match self.store.get(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save_list<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<(), ReelError> {
        let json = serde_json::to_string(items)?;
        self.store.set(key, &json)
    }
}
