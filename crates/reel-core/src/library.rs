//! The single source of truth for the collection and the tag registry.
//!
//! Every mutation updates in-memory state, writes the affected list(s) to
//! storage, bumps the revision and then notifies subscribers, all before
//! returning. Operations on unknown ids change nothing, write nothing and
//! notify no one.

use crate::error::ReelError;
use crate::filter::{filter_media, MediaFilter};
use crate::models::{MediaItem, MediaType, NewMedia, SeasonRating, Tag};
use crate::persistence::{LoadedState, Persistence};
use crate::storage::KeyValueStore;
use crate::store::MediaStore;
use crate::tags::TagRegistry;
use crate::transfer;

/// A change that has been applied and persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryEvent {
    MediaAdded(MediaItem),
    MediaUpdated(MediaItem),
    MediaDeleted(MediaItem),
    FavoriteToggled { id: String, is_favorite: bool },
    SeasonUpdated { media_id: String, season: u32 },
    TagAdded(Tag),
    /// A tag was renamed or recolored; `items` embedded copies were rewritten.
    TagUpdated { tag: Tag, items: usize },
    /// A tag was removed from the registry and stripped from `items` items.
    TagDeleted { tag: Tag, items: usize },
    MediaTagsChanged { media_id: String },
    MediaImported { count: usize },
}

/// Handle returned by `Library::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&LibraryEvent) + Send>;

/// Changed copies of the lists, written to storage before they replace
/// the live state.
enum Staged {
    Media(MediaStore),
    Tags(TagRegistry),
    Both(MediaStore, TagRegistry),
}

pub struct Library {
    media: MediaStore,
    tags: TagRegistry,
    persistence: Persistence,
    revision: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    load_error: Option<String>,
}

impl Library {
    /// Load persisted state from `store`. Unreadable data starts empty.
    pub fn open(store: impl KeyValueStore + 'static) -> Self {
        let persistence = Persistence::new(store);
        let LoadedState {
            media,
            tags,
            media_error,
        } = persistence.load();
        Self {
            media: MediaStore::new(media),
            tags: TagRegistry::new(tags),
            persistence,
            revision: 0,
            listeners: Vec::new(),
            next_subscription: 0,
            load_error: media_error,
        }
    }

    /// Why the saved collection could not be read, if it could not.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Monotonic counter bumped by every applied mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn all_media(&self) -> &[MediaItem] {
        self.media.all()
    }

    pub fn all_tags(&self) -> &[Tag] {
        self.tags.all()
    }

    pub fn get_media_by_id(&self, id: &str) -> Option<&MediaItem> {
        self.media.get_media_by_id(id)
    }

    pub fn get_media_by_type(&self, media_type: MediaType) -> Vec<&MediaItem> {
        self.media.get_media_by_type(media_type)
    }

    pub fn get_tag(&self, id: &str) -> Option<&Tag> {
        self.tags.get(id)
    }

    pub fn filtered(&self, filter: &MediaFilter) -> Vec<&MediaItem> {
        filter_media(self.media.all(), filter)
    }

    // ── Subscriptions ───────────────────────────────────────────

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&LibraryEvent) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    // ── Media ───────────────────────────────────────────────────

    pub fn add_media(&mut self, data: NewMedia) -> Result<MediaItem, ReelError> {
        let mut media = self.media.clone();
        let item = media.add_media(data);
        self.commit(Staged::Media(media), LibraryEvent::MediaAdded(item.clone()))?;
        tracing::info!(id = %item.id, title = %item.title, "Added media");
        Ok(item)
    }

    pub fn update_media(&mut self, item: MediaItem) -> Result<(), ReelError> {
        let mut media = self.media.clone();
        if !media.update_media(item.clone()) {
            tracing::debug!(id = %item.id, "Update for unknown media ignored");
            return Ok(());
        }
        self.commit(Staged::Media(media), LibraryEvent::MediaUpdated(item))
    }

    pub fn delete_media(&mut self, id: &str) -> Result<(), ReelError> {
        let mut media = self.media.clone();
        let Some(removed) = media.delete_media(id) else {
            return Ok(());
        };
        let title = removed.title.clone();
        self.commit(Staged::Media(media), LibraryEvent::MediaDeleted(removed))?;
        tracing::info!(id, %title, "Deleted media");
        Ok(())
    }

    pub fn toggle_favorite(&mut self, id: &str) -> Result<(), ReelError> {
        let mut media = self.media.clone();
        let Some(is_favorite) = media.toggle_favorite(id) else {
            return Ok(());
        };
        self.commit(
            Staged::Media(media),
            LibraryEvent::FavoriteToggled {
                id: id.to_string(),
                is_favorite,
            },
        )
    }

    /// See `MediaStore::update_season_status` for the rating toggle rule.
    pub fn update_season_status(
        &mut self,
        media_id: &str,
        season_number: u32,
        completed: bool,
        in_progress: bool,
        rating: Option<SeasonRating>,
    ) -> Result<(), ReelError> {
        let mut media = self.media.clone();
        if !media.update_season_status(media_id, season_number, completed, in_progress, rating) {
            return Ok(());
        }
        self.commit(
            Staged::Media(media),
            LibraryEvent::SeasonUpdated {
                media_id: media_id.to_string(),
                season: season_number,
            },
        )
    }

    /// Attach a registry tag to one item; unknown ids or an existing tag are no-ops.
    pub fn add_tag_to_media(&mut self, media_id: &str, tag_id: &str) -> Result<(), ReelError> {
        let Some(tag) = self.tags.get(tag_id) else {
            return Ok(());
        };
        let mut media = self.media.clone();
        if !media.add_tag_to_media(media_id, tag) {
            return Ok(());
        }
        self.commit(
            Staged::Media(media),
            LibraryEvent::MediaTagsChanged {
                media_id: media_id.to_string(),
            },
        )
    }

    pub fn remove_tag_from_media(&mut self, media_id: &str, tag_id: &str) -> Result<(), ReelError> {
        let mut media = self.media.clone();
        if !media.remove_tag_from_media(media_id, tag_id) {
            return Ok(());
        }
        self.commit(
            Staged::Media(media),
            LibraryEvent::MediaTagsChanged {
                media_id: media_id.to_string(),
            },
        )
    }

    // ── Tags ────────────────────────────────────────────────────

    pub fn add_tag(&mut self, name: &str, color: &str) -> Result<Tag, ReelError> {
        let mut tags = self.tags.clone();
        let tag = tags.add_tag(name, color);
        self.commit(Staged::Tags(tags), LibraryEvent::TagAdded(tag.clone()))?;
        tracing::info!(id = %tag.id, name, "Created tag");
        Ok(tag)
    }

    /// Replace a tag and rewrite every embedded copy of it.
    pub fn update_tag(&mut self, tag: Tag) -> Result<(), ReelError> {
        let mut tags = self.tags.clone();
        if !tags.update_tag(&tag) {
            return Ok(());
        }
        let mut media = self.media.clone();
        let items = media.propagate_tag(&tag);
        tracing::info!(id = %tag.id, items, "Updating tag");
        self.commit(Staged::Both(media, tags), LibraryEvent::TagUpdated { tag, items })
    }

    /// Remove a tag from the registry and from every item carrying it.
    pub fn delete_tag(&mut self, id: &str) -> Result<(), ReelError> {
        let mut tags = self.tags.clone();
        let Some(tag) = tags.delete_tag(id) else {
            return Ok(());
        };
        let mut media = self.media.clone();
        let items = media.strip_tag(id);
        tracing::info!(id, items, "Deleting tag");
        self.commit(Staged::Both(media, tags), LibraryEvent::TagDeleted { tag, items })
    }

    // ── Import ──────────────────────────────────────────────────

    /// Append every entry of an export file. Nothing is added if any entry
    /// is invalid. Imported items get fresh ids and timestamps.
    pub fn import_media(&mut self, json: &str) -> Result<usize, ReelError> {
        let entries = transfer::parse_import(json)?;
        let count = entries.len();
        let mut media = self.media.clone();
        for data in entries {
            media.add_media(data);
        }
        self.commit(Staged::Media(media), LibraryEvent::MediaImported { count })?;
        tracing::info!(count, "Imported media");
        Ok(count)
    }

    /// Pretty-printed JSON of the selected items.
    pub fn export_media(&self, selected_ids: &[String]) -> Result<String, ReelError> {
        transfer::export_media(self.media.all(), selected_ids)
    }

    // ── Internals ───────────────────────────────────────────────

    /// Write the staged lists, then swap them in. A failed write leaves the
    /// live state, the revision and the stored documents as they were.
    fn commit(&mut self, staged: Staged, event: LibraryEvent) -> Result<(), ReelError> {
        match staged {
            Staged::Media(media) => {
                self.persistence.save_media(media.all())?;
                self.media = media;
            }
            Staged::Tags(tags) => {
                self.persistence.save_tags(tags.all())?;
                self.tags = tags;
            }
            Staged::Both(media, tags) => {
                self.persistence.save_media(media.all())?;
                if let Err(e) = self.persistence.save_tags(tags.all()) {
                    if let Err(restore) = self.persistence.save_media(self.media.all()) {
                        tracing::error!(error = %restore, "Failed to restore saved collection");
                    }
                    return Err(e);
                }
                self.media = media;
                self.tags = tags;
            }
        }
        self.revision += 1;
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::models::Season;
    use crate::filter::FilteredView;
    use crate::persistence::{MEDIA_KEY, TAGS_KEY};
    use crate::storage::{MemoryStore, SqliteStore};

    /// Shares a `MemoryStore` but rejects writes to the keys `fails` picks.
    struct FailingStore {
        inner: MemoryStore,
        fails: fn(&str) -> bool,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, ReelError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), ReelError> {
            if (self.fails)(key) {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.set(key, value)
        }
    }

    fn series(title: &str, seasons: u32) -> NewMedia {
        let mut data = NewMedia::new(MediaType::Series, title);
        data.seasons = Season::numbered(seasons);
        data
    }

    fn record(library: &mut Library) -> Arc<Mutex<Vec<LibraryEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        library.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
        events
    }

    #[test]
    fn test_mutations_persist_and_reload() {
        let store = MemoryStore::new();
        let mut library = Library::open(store.clone());
        let tag = library.add_tag("Comfy", "#10B981").unwrap();
        let item = library.add_media(series("Dark", 2)).unwrap();
        library.add_tag_to_media(&item.id, &tag.id).unwrap();
        library.toggle_favorite(&item.id).unwrap();
        library
            .update_season_status(&item.id, 1, true, false, Some(SeasonRating::Good))
            .unwrap();

        let reloaded = Library::open(store);
        assert!(reloaded.load_error().is_none());
        assert_eq!(reloaded.all_media(), library.all_media());
        assert_eq!(reloaded.all_tags(), library.all_tags());
        let stored = reloaded.get_media_by_id(&item.id).unwrap();
        assert!(stored.is_favorite);
        assert_eq!(stored.tags, vec![tag]);
    }

    #[test]
    fn test_corrupt_collection_reports_load_error() {
        let mut store = MemoryStore::new();
        store.set(MEDIA_KEY, "[{\"id\": 1}]").unwrap();
        let library = Library::open(store);
        assert!(library.all_media().is_empty());
        assert!(library.load_error().is_some());
    }

    #[test]
    fn test_delete_tag_cascades_to_all_items() {
        let mut library = Library::open(MemoryStore::new());
        let tag = library.add_tag("Rewatch", "#F59E0B").unwrap();
        let other = library.add_tag("Drama", "#EF4444").unwrap();
        let tagged: Vec<String> = (0..3)
            .map(|i| library.add_media(series(&format!("S{i}"), 1)).unwrap().id)
            .collect();
        let untagged = library.add_media(series("Plain", 1)).unwrap();
        for id in &tagged {
            library.add_tag_to_media(id, &tag.id).unwrap();
        }
        library.add_tag_to_media(&untagged.id, &other.id).unwrap();

        let events = record(&mut library);
        library.delete_tag(&tag.id).unwrap();

        assert!(library.get_tag(&tag.id).is_none());
        for id in &tagged {
            assert!(library.get_media_by_id(id).unwrap().tags.is_empty());
        }
        assert_eq!(library.get_media_by_id(&untagged.id).unwrap().tags, vec![other]);
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[LibraryEvent::TagDeleted { tag, items: 3 }]
        );
    }

    #[test]
    fn test_update_tag_propagates_name_and_color() {
        let mut library = Library::open(MemoryStore::new());
        let tag = library.add_tag("Scifi", "#3B82F6").unwrap();
        let a = library.add_media(series("Dark", 1)).unwrap();
        let b = library.add_media(series("Lost", 1)).unwrap();
        library.add_tag_to_media(&a.id, &tag.id).unwrap();

        let renamed = Tag {
            name: "Sci-fi".into(),
            color: "#8B5CF6".into(),
            ..tag.clone()
        };
        library.update_tag(renamed.clone()).unwrap();

        assert_eq!(library.get_tag(&tag.id), Some(&renamed));
        assert_eq!(library.get_media_by_id(&a.id).unwrap().tags, vec![renamed]);
        assert!(library.get_media_by_id(&b.id).unwrap().tags.is_empty());
    }

    #[test]
    fn test_unknown_ids_do_not_notify_or_bump_revision() {
        let mut library = Library::open(MemoryStore::new());
        let item = library.add_media(series("Dark", 1)).unwrap();
        let events = record(&mut library);
        let revision = library.revision();

        library.delete_media("missing").unwrap();
        library.toggle_favorite("missing").unwrap();
        library.delete_tag("missing").unwrap();
        library.update_tag(Tag::new("Ghost", "#000")).unwrap();
        library.add_tag_to_media(&item.id, "missing").unwrap();
        library.update_season_status(&item.id, 7, true, false, None).unwrap();
        let mut ghost = item.clone();
        ghost.id = "missing".into();
        library.update_media(ghost).unwrap();

        assert_eq!(library.revision(), revision);
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(library.all_media().len(), 1);
    }

    #[test]
    fn test_subscribers_see_state_after_mutation() {
        let mut library = Library::open(MemoryStore::new());
        let events = record(&mut library);
        let item = library.add_media(series("Dark", 1)).unwrap();
        library.toggle_favorite(&item.id).unwrap();
        library.delete_media(&item.id).unwrap();

        let seen = events.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], LibraryEvent::MediaAdded(item.clone()));
        assert_eq!(
            seen[1],
            LibraryEvent::FavoriteToggled {
                id: item.id.clone(),
                is_favorite: true
            }
        );
        assert!(matches!(&seen[2], LibraryEvent::MediaDeleted(m) if m.id == item.id));
        assert_eq!(library.revision(), 3);
    }

    #[test]
    fn test_unsubscribe_stops_events() {
        let mut library = Library::open(MemoryStore::new());
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        let id = library.subscribe(move |_| *sink.lock().unwrap() += 1);

        library.add_media(series("A", 1)).unwrap();
        assert!(library.unsubscribe(id));
        assert!(!library.unsubscribe(id));
        library.add_media(series("B", 1)).unwrap();

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_import_appends_with_fresh_ids() {
        let mut library = Library::open(MemoryStore::new());
        let original = library.add_media(series("Dark", 2)).unwrap();
        let json = library.export_media(&[original.id.clone()]).unwrap();

        assert_eq!(library.import_media(&json).unwrap(), 1);
        assert_eq!(library.all_media().len(), 2);
        let copy = &library.all_media()[1];
        assert_eq!(copy.title, "Dark");
        assert_ne!(copy.id, original.id);
    }

    #[test]
    fn test_failed_import_adds_nothing() {
        let mut library = Library::open(MemoryStore::new());
        let events = record(&mut library);
        let json = r#"[
            {"id": "1", "title": "Dark", "type": "series", "seasons": []},
            {"id": "2", "title": "Lost", "type": "series"}
        ]"#;
        assert!(matches!(library.import_media(json), Err(ReelError::Import(_))));
        assert!(library.all_media().is_empty());
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_sqlite_backed_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reel.db");
        let id = {
            let mut library = Library::open(SqliteStore::open(&path).unwrap());
            library.add_media(series("Dark", 3)).unwrap().id
        };
        let library = Library::open(SqliteStore::open(&path).unwrap());
        assert_eq!(library.get_media_by_id(&id).unwrap().seasons.len(), 3);
    }

    #[test]
    fn test_failed_write_leaves_state_untouched() {
        let store = MemoryStore::new();
        let mut library = Library::open(FailingStore {
            inner: store.clone(),
            fails: |_| true,
        });
        let events = record(&mut library);
        let mut view = FilteredView::new();
        let filter = MediaFilter::default();
        assert!(view
            .ids(library.revision(), library.all_media(), &filter)
            .is_empty());

        let heat = NewMedia::new(MediaType::Movie, "Heat");
        assert!(matches!(library.add_media(heat), Err(ReelError::Io(_))));
        assert!(library.add_tag("Comfy", "#10B981").is_err());

        assert!(library.all_media().is_empty());
        assert!(library.all_tags().is_empty());
        assert_eq!(library.revision(), 0);
        assert!(events.lock().unwrap().is_empty());
        assert!(store.get(MEDIA_KEY).unwrap().is_none());
        assert!(view
            .ids(library.revision(), library.all_media(), &filter)
            .is_empty());
    }

    #[test]
    fn test_failed_tag_write_restores_collection() {
        let store = MemoryStore::new();
        let (tag, item) = {
            let mut library = Library::open(store.clone());
            let tag = library.add_tag("Scifi", "#3B82F6").unwrap();
            let item = library.add_media(series("Dark", 1)).unwrap();
            library.add_tag_to_media(&item.id, &tag.id).unwrap();
            (tag, item)
        };
        let saved_media = store.get(MEDIA_KEY).unwrap();

        let mut library = Library::open(FailingStore {
            inner: store.clone(),
            fails: |key| key == TAGS_KEY,
        });
        let renamed = Tag {
            name: "Sci-fi".into(),
            ..tag.clone()
        };
        assert!(library.update_tag(renamed).is_err());
        assert!(library.delete_tag(&tag.id).is_err());

        assert_eq!(library.get_tag(&tag.id), Some(&tag));
        assert_eq!(library.get_media_by_id(&item.id).unwrap().tags, vec![tag]);
        assert_eq!(library.revision(), 0);
        assert_eq!(store.get(MEDIA_KEY).unwrap(), saved_media);
    }
}
