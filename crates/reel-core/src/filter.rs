//! Derives the visible subset of the collection from a set of filter criteria.

use crate::models::{MediaItem, MediaType};

/// Inclusive rating bounds on the 0–10 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingRange {
    pub min: f32,
    pub max: f32,
}

impl RatingRange {
    pub const FULL: RatingRange = RatingRange {
        min: 0.0,
        max: 10.0,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Unrated items only pass when the lower bound is exactly zero.
    pub fn matches(&self, rating: Option<f32>) -> bool {
        match rating {
            Some(r) => r >= self.min && r <= self.max,
            None => self.min == 0.0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.min <= 0.0 && self.max >= 10.0
    }
}

impl Default for RatingRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// Combined search / type / favorite / tag / rating criteria. All set
/// criteria must hold for an item to match.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaFilter {
    pub media_type: Option<MediaType>,
    pub query: Option<String>,
    pub favorites_only: bool,
    /// Tag ids; an item must carry every one of them.
    pub tags: Vec<String>,
    pub rating: RatingRange,
}

impl MediaFilter {
    pub fn matches(&self, item: &MediaItem) -> bool {
        self.type_matches(item)
            && self.text_matches(item)
            && (!self.favorites_only || item.is_favorite)
            && self.tags.iter().all(|id| item.has_tag(id))
            && self.rating.matches(item.rating)
    }

    /// Whether any user-controlled criterion narrows the default view.
    /// The type filter belongs to the page, so it is not counted.
    pub fn is_active(&self) -> bool {
        self.query.as_deref().is_some_and(|q| !q.is_empty())
            || self.favorites_only
            || !self.tags.is_empty()
            || !self.rating.is_full()
    }

    fn type_matches(&self, item: &MediaItem) -> bool {
        self.media_type.map_or(true, |t| item.media_type == t)
    }

    fn text_matches(&self, item: &MediaItem) -> bool {
        let Some(query) = self.query.as_deref().filter(|q| !q.is_empty()) else {
            return true;
        };
        let needle = query.to_lowercase();
        item.title.to_lowercase().contains(&needle)
            || item.description.to_lowercase().contains(&needle)
    }
}

/// Matching items in collection order.
pub fn filter_media<'a>(items: &'a [MediaItem], filter: &MediaFilter) -> Vec<&'a MediaItem> {
    items.iter().filter(|m| filter.matches(m)).collect()
}

/// Memoized filter result, recomputed when the library revision or the
/// filter changes.
#[derive(Debug, Default)]
pub struct FilteredView {
    cached: Option<(u64, MediaFilter, Vec<String>)>,
}

impl FilteredView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of matching items for `(revision, filter)`.
    pub fn ids(&mut self, revision: u64, items: &[MediaItem], filter: &MediaFilter) -> &[String] {
        let fresh = matches!(&self.cached, Some((rev, f, _)) if *rev == revision && f == filter);
        if !fresh {
            let ids = filter_media(items, filter)
                .into_iter()
                .map(|m| m.id.clone())
                .collect();
            self.cached = Some((revision, filter.clone(), ids));
        }
        self.cached
            .as_ref()
            .map(|(_, _, ids)| ids.as_slice())
            .unwrap_or_default()
    }

    /// Matching items, resolved against the current collection.
    pub fn items<'a>(
        &mut self,
        revision: u64,
        items: &'a [MediaItem],
        filter: &MediaFilter,
    ) -> Vec<&'a MediaItem> {
        let ids = self.ids(revision, items, filter);
        items.iter().filter(|m| ids.contains(&m.id)).collect()
    }
}
