//! Aggregate views over the whole collection.
//!
//! Each function is independent and pure. Below `MIN_ITEMS_FOR_STATS`
//! items the numbers are not meaningful; check `has_enough_data` first,
//! or use `LibraryStatistics::compute`, which refuses small collections.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::config::StatsConfig;
use crate::error::ReelError;
use crate::models::{MediaItem, MediaType, SeasonRating, Tag};

/// Minimum collection size for statistics.
pub const MIN_ITEMS_FOR_STATS: usize = 3;

/// Rating histogram buckets. Both ends are inclusive, so a rating sitting on
/// a boundary (2, 4, 6, 8) is counted in both neighbouring buckets.
pub const RATING_BUCKETS: [(f32, f32); 5] =
    [(0.0, 2.0), (2.0, 4.0), (4.0, 6.0), (6.0, 8.0), (8.0, 10.0)];

pub fn has_enough_data(items: &[MediaItem]) -> bool {
    items.len() >= MIN_ITEMS_FOR_STATS
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCount {
    pub media_type: MediaType,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FavoriteSplit {
    pub favorites: usize,
    pub others: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBucket {
    pub min: f32,
    pub max: f32,
    pub count: usize,
}

impl RatingBucket {
    pub fn label(&self) -> String {
        format!("{}-{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagCount {
    pub tag: Tag,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeasonRatingTally {
    pub good: usize,
    pub bad: usize,
    pub unrated: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

impl MonthCount {
    /// `M/YYYY`, e.g. `3/2024`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.month, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedEntry {
    pub id: String,
    pub title: String,
    pub media_type: MediaType,
    pub rating: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionEntry {
    pub id: String,
    pub title: String,
    pub media_type: MediaType,
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}

/// Count per media type, always reporting all three types.
pub fn type_distribution(items: &[MediaItem]) -> Vec<TypeCount> {
    MediaType::ALL
        .iter()
        .map(|&media_type| TypeCount {
            media_type,
            count: items.iter().filter(|m| m.media_type == media_type).count(),
        })
        .collect()
}

pub fn favorite_distribution(items: &[MediaItem]) -> FavoriteSplit {
    let favorites = items.iter().filter(|m| m.is_favorite).count();
    FavoriteSplit {
        favorites,
        others: items.len() - favorites,
    }
}

/// Rated items per bucket; unrated items are not counted.
pub fn rating_histogram(items: &[MediaItem]) -> Vec<RatingBucket> {
    RATING_BUCKETS
        .iter()
        .map(|&(min, max)| RatingBucket {
            min,
            max,
            count: items
                .iter()
                .filter_map(|m| m.rating)
                .filter(|&r| r >= min && r <= max)
                .count(),
        })
        .collect()
}

/// Items referencing each registry tag, most used first, capped to `top_n`.
pub fn tag_frequency(items: &[MediaItem], tags: &[Tag], top_n: usize) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = tags
        .iter()
        .map(|tag| TagCount {
            tag: tag.clone(),
            count: items.iter().filter(|m| m.has_tag(&tag.id)).count(),
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_n);
    counts
}

/// Good / bad / unset verdicts across all seasons of non-movie items.
pub fn season_rating_tally(items: &[MediaItem]) -> SeasonRatingTally {
    let mut tally = SeasonRatingTally::default();
    for season in items
        .iter()
        .filter(|m| m.media_type.has_seasons())
        .flat_map(|m| &m.seasons)
    {
        match season.rating {
            Some(SeasonRating::Good) => tally.good += 1,
            Some(SeasonRating::Bad) => tally.bad += 1,
            None => tally.unrated += 1,
        }
    }
    tally
}

/// Items added per calendar month, oldest month first.
///
/// Months are taken in UTC, the zone `dateAdded` is stored in, so the
/// grouping does not shift with the machine's local zone. An item added
/// late on the last local day of a month can land in the next month.
pub fn timeline(items: &[MediaItem]) -> Vec<MonthCount> {
    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for item in items {
        let key = (item.date_added.year(), item.date_added.month());
        *months.entry(key).or_default() += 1;
    }
    months
        .into_iter()
        .map(|((year, month), count)| MonthCount { year, month, count })
        .collect()
}

/// Highest-rated items; ties keep collection order.
pub fn top_rated(items: &[MediaItem], n: usize) -> Vec<RatedEntry> {
    let mut rated: Vec<RatedEntry> = items
        .iter()
        .filter_map(|m| {
            m.rating.map(|rating| RatedEntry {
                id: m.id.clone(),
                title: m.title.clone(),
                media_type: m.media_type,
                rating,
            })
        })
        .collect();
    rated.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    rated.truncate(n);
    rated
}

/// Completion percentage per series/anime with at least one season,
/// highest first, capped to `n`.
pub fn completion(items: &[MediaItem], n: usize) -> Vec<CompletionEntry> {
    let mut entries: Vec<CompletionEntry> = items
        .iter()
        .filter(|m| m.media_type.has_seasons() && !m.seasons.is_empty())
        .map(|m| {
            let total = m.seasons.len();
            let completed = m.completed_seasons();
            CompletionEntry {
                id: m.id.clone(),
                title: m.title.clone(),
                media_type: m.media_type,
                completed,
                total,
                percent: (completed as f64 / total as f64 * 100.0).round() as u32,
            }
        })
        .collect();
    entries.sort_by(|a, b| b.percent.cmp(&a.percent));
    entries.truncate(n);
    entries
}

/// Every statistic for the dashboard in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryStatistics {
    pub total: usize,
    pub types: Vec<TypeCount>,
    pub favorites: FavoriteSplit,
    pub ratings: Vec<RatingBucket>,
    pub tags: Vec<TagCount>,
    pub season_ratings: SeasonRatingTally,
    pub timeline: Vec<MonthCount>,
    pub top_rated: Vec<RatedEntry>,
    pub completion: Vec<CompletionEntry>,
}

impl LibraryStatistics {
    pub fn compute(
        items: &[MediaItem],
        tags: &[Tag],
        config: &StatsConfig,
    ) -> Result<Self, ReelError> {
        let need = config.min_items.max(MIN_ITEMS_FOR_STATS);
        if items.len() < need {
            return Err(ReelError::NotEnoughData {
                have: items.len(),
                need,
            });
        }
        Ok(Self {
            total: items.len(),
            types: type_distribution(items),
            favorites: favorite_distribution(items),
            ratings: rating_histogram(items),
            tags: tag_frequency(items, tags, config.top_tags),
            season_ratings: season_rating_tally(items),
            timeline: timeline(items),
            top_rated: top_rated(items, config.top_rated),
            completion: completion(items, config.top_completion),
        })
    }
}
