use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Tag;

/// Kind of tracked title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Series,
    Movie,
    Anime,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Series => "series",
            Self::Movie => "movie",
            Self::Anime => "anime",
        }
    }

    /// Human-readable plural label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Series => "Series",
            Self::Movie => "Movies",
            Self::Anime => "Anime",
        }
    }

    /// Whether the type tracks seasons.
    pub fn has_seasons(&self) -> bool {
        !matches!(self, Self::Movie)
    }

    pub const ALL: &[MediaType] = &[Self::Series, Self::Movie, Self::Anime];
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "series" | "tv" => Ok(Self::Series),
            "movie" | "movies" => Ok(Self::Movie),
            "anime" => Ok(Self::Anime),
            other => Err(format!("unknown media type: {other}")),
        }
    }
}

/// Thumbs-up / thumbs-down verdict on a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonRating {
    Good,
    Bad,
}

impl std::fmt::Display for SeasonRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => f.write_str("good"),
            Self::Bad => f.write_str("bad"),
        }
    }
}

impl std::str::FromStr for SeasonRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "good" => Ok(Self::Good),
            "bad" => Ok(Self::Bad),
            other => Err(format!("unknown season rating: {other}")),
        }
    }
}

/// One installment of a series or anime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub completed: bool,
    #[serde(default)]
    pub in_progress: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<SeasonRating>,
}

impl Season {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            title: Some(format!("Season {number}")),
            completed: false,
            in_progress: false,
            rating: None,
        }
    }

    /// Seasons numbered `1..=count`, all unwatched.
    pub fn numbered(count: u32) -> Vec<Season> {
        (1..=count).map(Season::new).collect()
    }

    /// Mark completion; a completed season is never in progress and vice versa.
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        self.in_progress = !completed;
    }

    /// Apply a rating with toggle semantics: the same value twice clears it.
    pub fn toggle_rating(&mut self, rating: SeasonRating) {
        self.rating = if self.rating == Some(rating) {
            None
        } else {
            Some(rating)
        };
    }
}

/// Data supplied when adding a title; `id` and `dateAdded` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedia {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub in_emission: bool,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl NewMedia {
    /// Minimal payload; everything else starts empty or unset.
    pub fn new(media_type: MediaType, title: impl Into<String>) -> Self {
        Self {
            media_type,
            title: title.into(),
            description: String::new(),
            image_url: String::new(),
            rating: None,
            is_favorite: false,
            in_emission: false,
            seasons: Vec::new(),
            tags: Vec::new(),
        }
    }
}

/// A tracked title with its season progress and tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub rating: Option<f32>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub in_emission: bool,
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl MediaItem {
    /// Materialize a new item with a fresh id, stamped with the current time.
    pub fn from_new(data: NewMedia) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            media_type: data.media_type,
            title: data.title,
            description: data.description,
            image_url: data.image_url,
            rating: data.rating,
            is_favorite: data.is_favorite,
            in_emission: data.in_emission,
            date_added: Utc::now(),
            seasons: data.seasons,
            tags: data.tags,
        }
    }

    pub fn season(&self, number: u32) -> Option<&Season> {
        self.seasons.iter().find(|s| s.number == number)
    }

    pub fn season_mut(&mut self, number: u32) -> Option<&mut Season> {
        self.seasons.iter_mut().find(|s| s.number == number)
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }

    /// Number of seasons marked completed.
    pub fn completed_seasons(&self) -> usize {
        self.seasons.iter().filter(|s| s.completed).count()
    }
}
