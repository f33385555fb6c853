//! Contract for the external metadata catalog.
//!
//! The tracker only needs title search and a detail lookup to pre-fill the
//! add form. Lookups are best-effort: callers use `search_or_empty` and
//! `details_or_none`, which log failures instead of surfacing them.

use std::future::Future;

use reel_core::models::MediaType;

/// A metadata catalog that can be searched by title.
pub trait MetadataService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search movies and TV shows by title.
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SearchResult>, Self::Error>> + Send;

    /// Fetch details for a single search hit.
    fn get_details(
        &self,
        id: u64,
        kind: MediaKind,
    ) -> impl Future<Output = Result<MediaDetails, Self::Error>> + Send;
}

/// Catalog-side media category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment used by the catalog API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    /// Local media type a hit of this kind becomes by default.
    pub fn default_media_type(&self) -> MediaType {
        match self {
            Self::Movie => MediaType::Movie,
            Self::Tv => MediaType::Series,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search hit. Movie `title`/`release_date` and TV `name`/`first_air_date`
/// are unified into `title`/`release_date`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchResult {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub overview: String,
    pub release_date: Option<String>,
    pub media_kind: MediaKind,
    pub vote_average: f32,
}

/// Details used to pre-fill the add form.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MediaDetails {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub vote_average: f32,
    pub number_of_seasons: Option<u32>,
    pub in_production: Option<bool>,
}

/// Search, logging and swallowing any failure.
pub async fn search_or_empty<S: MetadataService>(service: &S, query: &str) -> Vec<SearchResult> {
    match service.search(query).await {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(query, error = %e, "Metadata search failed");
            Vec::new()
        }
    }
}

/// Detail lookup, logging and swallowing any failure.
pub async fn details_or_none<S: MetadataService>(
    service: &S,
    id: u64,
    kind: MediaKind,
) -> Option<MediaDetails> {
    match service.get_details(id, kind).await {
        Ok(details) => Some(details),
        Err(e) => {
            tracing::warn!(id, %kind, error = %e, "Metadata detail lookup failed");
            None
        }
    }
}
