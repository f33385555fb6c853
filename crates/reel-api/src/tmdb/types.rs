use serde::Deserialize;

use crate::traits::{MediaDetails, MediaKind, SearchResult};

// ── Search responses ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TmdbSearchResponse {
    pub results: Vec<TmdbSearchItem>,
}

/// One `/search/multi` hit. People and other kinds share the list, so
/// everything except `id` and `media_type` is optional.
#[derive(Debug, Deserialize)]
pub struct TmdbSearchItem {
    pub id: u64,
    pub media_type: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f32>,
}

impl TmdbSearchItem {
    /// Convert movie and TV hits; anything else yields `None`.
    pub fn into_search_result(self) -> Option<SearchResult> {
        let media_kind = match self.media_type.as_str() {
            "movie" => MediaKind::Movie,
            "tv" => MediaKind::Tv,
            _ => return None,
        };
        Some(SearchResult {
            id: self.id,
            title: self.title.or(self.name).unwrap_or_default(),
            poster_path: self.poster_path,
            overview: self.overview.unwrap_or_default(),
            release_date: self.release_date.or(self.first_air_date),
            media_kind,
            vote_average: self.vote_average.unwrap_or_default(),
        })
    }
}

// ── Detail responses ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TmdbDetails {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f32>,
    pub number_of_seasons: Option<u32>,
    pub in_production: Option<bool>,
}

impl TmdbDetails {
    pub fn into_media_details(self) -> MediaDetails {
        MediaDetails {
            id: self.id,
            title: self.title.or(self.name).unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            poster_path: self.poster_path,
            vote_average: self.vote_average.unwrap_or_default(),
            number_of_seasons: self.number_of_seasons,
            in_production: self.in_production,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_multi_keeps_movies_and_tv() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": 1, "media_type": "movie", "title": "Heat", "poster_path": "/heat.jpg",
                 "overview": "Cops and robbers", "release_date": "1995-12-15", "vote_average": 7.9},
                {"id": 2, "media_type": "tv", "name": "Dark", "poster_path": null,
                 "overview": "", "first_air_date": "2017-12-01", "vote_average": 8.4},
                {"id": 3, "media_type": "person", "name": "Al Pacino"}
            ],
            "total_results": 3,
            "total_pages": 1
        }"#;
        let resp: TmdbSearchResponse = serde_json::from_str(json).unwrap();
        let results: Vec<SearchResult> = resp
            .results
            .into_iter()
            .filter_map(TmdbSearchItem::into_search_result)
            .collect();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Heat");
        assert_eq!(results[0].media_kind, MediaKind::Movie);
        assert_eq!(results[1].title, "Dark");
        assert_eq!(results[1].release_date.as_deref(), Some("2017-12-01"));
        assert_eq!(results[1].poster_path, None);
    }

    #[test]
    fn test_tv_details() {
        let json = r#"{
            "id": 70523, "name": "Dark", "overview": "A missing child...",
            "poster_path": "/dark.jpg", "vote_average": 8.4,
            "number_of_seasons": 3, "in_production": false,
            "genres": [{"id": 18, "name": "Drama"}], "status": "Ended"
        }"#;
        let details: TmdbDetails = serde_json::from_str(json).unwrap();
        let details = details.into_media_details();
        assert_eq!(details.title, "Dark");
        assert_eq!(details.number_of_seasons, Some(3));
        assert_eq!(details.in_production, Some(false));
    }
}
