//! Turn catalog lookups into add-form payloads.

use reel_core::models::{MediaType, NewMedia, Season};

use crate::tmdb::image_url;
use crate::traits::{MediaDetails, SearchResult};

const POSTER_SIZE: &str = "w500";

/// Snap a catalog vote average onto the 0–10 half-point scale.
/// A zero average means "no votes" and maps to unrated.
pub fn snap_rating(vote_average: f32) -> Option<f32> {
    if !vote_average.is_finite() || vote_average <= 0.0 {
        return None;
    }
    Some(((vote_average * 2.0).round() / 2.0).clamp(0.0, 10.0))
}

/// Payload from a full detail lookup. Series and anime get
/// `number_of_seasons` seasons (at least one); movies get none.
pub fn new_media_from_details(details: &MediaDetails, media_type: MediaType) -> NewMedia {
    let mut data = NewMedia::new(media_type, details.title.clone());
    data.description = details.overview.clone();
    data.image_url = image_url(details.poster_path.as_deref(), POSTER_SIZE);
    data.rating = snap_rating(details.vote_average);
    if media_type.has_seasons() {
        data.in_emission = details.in_production.unwrap_or(false);
        data.seasons = Season::numbered(details.number_of_seasons.unwrap_or(1).max(1));
    }
    data
}

/// Payload from a bare search hit, used when the detail lookup fails.
pub fn new_media_from_result(result: &SearchResult, media_type: MediaType) -> NewMedia {
    let mut data = NewMedia::new(media_type, result.title.clone());
    data.description = result.overview.clone();
    data.image_url = image_url(result.poster_path.as_deref(), POSTER_SIZE);
    data.rating = snap_rating(result.vote_average);
    if media_type.has_seasons() {
        data.seasons = Season::numbered(1);
    }
    data
}
