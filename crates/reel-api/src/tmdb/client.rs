use reqwest::Client;

use reel_core::config::SearchConfig;

use super::types::{TmdbDetails, TmdbSearchItem, TmdbSearchResponse};
use crate::error::ApiError;
use crate::session::DEFAULT_MIN_QUERY_LEN;
use crate::traits::{MediaDetails, MediaKind, MetadataService, SearchResult};

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
const PLACEHOLDER_IMAGE: &str = "https://images.unsplash.com/photo-1526374965328-7f61d4dc18c5";

/// Environment variable consulted when the config has no token.
pub const TOKEN_ENV: &str = "TMDB_TOKEN";

/// Poster URL for a TMDB image path at the given size (e.g. `w500`, `w92`).
pub fn image_url(path: Option<&str>, size: &str) -> String {
    match path {
        Some(path) if !path.is_empty() => format!("{IMAGE_BASE}/{size}{path}"),
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}

/// TMDB v3 client authenticated with a read access token.
pub struct TmdbClient {
    token: String,
    base_url: String,
    language: String,
    min_query_len: usize,
    http: Client,
}

impl TmdbClient {
    pub fn new(token: String) -> Self {
        Self {
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "en-US".to_string(),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            http: Client::new(),
        }
    }

    /// Build from `[search]` config, falling back to `TMDB_TOKEN`.
    pub fn from_config(config: &SearchConfig) -> Result<Self, ApiError> {
        let token = config
            .tmdb_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()))
            .ok_or(ApiError::MissingToken)?;
        Ok(Self::new(token)
            .with_base_url(&config.base_url)
            .with_language(&config.language)
            .with_min_query_len(config.min_query_len))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Queries shorter than this (after trimming) return no hits without a request.
    pub fn with_min_query_len(mut self, min_query_len: usize) -> Self {
        self.min_query_len = min_query_len;
        self
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Check the HTTP response for errors and return the body text on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "TMDB API error");
            Err(ApiError::Api {
                status,
                message: body,
            })
        }
    }
}

impl MetadataService for TmdbClient {
    type Error = ApiError;

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        let query = query.trim();
        if query.is_empty() || query.chars().count() < self.min_query_len {
            tracing::debug!(query, "Query too short, skipping TMDB search");
            return Ok(Vec::new());
        }

        let resp = self
            .http
            .get(format!("{}/search/multi", self.base_url))
            .header("Authorization", self.auth_header())
            .query(&[
                ("query", query),
                ("include_adult", "false"),
                ("language", self.language.as_str()),
            ])
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let search: TmdbSearchResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        let results: Vec<SearchResult> = search
            .results
            .into_iter()
            .filter_map(TmdbSearchItem::into_search_result)
            .collect();
        tracing::debug!(query, hits = results.len(), "TMDB search");
        Ok(results)
    }

    async fn get_details(&self, id: u64, kind: MediaKind) -> Result<MediaDetails, ApiError> {
        let resp = self
            .http
            .get(format!("{}/{}/{id}", self.base_url, kind.as_str()))
            .header("Authorization", self.auth_header())
            .query(&[("language", self.language.as_str())])
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let details: TmdbDetails = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(details.into_media_details())
    }
}
