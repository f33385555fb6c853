use thiserror::Error;

/// Errors from the metadata lookup client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no TMDB token configured (set [search] tmdb_token or TMDB_TOKEN)")]
    MissingToken,
}
