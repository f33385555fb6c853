use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] reel_core::error::ReelError),

    #[error(transparent)]
    Api(#[from] reel_api::ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no {kind} matches '{query}'")]
    NotFound { kind: &'static str, query: String },

    #[error("'{query}' matches more than one {kind}; use a longer id")]
    Ambiguous { kind: &'static str, query: String },

    #[error("{0}")]
    Invalid(String),
}
