use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReelError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("import failed: {0}")]
    Import(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("not enough data for statistics: have {have} items, need {need}")]
    NotEnoughData { have: usize, need: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
