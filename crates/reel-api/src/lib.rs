pub mod error;
pub mod prefill;
pub mod session;
pub mod tmdb;
pub mod traits;

pub use error::ApiError;
pub use session::{SearchOutcome, SearchSession};
pub use tmdb::TmdbClient;
