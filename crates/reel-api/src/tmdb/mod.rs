pub mod client;
pub mod types;

pub use client::{image_url, TmdbClient};
