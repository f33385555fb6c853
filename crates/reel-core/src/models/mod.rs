mod media;
mod tag;

pub use media::{MediaItem, MediaType, NewMedia, Season, SeasonRating};
pub use tag::Tag;
