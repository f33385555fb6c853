//! Plain-text output.

use std::fmt::Write;

use reel_api::traits::SearchResult;
use reel_core::models::{MediaItem, Season, Tag};
use reel_core::stats::LibraryStatistics;

const SHORT_ID: usize = 8;
const BAR_WIDTH: usize = 30;

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID).unwrap_or(id)
}

pub fn rating(rating: Option<f32>) -> String {
    match rating {
        Some(r) => format!("{r:.1}"),
        None => "-".into(),
    }
}

fn tag_names(tags: &[Tag]) -> String {
    tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
}

/// One line per item: id, type, rating, favorite mark, title, progress.
pub fn media_line(item: &MediaItem) -> String {
    let mut line = format!(
        "{:<8}  {:<6}  {:>4}  {} {}",
        short_id(&item.id),
        item.media_type.as_str(),
        rating(item.rating),
        if item.is_favorite { "*" } else { " " },
        item.title,
    );
    if item.media_type.has_seasons() && !item.seasons.is_empty() {
        let _ = write!(line, "  [{}/{}]", item.completed_seasons(), item.seasons.len());
    }
    if !item.tags.is_empty() {
        let _ = write!(line, "  #{}", tag_names(&item.tags));
    }
    line
}

pub fn season_line(season: &Season) -> String {
    let status = if season.completed {
        "done"
    } else if season.in_progress {
        "watching"
    } else {
        "todo"
    };
    let title = season.title.as_deref().unwrap_or("");
    match season.rating {
        Some(r) => format!("  {:>3}. {title:<20} {status:<8} {r}", season.number),
        None => format!("  {:>3}. {title:<20} {status}", season.number),
    }
}

pub fn media_detail(item: &MediaItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", item.title, item.media_type.label());
    let _ = writeln!(out, "id:        {}", item.id);
    let _ = writeln!(out, "rating:    {}", rating(item.rating));
    let _ = writeln!(out, "favorite:  {}", if item.is_favorite { "yes" } else { "no" });
    if item.media_type.has_seasons() {
        let _ = writeln!(out, "airing:    {}", if item.in_emission { "yes" } else { "no" });
    }
    let _ = writeln!(out, "added:     {}", item.date_added.format("%Y-%m-%d"));
    if !item.tags.is_empty() {
        let _ = writeln!(out, "tags:      {}", tag_names(&item.tags));
    }
    if !item.image_url.is_empty() {
        let _ = writeln!(out, "image:     {}", item.image_url);
    }
    if !item.description.is_empty() {
        let _ = writeln!(out, "\n{}", item.description);
    }
    if !item.seasons.is_empty() {
        let _ = writeln!(out, "\nseasons:");
        for season in &item.seasons {
            let _ = writeln!(out, "{}", season_line(season));
        }
    }
    out
}

pub fn tag_line(tag: &Tag, uses: usize) -> String {
    format!("{:<8}  {:<8}  {} ({uses})", short_id(&tag.id), tag.color, tag.name)
}

pub fn search_line(result: &SearchResult) -> String {
    let year = result
        .release_date
        .as_deref()
        .and_then(|d| d.get(..4))
        .unwrap_or("----");
    format!(
        "{:>8}  {:<5}  {year}  {:>4.1}  {}",
        result.id,
        result.media_kind.as_str(),
        result.vote_average,
        result.title
    )
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "#".repeat((count * BAR_WIDTH).div_ceil(max))
}

pub fn statistics(stats: &LibraryStatistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} items", stats.total);

    let _ = writeln!(out, "\nBy type");
    for t in &stats.types {
        let _ = writeln!(out, "  {:<8} {:>4}", t.media_type.label(), t.count);
    }

    let _ = writeln!(
        out,
        "\nFavorites  {} favorite / {} other",
        stats.favorites.favorites, stats.favorites.others
    );

    let _ = writeln!(out, "\nRatings");
    let max = stats.ratings.iter().map(|b| b.count).max().unwrap_or(0);
    for bucket in &stats.ratings {
        let _ = writeln!(
            out,
            "  {:<6} {:>4}  {}",
            bucket.label(),
            bucket.count,
            bar(bucket.count, max)
        );
    }

    if !stats.tags.is_empty() {
        let _ = writeln!(out, "\nTags");
        for t in &stats.tags {
            let _ = writeln!(out, "  {:<16} {:>4}", t.tag.name, t.count);
        }
    }

    let s = &stats.season_ratings;
    let _ = writeln!(
        out,
        "\nSeasons  {} good / {} bad / {} unrated",
        s.good, s.bad, s.unrated
    );

    let _ = writeln!(out, "\nAdded per month");
    let max = stats.timeline.iter().map(|m| m.count).max().unwrap_or(0);
    for month in &stats.timeline {
        let _ = writeln!(
            out,
            "  {:<8} {:>4}  {}",
            month.label(),
            month.count,
            bar(month.count, max)
        );
    }

    if !stats.top_rated.is_empty() {
        let _ = writeln!(out, "\nTop rated");
        for (rank, entry) in stats.top_rated.iter().enumerate() {
            let _ = writeln!(out, "  {}. {:.1}  {}", rank + 1, entry.rating, entry.title);
        }
    }

    if !stats.completion.is_empty() {
        let _ = writeln!(out, "\nCompletion");
        for entry in &stats.completion {
            let _ = writeln!(
                out,
                "  {:>3}%  {}/{}  {}",
                entry.percent, entry.completed, entry.total, entry.title
            );
        }
    }
    out
}
