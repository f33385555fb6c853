//! Command handlers. Each returns the text to print on success.

use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use reel_api::prefill;
use reel_api::traits::{details_or_none, search_or_empty};
use reel_api::{SearchSession, TmdbClient};
use reel_core::config::AppConfig;
use reel_core::filter::{MediaFilter, RatingRange};
use reel_core::library::Library;
use reel_core::models::{MediaItem, NewMedia, Season, Tag};
use reel_core::stats::LibraryStatistics;
use reel_core::transfer;

use crate::cli::{
    AddArgs, AddFromArgs, ConfigCommand, EditArgs, ExportArgs, ListArgs, SeasonArgs, TagCommand,
};
use crate::error::CliError;
use crate::{render, resolve};

// ── Browsing ────────────────────────────────────────────────────

pub fn build_filter(library: &Library, args: &ListArgs) -> Result<MediaFilter, CliError> {
    if args.min > args.max {
        return Err(CliError::Invalid(format!(
            "--min {} is above --max {}",
            args.min, args.max
        )));
    }
    Ok(MediaFilter {
        media_type: args.media_type,
        query: args.query.clone(),
        favorites_only: args.favorites,
        tags: resolve::tag_ids(library, &args.tags)?,
        rating: RatingRange::new(args.min, args.max),
    })
}

pub fn list(library: &Library, args: &ListArgs) -> Result<String, CliError> {
    let filter = build_filter(library, args)?;
    let items = library.filtered(&filter);
    if args.json {
        return Ok(serde_json::to_string_pretty(&items)?);
    }
    if items.is_empty() {
        return Ok(if filter.is_active() {
            "No items match the filter.".into()
        } else {
            "The collection is empty. Add something with `reel add`.".into()
        });
    }
    let mut lines: Vec<String> = items.iter().map(|m| render::media_line(m)).collect();
    lines.push(format!("\n{} of {} items", items.len(), library.all_media().len()));
    Ok(lines.join("\n"))
}

pub fn show(library: &Library, id: &str) -> Result<String, CliError> {
    Ok(render::media_detail(resolve::media(library, id)?))
}

// ── Editing ─────────────────────────────────────────────────────

fn attach_tags(library: &Library, queries: &[String]) -> Result<Vec<Tag>, CliError> {
    queries
        .iter()
        .map(|q| resolve::tag(library, q).cloned())
        .collect()
}

pub fn add(library: &mut Library, args: AddArgs) -> Result<String, CliError> {
    let mut data = NewMedia::new(args.media_type, args.title);
    data.description = args.description;
    data.image_url = args.image;
    data.rating = args.rating;
    data.is_favorite = args.favorite;
    if args.media_type.has_seasons() {
        data.in_emission = args.in_emission;
        data.seasons = Season::numbered(args.seasons.max(1));
    }
    data.tags = attach_tags(library, &args.tags)?;

    let item = library.add_media(data)?;
    Ok(format!("Added {} ({})", item.title, render::short_id(&item.id)))
}

/// Catalog payload for `add-from`, or `None` when the catalog is unavailable.
async fn catalog_payload(config: &AppConfig, args: &AddFromArgs) -> Option<NewMedia> {
    let client = match TmdbClient::from_config(&config.search) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "Metadata catalog unavailable");
            return None;
        }
    };
    let media_type = args
        .media_type
        .unwrap_or_else(|| args.kind.default_media_type());
    let details = details_or_none(&client, args.catalog_id, args.kind).await?;
    Some(prefill::new_media_from_details(&details, media_type))
}

pub async fn add_from(
    library: &mut Library,
    config: &AppConfig,
    args: AddFromArgs,
) -> Result<String, CliError> {
    let mut data = match (catalog_payload(config, &args).await, &args.title) {
        (Some(data), _) => data,
        (None, Some(title)) => {
            let media_type = args
                .media_type
                .unwrap_or_else(|| args.kind.default_media_type());
            let mut data = NewMedia::new(media_type, title.clone());
            if media_type.has_seasons() {
                data.seasons = Season::numbered(1);
            }
            data
        }
        (None, None) => {
            return Err(CliError::Invalid(
                "catalog lookup failed; pass --title to add the item by hand".into(),
            ))
        }
    };
    data.tags = attach_tags(library, &args.tags)?;

    let item = library.add_media(data)?;
    Ok(format!("Added {} ({})", item.title, render::short_id(&item.id)))
}

/// Grow or shrink the season list. Existing seasons keep their progress.
pub fn resize_seasons(seasons: &mut Vec<Season>, count: u32) {
    let count = count as usize;
    if seasons.len() > count {
        seasons.truncate(count);
        return;
    }
    let next = seasons.iter().map(|s| s.number).max().unwrap_or(0);
    let missing = (count - seasons.len()) as u32;
    seasons.extend((next + 1..=next + missing).map(Season::new));
}

pub fn edit(library: &mut Library, args: EditArgs) -> Result<String, CliError> {
    let mut item: MediaItem = resolve::media(library, &args.id)?.clone();
    if let Some(title) = args.title {
        if title.trim().is_empty() {
            return Err(CliError::Invalid("title cannot be empty".into()));
        }
        item.title = title;
    }
    if let Some(description) = args.description {
        item.description = description;
    }
    if let Some(image) = args.image {
        item.image_url = image;
    }
    if args.unrate {
        item.rating = None;
    } else if let Some(rating) = args.rating {
        item.rating = Some(rating);
    }
    if let Some(in_emission) = args.in_emission {
        item.in_emission = in_emission;
    }
    if let Some(count) = args.seasons {
        if !item.media_type.has_seasons() {
            return Err(CliError::Invalid("movies do not have seasons".into()));
        }
        resize_seasons(&mut item.seasons, count);
    }

    let title = item.title.clone();
    library.update_media(item)?;
    Ok(format!("Updated {title}"))
}

pub fn delete(library: &mut Library, id: &str) -> Result<String, CliError> {
    let item = resolve::media(library, id)?;
    let (id, title) = (item.id.clone(), item.title.clone());
    library.delete_media(&id)?;
    Ok(format!("Deleted {title}"))
}

pub fn favorite(library: &mut Library, id: &str) -> Result<String, CliError> {
    let id = resolve::media(library, id)?.id.clone();
    library.toggle_favorite(&id)?;
    let item = resolve::media(library, &id)?;
    Ok(if item.is_favorite {
        format!("{} is now a favorite", item.title)
    } else {
        format!("{} is no longer a favorite", item.title)
    })
}

pub fn season(library: &mut Library, args: SeasonArgs) -> Result<String, CliError> {
    let item = resolve::media(library, &args.id)?;
    let Some(current) = item.season(args.number) else {
        return Err(CliError::NotFound {
            kind: "season",
            query: args.number.to_string(),
        });
    };

    let (completed, in_progress) = if args.done {
        (true, false)
    } else if args.watching {
        (false, true)
    } else if args.todo {
        (false, false)
    } else {
        (current.completed, current.in_progress)
    };

    let id = item.id.clone();
    library.update_season_status(&id, args.number, completed, in_progress, args.rate)?;

    let item = resolve::media(library, &id)?;
    Ok(match item.season(args.number) {
        Some(season) => format!("{}\n{}", item.title, render::season_line(season)),
        None => item.title.clone(),
    })
}

pub fn tag(library: &mut Library, command: TagCommand) -> Result<String, CliError> {
    match command {
        TagCommand::List => {
            if library.all_tags().is_empty() {
                return Ok("No tags yet. Create one with `reel tag add <name>`.".into());
            }
            let lines: Vec<String> = library
                .all_tags()
                .iter()
                .map(|tag| {
                    let uses = library
                        .all_media()
                        .iter()
                        .filter(|m| m.has_tag(&tag.id))
                        .count();
                    render::tag_line(tag, uses)
                })
                .collect();
            Ok(lines.join("\n"))
        }
        TagCommand::Add { name, color } => {
            if name.trim().is_empty() {
                return Err(CliError::Invalid("tag name cannot be empty".into()));
            }
            let tag = library.add_tag(name.trim(), &color)?;
            Ok(format!("Created tag {} ({})", tag.name, render::short_id(&tag.id)))
        }
        TagCommand::Update { tag, name, color } => {
            let mut updated = resolve::tag(library, &tag)?.clone();
            if let Some(name) = name {
                updated.name = name;
            }
            if let Some(color) = color {
                updated.color = color;
            }
            let name = updated.name.clone();
            library.update_tag(updated)?;
            Ok(format!("Updated tag {name}"))
        }
        TagCommand::Delete { tag } => {
            let tag = resolve::tag(library, &tag)?.clone();
            library.delete_tag(&tag.id)?;
            Ok(format!("Deleted tag {}", tag.name))
        }
        TagCommand::Attach { media, tag } => {
            let media_id = resolve::media(library, &media)?.id.clone();
            let tag = resolve::tag(library, &tag)?.clone();
            library.add_tag_to_media(&media_id, &tag.id)?;
            Ok(format!("Tagged with {}", tag.name))
        }
        TagCommand::Detach { media, tag } => {
            let media_id = resolve::media(library, &media)?.id.clone();
            let tag = resolve::tag(library, &tag)?.clone();
            library.remove_tag_from_media(&media_id, &tag.id)?;
            Ok(format!("Removed tag {}", tag.name))
        }
    }
}

// ── Insights & transfer ─────────────────────────────────────────

pub fn stats(library: &Library, config: &AppConfig, json: bool) -> Result<String, CliError> {
    let stats = LibraryStatistics::compute(library.all_media(), library.all_tags(), &config.stats)?;
    if json {
        return Ok(serde_json::to_string_pretty(&stats)?);
    }
    Ok(render::statistics(&stats))
}

pub fn export(library: &Library, args: ExportArgs) -> Result<String, CliError> {
    let ids: Vec<String> = if args.all {
        library.all_media().iter().map(|m| m.id.clone()).collect()
    } else {
        args.ids
            .iter()
            .map(|q| resolve::media(library, q).map(|m| m.id.clone()))
            .collect::<Result<_, _>>()?
    };
    let json = library.export_media(&ids)?;

    let name = args
        .name
        .unwrap_or_else(|| transfer::default_export_name(chrono::Local::now().date_naive()));
    let path = args.dir.join(transfer::export_file_name(&name));
    std::fs::write(&path, json)?;
    tracing::info!(path = %path.display(), count = ids.len(), "Exported media");
    Ok(format!("Exported {} items to {}", ids.len(), path.display()))
}

pub fn import(library: &mut Library, file: &Path) -> Result<String, CliError> {
    let json = std::fs::read_to_string(file)?;
    let count = library.import_media(&json)?;
    Ok(format!("Imported {count} items"))
}

// ── Catalog ─────────────────────────────────────────────────────

pub async fn lookup(config: &AppConfig, query: &str) -> Result<String, CliError> {
    let client = TmdbClient::from_config(&config.search)?;
    let results = search_or_empty(&client, query).await;
    if results.is_empty() {
        return Ok(format!("No results for '{query}'"));
    }
    Ok(results
        .iter()
        .map(render::search_line)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Interactive search: each stdin line replaces the query, an empty line
/// clears it. Results print as they arrive.
pub async fn search(config: &AppConfig) -> Result<String, CliError> {
    let client = Arc::new(TmdbClient::from_config(&config.search)?);
    let mut session = SearchSession::from_config(client, &config.search);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("Type to search, empty line to clear, Ctrl-D to quit.");
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim().is_empty() => session.clear(),
                    Some(line) => {
                        session.submit(&line);
                    }
                    None => break,
                }
            }
            Some(outcome) = session.recv() => {
                println!("── {} ──", outcome.query);
                if outcome.results.is_empty() {
                    println!("(no results)");
                }
                for result in &outcome.results {
                    println!("{}", render::search_line(result));
                }
            }
        }
    }
    Ok(String::new())
}

// ── Config ──────────────────────────────────────────────────────

/// `explicit` is the `--config` path, if one was given.
pub fn config(
    config: &AppConfig,
    explicit: Option<&Path>,
    command: ConfigCommand,
) -> Result<String, CliError> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);
    match command {
        ConfigCommand::Path => Ok(format!(
            "config:   {}\ndatabase: {}",
            path.display(),
            config.db_path().display()
        )),
        ConfigCommand::Show => {
            let mut shown = config.clone();
            if shown.search.tmdb_token.is_some() {
                shown.search.tmdb_token = Some("********".into());
            }
            toml::to_string_pretty(&shown).map_err(|e| CliError::Invalid(e.to_string()))
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::Invalid(format!(
                    "{} already exists; pass --force to overwrite it",
                    path.display()
                )));
            }
            let defaults = AppConfig::default();
            match explicit {
                Some(path) => defaults.save_to(path)?,
                None => defaults.save()?,
            }
            tracing::info!(path = %path.display(), "Wrote default config");
            Ok(format!("Wrote {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::models::MediaType;
    use reel_core::storage::MemoryStore;

    fn library() -> Library {
        let mut library = Library::open(MemoryStore::new());
        let comfy = library.add_tag("Comfy", "#10B981").unwrap();
        let mut dark = NewMedia::new(MediaType::Series, "Dark");
        dark.rating = Some(9.0);
        dark.seasons = Season::numbered(3);
        dark.tags = vec![comfy];
        library.add_media(dark).unwrap();
        library
            .add_media(NewMedia::new(MediaType::Movie, "Heat"))
            .unwrap();
        library
    }

    fn add_args(title: &str) -> AddArgs {
        AddArgs {
            media_type: MediaType::Anime,
            title: title.into(),
            description: String::new(),
            image: String::new(),
            rating: Some(8.0),
            seasons: 2,
            in_emission: true,
            favorite: false,
            tags: vec!["comfy".into()],
        }
    }

    #[test]
    fn test_resize_seasons() {
        let mut seasons = Season::numbered(2);
        seasons[1].set_completed(true);
        resize_seasons(&mut seasons, 4);
        assert_eq!(seasons.len(), 4);
        assert_eq!(seasons[3].number, 4);
        assert!(seasons[1].completed);

        resize_seasons(&mut seasons, 1);
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].number, 1);
    }

    #[test]
    fn test_build_filter_resolves_tags() {
        let library = library();
        let args = ListArgs {
            tags: vec!["comfy".into()],
            max: 10.0,
            ..Default::default()
        };
        let filter = build_filter(&library, &args).unwrap();
        assert_eq!(filter.tags, [library.all_tags()[0].id.clone()]);
        assert_eq!(library.filtered(&filter).len(), 1);
    }

    #[test]
    fn test_build_filter_rejects_inverted_range() {
        let library = library();
        let args = ListArgs {
            min: 8.0,
            max: 3.0,
            ..Default::default()
        };
        assert!(matches!(
            build_filter(&library, &args),
            Err(CliError::Invalid(_))
        ));
    }

    #[test]
    fn test_add_attaches_tags_and_seasons() {
        let mut library = library();
        add(&mut library, add_args("Frieren")).unwrap();
        let item = resolve::media(&library, "frieren").unwrap();
        assert_eq!(item.seasons.len(), 2);
        assert!(item.in_emission);
        assert_eq!(item.tags[0].name, "Comfy");
    }

    #[test]
    fn test_add_with_unknown_tag_adds_nothing() {
        let mut library = library();
        let mut args = add_args("Frieren");
        args.tags = vec!["missing".into()];
        assert!(add(&mut library, args).is_err());
        assert_eq!(library.all_media().len(), 2);
    }

    #[test]
    fn test_season_flags_and_rating_toggle() {
        let mut library = library();
        let args = |rate| SeasonArgs {
            id: "dark".into(),
            number: 2,
            done: true,
            watching: false,
            todo: false,
            rate,
        };
        season(&mut library, args(Some(reel_core::models::SeasonRating::Good))).unwrap();
        let s = resolve::media(&library, "dark").unwrap().season(2).unwrap().clone();
        assert!(s.completed);
        assert_eq!(s.rating, Some(reel_core::models::SeasonRating::Good));

        season(&mut library, args(Some(reel_core::models::SeasonRating::Good))).unwrap();
        let s = resolve::media(&library, "dark").unwrap().season(2).unwrap().clone();
        assert_eq!(s.rating, None);
    }

    #[test]
    fn test_season_out_of_range() {
        let mut library = library();
        let args = SeasonArgs {
            id: "dark".into(),
            number: 9,
            done: true,
            watching: false,
            todo: false,
            rate: None,
        };
        assert!(matches!(
            season(&mut library, args),
            Err(CliError::NotFound { kind: "season", .. })
        ));
    }

    #[test]
    fn test_edit_clears_rating() {
        let mut library = library();
        edit(
            &mut library,
            EditArgs {
                id: "dark".into(),
                title: None,
                description: Some("Time travel".into()),
                image: None,
                rating: None,
                unrate: true,
                in_emission: None,
                seasons: Some(4),
            },
        )
        .unwrap();
        let item = resolve::media(&library, "dark").unwrap();
        assert_eq!(item.rating, None);
        assert_eq!(item.description, "Time travel");
        assert_eq!(item.seasons.len(), 4);
    }

    #[test]
    fn test_stats_needs_three_items() {
        let library = library();
        let err = stats(&library, &AppConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("3"));
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = library();
        let message = export(
            &library,
            ExportArgs {
                ids: Vec::new(),
                all: true,
                name: Some("backup".into()),
                dir: dir.path().to_path_buf(),
            },
        )
        .unwrap();
        assert!(message.starts_with("Exported 2 items"));

        let file = dir.path().join("backup.json");
        assert_eq!(import(&mut library, &file).unwrap(), "Imported 2 items");
        assert_eq!(library.all_media().len(), 4);
    }

    #[test]
    fn test_tag_rename_reaches_items() {
        let mut library = library();
        tag(
            &mut library,
            TagCommand::Update {
                tag: "comfy".into(),
                name: Some("Cozy".into()),
                color: None,
            },
        )
        .unwrap();
        let item = resolve::media(&library, "dark").unwrap();
        assert_eq!(item.tags[0].name, "Cozy");
    }

    #[test]
    fn test_config_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reel").join("config.toml");
        let config = AppConfig::default();

        let message = super::config(&config, Some(&path), ConfigCommand::Init { force: false })
            .unwrap();
        assert!(message.starts_with("Wrote"));
        let written = AppConfig::load_from(&path).unwrap();
        assert_eq!(written.search.min_query_len, config.search.min_query_len);

        assert!(matches!(
            super::config(&config, Some(&path), ConfigCommand::Init { force: false }),
            Err(CliError::Invalid(_))
        ));
        assert!(super::config(&config, Some(&path), ConfigCommand::Init { force: true }).is_ok());
    }

    #[test]
    fn test_config_show_masks_token() {
        let mut config = AppConfig::default();
        config.search.tmdb_token = Some("secret".into());
        let shown = super::config(&config, None, ConfigCommand::Show).unwrap();
        assert!(!shown.contains("secret"));
        assert!(shown.contains("********"));
    }
}
