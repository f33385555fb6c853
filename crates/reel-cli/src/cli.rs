use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use reel_api::traits::MediaKind;
use reel_core::models::{MediaType, SeasonRating};

#[derive(Parser, Debug)]
#[command(name = "reel", version, about = "Track the series, movies and anime you watch", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overriding `[storage] db_path`.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the collection, optionally filtered.
    List(ListArgs),
    /// Show one item with its seasons.
    Show { id: String },
    /// Add an item by hand.
    Add(AddArgs),
    /// Add an item pre-filled from the metadata catalog.
    AddFrom(AddFromArgs),
    /// Edit fields of an item.
    Edit(EditArgs),
    /// Delete an item.
    Delete { id: String },
    /// Toggle the favorite flag.
    Fav { id: String },
    /// Update a season's progress or rating.
    Season(SeasonArgs),
    /// Manage tags.
    #[command(subcommand)]
    Tag(TagCommand),
    /// Collection statistics.
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Export items to a JSON file.
    Export(ExportArgs),
    /// Import items from an export file.
    Import { file: PathBuf },
    /// Search the metadata catalog once.
    Lookup { query: String },
    /// Search-as-you-type: one query per stdin line, empty line clears.
    Search,
    /// Inspect configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long = "type", short = 't')]
    pub media_type: Option<MediaType>,
    /// Case-insensitive text in title or description.
    #[arg(long, short)]
    pub query: Option<String>,
    #[arg(long)]
    pub favorites: bool,
    /// Tag id or name; repeat to require several tags.
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long, value_parser = parse_rating, default_value_t = 0.0)]
    pub min: f32,
    #[arg(long, value_parser = parse_rating, default_value_t = 10.0)]
    pub max: f32,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long = "type", short = 't')]
    pub media_type: MediaType,
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub image: String,
    #[arg(long, value_parser = parse_rating)]
    pub rating: Option<f32>,
    /// Number of seasons (ignored for movies).
    #[arg(long, default_value_t = 1)]
    pub seasons: u32,
    #[arg(long)]
    pub in_emission: bool,
    #[arg(long)]
    pub favorite: bool,
    /// Tag id or name to attach.
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Args, Debug)]
pub struct AddFromArgs {
    /// Catalog id from `reel lookup`.
    pub catalog_id: u64,
    #[arg(long, value_parser = parse_kind)]
    pub kind: MediaKind,
    /// Local type; defaults to series for tv and movie for movies.
    #[arg(long = "type", short = 't')]
    pub media_type: Option<MediaType>,
    /// Title to use if the catalog cannot be reached.
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
    #[arg(long, value_parser = parse_rating, conflicts_with = "unrate")]
    pub rating: Option<f32>,
    #[arg(long)]
    pub unrate: bool,
    #[arg(long)]
    pub in_emission: Option<bool>,
    /// Resize the season list; new seasons start unwatched.
    #[arg(long)]
    pub seasons: Option<u32>,
}

#[derive(Args, Debug)]
pub struct SeasonArgs {
    pub id: String,
    pub number: u32,
    /// Mark completed.
    #[arg(long, conflicts_with_all = ["watching", "todo"])]
    pub done: bool,
    /// Mark in progress.
    #[arg(long, conflicts_with = "todo")]
    pub watching: bool,
    /// Mark neither completed nor in progress.
    #[arg(long)]
    pub todo: bool,
    /// Rate the season; rating it the same way again clears it.
    #[arg(long)]
    pub rate: Option<SeasonRating>,
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    List,
    Add {
        name: String,
        #[arg(default_value = "#6B7280")]
        color: String,
    },
    Update {
        tag: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    Delete {
        tag: String,
    },
    Attach {
        media: String,
        tag: String,
    },
    Detach {
        media: String,
        tag: String,
    },
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Item ids to export.
    pub ids: Vec<String>,
    /// Export the whole collection.
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
    /// File name without extension; defaults to `mediatracker-export-<date>`.
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Print the config and database locations.
    Path,
    /// Write the default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Ratings are 0–10 in half-point steps.
pub fn parse_rating(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if !(0.0..=10.0).contains(&value) {
        return Err("rating must be between 0 and 10".into());
    }
    if (value * 2.0).fract() != 0.0 {
        return Err("rating must be a multiple of 0.5".into());
    }
    Ok(value)
}

fn parse_kind(s: &str) -> Result<MediaKind, String> {
    match s.trim().to_lowercase().as_str() {
        "movie" => Ok(MediaKind::Movie),
        "tv" => Ok(MediaKind::Tv),
        other => Err(format!("unknown catalog kind '{other}' (expected movie or tv)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("7.5"), Ok(7.5));
        assert_eq!(parse_rating("0"), Ok(0.0));
        assert!(parse_rating("7.3").is_err());
        assert!(parse_rating("11").is_err());
        assert!(parse_rating("great").is_err());
    }

    #[test]
    fn test_cli_parses_list_filters() {
        let cli = Cli::try_parse_from([
            "reel", "list", "--type", "anime", "--tag", "Comfy", "--tag", "Rewatch", "--min", "6",
        ])
        .unwrap();
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.media_type, Some(MediaType::Anime));
        assert_eq!(args.tags, ["Comfy", "Rewatch"]);
        assert_eq!(args.min, 6.0);
        assert_eq!(args.max, 10.0);
    }

    #[test]
    fn test_season_flags_conflict() {
        assert!(Cli::try_parse_from(["reel", "season", "abc", "1", "--done", "--watching"]).is_err());
        let cli = Cli::try_parse_from(["reel", "season", "abc", "2", "--rate", "good"]).unwrap();
        let Command::Season(args) = cli.command else {
            panic!("expected season");
        };
        assert_eq!(args.rate, Some(SeasonRating::Good));
    }

    #[test]
    fn test_verify_command_tree() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
