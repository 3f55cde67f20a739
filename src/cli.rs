use clap::{Parser, Subcommand};

use crate::app::api::CatalogSection;
use crate::app::model::MediaKind;

#[derive(Debug, Parser)]
#[command(
    name = "reeltrack",
    version,
    about = "Browse TMDB-compatible catalogs, resolve trailers and track watch progress"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Search {
        query: String,
    },
    Browse {
        #[arg(value_enum)]
        section: CatalogSection,
    },
    Genre {
        #[arg(value_enum)]
        kind: MediaKind,
        genre_id: u64,
    },
    Details {
        #[arg(value_enum)]
        kind: MediaKind,
        id: u64,
    },
    Trailer {
        #[arg(value_enum)]
        kind: MediaKind,
        id: u64,
        #[arg(long)]
        season: Option<u32>,
        #[arg(long)]
        episode: Option<u32>,
    },
    Watch {
        #[arg(value_enum)]
        kind: MediaKind,
        id: u64,
        #[arg(long)]
        season: Option<u32>,
        #[arg(long)]
        episode: Option<u32>,
        #[arg(long, default_value_t = 30, help = "Simulated playback length in seconds")]
        length: u64,
    },
    Continue,
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    Progress {
        show_id: u64,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    Add {
        #[arg(value_enum)]
        kind: MediaKind,
        id: u64,
    },
    Remove {
        id: u64,
    },
    List,
}
