pub(crate) mod api;
mod episode;
mod library;
pub(crate) mod model;
mod player;
mod tracker;
mod trailer;


use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::cli::{Cli, Command, FavoritesAction};
use crate::config::{Config, PROGRESS_TICK};
use crate::paths::store_file_path;
use crate::store::{SqliteStore, StateStore};

use self::api::{ApiError, CatalogSection, MetadataClient};
use self::model::{MediaKind, Title, image_url};
use self::player::{PlayTarget, PlayerSession, PlayerState, SessionEvent, SimulatedWidget};
use self::trailer::{TrailerError, TrailerSource};

pub fn run(cli: Cli) -> Result<()> {
    let store: Arc<dyn StateStore> = Arc::new(SqliteStore::open(&store_file_path()?)?);

    match cli.command {
        Command::Search { query } => run_search(&query)?,
        Command::Browse { section } => run_browse(section)?,
        Command::Genre { kind, genre_id } => run_genre(kind, genre_id)?,
        Command::Details { kind, id } => run_details(kind, id)?,
        Command::Trailer {
            kind,
            id,
            season,
            episode,
        } => run_trailer(kind, id, season, episode)?,
        Command::Watch {
            kind,
            id,
            season,
            episode,
            length,
        } => run_watch(store, kind, id, season, episode, length)?,
        Command::Continue => run_continue(store.as_ref())?,
        Command::Favorites { action } => run_favorites(store.as_ref(), action)?,
        Command::Progress { show_id } => run_progress(store.as_ref(), show_id)?,
    }

    Ok(())
}

fn client() -> Result<MetadataClient> {
    Ok(MetadataClient::new(&Config::from_env()?))
}

fn run_search(query: &str) -> Result<()> {
    let client = client()?;
    print_titles(&fetch_or_empty(client.search(query), "search"));
    Ok(())
}

fn run_browse(section: CatalogSection) -> Result<()> {
    let client = client()?;
    print_titles(&fetch_or_empty(client.catalog(section), "catalog"));
    Ok(())
}

fn run_genre(kind: MediaKind, genre_id: u64) -> Result<()> {
    let client = client()?;
    print_titles(&fetch_or_empty(client.discover(kind, genre_id), "discover"));
    Ok(())
}

// API failures never escape as process errors: they degrade to an empty
// result and a warning, and the table rendering prints the empty-state
// line.
fn fetch_or_empty(result: std::result::Result<Vec<Title>, ApiError>, what: &str) -> Vec<Title> {
    match result {
        Ok(titles) => titles,
        Err(err) => {
            tracing::warn!(error = %err, "{} request failed", what);
            Vec::new()
        }
    }
}

fn print_titles(titles: &[Title]) {
    if titles.is_empty() {
        println!("No results found.");
        return;
    }

    println!(
        "{:<10} {:<6} {:<44} {:<12} {:<6}",
        "ID", "KIND", "TITLE", "RELEASED", "RATING"
    );
    for title in titles {
        println!(
            "{:<10} {:<6} {:<44} {:<12} {:<6.1}",
            title.id(),
            title.kind(),
            truncate(title.display_name(), 44),
            title.released().unwrap_or("-"),
            title.vote_average(),
        );
    }
}

fn run_details(kind: MediaKind, id: u64) -> Result<()> {
    let client = client()?;

    match kind {
        MediaKind::Movie => match client.movie_detail(id) {
            Ok(detail) => {
                println!(
                    "{} ({})",
                    detail.title,
                    detail.release_date.as_deref().unwrap_or("unreleased")
                );
                if let Some(runtime) = detail.runtime {
                    println!("  Runtime: {runtime} min");
                }
                print_detail_common(
                    detail.vote_average,
                    &detail.genres,
                    &detail.overview,
                    detail.poster_path.as_deref(),
                );
            }
            Err(err) => {
                print_detail_failure(id, err);
                return Ok(());
            }
        },
        MediaKind::Tv => match client.show_detail(id) {
            Ok(detail) => {
                println!(
                    "{} ({})",
                    detail.name,
                    detail.first_air_date.as_deref().unwrap_or("unaired")
                );
                print_detail_common(
                    detail.vote_average,
                    &detail.genres,
                    &detail.overview,
                    detail.poster_path.as_deref(),
                );
                for season in &detail.seasons {
                    println!(
                        "  Season {:<3} {:<3} episodes  {}",
                        season.season_number,
                        season.episode_count,
                        truncate(&season.name, 40)
                    );
                }
            }
            Err(err) => {
                print_detail_failure(id, err);
                return Ok(());
            }
        },
    }

    if let Ok(cast) = client.credits(kind, id)
        && !cast.is_empty()
    {
        println!("Top cast:");
        for member in cast.iter().take(5) {
            println!("  {} as {}", member.name, truncate(&member.character, 40));
        }
    }

    if let Ok(similar) = client.similar(kind, id)
        && !similar.is_empty()
    {
        println!("You might also like:");
        for title in similar.iter().take(5) {
            println!("  {:<10} {}", title.id(), truncate(title.display_name(), 50));
        }
    }

    Ok(())
}

fn print_detail_common(rating: f64, genres: &[model::Genre], overview: &str, poster: Option<&str>) {
    println!("  Rating: {rating:.1}");
    if !genres.is_empty() {
        let names = genres
            .iter()
            .map(|genre| genre.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("  Genres: {names}");
    }
    if !overview.is_empty() {
        println!("  {overview}");
    }
    if let Some(poster) = poster {
        let url = image_url(poster, "w500");
        if !url.is_empty() {
            println!("  Poster: {url}");
        }
    }
}

fn print_detail_failure(id: u64, err: ApiError) {
    match err {
        ApiError::NotFound => println!("No title with id {id}."),
        err => {
            tracing::warn!(error = %err, "detail request failed");
            println!("Unable to load details. Please try again later.");
        }
    }
}

fn run_trailer(kind: MediaKind, id: u64, season: Option<u32>, episode: Option<u32>) -> Result<()> {
    let client = client()?;
    match trailer::resolve(&client, kind, id, season, episode) {
        Ok(resolved) => {
            if resolved.source == TrailerSource::ShowFallback {
                println!("Episode preview not available. Showing show trailer instead.");
            }
            println!("https://www.youtube.com/watch?v={}", resolved.key);
        }
        Err(err) => println!("{}", playback_failure_message(kind, &err)),
    }
    Ok(())
}

fn playback_failure_message(kind: MediaKind, err: &TrailerError) -> String {
    match err {
        TrailerError::ShowNotFound | TrailerError::NoVideoAvailable => match kind {
            MediaKind::Tv => "This TV show or episode is not available.".to_string(),
            MediaKind::Movie => "This title is not available.".to_string(),
        },
        TrailerError::Api(_) => "Unable to play this title. Please try again later.".to_string(),
    }
}

fn run_watch(
    store: Arc<dyn StateStore>,
    kind: MediaKind,
    id: u64,
    season: Option<u32>,
    episode: Option<u32>,
    length: u64,
) -> Result<()> {
    let client = client()?;
    let duration = Duration::from_secs(length.max(1));
    let factory: player::WidgetFactory =
        Box::new(move |_key| Box::new(SimulatedWidget::new(duration)) as Box<dyn player::PlaybackWidget>);
    let mut session = PlayerSession::new(client, Arc::clone(&store), factory, PROGRESS_TICK);

    library::save_watch_progress(store.as_ref(), id, kind, 0.0)?;

    let target = PlayTarget {
        id,
        kind,
        season,
        episode,
    };
    if let Err(err) = session.open(target) {
        println!("{}", playback_failure_message(kind, &err));
        return Ok(());
    }

    loop {
        let events = session.pump();
        for event in &events {
            match event {
                SessionEvent::Started { key, fallback } => {
                    if *fallback {
                        println!("Episode preview not available. Showing show trailer instead.");
                    }
                    println!("Playing https://www.youtube.com/watch?v={key}");
                }
                SessionEvent::Advanced { episode } => {
                    println!(
                        "Up next: S{:02}E{:02} {}",
                        episode.season_number,
                        episode.episode_number,
                        episode.name
                    );
                }
                SessionEvent::Failed(detail) => {
                    tracing::warn!(detail = %detail, "playback session failed");
                    println!("Unable to play this title. Please try again later.");
                }
                SessionEvent::Finished => {}
            }
        }
        if events
            .iter()
            .any(|event| matches!(event, SessionEvent::Finished | SessionEvent::Failed(_)))
            || session.state() == PlayerState::Failed
        {
            break;
        }
        thread::sleep(Duration::from_millis(200));
    }

    let final_progress = session.progress();
    session.close();
    if let Some(progress) = final_progress {
        library::save_watch_progress(store.as_ref(), id, kind, progress)?;
    }
    println!("Player closed.");
    Ok(())
}

fn run_continue(store: &dyn StateStore) -> Result<()> {
    let client = client()?;
    let entries = library::continue_watching_details(store, &client)?;
    if entries.is_empty() {
        println!("Nothing in progress yet. Try `reeltrack watch`.");
        return Ok(());
    }

    println!(
        "{:<10} {:<6} {:<40} {:<9} {:<20}",
        "ID", "KIND", "TITLE", "PROGRESS", "LAST WATCHED"
    );
    for entry in entries {
        println!(
            "{:<10} {:<6} {:<40} {:<9} {:<20}",
            entry.record.id,
            entry.record.kind,
            truncate(&entry.name, 40),
            format!("{:.0}%", entry.record.progress),
            format_timestamp(entry.record.timestamp)
        );
    }
    Ok(())
}

fn run_favorites(store: &dyn StateStore, action: FavoritesAction) -> Result<()> {
    match action {
        FavoritesAction::Add { kind, id } => {
            if library::is_favorite(store, id)? {
                println!("Already in favorites.");
                return Ok(());
            }
            let client = client()?;
            let title = match kind {
                MediaKind::Movie => client.movie_detail(id).map(|detail| detail.to_title()),
                MediaKind::Tv => client.show_detail(id).map(|detail| detail.to_title()),
            };
            match title {
                Ok(title) => {
                    let name = title.display_name().to_string();
                    library::add_favorite(store, &title)?;
                    println!("Added {name} to favorites.");
                }
                Err(ApiError::NotFound) => println!("No title with id {id}."),
                Err(err) => {
                    tracing::warn!(error = %err, "favorite lookup failed");
                    println!("Unable to load details. Please try again later.");
                }
            }
        }
        FavoritesAction::Remove { id } => {
            library::remove_favorite(store, id)?;
            println!("Removed {id} from favorites.");
        }
        FavoritesAction::List => {
            let list = library::favorites(store)?;
            if list.is_empty() {
                println!("No favorites yet.");
            } else {
                print_titles(&list);
            }
        }
    }
    Ok(())
}

fn run_progress(store: &dyn StateStore, show_id: u64) -> Result<()> {
    let entries = library::episode_progress_for_show(store, show_id)?;
    if entries.is_empty() {
        println!("No episode progress recorded for show {show_id}.");
        return Ok(());
    }

    println!(
        "{:<8} {:<8} {:<9} {:<20}",
        "SEASON", "EPISODE", "PROGRESS", "UPDATED"
    );
    for entry in entries {
        println!(
            "{:<8} {:<8} {:<9} {:<20}",
            entry.season_number,
            entry.episode_number,
            format!("{:.0}%", entry.progress),
            format_timestamp(entry.timestamp)
        );
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}

fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(millis)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| millis.to_string())
}
