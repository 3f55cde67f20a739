use thiserror::Error;

use super::api::{ApiError, MetadataClient};
use super::model::{MediaKind, VideoEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrailerSource {
    Episode,
    ShowFallback,
    Title,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedTrailer {
    pub(crate) key: String,
    pub(crate) source: TrailerSource,
}

#[derive(Debug, Error)]
pub(crate) enum TrailerError {
    #[error("show not found")]
    ShowNotFound,
    #[error("no video available")]
    NoVideoAvailable,
    #[error(transparent)]
    Api(#[from] ApiError),
}

const EPISODE_PREFERENCE: [&str; 3] = ["Trailer", "Teaser", "Clip"];
const TITLE_PREFERENCE: [&str; 2] = ["Trailer", "Teaser"];

/// Preference is by video type, not list order: an official YouTube
/// "Trailer" wins over an earlier "Clip". Without any official YouTube
/// match the first entry is taken regardless.
pub(crate) fn pick_preferred<'a>(
    videos: &'a [VideoEntry],
    preference: &[&str],
) -> Option<&'a VideoEntry> {
    for kind in preference {
        if let Some(video) = videos.iter().find(|video| video.is_official_youtube(kind)) {
            return Some(video);
        }
    }
    videos.first()
}

pub(crate) fn resolve(
    client: &MetadataClient,
    kind: MediaKind,
    id: u64,
    season: Option<u32>,
    episode: Option<u32>,
) -> Result<ResolvedTrailer, TrailerError> {
    if kind == MediaKind::Tv
        && let (Some(season), Some(episode)) = (season, episode)
    {
        return resolve_episode(client, id, season, episode);
    }

    let videos = client.videos(kind, id)?;
    match pick_preferred(&videos, &TITLE_PREFERENCE) {
        Some(video) => Ok(ResolvedTrailer {
            key: video.key.clone(),
            source: TrailerSource::Title,
        }),
        None => Err(TrailerError::NoVideoAvailable),
    }
}

fn resolve_episode(
    client: &MetadataClient,
    show_id: u64,
    season: u32,
    episode: u32,
) -> Result<ResolvedTrailer, TrailerError> {
    // Existence probe; any failure here ends resolution without further
    // lookups.
    if let Err(err) = client.show_detail(show_id) {
        tracing::warn!(show_id, error = %err, "show existence probe failed");
        return Err(TrailerError::ShowNotFound);
    }

    match client.episode_videos(show_id, season, episode) {
        Ok(videos) => {
            if let Some(video) = pick_preferred(&videos, &EPISODE_PREFERENCE) {
                return Ok(ResolvedTrailer {
                    key: video.key.clone(),
                    source: TrailerSource::Episode,
                });
            }
        }
        Err(err) => {
            tracing::warn!(
                show_id,
                season,
                episode,
                error = %err,
                "episode video lookup failed, falling back to show trailer"
            );
        }
    }

    let videos = client.videos(MediaKind::Tv, show_id)?;
    match pick_preferred(&videos, &TITLE_PREFERENCE) {
        Some(video) => Ok(ResolvedTrailer {
            key: video.key.clone(),
            source: TrailerSource::ShowFallback,
        }),
        None => Err(TrailerError::NoVideoAvailable),
    }
}
