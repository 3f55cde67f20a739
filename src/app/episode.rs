use super::api::{ApiError, MetadataClient};
use super::model::Episode;

/// Episode immediately after (show, season, episode): the next number in
/// the same season, else the first episode of the following season. Lookup
/// failures are logged and resolve to None, indistinguishable from "no
/// next episode" for the caller.
pub(crate) fn next_episode(
    client: &MetadataClient,
    show_id: u64,
    season: u32,
    episode: u32,
) -> Option<Episode> {
    match try_next_episode(client, show_id, season, episode) {
        Ok(next) => next,
        Err(err) => {
            tracing::warn!(show_id, season, episode, error = %err, "next-episode lookup failed");
            None
        }
    }
}

fn try_next_episode(
    client: &MetadataClient,
    show_id: u64,
    season: u32,
    episode: u32,
) -> Result<Option<Episode>, ApiError> {
    let current = client.season_episodes(show_id, season)?;
    if let Some(next) = find_following(&current, episode) {
        return Ok(Some(next.clone()));
    }

    let show = client.show_detail(show_id)?;
    let Some(next_season) = show
        .seasons
        .iter()
        .find(|candidate| candidate.season_number == season + 1)
    else {
        return Ok(None);
    };

    // A season listed with zero episodes yields None rather than an
    // out-of-bounds first element.
    let episodes = client.season_episodes(show_id, next_season.season_number)?;
    Ok(episodes.first().cloned())
}

pub(crate) fn find_following(episodes: &[Episode], current: u32) -> Option<&Episode> {
    episodes
        .iter()
        .find(|candidate| candidate.episode_number == current + 1)
}
