use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::api::MetadataClient;
use super::model::{MediaKind, Title};
use crate::store::{CONTINUE_WATCHING_KEY, EPISODE_PROGRESS_KEY, MY_LIST_KEY, StateStore};

pub(crate) const CONTINUE_WATCHING_CAP: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WatchProgress {
    pub(crate) id: u64,
    pub(crate) kind: MediaKind,
    pub(crate) progress: f64,
    pub(crate) timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct EpisodeProgress {
    pub(crate) show_id: u64,
    pub(crate) season_number: u32,
    pub(crate) episode_number: u32,
    pub(crate) progress: f64,
    pub(crate) timestamp: i64,
}

// An absent key reads as the empty collection; a present but malformed
// value is a hard error carrying the offending key.
fn read_collection<T: DeserializeOwned + Default>(store: &dyn StateStore, key: &str) -> Result<T> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .with_context(|| format!("malformed stored value under key {key}")),
        None => Ok(T::default()),
    }
}

fn write_collection<T: Serialize>(store: &dyn StateStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

pub(crate) fn favorites(store: &dyn StateStore) -> Result<Vec<Title>> {
    read_collection(store, MY_LIST_KEY)
}

/// Uniqueness by id is enforced at insert time only; an id already present
/// leaves the list untouched.
pub(crate) fn add_favorite(store: &dyn StateStore, title: &Title) -> Result<()> {
    let mut list = favorites(store)?;
    if !list.iter().any(|entry| entry.id() == title.id()) {
        list.push(title.clone());
        write_collection(store, MY_LIST_KEY, &list)?;
    }
    Ok(())
}

pub(crate) fn remove_favorite(store: &dyn StateStore, id: u64) -> Result<()> {
    let mut list = favorites(store)?;
    let before = list.len();
    list.retain(|entry| entry.id() != id);
    if list.len() != before {
        write_collection(store, MY_LIST_KEY, &list)?;
    }
    Ok(())
}

pub(crate) fn is_favorite(store: &dyn StateStore, id: u64) -> Result<bool> {
    Ok(favorites(store)?.iter().any(|entry| entry.id() == id))
}

pub(crate) fn continue_watching(store: &dyn StateStore) -> Result<Vec<WatchProgress>> {
    read_collection(store, CONTINUE_WATCHING_KEY)
}

/// Newest entry first; re-watching moves the id to the front. Only the 20
/// most recently written entries are retained.
pub(crate) fn save_watch_progress(
    store: &dyn StateStore,
    id: u64,
    kind: MediaKind,
    progress: f64,
) -> Result<()> {
    let mut list = continue_watching(store)?;
    list.retain(|entry| entry.id != id);
    list.insert(
        0,
        WatchProgress {
            id,
            kind,
            progress,
            timestamp: Utc::now().timestamp_millis(),
        },
    );
    list.truncate(CONTINUE_WATCHING_CAP);
    write_collection(store, CONTINUE_WATCHING_KEY, &list)
}

pub(crate) fn episode_key(show_id: u64, season: u32, episode: u32) -> String {
    format!("{show_id}-{season}-{episode}")
}

pub(crate) fn episode_progress_map(
    store: &dyn StateStore,
) -> Result<HashMap<String, EpisodeProgress>> {
    read_collection(store, EPISODE_PROGRESS_KEY)
}

/// Full replacement per (show, season, episode) key. The map grows without
/// eviction.
pub(crate) fn save_episode_progress(
    store: &dyn StateStore,
    show_id: u64,
    season: u32,
    episode: u32,
    progress: f64,
) -> Result<()> {
    let mut map = episode_progress_map(store)?;
    map.insert(
        episode_key(show_id, season, episode),
        EpisodeProgress {
            show_id,
            season_number: season,
            episode_number: episode,
            progress,
            timestamp: Utc::now().timestamp_millis(),
        },
    );
    write_collection(store, EPISODE_PROGRESS_KEY, &map)
}

pub(crate) fn episode_progress_for_show(
    store: &dyn StateStore,
    show_id: u64,
) -> Result<Vec<EpisodeProgress>> {
    let mut entries: Vec<EpisodeProgress> = episode_progress_map(store)?
        .into_values()
        .filter(|entry| entry.show_id == show_id)
        .collect();
    entries.sort_by_key(|entry| (entry.season_number, entry.episode_number));
    Ok(entries)
}

#[derive(Debug, Clone)]
pub(crate) struct ContinueEntry {
    pub(crate) record: WatchProgress,
    pub(crate) name: String,
}

/// Continue-watching entries hydrated with catalog names, fetched one by
/// one. Entries whose lookup fails are logged and skipped.
pub(crate) fn continue_watching_details(
    store: &dyn StateStore,
    client: &MetadataClient,
) -> Result<Vec<ContinueEntry>> {
    let mut out = Vec::new();
    for record in continue_watching(store)? {
        let name = match record.kind {
            MediaKind::Movie => client.movie_detail(record.id).map(|detail| detail.title),
            MediaKind::Tv => client.show_detail(record.id).map(|detail| detail.name),
        };
        match name {
            Ok(name) => out.push(ContinueEntry { record, name }),
            Err(err) => {
                tracing::warn!(
                    id = record.id,
                    error = %err,
                    "skipping continue-watching entry with failed lookup"
                );
            }
        }
    }
    Ok(out)
}
