use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::model::{
    CastMember, Episode, MediaKind, MovieDetail, RawTitle, ShowDetail, Title, VideoEntry,
};
use crate::config::{CONNECT_TIMEOUT, Config, LANGUAGE, READ_TIMEOUT};
use crate::http::{self, HttpError};

#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error("request failed: {0}")]
    Network(HttpError),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        match err.status() {
            Some(404) => ApiError::NotFound,
            _ => ApiError::Network(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum CatalogSection {
    TrendingMovies,
    PopularMovies,
    TopRatedMovies,
    UpcomingMovies,
    TrendingShows,
    PopularShows,
    TopRatedShows,
}

impl CatalogSection {
    fn path(self) -> &'static str {
        match self {
            CatalogSection::TrendingMovies => "/trending/movie/week",
            CatalogSection::PopularMovies => "/movie/popular",
            CatalogSection::TopRatedMovies => "/movie/top_rated",
            CatalogSection::UpcomingMovies => "/movie/upcoming",
            CatalogSection::TrendingShows => "/trending/tv/week",
            CatalogSection::PopularShows => "/tv/popular",
            CatalogSection::TopRatedShows => "/tv/top_rated",
        }
    }

    fn kind(self) -> MediaKind {
        match self {
            CatalogSection::TrendingMovies
            | CatalogSection::PopularMovies
            | CatalogSection::TopRatedMovies
            | CatalogSection::UpcomingMovies => MediaKind::Movie,
            CatalogSection::TrendingShows
            | CatalogSection::PopularShows
            | CatalogSection::TopRatedShows => MediaKind::Tv,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Paged<T> {
    #[serde(default)]
    results: Vec<T>,
}

/// Thin client over the catalog API. No caching: every call re-issues its
/// request.
#[derive(Debug, Clone)]
pub(crate) struct MetadataClient {
    api_base: String,
    api_key: String,
}

impl MetadataClient {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn get<T: DeserializeOwned>(&self, path: &str, extra: &[(&str, &str)]) -> Result<T, ApiError> {
        let url = format!("{}{}", self.api_base, path);
        let mut query = vec![
            ("api_key".to_string(), self.api_key.clone()),
            ("language".to_string(), LANGUAGE.to_string()),
        ];
        for (key, value) in extra {
            query.push((key.to_string(), value.to_string()));
        }
        let body = http::get_text(&url, &query, CONNECT_TIMEOUT, READ_TIMEOUT)?;
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) fn search(&self, query: &str) -> Result<Vec<Title>, ApiError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let page: Paged<RawTitle> = self.get(
            "/search/multi",
            &[("query", query), ("page", "1"), ("include_adult", "false")],
        )?;
        Ok(page
            .results
            .into_iter()
            .filter_map(|raw| raw.into_title(None))
            .collect())
    }

    pub(crate) fn catalog(&self, section: CatalogSection) -> Result<Vec<Title>, ApiError> {
        let page: Paged<RawTitle> = self.get(section.path(), &[])?;
        let kind = section.kind();
        Ok(page
            .results
            .into_iter()
            .filter_map(|raw| raw.into_title(Some(kind)))
            .collect())
    }

    pub(crate) fn discover(&self, kind: MediaKind, genre_id: u64) -> Result<Vec<Title>, ApiError> {
        let genre = genre_id.to_string();
        let page: Paged<RawTitle> = self.get(
            &format!("/discover/{}", kind.as_str()),
            &[
                ("with_genres", genre.as_str()),
                ("sort_by", "popularity.desc"),
            ],
        )?;
        Ok(page
            .results
            .into_iter()
            .filter_map(|raw| raw.into_title(Some(kind)))
            .collect())
    }

    pub(crate) fn similar(&self, kind: MediaKind, id: u64) -> Result<Vec<Title>, ApiError> {
        let page: Paged<RawTitle> = self.get(&format!("/{}/{id}/similar", kind.as_str()), &[])?;
        Ok(page
            .results
            .into_iter()
            .filter_map(|raw| raw.into_title(Some(kind)))
            .collect())
    }

    pub(crate) fn movie_detail(&self, id: u64) -> Result<MovieDetail, ApiError> {
        self.get(&format!("/movie/{id}"), &[])
    }

    /// Also serves as the existence probe for shows.
    pub(crate) fn show_detail(&self, id: u64) -> Result<ShowDetail, ApiError> {
        self.get(&format!("/tv/{id}"), &[])
    }

    pub(crate) fn season_episodes(
        &self,
        show_id: u64,
        season: u32,
    ) -> Result<Vec<Episode>, ApiError> {
        #[derive(Debug, Deserialize)]
        struct SeasonDetail {
            #[serde(default)]
            episodes: Vec<Episode>,
        }

        let detail: SeasonDetail = self.get(&format!("/tv/{show_id}/season/{season}"), &[])?;
        Ok(detail.episodes)
    }

    pub(crate) fn videos(&self, kind: MediaKind, id: u64) -> Result<Vec<VideoEntry>, ApiError> {
        let page: Paged<VideoEntry> = self.get(&format!("/{}/{id}/videos", kind.as_str()), &[])?;
        Ok(page.results)
    }

    pub(crate) fn episode_videos(
        &self,
        show_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<Vec<VideoEntry>, ApiError> {
        let page: Paged<VideoEntry> = self.get(
            &format!("/tv/{show_id}/season/{season}/episode/{episode}/videos"),
            &[],
        )?;
        Ok(page.results)
    }

    pub(crate) fn credits(&self, kind: MediaKind, id: u64) -> Result<Vec<CastMember>, ApiError> {
        #[derive(Debug, Deserialize)]
        struct Credits {
            #[serde(default)]
            cast: Vec<CastMember>,
        }

        let credits: Credits = self.get(&format!("/{}/{id}/credits", kind.as_str()), &[])?;
        Ok(credits.cast)
    }
}
