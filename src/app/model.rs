use serde::{Deserialize, Serialize};

pub(crate) const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// API path segment for this kind.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry. The kind-dependent fields (`title`/`release_date` vs
/// `name`/`first_air_date`) live on their own variant, so choosing between
/// them is a checked match instead of a field fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub(crate) enum Title {
    #[serde(rename = "movie")]
    Movie {
        id: u64,
        title: String,
        overview: String,
        poster_path: Option<String>,
        backdrop_path: Option<String>,
        vote_average: f64,
        release_date: Option<String>,
    },
    #[serde(rename = "tv")]
    Show {
        id: u64,
        name: String,
        overview: String,
        poster_path: Option<String>,
        backdrop_path: Option<String>,
        vote_average: f64,
        first_air_date: Option<String>,
    },
}

impl Title {
    pub(crate) fn id(&self) -> u64 {
        match self {
            Title::Movie { id, .. } | Title::Show { id, .. } => *id,
        }
    }

    pub(crate) fn kind(&self) -> MediaKind {
        match self {
            Title::Movie { .. } => MediaKind::Movie,
            Title::Show { .. } => MediaKind::Tv,
        }
    }

    pub(crate) fn display_name(&self) -> &str {
        match self {
            Title::Movie { title, .. } => title,
            Title::Show { name, .. } => name,
        }
    }

    pub(crate) fn released(&self) -> Option<&str> {
        match self {
            Title::Movie { release_date, .. } => release_date.as_deref(),
            Title::Show { first_air_date, .. } => first_air_date.as_deref(),
        }
    }

    pub(crate) fn vote_average(&self) -> f64 {
        match self {
            Title::Movie { vote_average, .. } | Title::Show { vote_average, .. } => *vote_average,
        }
    }
}

/// API list payload before the kind is pinned down. Multi-search rows carry
/// a `media_type` discriminator; single-kind endpoints rely on the caller's
/// hint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawTitle {
    pub(crate) id: u64,
    #[serde(default)]
    pub(crate) media_type: Option<String>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) overview: String,
    #[serde(default)]
    pub(crate) poster_path: Option<String>,
    #[serde(default)]
    pub(crate) backdrop_path: Option<String>,
    #[serde(default)]
    pub(crate) vote_average: f64,
    #[serde(default)]
    pub(crate) release_date: Option<String>,
    #[serde(default)]
    pub(crate) first_air_date: Option<String>,
}

impl RawTitle {
    /// Person rows and unknown media types convert to None.
    pub(crate) fn into_title(self, hint: Option<MediaKind>) -> Option<Title> {
        let kind = match self.media_type.as_deref() {
            Some("movie") => MediaKind::Movie,
            Some("tv") => MediaKind::Tv,
            Some(_) => return None,
            None => hint?,
        };
        Some(match kind {
            MediaKind::Movie => Title::Movie {
                id: self.id,
                title: self.title.or(self.name).unwrap_or_default(),
                overview: self.overview,
                poster_path: self.poster_path,
                backdrop_path: self.backdrop_path,
                vote_average: self.vote_average,
                release_date: self.release_date,
            },
            MediaKind::Tv => Title::Show {
                id: self.id,
                name: self.name.or(self.title).unwrap_or_default(),
                overview: self.overview,
                poster_path: self.poster_path,
                backdrop_path: self.backdrop_path,
                vote_average: self.vote_average,
                first_air_date: self.first_air_date,
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Season {
    pub(crate) season_number: u32,
    #[serde(default)]
    pub(crate) episode_count: u32,
    #[serde(default)]
    pub(crate) name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Episode {
    pub(crate) season_number: u32,
    pub(crate) episode_number: u32,
    #[serde(default)]
    pub(crate) name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub(crate) struct VideoEntry {
    pub(crate) key: String,
    pub(crate) site: String,
    #[serde(rename = "type")]
    pub(crate) kind: String,
    #[serde(default)]
    pub(crate) official: bool,
}

impl VideoEntry {
    pub(crate) fn is_official_youtube(&self, kind: &str) -> bool {
        self.site == "YouTube" && self.kind == kind && self.official
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Genre {
    pub(crate) name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MovieDetail {
    pub(crate) id: u64,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) overview: String,
    #[serde(default)]
    pub(crate) poster_path: Option<String>,
    #[serde(default)]
    pub(crate) backdrop_path: Option<String>,
    #[serde(default)]
    pub(crate) vote_average: f64,
    #[serde(default)]
    pub(crate) release_date: Option<String>,
    #[serde(default)]
    pub(crate) runtime: Option<u32>,
    #[serde(default)]
    pub(crate) genres: Vec<Genre>,
}

impl MovieDetail {
    pub(crate) fn to_title(&self) -> Title {
        Title::Movie {
            id: self.id,
            title: self.title.clone(),
            overview: self.overview.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            vote_average: self.vote_average,
            release_date: self.release_date.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ShowDetail {
    pub(crate) id: u64,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) overview: String,
    #[serde(default)]
    pub(crate) poster_path: Option<String>,
    #[serde(default)]
    pub(crate) backdrop_path: Option<String>,
    #[serde(default)]
    pub(crate) vote_average: f64,
    #[serde(default)]
    pub(crate) first_air_date: Option<String>,
    #[serde(default)]
    pub(crate) genres: Vec<Genre>,
    #[serde(default)]
    pub(crate) seasons: Vec<Season>,
}

impl ShowDetail {
    pub(crate) fn to_title(&self) -> Title {
        Title::Show {
            id: self.id,
            name: self.name.clone(),
            overview: self.overview.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            vote_average: self.vote_average,
            first_air_date: self.first_air_date.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CastMember {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) character: String,
}

pub(crate) fn image_url(path: &str, size: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("{IMAGE_BASE_URL}/{size}{path}")
    }
}
