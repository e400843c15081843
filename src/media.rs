//! Caller-supplied media metadata.
//!
//! A resolution starts from a [`MediaMeta`]: the title and year from the
//! metadata catalog, plus (for series) the season currently being watched
//! with its ordered episode list. Episode ids here are the catalog's ids,
//! not any provider's; providers map them through the episode ordinal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};

/// Kind of media being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Movie => "movie",
            Self::Series => "series",
        })
    }
}

impl std::str::FromStr for MediaType {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "series" | "show" | "tv" => Ok(Self::Series),
            other => Err(ScrapeError::Validation(format!(
                "unknown media type {other:?}"
            ))),
        }
    }
}

/// One episode of a season, as known to the metadata catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeMeta {
    pub id: String,
    /// 1-based ordinal within the season.
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// The season a series request refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonData {
    pub id: String,
    pub number: u32,
    #[serde(default)]
    pub episodes: Vec<EpisodeMeta>,
}

impl SeasonData {
    /// Ordinal of the episode with catalog id `episode_id`.
    pub fn episode_number(&self, episode_id: &str) -> Option<u32> {
        self.episodes
            .iter()
            .find(|e| e.id == episode_id)
            .map(|e| e.number)
    }
}

/// Metadata identifying what to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMeta {
    pub title: String,
    /// Release year, compared verbatim against upstream values.
    pub year: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<SeasonData>,
}

impl MediaMeta {
    pub fn movie(title: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: year.into(),
            media_type: MediaType::Movie,
            season: None,
        }
    }

    pub fn series(title: impl Into<String>, year: impl Into<String>, season: SeasonData) -> Self {
        Self {
            title: title.into(),
            year: year.into(),
            media_type: MediaType::Series,
            season: Some(season),
        }
    }

    /// Season data of a series request.
    pub fn season(&self) -> Result<&SeasonData> {
        self.season
            .as_ref()
            .ok_or_else(|| ScrapeError::Validation(format!("series {:?} has no season data", self.title)))
    }

    /// Check the request is well-formed before any provider sees it.
    ///
    /// Series requests must carry season data and an episode id that exists
    /// in that season.
    pub fn validate(&self, episode_id: Option<&str>) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ScrapeError::Validation("title is empty".into()));
        }

        if self.media_type == MediaType::Series {
            let season = self.season()?;
            let episode_id = episode_id.ok_or_else(|| {
                ScrapeError::Validation(format!("series {:?} requires an episode id", self.title))
            })?;
            if season.episode_number(episode_id).is_none() {
                return Err(ScrapeError::Validation(format!(
                    "episode {episode_id:?} is not part of season {}",
                    season.number
                )));
            }
        }

        Ok(())
    }
}
