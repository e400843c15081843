//! Canonical stream and caption schema.
//!
//! Every provider normalizes its upstream payload into these types, so
//! playback code depends on one shape regardless of which provider
//! produced it. Serialized names match the values playback expects
//! (`hls`, `srt`, `720p`, ...).

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};

/// Container/delivery format of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    /// Direct progressive file.
    Mp4,
    /// Adaptive HLS playlist.
    Hls,
}

impl StreamType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Hls => "hls",
        }
    }
}

/// Caption file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionType {
    Vtt,
    Srt,
}

impl CaptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vtt => "vtt",
            Self::Srt => "srt",
        }
    }
}

/// Discrete quality rung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamQuality {
    #[serde(rename = "360p")]
    Q360p,
    #[serde(rename = "480p")]
    Q480p,
    #[serde(rename = "720p")]
    Q720p,
    #[serde(rename = "1080p")]
    Q1080p,
    #[serde(rename = "unknown")]
    Unknown,
}

impl StreamQuality {
    /// Map an upstream quality token (`"720"`, `"720p"`, ...) to a rung.
    ///
    /// Anything outside the known rungs is [`StreamQuality::Unknown`]; a
    /// numeric rung is never guessed.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        let digits = token
            .strip_suffix('p')
            .or_else(|| token.strip_suffix('P'))
            .unwrap_or(token);
        match digits {
            "360" => Self::Q360p,
            "480" => Self::Q480p,
            "720" => Self::Q720p,
            "1080" => Self::Q1080p,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Q360p => "360p",
            Self::Q480p => "480p",
            Self::Q720p => "720p",
            Self::Q1080p => "1080p",
            Self::Unknown => "unknown",
        }
    }
}

/// A caption track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MwCaption {
    pub url: String,
    #[serde(rename = "type")]
    pub caption_type: CaptionType,
    pub lang_iso: String,
    /// Whether playback must fetch the file through the proxy.
    #[serde(default)]
    pub needs_proxy: bool,
}

/// A playable stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MwStream {
    pub stream_url: String,
    #[serde(rename = "type")]
    pub stream_type: StreamType,
    pub quality: StreamQuality,
    #[serde(default)]
    pub captions: Vec<MwCaption>,
}

impl MwStream {
    /// Reject placeholder streams.
    pub fn validate(&self) -> Result<()> {
        if self.stream_url.trim().is_empty() {
            return Err(ScrapeError::UpstreamShape("stream URL is empty".into()));
        }
        Ok(())
    }
}

/// An alternative source that needs a dedicated embed scraper to play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MwEmbed {
    pub embed_type: String,
    pub url: String,
}

/// Output of a single provider invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    #[serde(default)]
    pub embeds: Vec<MwEmbed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<MwStream>,
}

impl ScrapeResult {
    pub fn from_stream(stream: MwStream) -> Self {
        Self {
            embeds: Vec::new(),
            stream: Some(stream),
        }
    }

    /// A result is usable when it carries a valid stream or at least one embed.
    pub fn validate(&self) -> Result<()> {
        match &self.stream {
            Some(stream) => stream.validate(),
            None if !self.embeds.is_empty() => Ok(()),
            None => Err(ScrapeError::NotFound(
                "provider returned neither a stream nor embeds".into(),
            )),
        }
    }
}
