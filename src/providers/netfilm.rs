//! NetFilm streaming provider
//!
//! Resolution chain:
//!
//! 1. `/api/search?keyword=` — match the title (and year, or season)
//! 2. `/api/detail?id=&category=` — series only, map the episode ordinal
//! 3. `/api/episode?id=` — quality variants and subtitles
//!
//! Every payload is wrapped in a `{ "data": ... }` envelope.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::fetch::{JsonFetcher, RequestOptions};
use crate::media::{MediaMeta, MediaType};
use crate::provider::{Provider, ScrapeContext};
use crate::stream::{CaptionType, MwCaption, MwStream, ScrapeResult, StreamQuality, StreamType};

pub const NETFILM_BASE_URL: &str = "https://net-film.vercel.app";

const SEARCH_PATH: &str = "/api/search";
const DETAIL_PATH: &str = "/api/detail";
const EPISODE_PATH: &str = "/api/episode";

/// Episode streams are always requested with this category.
const EPISODE_CATEGORY: &str = "1";

/// Upstream wraps subtitle URLs in this SRT→VTT conversion service.
const SRT_TO_VTT_PREFIX: &str = "https://convert-srt-to-vtt.vercel.app/?url=";

/// Mirror host fragments and the alias that serves the same content.
const CDN_ALIASES: &[(&str, &str)] = &[("akm-cdn", "aws-cdn"), ("gg-cdn", "aws-cdn")];

const MEDIA_TYPES: &[MediaType] = &[MediaType::Movie, MediaType::Series];

pub struct NetFilmProvider {
    fetcher: Arc<dyn JsonFetcher>,
    base_url: String,
}

impl NetFilmProvider {
    pub fn new(fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self::with_base_url(fetcher, NETFILM_BASE_URL)
    }

    pub fn with_base_url(fetcher: Arc<dyn JsonFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, opts: RequestOptions) -> Result<T> {
        let body = self.fetcher.request(path, &opts).await?;
        let envelope: Envelope<T> = serde_json::from_value(body)
            .map_err(|e| ScrapeError::UpstreamShape(format!("NetFilm {path}: {e}")))?;
        Ok(envelope.data)
    }

    async fn search(&self, title: &str) -> Result<Vec<SearchItem>> {
        let opts = RequestOptions::new(&self.base_url).query("keyword", title);
        let data: SearchData = self.get(SEARCH_PATH, opts).await?;

        let total = data.results.len();
        let results: Vec<SearchItem> = data
            .results
            .into_iter()
            .filter_map(|raw| serde_json::from_value(raw).ok())
            .collect();
        if results.len() < total {
            tracing::debug!("Skipped {} malformed NetFilm result(s)", total - results.len());
        }
        tracing::debug!("NetFilm search for {title:?} returned {} result(s)", results.len());
        Ok(results)
    }

    async fn find_episode_id(&self, item: &SearchItem, episode_number: u32) -> Result<String> {
        let category = item.category_tag.first().ok_or_else(|| {
            ScrapeError::UpstreamShape(format!(
                "NetFilm result {:?} has no category tag",
                item.name
            ))
        })?;

        let opts = RequestOptions::new(&self.base_url)
            .query("id", item.id.as_text())
            .query("category", category.id.as_text());
        let detail: DetailData = self.get(DETAIL_PATH, opts).await?;

        detail
            .episode_vo
            .iter()
            .find(|ep| ep.series_no.as_number() == Some(f64::from(episode_number)))
            .map(|ep| ep.id.as_text())
            .ok_or_else(|| {
                ScrapeError::NotFound(format!(
                    "NetFilm has no episode {episode_number} for {:?}",
                    item.name
                ))
            })
    }

    async fn fetch_stream(&self, item_id: &str, episode_id: Option<&str>) -> Result<MwStream> {
        let mut opts = RequestOptions::new(&self.base_url).query("id", item_id);
        if let Some(episode_id) = episode_id {
            opts = opts
                .query("category", EPISODE_CATEGORY)
                .query("episode", episode_id);
        }
        let data: StreamData = self.get(EPISODE_PATH, opts).await?;
        normalize_stream(data)
    }

    async fn scrape_movie(&self, ctx: &ScrapeContext<'_>) -> Result<MwStream> {
        let results = self.search(&ctx.media.title).await?;
        ctx.progress(25);

        let item = find_movie(&results, ctx.media)?;

        ctx.progress(75);
        self.fetch_stream(&item.id.as_text(), None).await
    }

    async fn scrape_series(&self, ctx: &ScrapeContext<'_>) -> Result<MwStream> {
        let season = ctx.media.season()?;
        let episode_id = ctx.episode_id.ok_or_else(|| {
            ScrapeError::Validation("series resolution requires an episode id".into())
        })?;
        let episode_number = season.episode_number(episode_id).ok_or_else(|| {
            ScrapeError::Validation(format!(
                "episode {episode_id:?} is not part of season {}",
                season.number
            ))
        })?;

        let results = self.search(&ctx.media.title).await?;
        ctx.progress(25);

        let item = find_season(&results, &ctx.media.title, season.number)?;

        ctx.progress(50);
        let upstream_episode = self.find_episode_id(item, episode_number).await?;

        ctx.progress(75);
        self.fetch_stream(&item.id.as_text(), Some(&upstream_episode))
            .await
    }
}

#[async_trait]
impl Provider for NetFilmProvider {
    fn id(&self) -> &str {
        "netfilm"
    }

    fn display_name(&self) -> &str {
        "NetFilm"
    }

    fn rank(&self) -> i32 {
        15
    }

    fn media_types(&self) -> &[MediaType] {
        MEDIA_TYPES
    }

    async fn scrape(&self, ctx: &ScrapeContext<'_>) -> Result<ScrapeResult> {
        let media_type = ctx.media.media_type;
        if !self.supports(media_type) {
            return Err(ScrapeError::UnsupportedMediaType {
                provider_id: self.id().to_string(),
                media_type,
            });
        }

        let stream = match media_type {
            MediaType::Movie => self.scrape_movie(ctx).await?,
            MediaType::Series => self.scrape_series(ctx).await?,
        };

        ctx.progress(100);
        Ok(ScrapeResult::from_stream(stream))
    }
}

/// Season number encoded in a NetFilm title such as `"Show Name 2"`.
///
/// The last whitespace-separated token is read as an integer (leading digits
/// only). Titles without one, or with `0`, are season 1.
pub fn season_from_title(name: &str) -> u32 {
    name.split_whitespace()
        .next_back()
        .map(|token| {
            token
                .chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>()
        })
        .and_then(|digits| digits.parse::<u32>().ok())
        .filter(|&season| season > 0)
        .unwrap_or(1)
}

/// Strip the SRT→VTT conversion wrapper, recovering the source URL.
pub fn unwrap_caption_url(url: &str) -> String {
    url.replacen(SRT_TO_VTT_PREFIX, "", 1)
}

/// Rewrite known mirror hosts to their canonical alias.
///
/// Only the host is touched. Aliases never produce another rewrite source,
/// so the result is the same in any rule order and a second pass is a no-op.
pub fn rewrite_cdn_host(stream_url: &str) -> Result<String> {
    let mut url = Url::parse(stream_url)
        .map_err(|e| ScrapeError::UpstreamShape(format!("stream URL {stream_url:?}: {e}")))?;

    let Some(host) = url.host_str() else {
        return Ok(stream_url.to_string());
    };
    let rewritten = CDN_ALIASES
        .iter()
        .fold(host.to_string(), |h, (from, to)| h.replace(from, to));
    if rewritten == host {
        return Ok(stream_url.to_string());
    }

    url.set_host(Some(&rewritten))
        .map_err(|e| ScrapeError::UpstreamShape(format!("stream host {rewritten:?}: {e}")))?;
    Ok(url.to_string())
}

fn find_movie<'a>(results: &'a [SearchItem], media: &MediaMeta) -> Result<&'a SearchItem> {
    results
        .iter()
        .find(|item| {
            item.name == media.title
                && item
                    .release_time
                    .as_ref()
                    .is_some_and(|year| year.as_text() == media.year)
        })
        .ok_or_else(|| {
            ScrapeError::NotFound(format!(
                "NetFilm has no movie {:?} ({})",
                media.title, media.year
            ))
        })
}

fn find_season<'a>(results: &'a [SearchItem], title: &str, season: u32) -> Result<&'a SearchItem> {
    results
        .iter()
        .filter(|item| item.name.contains(title))
        .find(|item| season_from_title(&item.name) == season)
        .ok_or_else(|| {
            ScrapeError::NotFound(format!("NetFilm has no season {season} of {title:?}"))
        })
}

/// Highest numeric quality; ties keep the earliest. Non-numeric qualities
/// lose to every numeric one.
fn select_best_quality(variants: &[QualityVariant]) -> Option<&QualityVariant> {
    let mut best: Option<(&QualityVariant, f64)> = None;
    for variant in variants {
        let score = variant.resolution().unwrap_or(f64::NEG_INFINITY);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((variant, score)),
        }
    }
    best.map(|(variant, _)| variant)
}

fn normalize_stream(data: StreamData) -> Result<MwStream> {
    let source = select_best_quality(&data.qualities)
        .ok_or_else(|| ScrapeError::UpstreamShape("NetFilm returned no quality variants".into()))?;

    let captions = data
        .subtitles
        .unwrap_or_default()
        .into_iter()
        .map(|sub| MwCaption {
            url: unwrap_caption_url(&sub.url),
            caption_type: CaptionType::Srt,
            lang_iso: sub.language,
            needs_proxy: false,
        })
        .collect();

    let stream = MwStream {
        stream_url: rewrite_cdn_host(&source.url)?,
        stream_type: StreamType::Hls,
        quality: source.rung(),
        captions,
    };
    stream.validate()?;
    Ok(stream)
}

// ============================================================================
// NetFilm API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Upstream fields that arrive as either a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Entries are decoded one by one so a malformed neighbour cannot hide a match.
#[derive(Debug, Deserialize)]
struct SearchData {
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    id: Scalar,
    name: String,
    release_time: Option<Scalar>,
    #[serde(default)]
    category_tag: Vec<CategoryTag>,
}

#[derive(Debug, Deserialize)]
struct CategoryTag {
    id: Scalar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailData {
    #[serde(default)]
    episode_vo: Vec<EpisodeVo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeVo {
    id: Scalar,
    series_no: Scalar,
}

#[derive(Debug, Deserialize)]
struct StreamData {
    #[serde(default)]
    qualities: Vec<QualityVariant>,
    #[serde(default)]
    subtitles: Option<Vec<Subtitle>>,
}

#[derive(Debug, Deserialize)]
struct QualityVariant {
    quality: Scalar,
    url: String,
}

impl QualityVariant {
    /// Numeric resolution of `"720"`, `"720p"` or `720.0`.
    fn resolution(&self) -> Option<f64> {
        let value = match &self.quality {
            Scalar::Number(n) => n.as_f64(),
            Scalar::Text(s) => {
                let s = s.trim();
                s.strip_suffix(['p', 'P']).unwrap_or(s).trim().parse().ok()
            }
        };
        value.filter(|v| v.is_finite())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rung(&self) -> StreamQuality {
        match self.resolution() {
            Some(v) if v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v) => {
                StreamQuality::from_token(&(v as u32).to_string())
            }
            _ => StreamQuality::Unknown,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Subtitle {
    url: String,
    language: String,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::{json, Value};
    use tokio::sync::mpsc;

    use super::*;
    use crate::error::FetchError;
    use crate::media::{EpisodeMeta, SeasonData};
    use crate::provider::ProgressReporter;

    /// Answers by request path and records every call.
    #[derive(Default)]
    struct ScriptedFetcher {
        responses: HashMap<&'static str, Value>,
        calls: Mutex<Vec<(String, RequestOptions)>>,
    }

    impl ScriptedFetcher {
        fn with(mut self, path: &'static str, body: Value) -> Self {
            self.responses.insert(path, body);
            self
        }

        fn calls(&self) -> Vec<(String, RequestOptions)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JsonFetcher for ScriptedFetcher {
        async fn request(
            &self,
            path: &str,
            opts: &RequestOptions,
        ) -> std::result::Result<Value, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((path.to_string(), opts.clone()));
            self.responses
                .get(path)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    status: 404,
                    url: path.to_string(),
                })
        }
    }

    fn variant(quality: Value, url: &str) -> QualityVariant {
        serde_json::from_value(json!({ "quality": quality, "url": url })).unwrap()
    }

    fn stream_body() -> Value {
        json!({
            "data": {
                "qualities": [
                    { "quality": 360, "url": "https://akm-cdn.example/360.m3u8" },
                    { "quality": 720, "url": "https://gg-cdn.example/720.m3u8" },
                    { "quality": 480, "url": "https://akm-cdn.example/480.m3u8" }
                ],
                "subtitles": [
                    { "url": "https://convert-srt-to-vtt.vercel.app/?url=https://subs.example/en.srt", "language": "en" },
                    { "url": "https://subs.example/fr.srt", "language": "fr" }
                ]
            }
        })
    }

    fn series_media() -> MediaMeta {
        MediaMeta::series(
            "Show Name",
            "2019",
            SeasonData {
                id: "season-2".into(),
                number: 2,
                episodes: vec![
                    EpisodeMeta { id: "cat-e1".into(), number: 1, title: None },
                    EpisodeMeta { id: "cat-e2".into(), number: 2, title: None },
                ],
            },
        )
    }

    async fn run(
        fetcher: Arc<ScriptedFetcher>,
        media: &MediaMeta,
        episode: Option<&str>,
    ) -> (Result<ScrapeResult>, Vec<u8>) {
        let provider = NetFilmProvider::new(fetcher);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reporter = ProgressReporter::new("netfilm", Some(tx), 0, 1);
        let ctx = ScrapeContext::new(media, episode, &reporter);
        let result = provider.scrape(&ctx).await;
        let mut progress = Vec::new();
        while let Ok(event) = rx.try_recv() {
            progress.push(event.local);
        }
        (result, progress)
    }

    #[test]
    fn season_parsing_reads_trailing_integer() {
        assert_eq!(season_from_title("Show Name 2"), 2);
        assert_eq!(season_from_title("Show Name 12"), 12);
        assert_eq!(season_from_title("Show Name"), 1);
        assert_eq!(season_from_title("Show Name 0"), 1);
        assert_eq!(season_from_title("Show Name 3rd"), 3);
        assert_eq!(season_from_title(""), 1);
    }

    #[test]
    fn caption_prefix_is_stripped() {
        assert_eq!(
            unwrap_caption_url("https://convert-srt-to-vtt.vercel.app/?url=https://x/y.srt"),
            "https://x/y.srt"
        );
        assert_eq!(unwrap_caption_url("https://x/y.srt"), "https://x/y.srt");
    }

    #[test]
    fn cdn_mirrors_rewrite_to_alias() {
        assert_eq!(
            rewrite_cdn_host("https://akm-cdn.example/a.m3u8").unwrap(),
            "https://aws-cdn.example/a.m3u8"
        );
        assert_eq!(
            rewrite_cdn_host("https://gg-cdn.example/a.m3u8").unwrap(),
            "https://aws-cdn.example/a.m3u8"
        );
    }

    #[test]
    fn cdn_rewrite_is_idempotent_and_host_only() {
        let once = rewrite_cdn_host("https://akm-cdn.example/akm-cdn/a.m3u8?h=gg-cdn").unwrap();
        assert_eq!(once, "https://aws-cdn.example/akm-cdn/a.m3u8?h=gg-cdn");
        assert_eq!(rewrite_cdn_host(&once).unwrap(), once);
        assert_eq!(
            rewrite_cdn_host("https://other.example/a.m3u8").unwrap(),
            "https://other.example/a.m3u8"
        );
    }

    #[test]
    fn cdn_rewrite_rejects_garbage() {
        assert!(matches!(
            rewrite_cdn_host("not a url"),
            Err(ScrapeError::UpstreamShape(_))
        ));
    }

    #[test]
    fn best_quality_is_highest_numeric() {
        let variants = vec![
            variant(json!(360), "a"),
            variant(json!("480"), "b"),
            variant(json!(720), "c"),
        ];
        let best = select_best_quality(&variants).unwrap();
        assert_eq!(best.url, "c");
        assert_eq!(best.rung(), StreamQuality::Q720p);
    }

    #[test]
    fn suffixed_quality_tokens_rank_numerically() {
        let data: StreamData = serde_json::from_value(json!({
            "qualities": [
                { "quality": "480p", "url": "https://cdn.example/480.m3u8" },
                { "quality": "1080p", "url": "https://cdn.example/1080.m3u8" },
                { "quality": "auto", "url": "https://cdn.example/auto.m3u8" }
            ]
        }))
        .unwrap();
        let stream = normalize_stream(data).unwrap();
        assert_eq!(stream.stream_url, "https://cdn.example/1080.m3u8");
        assert_eq!(stream.quality, StreamQuality::Q1080p);
    }

    #[test]
    fn whole_float_quality_maps_to_rung() {
        let data: StreamData = serde_json::from_value(json!({
            "qualities": [
                { "quality": 360, "url": "https://cdn.example/360.m3u8" },
                { "quality": 720.0, "url": "https://cdn.example/720.m3u8" }
            ]
        }))
        .unwrap();
        let stream = normalize_stream(data).unwrap();
        assert_eq!(stream.stream_url, "https://cdn.example/720.m3u8");
        assert_eq!(stream.quality, StreamQuality::Q720p);
    }

    #[test]
    fn fractional_quality_is_unknown() {
        assert_eq!(variant(json!(720.5), "a").rung(), StreamQuality::Unknown);
        assert_eq!(variant(json!("auto"), "b").rung(), StreamQuality::Unknown);
        assert_eq!(variant(json!(" 480P "), "c").rung(), StreamQuality::Q480p);
    }

    #[test]
    fn quality_ties_keep_first_seen() {
        let variants = vec![
            variant(json!(720), "first"),
            variant(json!("720"), "second"),
            variant(json!("auto"), "third"),
        ];
        assert_eq!(select_best_quality(&variants).unwrap().url, "first");
    }

    #[test]
    fn unmapped_best_quality_is_unknown() {
        let data: StreamData = serde_json::from_value(json!({
            "qualities": [
                { "quality": 1080, "url": "https://cdn.example/1080.m3u8" },
                { "quality": "2160", "url": "https://cdn.example/2160.m3u8" }
            ]
        }))
        .unwrap();
        let stream = normalize_stream(data).unwrap();
        assert_eq!(stream.stream_url, "https://cdn.example/2160.m3u8");
        assert_eq!(stream.quality, StreamQuality::Unknown);
        assert!(stream.captions.is_empty());
    }

    #[test]
    fn null_subtitles_normalize_to_empty() {
        let data: StreamData = serde_json::from_value(json!({
            "qualities": [{ "quality": 480, "url": "https://cdn.example/480.m3u8" }],
            "subtitles": null
        }))
        .unwrap();
        assert!(normalize_stream(data).unwrap().captions.is_empty());
    }

    #[test]
    fn empty_variants_are_a_shape_error() {
        let data: StreamData = serde_json::from_value(json!({ "qualities": [] })).unwrap();
        assert!(matches!(
            normalize_stream(data),
            Err(ScrapeError::UpstreamShape(_))
        ));
    }

    #[test]
    fn empty_stream_url_is_rejected() {
        let data: StreamData = serde_json::from_value(json!({
            "qualities": [{ "quality": 720, "url": "" }]
        }))
        .unwrap();
        assert!(normalize_stream(data).is_err());
    }

    #[tokio::test]
    async fn movie_resolves_through_search_and_episode() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .with(
                    SEARCH_PATH,
                    json!({ "data": { "results": [
                        { "id": 10, "name": "Heat", "releaseTime": "1986" },
                        { "id": 11, "name": "Heat 2", "releaseTime": "1995" },
                        { "id": 12, "name": "Heat", "releaseTime": "1995" }
                    ] } }),
                )
                .with(EPISODE_PATH, stream_body()),
        );

        let media = MediaMeta::movie("Heat", "1995");
        let (result, progress) = run(Arc::clone(&fetcher), &media, None).await;
        let stream = result.unwrap().stream.unwrap();

        assert_eq!(stream.stream_url, "https://aws-cdn.example/720.m3u8");
        assert_eq!(stream.quality, StreamQuality::Q720p);
        assert_eq!(stream.stream_type, StreamType::Hls);
        assert_eq!(stream.captions.len(), 2);
        assert_eq!(stream.captions[0].url, "https://subs.example/en.srt");
        assert_eq!(stream.captions[0].caption_type, CaptionType::Srt);
        assert_eq!(stream.captions[1].lang_iso, "fr");
        assert_eq!(progress, vec![25, 75, 100]);

        let calls = fetcher.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1.query_value("keyword"), Some("Heat"));
        assert_eq!(calls[1].0, EPISODE_PATH);
        assert_eq!(calls[1].1.query_value("id"), Some("12"));
        assert_eq!(calls[1].1.query_value("episode"), None);
    }

    #[tokio::test]
    async fn movie_year_mismatch_is_not_found() {
        let fetcher = Arc::new(ScriptedFetcher::default().with(
            SEARCH_PATH,
            json!({ "data": { "results": [{ "id": 1, "name": "Heat", "releaseTime": 1986 }] } }),
        ));

        let media = MediaMeta::movie("Heat", "1995");
        let (result, progress) = run(Arc::clone(&fetcher), &media, None).await;
        assert!(matches!(result, Err(ScrapeError::NotFound(_))));
        assert_eq!(progress, vec![25]);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn numeric_release_year_matches() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .with(
                    SEARCH_PATH,
                    json!({ "data": { "results": [{ "id": "abc", "name": "Heat", "releaseTime": 1995 }] } }),
                )
                .with(EPISODE_PATH, stream_body()),
        );
        let media = MediaMeta::movie("Heat", "1995");
        let (result, _) = run(Arc::clone(&fetcher), &media, None).await;
        assert!(result.is_ok());
        assert_eq!(fetcher.calls()[1].1.query_value("id"), Some("abc"));
    }

    #[tokio::test]
    async fn series_resolves_season_and_episode() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .with(
                    SEARCH_PATH,
                    json!({ "data": { "results": [
                        { "id": 100, "name": "Show Name", "categoryTag": [{ "id": 2 }] },
                        { "id": 200, "name": "Show Name 2", "categoryTag": [{ "id": 2 }, { "id": 9 }] },
                        { "id": 300, "name": "Other Show 2", "categoryTag": [{ "id": 2 }] }
                    ] } }),
                )
                .with(
                    DETAIL_PATH,
                    json!({ "data": { "episodeVo": [
                        { "id": 5001, "seriesNo": 1 },
                        { "id": 5002, "seriesNo": 2 }
                    ] } }),
                )
                .with(EPISODE_PATH, stream_body()),
        );

        let media = series_media();
        let (result, progress) = run(Arc::clone(&fetcher), &media, Some("cat-e2")).await;
        let stream = result.unwrap().stream.unwrap();
        assert_eq!(stream.stream_url, "https://aws-cdn.example/720.m3u8");
        assert_eq!(progress, vec![25, 50, 75, 100]);

        let calls = fetcher.calls();
        assert_eq!(calls[1].0, DETAIL_PATH);
        assert_eq!(calls[1].1.query_value("id"), Some("200"));
        assert_eq!(calls[1].1.query_value("category"), Some("2"));
        assert_eq!(calls[2].0, EPISODE_PATH);
        assert_eq!(calls[2].1.query_value("id"), Some("200"));
        assert_eq!(calls[2].1.query_value("category"), Some("1"));
        assert_eq!(calls[2].1.query_value("episode"), Some("5002"));
    }

    #[tokio::test]
    async fn series_without_matching_season_is_not_found() {
        let fetcher = Arc::new(ScriptedFetcher::default().with(
            SEARCH_PATH,
            json!({ "data": { "results": [
                { "id": 100, "name": "Show Name", "categoryTag": [{ "id": 2 }] },
                { "id": 300, "name": "Show Name 3", "categoryTag": [{ "id": 2 }] }
            ] } }),
        ));

        let media = series_media();
        let (result, _) = run(Arc::clone(&fetcher), &media, Some("cat-e1")).await;
        assert!(matches!(result, Err(ScrapeError::NotFound(_))));
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn series_missing_upstream_episode_is_not_found() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .with(
                    SEARCH_PATH,
                    json!({ "data": { "results": [
                        { "id": 200, "name": "Show Name 2", "categoryTag": [{ "id": 2 }] }
                    ] } }),
                )
                .with(DETAIL_PATH, json!({ "data": { "episodeVo": [{ "id": 1, "seriesNo": 1 }] } })),
        );

        let media = series_media();
        let (result, _) = run(fetcher, &media, Some("cat-e2")).await;
        assert!(matches!(result, Err(ScrapeError::NotFound(_))));
    }

    #[tokio::test]
    async fn series_with_unknown_episode_id_is_validation_error() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let media = series_media();
        let (result, progress) = run(Arc::clone(&fetcher), &media, Some("nope")).await;
        assert!(matches!(result, Err(ScrapeError::Validation(_))));
        assert!(progress.is_empty());
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_search_entries_are_skipped() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .with(
                    SEARCH_PATH,
                    json!({ "data": { "results": [
                        { "id": 1, "name": null },
                        { "name": "Heat", "releaseTime": "1995" },
                        { "id": 7, "name": "Heat", "releaseTime": "1995" }
                    ] } }),
                )
                .with(EPISODE_PATH, stream_body()),
        );
        let media = MediaMeta::movie("Heat", "1995");
        let (result, _) = run(Arc::clone(&fetcher), &media, None).await;
        assert!(result.is_ok());
        assert_eq!(fetcher.calls()[1].1.query_value("id"), Some("7"));
    }

    #[tokio::test]
    async fn missing_results_is_a_shape_error() {
        let fetcher = Arc::new(ScriptedFetcher::default().with(SEARCH_PATH, json!({ "data": {} })));
        let media = MediaMeta::movie("Heat", "1995");
        let (result, _) = run(fetcher, &media, None).await;
        assert!(matches!(result, Err(ScrapeError::UpstreamShape(_))));
    }

    #[tokio::test]
    async fn fetch_failures_propagate_unchanged() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let media = MediaMeta::movie("Heat", "1995");
        let (result, progress) = run(fetcher, &media, None).await;
        assert!(matches!(
            result,
            Err(ScrapeError::Fetch(FetchError::Status { status: 404, .. }))
        ));
        assert!(progress.is_empty());
    }

    #[test]
    fn descriptor_matches_registration() {
        let provider = NetFilmProvider::new(Arc::new(ScriptedFetcher::default()));
        assert_eq!(provider.id(), "netfilm");
        assert_eq!(provider.display_name(), "NetFilm");
        assert_eq!(provider.rank(), 15);
        assert!(provider.supports(MediaType::Movie));
        assert!(provider.supports(MediaType::Series));
        assert_eq!(provider.base_url(), NETFILM_BASE_URL);
    }
}
