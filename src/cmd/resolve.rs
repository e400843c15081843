use anyhow::{Context, Result};
use tokio::sync::mpsc;

use streamseek::{
    AppConfig, EpisodeMeta, MediaMeta, Orchestrator, ProgressEvent, ResolveRequest, Resolved,
    SeasonData,
};

use super::build_registry;

/// What the user asked for on the command line.
pub struct ResolveTarget {
    pub title: String,
    pub year: String,
    /// `(season, episode)` numbers; `None` for a movie.
    pub episode: Option<(u32, u32)>,
    pub provider: Option<String>,
}

impl ResolveTarget {
    /// Media description plus the episode id to request.
    ///
    /// The command line only knows ordinals, so the season gets a single
    /// episode whose id is derived from them.
    fn media(&self) -> (MediaMeta, Option<String>) {
        match self.episode {
            None => (MediaMeta::movie(&self.title, &self.year), None),
            Some((season, episode)) => {
                let episode_id = format!("s{season}e{episode}");
                let season = SeasonData {
                    id: format!("s{season}"),
                    number: season,
                    episodes: vec![EpisodeMeta {
                        id: episode_id.clone(),
                        number: episode,
                        title: None,
                    }],
                };
                (
                    MediaMeta::series(&self.title, &self.year, season),
                    Some(episode_id),
                )
            }
        }
    }
}

pub async fn cmd_resolve(config: &AppConfig, target: ResolveTarget, json: bool) -> Result<()> {
    let orchestrator = Orchestrator::new(build_registry(config)?);
    let (media, episode_id) = target.media();

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_progress(rx));

    let mut request = ResolveRequest::new(&media).progress(tx);
    if let Some(id) = episode_id.as_deref() {
        request = request.episode(id);
    }

    let outcome = match target.provider.as_deref() {
        Some(provider_id) => orchestrator.scrape_with(provider_id, request).await,
        None => orchestrator.resolve(request).await,
    };
    // The sender went away with the request, so the printer drains and exits.
    printer.await.ok();

    let resolved = outcome.with_context(|| format!("could not resolve {:?}", target.title))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else {
        print_resolved(&resolved);
    }
    Ok(())
}

async fn print_progress(mut rx: mpsc::UnboundedReceiver<ProgressEvent>) {
    while let Some(event) = rx.recv().await {
        eprintln!("[{:>3}%] {}", event.overall, event.provider_id);
    }
}

fn print_resolved(resolved: &Resolved) {
    print!("{}", render_resolved(resolved));
}

fn render_resolved(resolved: &Resolved) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "✅ Resolved via {}", resolved.provider_id);

    if let Some(stream) = &resolved.result.stream {
        let _ = writeln!(out, "   Stream: {}", stream.stream_url);
        let _ = writeln!(out, "   Type: {}", stream.stream_type.as_str());
        let _ = writeln!(out, "   Quality: {}", stream.quality.as_str());
        if !stream.captions.is_empty() {
            let _ = writeln!(out, "\n💬 Captions ({}):", stream.captions.len());
            for caption in &stream.captions {
                let _ = writeln!(
                    out,
                    "   {:<6} {}  {}",
                    caption.lang_iso,
                    caption.caption_type.as_str(),
                    caption.url
                );
            }
        }
    }

    if !resolved.result.embeds.is_empty() {
        let _ = writeln!(out, "\n🔗 Embeds:");
        for embed in &resolved.result.embeds {
            let _ = writeln!(out, "   {}: {}", embed.embed_type, embed.url);
        }
    }
    out
}
