use anyhow::Result;

use streamseek::{AppConfig, MediaType};

use super::build_registry;

pub fn cmd_providers(config: &AppConfig, media_type: Option<MediaType>) -> Result<()> {
    let registry = build_registry(config)?;
    let providers = match media_type {
        Some(media_type) => registry.list(media_type),
        None => registry.all().cloned().collect(),
    };

    if providers.is_empty() {
        println!("No providers enabled");
        return Ok(());
    }

    println!("{:<12} {:<16} {:>5}  TYPES", "ID", "NAME", "RANK");
    for provider in providers {
        let types = provider
            .media_types()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<12} {:<16} {:>5}  {types}",
            provider.id(),
            provider.display_name(),
            provider.rank()
        );
    }

    Ok(())
}
