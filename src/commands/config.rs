//! Config command - show effective settings

use anyhow::Result;
use colored::Colorize;

use theme_scout::config::Settings;

/// Run config command
pub fn run(settings: &Settings, json: bool) -> Result<()> {
    if json {
        let mut value = serde_json::to_value(settings)?;
        if let Some(map) = value.as_object_mut() {
            map.insert("openai_api_key_set".into(), settings.openai_api_key.is_some().into());
            map.insert("qdrant_api_key_set".into(), settings.qdrant_api_key.is_some().into());
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Theme Scout Configuration".bold());
    println!("{}", "=".repeat(60));
    println!();

    println!("{}", "Embedding".bold());
    println!("  endpoint:    {}", settings.openai_base_url);
    println!("  model:       {}", settings.embedding_model);
    match settings.embedding_dimensions {
        Some(d) => println!("  dimensions:  {}", d),
        None => println!("  dimensions:  {}", "unchecked".dimmed()),
    }
    println!("  api key:     {}", key_status(settings.openai_api_key.is_some()));
    println!();

    println!("{}", "Vector index".bold());
    match settings.qdrant_url() {
        Ok(url) => println!("  url:         {}", url),
        Err(e) => println!("  url:         {}", e.to_string().red()),
    }
    println!("  companies:   {}", settings.companies_collection);
    println!("  news:        {}", settings.news_collection);
    println!("  api key:     {}", key_status(settings.qdrant_api_key.is_some()));
    println!();

    println!("{}", "Requests".bold());
    println!("  timeout:     {}s", settings.timeout_seconds);
    println!("  retries:     {}", settings.max_retries);
    println!(
        "  limit:       {} (max {})",
        settings.default_limit, settings.max_limit
    );

    Ok(())
}

fn key_status(set: bool) -> colored::ColoredString {
    if set {
        "set".green()
    } else {
        "missing".yellow()
    }
}
