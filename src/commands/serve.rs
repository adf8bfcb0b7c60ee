//! Serve command - run the JSON recommend API

use std::net::SocketAddr;

use anyhow::{Context, Result};
use colored::Colorize;

use theme_scout::config::Settings;
use theme_scout::search::LiveRecommender;

/// Run serve command
pub async fn run(settings: Settings, bind: &str) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {}", bind))?;
    let recommender = LiveRecommender::from_settings(&settings)
        .context("failed to configure embedding and search clients")?;

    eprintln!(
        "{} listening on {}",
        "→".dimmed(),
        format!("http://{addr}/api/recommend").cyan()
    );
    theme_scout::http::serve(recommender, settings, addr).await
}
