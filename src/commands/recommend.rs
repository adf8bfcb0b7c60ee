//! Recommend command - rank companies for an investment theme

use anyhow::{Context, Result};
use colored::Colorize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use theme_scout::config::Settings;
use theme_scout::search::{LiveRecommender, RankedResult};

const DESCRIPTION_WIDTH: usize = 100;

/// Run recommend command
pub async fn run(
    settings: &Settings,
    query: &str,
    limit: Option<usize>,
    json: bool,
    show_news: bool,
) -> Result<()> {
    let recommender = LiveRecommender::from_settings(settings)
        .context("failed to configure embedding and search clients")?;
    let limit = settings.resolve_limit(limit);

    let results = recommender
        .recommend(query, Some(limit))
        .await
        .with_context(|| format!("recommendation failed for {:?}", query.trim()))?;

    if json {
        let output = serde_json::json!({
            "query": query.trim(),
            "generated_at": chrono::Local::now().to_rfc3339(),
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_results(query.trim(), &results, show_news);
    Ok(())
}

fn print_results(query: &str, results: &[RankedResult], show_news: bool) {
    if results.is_empty() {
        println!("{} No companies found for: {}", "→".dimmed(), query.cyan());
        return;
    }

    println!(
        "{} {} companies for: {}",
        "→".dimmed(),
        results.len(),
        query.cyan()
    );
    println!();

    for (i, result) in results.iter().enumerate() {
        let score_str = format!("{:.2}", result.combined_score);
        let score_colored = match ScoreBand::of(result.combined_score) {
            ScoreBand::Strong => score_str.green(),
            ScoreBand::Medium => score_str.yellow(),
            ScoreBand::Weak => score_str.dimmed(),
        };

        let ticker = result.payload.nse.as_deref().unwrap_or("-");
        println!(
            "{}. [{}] {} ({})",
            (i + 1).to_string().bold(),
            score_colored,
            result.payload.name.cyan(),
            ticker
        );

        if !result.payload.company.is_empty() {
            println!(
                "   {}",
                truncate_to_width(&result.payload.company, DESCRIPTION_WIDTH).dimmed()
            );
        }

        if result.has_news() {
            let label = if result.news_count == 1 { "article" } else { "articles" };
            println!(
                "   {} {} {} (best {:.2})",
                "news:".magenta(),
                result.news_count,
                label,
                result.news_score
            );
            if show_news {
                for article in &result.relevant_news {
                    println!("     • {}", article.specific_title);
                }
            }
        }
        println!();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ScoreBand {
    Strong,
    Medium,
    Weak,
}

impl ScoreBand {
    /// Bands on the rounded percentage: 80 and up is strong, 50 and up medium.
    fn of(score: f64) -> Self {
        let percent = (score * 100.0).round();
        if percent >= 80.0 {
            Self::Strong
        } else if percent >= 50.0 {
            Self::Medium
        } else {
            Self::Weak
        }
    }
}

/// Truncates to a terminal display width, keeping wide characters whole.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(3) {
            break;
        }
        width += w;
        out.push(ch);
    }
    out.push_str("...");
    out
}
