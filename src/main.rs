mod commands;
#[cfg(feature = "mcp")]
mod mcp;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use theme_scout::config::Settings;

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Find listed companies for an investment theme, boosted by related news", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank companies for an investment theme
    #[command(alias = "r")]
    Recommend {
        query: String,
        #[arg(long, short, help = "Limit results")]
        limit: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
        #[arg(long, help = "List related news titles")]
        news: bool,
    },
    /// Show effective configuration
    Config {
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    // ===== HTTP API =====
    /// Serve the recommend API over HTTP
    #[cfg(feature = "http")]
    Serve {
        #[arg(long, env = "SCOUT_BIND", default_value = "127.0.0.1:8080")]
        bind: String,
    },

    // ===== MCP Server =====
    /// Start MCP server for Claude integration
    #[cfg(feature = "mcp")]
    Mcp {
        #[arg(long, help = "Show Claude configuration instructions")]
        install: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("theme_scout=info,scout=info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Recommend {
            query,
            limit,
            json,
            news,
        } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::recommend::run(&settings, &query, limit, json, news))
        }
        Commands::Config { json } => commands::config::run(&settings, json),

        #[cfg(feature = "http")]
        Commands::Serve { bind } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::serve::run(settings, &bind))
        }

        // MCP Server
        #[cfg(feature = "mcp")]
        Commands::Mcp { install } => {
            if install {
                print_mcp_install_instructions();
                Ok(())
            } else {
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(mcp::run_mcp_server(settings))
            }
        }
    }
}

#[cfg(feature = "mcp")]
fn print_mcp_install_instructions() {
    use colored::Colorize;

    let binary_path = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "scout".to_string());

    println!("{}", "MCP Server Installation Guide".bold().cyan());
    println!();
    println!("Add the following to your Claude configuration:");
    println!();
    println!("{}", "For Claude Desktop (~/.config/claude/claude_desktop_config.json):".dimmed());
    println!(r#"{{
  "mcpServers": {{
    "theme-scout": {{
      "command": "{}",
      "args": ["mcp"],
      "env": {{
        "OPENAI_API_KEY": "<your key>",
        "QDRANT_HOST": "<qdrant host>"
      }}
    }}
  }}
}}"#, binary_path);
    println!();
    println!("{}", "Available tools:".bold());
    println!("  • {} - Rank companies for an investment theme", "recommend_companies".green());
}
