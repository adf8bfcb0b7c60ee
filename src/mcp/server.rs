//! Theme Scout MCP Server implementation

use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use theme_scout::config::Settings;
use theme_scout::error::RecommendError;
use theme_scout::search::{LiveRecommender, RankedResult};

/// Parameters for recommend_companies tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecommendParams {
    /// Investment theme in plain language (e.g., "green hydrogen suppliers")
    #[schemars(description = "Investment theme in plain language")]
    pub query: String,
    /// Maximum number of companies to return
    #[schemars(description = "Maximum number of companies (default: 10)")]
    #[serde(default)]
    pub limit: Option<usize>,
    /// Include the matching news articles for each company
    #[schemars(description = "Include related news articles per company")]
    #[serde(default)]
    pub include_news: bool,
}

/// Company entry for JSON output
#[derive(Debug, Serialize)]
struct CompanyJson {
    rank: usize,
    id: String,
    name: String,
    ticker: Option<String>,
    description: String,
    score: f64,
    news_score: f64,
    news_count: usize,
    combined_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    news: Option<Vec<NewsJson>>,
}

#[derive(Debug, Serialize)]
struct NewsJson {
    title: String,
    summary: String,
}

fn render_results(results: Vec<RankedResult>, include_news: bool) -> Vec<CompanyJson> {
    results
        .into_iter()
        .enumerate()
        .map(|(i, r)| CompanyJson {
            rank: i + 1,
            id: r.id.to_string(),
            name: r.payload.name,
            ticker: r.payload.nse,
            description: r.payload.company,
            score: r.score,
            news_score: r.news_score,
            news_count: r.news_count,
            combined_score: r.combined_score,
            news: include_news.then(|| {
                r.relevant_news
                    .into_iter()
                    .map(|n| NewsJson {
                        title: n.specific_title,
                        summary: n.long_summary,
                    })
                    .collect()
            }),
        })
        .collect()
}

fn to_mcp_error(err: RecommendError) -> McpError {
    match err {
        RecommendError::InvalidInput(_) => McpError::invalid_params(err.to_string(), None),
        other => McpError::internal_error(format!("{}: {}", other.code(), other), None),
    }
}

/// Theme Scout MCP Service
#[derive(Clone)]
pub struct ScoutService {
    recommender: Arc<LiveRecommender>,
    settings: Arc<Settings>,
    tool_router: ToolRouter<Self>,
}

impl ScoutService {
    pub fn new(recommender: LiveRecommender, settings: Settings) -> Self {
        Self {
            recommender: Arc::new(recommender),
            settings: Arc::new(settings),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl ScoutService {
    /// Recommend listed companies for an investment theme
    #[tool(description = "Find listed companies matching an investment theme. Ranks companies by semantic similarity to the theme, boosted by related recent news.")]
    async fn recommend_companies(
        &self,
        params: Parameters<RecommendParams>,
    ) -> Result<CallToolResult, McpError> {
        let limit = self.settings.resolve_limit(params.0.limit);

        let results = self
            .recommender
            .recommend(&params.0.query, Some(limit))
            .await
            .map_err(to_mcp_error)?;

        let output = serde_json::to_string_pretty(&render_results(results, params.0.include_news))
            .map_err(|e| {
                to_mcp_error(RecommendError::Unexpected(format!(
                    "JSON serialization failed: {}",
                    e
                )))
            })?;

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }
}

#[tool_handler]
impl ServerHandler for ScoutService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Theme Scout MCP Server. Recommends listed companies for investment themes using company and news similarity.".to_string()
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Run the MCP server
pub async fn run_mcp_server(settings: Settings) -> Result<()> {
    use tokio::io::{stdin, stdout};

    let recommender = LiveRecommender::from_settings(&settings)?;
    let service = ScoutService::new(recommender, settings);
    let transport = (stdin(), stdout());
    tracing::info!("MCP server starting on stdio");
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
