//! MCP Server for Theme Scout
//!
//! Exposes company recommendations as an MCP tool.

mod server;

pub use server::run_mcp_server;
