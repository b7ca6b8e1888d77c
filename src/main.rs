//! Process entry point: loads configuration, wires the client stack, and
//! serves the MCP stdio transport.

use std::sync::Arc;

use rmcp::transport::io::stdio;
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;
use xray_mcp_core::auth::AuthManager;
use xray_mcp_core::config::{Config, ProcessEnv};
use xray_mcp_core::graphql::GraphQLClient;
use xray_mcp_core::resolve::IdResolver;
use xray_mcp_core::server::XrayMcpServer;
use xray_mcp_core::tools::ToolContext;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // Best-effort: a missing .env is not an error, real deployments set
    // these in the process environment directly.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env(&ProcessEnv)?;
    tracing::info!(base_url = %config.base_url, "starting xray-mcp");

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;
    let auth = Arc::new(AuthManager::new(config.clone(), http.clone()));
    let graphql = GraphQLClient::new(http, &config.base_url, auth);
    let resolver = Arc::new(IdResolver::new(graphql.clone()));

    let ctx = ToolContext { graphql, resolver };
    let server = XrayMcpServer::new(ctx);

    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
