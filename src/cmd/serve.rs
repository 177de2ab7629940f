/*!
`serve.rs`

Implements the `serve` subcommand: expose the generated tools over MCP on
stdin/stdout until the client disconnects.

stdout belongs to the transport; logs go to stderr.
*/

use anyhow::{Context, Result};
use clap::Args;
use rmcp::ServiceExt;
use rmcp::transport::io::stdio;

use cli_mcp::{ToolServer, ToolSet};

const DEFAULT_INSTRUCTIONS: &str =
    "Each tool runs one command of the demo CLI. Arguments map to command flags.";

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Instructions advertised to clients during initialization
    #[arg(long, value_name = "TEXT")]
    pub instructions: Option<String>,
}

pub fn execute_serve(args: ServeArgs, tools: ToolSet) -> Result<()> {
    let server = ToolServer::new(tools)
        .with_instructions(args.instructions.as_deref().unwrap_or(DEFAULT_INSTRUCTIONS));

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(async move {
        tracing::info!(tools = server.tools().len(), "serving MCP on stdio");
        let service = server
            .serve(stdio())
            .await
            .context("failed to start MCP server")?;
        let reason = service.waiting().await.context("MCP server task failed")?;
        tracing::info!(?reason, "MCP server stopped");
        Ok(())
    })
}
