//! MCP server adapter for a generated [`ToolSet`].
//!
//! Tool calls are blocking (each builds and runs a command tree), so they are
//! moved onto tokio's blocking pool with the request's cancellation token.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler};

use crate::context::CallContext;
use crate::tools::ToolSet;

#[derive(Debug, Clone)]
pub struct ToolServer {
    tools: Arc<ToolSet>,
    instructions: Option<String>,
}

impl ToolServer {
    pub fn new(tools: ToolSet) -> Self {
        Self {
            tools: Arc::new(tools),
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }
}

impl ServerHandler for ToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: self.instructions.clone(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name.to_string();
        let tool = self
            .tools
            .get(&name)
            .cloned()
            .ok_or_else(|| McpError::invalid_params(format!("unknown tool: {name}"), None))?;
        let args = request.arguments.unwrap_or_default();
        let call = CallContext::new()
            .with_cancellation(context.ct.clone())
            .with_tool(name.clone());

        tracing::debug!(tool = %name, "tool call");
        let dispatched = tokio::task::spawn_blocking(move || tool.call(&call, &args))
            .await
            .map_err(|e| McpError::internal_error(format!("tool '{name}' panicked: {e}"), None))?;

        let (result, error) = dispatched.into_parts();
        if let Some(err) = error {
            tracing::warn!(tool = %name, error = %err, "tool call failed");
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_advertises_tools() {
        let server = ToolServer::new(ToolSet::default()).with_instructions("demo tools");
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.instructions.as_deref(), Some("demo tools"));
        assert!(server.tools().is_empty());
    }
}
