//! Per-call context handed to command handlers.
//!
//! [`CallContext`] is owned by the caller of a tool (server, CLI) and carries
//! cancellation plus request labels. [`ExecContext`] pairs it with the live
//! [`CallToolResult`] for the duration of one execution.

use rmcp::model::CallToolResult;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancellation: Option<CancellationToken>,
    tool: Option<String>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Name of the tool being called, for logs.
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn tool(&self) -> Option<&str> {
        self.tool.as_deref()
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Bind the context to the result object of one execution.
    pub fn with_result<'a>(&'a self, result: &'a mut CallToolResult) -> ExecContext<'a> {
        ExecContext { call: self, result }
    }
}

/// Context of one running command.
///
/// Handlers may write to [`ExecContext::result`] directly; when they add
/// content there, captured output is not used for the response.
#[derive(Debug)]
pub struct ExecContext<'a> {
    call: &'a CallContext,
    result: &'a mut CallToolResult,
}

impl<'a> ExecContext<'a> {
    pub fn call(&self) -> &CallContext {
        self.call
    }

    pub fn result(&mut self) -> &mut CallToolResult {
        self.result
    }

    pub fn is_cancelled(&self) -> bool {
        self.call.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_observed() {
        let token = CancellationToken::new();
        let call = CallContext::new()
            .with_cancellation(token.clone())
            .with_tool("demo_add");
        assert!(!call.is_cancelled());
        token.cancel();
        assert!(call.is_cancelled());
        assert_eq!(call.tool(), Some("demo_add"));
    }

    #[test]
    fn without_token_never_cancelled() {
        let call = CallContext::new();
        let mut result = CallToolResult::success(Vec::new());
        let ctx = call.with_result(&mut result);
        assert!(!ctx.is_cancelled());
    }
}
