//! Expose a command tree as a flat set of MCP tools.
//!
//! Pipeline (setup, once): `tree::leaf_commands` -> `schema::build_schema`
//! + `resolve::*` -> `tools::ToolSet`.
//! Per call: `dispatch::Dispatcher` rebuilds the tree, re-creates the
//! command line from the argument map and captures stdout / stderr into a
//! `CallToolResult`.
//!
//! Key items:
//!   command::{CommandNode, Flag, FlagKind}  command model + clap lowering
//!   tools::generate_tools                   descriptors + handlers
//!   server::ToolServer                      rmcp ServerHandler adapter
//!
//! ```no_run
//! use std::sync::Arc;
//! use cli_mcp::command::{CommandNode, Flag};
//! use cli_mcp::tools::{ToolOptions, generate_tools};
//!
//! fn build() -> CommandNode {
//!     CommandNode::new("calc").subcommand(
//!         CommandNode::new("add")
//!             .about("Add two numbers")
//!             .flag(Flag::int("a", 0, "First number"))
//!             .flag(Flag::int("b", 0, "Second number"))
//!             .run(|inv| {
//!                 let sum = inv.get_int("a")? + inv.get_int("b")?;
//!                 inv.print(format!("Result: {sum}"));
//!                 Ok(())
//!             }),
//!     )
//! }
//!
//! let tools = generate_tools(Arc::new(build), &ToolOptions::default());
//! assert!(tools.get("add").is_some());
//! ```

pub mod command;
pub mod context;
pub mod dispatch;
pub mod resolve;
pub mod schema;
pub mod server;
pub mod tools;
pub mod tree;

pub use command::{CommandBuilder, CommandNode, Flag, FlagKind, FlagOverrides, ToolOverrides};
pub use context::{CallContext, ExecContext};
pub use dispatch::{Dispatched, Dispatcher};
pub use server::ToolServer;
pub use tools::{GeneratedTool, ToolOptions, ToolSet, generate_tools};
