use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod utils;

use cmd::{CallArgs, GetArgs, ListArgs, ServeArgs};

/// cli-mcp - expose a command tree as MCP tools
///
/// Command layout:
///   cli-mcp list [--json]
///   cli-mcp get  <TOOL> [--json]
///   cli-mcp call <TOOL> [--param k=v ...] [--param-file FILE] [--json] [--raw]
///   cli-mcp serve [--instructions TEXT]
///
/// Global flags / env:
///   -v / -vv        Increase verbosity
///   -q / --quiet    Errors only
///   RUST_LOG        Full filter override (falls back to CLI_MCP_LOG)
///
/// Examples:
///   cli-mcp list
///   cli-mcp get echo --json
///   cli-mcp call add --param a=5 --param b=10
///   cli-mcp serve
#[derive(Parser, Debug)]
#[command(
    name = "cli-mcp",
    version,
    author,
    about = "Expose a CLI command tree as MCP tools",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the generated tools
    List(ListArgs),

    /// Show one tool in detail
    Get(GetArgs),

    /// Invoke a tool in-process
    Call(CallArgs),

    /// Serve the tools over MCP on stdio
    Serve(ServeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let tools = cmd::demo::tool_set();
    tracing::debug!(count = tools.len(), "generated tools");

    match cli.command {
        Commands::List(args) => cmd::execute_list(args, &tools),
        Commands::Get(args) => cmd::execute_get(args, &tools),
        Commands::Call(args) => cmd::execute_call(args, &tools),
        Commands::Serve(args) => cmd::execute_serve(args, tools),
    }
}
