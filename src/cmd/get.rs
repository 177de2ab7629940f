/*!
`get.rs`

Implements the `get` subcommand: full descriptor of one generated tool.

Human output: boxed header, description, annotations, parameter table
(NAME | TYPE | REQ | DESCRIPTION).

JSON Output Shape:
{
  "status": "ok",
  "name": "echo",
  "tool": { <serialized rmcp Tool> },
  "command": ["echo"],
  "parameters": [
    { "name": "message", "type": "string", "required": true, "description": "..." }
  ]
}
*/

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use cli_mcp::{GeneratedTool, ToolSet};

use crate::cmd::format::{Role, StyleOptions, TableOpts, box_header, color, emoji, table};
use crate::cmd::shared::{extract_params, find_tool_case_insensitive};

/// CLI arguments for `cli-mcp get <TOOL>`
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Tool name (case-insensitive)
    #[arg(value_name = "TOOL")]
    pub name: String,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_get(args: GetArgs, tools: &ToolSet) -> Result<()> {
    let Some(tool) = find_tool_case_insensitive(tools, args.name.trim()) else {
        if args.json {
            println!(
                "{}",
                json!({ "status": "error", "error": "tool not found", "requested": args.name })
            );
        } else {
            println!("Tool '{}' not found.", args.name);
        }
        anyhow::bail!("tool '{}' not found", args.name);
    };

    if args.json {
        let value = tool_json(tool).context("failed to serialize tool")?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    println!("{}", render_tool(tool, &StyleOptions::detect()));
    Ok(())
}

fn tool_json(tool: &GeneratedTool) -> Result<serde_json::Value> {
    Ok(json!({
        "status": "ok",
        "name": tool.name(),
        "tool": serde_json::to_value(&tool.tool)?,
        "command": tool.handler.path(),
        "parameters": serde_json::to_value(extract_params(&tool.tool))?,
    }))
}

fn render_tool(tool: &GeneratedTool, style: &StyleOptions) -> String {
    let mut out = vec![box_header(
        format!("{} Tool: {}", emoji("tool", style), tool.name()),
        Some(format!("command: {}", tool.handler.path().join(" "))),
        style,
    )];

    let desc = tool.tool.description.as_deref().unwrap_or_default();
    out.push(format!(
        "Description: {}",
        if desc.is_empty() { "<none>" } else { desc }
    ));

    if let Some(a) = &tool.tool.annotations {
        let hint = |name: &str, value: Option<bool>| value.map(|v| format!("{name}={v}"));
        let hints: Vec<String> = [
            hint("readOnly", a.read_only_hint),
            hint("destructive", a.destructive_hint),
            hint("idempotent", a.idempotent_hint),
            hint("openWorld", a.open_world_hint),
        ]
        .into_iter()
        .flatten()
        .collect();
        out.push(format!("Title: {}", a.title.as_deref().unwrap_or("<none>")));
        if !hints.is_empty() {
            out.push(color(Role::Secondary, format!("Hints: {}", hints.join(", ")), style));
        }
    }

    let params = extract_params(&tool.tool);
    if params.is_empty() {
        out.push("Parameters: (none)".to_string());
        return out.join("\n");
    }
    let rows: Vec<Vec<String>> = params
        .into_iter()
        .map(|p| {
            vec![
                p.name,
                p.kind,
                if p.required { "yes".into() } else { "no".into() },
                if p.description.is_empty() {
                    "-".into()
                } else {
                    p.description
                },
            ]
        })
        .collect();
    out.push(table(
        &["NAME", "TYPE", "REQ", "DESCRIPTION"],
        &rows,
        TableOpts {
            max_width: style.term_width,
            ..TableOpts::default()
        },
        style,
    ));
    out.join("\n")
}
