/*!
`list.rs`

Implements the `list` subcommand: every tool generated from the demo tree,
as a table or as JSON.

JSON Output Shape:
{
  "status": "ok",
  "count": 2,
  "tools": [
    { "name": "add", "title": "add", "description": "...", "parameters": ["a:integer", "b:integer"] }
  ]
}
*/

use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};

use cli_mcp::ToolSet;

use crate::cmd::format::{Role, StyleOptions, TableOpts, box_header, color, emoji, table, truncate_ellipsis};
use crate::cmd::shared::extract_params;

/// CLI arguments for `cli-mcp list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_list(args: ListArgs, tools: &ToolSet) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&list_json(tools))?);
        return Ok(());
    }
    println!("{}", render_list(tools, &StyleOptions::detect()));
    Ok(())
}

fn param_summary(tool: &rmcp::model::Tool) -> Vec<String> {
    extract_params(tool)
        .into_iter()
        .map(|p| {
            let marker = if p.required { "*" } else { "" };
            format!("{}{marker}:{}", p.name, p.kind)
        })
        .collect()
}

fn list_json(tools: &ToolSet) -> Value {
    let items: Vec<Value> = tools
        .iter()
        .map(|t| {
            json!({
                "name": t.name(),
                "title": t.tool.annotations.as_ref().and_then(|a| a.title.clone()),
                "description": t.tool.description.as_deref().unwrap_or_default(),
                "parameters": param_summary(&t.tool),
            })
        })
        .collect();
    json!({
        "status": "ok",
        "count": tools.len(),
        "tools": items,
    })
}

fn render_list(tools: &ToolSet, style: &StyleOptions) -> String {
    let mut out = vec![box_header(
        format!("{} Tools ({})", emoji("list", style), tools.len()),
        Some("demo command tree"),
        style,
    )];

    if tools.is_empty() {
        out.push(color(Role::Dim, format!("{} (none)", emoji("info", style)), style));
        return out.join("\n");
    }

    let rows: Vec<Vec<String>> = tools
        .iter()
        .enumerate()
        .map(|(idx, t)| {
            let params = param_summary(&t.tool);
            let params = if params.is_empty() {
                "-".to_string()
            } else {
                params.join(", ")
            };
            let desc = t.tool.description.as_deref().unwrap_or_default().replace('\n', " ");
            vec![
                (idx + 1).to_string(),
                t.name().to_string(),
                params,
                truncate_ellipsis(&desc, 90),
            ]
        })
        .collect();

    out.push(table(
        &["#", "NAME", "PARAMS", "DESCRIPTION"],
        &rows,
        TableOpts {
            max_width: style.term_width,
            ..TableOpts::default()
        },
        style,
    ));
    out.push(format!(
        "\n{} {}",
        emoji("info", style),
        color(
            Role::Dim,
            "Use `cli-mcp get <name>` for details; `*` marks required parameters",
            style
        )
    ));
    out.join("\n")
}
