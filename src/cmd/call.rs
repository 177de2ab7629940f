/*!
`call.rs`

Implements the `call` subcommand: invoke one generated tool in-process,
exactly as an MCP client would.

Parameter injection:
    --param KEY=VALUE                 (repeatable)
    --param-file params.(json|yaml)   (merged; --param overrides file entries)
Values are coerced by the tool's input schema (integer / number / boolean /
array) before dispatch.

JSON Output:
{
  "status": "ok" | "error",
  "tool": "add",
  "elapsed_ms": 1,
  "arguments": { "a": 5, "b": 10 },
  "is_error": false,
  "text": "Result: 15",
  "result": { ...serialized call result... }     (with --raw)
}

A tool result flagged as an error makes the command exit non-zero.
*/

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use rmcp::model::JsonObject;
use serde_json::{Value, json};

use cli_mcp::{CallContext, ToolSet};

use crate::cmd::format::{Role, StyleOptions, TableOpts, box_header, color, emoji, table};
use crate::cmd::shared::{
    build_arguments_from_schema, find_tool_case_insensitive, load_param_file_into_map,
    parse_param_pairs, result_text, summarize_call_result,
};

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Tool name to invoke (case-insensitive)
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Provide parameter (KEY=VALUE), repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML). --param overrides file entries
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,

    /// Include the full call result in the output
    #[arg(long)]
    pub raw: bool,
}

/// Outcome of one in-process call, ready for rendering.
struct CallReport {
    tool: String,
    arguments: JsonObject,
    elapsed_ms: u128,
    is_error: bool,
    text: String,
    raw: Value,
}

pub fn execute_call(args: CallArgs, tools: &ToolSet) -> Result<()> {
    let report = match run_call(&args, tools) {
        Ok(report) => report,
        Err(e) => return output_error(args.json, &format!("{e:#}")),
    };

    if args.json {
        let mut out = json!({
            "status": if report.is_error { "error" } else { "ok" },
            "tool": report.tool,
            "elapsed_ms": report.elapsed_ms,
            "arguments": report.arguments,
            "is_error": report.is_error,
            "text": report.text,
        });
        if args.raw
            && let Value::Object(map) = &mut out
        {
            map.insert("result".into(), report.raw.clone());
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", render_report(&report, args.raw, &StyleOptions::detect()));
    }

    if report.is_error {
        anyhow::bail!("tool '{}' reported an error", report.tool);
    }
    Ok(())
}

fn run_call(args: &CallArgs, tools: &ToolSet) -> Result<CallReport> {
    let name = args.tool.trim();
    if name.is_empty() {
        anyhow::bail!("tool name cannot be empty");
    }
    let tool = find_tool_case_insensitive(tools, name)
        .ok_or_else(|| anyhow::anyhow!("tool '{name}' not found"))?;

    let mut provided = parse_param_pairs(&args.params)?;
    if let Some(path) = &args.param_file {
        load_param_file_into_map(path, &mut provided)?;
    }
    let arguments = build_arguments_from_schema(&tool.tool.input_schema, &provided)
        .context("failed to build arguments")?;

    tracing::debug!(tool = tool.name(), ?arguments, "calling tool in-process");
    let started = Instant::now();
    let call = CallContext::new().with_tool(tool.name());
    let (result, error) = tool.call(&call, &arguments).into_parts();
    let elapsed_ms = started.elapsed().as_millis();
    if let Some(err) = &error {
        tracing::info!(tool = tool.name(), error = %err, "command failed");
    }

    Ok(CallReport {
        tool: tool.name().to_string(),
        arguments,
        elapsed_ms,
        is_error: error.is_some() || result.is_error == Some(true),
        text: result_text(&result),
        raw: summarize_call_result(&result),
    })
}

fn render_report(report: &CallReport, raw: bool, style: &StyleOptions) -> String {
    let (tag, label) = if report.is_error {
        ("error", "Call Error")
    } else {
        ("success", "Call Success")
    };
    let mut out = vec![box_header(
        format!("{} {label} ({})", emoji(tag, style), report.tool),
        Some(format!("{} ms", report.elapsed_ms)),
        style,
    )];

    if report.arguments.is_empty() {
        out.push(color(
            Role::Dim,
            format!("{} No arguments supplied", emoji("info", style)),
            style,
        ));
    } else {
        let rows: Vec<Vec<String>> = report
            .arguments
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                vec![k.clone(), v]
            })
            .collect();
        out.push(color(Role::Accent, "Arguments:", style));
        out.push(table(&["NAME", "VALUE"], &rows, TableOpts::default(), style));
    }

    out.push(String::new());
    let role = if report.is_error { Role::Error } else { Role::Success };
    out.push(color(role, "Output:", style));
    out.push(report.text.trim_end().to_string());

    if raw {
        out.push(String::new());
        out.push(color(Role::Accent, "Raw Result:", style));
        out.push(
            serde_json::to_string_pretty(&report.raw).unwrap_or_else(|_| report.raw.to_string()),
        );
    }
    out.join("\n")
}

fn output_error(json: bool, msg: &str) -> Result<()> {
    if json {
        println!("{}", json!({ "status": "error", "error": msg }));
    } else {
        let style = StyleOptions::detect();
        let title = format!("{} Call Error", emoji("error", &style));
        println!("{}", box_header(title, Some(color(Role::Error, msg, &style)), &style));
    }
    anyhow::bail!(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::demo;

    fn args(tool: &str, params: &[&str]) -> CallArgs {
        CallArgs {
            tool: tool.into(),
            params: params.iter().map(|s| s.to_string()).collect(),
            param_file: None,
            json: true,
            raw: false,
        }
    }

    #[test]
    fn call_coerces_and_dispatches() {
        let report = run_call(&args("add", &["a=5", "b=10"]), &demo::tool_set()).unwrap();
        assert_eq!(report.text, "Result: 15");
        assert!(!report.is_error);
        assert_eq!(report.arguments.get("a"), Some(&json!(5)));
    }

    #[test]
    fn call_is_case_insensitive() {
        let report = run_call(&args("MATH_MUL", &["x=2", "y=3.5"]), &demo::tool_set()).unwrap();
        assert_eq!(report.text, "Result: 7");
    }

    #[test]
    fn missing_required_parameter_fails_before_dispatch() {
        let err = run_call(&args("echo", &[]), &demo::tool_set()).err().unwrap();
        assert!(err.to_string().contains("failed to build arguments"));
    }

    #[test]
    fn failing_tool_is_reported_as_error() {
        let report = run_call(&args("fail", &["reason=boom"]), &demo::tool_set()).unwrap();
        assert!(report.is_error);
        assert!(report.text.contains("Error: boom"));
        assert!(execute_call(args("fail", &[]), &demo::tool_set()).is_err());
    }

    #[test]
    fn report_renders_arguments_table() {
        let report = run_call(&args("echo", &["message=hi"]), &demo::tool_set()).unwrap();
        let out = render_report(&report, false, &StyleOptions::plain(100));
        assert!(out.contains("Call Success (echo)"));
        assert!(out.contains("message"));
        assert!(out.ends_with("hi"));
    }
}
