/*!
shared.rs - helpers shared by the `list`, `get`, `call` and `serve` commands.

Focus:
  - find_tool_case_insensitive: tool lookup in a generated `ToolSet`
  - extract_params: flat parameter view of a tool's input schema
  - parse_param_pairs / load_param_file_into_map: raw `--param` collection
  - build_arguments_from_schema + primitive coercion
  - result_text / summarize_call_result
*/

use std::collections::HashMap;

use anyhow::{Context, Result};
use rmcp::model::{CallToolResult, JsonObject, RawContent, Tool};
use serde::Serialize;
use serde_json::Value;

use cli_mcp::{GeneratedTool, ToolSet};

/* ---- Tool lookup ---- */

/// Exact match first, then a case-insensitive one.
pub fn find_tool_case_insensitive<'a>(tools: &'a ToolSet, name: &str) -> Option<&'a GeneratedTool> {
    tools
        .get(name)
        .or_else(|| tools.iter().find(|t| t.name().eq_ignore_ascii_case(name)))
}

/// One row of a tool's parameter listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub required: bool,
    pub description: String,
}

/// Parameters of a tool in schema order (sorted by name).
pub fn extract_params(tool: &Tool) -> Vec<ParamInfo> {
    let schema = &tool.input_schema;
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(props) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    props
        .iter()
        .map(|(name, prop)| {
            let mut kind = prop
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("any")
                .to_string();
            if let Some(items) = prop.pointer("/items/type").and_then(Value::as_str) {
                kind = format!("{kind}<{items}>");
            }
            ParamInfo {
                name: name.clone(),
                kind,
                required: required.contains(&name.as_str()),
                description: prop
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }
        })
        .collect()
}

/* ---- Parameter collection ---- */

/// `KEY=VALUE` pairs from repeated `--param` flags.
pub fn parse_param_pairs(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut provided = HashMap::new();
    for kv in pairs {
        let Some((k, v)) = kv.split_once('=') else {
            anyhow::bail!("invalid --param (expected KEY=VALUE): {kv}");
        };
        let key = k.trim();
        if key.is_empty() {
            anyhow::bail!("invalid --param (empty key): {kv}");
        }
        provided.insert(key.to_string(), v.trim().to_string());
    }
    Ok(provided)
}

/// Merge a JSON or YAML parameter file into `provided`. Keys already present
/// (from `--param`) win over file entries.
pub fn load_param_file_into_map(path: &str, provided: &mut HashMap<String, String>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read param file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    let value: Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    let obj = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("param file root must be an object"))?;

    for (k, v) in obj {
        if provided.contains_key(k) {
            continue;
        }
        let s = match v {
            Value::String(sv) => sv.clone(),
            Value::Array(items) => items
                .iter()
                .map(|i| match i {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        };
        provided.insert(k.clone(), s);
    }
    Ok(())
}

/* ---- Argument building ---- */

/// Build the argument object of a call from raw strings, coerced by the
/// property types of `schema`.
///
/// Missing required properties are an error. Keys unknown to the schema are
/// passed through as strings (the command rejects them).
pub fn build_arguments_from_schema(
    schema: &JsonObject,
    provided: &HashMap<String, String>,
) -> Result<JsonObject> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut remaining = provided.clone();
    let mut result = JsonObject::new();

    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (pname, pobj) in props {
            let ptype = pobj.get("type").and_then(Value::as_str).unwrap_or("string");
            let items = pobj.pointer("/items/type").and_then(Value::as_str);
            if let Some(raw) = remaining.remove(pname) {
                result.insert(pname.clone(), coerce_value(&raw, ptype, items));
            } else if required.contains(&pname.as_str()) {
                anyhow::bail!("missing required parameter: {pname}");
            }
        }
    }

    for (k, v) in remaining {
        result.insert(k, Value::String(v));
    }
    Ok(result)
}

/// Coerce a raw string by a JSON Schema type. Values that do not parse stay
/// strings so the command reports the problem.
pub fn coerce_value(raw: &str, type_hint: &str, items: Option<&str>) -> Value {
    match type_hint {
        "integer" => raw
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        "number" => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        "boolean" => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Value::Bool(true),
            "false" | "0" | "no" | "n" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        "array" => Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| coerce_value(s, items.unwrap_or("string"), None))
                .collect(),
        ),
        _ => Value::String(raw.to_string()),
    }
}

/* ---- Result helpers ---- */

/// Concatenated text blocks of a call result.
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn summarize_call_result(result: &CallToolResult) -> Value {
    serde_json::to_value(result)
        .unwrap_or_else(|_| serde_json::json!({ "note": "unable to serialize result" }))
}
