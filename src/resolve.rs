//! Tool naming and metadata resolution for leaf commands.

use std::sync::Arc;

use rmcp::model::ToolAnnotations;

use crate::command::CommandNode;

/// Separator between path segments in generated tool names.
pub const TOOL_NAME_SEPARATOR: &str = "_";

/// Custom tool naming: receives the leaf and its path (root excluded).
pub type NameGenerator = Arc<dyn Fn(&CommandNode, &[String]) -> String + Send + Sync>;

/// `["math", "add"]` -> `math_add`, so `path.join("_")` gives the name back.
///
/// The one exception is a childless root: its path is empty, and an empty
/// tool name is not callable, so the root's own name is used instead. Its
/// dispatcher still runs with an empty path.
pub fn default_tool_name(node: &CommandNode, path: &[String]) -> String {
    if path.is_empty() {
        return node.name().to_string();
    }
    path.join(TOOL_NAME_SEPARATOR)
}

/// Override name, then the configured generator, then the default.
pub fn resolve_name(node: &CommandNode, path: &[String], generator: Option<&NameGenerator>) -> String {
    if let Some(name) = node.overrides().effective_name() {
        return name.to_string();
    }
    match generator {
        Some(generate) => generate(node, path),
        None => default_tool_name(node, path),
    }
}

/// Override description, then the short description, then the long one.
pub fn resolve_description(node: &CommandNode) -> String {
    if let Some(description) = node.overrides().effective_description() {
        return description.to_string();
    }
    if !node.short_description().is_empty() {
        return node.short_description().to_string();
    }
    node.long_description().to_string()
}

/// Annotations of the tool generated from `node`.
///
/// The title defaults to the tool name. Hints are only present when the
/// command sets them.
pub fn resolve_annotations(node: &CommandNode, tool_name: &str) -> ToolAnnotations {
    let overrides = node.overrides();
    let mut annotations = ToolAnnotations::default();
    annotations.title = Some(
        overrides
            .effective_title()
            .unwrap_or(tool_name)
            .to_string(),
    );
    annotations.read_only_hint = overrides.read_only_hint;
    annotations.destructive_hint = overrides.destructive_hint;
    annotations.idempotent_hint = overrides.idempotent_hint;
    annotations.open_world_hint = overrides.open_world_hint;
    annotations
}

/// Parse a hint value. Accepts `1 t T TRUE true True` and
/// `0 f F FALSE false False`; anything else is `false`.
pub fn parse_bool_hint(raw: &str) -> bool {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => true,
        "0" | "f" | "F" | "FALSE" | "false" | "False" => false,
        other => {
            tracing::warn!(value = other, "unrecognized boolean hint, treating as false");
            false
        }
    }
}
