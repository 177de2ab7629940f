//! Per-command and per-flag overrides for generated tool metadata.
//!
//! Overrides are typed fields. The string-keyed annotation form
//! (`mcp.tool.name = ["..."]`) is still accepted through `set_annotation`
//! so trees that carry annotation maps can be converted as-is.

use crate::resolve::parse_bool_hint;

pub const ANNOTATION_TOOL_NAME: &str = "mcp.tool.name";
pub const ANNOTATION_TOOL_DESCRIPTION: &str = "mcp.tool.description";
pub const ANNOTATION_TOOL_TITLE: &str = "mcp.tool.title";
pub const ANNOTATION_TOOL_READ_ONLY_HINT: &str = "mcp.tool.readOnlyHint";
pub const ANNOTATION_TOOL_DESTRUCTIVE_HINT: &str = "mcp.tool.destructiveHint";
pub const ANNOTATION_TOOL_IDEMPOTENT_HINT: &str = "mcp.tool.idempotentHint";
pub const ANNOTATION_TOOL_OPEN_WORLD_HINT: &str = "mcp.tool.openWorldHint";

/// Effective value of an optional override: empty strings count as unset.
pub(crate) fn effective(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// First non-empty element of an annotation value list.
fn first_value<S: AsRef<str>>(values: &[S]) -> Option<&str> {
    values.first().map(|v| AsRef::<str>::as_ref(v)).filter(|v| !v.is_empty())
}

/// Overrides applied to the tool generated from a leaf command.
///
/// Hints are ternary: `None` means "not specified" and is passed through
/// to the descriptor as an absent hint, never as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOverrides {
    pub name: Option<String>,
    pub description: Option<String>,
    pub title: Option<String>,
    pub read_only_hint: Option<bool>,
    pub destructive_hint: Option<bool>,
    pub idempotent_hint: Option<bool>,
    pub open_world_hint: Option<bool>,
}

impl ToolOverrides {
    pub fn effective_name(&self) -> Option<&str> {
        effective(&self.name)
    }

    pub fn effective_description(&self) -> Option<&str> {
        effective(&self.description)
    }

    pub fn effective_title(&self) -> Option<&str> {
        effective(&self.title)
    }

    /// Apply one annotation entry. Returns `false` for unrecognized keys;
    /// recognized keys with an empty value list (or empty first element)
    /// leave the override untouched.
    pub fn set_annotation<S: AsRef<str>>(&mut self, key: &str, values: &[S]) -> bool {
        let value = first_value(values);
        match key {
            ANNOTATION_TOOL_NAME => set_text(&mut self.name, value),
            ANNOTATION_TOOL_DESCRIPTION => set_text(&mut self.description, value),
            ANNOTATION_TOOL_TITLE => set_text(&mut self.title, value),
            ANNOTATION_TOOL_READ_ONLY_HINT => set_hint(&mut self.read_only_hint, value),
            ANNOTATION_TOOL_DESTRUCTIVE_HINT => set_hint(&mut self.destructive_hint, value),
            ANNOTATION_TOOL_IDEMPOTENT_HINT => set_hint(&mut self.idempotent_hint, value),
            ANNOTATION_TOOL_OPEN_WORLD_HINT => set_hint(&mut self.open_world_hint, value),
            _ => return false,
        }
        true
    }

    /// Build overrides from an annotation map; unknown keys are ignored.
    pub fn from_annotations<'a, I, S>(annotations: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [S])>,
        S: AsRef<str> + 'a,
    {
        let mut overrides = Self::default();
        for (key, values) in annotations {
            overrides.set_annotation(key, values);
        }
        overrides
    }
}

/// Overrides applied to the schema property generated from a flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    /// Alternate property name. Also registered as a `--long` alias so the
    /// dispatched `--<property>=` token still parses.
    pub name: Option<String>,
    /// Replaces the computed description, default suffix included.
    pub description: Option<String>,
}

impl FlagOverrides {
    pub fn effective_name(&self) -> Option<&str> {
        effective(&self.name)
    }

    pub fn effective_description(&self) -> Option<&str> {
        effective(&self.description)
    }

    /// Flags only honour the name and description keys.
    pub fn set_annotation<S: AsRef<str>>(&mut self, key: &str, values: &[S]) -> bool {
        let value = first_value(values);
        match key {
            ANNOTATION_TOOL_NAME => set_text(&mut self.name, value),
            ANNOTATION_TOOL_DESCRIPTION => set_text(&mut self.description, value),
            _ => return false,
        }
        true
    }
}

fn set_text(slot: &mut Option<String>, value: Option<&str>) {
    if let Some(v) = value {
        *slot = Some(v.to_string());
    }
}

fn set_hint(slot: &mut Option<bool>, value: Option<&str>) {
    if let Some(v) = value {
        *slot = Some(parse_bool_hint(v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations_fill_typed_fields() {
        let entries: Vec<(&str, &[&str])> = vec![
            (ANNOTATION_TOOL_NAME, &["renamed"][..]),
            (ANNOTATION_TOOL_READ_ONLY_HINT, &["true"][..]),
            (ANNOTATION_TOOL_DESTRUCTIVE_HINT, &["0"][..]),
            ("unrelated.key", &["x"][..]),
        ];
        let o = ToolOverrides::from_annotations(entries);
        assert_eq!(o.effective_name(), Some("renamed"));
        assert_eq!(o.read_only_hint, Some(true));
        assert_eq!(o.destructive_hint, Some(false));
        assert_eq!(o.idempotent_hint, None);
        assert_eq!(o.open_world_hint, None);
    }

    #[test]
    fn empty_annotation_values_are_ignored() {
        let mut o = ToolOverrides::default();
        let empty: [&str; 0] = [];
        assert!(o.set_annotation(ANNOTATION_TOOL_TITLE, &empty));
        assert!(o.set_annotation(ANNOTATION_TOOL_OPEN_WORLD_HINT, &[""]));
        assert_eq!(o, ToolOverrides::default());
        assert!(!o.set_annotation("mcp.tool.other", &["x"]));
    }

    #[test]
    fn empty_string_override_is_not_effective() {
        let o = FlagOverrides {
            name: Some(String::new()),
            description: Some("custom".into()),
        };
        assert_eq!(o.effective_name(), None);
        assert_eq!(o.effective_description(), Some("custom"));
    }

    #[test]
    fn flag_overrides_ignore_tool_only_keys() {
        let mut o = FlagOverrides::default();
        assert!(o.set_annotation(ANNOTATION_TOOL_NAME, &["alt"]));
        assert!(!o.set_annotation(ANNOTATION_TOOL_TITLE, &["t"]));
        assert_eq!(o.effective_name(), Some("alt"));
    }
}
