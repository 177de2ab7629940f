//! Tool generation: one MCP tool per visible leaf command.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};

use crate::command::{CommandBuilder, CommandNode, Flag};
use crate::context::CallContext;
use crate::dispatch::{Dispatched, Dispatcher};
use crate::resolve::{NameGenerator, resolve_annotations, resolve_description, resolve_name};
use crate::schema::{DataType, TypeMapper, build_schema};
use crate::tree::leaf_commands;

/// Setup options for [`generate_tools`].
#[derive(Clone, Default)]
pub struct ToolOptions {
    pub name_generator: Option<NameGenerator>,
    pub type_mapper: Option<TypeMapper>,
}

impl ToolOptions {
    pub fn with_name_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&CommandNode, &[String]) -> String + Send + Sync + 'static,
    {
        self.name_generator = Some(Arc::new(generator));
        self
    }

    pub fn with_type_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&Flag) -> (DataType, Option<DataType>) + Send + Sync + 'static,
    {
        self.type_mapper = Some(Arc::new(mapper));
        self
    }
}

impl fmt::Debug for ToolOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolOptions")
            .field("name_generator", &self.name_generator.is_some())
            .field("type_mapper", &self.type_mapper.is_some())
            .finish()
    }
}

/// A tool descriptor paired with the handler that executes it.
#[derive(Debug, Clone)]
pub struct GeneratedTool {
    pub tool: Tool,
    pub handler: Dispatcher,
}

impl GeneratedTool {
    pub fn name(&self) -> &str {
        &self.tool.name
    }

    pub fn call(&self, call: &CallContext, args: &JsonObject) -> Dispatched {
        self.handler.dispatch(call, args)
    }
}

/// Generated tools keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    tools: BTreeMap<String, GeneratedTool>,
}

impl ToolSet {
    /// Insert a tool, replacing any previous tool of the same name.
    pub fn insert(&mut self, tool: GeneratedTool) -> Option<GeneratedTool> {
        self.tools.insert(tool.name().to_string(), tool)
    }

    pub fn get(&self, name: &str) -> Option<&GeneratedTool> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedTool> {
        self.tools.values()
    }

    /// Descriptors only, sorted by name.
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.values().map(|t| t.tool.clone()).collect()
    }
}

/// Build the command tree once and derive a tool for every visible leaf.
///
/// Each tool's handler keeps the builder and rebuilds the tree per call.
/// When two leaves resolve to the same name the later one replaces the
/// earlier one.
pub fn generate_tools(builder: CommandBuilder, options: &ToolOptions) -> ToolSet {
    let root = builder();
    let mut set = ToolSet::default();

    for leaf in leaf_commands(&root) {
        let node = leaf.node();
        if node.is_hidden() {
            tracing::debug!(command = node.name(), "skipping hidden command");
            continue;
        }

        let path = leaf.full_path().to_vec();
        let name = resolve_name(node, &path, options.name_generator.as_ref());
        let description = resolve_description(node);
        let schema = build_schema(leaf.all_flags(), options.type_mapper.as_ref());

        let mut tool = Tool::new(name.clone(), description, Arc::new(schema.to_json_object()));
        tool.annotations = Some(resolve_annotations(node, &name));

        tracing::debug!(tool = %name, path = ?path, "generated tool");
        let generated = GeneratedTool {
            tool,
            handler: Dispatcher::new(builder.clone(), path),
        };
        if set.insert(generated).is_some() {
            tracing::warn!(tool = %name, "duplicate tool name, keeping the last definition");
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;
    use serde_json::{Value, json};

    fn tree() -> CommandNode {
        CommandNode::new("app")
            .persistent_flag(Flag::bool("verbose", false, "Verbose"))
            .subcommand(
                CommandNode::new("add")
                    .about("Add numbers")
                    .flag(Flag::int("a", 0, "First"))
                    .flag(Flag::int("b", 0, "Second"))
                    .run(|inv| {
                        let sum = inv.get_int("a")? + inv.get_int("b")?;
                        inv.print(format!("Result: {sum}"));
                        Ok(())
                    }),
            )
            .subcommand(
                CommandNode::new("math").subcommand(
                    CommandNode::new("mul").flag(Flag::float("x", 1.0, "")).run(|inv| {
                        let x = inv.get_float("x")?;
                        inv.print(x * 2.0);
                        Ok(())
                    }),
                ),
            )
            .subcommand(CommandNode::new("secret").hide().run(|_| Ok(())))
            .subcommand(
                CommandNode::new("hidden-group")
                    .hide()
                    .subcommand(CommandNode::new("visible").run(|inv| {
                        inv.print(inv.path().join("/"));
                        Ok(())
                    })),
            )
    }

    fn generate(options: &ToolOptions) -> ToolSet {
        generate_tools(Arc::new(tree), options)
    }

    fn text(d: &Dispatched) -> String {
        match &d.result.content[0].raw {
            RawContent::Text(t) => t.text.clone(),
            _ => panic!("expected text"),
        }
    }

    #[test]
    fn one_tool_per_visible_leaf() {
        let set = generate(&ToolOptions::default());
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["add", "hidden-group_visible", "math_mul"]);
        assert!(set.get("secret").is_none());
    }

    #[test]
    fn descriptor_carries_schema_and_title() {
        let set = generate(&ToolOptions::default());
        let add = set.get("add").unwrap();
        assert_eq!(add.tool.description.as_deref(), Some("Add numbers"));
        let schema = Value::Object((*add.tool.input_schema).clone());
        assert_eq!(schema["properties"]["a"]["type"], json!("integer"));
        assert_eq!(schema["properties"]["verbose"]["type"], json!("boolean"));
        assert!(schema.get("required").is_none());
        let annotations = add.tool.annotations.as_ref().unwrap();
        assert_eq!(annotations.title.as_deref(), Some("add"));
    }

    #[test]
    fn tool_name_maps_back_to_path() {
        let set = generate(&ToolOptions::default());
        for tool in set.iter() {
            assert_eq!(tool.handler.path().join("_"), tool.name());
        }
        let out = set
            .get("hidden-group_visible")
            .unwrap()
            .call(&CallContext::new(), &JsonObject::new());
        assert_eq!(text(&out), "hidden-group/visible");
    }

    #[test]
    fn call_forwards_to_the_leaf() {
        let set = generate(&ToolOptions::default());
        let mut args = JsonObject::new();
        args.insert("a".into(), json!(5));
        args.insert("b".into(), json!(10));
        let out = set.get("add").unwrap().call(&CallContext::new(), &args);
        assert_eq!(text(&out), "Result: 15");
        assert_eq!(out.result.is_error, Some(false));
    }

    #[test]
    fn colliding_names_keep_the_last_tool() {
        let builder: CommandBuilder = Arc::new(|| {
            CommandNode::new("root")
                .subcommand(CommandNode::new("one").tool_name("same").run(|inv| {
                    inv.print("first");
                    Ok(())
                }))
                .subcommand(CommandNode::new("two").tool_name("same").run(|inv| {
                    inv.print("second");
                    Ok(())
                }))
        });
        let set = generate_tools(builder, &ToolOptions::default());
        assert_eq!(set.len(), 1);
        let out = set.get("same").unwrap().call(&CallContext::new(), &JsonObject::new());
        assert_eq!(text(&out), "second");
    }

    #[test]
    fn clashing_flag_names_still_dispatch() {
        let builder: CommandBuilder = Arc::new(|| {
            CommandNode::new("root").subcommand(
                CommandNode::new("connect")
                    .flag(Flag::string("host", "localhost", "Host").short('h'))
                    .flag(Flag::string("help", "", "Topic"))
                    .flag(Flag::int("port", 0, "Port"))
                    .flag(Flag::int("retries", 1, "Retries").tool_name("port"))
                    .run(|inv| {
                        let line = format!("{}:{}", inv.get_string("host")?, inv.get_int("port")?);
                        inv.print(line);
                        Ok(())
                    }),
            )
        });
        let set = generate_tools(builder, &ToolOptions::default());
        let connect = set.get("connect").unwrap();
        let schema = Value::Object((*connect.tool.input_schema).clone());
        assert_eq!(schema["properties"]["port"]["description"], json!("Port"));

        let args = json!({"host": "db", "help": "x", "port": 5432.0})
            .as_object()
            .cloned()
            .unwrap();
        let out = connect.call(&CallContext::new(), &args);
        assert!(out.error.is_none());
        assert_eq!(text(&out), "db:5432");
    }

    #[test]
    fn options_customize_names_and_types() {
        let options = ToolOptions::default()
            .with_name_generator(|_, path| format!("app.{}", path.join(".")))
            .with_type_mapper(|_| (DataType::String, None));
        let set = generate(&options);
        let mul = set.get("app.math.mul").unwrap();
        let schema = Value::Object((*mul.tool.input_schema).clone());
        assert_eq!(schema["properties"]["x"]["type"], json!("string"));
    }

    #[test]
    fn builder_runs_per_call() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let builder: CommandBuilder = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            CommandNode::new("root").subcommand(CommandNode::new("noop").run(|_| Ok(())))
        });
        let set = generate_tools(builder, &ToolOptions::default());
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        let tool = set.get("noop").unwrap();
        tool.call(&CallContext::new(), &JsonObject::new());
        tool.call(&CallContext::new(), &JsonObject::new());
        assert_eq!(builds.load(Ordering::SeqCst), 3);
    }
}
