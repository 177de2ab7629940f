//! Tool call dispatch: arguments -> argv -> fresh command tree -> result.
//!
//! Every call builds its own tree and its own output buffers, so calls on
//! the same tool can run concurrently without seeing each other's state.

use rmcp::model::{CallToolResult, Content, JsonObject};
use serde_json::Value;

use crate::command::{CommandBuilder, ExecError};
use crate::context::CallContext;

/// Outcome of one dispatch. The result is always populated; `error` carries
/// the execution failure, if any.
#[derive(Debug)]
pub struct Dispatched {
    pub result: CallToolResult,
    pub error: Option<ExecError>,
}

impl Dispatched {
    pub fn into_parts(self) -> (CallToolResult, Option<ExecError>) {
        (self.result, self.error)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some() || self.result.is_error == Some(true)
    }
}

/// Executes one leaf command on behalf of a tool.
#[derive(Clone)]
pub struct Dispatcher {
    builder: CommandBuilder,
    path: Vec<String>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("path", &self.path).finish()
    }
}

impl Dispatcher {
    pub fn new(builder: CommandBuilder, path: Vec<String>) -> Self {
        Self { builder, path }
    }

    /// Path of the target command, root excluded.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Command line for a call: the path, then one `--name=value` per
    /// non-null argument. Arrays give one token per element; an empty array
    /// gives none.
    pub fn argv(&self, args: &JsonObject) -> Vec<String> {
        let mut argv = self.path.clone();
        for (name, value) in args {
            match value {
                // one token per element: slice flags append
                Value::Array(items) => argv.extend(
                    items
                        .iter()
                        .filter_map(render_value)
                        .map(|item| format!("--{name}={item}")),
                ),
                _ => {
                    if let Some(rendered) = render_value(value) {
                        argv.push(format!("--{name}={rendered}"));
                    }
                }
            }
        }
        argv
    }

    /// Run the command for one call. Blocks until the handler returns.
    ///
    /// Unless the command filled the result itself, the result holds stderr
    /// when anything was written there, stdout otherwise. Any stderr output
    /// flags the result as an error, even for commands that only warn.
    pub fn dispatch(&self, call: &CallContext, args: &JsonObject) -> Dispatched {
        let argv = self.argv(args);
        tracing::debug!(tool = call.tool().unwrap_or_default(), ?argv, "dispatching");

        let root = (self.builder)();
        let mut result = CallToolResult::success(Vec::new());
        let mut stdout: Vec<u8> = Vec::new();
        let mut stderr: Vec<u8> = Vec::new();
        let error = root
            .execute(&argv, &mut stdout, &mut stderr, call.with_result(&mut result))
            .err();

        // the command produced its own result
        if !result.content.is_empty() {
            return Dispatched { result, error };
        }

        let failed = error.is_some() || !stderr.is_empty();
        let text = if stderr.is_empty() {
            String::from_utf8_lossy(&stdout).into_owned()
        } else {
            String::from_utf8_lossy(&stderr).into_owned()
        };
        result.content.push(Content::text(text));
        result.is_error = Some(failed);
        Dispatched { result, error }
    }
}

/// Flag value for a JSON argument. `null` means "not given".
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(render_number(n)),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Integral floats (`5.0`) render as integers so integer flags accept them.
fn render_number(n: &serde_json::Number) -> String {
    if n.is_f64()
        && let Some(f) = n.as_f64()
        && f.fract() == 0.0
        && f >= i64::MIN as f64
        && f < i64::MAX as f64
    {
        return (f as i64).to_string();
    }
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandNode, Flag};
    use rmcp::model::RawContent;
    use serde_json::json;
    use std::sync::Arc;

    fn args(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn text(result: &CallToolResult) -> String {
        let block = result.content.first().expect("one content block");
        match &block.raw {
            RawContent::Text(t) => t.text.clone(),
            _ => panic!("expected a text block"),
        }
    }

    fn calc() -> CommandNode {
        CommandNode::new("calc")
            .subcommand(
                CommandNode::new("add")
                    .flag(Flag::int("a", 0, "First"))
                    .flag(Flag::int("b", 0, "Second"))
                    .run(|inv| {
                        let sum = inv.get_int("a")? + inv.get_int("b")?;
                        inv.print(format!("Result: {sum}"));
                        Ok(())
                    }),
            )
            .subcommand(CommandNode::new("warn").run(|inv| {
                inv.print("partial output");
                inv.eprint("disk almost full");
                Ok(())
            }))
            .subcommand(CommandNode::new("fail").run(|inv| {
                inv.print("ignored");
                anyhow::bail!("exploded")
            }))
            .subcommand(
                CommandNode::new("echo")
                    .flag(Flag::string("message", "", "Message"))
                    .run(|inv| {
                        let message = inv.get_string("message")?;
                        inv.print(message);
                        Ok(())
                    }),
            )
            .subcommand(
                CommandNode::new("tags")
                    .flag(Flag::string_slice("tag", &[], "Tags"))
                    .run(|inv| {
                        let tags = inv.get_string_slice("tag")?;
                        inv.print(format!("{tags:?}"));
                        Ok(())
                    }),
            )
            .subcommand(CommandNode::new("report").run(|inv| {
                inv.print("captured");
                inv.result().content.push(Content::text("direct"));
                Ok(())
            }))
    }

    fn dispatcher(path: &[&str]) -> Dispatcher {
        Dispatcher::new(
            Arc::new(calc),
            path.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn argv_renders_values() {
        let d = dispatcher(&["math", "mul"]);
        let mut argv = d.argv(&args(json!({
            "x": 2.5,
            "flag": true,
            "name": "two words",
            "ids": [1, 2, 3],
            "cfg": {"k": "v"},
            "skip": null,
        })));
        argv[2..].sort();
        assert_eq!(
            argv,
            vec![
                "math",
                "mul",
                "--cfg={\"k\":\"v\"}",
                "--flag=true",
                "--ids=1",
                "--ids=2",
                "--ids=3",
                "--name=two words",
                "--x=2.5",
            ]
        );
    }

    #[test]
    fn add_returns_stdout() {
        let out = dispatcher(&["add"]).dispatch(&CallContext::new(), &args(json!({"a": 5, "b": 10})));
        assert!(out.error.is_none());
        assert_eq!(out.result.content.len(), 1);
        assert_eq!(text(&out.result), "Result: 15");
        assert_eq!(out.result.is_error, Some(false));
    }

    #[test]
    fn integral_float_reaches_int_flag() {
        let out = dispatcher(&["add"]).dispatch(&CallContext::new(), &args(json!({"a": 5.0, "b": 1e1})));
        assert!(out.error.is_none());
        assert_eq!(text(&out.result), "Result: 15");
        assert_eq!(render_number(&serde_json::Number::from_f64(2.5).unwrap()), "2.5");
    }

    #[test]
    fn slice_elements_keep_commas() {
        let out = dispatcher(&["tags"]).dispatch(&CallContext::new(), &args(json!({"tag": ["a,b", "c"]})));
        assert_eq!(text(&out.result), r#"["a,b", "c"]"#);
    }

    #[test]
    fn empty_array_sends_no_values() {
        let d = dispatcher(&["tags"]);
        assert_eq!(d.argv(&args(json!({"tag": []}))), vec!["tags"]);
        let out = d.dispatch(&CallContext::new(), &args(json!({"tag": []})));
        assert_eq!(text(&out.result), "[]");
    }

    #[test]
    fn stderr_wins_and_marks_error() {
        let out = dispatcher(&["warn"]).dispatch(&CallContext::new(), &JsonObject::new());
        assert!(out.error.is_none());
        assert_eq!(text(&out.result), "disk almost full");
        assert_eq!(out.result.is_error, Some(true));
        assert!(out.is_error());
    }

    #[test]
    fn handler_error_is_reported() {
        let out = dispatcher(&["fail"]).dispatch(&CallContext::new(), &JsonObject::new());
        assert!(matches!(out.error, Some(ExecError::Command(_))));
        assert_eq!(text(&out.result), "Error: exploded\n");
        assert_eq!(out.result.is_error, Some(true));
    }

    #[test]
    fn bad_argument_is_a_usage_error() {
        let out = dispatcher(&["add"]).dispatch(&CallContext::new(), &args(json!({"a": "five"})));
        assert!(matches!(out.error, Some(ExecError::Usage(_))));
        assert_eq!(out.result.is_error, Some(true));
        assert!(text(&out.result).contains("five"));
    }

    #[test]
    fn empty_stdout_still_yields_one_block() {
        let out = dispatcher(&["echo"]).dispatch(&CallContext::new(), &args(json!({"message": ""})));
        assert_eq!(out.result.content.len(), 1);
        assert_eq!(text(&out.result), "");
        assert_eq!(out.result.is_error, Some(false));
    }

    #[test]
    fn command_owned_result_is_returned_unchanged() {
        let out = dispatcher(&["report"]).dispatch(&CallContext::new(), &JsonObject::new());
        assert_eq!(out.result.content.len(), 1);
        assert_eq!(text(&out.result), "direct");
    }

    #[test]
    fn concurrent_dispatches_are_isolated() {
        let d = dispatcher(&["echo"]);
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|i| {
                    let d = &d;
                    scope.spawn(move || {
                        let msg = format!("message-{i}");
                        let out = d.dispatch(&CallContext::new(), &args(json!({ "message": msg })));
                        (msg, text(&out.result))
                    })
                })
                .collect();
            for handle in handles {
                let (sent, got) = handle.join().unwrap();
                assert_eq!(sent, got);
            }
        });
    }
}
