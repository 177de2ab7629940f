/*!
Command model.

A tree of [`CommandNode`]s, each carrying typed [`Flag`]s, tool overrides and
an optional run handler. This is the tree the rest of the crate consumes:
  - `tree`      flattens it into leaf commands
  - `schema`    derives input schemas from leaf flags
  - `resolve`   derives names and annotations
  - `dispatch`  rebuilds and executes it per call

Parsing is delegated to clap: `CommandNode::to_clap` lowers the tree into a
`clap::Command` and `CommandNode::execute` runs the matched handler (see
`runtime.rs`).
*/

use std::sync::Arc;

pub mod duration;
pub mod flag;
pub mod overrides;
pub mod runtime;

pub use duration::{DurationError, format_duration, parse_duration};
pub use flag::{Flag, FlagKind};
pub use overrides::{FlagOverrides, ToolOverrides};
pub use runtime::{ExecError, FlagError, Invocation};

/// Handler run when a command is executed.
pub type RunFn = Arc<dyn Fn(&mut Invocation<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Factory producing a brand-new command tree.
///
/// Called once at setup and once per dispatch. It must be safe to call
/// concurrently and must never hand out a shared instance.
pub type CommandBuilder = Arc<dyn Fn() -> CommandNode + Send + Sync>;

/// One node of a command tree. Nodes without children are leaves.
#[derive(Clone)]
pub struct CommandNode {
    name: String,
    short: String,
    long: String,
    hidden: bool,
    silence_errors: bool,
    overrides: ToolOverrides,
    flags: Vec<Flag>,
    children: Vec<CommandNode>,
    run: Option<RunFn>,
}

impl CommandNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: String::new(),
            long: String::new(),
            hidden: false,
            silence_errors: false,
            overrides: ToolOverrides::default(),
            flags: Vec::new(),
            children: Vec::new(),
            run: None,
        }
    }

    /* ---- builders ---- */

    /// Short, one-line description.
    pub fn about(mut self, short: impl Into<String>) -> Self {
        self.short = short.into();
        self
    }

    pub fn long_about(mut self, long: impl Into<String>) -> Self {
        self.long = long.into();
        self
    }

    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Do not echo handler errors as `Error: ...` on stderr.
    pub fn silence_errors(mut self) -> Self {
        self.silence_errors = true;
        self
    }

    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    /// Add a flag inherited by every descendant.
    pub fn persistent_flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag.persistent());
        self
    }

    pub fn subcommand(mut self, child: CommandNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn run<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.run = Some(Arc::new(handler));
        self
    }

    pub fn with_overrides(mut self, overrides: ToolOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn tool_name(mut self, name: impl Into<String>) -> Self {
        self.overrides.name = Some(name.into());
        self
    }

    pub fn tool_description(mut self, description: impl Into<String>) -> Self {
        self.overrides.description = Some(description.into());
        self
    }

    pub fn tool_title(mut self, title: impl Into<String>) -> Self {
        self.overrides.title = Some(title.into());
        self
    }

    pub fn read_only_hint(mut self, value: bool) -> Self {
        self.overrides.read_only_hint = Some(value);
        self
    }

    pub fn destructive_hint(mut self, value: bool) -> Self {
        self.overrides.destructive_hint = Some(value);
        self
    }

    pub fn idempotent_hint(mut self, value: bool) -> Self {
        self.overrides.idempotent_hint = Some(value);
        self
    }

    pub fn open_world_hint(mut self, value: bool) -> Self {
        self.overrides.open_world_hint = Some(value);
        self
    }

    /* ---- accessors ---- */

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_description(&self) -> &str {
        &self.short
    }

    pub fn long_description(&self) -> &str {
        &self.long
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_runnable(&self) -> bool {
        self.run.is_some()
    }

    pub fn overrides(&self) -> &ToolOverrides {
        &self.overrides
    }

    pub fn overrides_mut(&mut self) -> &mut ToolOverrides {
        &mut self.overrides
    }

    /// Flags declared on this node, persistent ones included.
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn persistent_flags(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter().filter(|f| f.is_persistent())
    }

    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

impl std::fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("hidden", &self.hidden)
            .field("flags", &self.flags)
            .field("children", &self.children)
            .field("runnable", &self.run.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_children_and_flags() {
        let root = CommandNode::new("root")
            .persistent_flag(Flag::bool("verbose", false, "Verbose output"))
            .subcommand(
                CommandNode::new("add")
                    .about("Add")
                    .flag(Flag::int("a", 0, "A"))
                    .run(|_| Ok(())),
            );
        assert!(!root.is_leaf());
        assert_eq!(root.persistent_flags().count(), 1);
        let add = root.child("add").expect("child");
        assert!(add.is_leaf());
        assert!(add.is_runnable());
        assert_eq!(add.short_description(), "Add");
        assert_eq!(add.flags()[0].name(), "a");
    }

    #[test]
    fn hint_builders_set_overrides() {
        let node = CommandNode::new("x")
            .read_only_hint(true)
            .open_world_hint(false)
            .tool_title("X tool");
        assert_eq!(node.overrides().read_only_hint, Some(true));
        assert_eq!(node.overrides().open_world_hint, Some(false));
        assert_eq!(node.overrides().destructive_hint, None);
        assert_eq!(node.overrides().effective_title(), Some("X tool"));
    }
}
