/*!
Command runtime: lowering to clap and executing a parsed command line.

Execution flow (`CommandNode::execute`):
  1. lower the tree (`to_clap`) and parse the argv with `try_get_matches_from`
  2. help / version requests are written to stdout, parse errors to stderr
  3. descend the matched sub-command chain to the target node
  4. run its handler with an [`Invocation`]; handler errors are echoed as
     `Error: <err>` on stderr unless the node silences them

The argv never contains a binary name: it starts with the first path segment.
*/

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::time::Duration;

use clap::ArgMatches;
use clap::parser::{MatchesError, ValueSource};
use rmcp::model::CallToolResult;

use super::{CommandNode, Flag, FlagKind};
use crate::context::ExecContext;

/* ---- Errors ---- */

/// Failure of one command execution.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The argv did not parse against the tree (unknown flag, bad value, ...).
    #[error(transparent)]
    Usage(#[from] clap::Error),
    /// The argv addressed a node without a run handler.
    #[error("command '{path}' is not runnable")]
    NotRunnable { path: String },
    /// The handler returned an error.
    #[error(transparent)]
    Command(anyhow::Error),
}

/// Failure of a typed flag lookup inside a handler.
#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    #[error("flag accessed but not defined: {0}")]
    Unknown(String),
    #[error("trying to get {expected} value of flag '{name}' of type {actual}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        actual: FlagKind,
    },
    #[error(transparent)]
    Matches(#[from] MatchesError),
}

/* ---- Lowering ---- */

const HELP: &str = "help";

/// Persistent flags an ancestor passes down, with the long names they use.
#[derive(Clone, Default)]
struct Scope<'a> {
    flags: Vec<&'a Flag>,
    longs: BTreeSet<String>,
}

impl CommandNode {
    /// Lower the whole tree into a clap command that parses argv without a
    /// binary name.
    pub fn to_clap(&self) -> clap::Command {
        self.lower(&Scope::default()).no_binary_name(true)
    }

    fn lower<'a>(&'a self, inherited: &Scope<'a>) -> clap::Command {
        let mut cmd = clap::Command::new(self.name.clone()).disable_help_subcommand(true);
        if !self.short.is_empty() {
            cmd = cmd.about(self.short.clone());
        }
        if !self.long.is_empty() {
            cmd = cmd.long_about(self.long.clone());
        }
        if self.hidden {
            cmd = cmd.hide(true);
        }

        // clap's `-h/--help` only where neither spelling is taken by a flag
        let in_scope = || inherited.flags.iter().copied().chain(&self.flags);
        let help_taken = in_scope().any(|f| f.name() == HELP);
        let short_taken = in_scope().any(|f| f.short_name() == Some('h'));
        let mut longs = inherited.longs.clone();
        longs.extend(self.flags.iter().map(|f| f.name().to_string()));
        if help_taken || short_taken {
            cmd = cmd.disable_help_flag(true);
            if !help_taken {
                cmd = cmd.arg(
                    clap::Arg::new(HELP)
                        .long(HELP)
                        .help("Print help")
                        .action(clap::ArgAction::Help),
                );
            }
        }
        longs.insert(HELP.to_string());

        let mut scope = inherited.clone();
        for flag in &self.flags {
            let with_alias = match flag.alias() {
                Some(alias) => {
                    let free = longs.insert(alias.to_string());
                    if !free {
                        tracing::debug!(flag = flag.name(), alias, "alias already in use, skipped");
                    }
                    free
                }
                None => false,
            };
            cmd = cmd.arg(flag.to_arg(with_alias));
            if flag.is_persistent() {
                scope.flags.push(flag);
                scope.longs.insert(flag.name().to_string());
                if with_alias && let Some(alias) = flag.alias() {
                    scope.longs.insert(alias.to_string());
                }
            }
        }
        for child in &self.children {
            cmd = cmd.subcommand(child.lower(&scope));
        }
        cmd
    }

    /// Parse `argv` against this tree and run the addressed command.
    ///
    /// Output produced by the handler goes to `out` / `err`; nothing is
    /// written to the process streams.
    pub fn execute<I, T, W, E>(
        &self,
        argv: I,
        out: &mut W,
        err: &mut E,
        ctx: ExecContext<'_>,
    ) -> Result<(), ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
        W: Write,
        E: Write,
    {
        let matches = match self.to_clap().try_get_matches_from(argv) {
            Ok(m) => m,
            Err(parse_err) => {
                let rendered = parse_err.render().to_string();
                if parse_err.use_stderr() {
                    let _ = err.write_all(rendered.as_bytes());
                    return Err(ExecError::Usage(parse_err));
                }
                let _ = out.write_all(rendered.as_bytes());
                return Ok(());
            }
        };

        // Walk root -> target, collecting the flags visible at the target:
        // ancestors' persistent flags first, then locally declared ones win.
        let mut node = self;
        let mut node_matches = &matches;
        let mut path: Vec<String> = Vec::new();
        let mut visible: BTreeMap<&str, &Flag> = BTreeMap::new();
        while let Some((name, sub)) = node_matches.subcommand() {
            for flag in node.persistent_flags() {
                visible.insert(flag.name(), flag);
            }
            let Some(child) = node.child(name) else {
                break;
            };
            node = child;
            node_matches = sub;
            path.push(name.to_string());
        }
        for flag in &node.flags {
            visible.insert(flag.name(), flag);
        }

        let Some(run) = node.run.clone() else {
            let not_runnable = ExecError::NotRunnable {
                path: path.join(" "),
            };
            let _ = writeln!(err, "Error: {not_runnable}");
            return Err(not_runnable);
        };

        tracing::trace!(command = %path.join(" "), "running command handler");
        let mut invocation = Invocation {
            path: &path,
            matches: node_matches,
            flags: &visible,
            out,
            err,
            ctx,
        };
        match run(&mut invocation) {
            Ok(()) => Ok(()),
            Err(run_err) => {
                if !node.silence_errors {
                    let _ = writeln!(invocation.err, "Error: {run_err:#}");
                }
                Err(ExecError::Command(run_err))
            }
        }
    }
}

/* ---- Invocation ---- */

/// What a run handler sees: parsed flag values, output writers and the
/// per-call execution context.
///
/// Getters return the zero value for flags that were neither given nor have
/// a default, and a [`FlagError`] for unknown names or a kind mismatch.
pub struct Invocation<'a> {
    path: &'a [String],
    matches: &'a ArgMatches,
    flags: &'a BTreeMap<&'a str, &'a Flag>,
    out: &'a mut dyn Write,
    err: &'a mut dyn Write,
    ctx: ExecContext<'a>,
}

impl<'a> Invocation<'a> {
    /// Path of the running command, root excluded.
    pub fn path(&self) -> &[String] {
        self.path
    }

    pub fn flag(&self, name: &str) -> Option<&Flag> {
        self.flags.get(name).copied()
    }

    /// True when the flag was given on the command line (not defaulted).
    pub fn is_set(&self, name: &str) -> bool {
        self.flags.contains_key(name)
            && self.matches.value_source(name) == Some(ValueSource::CommandLine)
    }

    fn lookup(
        &self,
        name: &str,
        expected: &'static str,
        accepts: fn(&FlagKind) -> bool,
    ) -> Result<&Flag, FlagError> {
        let flag = self
            .flag(name)
            .ok_or_else(|| FlagError::Unknown(name.to_string()))?;
        if !accepts(flag.kind()) {
            return Err(FlagError::KindMismatch {
                name: name.to_string(),
                expected,
                actual: flag.kind().clone(),
            });
        }
        Ok(flag)
    }

    fn one<T: Clone + Send + Sync + 'static>(&self, name: &str) -> Result<Option<T>, FlagError> {
        Ok(self.matches.try_get_one::<T>(name)?.cloned())
    }

    fn many<T: Clone + Send + Sync + 'static>(&self, name: &str) -> Result<Vec<T>, FlagError> {
        Ok(self
            .matches
            .try_get_many::<T>(name)?
            .map(|values| values.cloned().collect())
            .unwrap_or_default())
    }

    /// String and custom-kind flags.
    pub fn get_string(&self, name: &str) -> Result<String, FlagError> {
        self.lookup(name, "string", |k| {
            matches!(k, FlagKind::String | FlagKind::Custom(_))
        })?;
        Ok(self.one::<String>(name)?.unwrap_or_default())
    }

    /// Any signed integer width.
    pub fn get_int(&self, name: &str) -> Result<i64, FlagError> {
        self.lookup(name, "int", FlagKind::is_signed_int)?;
        Ok(self.one::<i64>(name)?.unwrap_or_default())
    }

    /// Any unsigned integer width.
    pub fn get_uint(&self, name: &str) -> Result<u64, FlagError> {
        self.lookup(name, "uint", FlagKind::is_unsigned_int)?;
        Ok(self.one::<u64>(name)?.unwrap_or_default())
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, FlagError> {
        self.lookup(name, "bool", |k| matches!(k, FlagKind::Bool))?;
        Ok(self.one::<bool>(name)?.unwrap_or_default())
    }

    pub fn get_float(&self, name: &str) -> Result<f64, FlagError> {
        self.lookup(name, "float", FlagKind::is_float)?;
        Ok(self.one::<f64>(name)?.unwrap_or_default())
    }

    pub fn get_duration(&self, name: &str) -> Result<Duration, FlagError> {
        self.lookup(name, "duration", |k| matches!(k, FlagKind::Duration))?;
        Ok(self.one::<Duration>(name)?.unwrap_or_default())
    }

    pub fn get_string_slice(&self, name: &str) -> Result<Vec<String>, FlagError> {
        self.lookup(name, "stringSlice", |k| matches!(k, FlagKind::StringSlice))?;
        self.many::<String>(name)
    }

    pub fn get_int_slice(&self, name: &str) -> Result<Vec<i64>, FlagError> {
        self.lookup(name, "intSlice", FlagKind::is_int_slice)?;
        self.many::<i64>(name)
    }

    /* ---- output ---- */

    pub fn stdout(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub fn stderr(&mut self) -> &mut dyn Write {
        &mut *self.err
    }

    pub fn print(&mut self, text: impl fmt::Display) {
        let _ = write!(self.out, "{text}");
    }

    pub fn println(&mut self, text: impl fmt::Display) {
        let _ = writeln!(self.out, "{text}");
    }

    pub fn eprint(&mut self, text: impl fmt::Display) {
        let _ = write!(self.err, "{text}");
    }

    pub fn eprintln(&mut self, text: impl fmt::Display) {
        let _ = writeln!(self.err, "{text}");
    }

    /* ---- context ---- */

    pub fn context(&mut self) -> &mut ExecContext<'a> {
        &mut self.ctx
    }

    /// The live call result. Pushing content here bypasses output capture.
    pub fn result(&mut self) -> &mut CallToolResult {
        self.ctx.result()
    }

    pub fn is_cancelled(&self) -> bool {
        self.ctx.is_cancelled()
    }
}
