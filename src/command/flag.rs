//! Typed flag definitions and their lowering into `clap::Arg`.

use std::fmt;
use std::time::Duration;

use clap::builder::{BoolishValueParser, RangedI64ValueParser, RangedU64ValueParser};
use clap::{Arg, ArgAction, value_parser};

use super::duration::{format_duration, parse_duration};
use super::overrides::FlagOverrides;

/// Declared value type of a flag.
///
/// Names follow the pflag type names (`int32Slice`, `float64`, ...), see
/// [`FlagKind::as_str`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlagKind {
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Bool,
    Float32,
    Float64,
    Duration,
    Int32Slice,
    Int64Slice,
    StringSlice,
    /// A kind without a built-in parser; values reach the handler as strings.
    Custom(String),
}

impl FlagKind {
    pub fn as_str(&self) -> &str {
        match self {
            FlagKind::String => "string",
            FlagKind::Int => "int",
            FlagKind::Int8 => "int8",
            FlagKind::Int16 => "int16",
            FlagKind::Int32 => "int32",
            FlagKind::Int64 => "int64",
            FlagKind::Uint => "uint",
            FlagKind::Uint8 => "uint8",
            FlagKind::Uint16 => "uint16",
            FlagKind::Uint32 => "uint32",
            FlagKind::Uint64 => "uint64",
            FlagKind::Bool => "bool",
            FlagKind::Float32 => "float32",
            FlagKind::Float64 => "float64",
            FlagKind::Duration => "duration",
            FlagKind::Int32Slice => "int32Slice",
            FlagKind::Int64Slice => "int64Slice",
            FlagKind::StringSlice => "stringSlice",
            FlagKind::Custom(name) => name,
        }
    }

    /// Rendered zero value, used as the default when none is given.
    pub fn zero_default(&self) -> &'static str {
        match self {
            FlagKind::String | FlagKind::Custom(_) => "",
            FlagKind::Bool => "false",
            FlagKind::Duration => "0s",
            FlagKind::Int32Slice | FlagKind::Int64Slice | FlagKind::StringSlice => "[]",
            _ => "0",
        }
    }

    pub fn is_signed_int(&self) -> bool {
        matches!(
            self,
            FlagKind::Int | FlagKind::Int8 | FlagKind::Int16 | FlagKind::Int32 | FlagKind::Int64
        )
    }

    pub fn is_unsigned_int(&self) -> bool {
        matches!(
            self,
            FlagKind::Uint
                | FlagKind::Uint8
                | FlagKind::Uint16
                | FlagKind::Uint32
                | FlagKind::Uint64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, FlagKind::Float32 | FlagKind::Float64)
    }

    pub fn is_int_slice(&self) -> bool {
        matches!(self, FlagKind::Int32Slice | FlagKind::Int64Slice)
    }

    pub fn is_slice(&self) -> bool {
        self.is_int_slice() || matches!(self, FlagKind::StringSlice)
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed flag of a command.
///
/// `default` is the rendered default value. An empty default marks the
/// flag as required in the generated schema.
#[derive(Debug, Clone)]
pub struct Flag {
    name: String,
    short: Option<char>,
    kind: FlagKind,
    default: String,
    usage: String,
    hidden: bool,
    persistent: bool,
    overrides: FlagOverrides,
}

impl Flag {
    /// New flag with the zero default of `kind`.
    pub fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        let default = kind.zero_default().to_string();
        Self {
            name: name.into(),
            short: None,
            kind,
            default,
            usage: String::new(),
            hidden: false,
            persistent: false,
            overrides: FlagOverrides::default(),
        }
    }

    pub fn string(name: impl Into<String>, default: impl Into<String>, usage: impl Into<String>) -> Self {
        Self::new(name, FlagKind::String)
            .with_default(default)
            .with_usage(usage)
    }

    pub fn int(name: impl Into<String>, default: i64, usage: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Int)
            .with_default(default.to_string())
            .with_usage(usage)
    }

    pub fn uint(name: impl Into<String>, default: u64, usage: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Uint)
            .with_default(default.to_string())
            .with_usage(usage)
    }

    pub fn bool(name: impl Into<String>, default: bool, usage: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Bool)
            .with_default(default.to_string())
            .with_usage(usage)
    }

    pub fn float(name: impl Into<String>, default: f64, usage: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Float64)
            .with_default(default.to_string())
            .with_usage(usage)
    }

    pub fn duration(name: impl Into<String>, default: Duration, usage: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Duration)
            .with_default(format_duration(default))
            .with_usage(usage)
    }

    pub fn string_slice(name: impl Into<String>, default: &[&str], usage: impl Into<String>) -> Self {
        Self::new(name, FlagKind::StringSlice)
            .with_default(format!("[{}]", default.join(",")))
            .with_usage(usage)
    }

    pub fn int_slice(name: impl Into<String>, default: &[i64], usage: impl Into<String>) -> Self {
        let rendered: Vec<String> = default.iter().map(i64::to_string).collect();
        Self::new(name, FlagKind::Int64Slice)
            .with_default(format!("[{}]", rendered.join(",")))
            .with_usage(usage)
    }

    /* ---- builders ---- */

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Replace the rendered default. Pass `""` to make the flag required.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Make the flag visible to every descendant command.
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
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

    pub fn with_overrides(mut self, overrides: FlagOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /* ---- accessors ---- */

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> Option<char> {
        self.short
    }

    pub fn kind(&self) -> &FlagKind {
        &self.kind
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn overrides(&self) -> &FlagOverrides {
        &self.overrides
    }

    pub fn overrides_mut(&mut self) -> &mut FlagOverrides {
        &mut self.overrides
    }

    pub fn is_required(&self) -> bool {
        self.default.is_empty()
    }

    /// Override name, when it differs from the flag name.
    pub(crate) fn alias(&self) -> Option<&str> {
        self.overrides
            .effective_name()
            .filter(|alias| *alias != self.name)
    }

    /// Default list of a slice flag: `[a,b]` -> `["a", "b"]`, `[]` -> empty.
    pub(crate) fn slice_defaults(&self) -> Vec<String> {
        let inner = self
            .default
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(&self.default);
        inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Lower into a clap argument.
    ///
    /// Every flag is a `--long` option named after the flag. Bool flags accept
    /// both `--flag` and `--flag=<bool>`. Slice flags append; integer slices
    /// also split on `,`. The override name becomes a long alias when
    /// `with_alias` is set.
    pub(crate) fn to_arg(&self, with_alias: bool) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .help(self.usage.clone());
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if with_alias && let Some(alias) = self.alias() {
            arg = arg.alias(alias.to_string());
        }
        if self.hidden {
            arg = arg.hide(true);
        }
        if self.persistent {
            arg = arg.global(true);
        }

        arg = match &self.kind {
            FlagKind::String | FlagKind::Custom(_) => {
                arg.action(ArgAction::Set).value_parser(value_parser!(String))
            }
            FlagKind::Int | FlagKind::Int64 => arg.action(ArgAction::Set).value_parser(i64_parser(None)),
            FlagKind::Int8 => arg
                .action(ArgAction::Set)
                .value_parser(i64_parser(Some((i8::MIN.into(), i8::MAX.into())))),
            FlagKind::Int16 => arg
                .action(ArgAction::Set)
                .value_parser(i64_parser(Some((i16::MIN.into(), i16::MAX.into())))),
            FlagKind::Int32 => arg
                .action(ArgAction::Set)
                .value_parser(i64_parser(Some((i32::MIN.into(), i32::MAX.into())))),
            FlagKind::Uint | FlagKind::Uint64 => {
                arg.action(ArgAction::Set).value_parser(u64_parser(None))
            }
            FlagKind::Uint8 => arg
                .action(ArgAction::Set)
                .value_parser(u64_parser(Some(u8::MAX.into()))),
            FlagKind::Uint16 => arg
                .action(ArgAction::Set)
                .value_parser(u64_parser(Some(u16::MAX.into()))),
            FlagKind::Uint32 => arg
                .action(ArgAction::Set)
                .value_parser(u64_parser(Some(u32::MAX.into()))),
            FlagKind::Bool => arg
                .action(ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(BoolishValueParser::new()),
            FlagKind::Float32 | FlagKind::Float64 => {
                arg.action(ArgAction::Set).value_parser(value_parser!(f64))
            }
            FlagKind::Duration => arg.action(ArgAction::Set).value_parser(parse_duration),
            FlagKind::Int32Slice => arg
                .action(ArgAction::Append)
                .value_delimiter(',')
                .value_parser(i64_parser(Some((i32::MIN.into(), i32::MAX.into())))),
            FlagKind::Int64Slice => arg
                .action(ArgAction::Append)
                .value_delimiter(',')
                .value_parser(i64_parser(None)),
            FlagKind::StringSlice => arg
                .action(ArgAction::Append)
                .value_parser(value_parser!(String)),
        };

        if self.kind.is_slice() {
            let defaults = self.slice_defaults();
            if !defaults.is_empty() {
                arg = arg.default_values(defaults);
            }
        } else if !self.default.is_empty() {
            arg = arg.default_value(self.default.clone());
        }
        arg
    }
}

fn i64_parser(bounds: Option<(i64, i64)>) -> RangedI64ValueParser<i64> {
    let parser = RangedI64ValueParser::<i64>::new();
    match bounds {
        Some((min, max)) => parser.range(min..=max),
        None => parser,
    }
}

fn u64_parser(max: Option<u64>) -> RangedU64ValueParser<u64> {
    let parser = RangedU64ValueParser::<u64>::new();
    match max {
        Some(max) => parser.range(0..=max),
        None => parser,
    }
}
