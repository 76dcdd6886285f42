//! Native functions and their registry.
//!
//! The registry is built by the embedder and handed to the evaluator.
//! Identifiers that no scope defines fall back to it, so a program can
//! shadow a native by declaring the same name.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use ryc_types::ast::TypeName;
use ryc_types::{ErrorCode, Result, RycError};
use tracing::debug;

use crate::cast::cast_scalar;
use crate::env::{Environment, ScopeId};
use crate::host::Host;
use crate::value::{NativeFunction, Value};

/// Signature of a host callback.
pub type NativeFn = Rc<dyn Fn(&[Value], &mut NativeContext<'_>) -> Result<Value>>;

/// What a native can reach while it runs.
pub struct NativeContext<'a> {
    pub env: &'a mut Environment,
    /// The scope the call was made from.
    pub scope: ScopeId,
    pub host: &'a mut dyn Host,
    /// Line of the call expression.
    pub line: u32,
}

/// Failures specific to the bundled natives.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NativeError {
    #[error("{native}: {what} must be a string, got {got}")]
    ExpectedString {
        native: &'static str,
        what: &'static str,
        got: &'static str,
    },

    #[error("{native}: expected at most {max} argument(s), got {got}")]
    TooManyArguments {
        native: &'static str,
        max: usize,
        got: usize,
    },

    #[error("puts: not enough arguments for format string")]
    MissingArgument,

    #[error("puts: unknown format specifier '%{0}'")]
    UnknownSpecifier(char),

    #[error("{native}: {message}")]
    Io {
        native: &'static str,
        message: String,
    },
}

impl NativeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ExpectedString { .. } | Self::TooManyArguments { .. } => ErrorCode::NATIVE_ARGUMENT,
            Self::MissingArgument | Self::UnknownSpecifier(_) => ErrorCode::FORMAT_ERROR,
            Self::Io { .. } => ErrorCode::HOST_IO,
        }
    }

    /// Attach the call line.
    pub fn at(self, line: u32) -> RycError {
        RycError::runtime(self.code(), self.to_string(), line)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Registry
// ══════════════════════════════════════════════════════════════════════════════

/// Name → native function table.
#[derive(Clone)]
pub struct NativeRegistry {
    functions: BTreeMap<String, NativeFunction>,
}

impl NativeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            functions: BTreeMap::new(),
        }
    }

    /// A registry with `puts` and `gets`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("puts", puts);
        registry.register("gets", gets);
        registry
    }

    /// Register (or replace) a native.
    pub fn register<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&[Value], &mut NativeContext<'_>) -> Result<Value> + 'static,
    {
        let name = name.into();
        debug!(native = %name, "registered native");
        self.functions.insert(
            name.clone(),
            NativeFunction {
                name,
                func: Rc::new(func),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&NativeFunction> {
        self.functions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Bundled natives
// ══════════════════════════════════════════════════════════════════════════════

/// `puts(format, ...args)`: printf-style output followed by a newline.
///
/// Nothing is written unless the whole line formats.
pub fn puts(args: &[Value], cx: &mut NativeContext<'_>) -> Result<Value> {
    let format = match args.first() {
        Some(Value::String(s)) => s,
        other => {
            return Err(NativeError::ExpectedString {
                native: "puts",
                what: "the format",
                got: other.map_or("nothing", Value::kind_name),
            }
            .at(cx.line))
        }
    };
    let mut line = format_line(&process_escapes(format), &args[1..], cx.line)?;
    line.push('\n');
    cx.host
        .write_str(&line)
        .map_err(|e| host_error("puts", e).at(cx.line))?;
    Ok(Value::Null)
}

/// `gets([prompt])`: read one line of input.
pub fn gets(args: &[Value], cx: &mut NativeContext<'_>) -> Result<Value> {
    if args.len() > 1 {
        return Err(NativeError::TooManyArguments {
            native: "gets",
            max: 1,
            got: args.len(),
        }
        .at(cx.line));
    }
    if let Some(prompt) = args.first() {
        let Value::String(prompt) = prompt else {
            return Err(NativeError::ExpectedString {
                native: "gets",
                what: "the prompt",
                got: prompt.kind_name(),
            }
            .at(cx.line));
        };
        cx.host
            .write_str(prompt)
            .map_err(|e| host_error("gets", e).at(cx.line))?;
    }
    let input = cx
        .host
        .read_line()
        .map_err(|e| host_error("gets", e).at(cx.line))?;
    Ok(Value::String(input.unwrap_or_default()))
}

// ── Formatting ───────────────────────────────────────────────────────────────

/// Expand `\n`, `\t` and `\\` left in a format string. Any other escaped
/// character stands for itself.
fn process_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn format_line(format: &str, args: &[Value], line: u32) -> Result<String> {
    let mut out = String::new();
    let mut args = args.iter();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(spec) = chars.next() else {
            out.push('%');
            break;
        };
        if spec == '%' {
            out.push('%');
            continue;
        }
        let target = match spec {
            'd' => TypeName::Int,
            'f' => TypeName::Float,
            's' => TypeName::String,
            'b' => TypeName::Bool,
            'c' => TypeName::Char,
            other => return Err(NativeError::UnknownSpecifier(other).at(line)),
        };
        let arg = args
            .next()
            .ok_or_else(|| NativeError::MissingArgument.at(line))?;
        match cast_scalar(arg, target, line)? {
            Value::Float(f) => out.push_str(&format!("{f:.6}")),
            Value::Char(c) => out.push(char::from(c)),
            other => out.push_str(&other.to_string()),
        }
    }
    Ok(out)
}

fn host_error(native: &'static str, err: std::io::Error) -> NativeError {
    NativeError::Io {
        native,
        message: err.to_string(),
    }
}
