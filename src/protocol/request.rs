//! Request object written to a handler's input stream.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A flag or cell value: string, boolean or integer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// String value
    Text(String),
}

impl Scalar {
    /// Interpret as a boolean; `"true"`/`"false"` strings are accepted
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            Scalar::Text(s) => s.parse().ok(),
            Scalar::Int(_) => None,
        }
    }

    /// Borrow as a string if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<usize> for Scalar {
    fn from(value: usize) -> Self {
        Scalar::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

/// Execution context forwarded to the handler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Directory the handler runs in
    pub working_dir: PathBuf,
    /// Acting user, informational only
    #[serde(default)]
    pub user: String,
    /// Emit verbose diagnostics
    #[serde(default)]
    pub verbose: bool,
}

/// One structured invocation of a handler command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRequest {
    /// Command name (e.g. `patch`, `init`)
    pub command: String,
    /// Positional arguments in order
    #[serde(default)]
    pub args: Vec<String>,
    /// Named flags
    #[serde(default)]
    pub flags: BTreeMap<String, Scalar>,
    /// Execution context
    pub context: RequestContext,
}

impl ReleaseRequest {
    /// Create a request for `command` running in `working_dir`
    pub fn new(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            flags: BTreeMap::new(),
            context: RequestContext {
                working_dir: working_dir.into(),
                user: std::env::var("USER").unwrap_or_default(),
                verbose: false,
            },
        }
    }

    /// Append a positional argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set a flag
    pub fn with_flag(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.flags.insert(name.into(), value.into());
        self
    }

    /// Set verbosity
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Boolean flag, `false` when absent
    pub fn flag_bool(&self, name: &str) -> bool {
        self.flags
            .get(name)
            .and_then(Scalar::as_bool)
            .unwrap_or(false)
    }

    /// String flag, `None` when absent or empty
    pub fn flag_str(&self, name: &str) -> Option<&str> {
        self.flags
            .get(name)
            .and_then(Scalar::as_str)
            .filter(|s| !s.is_empty())
    }
}
