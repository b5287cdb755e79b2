//! Backend descriptor consumed by callers to build their invocation surface.

use super::Scalar;
use serde::{Deserialize, Serialize};

/// Flag value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// Free text
    String,
    /// Switch
    Bool,
    /// Integer
    Int,
}

/// One accepted flag of a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSpec {
    /// Flag name without dashes
    pub name: String,
    /// Value type
    #[serde(rename = "type")]
    pub kind: FlagKind,
    /// Whether the flag must be supplied
    #[serde(default)]
    pub required: bool,
    /// Default value when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Scalar>,
    /// Help text
    #[serde(default)]
    pub description: String,
}

impl FlagSpec {
    /// Build a flag specification
    pub fn new(name: &str, kind: FlagKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default: None,
            description: description.to_string(),
        }
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set a default value
    pub fn default_value(mut self, value: impl Into<Scalar>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// One command exposed by a handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Command name
    pub name: String,
    /// Help text
    #[serde(default)]
    pub description: String,
    /// Accepted flags
    #[serde(default)]
    pub flags: Vec<FlagSpec>,
}

impl CommandSpec {
    /// Build a command specification
    pub fn new(name: &str, description: &str, flags: Vec<FlagSpec>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            flags,
        }
    }
}

/// Describes a handler and its commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Handler name
    pub name: String,
    /// Handler version
    pub version: String,
    /// Human description
    #[serde(default)]
    pub description: String,
    /// Exposed commands
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
}

impl Manifest {
    /// Find a command by name
    pub fn command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|c| c.name == name)
    }
}
