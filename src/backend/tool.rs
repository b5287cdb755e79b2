//! External release tool execution.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// One external tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Executable name
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
    /// Working directory
    pub work_dir: PathBuf,
}

impl ToolInvocation {
    /// `program args...` in `work_dir`
    pub fn new(program: &str, args: &[&str], work_dir: &Path) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: Vec::new(),
            work_dir: work_dir.to_path_buf(),
        }
    }

    /// Add an environment variable
    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.push((key.to_string(), value.into()));
        self
    }
}

/// Command line as shown in diagnostics; environment values are masked
impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, _) in &self.env {
            write!(f, "{}=**** ", key)?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a tool run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit status was zero
    pub success: bool,
    /// Combined stdout and stderr
    pub output: String,
}

/// Locates and runs external release tools
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Absolute path of `binary` on PATH
    fn locate(&self, binary: &str) -> Option<PathBuf>;

    /// Run to completion; only a launch failure is an `Err`
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput>;
}

/// Runs tools found on the system PATH
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemToolRunner;

#[async_trait]
impl ToolRunner for SystemToolRunner {
    fn locate(&self, binary: &str) -> Option<PathBuf> {
        which::which(binary).ok()
    }

    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&invocation.work_dir)
            .output()
            .await?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(ToolOutput {
            success: output.status.success(),
            output: combined.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_masks_environment() {
        let invocation = ToolInvocation::new("jreleaser", &["full-release"], Path::new("."))
            .env("JRELEASER_GITHUB_TOKEN", "ghp_secret");
        let shown = invocation.to_string();
        assert_eq!(shown, "JRELEASER_GITHUB_TOKEN=**** jreleaser full-release");
        assert!(!shown.contains("ghp_secret"));
    }
}
