//! Command line argument parsing for the host binary.
//!
//! The host knows nothing about individual commands: everything after the
//! options is forwarded to the handler as a [`ReleaseRequest`].

use crate::error::{CliError, Result};
use crate::gateway::HandlerDirectory;
use crate::handler::HANDLER_NAME;
use crate::protocol::{ReleaseRequest, Scalar};
use clap::Parser;
use std::path::PathBuf;

/// Release cuts through an out-of-process release handler
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_release",
    version,
    about = "Release cuts through an out-of-process release handler",
    long_about = "Bump the version, commit, tag, push and publish a release with the
configured release tool. A failed release is rolled back.

Usage:
  kodegen_release init -f project-type=other -f release-system=goreleaser
  kodegen_release patch
  kodegen_release release minor --dry-run
  kodegen_release history
  kodegen_release handlers --handler-dir ~/.kodegen/handlers"
)]
pub struct Args {
    /// Handler command (init, init-options, patch, minor, major, release,
    /// validate, history, contributors, manifest) or `handlers`
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// Positional arguments forwarded to the handler
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,

    /// Handler flag, repeatable: `-f key=value`, or `-f key` for true
    #[arg(short = 'f', long = "flag", value_name = "KEY[=VALUE]")]
    pub flags: Vec<String>,

    /// Show what would happen without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Repository to operate on
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    pub work_dir: PathBuf,

    /// Handler executable
    #[arg(long, env = "KODEGEN_RELEASE_HANDLER", value_name = "PATH")]
    pub handler: Option<PathBuf>,

    /// Directory of installed handlers, laid out as `<dir>/<name>/handler-<name>`
    #[arg(long, value_name = "DIR")]
    pub handler_dir: Option<PathBuf>,

    /// Handler to look up in --handler-dir
    #[arg(long, value_name = "NAME", default_value = HANDLER_NAME)]
    pub plugin: String,

    /// Show verbose handler diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the raw response as JSON
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Request to send to the handler
    pub fn request(&self) -> Result<ReleaseRequest> {
        let working_dir = std::path::absolute(&self.work_dir)?;
        let mut request = ReleaseRequest::new(self.command.clone(), working_dir).verbose(self.verbose);
        request.args = self.args.clone();
        for flag in &self.flags {
            let (name, value) = parse_flag(flag)?;
            request.flags.insert(name, value);
        }
        if self.dry_run {
            request.flags.insert("dry-run".to_string(), Scalar::Bool(true));
        }
        Ok(request)
    }

    /// Handler executable: `--handler`, then `--handler-dir`, then the
    /// handler binary installed next to this one
    pub fn handler_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.handler {
            return Ok(path.clone());
        }
        if let Some(dir) = &self.handler_dir {
            return HandlerDirectory::new(dir).locate(&self.plugin);
        }
        let exe = std::env::current_exe()?;
        Ok(exe.with_file_name(format!("kodegen_release_handler{}", std::env::consts::EXE_SUFFIX)))
    }
}

/// Split `key=value`; a bare `key` means `true`
pub fn parse_flag(flag: &str) -> Result<(String, Scalar)> {
    let (name, value) = match flag.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value)),
        None => (flag.trim(), None),
    };
    let name = name.trim_start_matches("--");
    if name.is_empty() {
        return Err(CliError::InvalidArguments {
            reason: format!("flag '{}' has no name", flag),
        }
        .into());
    }

    let value = match value {
        None => Scalar::Bool(true),
        Some(v) => match v.parse::<bool>() {
            Ok(b) => Scalar::Bool(b),
            Err(_) => Scalar::Text(v.to_string()),
        },
    };
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_forms() {
        assert_eq!(
            parse_flag("project-type=backend").unwrap(),
            ("project-type".to_string(), Scalar::Text("backend".to_string()))
        );
        assert_eq!(parse_flag("force").unwrap(), ("force".to_string(), Scalar::Bool(true)));
        assert_eq!(parse_flag("--show=false").unwrap(), ("show".to_string(), Scalar::Bool(false)));
        assert_eq!(
            parse_flag("version=1.0.0").unwrap().1,
            Scalar::Text("1.0.0".to_string())
        );
        assert_eq!(parse_flag("=x").unwrap_err().code(), "INVALID_FLAGS");
    }

    #[test]
    fn test_request_from_args() {
        let args = Args::parse_from([
            "kodegen_release",
            "release",
            "minor",
            "--dry-run",
            "-f",
            "type=major",
            "-C",
            "/tmp/repo",
        ]);
        let request = args.request().unwrap();

        assert_eq!(request.command, "release");
        assert_eq!(request.args, vec!["minor".to_string()]);
        assert!(request.flag_bool("dry-run"));
        assert_eq!(request.flag_str("type"), Some("major"));
        assert_eq!(request.context.working_dir, PathBuf::from("/tmp/repo"));
    }

    #[test]
    fn test_handler_dir_lookup_reports_missing_handler() {
        let temp = tempfile::TempDir::new().unwrap();
        let args = Args::parse_from([
            "kodegen_release",
            "patch",
            "--handler-dir",
            temp.path().to_str().unwrap(),
            "--plugin",
            "nope",
        ]);
        if args.handler.is_none() {
            assert_eq!(args.handler_path().unwrap_err().code(), "HANDLER_NOT_FOUND");
        }
    }
}
