//! Command line interface of the host binary.
//!
//! Parses arguments, sends one request through the execution gateway and
//! renders the response.

mod args;
mod output;

pub use args::{Args, parse_flag};
pub use output::OutputManager;

use crate::error::{CliError, Result};
use crate::gateway::{self, HandlerDirectory};

/// Lists installed handlers instead of invoking one
const HANDLERS_COMMAND: &str = "handlers";

/// Main CLI entry point; returns the process exit code
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(&args).await
}

/// Execute parsed arguments
pub async fn execute(args: &Args) -> Result<i32> {
    let output = OutputManager::new(args.verbose, args.json);

    if args.command == HANDLERS_COMMAND {
        return list_handlers(args, &output);
    }

    let request = args.request()?;
    let handler = args.handler_path()?;
    log::debug!("dispatching '{}' to {}", request.command, handler.display());

    let response = gateway::invoke(&handler, &request).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        output.render(&response)?;
    }
    Ok(if response.is_success() { 0 } else { 1 })
}

fn list_handlers(args: &Args, output: &OutputManager) -> Result<i32> {
    let dir = args.handler_dir.as_ref().ok_or_else(|| CliError::MissingArgument {
        argument: "--handler-dir".to_string(),
    })?;
    let manifests = HandlerDirectory::new(dir).manifests()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&manifests)?);
    } else {
        output.manifests(&manifests)?;
    }
    Ok(0)
}
