//! Out-of-process release handler.
//!
//! Reads one JSON request from stdin and writes one JSON response to
//! stdout. Diagnostics go to stderr. Exits non-zero when the response
//! reports an error. `--manifest` prints the handler manifest instead.

use kodegen_release::diagnostics;
use kodegen_release::handler::{self, HANDLER_NAME, HandlerEnv};
use kodegen_release::protocol::{ReleaseRequest, ReleaseResponse, ResponseError, ResponseMetadata};
use std::io::{Read, Write};
use std::process;

fn main() {
    if std::env::args().nth(1).as_deref() == Some("--manifest") {
        let names = HandlerEnv::system(".").backend_names();
        process::exit(emit(&handler::manifest(&names)));
    }

    let mut input = String::new();
    let request = match std::io::stdin().read_to_string(&mut input) {
        Ok(_) => serde_json::from_str::<ReleaseRequest>(&input).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    let request = match request {
        Ok(request) => request,
        Err(reason) => {
            let response = ReleaseResponse::failure(
                ResponseMetadata::new(HANDLER_NAME, ""),
                ResponseError::new("PARSE_ERROR", format!("failed to parse request: {}", reason)),
            );
            emit(&response);
            process::exit(1);
        }
    };

    diagnostics::init(request.context.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            let response = ReleaseResponse::failure(
                ResponseMetadata::new(HANDLER_NAME, request.command.clone()),
                ResponseError::new("EXECUTION_ERROR", format!("failed to start runtime: {}", e)),
            );
            emit(&response);
            process::exit(1);
        }
    };

    let env = HandlerEnv::system(request.context.working_dir.clone());
    let response = runtime.block_on(handler::dispatch(&env, &request));

    let code = emit(&response);
    if code != 0 || !response.is_success() {
        process::exit(1);
    }
}

/// Write `value` as one JSON line to stdout; returns the exit code to use
fn emit<T: serde::Serialize>(value: &T) -> i32 {
    let mut stdout = std::io::stdout().lock();
    let written = serde_json::to_writer(&mut stdout, value)
        .map_err(std::io::Error::from)
        .and_then(|()| writeln!(stdout))
        .and_then(|()| stdout.flush());
    match written {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("failed to write response: {}", e);
            1
        }
    }
}
