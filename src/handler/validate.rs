//! `validate`: is the configuration present and usable.

use super::{HandlerEnv, Reply, row};
use crate::config::CONFIG_FILE;
use crate::diagnostics::CONFIG;
use crate::error::Result;
use crate::protocol::ReleaseRequest;

const VALID: &str = "✓ Valid";

pub(super) fn validate(env: &HandlerEnv, request: &ReleaseRequest) -> Result<Reply> {
    log::info!(target: CONFIG, "validating release configuration");
    let show = request.flag_bool("show");

    let config = env.store().load_valid(&env.backend_names())?;
    log::info!(target: CONFIG, "configuration is valid");

    let items = if show {
        vec![
            row([("property", "Project Name".into()), ("value", config.project_name.into())]),
            row([("property", "Project Owner".into()), ("value", config.project_owner.into())]),
            row([("property", "Project Type".into()), ("value", config.project_type.as_str().into())]),
            row([("property", "Release System".into()), ("value", config.release_system.into())]),
            row([("property", "Version".into()), ("value", config.version.into())]),
            row([("property", "Status".into()), ("value", VALID.into())]),
        ]
    } else {
        vec![
            row([("property", "Configuration".into()), ("value", CONFIG_FILE.into())]),
            row([("property", "Status".into()), ("value", VALID.into())]),
        ]
    };
    Ok(Reply::table(items))
}
