//! `patch`, `minor`, `major` and `release <type>`.

use super::{HandlerEnv, Reply, row};
use crate::diagnostics::EXEC;
use crate::error::{Result, VersionError};
use crate::protocol::ReleaseRequest;
use crate::version::VersionBump;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReleaseFlags {
    bump: VersionBump,
    dry_run: bool,
}

impl ReleaseFlags {
    /// `release` takes its type from the first argument or the `type` flag;
    /// the other commands name it directly. There is nobody to prompt, so a
    /// missing type is an error.
    fn decode(request: &ReleaseRequest) -> Result<Self> {
        let bump = match request.command.as_str() {
            "release" => request
                .args
                .first()
                .map(String::as_str)
                .filter(|a| !a.is_empty())
                .or_else(|| request.flag_str("type"))
                .ok_or(VersionError::MissingReleaseType)?
                .parse::<VersionBump>()?,
            command => command.parse::<VersionBump>()?,
        };
        Ok(Self {
            bump,
            dry_run: request.flag_bool("dry-run"),
        })
    }
}

pub(super) async fn release(env: &HandlerEnv, request: &ReleaseRequest) -> Result<Reply> {
    let flags = ReleaseFlags::decode(request)?;

    let mut config = env.store().load_valid(&env.backend_names())?;
    let registry = env.registry(Some(&config));
    let mut saga = env.saga(&registry);

    if flags.dry_run {
        log::info!(target: EXEC, "dry run, no changes will be made");
        let preview = saga.preview(&config, flags.bump).await?;
        let tag = env.git_config.tag_name(&preview.next);
        let items = vec![
            row([("property", "Current Version".into()), ("value", preview.current.to_string().into())]),
            row([("property", "Next Version".into()), ("value", preview.next.to_string().into())]),
            row([("property", "Release Type".into()), ("value", flags.bump.as_str().into())]),
            row([("property", "Backend".into()), ("value", preview.backend.clone().into())]),
            row([("property", "Tag".into()), ("value", tag.into())]),
        ];
        return Ok(Reply::table(items).with("dry_run", true));
    }

    let outcome = saga.run(&mut config, flags.bump).await?;
    Ok(Reply::text()
        .with("previous_version", outcome.previous.to_string())
        .with("version", outcome.next.to_string())
        .with("tag", env.git_config.tag_name(&outcome.next))
        .with("release_type", flags.bump.as_str())
        .with("backend", outcome.backend)
        .with("config_saved", outcome.config_saved)
        .with("warnings", outcome.warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_from_command_name() {
        let flags = ReleaseFlags::decode(&ReleaseRequest::new("minor", ".")).unwrap();
        assert_eq!(flags.bump, VersionBump::Minor);
        assert!(!flags.dry_run);
    }

    #[test]
    fn test_release_type_from_argument_or_flag() {
        let from_arg = ReleaseFlags::decode(&ReleaseRequest::new("release", ".").with_arg("major")).unwrap();
        assert_eq!(from_arg.bump, VersionBump::Major);

        let from_flag = ReleaseFlags::decode(
            &ReleaseRequest::new("release", ".")
                .with_flag("type", "patch")
                .with_flag("dry-run", true),
        )
        .unwrap();
        assert_eq!(from_flag.bump, VersionBump::Patch);
        assert!(from_flag.dry_run);
    }

    #[test]
    fn test_release_without_type_is_rejected() {
        let err = ReleaseFlags::decode(&ReleaseRequest::new("release", ".")).unwrap_err();
        assert_eq!(err.code(), "MISSING_RELEASE_TYPE");
    }

    #[test]
    fn test_unknown_release_type_is_rejected() {
        let err = ReleaseFlags::decode(&ReleaseRequest::new("release", ".").with_arg("huge")).unwrap_err();
        assert!(err.to_string().contains("huge"));
    }
}
