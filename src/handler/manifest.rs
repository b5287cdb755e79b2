//! The handler's self-description.

use super::{HANDLER_NAME, HandlerEnv, Reply, row};
use crate::config::DEFAULT_VERSION;
use crate::protocol::{CommandSpec, FlagKind, FlagSpec, Manifest};

/// Commands and flags this handler understands
pub fn manifest(backends: &[&str]) -> Manifest {
    let dry_run = || FlagSpec::new("dry-run", FlagKind::Bool, "Show what would happen without making changes");
    let bump = |name: &str, description: &str| CommandSpec::new(name, description, vec![dry_run()]);

    Manifest {
        name: HANDLER_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: format!("Version bump, tag and publish via {}", backends.join(", ")),
        commands: vec![
            CommandSpec::new(
                "init",
                "Create the release configuration and set up the release tool",
                vec![
                    FlagSpec::new("project-type", FlagKind::String, "frontend, backend or other").required(),
                    FlagSpec::new("release-system", FlagKind::String, "Release tool to use").required(),
                    FlagSpec::new("version", FlagKind::String, "Initial version").default_value(DEFAULT_VERSION),
                    FlagSpec::new("force", FlagKind::Bool, "Overwrite existing config").default_value(false),
                ],
            ),
            CommandSpec::new("init-options", "List init flags and recommended release tools", vec![]),
            bump("patch", "Cut a patch release"),
            bump("minor", "Cut a minor release"),
            bump("major", "Cut a major release"),
            CommandSpec::new(
                "release",
                "Cut a release of the given type",
                vec![
                    FlagSpec::new("type", FlagKind::String, "major, minor or patch"),
                    dry_run(),
                ],
            ),
            CommandSpec::new(
                "validate",
                "Check the release configuration",
                vec![FlagSpec::new("show", FlagKind::Bool, "Show the full configuration")],
            ),
            CommandSpec::new("history", "List released tags with commit counts", vec![]),
            CommandSpec::new("contributors", "List commit authors", vec![]),
            CommandSpec::new("manifest", "Describe this handler", vec![]),
        ],
    }
}

/// Manifest flattened into response data: one row per flag
pub(super) fn describe(env: &HandlerEnv) -> Reply {
    let manifest = manifest(&env.backend_names());

    let mut items = Vec::new();
    for command in &manifest.commands {
        if command.flags.is_empty() {
            items.push(row([
                ("command", command.name.as_str().into()),
                ("flag", "".into()),
                ("type", "".into()),
                ("required", false.into()),
                ("description", command.description.as_str().into()),
            ]));
        }
        for flag in &command.flags {
            items.push(row([
                ("command", command.name.as_str().into()),
                ("flag", format!("--{}", flag.name).into()),
                ("type", format!("{:?}", flag.kind).to_lowercase().into()),
                ("required", flag.required.into()),
                ("description", flag.description.as_str().into()),
            ]));
        }
    }

    let commands = manifest.commands.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
    Reply::table(items)
        .with("name", manifest.name)
        .with("version", manifest.version)
        .with("description", manifest.description)
        .with("commands", commands)
}
