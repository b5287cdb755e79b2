//! `init` and `init-options`.

use super::{HandlerEnv, Reply, row};
use crate::backend::InitOutcome;
use crate::config::{CONFIG_FILE, DEFAULT_VERSION, ProjectKind, ReleaseConfig};
use crate::diagnostics::INIT;
use crate::error::{CliError, ConfigError, Result};
use crate::git::detect_repository;
use crate::protocol::{ReleaseRequest, Row, Scalar};

#[derive(Debug, Clone, PartialEq, Eq)]
struct InitFlags {
    project_type: ProjectKind,
    release_system: String,
    version: String,
    force: bool,
}

impl InitFlags {
    fn decode(request: &ReleaseRequest) -> Result<Self> {
        let project_type = request
            .flag_str("project-type")
            .ok_or_else(|| CliError::InvalidArguments {
                reason: "missing required flag --project-type (frontend|backend|other)".to_string(),
            })?
            .parse::<ProjectKind>()
            .map_err(|e| CliError::InvalidArguments {
                reason: e.to_string(),
            })?;

        let release_system = request
            .flag_str("release-system")
            .ok_or_else(|| CliError::InvalidArguments {
                reason: format!(
                    "missing required flag --release-system (recommended for {}: {})",
                    project_type,
                    project_type.recommended_backend()
                ),
            })?
            .to_string();

        Ok(Self {
            project_type,
            release_system,
            version: request.flag_str("version").unwrap_or(DEFAULT_VERSION).to_string(),
            force: request.flag_bool("force"),
        })
    }
}

pub(super) async fn init(env: &HandlerEnv, request: &ReleaseRequest) -> Result<Reply> {
    log::info!(target: INIT, "starting release initialization");
    let flags = InitFlags::decode(request)?;

    let store = env.store();
    if store.exists() && !flags.force {
        log::debug!(target: INIT, "config file already exists, force flag not set");
        return Err(ConfigError::AlreadyExists {
            path: store.path().to_path_buf(),
        }
        .into());
    }

    let mut config = ReleaseConfig {
        project_owner: String::new(),
        project_name: String::new(),
        project_type: flags.project_type,
        release_system: flags.release_system,
        version: flags.version,
    };
    match detect_repository(env.git.as_ref(), &env.git_config.default_remote).await {
        Ok(slug) => {
            log::debug!(target: INIT, "detected repository: {}/{}", slug.owner, slug.repo);
            config.project_owner = slug.owner;
            config.project_name = slug.repo;
        }
        Err(e) => log::warn!(target: INIT, "repository owner and name left empty: {}", e),
    }

    let registry = env.registry(Some(&config));
    config.validate(&registry.names())?;
    store.save(&config)?;
    log::info!(target: INIT, "configuration saved to {}", CONFIG_FILE);

    let backend = registry.get(&config.release_system)?;
    let backend_status = match backend.initialize(&config).await {
        Ok(InitOutcome::Initialized) => {
            log::info!(target: INIT, "release system {} initialized", backend.name());
            "initialized"
        }
        Ok(InitOutcome::AlreadyInitialized) => "already initialized",
        Err(e) => {
            log::warn!(target: INIT, "release system setup incomplete: {}", e);
            "incomplete"
        }
    };
    log::info!(target: INIT, "initialization completed successfully");

    Ok(Reply::text()
        .with("config_file", CONFIG_FILE)
        .with("project_owner", config.project_owner.clone())
        .with("project_name", config.project_name.clone())
        .with("project_type", config.project_type.as_str())
        .with("release_system", config.release_system.clone())
        .with("version", config.version.clone())
        .with("backend_setup", backend_status)
        .with("next_steps", next_steps(&config)))
}

fn next_steps(config: &ReleaseConfig) -> Vec<String> {
    let mut steps = vec!["Use 'kodegen_release patch|minor|major' to cut a release".to_string()];
    let managed = match config.release_system.as_str() {
        "release-it" => Some("package.json, .release-it.json"),
        "jreleaser" => Some("jreleaser.yml, pom.xml / build.gradle"),
        "goreleaser" => Some(".goreleaser.yaml, git tags"),
        "github" => Some("git tags, GitHub releases"),
        _ => None,
    };
    if let Some(files) = managed {
        steps.push(format!("Versions are managed in: {}", files));
    }
    steps.push(format!("The version in {} is the single source of truth", CONFIG_FILE));
    steps
}

pub(super) fn options(env: &HandlerEnv) -> Reply {
    let systems = env.backend_names().join(", ");
    let items = vec![
        row([
            ("option", "project-type".into()),
            ("values", "frontend, backend, other".into()),
            ("required", true.into()),
            ("description", "Type of project being released".into()),
        ]),
        row([
            ("option", "release-system".into()),
            ("values", systems.into()),
            ("required", true.into()),
            ("description", "Release tool to use".into()),
        ]),
        row([
            ("option", "version".into()),
            ("values", "semver (e.g. 0.1.0)".into()),
            ("required", false.into()),
            ("description", format!("Initial version (default: {})", DEFAULT_VERSION).into()),
        ]),
        row([
            ("option", "force".into()),
            ("values", "true, false".into()),
            ("required", false.into()),
            ("description", "Overwrite existing config".into()),
        ]),
    ];

    let recommendations: Row = ProjectKind::ALL
        .into_iter()
        .map(|kind| (kind.as_str().to_string(), Scalar::from(kind.recommended_backend())))
        .collect();

    Reply::table(items).with("recommendations", recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ReleaseRequest {
        ReleaseRequest::new("init", "/tmp/repo")
    }

    #[test]
    fn test_decode_defaults_version() {
        let flags = InitFlags::decode(
            &request()
                .with_flag("project-type", "other")
                .with_flag("release-system", "goreleaser"),
        )
        .unwrap();
        assert_eq!(flags.project_type, ProjectKind::Other);
        assert_eq!(flags.version, DEFAULT_VERSION);
        assert!(!flags.force);
    }

    #[test]
    fn test_decode_rejects_missing_or_unknown_project_type() {
        let missing = InitFlags::decode(&request().with_flag("release-system", "jreleaser")).unwrap_err();
        assert_eq!(missing.code(), "INVALID_FLAGS");

        let unknown = InitFlags::decode(
            &request()
                .with_flag("project-type", "mobile")
                .with_flag("release-system", "jreleaser"),
        )
        .unwrap_err();
        assert_eq!(unknown.code(), "INVALID_FLAGS");
        assert!(unknown.to_string().contains("mobile"));
    }

    #[test]
    fn test_missing_release_system_suggests_recommendation() {
        let err = InitFlags::decode(&request().with_flag("project-type", "frontend")).unwrap_err();
        assert!(err.to_string().contains("release-it"));
    }

    #[test]
    fn test_next_steps_name_managed_files() {
        let config = ReleaseConfig {
            project_owner: "acme".to_string(),
            project_name: "ledger".to_string(),
            project_type: ProjectKind::Backend,
            release_system: "jreleaser".to_string(),
            version: "0.1.0".to_string(),
        };
        let steps = next_steps(&config);
        assert_eq!(steps.len(), 3);
        assert!(steps[1].contains("jreleaser.yml"));
        assert!(steps[2].contains(CONFIG_FILE));
    }
}
