mod common;

use common::{Fixture, Repo, called, calls};
use kodegen_release::config::CONFIG_FILE;
use kodegen_release::git::Contributor;
use kodegen_release::handler::{self, HandlerEnv};
use kodegen_release::protocol::{DataValue, ReleaseRequest, ReleaseResponse, Scalar};

fn env(fx: &Fixture) -> HandlerEnv {
    HandlerEnv::system(fx.path())
        .with_git(fx.git.clone())
        .with_tools(fx.tools.clone())
        .with_platform(fx.platform.clone())
}

fn request(fx: &Fixture, command: &str) -> ReleaseRequest {
    ReleaseRequest::new(command, fx.path())
}

fn text(response: &ReleaseResponse, key: &str) -> String {
    response
        .scalar(key)
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn error_code(response: &ReleaseResponse) -> &str {
    response.error.as_ref().map(|e| e.code.as_str()).unwrap_or("")
}

fn init_request(fx: &Fixture) -> ReleaseRequest {
    request(fx, "init")
        .with_flag("project-type", "other")
        .with_flag("release-system", "goreleaser")
        .with_flag("version", "1.2.2")
}

#[tokio::test]
async fn test_init_writes_config_with_detected_repository() {
    let fx = Fixture::new(Repo::default());
    let response = handler::dispatch(&env(&fx), &init_request(&fx)).await;

    assert!(response.is_success(), "{:?}", response.error);
    assert_eq!(response.renderer_hint.as_deref(), Some("text"));
    assert_eq!(text(&response, "project_owner"), "acme");
    assert_eq!(text(&response, "project_name"), "widget");
    assert_eq!(text(&response, "backend_setup"), "initialized");
    assert!(matches!(
        response.data.as_ref().and_then(|d| d.get("next_steps")),
        Some(DataValue::List(steps)) if steps.len() == 3
    ));

    let saved = fx.store().load().unwrap();
    assert_eq!(saved.version, "1.2.2");
    assert_eq!(saved.release_system, "goreleaser");
    assert!(called(&fx.log, "tool goreleaser init"));
    assert!(called(&fx.log, "tool goreleaser check"));
}

#[tokio::test]
async fn test_init_refuses_to_overwrite_without_force() {
    let fx = Fixture::new(Repo::default());
    fx.write_config("github", "3.0.0");

    let refused = handler::dispatch(&env(&fx), &init_request(&fx)).await;
    assert_eq!(error_code(&refused), "CONFIG_EXISTS");
    assert_eq!(fx.store().load().unwrap().version, "3.0.0");

    let forced = handler::dispatch(&env(&fx), &init_request(&fx).with_flag("force", true)).await;
    assert!(forced.is_success());
    assert_eq!(fx.store().load().unwrap().version, "1.2.2");
}

#[tokio::test]
async fn test_init_backend_failure_keeps_config() {
    let fx = Fixture::with(Repo::default(), |_| {}, |tools| tools.failing = vec!["goreleaser check"]);
    let response = handler::dispatch(&env(&fx), &init_request(&fx)).await;

    assert!(response.is_success());
    assert_eq!(text(&response, "backend_setup"), "incomplete");
    assert!(fx.store().exists());
}

#[tokio::test]
async fn test_init_rejects_invalid_flags() {
    let fx = Fixture::new(Repo::default());

    let missing = handler::dispatch(&env(&fx), &request(&fx, "init")).await;
    assert_eq!(error_code(&missing), "INVALID_FLAGS");

    let bad_version = handler::dispatch(&env(&fx), &init_request(&fx).with_flag("version", "one")).await;
    assert_eq!(error_code(&bad_version), "CONFIG_INVALID");

    let bad_system = handler::dispatch(
        &env(&fx),
        &init_request(&fx).with_flag("release-system", "maven"),
    )
    .await;
    assert_eq!(error_code(&bad_system), "CONFIG_INVALID");
    assert!(!fx.store().exists());
}

#[tokio::test]
async fn test_init_options_recommendations() {
    let fx = Fixture::new(Repo::default());
    let response = handler::dispatch(&env(&fx), &request(&fx, "init-options")).await;

    assert_eq!(response.renderer_hint.as_deref(), Some("table"));
    assert_eq!(response.items().len(), 4);
    match response.data.as_ref().and_then(|d| d.get("recommendations")) {
        Some(DataValue::Map(map)) => {
            assert_eq!(map.get("frontend"), Some(&Scalar::from("release-it")));
            assert_eq!(map.get("backend"), Some(&Scalar::from("jreleaser")));
            assert_eq!(map.get("other"), Some(&Scalar::from("goreleaser")));
        }
        other => panic!("unexpected recommendations: {:?}", other),
    }
}

#[tokio::test]
async fn test_patch_command_releases_and_updates_config() {
    let fx = Fixture::new(Repo {
        tags: vec!["v1.2.2".to_string()],
        ..Repo::default()
    });
    fx.write_config("goreleaser", "1.2.2");

    let response = handler::dispatch(&env(&fx), &request(&fx, "patch")).await;

    assert!(response.is_success(), "{:?}", response.error);
    assert_eq!(text(&response, "previous_version"), "1.2.2");
    assert_eq!(text(&response, "version"), "1.2.3");
    assert_eq!(text(&response, "tag"), "v1.2.3");
    assert_eq!(text(&response, "config_saved"), "true");
    assert_eq!(fx.store().load().unwrap().version, "1.2.3");
}

#[tokio::test]
async fn test_version_violation_response() {
    let fx = Fixture::new(Repo {
        tags: vec!["v1.3.0".to_string()],
        ..Repo::default()
    });
    fx.write_config("goreleaser", "1.2.2");

    let response = handler::dispatch(&env(&fx), &request(&fx, "release").with_arg("patch")).await;

    assert_eq!(error_code(&response), "VERSION_VIOLATION");
    let details = &response.error.as_ref().unwrap().details;
    assert_eq!(details.get("side_effects"), Some(&DataValue::from(false)));
    assert!(!called(&fx.log, "git.commit"));
    assert!(!called(&fx.log, "tool "));
}

#[tokio::test]
async fn test_release_without_type() {
    let fx = Fixture::new(Repo::default());
    fx.write_config("goreleaser", "1.2.2");

    let response = handler::dispatch(&env(&fx), &request(&fx, "release")).await;
    assert_eq!(error_code(&response), "MISSING_RELEASE_TYPE");
    assert!(calls(&fx.log).is_empty());
}

#[tokio::test]
async fn test_dry_run_previews_without_side_effects() {
    let fx = Fixture::new(Repo {
        tags: vec!["v1.2.2".to_string()],
        ..Repo::default()
    });
    fx.write_config("goreleaser", "1.2.2");

    let response = handler::dispatch(&env(&fx), &request(&fx, "minor").with_flag("dry-run", true)).await;

    assert!(response.is_success());
    assert_eq!(response.renderer_hint.as_deref(), Some("table"));
    let next = response
        .items()
        .iter()
        .find(|row| row.get("property") == Some(&Scalar::from("Next Version")))
        .and_then(|row| row.get("value"))
        .cloned();
    assert_eq!(next, Some(Scalar::from("1.3.0")));
    assert!(!called(&fx.log, "git.commit"));
    assert!(!called(&fx.log, "tool "));
    assert_eq!(fx.store().load().unwrap().version, "1.2.2");
}

#[tokio::test]
async fn test_validate() {
    let fx = Fixture::new(Repo::default());

    let missing = handler::dispatch(&env(&fx), &request(&fx, "validate")).await;
    assert_eq!(error_code(&missing), "CONFIG_NOT_FOUND");

    fx.write_config("jreleaser", "0.4.0");
    let short = handler::dispatch(&env(&fx), &request(&fx, "validate")).await;
    assert_eq!(short.items().len(), 2);
    assert_eq!(short.items()[0].get("value"), Some(&Scalar::from(CONFIG_FILE)));

    let full = handler::dispatch(&env(&fx), &request(&fx, "validate").with_flag("show", true)).await;
    assert_eq!(full.items().len(), 6);
}

#[tokio::test]
async fn test_validate_rejects_corrupt_config() {
    let fx = Fixture::new(Repo::default());
    std::fs::write(fx.path().join(CONFIG_FILE), "{ not json").unwrap();

    let response = handler::dispatch(&env(&fx), &request(&fx, "validate")).await;
    assert!(!response.is_success());
    assert_ne!(error_code(&response), "CONFIG_NOT_FOUND");
}

#[tokio::test]
async fn test_history_counts_commits_between_tags() {
    let fx = Fixture::new(Repo {
        tags: vec!["v1.0.0".to_string(), "v1.1.0".to_string()],
        ..Repo::default()
    });

    let response = handler::dispatch(&env(&fx), &request(&fx, "history")).await;
    let items = response.items();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].get("from"), Some(&Scalar::from("")));
    assert_eq!(items[0].get("commits"), Some(&Scalar::Int(5)));
    assert_eq!(items[1].get("from"), Some(&Scalar::from("v1.0.0")));
    assert_eq!(items[1].get("commits"), Some(&Scalar::Int(2)));
    assert!(called(&fx.log, "git.count_commits v1.0.0..v1.1.0"));
}

#[tokio::test]
async fn test_contributors_table() {
    let fx = Fixture::new(Repo {
        contributors: vec![Contributor {
            commits: 12,
            author: "Ada <ada@example.com>".to_string(),
        }],
        ..Repo::default()
    });

    let response = handler::dispatch(&env(&fx), &request(&fx, "contributors")).await;
    assert_eq!(response.items().len(), 1);
    assert_eq!(response.items()[0].get("commits"), Some(&Scalar::Int(12)));
}

#[tokio::test]
async fn test_manifest_and_unknown_command() {
    let fx = Fixture::new(Repo::default());

    let manifest = handler::dispatch(&env(&fx), &request(&fx, "manifest")).await;
    assert!(manifest.is_success());
    assert_eq!(text(&manifest, "name"), handler::HANDLER_NAME);

    let unknown = handler::dispatch(&env(&fx), &request(&fx, "deploy")).await;
    assert_eq!(error_code(&unknown), "UNKNOWN_COMMAND");
    assert_eq!(unknown.metadata.command, "deploy");
    match unknown.error.as_ref().and_then(|e| e.details.get("available")) {
        Some(DataValue::List(names)) => assert!(names.contains(&"patch".to_string())),
        other => panic!("unexpected details: {:?}", other),
    }
}
