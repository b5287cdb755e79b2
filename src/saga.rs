//! Release orchestration.
//!
//! One release attempt moves through
//! `Preflighting → Guarding → Resolving → Executing` and ends either in
//! `Committed` or, via `RollingBack`, in `Failed`. Nothing is retried: a
//! failed step is compensated once and reported.

use crate::backend::{BackendRegistry, ReleaseBackend};
use crate::config::{ConfigStore, ReleaseConfig};
use crate::diagnostics::{CONFIG, EXEC, ROLLBACK};
use crate::error::{ReleaseError, Result};
use crate::guard::VersionGuard;
use crate::preflight::Preflight;
use crate::version::{VersionBump, VersionBumper};
use semver::Version;
use std::sync::Arc;

/// Where a saga currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaPhase {
    /// Not started
    Idle,
    /// Running release-readiness checks
    Preflighting,
    /// Comparing against the latest published tag
    Guarding,
    /// Computing the next version
    Resolving,
    /// Backend side effects in progress
    Executing,
    /// Compensating a failed execution
    RollingBack,
    /// Release done
    Committed,
    /// Release failed
    Failed,
}

/// Successful release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// Version before the release
    pub previous: Version,
    /// Released version
    pub next: Version,
    /// Backend that cut the release
    pub backend: String,
    /// Whether the new version was written back to the configuration
    pub config_saved: bool,
    /// Non-fatal problems
    pub warnings: Vec<String>,
}

/// What a release would do, computed without side effects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePreview {
    /// Current version
    pub current: Version,
    /// Version a release would produce
    pub next: Version,
    /// Backend that would cut the release
    pub backend: String,
}

/// Sequences one release attempt
pub struct ReleaseSaga<'a> {
    preflight: Preflight,
    guard: VersionGuard,
    registry: &'a BackendRegistry,
    store: ConfigStore,
    phase: SagaPhase,
}

impl<'a> ReleaseSaga<'a> {
    /// Saga over explicit collaborators
    pub fn new(
        preflight: Preflight,
        guard: VersionGuard,
        registry: &'a BackendRegistry,
        store: ConfigStore,
    ) -> Self {
        Self {
            preflight,
            guard,
            registry,
            store,
            phase: SagaPhase::Idle,
        }
    }

    /// Current phase
    pub fn phase(&self) -> SagaPhase {
        self.phase
    }

    /// Cut a `bump` release of `config`.
    ///
    /// On success `config.version` holds the new version. Preflight, guard
    /// and lookup failures return before any side effect. A backend failure
    /// triggers exactly one `revert`; if that fails too, both errors are
    /// returned together.
    pub async fn run(&mut self, config: &mut ReleaseConfig, bump: VersionBump) -> Result<ReleaseOutcome> {
        match self.drive(config, bump).await {
            Ok(outcome) => {
                self.phase = SagaPhase::Committed;
                Ok(outcome)
            }
            Err(e) => {
                self.phase = SagaPhase::Failed;
                Err(e)
            }
        }
    }

    /// Guard and resolve only; never touches the repository
    pub async fn preview(&mut self, config: &ReleaseConfig, bump: VersionBump) -> Result<ReleasePreview> {
        self.phase = SagaPhase::Guarding;
        let current = self.guard.check(config).await?;
        self.phase = SagaPhase::Resolving;
        let backend = self.registry.get(&config.release_system)?;
        let next = VersionBumper::bump(&current, bump)?;
        self.phase = SagaPhase::Idle;
        Ok(ReleasePreview {
            current,
            next,
            backend: backend.name().to_string(),
        })
    }

    async fn drive(&mut self, config: &mut ReleaseConfig, bump: VersionBump) -> Result<ReleaseOutcome> {
        self.phase = SagaPhase::Preflighting;
        self.preflight.check().await?;

        self.phase = SagaPhase::Guarding;
        let previous = self.guard.check(config).await?;

        self.phase = SagaPhase::Resolving;
        let backend = self.registry.get(&config.release_system)?;
        let next = VersionBumper::bump(&previous, bump)?;
        log::info!(target: EXEC, "{} release: {} -> {}", bump, previous, next);

        self.phase = SagaPhase::Executing;
        if let Err(e) = backend.release(&next).await {
            self.phase = SagaPhase::RollingBack;
            return Err(Self::compensate(backend.as_ref(), e).await);
        }

        let mut warnings = Vec::new();
        config.version = next.to_string();
        let config_saved = match self.store.save(config) {
            Ok(()) => true,
            Err(e) => {
                let warning = format!("release {} done but the configuration was not updated: {}", next, e);
                log::warn!(target: CONFIG, "{}", warning);
                warnings.push(warning);
                false
            }
        };

        log::info!(target: EXEC, "released {} with {}", next, backend.name());
        Ok(ReleaseOutcome {
            previous,
            next,
            backend: backend.name().to_string(),
            config_saved,
            warnings,
        })
    }

    async fn compensate(backend: &dyn ReleaseBackend, failure: ReleaseError) -> ReleaseError {
        log::error!(target: EXEC, "release step failed: {}", failure);
        let original = ReleaseError::Execution(Box::new(failure));

        match backend.revert().await {
            Ok(report) => {
                log::info!(
                    target: ROLLBACK,
                    "rollback complete ({} steps, {} warnings)",
                    report.actions.len(),
                    report.warnings.len()
                );
                original
            }
            Err(rollback) => {
                log::error!(target: ROLLBACK, "rollback failed: {}", rollback);
                ReleaseError::RollbackFailed {
                    original: Box::new(original),
                    rollback: Box::new(rollback),
                }
            }
        }
    }
}

/// Build a saga whose preflight and guard share `git`
pub fn saga_for<'a>(
    git: Arc<dyn crate::git::GitOperations>,
    registry: &'a BackendRegistry,
    store: ConfigStore,
) -> ReleaseSaga<'a> {
    ReleaseSaga::new(Preflight::new(git.clone()), VersionGuard::new(git), registry, store)
}
