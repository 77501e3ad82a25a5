//! Scaffold Service - main application orchestrator.
//!
//! This service coordinates the scaffolding workflow for a module:
//! 1. Validate the target (project root, names, nothing to overwrite)
//! 2. Run each enabled stage: generate, write, patch config
//! 3. Report every stage outcome; nothing is rolled back
//!
//! Once validation passes, a failing stage does not stop the ones after it.
//! The caller gets a [`ScaffoldReport`] listing every stage.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, Reporter, Severity},
        services::{ArtifactService, ConfigPatcher, PatchOutcome},
    },
    domain::{
        ArtifactKind, ArtifactNames, ModuleName, ProjectLayout, generators, render_config_source,
    },
    error::{KilnError, KilnResult},
};

/// Input of [`ScaffoldService::full`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldRequest {
    pub root: PathBuf,
    pub module: String,
    pub entity: String,
    pub no_repo: bool,
    pub no_service: bool,
    pub no_controller: bool,
}

impl ScaffoldRequest {
    pub fn new(root: impl Into<PathBuf>, module: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            module: module.into(),
            entity: entity.into(),
            no_repo: false,
            no_service: false,
            no_controller: false,
        }
    }
}

/// One step of a scaffolding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Entity,
    Repository,
    Service,
    Controller,
    PatchConfig,
    Module,
    ModuleConfig,
    RegisterModule,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Entity => "entity",
            Self::Repository => "repository",
            Self::Service => "service",
            Self::Controller => "controller",
            Self::PatchConfig => "patch-config",
            Self::Module => "module",
            Self::ModuleConfig => "module-config",
            Self::RegisterModule => "register-module",
        })
    }
}

impl Stage {
    fn artifact_kind(self) -> Option<ArtifactKind> {
        match self {
            Self::Entity => Some(ArtifactKind::Entity),
            Self::Repository => Some(ArtifactKind::Repository),
            Self::Service => Some(ArtifactKind::Service),
            Self::Controller => Some(ArtifactKind::Controller),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Completed { path: PathBuf },
    /// Nothing to do; `path` was already up to date.
    Unchanged { path: PathBuf },
    Skipped,
    Failed { error: KilnError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: StageOutcome,
}

/// Every stage of one run, in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScaffoldReport {
    pub stages: Vec<StageReport>,
}

impl ScaffoldReport {
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StageReport> {
        self.stages
            .iter()
            .filter(|s| matches!(s.outcome, StageOutcome::Failed { .. }))
    }

    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages.iter().find(|s| s.stage == stage).map(|s| &s.outcome)
    }
}

/// Main scaffolding service.
pub struct ScaffoldService {
    filesystem: Arc<dyn Filesystem>,
    reporter: Arc<dyn Reporter>,
    artifacts: ArtifactService,
    patcher: ConfigPatcher,
}

impl ScaffoldService {
    pub fn new(filesystem: Arc<dyn Filesystem>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            artifacts: ArtifactService::new(Arc::clone(&filesystem)),
            patcher: ConfigPatcher::new(Arc::clone(&filesystem)),
            filesystem,
            reporter,
        }
    }

    /// Entity, repository, service, controller and controller registration.
    ///
    /// # Errors
    /// Only precondition failures are returned as `Err`; in that case
    /// nothing has been written. Stage failures end up in the report.
    #[instrument(skip_all, fields(module = %request.module, entity = %request.entity, root = %request.root.display()))]
    pub fn full(&self, request: &ScaffoldRequest) -> KilnResult<ScaffoldReport> {
        let layout = ProjectLayout::new(&request.root);
        let names = ArtifactNames::new(&request.module, &request.entity)?;
        self.validate_root(&layout)?;

        let stages = [
            (Stage::Entity, true),
            (Stage::Repository, !request.no_repo),
            (Stage::Service, !request.no_service),
            (Stage::Controller, !request.no_controller),
            (Stage::PatchConfig, !request.no_controller),
        ];
        self.ensure_absent(&layout, &names, &stages)?;

        info!("Scaffolding {} in module {}", names.upper(), names.module());
        let mut report = ScaffoldReport::default();
        for (stage, enabled) in stages {
            let outcome = if enabled {
                self.run_stage(stage, &layout, &names, !request.no_repo, !request.no_service)
            } else {
                StageOutcome::Skipped
            };
            self.record(&mut report, stage, outcome);
        }
        Ok(report)
    }

    /// Entity plus, unless `no_repo`, its repository.
    #[instrument(skip(self, root))]
    pub fn entity(&self, root: &Path, module: &str, entity: &str, no_repo: bool) -> KilnResult<ScaffoldReport> {
        let mut request = ScaffoldRequest::new(root, module, entity);
        request.no_repo = no_repo;
        request.no_service = true;
        request.no_controller = true;
        self.full(&request)
    }

    /// A REST controller without service wiring, registered in the module config.
    #[instrument(skip(self, root))]
    pub fn controller(&self, root: &Path, module: &str, name: &str) -> KilnResult<ScaffoldReport> {
        let layout = ProjectLayout::new(root);
        let names = ArtifactNames::new(module, name)?;
        self.validate_root(&layout)?;

        let stages = [(Stage::Controller, true), (Stage::PatchConfig, true)];
        self.ensure_absent(&layout, &names, &stages)?;

        let mut report = ScaffoldReport::default();
        for (stage, _) in stages {
            let outcome = self.run_stage(stage, &layout, &names, false, false);
            self.record(&mut report, stage, outcome);
        }
        Ok(report)
    }

    /// Add `{action}Action()` to an existing controller.
    ///
    /// # Errors
    /// `ControllerNotFound` when the controller file is missing and
    /// `MemberAlreadyExists` when the action is already there. The file is
    /// left untouched in both cases.
    #[instrument(skip(self, root))]
    pub fn action(&self, root: &Path, module: &str, controller: &str, action: &str) -> KilnResult<PathBuf> {
        let layout = ProjectLayout::new(root);
        let names = ArtifactNames::new(module, controller)?;
        self.validate_root(&layout)?;

        let path = self.class_path(&layout, &names, ArtifactKind::Controller);
        if !self.filesystem.exists(&path) {
            return Err(ApplicationError::ControllerNotFound {
                controller: names.class_name(ArtifactKind::Controller),
                path,
            }
            .into());
        }

        let (method, plan) = generators::action(action)?;
        let method_name = method.name.clone();
        let qualified = names.qualified(ArtifactKind::Controller)?;
        self.artifacts.add_method(&path, &qualified, method, &plan)?;

        self.reporter.report(
            &format!("The action {method_name} has been created in controller {qualified}."),
            Severity::Success,
        );
        Ok(path)
    }

    /// Module skeleton: `Module.php`, config files, view directory, and
    /// registration in the application config.
    #[instrument(skip(self, root))]
    pub fn module(&self, root: &Path, module: &str) -> KilnResult<ScaffoldReport> {
        let layout = ProjectLayout::new(root);
        let module = ModuleName::new(module)?;
        self.validate_root(&layout)?;

        let dir = layout.module_dir(module.as_str());
        if self.filesystem.exists(&dir) {
            return Err(ApplicationError::TargetExists {
                what: format!("module {module}"),
                path: dir,
            }
            .into());
        }

        let mut report = ScaffoldReport::default();
        let outcome = self.capture(|| {
            let class = generators::module_class(&module)?;
            let path = layout.module_class(module.as_str());
            self.artifacts.create(&path, &class)?;
            Ok(StageOutcome::Completed { path })
        });
        self.record(&mut report, Stage::Module, outcome);

        let outcome = self.capture(|| self.write_module_config(&layout, &module));
        self.record(&mut report, Stage::ModuleConfig, outcome);

        let outcome = self.capture(|| {
            let (key, value) = generators::module_registration(&module)?;
            let path = layout.application_config();
            Ok(patch_outcome(self.patcher.append(&path, &key, value)?, path))
        });
        self.record(&mut report, Stage::RegisterModule, outcome);

        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn validate_root(&self, layout: &ProjectLayout) -> KilnResult<()> {
        if !self.filesystem.exists(&layout.modules_dir())
            || !self.filesystem.exists(&layout.application_config())
        {
            return Err(ApplicationError::InvalidProjectRoot {
                path: layout.root().to_path_buf(),
            }
            .into());
        }
        Ok(())
    }

    /// Every class file an enabled stage would create must be absent.
    fn ensure_absent(
        &self,
        layout: &ProjectLayout,
        names: &ArtifactNames,
        stages: &[(Stage, bool)],
    ) -> KilnResult<()> {
        for (stage, enabled) in stages {
            let Some(kind) = stage.artifact_kind().filter(|_| *enabled) else {
                continue;
            };
            let path = self.class_path(layout, names, kind);
            if self.filesystem.exists(&path) {
                return Err(ApplicationError::TargetExists {
                    what: format!("{kind} {}", names.class_name(kind)),
                    path,
                }
                .into());
            }
        }
        Ok(())
    }

    fn class_path(&self, layout: &ProjectLayout, names: &ArtifactNames, kind: ArtifactKind) -> PathBuf {
        layout.class_file(names.module().as_str(), kind, &names.class_name(kind))
    }

    fn run_stage(
        &self,
        stage: Stage,
        layout: &ProjectLayout,
        names: &ArtifactNames,
        with_repository: bool,
        with_service: bool,
    ) -> StageOutcome {
        self.capture(|| {
            if stage == Stage::PatchConfig {
                let path = layout.module_config(names.module().as_str());
                let (key, value) = generators::controller_registration(names)?;
                return Ok(patch_outcome(self.patcher.patch(&path, &key, value)?, path));
            }

            let (kind, class) = match stage {
                Stage::Entity => (ArtifactKind::Entity, generators::entity(names, with_repository)?),
                Stage::Repository => (ArtifactKind::Repository, generators::repository(names)?),
                Stage::Service => (ArtifactKind::Service, generators::service(names)?),
                Stage::Controller => (
                    ArtifactKind::Controller,
                    generators::controller(names, with_service)?,
                ),
                other => {
                    return Err(KilnError::Internal {
                        message: format!("stage {other} does not generate a class"),
                    });
                }
            };
            let path = self.class_path(layout, names, kind);
            self.artifacts.create(&path, &class)?;
            Ok(StageOutcome::Completed { path })
        })
    }

    fn write_module_config(&self, layout: &ProjectLayout, module: &ModuleName) -> KilnResult<StageOutcome> {
        let config = layout.module_config(module.as_str());
        let services = config.with_file_name("services.config.php");
        let controllers = layout
            .module_dir(module.as_str())
            .join("src")
            .join(module.as_str())
            .join(ArtifactKind::Controller.segment());

        let config_dir = layout.module_dir(module.as_str()).join("config");
        for dir in [config_dir, controllers, layout.view_dir(module.as_str())] {
            self.filesystem.create_dir_all(&dir)?;
        }
        self.filesystem
            .write_file(&config, &render_config_source(&generators::module_config(module)))?;
        self.filesystem
            .write_file(&services, &render_config_source(&generators::services_config()))?;
        Ok(StageOutcome::Completed { path: config })
    }

    fn capture(&self, stage: impl FnOnce() -> KilnResult<StageOutcome>) -> StageOutcome {
        stage().unwrap_or_else(|error| StageOutcome::Failed { error })
    }

    /// Log, report, and append one stage outcome.
    fn record(&self, report: &mut ScaffoldReport, stage: Stage, outcome: StageOutcome) {
        let (message, severity) = match &outcome {
            StageOutcome::Completed { path } => {
                info!(%stage, path = %path.display(), "Stage completed");
                (format!("Created {stage}: {}", path.display()), Severity::Success)
            }
            StageOutcome::Unchanged { path } => {
                info!(%stage, path = %path.display(), "Stage had nothing to do");
                (format!("Unchanged {stage}: {}", path.display()), Severity::Info)
            }
            StageOutcome::Skipped => (format!("Skipped {stage}"), Severity::Info),
            StageOutcome::Failed { error } => {
                warn!(%stage, %error, "Stage failed");
                (format!("Failed {stage}: {error}"), Severity::Error)
            }
        };
        self.reporter.report(&message, severity);
        report.stages.push(StageReport { stage, outcome });
    }
}

fn patch_outcome(outcome: PatchOutcome, path: PathBuf) -> StageOutcome {
    match outcome {
        PatchOutcome::Unchanged => StageOutcome::Unchanged { path },
        PatchOutcome::Patched { config, .. } => StageOutcome::Completed { path: config },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockFilesystem, MockReporter};
    use crate::domain::DomainError;
    use std::collections::HashSet;
    use std::sync::Mutex;

    const MODULE_CONFIG: &str = "<?php\nreturn array(\n    'controllers' => array(\n        'invokables' => array(),\n    ),\n);\n";

    /// Mock filesystem over a fixed set of existing paths; records writes.
    fn filesystem(existing: &[&str], writes: Arc<Mutex<Vec<PathBuf>>>) -> MockFilesystem {
        let existing: HashSet<PathBuf> = existing.iter().map(PathBuf::from).collect();
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(move |p| existing.contains(p));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_read_to_string().returning(|_| Ok(MODULE_CONFIG.to_string()));
        fs.expect_copy_file().returning(|_, _| Ok(()));
        fs.expect_write_file().returning(move |p, _| {
            writes.lock().unwrap().push(p.to_path_buf());
            Ok(())
        });
        fs
    }

    fn quiet() -> Arc<MockReporter> {
        let mut reporter = MockReporter::new();
        reporter.expect_report().return_const(());
        Arc::new(reporter)
    }

    const ROOT: [&str; 2] = ["app/module", "app/config/application.config.php"];

    #[test]
    fn full_runs_every_stage_in_order() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let service = ScaffoldService::new(Arc::new(filesystem(&ROOT, writes.clone())), quiet());

        let report = service.full(&ScaffoldRequest::new("app", "Blog", "user")).unwrap();

        assert!(report.is_success());
        let stages: Vec<Stage> = report.stages.iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            [Stage::Entity, Stage::Repository, Stage::Service, Stage::Controller, Stage::PatchConfig]
        );
        let writes = writes.lock().unwrap();
        assert_eq!(writes.len(), 5);
        assert_eq!(writes[0], PathBuf::from("app/module/Blog/src/Blog/Entity/User.php"));
        assert_eq!(writes[4], PathBuf::from("app/module/Blog/config/module.config.php"));
    }

    #[test]
    fn invalid_root_writes_nothing() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let service = ScaffoldService::new(Arc::new(filesystem(&["app/module"], writes.clone())), quiet());

        let err = service.full(&ScaffoldRequest::new("app", "Blog", "user")).unwrap_err();
        assert!(matches!(err, KilnError::Application(ApplicationError::InvalidProjectRoot { .. })));
        assert!(writes.lock().unwrap().is_empty());
    }

    #[test]
    fn existing_entity_is_a_precondition_failure() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let existing = [ROOT[0], ROOT[1], "app/module/Blog/src/Blog/Entity/User.php"];
        let service = ScaffoldService::new(Arc::new(filesystem(&existing, writes.clone())), quiet());

        let err = service.full(&ScaffoldRequest::new("app", "Blog", "user")).unwrap_err();
        assert!(err.is_precondition());
        assert!(writes.lock().unwrap().is_empty());
    }

    #[test]
    fn skipped_stage_file_may_exist() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let existing = [ROOT[0], ROOT[1], "app/module/Blog/src/Blog/Repository/UserRepository.php"];
        let service = ScaffoldService::new(Arc::new(filesystem(&existing, writes.clone())), quiet());

        let mut request = ScaffoldRequest::new("app", "Blog", "user");
        request.no_repo = true;
        let report = service.full(&request).unwrap();
        assert_eq!(report.outcome(Stage::Repository), Some(&StageOutcome::Skipped));
    }

    #[test]
    fn invalid_names_are_rejected_up_front() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let service = ScaffoldService::new(Arc::new(filesystem(&ROOT, writes)), quiet());
        let err = service.full(&ScaffoldRequest::new("app", "Blog", "user-name")).unwrap_err();
        assert!(matches!(err, KilnError::Domain(DomainError::InvalidIdentifier { .. })));
        assert!(err.is_precondition());
    }

    #[test]
    fn failed_stage_does_not_stop_later_stages() {
        let mut fs = MockFilesystem::new();
        let existing: HashSet<PathBuf> = ROOT.iter().map(PathBuf::from).collect();
        fs.expect_exists().returning(move |p| existing.contains(p));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_read_to_string().returning(|_| Ok(MODULE_CONFIG.to_string()));
        fs.expect_copy_file().returning(|_, _| Ok(()));
        fs.expect_write_file().returning(|p, _| {
            if p.ends_with("UserService.php") {
                Err(ApplicationError::filesystem(p, "permission denied").into())
            } else {
                Ok(())
            }
        });

        let mut reporter = MockReporter::new();
        reporter
            .expect_report()
            .withf(|_, severity| *severity == Severity::Error)
            .times(1)
            .return_const(());
        reporter
            .expect_report()
            .withf(|_, severity| *severity == Severity::Success)
            .times(4)
            .return_const(());

        let service = ScaffoldService::new(Arc::new(fs), Arc::new(reporter));
        let report = service.full(&ScaffoldRequest::new("app", "Blog", "user")).unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failures().count(), 1);
        assert!(matches!(
            report.outcome(Stage::Controller),
            Some(StageOutcome::Completed { .. })
        ));
    }

    #[test]
    fn action_requires_existing_controller() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let service = ScaffoldService::new(Arc::new(filesystem(&ROOT, writes)), quiet());
        let err = service.action(Path::new("app"), "Blog", "post", "list").unwrap_err();
        assert!(matches!(err, KilnError::Application(ApplicationError::ControllerNotFound { .. })));
    }

    #[test]
    fn module_refuses_existing_directory() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let existing = [ROOT[0], ROOT[1], "app/module/Blog"];
        let service = ScaffoldService::new(Arc::new(filesystem(&existing, writes)), quiet());
        let err = service.module(Path::new("app"), "blog").unwrap_err();
        assert!(err.is_precondition());
    }
}
