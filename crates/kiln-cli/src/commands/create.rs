//! Implementation of the `kiln create` commands.
//!
//! Responsibility: resolve the module and project root from flags and
//! configuration, wire the adapters into the core services, and render the
//! outcome. No business logic lives here.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tempfile::TempDir;
use tracing::{info, instrument};

use kiln_adapters::{DirectoryExtractor, LocalFilesystem, LocalSkeletonProvider, WalkdirCopier};
use kiln_core::application::{
    ProjectService, ScaffoldReport, ScaffoldRequest, ScaffoldService, Stage, StageOutcome,
};

use crate::{
    cli::{CreateCommands, GlobalArgs, ProjectArgs, TargetArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
    reporter::ConsoleReporter,
};

#[instrument(skip_all)]
pub fn execute(
    cmd: CreateCommands,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let scaffold = || {
        ScaffoldService::new(
            Arc::new(LocalFilesystem::new()),
            Arc::new(ConsoleReporter::new(output.clone())),
        )
    };

    match cmd {
        CreateCommands::Project(args) => create_project(args, config, output),

        CreateCommands::Module(args) => {
            let root = project_root(args.path, config);
            output.header(&format!("Creating module {}...", args.name))?;
            let report = scaffold().module(&root, &args.name)?;
            finish(report, output)
        }

        CreateCommands::Entity(args) => {
            let (module, root) = resolve(args.target, config)?;
            let report = scaffold().entity(&root, &module, &args.name, args.no_repo)?;
            finish(report, output)
        }

        CreateCommands::Controller(args) => {
            let (module, root) = resolve(args.target, config)?;
            let report = scaffold().controller(&root, &module, &args.name)?;
            finish(report, output)
        }

        CreateCommands::Action(args) => {
            let (module, root) = resolve(args.target, config)?;
            let path = scaffold().action(&root, &module, &args.controller, &args.name)?;
            output.json(&serde_json::json!({ "action": args.name, "controller": path }))?;
            Ok(())
        }

        CreateCommands::Full(args) => {
            let (module, root) = resolve(args.target, config)?;
            let request = ScaffoldRequest {
                root,
                module,
                entity: args.name,
                no_repo: args.no_repo,
                no_service: args.no_service,
                no_controller: args.no_controller,
            };
            output.header(&format!(
                "Scaffolding {} in module {}...",
                request.entity, request.module
            ))?;
            let report = scaffold().full(&request)?;
            if report.is_success() && !global.quiet {
                output.print("")?;
                output.print("Next steps:")?;
                output.print("  Run the Doctrine schema tool to create the table")?;
                output.print(&format!(
                    "  Add actions with: kiln create action <NAME> --controller {} --module {}",
                    request.entity, request.module
                ))?;
            }
            finish(report, output)
        }
    }
}

fn create_project(args: ProjectArgs, config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let skeleton = args.skeleton.or_else(|| config.skeleton.path.clone());
    let staging = staging_dir()?;

    let service = ProjectService::new(
        Arc::new(LocalFilesystem::new()),
        Arc::new(LocalSkeletonProvider::new(skeleton, config.skeleton_cache_dir())),
        Arc::new(DirectoryExtractor::new()),
        Arc::new(WalkdirCopier::new()),
        Arc::new(ConsoleReporter::new(output.clone())),
    );

    output.header(&format!("Creating project {}...", args.path.display()))?;
    let created = service.create(&args.path, staging.path())?;
    info!(path = %created.display(), "Project created");
    output.json(&serde_json::json!({ "project": created }))?;
    Ok(())
}

/// Unique per run; removed when dropped.
fn staging_dir() -> CliResult<TempDir> {
    tempfile::Builder::new()
        .prefix("kiln-staging")
        .tempdir()
        .with_cli_context(|| "Failed to create staging directory")
}

// ── Argument resolution ───────────────────────────────────────────────────────

fn project_root(path: Option<PathBuf>, config: &AppConfig) -> PathBuf {
    path.unwrap_or_else(|| config.defaults.project_root.clone())
}

/// Module from `--module` or `defaults.module`; root from `--path` or
/// `defaults.project_root`.
fn resolve(target: TargetArgs, config: &AppConfig) -> CliResult<(String, PathBuf)> {
    let module = target
        .module
        .or_else(|| config.defaults.module.clone())
        .ok_or_else(|| CliError::InvalidInput {
            message: "no module given; pass --module or set defaults.module".into(),
            source: None,
        })?;
    Ok((module, project_root(target.path, config)))
}

// ── Report rendering ──────────────────────────────────────────────────────────

/// JSON form of one stage.
#[derive(Debug, Serialize)]
struct StageLine {
    stage: Stage,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StageLine {
    fn new(stage: Stage, outcome: &StageOutcome) -> Self {
        let (status, path, error) = match outcome {
            StageOutcome::Completed { path } => ("completed", Some(path.display().to_string()), None),
            StageOutcome::Unchanged { path } => ("unchanged", Some(path.display().to_string()), None),
            StageOutcome::Skipped => ("skipped", None, None),
            StageOutcome::Failed { error } => ("failed", None, Some(error.to_string())),
        };
        Self {
            stage,
            status,
            path,
            error,
        }
    }
}

/// Emit the JSON document and turn failed stages into an error.
///
/// Stage lines were already streamed by the reporter.
fn finish(report: ScaffoldReport, output: &OutputManager) -> CliResult<()> {
    let lines: Vec<StageLine> = report
        .stages
        .iter()
        .map(|s| StageLine::new(s.stage, &s.outcome))
        .collect();
    output.json(&serde_json::json!({
        "success": report.is_success(),
        "stages": lines,
    }))?;

    let failed = report.failures().count();
    if failed > 0 {
        return Err(CliError::StagesFailed {
            failed,
            total: report.stages.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(module: Option<&str>) -> TargetArgs {
        TargetArgs {
            module: module.map(String::from),
            path: None,
        }
    }

    #[test]
    fn staging_dirs_are_unique_per_run() {
        let first = staging_dir().unwrap();
        let second = staging_dir().unwrap();
        assert_ne!(first.path(), second.path());
        assert!(first.path().file_name().unwrap().to_string_lossy().starts_with("kiln-staging"));

        let path = first.path().to_path_buf();
        drop(first);
        assert!(!path.exists());
    }

    #[test]
    fn module_falls_back_to_config() {
        let mut config = AppConfig::default();
        config.defaults.module = Some("Blog".into());
        let (module, root) = resolve(target(None), &config).unwrap();
        assert_eq!(module, "Blog");
        assert_eq!(root, PathBuf::from("."));

        let (module, _) = resolve(target(Some("Shop")), &config).unwrap();
        assert_eq!(module, "Shop");
    }

    #[test]
    fn missing_module_is_invalid_input() {
        let err = resolve(target(None), &AppConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn stage_lines_serialize_by_status() {
        let line = StageLine::new(
            Stage::PatchConfig,
            &StageOutcome::Completed {
                path: PathBuf::from("module/Blog/config/module.config.php"),
            },
        );
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["stage"], "patch-config");
        assert_eq!(json["status"], "completed");
        assert!(json.get("error").is_none());

        let skipped =
            serde_json::to_value(StageLine::new(Stage::Service, &StageOutcome::Skipped)).unwrap();
        assert!(skipped.get("path").is_none());
    }
}
