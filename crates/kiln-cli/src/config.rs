//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `KILN_*` environment variables, `__` between nested keys
//!    (`KILN_OUTPUT__NO_COLOR=true`)
//! 3. Config file (`--config`, else the platform config directory)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Defaults for `create` commands.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
    /// Where `create project` finds the application skeleton.
    pub skeleton: SkeletonConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Module used when `--module` is omitted.
    pub module: Option<String>,
    /// Project root used when `--path` is omitted.
    pub project_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`.
    pub format: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonConfig {
    /// Unpacked skeleton used as the latest package.
    pub path: Option<PathBuf>,
    /// Directory of previously downloaded packages, used as fallback.
    pub cache_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: Defaults {
                module: None,
                project_root: PathBuf::from("."),
            },
            output: OutputConfig {
                no_color: false,
                format: "auto".into(),
            },
            skeleton: SkeletonConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, file and process environment.
    ///
    /// A missing file is not an error; `kiln init` is how it gets created.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let path = config_file.cloned().unwrap_or_else(Self::config_path);
        Self::load_from(&path, Self::environment())
    }

    /// Load with an explicit environment source; used directly by tests.
    pub fn load_from(path: &Path, environment: Environment) -> anyhow::Result<Self> {
        debug!(path = %path.display(), exists = path.exists(), "Loading configuration");
        Config::builder()
            .add_source(
                Config::try_from(&Self::default()).context("Failed to encode default config")?,
            )
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to read configuration {}", path.display()))?
            .try_deserialize()
            .context("Invalid configuration")
    }

    fn environment() -> Environment {
        Environment::with_prefix("KILN")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.kiln.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "kiln", "kiln")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".kiln.toml"))
    }

    /// Cache of skeleton packages when none is configured.
    pub fn skeleton_cache_dir(&self) -> Option<PathBuf> {
        self.skeleton.cache_dir.clone().or_else(|| {
            directories::ProjectDirs::from("org", "kiln", "kiln")
                .map(|d| d.cache_dir().join("skeletons"))
        })
    }
}
