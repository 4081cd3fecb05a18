//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/steptree/steptree.toml`
//! 3. Local config: `<project_dir>/.steptree.toml`
//! 4. Environment variables: `STEPTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Tokio scheduler used by blocking runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeFlavor {
    #[default]
    CurrentThread,
    MultiThread,
}

impl std::str::FromStr for RuntimeFlavor {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current_thread" => Ok(Self::CurrentThread),
            "multi_thread" => Ok(Self::MultiThread),
            other => Err(ApplicationError::Config {
                message: format!("unknown runtime flavor: {other}"),
            }),
        }
    }
}

/// Runtime settings for blocking entry points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    pub flavor: RuntimeFlavor,
    /// Worker count for `multi_thread` (tokio default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_threads: Option<usize>,
}

/// Raw runtime config for intermediate parsing (None means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRuntimeConfig {
    pub flavor: Option<RuntimeFlavor>,
    pub worker_threads: Option<usize>,
}

impl RuntimeConfig {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawRuntimeConfig) -> Self {
        Self {
            flavor: overlay.flavor.unwrap_or(self.flavor),
            worker_threads: overlay.worker_threads.or(self.worker_threads),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub log_filter: Option<String>,
    #[serde(default)]
    pub runtime: RawRuntimeConfig,
}

/// Unified configuration for steptree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// `tracing` filter directive (default: "warn")
    pub log_filter: String,
    /// Runtime used by blocking runs
    pub runtime: RuntimeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "warn".into(),
            runtime: RuntimeConfig::default(),
        }
    }
}

/// Get the XDG config directory for steptree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "steptree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("steptree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".steptree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            log_filter: overlay
                .log_filter
                .clone()
                .unwrap_or_else(|| self.log_filter.clone()),
            runtime: self.runtime.merge(&overlay.runtime),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory holding `.steptree.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Apply STEPTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("STEPTREE").separator("__"))
            .build()
            .map_err(config_err)?;
        Self::apply_overrides(settings, &config)
    }

    fn apply_overrides(mut settings: Self, config: &Config) -> Result<Self, ApplicationError> {
        if let Ok(val) = config.get_string("log_filter") {
            settings.log_filter = val;
        }
        if let Ok(val) = config.get_string("runtime.flavor") {
            settings.runtime.flavor = val.parse()?;
        }
        if let Ok(val) = config.get_int("runtime.worker_threads") {
            let threads = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("invalid runtime.worker_threads: {val}"),
            })?;
            settings.runtime.worker_threads = Some(threads);
        }
        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# steptree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/steptree/steptree.toml
#   Local:  <project_dir>/.steptree.toml
#   Env:    STEPTREE_* environment variables (e.g. STEPTREE_RUNTIME__FLAVOR)

# tracing filter directive, e.g. "debug" or "steptree=trace"
# log_filter = "warn"

[runtime]
# Scheduler for blocking runs: "current_thread" or "multi_thread"
# flavor = "current_thread"

# Worker threads for "multi_thread" (tokio default when unset)
# worker_threads = 2
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
