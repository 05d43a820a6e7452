// src/config/dashboard.rs
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::artifacts::ArtifactLayout;

// --- env defaults & names ---
pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";

pub const ENV_CONFIG_PATH: &str = "NEWSLETTER_CONFIG_PATH";
pub const ENV_RESULTS_DIR: &str = "NEWSLETTER_RESULTS_DIR";
/// Whitespace-separated command line, e.g. "python -m assignment.main".
pub const ENV_RUNNER_CMD: &str = "NEWSLETTER_RUNNER_CMD";

fn default_title() -> String {
    "AI Agent News".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub artifacts: ArtifactLayout,
    #[serde(default)]
    pub runner: RunnerConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            artifacts: ArtifactLayout::default(),
            runner: RunnerConfig::default(),
        }
    }
}

/// External command that (re)populates the results directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunnerConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Defaults to the current working directory when unset.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: "crewai".to_string(),
            args: vec!["run".to_string()],
            working_dir: None,
        }
    }
}

impl RunnerConfig {
    /// Parse "prog arg1 arg2". Returns None for blank input.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            working_dir: None,
        })
    }
}

impl DashboardConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let cfg: DashboardConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading dashboard config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing dashboard config {}", path.display()))
    }

    /// Resolve config the way the binary does:
    /// 1) $NEWSLETTER_CONFIG_PATH (must exist)
    /// 2) config/dashboard.toml
    /// 3) built-in defaults
    ///
    /// then apply env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        pb.display()
                    ));
                }
                Self::load_from_file(&pb)?
            }
            Err(_) => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::load_from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };

        cfg.apply_overrides(
            std::env::var(ENV_RESULTS_DIR).ok(),
            std::env::var(ENV_RUNNER_CMD).ok(),
        );
        Ok(cfg)
    }

    fn apply_overrides(&mut self, results_dir: Option<String>, runner_cmd: Option<String>) {
        if let Some(dir) = results_dir.filter(|d| !d.trim().is_empty()) {
            self.artifacts.results_dir = PathBuf::from(dir.trim());
        }
        if let Some(runner) = runner_cmd.as_deref().and_then(RunnerConfig::from_command_line) {
            // keep a configured working dir; only the command line is overridden
            let working_dir = self.runner.working_dir.take();
            self.runner = RunnerConfig {
                working_dir,
                ..runner
            };
        }
    }
}
