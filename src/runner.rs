// src/runner.rs
//! Trigger for the external newsletter pipeline.
//!
//! The pipeline itself (agents, prompts, model calls) is someone else's
//! program; from here it is one awaited call that either repopulates the
//! results directory or fails. Failures become a [`RunOutcome`] message and
//! never take the dashboard down.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::RunnerConfig;

#[async_trait::async_trait]
pub trait PipelineRunner: Send + Sync {
    async fn run(&self) -> Result<()>;
    fn name(&self) -> &str;
}

/// Runs the configured command and waits for it to exit.
pub struct CommandRunner {
    cfg: RunnerConfig,
}

impl CommandRunner {
    pub fn new(cfg: RunnerConfig) -> Self {
        Self { cfg }
    }
}

/// Last few non-empty lines of a process stream, for error messages.
fn tail_lines(bytes: &[u8], max: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max);
    lines[start..].join("\n")
}

#[async_trait::async_trait]
impl PipelineRunner for CommandRunner {
    async fn run(&self) -> Result<()> {
        let mut cmd = Command::new(&self.cfg.program);
        cmd.args(&self.cfg.args);
        if let Some(dir) = &self.cfg.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .await
            .with_context(|| format!("spawning pipeline command `{}`", self.cfg.program))?;

        if !output.status.success() {
            let stderr = tail_lines(&output.stderr, 5);
            if stderr.is_empty() {
                bail!("pipeline command exited with {}", output.status);
            }
            bail!("pipeline command exited with {}: {}", output.status, stderr);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.cfg.program
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Succeeded { at: DateTime<Utc> },
    Failed { at: DateTime<Utc>, message: String },
    /// Another run was still in flight; nothing was started.
    Busy,
}

impl RunOutcome {
    pub fn message(&self) -> String {
        match self {
            RunOutcome::Succeeded { .. } => "Pipeline run completed.".to_string(),
            RunOutcome::Failed { message, .. } => format!("Pipeline run failed: {message}"),
            RunOutcome::Busy => "A pipeline run is already in progress.".to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// Serializes runs and remembers the last outcome for the dashboard.
pub struct PipelineTrigger {
    runner: Arc<dyn PipelineRunner>,
    in_flight: Arc<tokio::sync::Mutex<()>>,
    last: Arc<Mutex<Option<RunOutcome>>>,
}

impl PipelineTrigger {
    pub fn new(runner: Arc<dyn PipelineRunner>) -> Self {
        Self {
            runner,
            in_flight: Arc::new(tokio::sync::Mutex::new(())),
            last: Arc::new(Mutex::new(None)),
        }
    }

    /// Run the pipeline unless a run is already going. Never errors.
    ///
    /// The run lives in its own task that owns the in-flight guard, so a
    /// caller that goes away (client disconnect) does not end the run or
    /// free the slot early; the outcome is still recorded.
    pub async fn trigger(&self) -> RunOutcome {
        let Ok(guard) = self.in_flight.clone().try_lock_owned() else {
            info!(target: "runner", runner = self.runner.name(), "run skipped: already in progress");
            return RunOutcome::Busy;
        };

        let runner = self.runner.clone();
        let last = self.last.clone();
        let task = tokio::spawn(async move {
            let _guard = guard;
            let outcome = run_once(runner.as_ref()).await;
            record(&last, &outcome);
            outcome
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                counter!("pipeline_run_failures_total").increment(1);
                warn!(target: "runner", runner = self.runner.name(), "pipeline task died: {e}");
                let outcome = RunOutcome::Failed {
                    at: Utc::now(),
                    message: format!("pipeline task died: {e}"),
                };
                record(&self.last, &outcome);
                outcome
            }
        }
    }

    pub fn last_outcome(&self) -> Option<RunOutcome> {
        self.last.lock().ok().and_then(|g| g.clone())
    }
}

async fn run_once(runner: &dyn PipelineRunner) -> RunOutcome {
    counter!("pipeline_runs_total").increment(1);
    info!(target: "runner", runner = runner.name(), "pipeline run started");

    match runner.run().await {
        Ok(()) => {
            info!(target: "runner", runner = runner.name(), "pipeline run completed");
            RunOutcome::Succeeded { at: Utc::now() }
        }
        Err(e) => {
            counter!("pipeline_run_failures_total").increment(1);
            warn!(target: "runner", runner = runner.name(), "pipeline run failed: {e:#}");
            RunOutcome::Failed {
                at: Utc::now(),
                message: format!("{e:#}"),
            }
        }
    }
}

fn record(last: &Mutex<Option<RunOutcome>>, outcome: &RunOutcome) {
    if let Ok(mut slot) = last.lock() {
        *slot = Some(outcome.clone());
    }
}
