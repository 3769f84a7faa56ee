//! Chain run configuration.
//!
//! A [`ChainConfig`] is the entire configuration surface of the engine; no
//! file- or environment-based configuration belongs in this core.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::domain::StageDescriptor;
use crate::error::{ChainError, Result};
use crate::sink::EventSink;
use crate::store::TaskStore;

/// Default chain-wide cap on loop-stage attempts.
pub const DEFAULT_ITERATION_BUDGET: u32 = 50;

/// Default wall-clock allowance for a whole chain run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Everything one chain run needs besides the executor.
#[derive(Clone)]
pub struct ChainConfig {
    /// Stages in execution order
    pub stages: Vec<StageDescriptor>,
    /// Project root handed to agents and to the completion check
    pub project_root: PathBuf,
    /// Per-role model overrides
    pub model_overrides: HashMap<String, String>,
    /// Model used when a role has no override
    pub default_model: Option<String>,
    /// Cooperative cancellation handle, shared with the executor
    pub cancel: Option<CancellationToken>,
    /// Observer for lifecycle events
    pub sink: Option<Arc<dyn EventSink>>,
    /// Task store backing the default completion check
    pub task_store: Option<Arc<dyn TaskStore>>,
    /// Chain-wide cap on loop-stage attempts
    pub iteration_budget: u32,
    /// Wall-clock allowance for the whole run
    pub timeout: Duration,
}

impl ChainConfig {
    /// Config with defaults: budget 50, timeout 30 minutes, no overrides.
    pub fn new(stages: Vec<StageDescriptor>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            stages,
            project_root: project_root.into(),
            model_overrides: HashMap::new(),
            default_model: None,
            cancel: None,
            sink: None,
            task_store: None,
            iteration_budget: DEFAULT_ITERATION_BUDGET,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the model for one role.
    pub fn with_model_override(mut self, role: impl Into<String>, model: impl Into<String>) -> Self {
        self.model_overrides.insert(role.into(), model.into());
        self
    }

    /// Set the fallback model for roles without an override.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Attach a cancellation handle.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Attach an event sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Attach the task store backing the default completion check.
    pub fn with_task_store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.task_store = Some(store);
        self
    }

    /// Set the chain-wide iteration budget.
    pub fn with_iteration_budget(mut self, budget: u32) -> Self {
        self.iteration_budget = budget;
        self
    }

    /// Set the wall-clock allowance for the run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve the model for a role: per-role override, else the default.
    pub fn model_for(&self, role: &str) -> Option<&str> {
        self.model_overrides
            .get(role)
            .or(self.default_model.as_ref())
            .map(String::as_str)
    }

    /// Validate the configuration before a run.
    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(ChainError::Config("chain has no stages".to_string()));
        }
        if self.iteration_budget == 0 {
            return Err(ChainError::Config("iteration budget must be > 0".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ChainError::Config("timeout must be > 0".to_string()));
        }
        for stage in &self.stages {
            if stage.is_loop() && stage.completion().is_none() && self.task_store.is_none() {
                return Err(ChainError::Config(format!(
                    "loop stage '{}' has no completion check and no task store was provided",
                    stage.name()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConfig")
            .field("stages", &self.stages)
            .field("project_root", &self.project_root)
            .field("model_overrides", &self.model_overrides)
            .field("default_model", &self.default_model)
            .field("cancel", &self.cancel.is_some())
            .field("sink", &self.sink.is_some())
            .field("task_store", &self.task_store.is_some())
            .field("iteration_budget", &self.iteration_budget)
            .field("timeout", &self.timeout)
            .finish()
    }
}
