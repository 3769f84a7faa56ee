//! Completion probes for loop stages.
//!
//! A loop stage repeats until its probe reports done. Stages may carry their
//! own probe; loop stages without one get [`TasksDoneProbe`], built from the
//! task store collaborator.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::store::TaskStore;

/// Decides whether a loop stage's goal is satisfied.
///
/// Evaluated after each executor call, never before the first one.
#[async_trait]
pub trait CompletionProbe: Send + Sync {
    /// True when the stage's goal is satisfied for the given project root.
    async fn is_done(&self, project_root: &Path) -> Result<bool>;
}

struct FnProbe<F> {
    check: F,
}

#[async_trait]
impl<F> CompletionProbe for FnProbe<F>
where
    F: Fn(&Path) -> Result<bool> + Send + Sync,
{
    async fn is_done(&self, project_root: &Path) -> Result<bool> {
        (self.check)(project_root)
    }
}

/// Wrap a synchronous closure as a completion probe.
pub fn probe_fn<F>(check: F) -> Arc<dyn CompletionProbe>
where
    F: Fn(&Path) -> Result<bool> + Send + Sync + 'static,
{
    Arc::new(FnProbe { check })
}

/// The default completion check: done iff the store reports at least one
/// task and every task is `Done`.
///
/// An empty task set is not done; a run must not succeed vacuously before
/// any work has been recorded.
pub struct TasksDoneProbe {
    store: Arc<dyn TaskStore>,
}

impl TasksDoneProbe {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CompletionProbe for TasksDoneProbe {
    async fn is_done(&self, project_root: &Path) -> Result<bool> {
        let tasks = self.store.list_tasks(project_root).await?;
        if tasks.is_empty() {
            return Ok(false);
        }
        Ok(tasks.iter().all(|task| task.status.is_done()))
    }
}

/// Build the default probe over the given task store.
pub fn default_completion(store: Arc<dyn TaskStore>) -> Arc<dyn CompletionProbe> {
    Arc::new(TasksDoneProbe::new(store))
}
