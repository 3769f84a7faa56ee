//! Task store collaborator interface.
//!
//! The durable store (markdown-file CRUD in the full system) lives outside
//! this core. The engine consults it for exactly one thing: the default
//! completion check for loop stages.

pub mod records;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

pub use records::{TaskRecord, TaskStatus};

/// Read-only view over persisted tasks for a project.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// List all tasks recorded for the given project root.
    async fn list_tasks(&self, project_root: &Path) -> Result<Vec<TaskRecord>>;
}

/// In-memory task store for tests and embedders without durable storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    tasks: Vec<TaskRecord>,
}

impl MemoryTaskStore {
    /// Create a store holding the given tasks.
    pub fn new(tasks: Vec<TaskRecord>) -> Self {
        Self { tasks }
    }

    /// Create an empty store.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_tasks(&self, _project_root: &Path) -> Result<Vec<TaskRecord>> {
        Ok(self.tasks.clone())
    }
}

/// Test double that fails every listing, for error containment tests.
#[derive(Debug, Clone)]
pub struct FailingTaskStore {
    message: String,
}

impl FailingTaskStore {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl TaskStore for FailingTaskStore {
    async fn list_tasks(&self, _project_root: &Path) -> Result<Vec<TaskRecord>> {
        Err(crate::error::ChainError::Store(self.message.clone()))
    }
}
