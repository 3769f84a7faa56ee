//! Task record types exposed by the task store collaborator.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Current timestamp in milliseconds since Unix epoch.
fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Status of a persisted task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Blocked,
    Done,
}

impl TaskStatus {
    /// String form used in persisted task documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::Done => "Done",
        }
    }

    /// Whether this task needs no further work.
    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

/// One task as reported by the task store.
///
/// This core only reads records; creation and mutation belong to the store
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskRecord {
    /// Store-assigned identifier
    pub id: String,
    /// Short human-readable title
    pub title: String,
    /// Current status
    pub status: TaskStatus,
    /// Unix timestamp in milliseconds
    pub created_at: i64,
    /// Unix timestamp in milliseconds
    pub updated_at: i64,
}

impl TaskRecord {
    /// Create a new pending task record.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            id: id.into(),
            title: title.into(),
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a record with the given status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(TaskStatus::Pending.as_str(), "Pending");
        assert_eq!(TaskStatus::InProgress.as_str(), "InProgress");
        assert_eq!(TaskStatus::Blocked.as_str(), "Blocked");
        assert_eq!(TaskStatus::Done.as_str(), "Done");
    }

    #[test]
    fn test_status_is_done() {
        assert!(TaskStatus::Done.is_done());
        assert!(!TaskStatus::Pending.is_done());
        assert!(!TaskStatus::InProgress.is_done());
        assert!(!TaskStatus::Blocked.is_done());
    }

    #[test]
    fn test_new_record_is_pending() {
        let record = TaskRecord::new("task-1", "Wire up the parser");
        assert_eq!(record.id, "task-1");
        assert_eq!(record.title, "Wire up the parser");
        assert_eq!(record.status, TaskStatus::Pending);
        assert!(record.created_at > 0);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_with_status() {
        let record = TaskRecord::new("task-2", "Ship it").with_status(TaskStatus::Done);
        assert!(record.status.is_done());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let record = TaskRecord::new("task-3", "Review").with_status(TaskStatus::InProgress);
        let json = serde_json::to_string(&record).unwrap();
        let restored: TaskRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, restored);
    }

    #[test]
    fn test_status_serializes_as_string() {
        let json = serde_json::to_string(&TaskStatus::Done).unwrap();
        assert_eq!(json, "\"Done\"");
    }
}
