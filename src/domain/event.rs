//! Chain lifecycle events for observability.
//!
//! The event stream is a closed sum type: every consumer matches it
//! exhaustively, so adding an event kind forces each consumer to be updated
//! deliberately.

use serde::Serialize;

/// One lifecycle event emitted during a chain run.
///
/// Delivery is best-effort and one-way; sinks cannot alter stage or chain
/// outcomes.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChainEvent {
    /// The chain run began.
    ChainStarted {
        /// Number of stages in the chain
        stages: usize,
    },
    /// The chain run ended, successfully or not.
    ChainCompleted {
        success: bool,
        /// Total wall-clock time in milliseconds
        elapsed_ms: u64,
    },
    /// A stage began executing.
    StageStarted {
        stage: String,
        /// Zero-based position in the chain
        index: usize,
    },
    /// A stage finished executing.
    StageCompleted {
        stage: String,
        success: bool,
        iterations: u32,
    },
    /// A loop stage began an attempt (1-based).
    StageIteration { stage: String, iteration: u32 },
    /// An agent session was handed to the executor.
    AgentSpawned {
        stage: String,
        model: Option<String>,
    },
    /// The executor returned for one agent session.
    AgentCompleted {
        stage: String,
        success: bool,
        session_id: Option<String>,
    },
    /// A collaborator call failed during execution.
    Error {
        /// Originating stage, when the failure is attributable to one
        stage: Option<String>,
        message: String,
    },
}

impl ChainEvent {
    /// The stage this event belongs to, if any.
    pub fn stage(&self) -> Option<&str> {
        match self {
            ChainEvent::ChainStarted { .. } | ChainEvent::ChainCompleted { .. } => None,
            ChainEvent::StageStarted { stage, .. }
            | ChainEvent::StageCompleted { stage, .. }
            | ChainEvent::StageIteration { stage, .. }
            | ChainEvent::AgentSpawned { stage, .. }
            | ChainEvent::AgentCompleted { stage, .. } => Some(stage),
            ChainEvent::Error { stage, .. } => stage.as_deref(),
        }
    }

    /// Whether this event reports a collaborator failure.
    pub fn is_error(&self) -> bool {
        matches!(self, ChainEvent::Error { .. })
    }
}
