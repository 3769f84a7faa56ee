//! Agent executor collaborator interface.
//!
//! The executor owns everything about actually running an agent: model
//! calls, tool use, conversational state. This core treats it as a black box
//! that turns one [`SpawnRequest`] into one [`SpawnOutcome`].

pub mod mock;

use std::path::PathBuf;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

pub use mock::ScriptedExecutor;

/// Everything the executor needs for one stage execution attempt.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    /// Role identifier for the agent to run
    pub role: String,
    /// Project root the agent works in
    pub working_dir: PathBuf,
    /// Model override for this role, if any
    pub model: Option<String>,
    /// Prompt injected for this stage
    pub prompt: String,
    /// Cooperative cancellation signal, shared with the engine
    pub cancel: Option<CancellationToken>,
}

/// What the executor reports back for one attempt.
///
/// Failures are reported here rather than as `Err`; `Err` from
/// [`AgentExecutor::spawn`] means the executor itself broke (transport,
/// session setup), not that the agent's work failed.
#[derive(Debug, Clone)]
pub struct SpawnOutcome {
    /// Whether the agent's work succeeded
    pub success: bool,
    /// Executor-assigned session identifier
    pub session_id: String,
    /// Opaque transcript of the session
    pub transcript: String,
    /// Failure detail when `success` is false
    pub error: Option<String>,
}

impl SpawnOutcome {
    /// A successful attempt.
    pub fn ok(session_id: impl Into<String>) -> Self {
        Self {
            success: true,
            session_id: session_id.into(),
            transcript: String::new(),
            error: None,
        }
    }

    /// A failed attempt with the executor's error message.
    pub fn failed(session_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            session_id: session_id.into(),
            transcript: String::new(),
            error: Some(error.into()),
        }
    }

    /// Attach the session transcript.
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = transcript.into();
        self
    }
}

/// Opaque collaborator that performs the agent work for one attempt.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Run one agent session to completion.
    async fn spawn(&self, request: SpawnRequest) -> Result<SpawnOutcome>;

    /// Release executor resources. Called once by the engine at end of run.
    async fn dispose(&self) -> Result<()>;
}
