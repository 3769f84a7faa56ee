//! Scripted agent executor for testing.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{AgentExecutor, SpawnOutcome, SpawnRequest};
use crate::error::Result;

type SpawnHook = Box<dyn Fn(&SpawnRequest) + Send + Sync>;

/// Replays scripted outcomes in order and records every request it saw.
///
/// Once the script is exhausted, further spawns succeed with generated
/// session ids, so tests only script the interesting calls.
pub struct ScriptedExecutor {
    script: Mutex<VecDeque<Result<SpawnOutcome>>>,
    requests: Mutex<Vec<SpawnRequest>>,
    spawn_count: AtomicU32,
    dispose_count: AtomicU32,
    delay: Option<Duration>,
    on_spawn: Option<SpawnHook>,
}

impl ScriptedExecutor {
    /// Executor that replays the given outcomes, then succeeds.
    pub fn new(script: Vec<Result<SpawnOutcome>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            spawn_count: AtomicU32::new(0),
            dispose_count: AtomicU32::new(0),
            delay: None,
            on_spawn: None,
        }
    }

    /// Executor whose every spawn succeeds.
    pub fn always_ok() -> Self {
        Self::new(Vec::new())
    }

    /// Sleep this long inside each spawn, for deadline tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Run a hook against each request before producing its outcome. Tests
    /// use this to cancel tokens mid-stage or to panic inside the executor.
    pub fn with_spawn_hook(mut self, hook: impl Fn(&SpawnRequest) + Send + Sync + 'static) -> Self {
        self.on_spawn = Some(Box::new(hook));
        self
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<SpawnRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Number of spawn calls made.
    pub fn spawn_count(&self) -> u32 {
        self.spawn_count.load(Ordering::SeqCst)
    }

    /// Number of dispose calls made.
    pub fn dispose_count(&self) -> u32 {
        self.dispose_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentExecutor for ScriptedExecutor {
    async fn spawn(&self, request: SpawnRequest) -> Result<SpawnOutcome> {
        if let Some(hook) = &self.on_spawn {
            hook(&request);
        }
        self.requests.lock().expect("requests lock").push(request);
        let n = self.spawn_count.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.script.lock().expect("script lock").pop_front();
        match scripted {
            Some(outcome) => outcome,
            None => Ok(SpawnOutcome::ok(format!("sess-{:03}", n))),
        }
    }

    async fn dispose(&self) -> Result<()> {
        self.dispose_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
