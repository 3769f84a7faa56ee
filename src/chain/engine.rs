//! Chain execution engine.
//!
//! Runs an ordered list of stage descriptors against the agent executor,
//! one stage at a time, one iteration at a time. The chain-wide iteration
//! budget is threaded through as an explicit remaining-budget value; the
//! wall-clock deadline and the cancellation token are checked before every
//! attempt, so no stage can outlive the chain's allowance.
//!
//! Nothing that goes wrong during a run escapes [`ChainEngine::run`]:
//! collaborator errors and panics become failed stage results, sink panics
//! are swallowed.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::chain::config::ChainConfig;
use crate::completion::{CompletionProbe, default_completion};
use crate::domain::{ChainEvent, ChainResult, StageDescriptor, StageResult};
use crate::error::{ChainError, Result};
use crate::executor::{AgentExecutor, SpawnOutcome, SpawnRequest};

/// Why execution must halt before the next attempt, if it must.
enum Halt {
    Cancelled,
    DeadlineReached,
}

/// How one stage ended, before it is folded into a [`StageResult`].
struct StageOutcome {
    success: bool,
    iterations: u32,
    error: Option<String>,
}

impl StageOutcome {
    fn passed(iterations: u32) -> Self {
        Self {
            success: true,
            iterations,
            error: None,
        }
    }

    fn failed(iterations: u32, error: impl Into<String>) -> Self {
        Self {
            success: false,
            iterations,
            error: Some(error.into()),
        }
    }

    /// Cancellation carries no error string.
    fn halted(iterations: u32) -> Self {
        Self {
            success: false,
            iterations,
            error: None,
        }
    }
}

/// Executes one chain run.
///
/// Created fresh per invocation; [`run`](ChainEngine::run) consumes the
/// engine and disposes the executor at the end.
pub struct ChainEngine<E: AgentExecutor> {
    executor: Arc<E>,
    config: ChainConfig,
}

impl<E: AgentExecutor> ChainEngine<E> {
    /// Build an engine for one run. Fails if the config is invalid.
    pub fn new(executor: Arc<E>, config: ChainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { executor, config })
    }

    /// Run the chain to completion.
    ///
    /// Infallible by design: every failure is folded into the returned
    /// [`ChainResult`].
    pub async fn run(self) -> ChainResult {
        let started = Instant::now();
        let deadline = started + self.config.timeout;

        tracing::info!(stages = self.config.stages.len(), "chain run starting");
        self.emit(ChainEvent::ChainStarted {
            stages: self.config.stages.len(),
        });

        let mut stage_results: Vec<StageResult> = Vec::new();
        let mut errors: Vec<String> = Vec::new();
        let mut halted = false;
        let mut budget = self.config.iteration_budget;

        for (index, descriptor) in self.config.stages.iter().enumerate() {
            match self.should_stop(deadline) {
                Some(Halt::Cancelled) => {
                    tracing::info!(stage = %descriptor.name(), "cancellation observed before stage");
                    halted = true;
                    break;
                }
                Some(Halt::DeadlineReached) => {
                    let message =
                        format!("chain deadline reached before stage '{}'", descriptor.name());
                    self.emit(ChainEvent::Error {
                        stage: None,
                        message: message.clone(),
                    });
                    errors.push(message);
                    halted = true;
                    break;
                }
                None => {}
            }

            self.emit(ChainEvent::StageStarted {
                stage: descriptor.name().to_string(),
                index,
            });
            let stage_started = Instant::now();

            let (outcome, consumed) = if descriptor.is_loop() {
                self.run_loop_stage(descriptor, budget, deadline).await
            } else {
                (self.run_oneshot_stage(descriptor, deadline).await, 0)
            };
            budget = budget.saturating_sub(consumed);

            self.emit(ChainEvent::StageCompleted {
                stage: descriptor.name().to_string(),
                success: outcome.success,
                iterations: outcome.iterations,
            });

            if let Some(error) = &outcome.error {
                errors.push(format!("{}: {}", descriptor.name(), error));
            }

            let stage_failed = !outcome.success;
            stage_results.push(StageResult {
                descriptor: descriptor.clone(),
                success: outcome.success,
                iterations: outcome.iterations,
                duration: stage_started.elapsed(),
                error: outcome.error,
            });

            if stage_failed {
                break;
            }
        }

        let success = !halted && stage_results.iter().all(|result| result.success);
        let duration = started.elapsed();

        self.emit(ChainEvent::ChainCompleted {
            success,
            elapsed_ms: duration.as_millis() as u64,
        });
        tracing::info!(success = %success, elapsed_ms = %duration.as_millis(), "chain run finished");

        if let Err(error) = self.executor.dispose().await {
            tracing::warn!(error = %error, "agent executor dispose failed");
        }

        ChainResult {
            success,
            stage_results,
            duration,
            errors,
        }
    }

    /// One-shot stage: exactly one executor call, `iterations` reported as 1
    /// regardless of outcome. Consumes no iteration budget.
    async fn run_oneshot_stage(
        &self,
        descriptor: &StageDescriptor,
        deadline: Instant,
    ) -> StageOutcome {
        match self.spawn_once(descriptor, deadline).await {
            Ok(outcome) if outcome.success => StageOutcome::passed(1),
            Ok(outcome) => StageOutcome::failed(
                1,
                outcome
                    .error
                    .unwrap_or_else(|| "agent reported failure".to_string()),
            ),
            Err(error) => {
                self.contain(descriptor, &error);
                StageOutcome::failed(1, error.to_string())
            }
        }
    }

    /// Loop stage: repeat executor calls until the completion probe reports
    /// done, or a safety cap (budget, deadline, cancellation) halts it.
    /// Returns the outcome and the budget units consumed.
    async fn run_loop_stage(
        &self,
        descriptor: &StageDescriptor,
        budget: u32,
        deadline: Instant,
    ) -> (StageOutcome, u32) {
        let probe: Arc<dyn CompletionProbe> = match descriptor.completion() {
            Some(probe) => Arc::clone(probe),
            None => match self.config.task_store.as_ref() {
                Some(store) => default_completion(Arc::clone(store)),
                // validate() rejects this; guard against post-construction mutation
                None => {
                    return (
                        StageOutcome::failed(0, "no completion check and no task store available"),
                        0,
                    );
                }
            },
        };

        let mut iterations: u32 = 0;
        loop {
            match self.should_stop(deadline) {
                Some(Halt::Cancelled) => {
                    tracing::info!(stage = %descriptor.name(), "cancellation observed; stopping stage");
                    return (StageOutcome::halted(iterations), iterations);
                }
                Some(Halt::DeadlineReached) => {
                    return (
                        StageOutcome::failed(iterations, ChainError::DeadlineExceeded.to_string()),
                        iterations,
                    );
                }
                None => {}
            }
            if iterations >= budget {
                tracing::warn!(stage = %descriptor.name(), budget = %budget, "iteration budget exhausted");
                return (
                    StageOutcome::failed(
                        iterations,
                        format!("iteration budget exhausted after {} attempts", iterations),
                    ),
                    iterations,
                );
            }

            iterations += 1;
            self.emit(ChainEvent::StageIteration {
                stage: descriptor.name().to_string(),
                iteration: iterations,
            });

            match self.spawn_once(descriptor, deadline).await {
                Ok(outcome) if outcome.success => {}
                Ok(outcome) => {
                    return (
                        StageOutcome::failed(
                            iterations,
                            outcome
                                .error
                                .unwrap_or_else(|| "agent reported failure".to_string()),
                        ),
                        iterations,
                    );
                }
                Err(error) => {
                    self.contain(descriptor, &error);
                    return (
                        StageOutcome::failed(iterations, error.to_string()),
                        iterations,
                    );
                }
            }

            match self.check_done(&probe).await {
                Ok(true) => return (StageOutcome::passed(iterations), iterations),
                Ok(false) => {}
                Err(error) => {
                    self.contain(descriptor, &error);
                    return (
                        StageOutcome::failed(iterations, error.to_string()),
                        iterations,
                    );
                }
            }
        }
    }

    /// One guarded executor call: bounded by the remaining chain allowance,
    /// panics converted to errors, spawned/completed events around it.
    async fn spawn_once(
        &self,
        descriptor: &StageDescriptor,
        deadline: Instant,
    ) -> Result<SpawnOutcome> {
        let request = SpawnRequest {
            role: descriptor.name().to_string(),
            working_dir: self.config.project_root.clone(),
            model: self
                .config
                .model_for(descriptor.name())
                .map(str::to_string),
            prompt: descriptor.prompt().unwrap_or_default().to_string(),
            cancel: self.config.cancel.clone(),
        };

        self.emit(ChainEvent::AgentSpawned {
            stage: descriptor.name().to_string(),
            model: request.model.clone(),
        });

        let remaining = deadline.saturating_duration_since(Instant::now());
        let call = AssertUnwindSafe(self.executor.spawn(request)).catch_unwind();
        let outcome = match tokio::time::timeout(remaining, call).await {
            Err(_) => Err(ChainError::DeadlineExceeded),
            Ok(Err(panic)) => Err(ChainError::Executor(panic_message(panic.as_ref()))),
            Ok(Ok(result)) => result,
        };

        match &outcome {
            Ok(spawned) => self.emit(ChainEvent::AgentCompleted {
                stage: descriptor.name().to_string(),
                success: spawned.success,
                session_id: Some(spawned.session_id.clone()),
            }),
            Err(_) => self.emit(ChainEvent::AgentCompleted {
                stage: descriptor.name().to_string(),
                success: false,
                session_id: None,
            }),
        }

        outcome
    }

    /// Evaluate the completion probe with panic containment.
    async fn check_done(&self, probe: &Arc<dyn CompletionProbe>) -> Result<bool> {
        let call = AssertUnwindSafe(probe.is_done(&self.config.project_root)).catch_unwind();
        match call.await {
            Ok(result) => result,
            Err(panic) => Err(ChainError::Completion(panic_message(panic.as_ref()))),
        }
    }

    /// Convert a contained collaborator failure into an error event. Safety
    /// caps (deadline) are not collaborator failures and emit no event.
    fn contain(&self, descriptor: &StageDescriptor, error: &ChainError) {
        if matches!(error, ChainError::DeadlineExceeded) {
            return;
        }
        tracing::error!(stage = %descriptor.name(), error = %error, "collaborator call failed");
        self.emit(ChainEvent::Error {
            stage: Some(descriptor.name().to_string()),
            message: error.to_string(),
        });
    }

    /// The one should-stop check, shared by the stage boundary and the
    /// iteration boundary.
    fn should_stop(&self, deadline: Instant) -> Option<Halt> {
        let cancelled = self
            .config
            .cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled);
        if cancelled {
            return Some(Halt::Cancelled);
        }
        if Instant::now() >= deadline {
            return Some(Halt::DeadlineReached);
        }
        None
    }

    /// Best-effort event delivery: a panicking sink never alters the run.
    fn emit(&self, event: ChainEvent) {
        if let Some(sink) = &self.config.sink
            && std::panic::catch_unwind(AssertUnwindSafe(|| sink.emit(&event))).is_err()
        {
            tracing::debug!("event sink panicked; event dropped");
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "collaborator panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::parse_chain;
    use crate::completion::probe_fn;
    use crate::executor::ScriptedExecutor;
    use crate::sink::{EventSink, MemorySink, NullSink};
    use crate::store::{MemoryTaskStore, TaskRecord, TaskStatus};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Sink that panics on every event.
    struct PanickingSink;

    impl EventSink for PanickingSink {
        fn emit(&self, _event: &ChainEvent) {
            panic!("sink exploded");
        }
    }

    /// Probe that reports done once it has been asked `done_after` times.
    fn counting_probe(done_after: u32) -> Arc<dyn CompletionProbe> {
        let calls = AtomicU32::new(0);
        probe_fn(move |_| {
            let seen = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(seen >= done_after)
        })
    }

    fn config_for(expr: &str) -> ChainConfig {
        ChainConfig::new(parse_chain(expr).unwrap(), "/tmp/project")
    }

    #[tokio::test]
    async fn test_oneshot_chain_succeeds() {
        let executor = Arc::new(ScriptedExecutor::always_ok());
        let engine = ChainEngine::new(Arc::clone(&executor), config_for("planner -> worker")).unwrap();

        let result = engine.run().await;

        assert!(result.success);
        assert_eq!(result.stage_results.len(), 2);
        assert!(result.errors.is_empty());
        for stage in &result.stage_results {
            assert!(stage.success);
            assert_eq!(stage.iterations, 1);
        }

        let roles: Vec<String> = executor.requests().iter().map(|r| r.role.clone()).collect();
        assert_eq!(roles, vec!["planner", "worker"]);
        assert_eq!(executor.dispose_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_stage_halts_chain() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            Ok(SpawnOutcome::ok("sess-1")),
            Ok(SpawnOutcome::failed("sess-2", "tool call exploded")),
        ]));
        let engine = ChainEngine::new(
            Arc::clone(&executor),
            config_for("planner -> task-manager -> worker"),
        )
        .unwrap();

        let result = engine.run().await;

        assert!(!result.success);
        assert_eq!(result.stage_results.len(), 2);
        assert!(result.stage_results[0].success);
        assert!(!result.stage_results[1].success);
        assert_eq!(
            result.stage_results[1].error.as_deref(),
            Some("tool call exploded")
        );
        assert_eq!(result.errors, vec!["task-manager: tool call exploded"]);
        // third stage never spawned
        assert_eq!(executor.spawn_count(), 2);
    }

    #[tokio::test]
    async fn test_loop_stage_runs_until_probe_done() {
        let executor = Arc::new(ScriptedExecutor::always_ok());
        let stage = StageDescriptor::new("coordinator").with_completion(counting_probe(3));
        let engine = ChainEngine::new(
            Arc::clone(&executor),
            ChainConfig::new(vec![stage], "/tmp/project"),
        )
        .unwrap();

        let result = engine.run().await;

        assert!(result.success);
        assert_eq!(result.stage_results[0].iterations, 3);
        assert_eq!(executor.spawn_count(), 3);
    }

    #[tokio::test]
    async fn test_oneshot_stages_do_not_consume_budget() {
        let executor = Arc::new(ScriptedExecutor::always_ok());
        let stages = vec![
            StageDescriptor::new("planner"),
            StageDescriptor::new("worker"),
            StageDescriptor::new("coordinator").with_completion(probe_fn(|_| Ok(false))),
        ];
        let config = ChainConfig::new(stages, "/tmp/project").with_iteration_budget(3);
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        let result = engine.run().await;

        // loop stage gets the whole budget: 3 attempts, then exhaustion
        let coordinator = &result.stage_results[2];
        assert_eq!(coordinator.iterations, 3);
        assert!(!coordinator.success);
        assert!(coordinator.error.as_deref().unwrap().contains("budget"));
        assert_eq!(executor.spawn_count(), 2 + 3);
    }

    #[tokio::test]
    async fn test_budget_shared_across_loop_stages() {
        let executor = Arc::new(ScriptedExecutor::always_ok());
        let stages = vec![
            StageDescriptor::new("coordinator").with_completion(counting_probe(2)),
            StageDescriptor::new("coordinator").with_completion(probe_fn(|_| Ok(false))),
        ];
        let config = ChainConfig::new(stages, "/tmp/project").with_iteration_budget(3);
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        let result = engine.run().await;

        assert_eq!(result.stage_results[0].iterations, 2);
        assert!(result.stage_results[0].success);
        // only the remaining budget unit is available to the second loop
        assert_eq!(result.stage_results[1].iterations, 1);
        assert!(!result.stage_results[1].success);
    }

    #[tokio::test]
    async fn test_cancel_between_stages() {
        let cancel = CancellationToken::new();
        let hook_token = cancel.clone();
        let executor = Arc::new(ScriptedExecutor::always_ok().with_spawn_hook(move |request| {
            if request.role == "planner" {
                hook_token.cancel();
            }
        }));
        let config = config_for("planner -> worker").with_cancel(cancel);
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        let result = engine.run().await;

        assert!(!result.success);
        assert_eq!(result.stage_results.len(), 1);
        assert!(result.stage_results[0].success);
        assert!(result.errors.is_empty());
        assert_eq!(executor.spawn_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_stops_loop_stage_without_error() {
        let cancel = CancellationToken::new();
        let hook_token = cancel.clone();
        let executor = Arc::new(
            ScriptedExecutor::always_ok().with_spawn_hook(move |_| hook_token.cancel()),
        );
        let stage = StageDescriptor::new("coordinator").with_completion(probe_fn(|_| Ok(false)));
        let config = ChainConfig::new(vec![stage], "/tmp/project").with_cancel(cancel);
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        let result = engine.run().await;

        assert!(!result.success);
        let stage = &result.stage_results[0];
        assert!(!stage.success);
        assert_eq!(stage.iterations, 1);
        assert!(stage.error.is_none());
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_default_probe_from_task_store() {
        let executor = Arc::new(ScriptedExecutor::always_ok());
        let store = MemoryTaskStore::new(vec![
            TaskRecord::new("t1", "done one").with_status(TaskStatus::Done),
            TaskRecord::new("t2", "done two").with_status(TaskStatus::Done),
        ]);
        let config = config_for("coordinator").with_task_store(Arc::new(store));
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        let result = engine.run().await;

        assert!(result.success);
        assert_eq!(result.stage_results[0].iterations, 1);
    }

    #[tokio::test]
    async fn test_default_probe_empty_store_never_done() {
        let executor = Arc::new(ScriptedExecutor::always_ok());
        let config = config_for("coordinator")
            .with_task_store(Arc::new(MemoryTaskStore::empty()))
            .with_iteration_budget(2);
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        let result = engine.run().await;

        assert!(!result.success);
        assert_eq!(result.stage_results[0].iterations, 2);
    }

    #[tokio::test]
    async fn test_probe_error_contained_as_stage_failure() {
        let executor = Arc::new(ScriptedExecutor::always_ok());
        let sink = Arc::new(MemorySink::new());
        let stage = StageDescriptor::new("coordinator")
            .with_completion(probe_fn(|_| Err(ChainError::Store("tasks unreadable".to_string()))));
        let config = ChainConfig::new(vec![stage], "/tmp/project").with_sink(sink.clone());
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        let result = engine.run().await;

        assert!(!result.success);
        let stage = &result.stage_results[0];
        assert!(!stage.success);
        assert!(stage.error.as_deref().unwrap().contains("tasks unreadable"));
        assert!(sink.events().iter().any(|event| event.is_error()));
    }

    #[tokio::test]
    async fn test_probe_panic_contained() {
        let executor = Arc::new(ScriptedExecutor::always_ok());
        let stage = StageDescriptor::new("coordinator")
            .with_completion(probe_fn(|_| panic!("probe blew up")));
        let config = ChainConfig::new(vec![stage], "/tmp/project");
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        let result = engine.run().await;

        assert!(!result.success);
        assert!(
            result.stage_results[0]
                .error
                .as_deref()
                .unwrap()
                .contains("probe blew up")
        );
    }

    #[tokio::test]
    async fn test_executor_transport_error_contained() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Err(ChainError::Executor(
            "session setup failed".to_string(),
        ))]));
        let sink = Arc::new(MemorySink::new());
        let config = config_for("planner").with_sink(sink.clone());
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        let result = engine.run().await;

        assert!(!result.success);
        assert!(result.errors[0].contains("session setup failed"));
        assert!(sink.events().iter().any(|event| event.is_error()));
    }

    #[tokio::test]
    async fn test_deadline_fails_sleeping_stage() {
        let executor =
            Arc::new(ScriptedExecutor::always_ok().with_delay(Duration::from_millis(100)));
        let config = config_for("planner").with_timeout(Duration::from_millis(10));
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        let result = engine.run().await;

        assert!(!result.success);
        let stage = &result.stage_results[0];
        assert_eq!(stage.iterations, 1);
        assert!(stage.error.as_deref().unwrap().contains("deadline"));
    }

    #[tokio::test]
    async fn test_event_sequence_for_oneshot_stage() {
        let executor = Arc::new(ScriptedExecutor::always_ok());
        let sink = Arc::new(MemorySink::new());
        let config = config_for("planner").with_sink(sink.clone());
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        engine.run().await;

        let events = sink.events();
        assert!(matches!(events[0], ChainEvent::ChainStarted { stages: 1 }));
        assert!(matches!(events[1], ChainEvent::StageStarted { .. }));
        assert!(matches!(events[2], ChainEvent::AgentSpawned { .. }));
        assert!(matches!(events[3], ChainEvent::AgentCompleted { .. }));
        assert!(matches!(events[4], ChainEvent::StageCompleted { .. }));
        assert!(matches!(events[5], ChainEvent::ChainCompleted { .. }));
        assert_eq!(events.len(), 6);
    }

    #[tokio::test]
    async fn test_loop_stage_emits_iteration_events() {
        let executor = Arc::new(ScriptedExecutor::always_ok());
        let sink = Arc::new(MemorySink::new());
        let stage = StageDescriptor::new("coordinator").with_completion(counting_probe(2));
        let config = ChainConfig::new(vec![stage], "/tmp/project").with_sink(sink.clone());
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        engine.run().await;

        let iterations: Vec<u32> = sink
            .events()
            .iter()
            .filter_map(|event| match event {
                ChainEvent::StageIteration { iteration, .. } => Some(*iteration),
                _ => None,
            })
            .collect();
        assert_eq!(iterations, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_panicking_sink_does_not_change_outcome() {
        async fn run_with(sink: Arc<dyn EventSink>) -> ChainResult {
            let executor = Arc::new(ScriptedExecutor::always_ok());
            let stage = StageDescriptor::new("coordinator").with_completion(counting_probe(2));
            let stages = vec![StageDescriptor::new("planner"), stage];
            let config = ChainConfig::new(stages, "/tmp/project").with_sink(sink);
            let engine = ChainEngine::new(executor, config).unwrap();
            engine.run().await
        }

        let noisy = run_with(Arc::new(PanickingSink)).await;
        let quiet = run_with(Arc::new(NullSink)).await;

        assert_eq!(noisy.success, quiet.success);
        assert_eq!(noisy.stage_results.len(), quiet.stage_results.len());
        for (a, b) in noisy.stage_results.iter().zip(quiet.stage_results.iter()) {
            assert_eq!(a.stage(), b.stage());
            assert_eq!(a.success, b.success);
            assert_eq!(a.iterations, b.iterations);
            assert_eq!(a.error, b.error);
        }
        assert_eq!(noisy.errors, quiet.errors);
    }

    #[tokio::test]
    async fn test_model_resolution_and_prompt_injection() {
        let executor = Arc::new(ScriptedExecutor::always_ok());
        let stages = vec![
            StageDescriptor::new("planner").with_prompt("draft the plan"),
            StageDescriptor::new("worker"),
        ];
        let config = ChainConfig::new(stages, "/tmp/project")
            .with_default_model("sonnet")
            .with_model_override("planner", "opus");
        let engine = ChainEngine::new(Arc::clone(&executor), config).unwrap();

        engine.run().await;

        let requests = executor.requests();
        assert_eq!(requests[0].model.as_deref(), Some("opus"));
        assert_eq!(requests[0].prompt, "draft the plan");
        assert_eq!(requests[1].model.as_deref(), Some("sonnet"));
        assert_eq!(requests[1].prompt, "");
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_config() {
        let executor = Arc::new(ScriptedExecutor::always_ok());
        let config = ChainConfig::new(Vec::new(), "/tmp/project");
        assert!(ChainEngine::new(executor, config).is_err());
    }
}
