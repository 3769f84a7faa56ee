//! Event sinks: one-way consumers of the chain lifecycle stream.
//!
//! Sinks observe, never steer. The engine swallows anything a sink does
//! wrong, so a broken sink cannot change a run's outcome.

pub mod jsonl;

use std::sync::Mutex;

use crate::domain::ChainEvent;

pub use jsonl::JsonlSink;

/// Receives one lifecycle event at a time.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ChainEvent);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &ChainEvent) {}
}

/// Sink that collects events in memory, for tests and harnesses.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ChainEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events seen so far, in emission order.
    pub fn events(&self) -> Vec<ChainEvent> {
        self.events.lock().expect("events lock").clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &ChainEvent) {
        self.events.lock().expect("events lock").push(event.clone());
    }
}

/// Sink that forwards events to `tracing` with structured fields.
///
/// Matches the event enum exhaustively: a new event kind will not compile
/// until this consumer handles it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &ChainEvent) {
        match event {
            ChainEvent::ChainStarted { stages } => {
                tracing::info!(stages = %stages, "chain started");
            }
            ChainEvent::ChainCompleted { success, elapsed_ms } => {
                tracing::info!(success = %success, elapsed_ms = %elapsed_ms, "chain completed");
            }
            ChainEvent::StageStarted { stage, index } => {
                tracing::info!(stage = %stage, index = %index, "stage started");
            }
            ChainEvent::StageCompleted {
                stage,
                success,
                iterations,
            } => {
                tracing::info!(stage = %stage, success = %success, iterations = %iterations, "stage completed");
            }
            ChainEvent::StageIteration { stage, iteration } => {
                tracing::debug!(stage = %stage, iteration = %iteration, "stage iteration");
            }
            ChainEvent::AgentSpawned { stage, model } => {
                tracing::debug!(stage = %stage, model = ?model, "agent spawned");
            }
            ChainEvent::AgentCompleted {
                stage,
                success,
                session_id,
            } => {
                tracing::debug!(stage = %stage, success = %success, session_id = ?session_id, "agent completed");
            }
            ChainEvent::Error { stage, message } => {
                tracing::error!(stage = ?stage, message = %message, "chain error");
            }
        }
    }
}
