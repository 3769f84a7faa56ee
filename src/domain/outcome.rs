//! Chain and stage execution results.

use std::time::Duration;

use crate::domain::stage::StageDescriptor;

/// Result of executing one stage.
#[derive(Debug, Clone)]
pub struct StageResult {
    /// The descriptor this stage ran from
    pub descriptor: StageDescriptor,
    /// Whether the stage reached its goal
    pub success: bool,
    /// Executor attempts actually made (one-shot stages report 1)
    pub iterations: u32,
    /// Wall-clock time spent in this stage
    pub duration: Duration,
    /// Failure message, when there is one (cancellation carries none)
    pub error: Option<String>,
}

impl StageResult {
    /// The stage's role name.
    pub fn stage(&self) -> &str {
        self.descriptor.name()
    }
}

/// Aggregate result of a chain run.
///
/// Contains one [`StageResult`] per stage that started, in execution order.
#[derive(Debug, Clone, Default)]
pub struct ChainResult {
    /// True iff no stage failed and no cancellation occurred
    pub success: bool,
    /// Results for the stages that started, in order
    pub stage_results: Vec<StageResult>,
    /// Total wall-clock time for the run
    pub duration: Duration,
    /// Failure messages in the order they occurred
    pub errors: Vec<String>,
}

impl ChainResult {
    /// Total executor attempts across all stages that started.
    pub fn total_iterations(&self) -> u32 {
        self.stage_results.iter().map(|r| r.iterations).sum()
    }

    /// The first failed stage, if any.
    pub fn failed_stage(&self) -> Option<&StageResult> {
        self.stage_results.iter().find(|r| !r.success)
    }
}
