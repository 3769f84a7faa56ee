//! Stage descriptor and role lifecycle table.
//!
//! A stage binds a role identifier to its lifecycle (one-shot or looping).
//! The lifecycle is intrinsic to the role: it comes from a fixed table, not
//! from the chain expression.

use std::fmt;
use std::sync::Arc;

use crate::completion::CompletionProbe;

/// Fixed role -> lifecycle table. `true` means the role loops until its
/// completion probe reports done (or a safety cap halts it).
const ROLE_LIFECYCLE: &[(&str, bool)] = &[
    ("planner", false),
    ("task-manager", false),
    ("coordinator", true),
    ("worker", false),
];

/// Look up the lifecycle for a role name. `None` for roles not in the table.
pub fn role_lifecycle(role: &str) -> Option<bool> {
    ROLE_LIFECYCLE
        .iter()
        .find(|(name, _)| *name == role)
        .map(|(_, loops)| *loops)
}

/// One named step in a chain.
///
/// The role name and loop flag are fixed at construction. Per-run data (an
/// injected prompt, a custom completion probe) can be attached afterwards
/// without altering either.
#[derive(Clone)]
pub struct StageDescriptor {
    name: String,
    looping: bool,
    prompt: Option<String>,
    completion: Option<Arc<dyn CompletionProbe>>,
}

impl StageDescriptor {
    /// Create a descriptor for the given role. The name is lowercased; the
    /// loop flag comes from the role table. Roles absent from the table
    /// default to one-shot, which masks typos in loop-role names, so the
    /// fallback is flagged with a warning.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into().to_lowercase();
        let looping = match role_lifecycle(&name) {
            Some(looping) => looping,
            None => {
                tracing::warn!(role = %name, "role not in lifecycle table; defaulting to one-shot");
                false
            }
        };
        Self {
            name,
            looping,
            prompt: None,
            completion: None,
        }
    }

    /// The role name, lowercased.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this stage repeats until its completion probe reports done.
    pub fn is_loop(&self) -> bool {
        self.looping
    }

    /// The injected prompt, if any.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// The stage-supplied completion probe, if any.
    pub fn completion(&self) -> Option<&Arc<dyn CompletionProbe>> {
        self.completion.as_ref()
    }

    /// Attach a prompt to inject when this stage spawns its agent.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Attach a completion probe, overriding the default for loop stages.
    pub fn with_completion(mut self, probe: Arc<dyn CompletionProbe>) -> Self {
        self.completion = Some(probe);
        self
    }
}

impl fmt::Debug for StageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageDescriptor")
            .field("name", &self.name)
            .field("looping", &self.looping)
            .field("prompt", &self.prompt)
            .field("completion", &self.completion.as_ref().map(|_| "<probe>"))
            .finish()
    }
}
