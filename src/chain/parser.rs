//! Chain specification parser.
//!
//! A chain expression is a list of role identifiers separated by `->`:
//!
//! ```text
//! planner -> task-manager -> coordinator
//! ```
//!
//! Each segment becomes one [`StageDescriptor`], in order, lowercased. The
//! loop flag comes from the fixed role table, never from the expression; the
//! old `role:count` suffix is rejected outright.

use crate::domain::StageDescriptor;
use crate::error::{ChainError, Result};

const ARROW: &str = "->";

/// Parse a chain expression into ordered stage descriptors.
///
/// Fails, never coerces: an empty expression, a leading or trailing arrow,
/// an interior empty segment, or a `role:count` segment all produce a
/// descriptive [`ChainError::Parse`].
pub fn parse_chain(expression: &str) -> Result<Vec<StageDescriptor>> {
    if expression.trim().is_empty() {
        return Err(ChainError::Parse("chain expression is empty".to_string()));
    }

    let segments: Vec<&str> = expression.split(ARROW).map(str::trim).collect();
    let last = segments.len() - 1;

    let mut stages = Vec::with_capacity(segments.len());
    for (index, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            let message = if index == 0 {
                "chain expression starts with '->'".to_string()
            } else if index == last {
                "chain expression ends with '->'".to_string()
            } else {
                format!("empty stage at position {}", index + 1)
            };
            return Err(ChainError::Parse(message));
        }

        if segment.contains(':') {
            return Err(ChainError::Parse(format!(
                "stage '{}' uses the removed 'role:count' syntax; \
                 loop behavior is determined by the role itself, not a count",
                segment
            )));
        }

        if segment.chars().any(char::is_whitespace) {
            return Err(ChainError::Parse(format!(
                "stage '{}' is not a single role identifier",
                segment
            )));
        }

        stages.push(StageDescriptor::new(*segment));
    }

    Ok(stages)
}
