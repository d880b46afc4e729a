//! Concrete replay of two workflows to find a diverging input without the solver

use crate::error::Result;
use crate::semantics::state::ConcreteState;
use crate::semantics::workflow::{Trace, Workflow};
use tracing::debug;

/// An initial state on which two workflows end in different final states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    pub initial: ConcreteState,
    pub left: Trace,
    pub right: Trace,
    /// Observed fields whose final values differ
    pub differing: Vec<String>,
}

/// Replay both workflows on every state and return the first divergence.
///
/// `observed` restricts the comparison to those fields of the final state.
pub fn find_divergence(
    left: &Workflow<'_>,
    right: &Workflow<'_>,
    states: &[ConcreteState],
    observed: &[String],
) -> Result<Option<Divergence>> {
    for (i, initial) in states.iter().enumerate() {
        let left_trace = left.simulate(initial)?;
        let right_trace = right.simulate(initial)?;
        let differing = left_trace
            .final_state()
            .differing_fields(right_trace.final_state(), observed.iter().map(String::as_str));
        if !differing.is_empty() {
            debug!(sample = i, %initial, "concrete replay diverged");
            return Ok(Some(Divergence {
                initial: initial.clone(),
                left: left_trace,
                right: right_trace,
                differing,
            }));
        }
    }
    Ok(None)
}
