//! Overlap detection: can two rules' conditions hold at the same time?

use crate::error::Result;
use crate::ir::{Rule, StateSchema};
use crate::semantics::smt::encode_condition;
use crate::semantics::state::{ConcreteState, SymbolicState};
use crate::semantics::symbolic::and_all;
use crate::solver::{CheckResult, SolverSession};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlapResult {
    /// Both conditions hold on this in-domain state
    Overlapping(ConcreteState),
    Disjoint,
    Unknown(String),
}

/// Search for an in-domain state on which both rules would fire.
///
/// Each call allocates a fresh state labelled `overlap<n>`, so repeated
/// checks can share one session.
pub fn check_overlap(
    session: &mut SolverSession,
    schema: &StateSchema,
    first: &Rule,
    second: &Rule,
) -> Result<OverlapResult> {
    first.validate(schema)?;
    second.validate(schema)?;

    let label = session.vocabulary_mut().next_label("overlap");
    let state = SymbolicState::fresh(schema, 0, &label, session.vocabulary_mut())?;
    let constraints = and_all(&[
        state.domain_constraints(schema),
        encode_condition(first.condition(), &state)?,
        encode_condition(second.condition(), &state)?,
    ]);

    session.push();
    session.assert(&constraints);
    let outcome = session.check().and_then(|result| match result {
        CheckResult::Sat(model) => Ok(OverlapResult::Overlapping(state.read(&model)?)),
        CheckResult::Unsat => Ok(OverlapResult::Disjoint),
        CheckResult::Unknown(reason) => Ok(OverlapResult::Unknown(reason)),
    });
    session.pop()?;

    let outcome = outcome?;
    info!(
        first = first.name(),
        second = second.name(),
        overlapping = matches!(outcome, OverlapResult::Overlapping(_)),
        "overlap checked"
    );
    Ok(outcome)
}
