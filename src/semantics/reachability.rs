//! Goal reachability for a single workflow

use crate::error::{Error, Result};
use crate::ir::Condition;
use crate::semantics::concrete::eval_condition;
use crate::semantics::smt::encode_condition;
use crate::semantics::symbolic::and_all;
use crate::semantics::workflow::{Trace, Workflow};
use crate::solver::{CheckResult, SolverSession};
use tracing::info;

/// Outcome of a reachability query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachabilityResult {
    /// Some in-domain initial state drives the workflow into the goal
    Reachable(Box<Trace>),
    /// No in-domain initial state reaches the goal after `horizon` steps
    Unreachable { horizon: usize },
    Unknown(String),
}

impl ReachabilityResult {
    pub fn witness(&self) -> Option<&Trace> {
        match self {
            ReachabilityResult::Reachable(trace) => Some(trace),
            _ => None,
        }
    }
}

/// Ask whether the workflow's final state can satisfy `goal`.
///
/// Runs inside a push/pop scope. A witness is replayed concretely and
/// must satisfy the goal again before it is returned.
pub fn check_reachability(
    session: &mut SolverSession,
    workflow: &Workflow<'_>,
    goal: &Condition,
) -> Result<ReachabilityResult> {
    let schema = workflow.schema();
    let mut referenced = Vec::new();
    goal.fields(&mut referenced);
    for field in referenced {
        schema.require(field, || "reachability goal".to_string())?;
    }

    let constraints = and_all(&[
        workflow.initial_state().domain_constraints(schema),
        workflow.constraints(),
        encode_condition(goal, workflow.final_state())?,
    ]);
    session.push();
    session.assert(&constraints);
    let outcome = session.check().and_then(|result| match result {
        CheckResult::Sat(model) => {
            let initial = workflow.initial_state().read(&model)?;
            let trace = workflow.simulate(&initial)?;
            if !eval_condition(goal, trace.final_state())? {
                return Err(Error::Solver(format!(
                    "replay from {} does not reach goal {}",
                    initial, goal
                )));
            }
            Ok(ReachabilityResult::Reachable(Box::new(trace)))
        }
        CheckResult::Unsat => Ok(ReachabilityResult::Unreachable {
            horizon: workflow.horizon(),
        }),
        CheckResult::Unknown(reason) => Ok(ReachabilityResult::Unknown(reason)),
    });
    session.pop()?;

    let outcome = outcome?;
    info!(
        workflow = workflow.label(),
        %goal,
        reachable = outcome.witness().is_some(),
        "reachability checked"
    );
    Ok(outcome)
}
