//! Solution enumeration by blocking clauses

use crate::error::Result;
use crate::semantics::symbolic::{int_const, or_any, Term};
use crate::solver::session::{CheckResult, Model, SolverSession, Value};
use std::fmt;
use tracing::{debug, info};
use z3::ast::Bool;

/// Why an enumeration stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The solver reported UNSAT: no further solutions exist
    Exhausted,
    /// The requested number of solutions was reached
    LimitReached,
    /// The solver gave up; carries its reason
    Unknown(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Exhausted => write!(f, "no further solutions"),
            StopReason::LimitReached => write!(f, "limit reached"),
            StopReason::Unknown(reason) => write!(f, "solver returned unknown ({})", reason),
        }
    }
}

/// Summary of an enumeration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    pub found: usize,
    pub stop: StopReason,
}

/// Assert that at least one term assigned in `model` takes a different value.
///
/// Only terms the model actually assigns are blocked. An empty model blocks
/// with `false`, so the next check is UNSAT.
pub fn block_current_solution(session: &mut SolverSession, model: &Model) -> Result<()> {
    session.ensure_current(model)?;

    let vocab = session.vocabulary();
    let mut differences: Vec<Bool> = Vec::with_capacity(model.len());
    for (name, value) in model.values() {
        let diff = match (vocab.get(name), value) {
            (Some(Term::Int(term)), Value::Int(n)) => term.eq(&int_const(*n)).not(),
            (Some(Term::Bool(term)), Value::Bool(true)) => term.not(),
            (Some(Term::Bool(term)), Value::Bool(false)) => term.clone(),
            // Values are only ever read from the session's own vocabulary
            _ => continue,
        };
        differences.push(diff);
    }
    let clause = or_any(&differences);

    debug!(blocked_terms = differences.len(), "blocking current solution");
    session.assert(&clause);
    Ok(())
}

/// Enumerate distinct solutions of the current assertion stack.
///
/// Each model is passed to `visit` before it is blocked. Stops on UNSAT,
/// on UNKNOWN, or once `limit` solutions have been visited. Blocking clauses
/// stay asserted; wrap the call in `push`/`pop` to retract them.
pub fn enumerate_solutions<F>(
    session: &mut SolverSession,
    limit: Option<usize>,
    mut visit: F,
) -> Result<Enumeration>
where
    F: FnMut(&Model) -> Result<()>,
{
    let mut found = 0;
    loop {
        if limit.is_some_and(|max| found >= max) {
            info!(found, "enumeration stopped at limit");
            return Ok(Enumeration {
                found,
                stop: StopReason::LimitReached,
            });
        }

        let model = match session.check()? {
            CheckResult::Sat(model) => model,
            CheckResult::Unsat => {
                info!(found, "enumeration exhausted");
                return Ok(Enumeration {
                    found,
                    stop: StopReason::Exhausted,
                });
            }
            CheckResult::Unknown(reason) => {
                return Ok(Enumeration {
                    found,
                    stop: StopReason::Unknown(reason),
                });
            }
        };

        found += 1;
        visit(&model)?;
        block_current_solution(session, &model)?;
    }
}
