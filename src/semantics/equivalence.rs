//! Bounded equivalence checking for pairs of workflows

use crate::error::{Error, Result};
use crate::semantics::smt::states_differ;
use crate::semantics::state::ConcreteState;
use crate::semantics::symbolic::and_all;
use crate::semantics::workflow::{Trace, Workflow};
use crate::solver::{enumerate_solutions, CheckResult, Model, SolverSession, StopReason};
use crate::validation::{
    find_divergence, generate_edge_case_states, generate_random_states, Divergence,
    SamplingConfig,
};
use std::fmt;
use tracing::{debug, info};
use z3::ast::Bool;

/// Result of equivalence checking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquivalenceResult {
    /// No in-domain initial state makes the observed final fields differ.
    ///
    /// This is a bounded result: it holds for the declared domains and for
    /// exactly `horizon` steps, not for longer runs.
    Equivalent { horizon: usize },
    /// The workflows disagree on at least one input
    NotEquivalent(Box<Counterexample>),
    /// Could not determine (timeout, solver gave up)
    Unknown(String),
}

impl EquivalenceResult {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, EquivalenceResult::Equivalent { .. })
    }

    pub fn counterexample(&self) -> Option<&Counterexample> {
        match self {
            EquivalenceResult::NotEquivalent(cex) => Some(cex),
            _ => None,
        }
    }
}

/// An initial state on which the two workflows end differently
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample {
    pub initial: ConcreteState,
    pub left_label: String,
    pub left: Trace,
    pub right_label: String,
    pub right: Trace,
    /// Observed fields whose final values differ
    pub differing: Vec<String>,
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "initial: {}", self.initial)?;
        for (label, trace) in [(&self.left_label, &self.left), (&self.right_label, &self.right)] {
            writeln!(f, "{}:", label)?;
            for (t, state) in trace.states.iter().enumerate() {
                match t.checked_sub(1).and_then(|i| trace.outcomes.get(i)) {
                    Some(outcome) => writeln!(f, "  t={} {} ({})", t, state, outcome)?,
                    None => writeln!(f, "  t={} {}", t, state)?,
                }
            }
        }
        write!(f, "differing: {}", self.differing.join(", "))
    }
}

/// Counterexamples found by enumeration and why enumeration stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterexampleSet {
    pub counterexamples: Vec<Counterexample>,
    pub stop: StopReason,
}

/// Equivalence query over two aligned workflows.
///
/// Both workflows must share the schema, the horizon and the very same
/// initial state terms.
#[derive(Debug)]
pub struct EquivalenceQuery<'w, 'r> {
    left: &'w Workflow<'r>,
    right: &'w Workflow<'r>,
    observed: Vec<String>,
}

impl<'w, 'r> EquivalenceQuery<'w, 'r> {
    pub fn new(left: &'w Workflow<'r>, right: &'w Workflow<'r>) -> Result<Self> {
        if left.schema() != right.schema() {
            return Err(Error::SchemaMismatch {
                left: left.label().to_string(),
                right: right.label().to_string(),
                left_schema: left.schema().to_string(),
                right_schema: right.schema().to_string(),
            });
        }
        if left.horizon() != right.horizon() {
            return Err(Error::HorizonMismatch {
                left: left.label().to_string(),
                right: right.label().to_string(),
                left_horizon: left.horizon(),
                right_horizon: right.horizon(),
            });
        }
        if !left.initial_state().shares_terms_with(right.initial_state()) {
            return Err(Error::InitialStateNotShared {
                left: left.label().to_string(),
                right: right.label().to_string(),
            });
        }

        let observed = left.schema().names().map(str::to_string).collect();
        debug!(
            left = left.label(),
            right = right.label(),
            horizon = left.horizon(),
            "built equivalence query"
        );
        Ok(Self {
            left,
            right,
            observed,
        })
    }

    /// Compare only the named fields of the final states
    pub fn with_observed_fields<I, S>(mut self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut observed = Vec::new();
        for name in names {
            let name = name.into();
            self.left
                .schema()
                .require(&name, || "observed field list".to_string())?;
            if !observed.contains(&name) {
                observed.push(name);
            }
        }
        self.observed = observed;
        Ok(self)
    }

    pub fn observed_fields(&self) -> &[String] {
        &self.observed
    }

    pub fn horizon(&self) -> usize {
        self.left.horizon()
    }

    /// domain(initial) ∧ transitions(left) ∧ transitions(right) ∧ final states differ
    pub fn constraints(&self) -> Result<Bool> {
        let domain = self
            .left
            .initial_state()
            .domain_constraints(self.left.schema());
        let differ = states_differ(
            self.left.final_state(),
            self.right.final_state(),
            &self.observed,
        )?;
        Ok(and_all(&[
            domain,
            self.left.constraints(),
            self.right.constraints(),
            differ,
        ]))
    }

    /// Decide equivalence within a push/pop scope, leaving the session as it was
    pub fn check(&self, session: &mut SolverSession) -> Result<EquivalenceResult> {
        let constraints = self.constraints()?;
        session.push();
        session.assert(&constraints);
        let outcome = session.check().and_then(|result| match result {
            CheckResult::Unsat => Ok(EquivalenceResult::Equivalent {
                horizon: self.horizon(),
            }),
            CheckResult::Sat(model) => Ok(EquivalenceResult::NotEquivalent(Box::new(
                self.counterexample_from(&model)?,
            ))),
            CheckResult::Unknown(reason) => Ok(EquivalenceResult::Unknown(reason)),
        });
        session.pop()?;

        let outcome = outcome?;
        match &outcome {
            EquivalenceResult::Equivalent { horizon } => {
                info!(horizon, "workflows are equivalent within the bound")
            }
            EquivalenceResult::NotEquivalent(cex) => {
                info!(differing = ?cex.differing, "workflows diverge")
            }
            EquivalenceResult::Unknown(reason) => info!(%reason, "equivalence unknown"),
        }
        Ok(outcome)
    }

    /// Enumerate up to `limit` distinct counterexamples
    pub fn counterexamples(
        &self,
        session: &mut SolverSession,
        limit: Option<usize>,
    ) -> Result<CounterexampleSet> {
        let constraints = self.constraints()?;
        session.push();
        session.assert(&constraints);

        let mut counterexamples = Vec::new();
        let enumeration = enumerate_solutions(session, limit, |model| {
            counterexamples.push(self.counterexample_from(model)?);
            Ok(())
        });
        session.pop()?;

        let enumeration = enumeration?;
        info!(
            found = enumeration.found,
            stop = %enumeration.stop,
            "counterexample enumeration finished"
        );
        Ok(CounterexampleSet {
            counterexamples,
            stop: enumeration.stop,
        })
    }

    /// Look for a divergence by concrete replay on random and edge-case states
    pub fn sample_divergence(&self, config: &SamplingConfig) -> Result<Option<Divergence>> {
        let schema = self.left.schema();
        let mut states = generate_edge_case_states(schema);
        states.extend(generate_random_states(schema, config));
        debug!(samples = states.len(), "sampling before solving");
        find_divergence(self.left, self.right, &states, &self.observed)
    }

    /// Read the initial state from `model` and replay both workflows on it.
    ///
    /// The replayed final states must agree with the model; a mismatch
    /// means the encoding and the interpreter disagree.
    fn counterexample_from(&self, model: &Model) -> Result<Counterexample> {
        let initial = self.left.initial_state().read(model)?;
        let left = self.left.simulate(&initial)?;
        let right = self.right.simulate(&initial)?;

        for (workflow, trace) in [(self.left, &left), (self.right, &right)] {
            let solved = workflow.final_state().read(model)?;
            if &solved != trace.final_state() {
                return Err(Error::Solver(format!(
                    "model final state {} of `{}` disagrees with replay {}",
                    solved,
                    workflow.label(),
                    trace.final_state()
                )));
            }
        }

        let differing = left.final_state().differing_fields(
            right.final_state(),
            self.observed.iter().map(String::as_str),
        );
        Ok(Counterexample {
            initial,
            left_label: self.left.label().to_string(),
            left,
            right_label: self.right.label().to_string(),
            right,
            differing,
        })
    }
}
