//! Workflows: ordered rule applications unrolled into a chain of states

use crate::error::{Error, Result};
use crate::ir::{Rule, StateSchema};
use crate::semantics::concrete::apply_rule_concrete;
use crate::semantics::smt::rule_transition;
use crate::semantics::state::{ConcreteState, SymbolicState};
use crate::semantics::symbolic::{and_all, Vocabulary};
use std::fmt;
use tracing::debug;
use z3::ast::Bool;

/// One time step of a workflow
#[derive(Debug, Clone, Copy)]
pub enum Step<'r> {
    /// Run a rule: fire if its condition holds, otherwise leave the state unchanged
    Apply(&'r Rule),
    /// Advance time without behaviour, used to align two workflows
    Pad,
}

impl<'r> Step<'r> {
    pub fn rule(&self) -> Option<&'r Rule> {
        match self {
            Step::Apply(rule) => Some(rule),
            Step::Pad => None,
        }
    }
}

impl fmt::Display for Step<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Apply(rule) => write!(f, "{}", rule.name()),
            Step::Pad => write!(f, "pad"),
        }
    }
}

/// What happened at one step of a concrete replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Fired(String),
    Skipped(String),
    Pad,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Fired(rule) => write!(f, "{} fired", rule),
            StepOutcome::Skipped(rule) => write!(f, "{} skipped", rule),
            StepOutcome::Pad => write!(f, "pad"),
        }
    }
}

/// Result of replaying a workflow on concrete values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// States at t = 0 ..= N
    pub states: Vec<ConcreteState>,
    /// Outcome of the step leading from `states[i]` to `states[i + 1]`
    pub outcomes: Vec<StepOutcome>,
}

impl Trace {
    pub fn final_state(&self) -> &ConcreteState {
        // A trace always holds at least the initial state
        &self.states[self.states.len() - 1]
    }
}

/// A workflow unrolled over a bounded horizon.
///
/// Owns the states it allocated (t = 1 ..= N) and holds a copy of the
/// initial state, which may be shared with another workflow.
#[derive(Debug)]
pub struct Workflow<'r> {
    label: String,
    schema: StateSchema,
    steps: Vec<Step<'r>>,
    states: Vec<SymbolicState>,
    transitions: Vec<Bool>,
}

impl<'r> Workflow<'r> {
    /// Unroll `steps` from `initial`.
    ///
    /// Every rule is validated against the schema first, so a rule that
    /// leaves a field unconstrained never reaches the solver.
    pub fn build(
        schema: &StateSchema,
        label: &str,
        initial: &SymbolicState,
        steps: Vec<Step<'r>>,
        vocab: &mut Vocabulary,
    ) -> Result<Self> {
        if !initial.matches_schema(schema) {
            return Err(Error::SchemaMismatch {
                left: label.to_string(),
                right: "initial state".into(),
                left_schema: schema.to_string(),
                right_schema: format!("{{{}}}", initial.fields().collect::<Vec<_>>().join(", ")),
            });
        }
        for rule in steps.iter().filter_map(Step::rule) {
            rule.validate(schema)?;
        }

        let mut states = Vec::with_capacity(steps.len() + 1);
        let mut transitions = Vec::with_capacity(steps.len());
        states.push(initial.clone());

        for (i, step) in steps.iter().enumerate() {
            let t = initial.t() + i + 1;
            let next = SymbolicState::fresh(schema, t, label, vocab)?;
            let curr = &states[states.len() - 1];
            let constraint = match step {
                Step::Apply(rule) => rule_transition(rule, curr, &next)?,
                Step::Pad => next.unchanged_from(curr),
            };
            debug!(workflow = label, t, step = %step, "unrolled step");
            transitions.push(constraint);
            states.push(next);
        }

        Ok(Self {
            label: label.to_string(),
            schema: schema.clone(),
            steps,
            states,
            transitions,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn schema(&self) -> &StateSchema {
        &self.schema
    }

    pub fn steps(&self) -> &[Step<'r>] {
        &self.steps
    }

    pub fn states(&self) -> &[SymbolicState] {
        &self.states
    }

    pub fn transitions(&self) -> &[Bool] {
        &self.transitions
    }

    pub fn initial_state(&self) -> &SymbolicState {
        &self.states[0]
    }

    pub fn final_state(&self) -> &SymbolicState {
        &self.states[self.states.len() - 1]
    }

    /// Time index of the final state
    pub fn horizon(&self) -> usize {
        self.final_state().t()
    }

    /// Number of genuine rule applications (pads excluded)
    pub fn rule_count(&self) -> usize {
        self.steps.iter().filter(|s| s.rule().is_some()).count()
    }

    /// Conjunction of all transition constraints
    pub fn constraints(&self) -> Bool {
        and_all(&self.transitions)
    }

    /// Replay the workflow on concrete initial values, without the solver
    pub fn simulate(&self, initial: &ConcreteState) -> Result<Trace> {
        for field in self.schema.names() {
            if initial.get(field).is_none() {
                return Err(Error::UnknownField {
                    field: field.to_string(),
                    context: format!("initial values for workflow `{}`", self.label),
                });
            }
        }

        let mut states = vec![initial.clone()];
        let mut outcomes = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let curr = &states[states.len() - 1];
            let (next, outcome) = match step {
                Step::Apply(rule) => {
                    let (next, fired) = apply_rule_concrete(rule, curr)?;
                    let name = rule.name().to_string();
                    let outcome = if fired {
                        StepOutcome::Fired(name)
                    } else {
                        StepOutcome::Skipped(name)
                    };
                    (next, outcome)
                }
                Step::Pad => (curr.clone(), StepOutcome::Pad),
            };
            outcomes.push(outcome);
            states.push(next);
        }
        Ok(Trace { states, outcomes })
    }
}

impl fmt::Display for Workflow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<_> = self.steps.iter().map(|s| s.to_string()).collect();
        write!(f, "{} [{}]", self.label, steps.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Domain, Expr, Frame};
    use crate::semantics::symbolic::int_const;
    use crate::solver::SolverSession;

    fn schema() -> StateSchema {
        StateSchema::uniform(&["a", "b"], Domain::new(0, 10)).unwrap()
    }

    #[test]
    fn test_build_allocates_state_per_step() {
        let s = schema();
        let mut vocab = Vocabulary::new();
        let init = SymbolicState::shared_initial(&s, &mut vocab).unwrap();
        let rule = Rule::new("r", Expr::field("a").gt(5.into())).set("b", 1);
        let wf = Workflow::build(
            &s,
            "w",
            &init,
            vec![Step::Apply(&rule), Step::Pad, Step::Apply(&rule)],
            &mut vocab,
        )
        .unwrap();

        assert_eq!(wf.states().len(), 4);
        assert_eq!(wf.transitions().len(), 3);
        assert_eq!(wf.horizon(), 3);
        assert_eq!(wf.rule_count(), 2);
        assert!(wf.initial_state().shares_terms_with(&init));
        assert_eq!(wf.to_string(), "w [r, pad, r]");
    }

    #[test]
    fn test_pad_keeps_every_field() {
        let s = schema();
        let mut session = SolverSession::with_default_config().unwrap();
        let init = SymbolicState::shared_initial(&s, session.vocabulary_mut()).unwrap();
        let wf = Workflow::build(&s, "pad", &init, vec![Step::Pad], session.vocabulary_mut())
            .unwrap();

        session.assert(&wf.constraints());
        session.assert(&wf.final_state().unchanged_from(&init).not());
        assert!(session.check().unwrap().is_unsat());
    }

    #[test]
    fn test_incomplete_rule_rejected_at_build() {
        let s = schema();
        let mut vocab = Vocabulary::new();
        let init = SymbolicState::shared_initial(&s, &mut vocab).unwrap();
        let rule = Rule::new("sloppy", Expr::field("a").gt(0.into()))
            .set("a", 0)
            .with_frame(Frame::Explicit(vec![]));
        let result = Workflow::build(&s, "w", &init, vec![Step::Apply(&rule)], &mut vocab);
        assert_eq!(
            result.unwrap_err(),
            Error::IncompleteTransition {
                rule: "sloppy".into(),
                missing: vec!["b".into()],
            }
        );
    }

    #[test]
    fn test_label_collision_rejected() {
        let s = schema();
        let mut vocab = Vocabulary::new();
        let init = SymbolicState::shared_initial(&s, &mut vocab).unwrap();
        Workflow::build(&s, "w", &init, vec![Step::Pad], &mut vocab).unwrap();
        let again = Workflow::build(&s, "w", &init, vec![Step::Pad], &mut vocab);
        assert!(matches!(again, Err(Error::TermCollision(_))));
    }

    #[test]
    fn test_initial_state_must_match_schema() {
        let s = schema();
        let other = StateSchema::uniform(&["x"], Domain::new(0, 1)).unwrap();
        let mut vocab = Vocabulary::new();
        let init = SymbolicState::shared_initial(&other, &mut vocab).unwrap();
        let result = Workflow::build(&s, "w", &init, vec![], &mut vocab);
        assert!(matches!(result, Err(Error::SchemaMismatch { .. })));
    }

    #[test]
    fn test_simulate_matches_solver() {
        // rule1: a > 5 => b := b + 5; rule2: a > 6 && b >= 10 => a := a + b
        let s = StateSchema::uniform(&["a", "b"], Domain::new(0, 10)).unwrap();
        let rule1 = Rule::new("rule1", Expr::field("a").gt(5.into()))
            .set("b", Expr::field("b").add(5.into()));
        let rule2 = Rule::new(
            "rule2",
            crate::ir::Condition::all(vec![
                Expr::field("a").gt(6.into()),
                Expr::field("b").ge(10.into()),
            ]),
        )
        .set("a", Expr::field("a").add(Expr::field("b")));

        let mut session = SolverSession::with_default_config().unwrap();
        let init = SymbolicState::shared_initial(&s, session.vocabulary_mut()).unwrap();
        let wf = Workflow::build(
            &s,
            "w",
            &init,
            vec![Step::Apply(&rule1), Step::Apply(&rule2)],
            session.vocabulary_mut(),
        )
        .unwrap();

        session.assert(&wf.constraints());
        session.assert(&init.require("a").unwrap().eq(&int_const(7)));
        session.assert(&init.require("b").unwrap().eq(&int_const(5)));
        let model = session.check().unwrap().into_model().unwrap();
        let symbolic_final = wf.final_state().read(&model).unwrap();

        let trace = wf
            .simulate(&ConcreteState::from_values([("a", 7), ("b", 5)]))
            .unwrap();
        assert_eq!(trace.final_state(), &symbolic_final);
        assert_eq!(trace.final_state().get("a"), Some(17));
        assert_eq!(
            trace.outcomes,
            vec![
                StepOutcome::Fired("rule1".into()),
                StepOutcome::Fired("rule2".into())
            ]
        );
    }

    #[test]
    fn test_simulate_requires_all_fields() {
        let s = schema();
        let mut vocab = Vocabulary::new();
        let init = SymbolicState::shared_initial(&s, &mut vocab).unwrap();
        let wf = Workflow::build(&s, "w", &init, vec![Step::Pad], &mut vocab).unwrap();
        let result = wf.simulate(&ConcreteState::from_values([("a", 1)]));
        assert!(matches!(result, Err(Error::UnknownField { .. })));
    }
}
