use rule_equiv::scenarios::{ChainScenario, OverlapScenario, TicketScenario};
use rule_equiv::semantics::{
    check_overlap, check_reachability, ConcreteState, EquivalenceQuery, EquivalenceResult,
    OverlapResult, StepOutcome, SymbolicState, Workflow,
};
use rule_equiv::solver::{SolverSession, StopReason};
use std::collections::HashSet;
use z3::ast::Int;

fn int(value: i64) -> Int {
    Int::from_i64(value)
}

#[test]
fn test_ticket_workflows_diverge() {
    let scenario = TicketScenario::new().unwrap();
    let mut session = SolverSession::with_default_config().unwrap();
    let init = SymbolicState::shared_initial(&scenario.schema, session.vocabulary_mut()).unwrap();
    let old = Workflow::build(
        &scenario.schema,
        "old",
        &init,
        scenario.old_steps(),
        session.vocabulary_mut(),
    )
    .unwrap();
    let new = Workflow::build(
        &scenario.schema,
        "new",
        &init,
        scenario.new_steps(),
        session.vocabulary_mut(),
    )
    .unwrap();
    let query = EquivalenceQuery::new(&old, &new).unwrap();

    // Any divergence needs c2_updater to fire
    let result = query.check(&mut session).unwrap();
    let cex = result.counterexample().expect("ticket workflows should diverge");
    assert!(cex.initial.get("a").unwrap() > 10);
    assert!(cex.initial.within(&scenario.schema));
    assert!(!cex.differing.is_empty());

    // With a and b above 10 and d nonzero: old ends with d = 0, new ends with c = 0
    session.push();
    session.assert(&init.require("a").unwrap().gt(&int(10)));
    session.assert(&init.require("b").unwrap().gt(&int(10)));
    session.assert(&init.require("d").unwrap().gt(&int(0)));
    let result = query.check(&mut session).unwrap();
    session.pop().unwrap();

    let cex = result.counterexample().expect("still divergent");
    assert_eq!(cex.left.final_state().get("d"), Some(0));
    assert_eq!(cex.left.final_state().get("c"), Some(20));
    assert_eq!(cex.right.final_state().get("c"), Some(0));
    assert_eq!(cex.right.final_state().get("d"), cex.initial.get("d"));
    assert_ne!(cex.initial.get("d"), Some(0));
    assert_eq!(cex.differing, vec!["c".to_string(), "d".to_string()]);
    assert_eq!(
        cex.right.outcomes,
        vec![
            StepOutcome::Fired("c_updater".into()),
            StepOutcome::Fired("c2_updater".into()),
            StepOutcome::Skipped("d_updater".into()),
        ]
    );
    assert_eq!(cex.left.outcomes[1], StepOutcome::Pad);
}

#[test]
fn test_ticket_counterexamples_distinct_and_reproducible() {
    let scenario = TicketScenario::new().unwrap();
    let mut session = SolverSession::with_default_config().unwrap();
    let init = SymbolicState::shared_initial(&scenario.schema, session.vocabulary_mut()).unwrap();
    let old = Workflow::build(
        &scenario.schema,
        "old",
        &init,
        scenario.old_steps(),
        session.vocabulary_mut(),
    )
    .unwrap();
    let new = Workflow::build(
        &scenario.schema,
        "new",
        &init,
        scenario.new_steps(),
        session.vocabulary_mut(),
    )
    .unwrap();
    let query = EquivalenceQuery::new(&old, &new).unwrap();

    let set = query.counterexamples(&mut session, Some(10)).unwrap();
    assert_eq!(set.stop, StopReason::LimitReached);
    assert_eq!(set.counterexamples.len(), 10);

    let initials: HashSet<ConcreteState> =
        set.counterexamples.iter().map(|c| c.initial.clone()).collect();
    assert_eq!(initials.len(), 10, "each counterexample has its own input");

    for cex in &set.counterexamples {
        let left = old.simulate(&cex.initial).unwrap();
        let right = new.simulate(&cex.initial).unwrap();
        assert_ne!(left.final_state(), right.final_state());
        assert_eq!(&left, &cex.left);
        assert_eq!(&right, &cex.right);
    }

    // Blocking clauses were retracted with the scope
    assert!(query.check(&mut session).unwrap().counterexample().is_some());
}

#[test]
fn test_old_workflow_equivalent_to_itself() {
    let scenario = TicketScenario::new().unwrap();
    let mut session = SolverSession::with_default_config().unwrap();
    let init = SymbolicState::shared_initial(&scenario.schema, session.vocabulary_mut()).unwrap();
    let first = Workflow::build(
        &scenario.schema,
        "first",
        &init,
        scenario.old_steps(),
        session.vocabulary_mut(),
    )
    .unwrap();
    let second = Workflow::build(
        &scenario.schema,
        "second",
        &init,
        scenario.old_steps(),
        session.vocabulary_mut(),
    )
    .unwrap();

    let query = EquivalenceQuery::new(&first, &second).unwrap();
    assert_eq!(
        query.check(&mut session).unwrap(),
        EquivalenceResult::Equivalent { horizon: 3 }
    );
    let set = query.counterexamples(&mut session, None).unwrap();
    assert!(set.counterexamples.is_empty());
    assert_eq!(set.stop, StopReason::Exhausted);
}

#[test]
fn test_chain_reaches_seventeen() {
    let scenario = ChainScenario::new().unwrap();
    let mut session = SolverSession::with_default_config().unwrap();
    let init = SymbolicState::shared_initial(&scenario.schema, session.vocabulary_mut()).unwrap();
    let workflow = Workflow::build(
        &scenario.schema,
        "chain",
        &init,
        scenario.steps(),
        session.vocabulary_mut(),
    )
    .unwrap();

    let result = check_reachability(&mut session, &workflow, &scenario.goal()).unwrap();
    let trace = result.witness().expect("a = 17 is reachable");
    assert_eq!(trace.states[0], ConcreteState::from_values([("a", 7), ("b", 5)]));
    assert_eq!(trace.states[1], ConcreteState::from_values([("a", 7), ("b", 10)]));
    assert_eq!(trace.final_state().get("a"), Some(17));
}

#[test]
fn test_conflicting_rules_overlap() {
    let scenario = OverlapScenario::new().unwrap();
    let mut session = SolverSession::with_default_config().unwrap();
    let result =
        check_overlap(&mut session, &scenario.schema, &scenario.first, &scenario.second).unwrap();
    let OverlapResult::Overlapping(state) = result else {
        panic!("rules should overlap, got {:?}", result);
    };
    let x = state.get("x").unwrap();
    let y = state.get("y").unwrap();
    assert!(x > 7 && y > 6 && y < 10);
}
