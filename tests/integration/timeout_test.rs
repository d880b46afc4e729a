use rule_equiv::ir::{Condition, Domain, Expr, Rule, StateSchema};
use rule_equiv::semantics::{
    check_overlap, check_reachability, EquivalenceQuery, EquivalenceResult, OverlapResult,
    ReachabilityResult, Step, SymbolicState, Workflow,
};
use rule_equiv::solver::{SessionConfig, SolverSession, StopReason};
use std::time::Duration;

fn schema() -> StateSchema {
    StateSchema::uniform(&["x", "y", "z"], Domain::new(1, 1_000_000)).unwrap()
}

fn cube(name: &str) -> Expr {
    Expr::field(name)
        .mul(Expr::field(name))
        .mul(Expr::field(name))
}

/// x^3 + y^3 == z^3 has no positive solution, which Z3 cannot settle in a millisecond
fn sum_of_cubes() -> Condition {
    cube("x").add(cube("y")).eq(cube("z"))
}

fn short_session() -> SolverSession {
    SolverSession::new(SessionConfig::with_timeout(Duration::from_millis(1))).unwrap()
}

#[test]
fn test_equivalence_times_out_as_unknown() {
    let s = schema();
    let reset = Rule::new("reset", sum_of_cubes()).set("x", 0);
    let mut session = short_session();
    let init = SymbolicState::shared_initial(&s, session.vocabulary_mut()).unwrap();
    let left = Workflow::build(&s, "l", &init, vec![Step::Apply(&reset)], session.vocabulary_mut())
        .unwrap();
    let right = Workflow::build(&s, "r", &init, vec![Step::Pad], session.vocabulary_mut()).unwrap();
    let query = EquivalenceQuery::new(&left, &right).unwrap();

    let result = query.check(&mut session).unwrap();
    assert!(matches!(result, EquivalenceResult::Unknown(_)), "{:?}", result);
    assert!(!result.is_equivalent());
    assert!(result.counterexample().is_none());

    let set = query.counterexamples(&mut session, Some(3)).unwrap();
    assert!(set.counterexamples.is_empty());
    assert!(matches!(set.stop, StopReason::Unknown(_)), "{:?}", set.stop);
    assert_eq!(session.scope_depth(), 0);
}

#[test]
fn test_reachability_times_out_as_unknown() {
    let s = schema();
    let mut session = short_session();
    let init = SymbolicState::shared_initial(&s, session.vocabulary_mut()).unwrap();
    let workflow =
        Workflow::build(&s, "w", &init, vec![Step::Pad], session.vocabulary_mut()).unwrap();

    let result = check_reachability(&mut session, &workflow, &sum_of_cubes()).unwrap();
    assert!(matches!(result, ReachabilityResult::Unknown(_)), "{:?}", result);
    assert_eq!(session.scope_depth(), 0);
}

#[test]
fn test_overlap_times_out_as_unknown() {
    let s = schema();
    let first = Rule::new("cubes", sum_of_cubes());
    let second = Rule::new("large_z", Expr::field("z").gt(1000.into()));
    let mut session = short_session();

    let result = check_overlap(&mut session, &s, &first, &second).unwrap();
    assert!(matches!(result, OverlapResult::Unknown(_)), "{:?}", result);
}
