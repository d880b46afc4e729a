//! The symbolic encoding and the concrete interpreter must agree

use proptest::prelude::*;
use rule_equiv::ir::{Condition, Domain, Expr, Rule, StateSchema};
use rule_equiv::semantics::{ConcreteState, Step, SymbolicState, Workflow};
use rule_equiv::solver::SolverSession;

fn schema() -> StateSchema {
    StateSchema::uniform(&["a", "b", "c"], Domain::new(0, 20)).unwrap()
}

fn field() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("a"), Just("b"), Just("c")]
}

fn expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        field().prop_map(Expr::field),
        (-5i64..=25).prop_map(Expr::constant),
    ];
    leaf.prop_recursive(2, 6, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.add(r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.sub(r)),
            (inner.clone(), inner).prop_map(|(l, r)| l.mul(r)),
        ]
    })
}

fn condition() -> impl Strategy<Value = Condition> {
    let compare = (field(), 0i64..=20, 0usize..6).prop_map(|(f, k, op)| {
        let lhs = Expr::field(f);
        let rhs = Expr::constant(k);
        match op {
            0 => lhs.eq(rhs),
            1 => lhs.ne(rhs),
            2 => lhs.lt(rhs),
            3 => lhs.le(rhs),
            4 => lhs.gt(rhs),
            _ => lhs.ge(rhs),
        }
    });
    compare.prop_recursive(2, 6, 2, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Condition::all),
            prop::collection::vec(inner.clone(), 0..3).prop_map(Condition::any),
            inner.prop_map(Condition::not),
        ]
    })
}

fn rule(name: &'static str) -> impl Strategy<Value = Rule> {
    (condition(), prop::collection::btree_map(field(), expr(), 0..3)).prop_map(
        move |(cond, assigns)| {
            assigns
                .into_iter()
                .fold(Rule::new(name, cond), |rule, (f, e)| rule.set(f, e))
        },
    )
}

fn state() -> impl Strategy<Value = ConcreteState> {
    (0i64..=20, 0i64..=20, 0i64..=20)
        .prop_map(|(a, b, c)| ConcreteState::from_values([("a", a), ("b", b), ("c", c)]))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_solver_agrees_with_replay(
        first in rule("first"),
        second in rule("second"),
        pad_first in any::<bool>(),
        initial in state(),
    ) {
        let s = schema();
        let mut steps = vec![Step::Apply(&first), Step::Apply(&second)];
        if pad_first {
            steps.insert(0, Step::Pad);
        }

        let mut session = SolverSession::with_default_config().unwrap();
        let init = SymbolicState::shared_initial(&s, session.vocabulary_mut()).unwrap();
        let workflow = Workflow::build(&s, "w", &init, steps, session.vocabulary_mut()).unwrap();

        session.assert(&workflow.constraints());
        for (f, value) in initial.iter() {
            session.assert(&init.require(f).unwrap().eq(&z3::ast::Int::from_i64(value)));
        }
        let model = session.check().unwrap().into_model().expect("transitions are total");

        let trace = workflow.simulate(&initial).unwrap();
        for (symbolic, concrete) in workflow.states().iter().zip(&trace.states) {
            prop_assert_eq!(&symbolic.read(&model).unwrap(), concrete);
        }
    }
}
