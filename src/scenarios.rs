//! Bundled example rule sets used by the CLI and the tests

use crate::error::Result;
use crate::ir::{Condition, Domain, Expr, Field, Rule, StateSchema};
use crate::semantics::Step;

/// Ticket fields `a`, `b`, `c`, `d` in `0..=20` and three update rules.
///
/// The old workflow runs `c_updater` then `d_updater`; the new one inserts
/// `c2_updater` between them. The old workflow gets a pad in that slot.
#[derive(Debug, Clone)]
pub struct TicketScenario {
    pub schema: StateSchema,
    /// `b > 10` sets `c := 20`
    pub c_updater: Rule,
    /// `a > 10` sets `c := 0`
    pub c2_updater: Rule,
    /// `c > 10` sets `d := 0`
    pub d_updater: Rule,
}

impl TicketScenario {
    pub fn new() -> Result<Self> {
        Ok(Self {
            schema: StateSchema::uniform(&["a", "b", "c", "d"], Domain::new(0, 20))?,
            c_updater: Rule::new("c_updater", Expr::field("b").gt(10.into())).set("c", 20),
            c2_updater: Rule::new("c2_updater", Expr::field("a").gt(10.into())).set("c", 0),
            d_updater: Rule::new("d_updater", Expr::field("c").gt(10.into())).set("d", 0),
        })
    }

    pub fn old_steps(&self) -> Vec<Step<'_>> {
        vec![
            Step::Apply(&self.c_updater),
            Step::Pad,
            Step::Apply(&self.d_updater),
        ]
    }

    pub fn new_steps(&self) -> Vec<Step<'_>> {
        vec![
            Step::Apply(&self.c_updater),
            Step::Apply(&self.c2_updater),
            Step::Apply(&self.d_updater),
        ]
    }
}

/// Two chained rules over `a in 0..=10`, `b in 0..=5`, with goal `a == 17`
#[derive(Debug, Clone)]
pub struct ChainScenario {
    pub schema: StateSchema,
    /// `a > 5` sets `b := b + 5`
    pub rule1: Rule,
    /// `a > 6 && b >= 10` sets `a := a + b`
    pub rule2: Rule,
}

impl ChainScenario {
    pub fn new() -> Result<Self> {
        Ok(Self {
            schema: StateSchema::declare(vec![
                Field::new("a", Domain::new(0, 10)),
                Field::new("b", Domain::new(0, 5)),
            ])?,
            rule1: Rule::new("rule1", Expr::field("a").gt(5.into()))
                .set("b", Expr::field("b").add(5.into())),
            rule2: Rule::new(
                "rule2",
                Condition::all(vec![
                    Expr::field("a").gt(6.into()),
                    Expr::field("b").ge(10.into()),
                ]),
            )
            .set("a", Expr::field("a").add(Expr::field("b"))),
        })
    }

    pub fn steps(&self) -> Vec<Step<'_>> {
        vec![Step::Apply(&self.rule1), Step::Apply(&self.rule2)]
    }

    pub fn goal(&self) -> Condition {
        Expr::field("a").eq(17.into())
    }
}

/// Two rules over `x`, `y` in `0..=20` whose conditions overlap
#[derive(Debug, Clone)]
pub struct OverlapScenario {
    pub schema: StateSchema,
    /// `x > 5 && y < 10`
    pub first: Rule,
    /// `x > 7 && y > 6`
    pub second: Rule,
}

impl OverlapScenario {
    pub fn new() -> Result<Self> {
        Ok(Self {
            schema: StateSchema::uniform(&["x", "y"], Domain::new(0, 20))?,
            first: Rule::new(
                "rule1",
                Condition::all(vec![
                    Expr::field("x").gt(5.into()),
                    Expr::field("y").lt(10.into()),
                ]),
            ),
            second: Rule::new(
                "rule2",
                Condition::all(vec![
                    Expr::field("x").gt(7.into()),
                    Expr::field("y").gt(6.into()),
                ]),
            ),
        })
    }
}
