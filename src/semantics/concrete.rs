//! Concrete interpreter for replaying workflows without the solver

use crate::error::{Error, Result};
use crate::ir::{Condition, Expr, FieldEffect, Rule};
use crate::semantics::state::ConcreteState;

fn read(state: &ConcreteState, field: &str) -> Result<i64> {
    state.get(field).ok_or_else(|| Error::UnknownField {
        field: field.to_string(),
        context: "concrete state".into(),
    })
}

/// Evaluate an expression on concrete values.
///
/// A result outside i64 is `ArithmeticOverflow`; values never wrap.
pub fn eval_expr(expr: &Expr, state: &ConcreteState) -> Result<i64> {
    let (l, r, op): (_, _, fn(i64, i64) -> Option<i64>) = match expr {
        Expr::Const(v) => return Ok(*v),
        Expr::Field(name) => return read(state, name),
        Expr::Add(l, r) => (l, r, i64::checked_add),
        Expr::Sub(l, r) => (l, r, i64::checked_sub),
        Expr::Mul(l, r) => (l, r, i64::checked_mul),
    };
    let (lhs, rhs) = (eval_expr(l, state)?, eval_expr(r, state)?);
    op(lhs, rhs).ok_or_else(|| Error::ArithmeticOverflow(format!("{} at {}", expr, state)))
}

pub fn eval_condition(condition: &Condition, state: &ConcreteState) -> Result<bool> {
    Ok(match condition {
        Condition::Always => true,
        Condition::Compare(op, l, r) => op.holds(eval_expr(l, state)?, eval_expr(r, state)?),
        Condition::And(parts) => {
            for part in parts {
                if !eval_condition(part, state)? {
                    return Ok(false);
                }
            }
            true
        }
        Condition::Or(parts) => {
            for part in parts {
                if eval_condition(part, state)? {
                    return Ok(true);
                }
            }
            false
        }
        Condition::Not(inner) => !eval_condition(inner, state)?,
    })
}

/// Apply a rule to a concrete state, returning the next state and whether the rule fired
pub fn apply_rule_concrete(rule: &Rule, state: &ConcreteState) -> Result<(ConcreteState, bool)> {
    if !eval_condition(rule.condition(), state)? {
        return Ok((state.clone(), false));
    }

    // All right-hand sides read the pre-state
    let mut next = state.clone();
    let mut missing = Vec::new();
    for (field, _) in state.iter() {
        match rule.effect_on(field) {
            FieldEffect::Assign(value) => next.set(field, eval_expr(value, state)?),
            FieldEffect::Keep => {}
            FieldEffect::Unconstrained => missing.push(field.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(Error::IncompleteTransition {
            rule: rule.name().to_string(),
            missing,
        });
    }
    Ok((next, true))
}
