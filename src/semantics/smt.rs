//! SMT constraint generation for rules and transitions

use crate::error::{Error, Result};
use crate::ir::{Condition, Expr, FieldEffect, Rule};
use crate::semantics::state::SymbolicState;
use crate::semantics::symbolic::{and_all, compare, eq, if_then_else, int_const, ne, or_any};
use z3::ast::{Bool, Int};

/// Encode an integer expression against the terms of `state`
pub fn encode_expr(expr: &Expr, state: &SymbolicState) -> Result<Int> {
    Ok(match expr {
        Expr::Const(v) => int_const(*v),
        Expr::Field(name) => state.require(name)?.clone(),
        Expr::Add(l, r) => &encode_expr(l, state)? + &encode_expr(r, state)?,
        Expr::Sub(l, r) => &encode_expr(l, state)? - &encode_expr(r, state)?,
        Expr::Mul(l, r) => &encode_expr(l, state)? * &encode_expr(r, state)?,
    })
}

/// Encode a condition against the terms of `state`
pub fn encode_condition(condition: &Condition, state: &SymbolicState) -> Result<Bool> {
    Ok(match condition {
        Condition::Always => Bool::from_bool(true),
        Condition::Compare(op, l, r) => {
            compare(*op, &encode_expr(l, state)?, &encode_expr(r, state)?)
        }
        Condition::And(parts) => and_all(&encode_all(parts, state)?),
        Condition::Or(parts) => or_any(&encode_all(parts, state)?),
        Condition::Not(inner) => encode_condition(inner, state)?.not(),
    })
}

fn encode_all(parts: &[Condition], state: &SymbolicState) -> Result<Vec<Bool>> {
    parts.iter().map(|p| encode_condition(p, state)).collect()
}

/// The rule's action as a constraint between `curr` and `next`.
///
/// Every field of `next` is pinned to exactly one expression over `curr`:
/// the assigned value, or `curr`'s own term under the frame. A field the
/// rule neither assigns nor keeps is `IncompleteTransition`.
pub fn action_constraint(rule: &Rule, curr: &SymbolicState, next: &SymbolicState) -> Result<Bool> {
    let mut pins = Vec::new();
    let mut missing = Vec::new();
    for (field, next_term) in next.iter() {
        match rule.effect_on(field) {
            FieldEffect::Assign(value) => pins.push(eq(next_term, &encode_expr(value, curr)?)),
            FieldEffect::Keep => pins.push(eq(next_term, curr.require(field)?)),
            FieldEffect::Unconstrained => missing.push(field.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(Error::IncompleteTransition {
            rule: rule.name().to_string(),
            missing,
        });
    }
    Ok(and_all(&pins))
}

/// `ite(condition(curr), action(curr, next), unchanged(curr, next))`
pub fn rule_transition(rule: &Rule, curr: &SymbolicState, next: &SymbolicState) -> Result<Bool> {
    let guard = encode_condition(rule.condition(), curr)?;
    let fired = action_constraint(rule, curr, next)?;
    let skipped = next.unchanged_from(curr);
    Ok(if_then_else(&guard, &fired, &skipped))
}

/// At least one of `fields` differs between the two states
pub fn states_differ(left: &SymbolicState, right: &SymbolicState, fields: &[String]) -> Result<Bool> {
    let mut differences = Vec::with_capacity(fields.len());
    for field in fields {
        differences.push(ne(left.require(field)?, right.require(field)?));
    }
    Ok(or_any(&differences))
}
