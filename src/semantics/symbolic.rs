//! Symbolic value domain: named Z3 terms and the combinators the encoders use

use crate::ir::CmpOp;
use std::collections::HashMap;
use z3::ast::{Bool, Int};

/// A zero-arity symbolic term
#[derive(Debug, Clone)]
pub enum Term {
    Int(Int),
    Bool(Bool),
}

/// Registry of every named term created for one solver session.
///
/// The registry is what lets a model be read back by name and lets the
/// enumerator block every assigned term.
#[derive(Debug, Default)]
pub struct Vocabulary {
    terms: Vec<(String, Term)>,
    index: HashMap<String, usize>,
    labels: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh integer constant named `name`
    pub fn fresh_int(&mut self, name: impl Into<String>) -> Int {
        let name = name.into();
        let term = Int::new_const(name.as_str());
        self.register(name, Term::Int(term.clone()));
        term
    }

    /// Create a fresh boolean constant named `name`
    pub fn fresh_bool(&mut self, name: impl Into<String>) -> Bool {
        let name = name.into();
        let term = Bool::new_const(name.as_str());
        self.register(name, Term::Bool(term.clone()));
        term
    }

    fn register(&mut self, name: String, term: Term) {
        debug_assert!(
            !self.index.contains_key(&name),
            "symbolic term `{}` declared twice",
            name
        );
        self.index.insert(name.clone(), self.terms.len());
        self.terms.push((name, term));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Term> {
        self.index.get(name).map(|&i| &self.terms[i].1)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.terms.iter().map(|(name, term)| (name.as_str(), term))
    }

    /// Hand out `prefix0`, `prefix1`, ... so repeated queries never reuse term names
    pub fn next_label(&mut self, prefix: &str) -> String {
        let counter = self.labels.entry(prefix.to_string()).or_insert(0);
        let label = format!("{}{}", prefix, counter);
        *counter += 1;
        label
    }
}

pub fn int_const(value: i64) -> Int {
    Int::from_i64(value)
}

/// Conjunction; `true` when empty
pub fn and_all(terms: &[Bool]) -> Bool {
    if terms.is_empty() {
        return Bool::from_bool(true);
    }
    Bool::and(terms)
}

/// Disjunction; `false` when empty
pub fn or_any(terms: &[Bool]) -> Bool {
    if terms.is_empty() {
        return Bool::from_bool(false);
    }
    Bool::or(terms)
}

pub fn if_then_else(cond: &Bool, then: &Bool, otherwise: &Bool) -> Bool {
    cond.ite(then, otherwise)
}

pub fn eq(lhs: &Int, rhs: &Int) -> Bool {
    lhs.eq(rhs)
}

pub fn ne(lhs: &Int, rhs: &Int) -> Bool {
    lhs.eq(rhs).not()
}

/// Build the symbolic comparison `lhs op rhs`
pub fn compare(op: CmpOp, lhs: &Int, rhs: &Int) -> Bool {
    match op {
        CmpOp::Eq => eq(lhs, rhs),
        CmpOp::Ne => ne(lhs, rhs),
        CmpOp::Lt => lhs.lt(rhs),
        CmpOp::Le => lhs.le(rhs),
        CmpOp::Gt => lhs.gt(rhs),
        CmpOp::Ge => lhs.ge(rhs),
    }
}
