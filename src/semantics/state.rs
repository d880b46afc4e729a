//! Symbolic and concrete states over a schema

use crate::error::{Error, Result};
use crate::ir::StateSchema;
use crate::semantics::symbolic::{and_all, eq, int_const, Vocabulary};
use crate::solver::Model;
use std::collections::BTreeMap;
use std::fmt;
use z3::ast::{Bool, Int};

/// One field's term inside a symbolic state
#[derive(Debug, Clone)]
struct Slot {
    field: String,
    name: String,
    term: Int,
}

/// The symbolic terms of every schema field at one time index.
///
/// States are created once and never mutated; a transition always
/// allocates a fresh state constrained against the previous one.
#[derive(Debug, Clone)]
pub struct SymbolicState {
    t: usize,
    label: Option<String>,
    slots: Vec<Slot>,
}

impl SymbolicState {
    /// Term name for `field` at time `t`; unlabelled names belong to the shared initial state
    pub fn term_name(field: &str, t: usize, label: Option<&str>) -> String {
        match label {
            Some(label) => format!("{}_{}_{}", field, t, label),
            None => format!("{}_{}", field, t),
        }
    }

    /// Allocate the unlabelled `t = 0` state that compared workflows start from
    pub fn shared_initial(schema: &StateSchema, vocab: &mut Vocabulary) -> Result<Self> {
        Self::allocate(schema, 0, None, vocab)
    }

    /// Allocate a state owned by the workflow labelled `label`
    pub fn fresh(
        schema: &StateSchema,
        t: usize,
        label: &str,
        vocab: &mut Vocabulary,
    ) -> Result<Self> {
        Self::allocate(schema, t, Some(label), vocab)
    }

    fn allocate(
        schema: &StateSchema,
        t: usize,
        label: Option<&str>,
        vocab: &mut Vocabulary,
    ) -> Result<Self> {
        let names: Vec<String> = schema
            .names()
            .map(|field| Self::term_name(field, t, label))
            .collect();
        if let Some(taken) = names.iter().find(|name| vocab.contains(name)) {
            return Err(Error::TermCollision(taken.clone()));
        }

        let slots = schema
            .names()
            .zip(names)
            .map(|(field, name)| Slot {
                field: field.to_string(),
                term: vocab.fresh_int(name.as_str()),
                name,
            })
            .collect();
        Ok(Self {
            t,
            label: label.map(str::to_string),
            slots,
        })
    }

    pub fn t(&self) -> usize {
        self.t
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn term(&self, field: &str) -> Option<&Int> {
        self.slots.iter().find(|s| s.field == field).map(|s| &s.term)
    }

    /// Look up a field's term, failing with `UnknownField`
    pub fn require(&self, field: &str) -> Result<&Int> {
        self.term(field).ok_or_else(|| Error::UnknownField {
            field: field.to_string(),
            context: format!("state at t={}", self.t),
        })
    }

    pub fn term_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.field.as_str())
    }

    /// Iterate `(field, term)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Int)> {
        self.slots.iter().map(|s| (s.field.as_str(), &s.term))
    }

    /// True when both states use exactly the same terms
    pub fn shares_terms_with(&self, other: &SymbolicState) -> bool {
        self.slots.len() == other.slots.len()
            && self
                .slots
                .iter()
                .zip(&other.slots)
                .all(|(a, b)| a.field == b.field && a.name == b.name)
    }

    /// True when the state's fields are exactly the schema's, in order
    pub fn matches_schema(&self, schema: &StateSchema) -> bool {
        self.slots.len() == schema.len() && self.fields().zip(schema.names()).all(|(a, b)| a == b)
    }

    /// Frame axiom: every field of `self` equals the same field of `prev`
    pub fn unchanged_from(&self, prev: &SymbolicState) -> Bool {
        let equalities: Vec<Bool> = self
            .slots
            .iter()
            .zip(&prev.slots)
            .map(|(next, curr)| eq(&next.term, &curr.term))
            .collect();
        and_all(&equalities)
    }

    /// `min <= field <= max` for every field of the schema
    pub fn domain_constraints(&self, schema: &StateSchema) -> Bool {
        let bounds: Vec<Bool> = schema
            .fields()
            .iter()
            .filter_map(|field| {
                let term = self.term(field.name())?;
                let domain = field.domain();
                Some(and_all(&[
                    term.ge(&int_const(domain.min)),
                    term.le(&int_const(domain.max)),
                ]))
            })
            .collect();
        and_all(&bounds)
    }

    /// Read the state's concrete values out of a model.
    ///
    /// A value outside i64 is `ArithmeticOverflow`.
    pub fn read(&self, model: &Model) -> Result<ConcreteState> {
        let mut state = ConcreteState::new();
        for slot in &self.slots {
            let value = match model.get_int(&slot.name) {
                Some(value) => value,
                None => model.eval_i64(&slot.term)?,
            };
            state.set(slot.field.as_str(), value);
        }
        Ok(state)
    }
}

/// Concrete field values, used for counterexamples and concrete replay
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConcreteState {
    values: BTreeMap<String, i64>,
}

impl ConcreteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from `(field, value)` pairs
    pub fn from_values<S: Into<String>>(values: impl IntoIterator<Item = (S, i64)>) -> Self {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<i64> {
        self.values.get(field).copied()
    }

    pub fn set(&mut self, field: impl Into<String>, value: i64) {
        self.values.insert(field.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check that every schema field is present and within its domain
    pub fn within(&self, schema: &StateSchema) -> bool {
        schema.fields().iter().all(|field| {
            self.get(field.name())
                .is_some_and(|v| field.domain().contains(v))
        })
    }

    /// Names of the listed fields whose values differ between the two states
    pub fn differing_fields<'a>(
        &self,
        other: &ConcreteState,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> Vec<String> {
        fields
            .into_iter()
            .filter(|f| self.get(f) != other.get(f))
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Display for ConcreteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<_> = self
            .values
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
