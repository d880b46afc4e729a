//! Rules: a named condition plus the assignments applied when it holds

use crate::error::{Error, Result};
use crate::ir::expr::{Condition, Expr};
use crate::ir::schema::StateSchema;
use std::collections::HashSet;
use std::fmt;

/// How a rule constrains the fields it does not assign
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Frame {
    /// Every unassigned field keeps its previous value
    #[default]
    KeepUnassigned,
    /// Only the listed fields keep their previous value; the rest of the
    /// schema must be covered by assignments
    Explicit(Vec<String>),
}

/// A single `field := value` update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub field: String,
    pub value: Expr,
}

/// What a rule does to one field when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEffect<'a> {
    Assign(&'a Expr),
    Keep,
    /// Only reachable for rules that fail validation
    Unconstrained,
}

/// A named (condition, action) pair.
///
/// Rules are plain data and can be shared by any number of workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    condition: Condition,
    assignments: Vec<Assignment>,
    frame: Frame,
}

impl Rule {
    pub fn new(name: impl Into<String>, condition: Condition) -> Self {
        Self {
            name: name.into(),
            condition,
            assignments: Vec::new(),
            frame: Frame::default(),
        }
    }

    /// Add an assignment `field := value`
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.assignments.push(Assignment {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Mark a field as explicitly unchanged, switching the rule to an explicit frame
    pub fn keep(mut self, field: impl Into<String>) -> Self {
        match &mut self.frame {
            Frame::KeepUnassigned => self.frame = Frame::Explicit(vec![field.into()]),
            Frame::Explicit(kept) => kept.push(field.into()),
        }
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// The effect of this rule on `field` when its condition holds
    pub fn effect_on(&self, field: &str) -> FieldEffect<'_> {
        if let Some(a) = self.assignments.iter().find(|a| a.field == field) {
            return FieldEffect::Assign(&a.value);
        }
        match &self.frame {
            Frame::KeepUnassigned => FieldEffect::Keep,
            Frame::Explicit(kept) if kept.iter().any(|k| k == field) => FieldEffect::Keep,
            Frame::Explicit(_) => FieldEffect::Unconstrained,
        }
    }

    /// Check the rule against a schema.
    ///
    /// Every referenced field must exist, each field is pinned at most once,
    /// and with an explicit frame every field must be either assigned or kept.
    pub fn validate(&self, schema: &StateSchema) -> Result<()> {
        let mut read = Vec::new();
        self.condition.fields(&mut read);
        for field in read {
            schema.require(field, || format!("condition of rule `{}`", self.name))?;
        }

        let mut pinned: HashSet<&str> = HashSet::new();
        for assignment in &self.assignments {
            schema.require(&assignment.field, || {
                format!("assignment target in rule `{}`", self.name)
            })?;
            let mut read = Vec::new();
            assignment.value.fields(&mut read);
            for field in read {
                schema.require(field, || {
                    format!(
                        "assignment to `{}` in rule `{}`",
                        assignment.field, self.name
                    )
                })?;
            }
            if !pinned.insert(&assignment.field) {
                return Err(Error::DuplicateAssignment {
                    rule: self.name.clone(),
                    field: assignment.field.clone(),
                });
            }
        }

        if let Frame::Explicit(kept) = &self.frame {
            for field in kept {
                schema.require(field, || format!("frame of rule `{}`", self.name))?;
                if !pinned.insert(field) {
                    return Err(Error::DuplicateAssignment {
                        rule: self.name.clone(),
                        field: field.clone(),
                    });
                }
            }
            let missing: Vec<String> = schema
                .names()
                .filter(|name| !pinned.contains(name))
                .map(str::to_string)
                .collect();
            if !missing.is_empty() {
                return Err(Error::IncompleteTransition {
                    rule: self.name.clone(),
                    missing,
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions: Vec<_> = self
            .assignments
            .iter()
            .map(|a| format!("{} := {}", a.field, a.value))
            .collect();
        write!(
            f,
            "{}: if {} then {}",
            self.name,
            self.condition,
            actions.join("; ")
        )
    }
}
