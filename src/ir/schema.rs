//! Field declarations shared by every state of a workflow

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fmt;

/// Inclusive integer bounds a field may take in an initial state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Domain {
    pub min: i64,
    pub max: i64,
}

impl Domain {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Check if a value lies within the bounds
    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    /// True when `min > max`, i.e. no value is admissible
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Midpoint of the domain, rounded towards `min`
    pub fn midpoint(&self) -> i64 {
        let (min, max) = (i128::from(self.min), i128::from(self.max));
        (min + (max - min) / 2) as i64
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// A named integer field with its value domain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    domain: Domain,
}

impl Field {
    pub fn new(name: impl Into<String>, domain: Domain) -> Self {
        Self {
            name: name.into(),
            domain,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }
}

/// Ordered set of uniquely named fields.
///
/// The schema is fixed at declaration time; every state built over it
/// carries exactly one term per field, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSchema {
    fields: Vec<Field>,
}

impl StateSchema {
    /// Declare a schema, rejecting empty schemas, duplicate names and empty domains
    pub fn declare(fields: impl IntoIterator<Item = Field>) -> Result<Self> {
        let fields: Vec<Field> = fields.into_iter().collect();
        if fields.is_empty() {
            return Err(Error::InvalidSchema("a schema needs at least one field".into()));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.is_empty() {
                return Err(Error::InvalidSchema("field names must not be empty".into()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "field `{}` declared twice",
                    field.name
                )));
            }
            if field.domain.is_empty() {
                return Err(Error::InvalidSchema(format!(
                    "field `{}` has an empty domain {}",
                    field.name, field.domain
                )));
            }
        }

        Ok(Self { fields })
    }

    /// Declare a schema where every field shares the same domain
    pub fn uniform<S: AsRef<str>>(names: &[S], domain: Domain) -> Result<Self> {
        Self::declare(names.iter().map(|n| Field::new(n.as_ref(), domain)))
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Look up a field, failing with `UnknownField` naming `context`
    pub fn require(&self, name: &str, context: impl FnOnce() -> String) -> Result<&Field> {
        self.field(name).ok_or_else(|| Error::UnknownField {
            field: name.to_string(),
            context: context(),
        })
    }
}

impl fmt::Display for StateSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<_> = self
            .fields
            .iter()
            .map(|field| format!("{}: {}", field.name, field.domain))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
