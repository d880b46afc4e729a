//! Error type shared by the whole crate

use thiserror::Error;

/// Errors raised while building or solving workflow queries.
///
/// Solver timeouts are not errors; they are reported as
/// [`CheckResult::Unknown`](crate::solver::CheckResult::Unknown).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("schema mismatch: `{left}` declares {left_schema}, `{right}` declares {right_schema}")]
    SchemaMismatch {
        left: String,
        right: String,
        left_schema: String,
        right_schema: String,
    },

    #[error("horizon mismatch: workflow `{left}` ends at t={left_horizon}, workflow `{right}` ends at t={right_horizon}; insert pad steps to align them")]
    HorizonMismatch {
        left: String,
        right: String,
        left_horizon: usize,
        right_horizon: usize,
    },

    #[error("workflows `{left}` and `{right}` do not start from the same initial state")]
    InitialStateNotShared { left: String, right: String },

    #[error("symbolic term `{0}` already exists in this session; use a distinct workflow label")]
    TermCollision(String),

    #[error("unknown field `{field}` referenced by {context}")]
    UnknownField { field: String, context: String },

    #[error("rule `{rule}` assigns field `{field}` more than once")]
    DuplicateAssignment { rule: String, field: String },

    #[error("rule `{rule}` leaves fields unconstrained: {}", missing.join(", "))]
    IncompleteTransition { rule: String, missing: Vec<String> },

    #[error("integer overflow: {0} does not fit in i64")]
    ArithmeticOverflow(String),

        #[error("pop called with no open solver scope")]
    NoScope,

    #[error("model from generation {model} is stale (session is at generation {session})")]
    StaleModel { model: u64, session: u64 },

    #[error("SMT solver unavailable: {0}")]
    SolverUnavailable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Z3 error: {0}")]
    Solver(String),
}

pub type Result<T> = std::result::Result<T, Error>;
