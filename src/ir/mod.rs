//! Rule language: schemas, expressions, conditions and rules

pub mod expr;
pub mod rule;
pub mod schema;

// Re-export commonly used types
pub use expr::{CmpOp, Condition, Expr};
pub use rule::{Assignment, FieldEffect, Frame, Rule};
pub use schema::{Domain, Field, StateSchema};
