//! Solver session management and solution enumeration

pub mod enumerate;
pub mod session;

pub use enumerate::{block_current_solution, enumerate_solutions, Enumeration, StopReason};
pub use session::{CheckResult, Model, SessionConfig, SolverSession, Value};
