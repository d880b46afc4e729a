//! Bounded equivalence checking of business-rule workflows.
//!
//! A workflow is an ordered list of guarded rules over a fixed schema of
//! integer fields. Two workflows are unrolled into chains of symbolic states
//! from one shared initial state and handed to Z3, which either finds an
//! input on which their final states differ or proves there is none.
//!
//! Equivalence is bounded: a proof covers the declared field domains and
//! exactly the unrolled number of steps. Workflows of different lengths are
//! aligned with [`Step::Pad`](semantics::Step::Pad).

pub mod error;
pub mod ir;
pub mod scenarios;
pub mod semantics;
pub mod solver;
pub mod validation;

pub use error::{Error, Result};
