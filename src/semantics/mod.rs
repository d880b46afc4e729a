//! Symbolic and concrete semantics of rules and workflows, and the queries built on them

pub mod concrete;
pub mod equivalence;
pub mod overlap;
pub mod reachability;
pub mod smt;
pub mod state;
pub mod symbolic;
pub mod workflow;

// Re-export main functionality
pub use concrete::{apply_rule_concrete, eval_condition, eval_expr};
pub use equivalence::{Counterexample, CounterexampleSet, EquivalenceQuery, EquivalenceResult};
pub use overlap::{check_overlap, OverlapResult};
pub use reachability::{check_reachability, ReachabilityResult};
pub use state::{ConcreteState, SymbolicState};
pub use symbolic::{Term, Vocabulary};
pub use workflow::{Step, StepOutcome, Trace, Workflow};
