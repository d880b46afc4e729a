//! A solver session: one Z3 solver, its declared terms and its assertion stack

use crate::error::{Error, Result};
use crate::semantics::symbolic::{Term, Vocabulary};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use z3::ast::{Bool, Int};
use z3::{Params, SatResult, Solver};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a single satisfiability check may run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Per-`check` budget; a check that runs out reports UNKNOWN
    pub timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}

impl SessionConfig {
    /// Let every check run to completion
    pub fn no_timeout() -> Self {
        Self { timeout: None }
    }

    pub fn with_timeout_secs(secs: u64) -> Self {
        Self::with_timeout(Duration::from_secs(secs))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// Timeout in the unit Z3 expects
    fn timeout_millis(&self) -> Result<Option<u32>> {
        let Some(timeout) = self.timeout else {
            return Ok(None);
        };
        let millis = timeout.as_millis();
        if millis == 0 {
            return Err(Error::InvalidConfig(
                "solver timeout must be at least one millisecond".into(),
            ));
        }
        u32::try_from(millis).map(Some).map_err(|_| {
            Error::InvalidConfig(format!(
                "solver timeout of {} ms exceeds the Z3 limit of {} ms",
                millis,
                u32::MAX
            ))
        })
    }
}

/// Concrete value of a zero-arity term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Snapshot of a satisfying assignment.
///
/// Holds the value of every declared term the solver assigned, tagged with
/// the session generation that produced it. Any later `assert`, `pop` or
/// `check` on the session makes the model stale.
pub struct Model {
    generation: u64,
    values: BTreeMap<String, Value>,
    inner: z3::Model,
}

impl Model {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).copied()
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Every assigned zero-arity term and its value, ordered by name
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Evaluate an arbitrary integer term, completing unassigned constants
    pub fn eval_int(&self, term: &Int) -> Option<i64> {
        self.inner.eval(term, true)?.as_i64()
    }

    /// Evaluate an integer term whose value must fit in i64
    pub fn eval_i64(&self, term: &Int) -> Result<i64> {
        let value = self
            .inner
            .eval(term, true)
            .ok_or_else(|| Error::Solver(format!("term `{}` has no value in the model", term)))?;
        value
            .as_i64()
            .ok_or_else(|| Error::ArithmeticOverflow(format!("`{}` = {}", term, value)))
    }

    pub fn eval_bool(&self, term: &Bool) -> Option<bool> {
        self.inner.eval(term, true)?.as_bool()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("generation", &self.generation)
            .field("values", &self.values)
            .finish()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<_> = self
            .values
            .iter()
            .map(|(name, value)| format!("{} = {}", name, value))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Outcome of a `check` call
#[derive(Debug)]
pub enum CheckResult {
    Sat(Model),
    Unsat,
    /// The solver gave up; carries Z3's reason (e.g. "timeout")
    Unknown(String),
}

impl CheckResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, CheckResult::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, CheckResult::Unsat)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, CheckResult::Unknown(_))
    }

    pub fn model(&self) -> Option<&Model> {
        match self {
            CheckResult::Sat(model) => Some(model),
            _ => None,
        }
    }

    pub fn into_model(self) -> Option<Model> {
        match self {
            CheckResult::Sat(model) => Some(model),
            _ => None,
        }
    }
}

/// Wraps exactly one Z3 solver.
///
/// Assertions accumulate; use `push`/`pop` to scope them. Terms must be
/// created through the session's vocabulary so models can be read back.
pub struct SolverSession {
    solver: Solver,
    config: SessionConfig,
    vocab: Vocabulary,
    generation: u64,
    scopes: usize,
    assertions: usize,
}

impl SolverSession {
    /// Create a session, failing with `SolverUnavailable` if Z3 cannot be initialised
    pub fn new(config: SessionConfig) -> Result<Self> {
        let timeout_ms = config.timeout_millis()?;
        let solver = std::panic::catch_unwind(Solver::new).map_err(|_| {
            Error::SolverUnavailable("failed to create a Z3 solver instance".into())
        })?;
        if let Some(ms) = timeout_ms {
            let mut params = Params::new();
            params.set_u32("timeout", ms);
            solver.set_params(&params);
        }
        debug!(timeout_ms = ?timeout_ms, "created solver session");
        Ok(Self {
            solver,
            config,
            vocab: Vocabulary::new(),
            generation: 0,
            scopes: 0,
            assertions: 0,
        })
    }

    pub fn with_default_config() -> Result<Self> {
        Self::new(SessionConfig::default())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn vocabulary_mut(&mut self) -> &mut Vocabulary {
        &mut self.vocab
    }

    /// Counter bumped on every change to the assertion stack and every check
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes
    }

    /// Number of constraints asserted over the session's lifetime
    pub fn assertion_count(&self) -> usize {
        self.assertions
    }

    pub fn assert(&mut self, constraint: &Bool) {
        self.solver.assert(constraint);
        self.assertions += 1;
        self.generation += 1;
    }

    pub fn assert_all(&mut self, constraints: &[Bool]) {
        for constraint in constraints {
            self.assert(constraint);
        }
    }

    /// Open a retraction checkpoint
    pub fn push(&mut self) {
        self.solver.push();
        self.scopes += 1;
    }

    /// Drop every assertion made since the matching `push`
    pub fn pop(&mut self) -> Result<()> {
        if self.scopes == 0 {
            return Err(Error::NoScope);
        }
        self.solver.pop(1);
        self.scopes -= 1;
        self.generation += 1;
        Ok(())
    }

    /// Check satisfiability of the current assertion stack
    pub fn check(&mut self) -> Result<CheckResult> {
        let started = Instant::now();
        let verdict = self.solver.check();
        self.generation += 1;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match verdict {
            SatResult::Sat => {
                let inner = self
                    .solver
                    .get_model()
                    .ok_or_else(|| Error::Solver("SAT but no model available".into()))?;
                let values = self.assigned_values(&inner);
                debug!(elapsed_ms, assigned = values.len(), "check: sat");
                Ok(CheckResult::Sat(Model {
                    generation: self.generation,
                    values,
                    inner,
                }))
            }
            SatResult::Unsat => {
                debug!(elapsed_ms, "check: unsat");
                Ok(CheckResult::Unsat)
            }
            SatResult::Unknown => {
                let reason = self
                    .solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "unknown".to_string());
                warn!(elapsed_ms, %reason, "check: unknown");
                Ok(CheckResult::Unknown(reason))
            }
        }
    }

    /// Values of the declared terms that actually occur in the model
    fn assigned_values(&self, model: &z3::Model) -> BTreeMap<String, Value> {
        let mut values = BTreeMap::new();
        for (name, term) in self.vocab.iter() {
            let value = match term {
                Term::Int(v) => model.eval(v, false).and_then(|x| x.as_i64()).map(Value::Int),
                Term::Bool(v) => model
                    .eval(v, false)
                    .and_then(|x| x.as_bool())
                    .map(Value::Bool),
            };
            if let Some(value) = value {
                values.insert(name.to_string(), value);
            }
        }
        values
    }

    /// Reject models produced before the latest change to the session
    pub fn ensure_current(&self, model: &Model) -> Result<()> {
        if model.generation != self.generation {
            return Err(Error::StaleModel {
                model: model.generation,
                session: self.generation,
            });
        }
        Ok(())
    }
}
