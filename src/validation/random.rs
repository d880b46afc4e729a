//! Random and edge-case initial states for fast concrete validation

use crate::ir::{Domain, StateSchema};
use crate::semantics::state::ConcreteState;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration for random state generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Number of random states to generate
    pub count: usize,
    /// Seed for reproducible sampling; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            count: 64,
            seed: None,
        }
    }
}

impl SamplingConfig {
    pub fn with_seed(count: usize, seed: u64) -> Self {
        SamplingConfig {
            count,
            seed: Some(seed),
        }
    }
}

/// Generate uniformly random states within the schema's domains
pub fn generate_random_states(schema: &StateSchema, config: &SamplingConfig) -> Vec<ConcreteState> {
    let mut rng: ChaCha8Rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };

    (0..config.count)
        .map(|_| {
            ConcreteState::from_values(schema.fields().iter().map(|field| {
                let domain = field.domain();
                (field.name(), rng.random_range(domain.min..=domain.max))
            }))
        })
        .collect()
}

/// Generate states at the domain boundaries.
///
/// Every field at its minimum, at its maximum, and at its midpoint; then
/// each field alone at its minimum or maximum with the rest at the midpoint.
pub fn generate_edge_case_states(schema: &StateSchema) -> Vec<ConcreteState> {
    let fields = schema.fields();
    let uniform = |pick: fn(Domain) -> i64| {
        ConcreteState::from_values(fields.iter().map(|f| (f.name(), pick(f.domain()))))
    };

    let mut states = vec![
        uniform(|d| d.min),
        uniform(|d| d.max),
        uniform(|d| d.midpoint()),
    ];

    let middle = uniform(|d| d.midpoint());
    for field in fields {
        let domain = field.domain();
        for value in [domain.min, domain.max] {
            let mut state = middle.clone();
            state.set(field.name(), value);
            states.push(state);
        }
    }

    states.dedup();
    states
}
