//! Validation utilities for fast, solver-free divergence checks

pub mod divergence;
pub mod random;

pub use divergence::{find_divergence, Divergence};
pub use random::{generate_edge_case_states, generate_random_states, SamplingConfig};
