//! State representations and state spaces

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for states in an RL environment
pub trait State: Clone + Debug + Send + Sync {
    /// Get a feature representation of the state
    fn features(&self) -> Vec<f64>;

    /// Check if this is a terminal state
    fn is_terminal(&self) -> bool {
        false
    }
}

/// Trait for defining state spaces
pub trait StateSpace: Send + Sync {
    /// The type of states in this space
    type State: State;

    /// Sample a random state from the space
    fn sample(&self) -> Self::State;

    /// Check if a state is valid within this space
    fn contains(&self, state: &Self::State) -> bool;

    /// Get the dimensionality of the state space
    fn dim(&self) -> Option<usize>;
}

/// Terminal state indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminal {
    /// Not a terminal state
    No,
    /// Terminal state (episode ends)
    Yes,
    /// Truncated (time limit reached)
    Truncated,
}

impl Terminal {
    /// Check if the state is terminal (either Yes or Truncated)
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::No)
    }
}

/// A simple vector state implementation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorState {
    /// The state vector
    pub data: Vec<f64>,
    /// Terminal status
    pub terminal: Terminal,
}

impl State for VectorState {
    fn features(&self) -> Vec<f64> {
        self.data.clone()
    }

    fn is_terminal(&self) -> bool {
        self.terminal.is_terminal()
    }
}

/// Space of binary flag vectors of fixed length
#[derive(Debug, Clone)]
pub struct BinarySpace {
    /// Number of flags
    pub n: usize,
}

impl BinarySpace {
    /// Create a new binary space
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl StateSpace for BinarySpace {
    type State = VectorState;

    fn sample(&self) -> Self::State {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        let data = (0..self.n)
            .map(|_| if rng.gen_bool(0.5) { 1.0 } else { 0.0 })
            .collect();

        VectorState {
            data,
            terminal: Terminal::No,
        }
    }

    fn contains(&self, state: &Self::State) -> bool {
        #[allow(clippy::float_cmp)]
        let binary = state.data.iter().all(|&x| x == 0.0 || x == 1.0);
        state.data.len() == self.n && binary
    }

    fn dim(&self) -> Option<usize> {
        Some(self.n)
    }
}
