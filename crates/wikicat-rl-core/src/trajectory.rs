//! Trajectory storage

use serde::{Deserialize, Serialize};

use crate::Reward;

/// Single transition in a trajectory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition<O, A, S> {
    /// Current observation
    pub observation: O,
    /// Action taken
    pub action: A,
    /// Reward received
    pub reward: Reward,
    /// Next observation
    pub next_observation: O,
    /// Whether episode ended
    pub done: bool,
    /// Next internal state (if available)
    pub next_state: Option<S>,
}

/// Complete trajectory of an episode
#[derive(Debug, Clone)]
pub struct Trajectory<O, A, S> {
    /// Sequence of transitions
    pub transitions: Vec<Transition<O, A, S>>,
    /// Total reward
    pub total_reward: f64,
    /// Episode ID
    pub episode_id: String,
}

impl<O, A, S> Trajectory<O, A, S> {
    /// Create a new empty trajectory
    pub fn new(episode_id: impl Into<String>) -> Self {
        Self {
            transitions: Vec::new(),
            total_reward: 0.0,
            episode_id: episode_id.into(),
        }
    }

    /// Add a transition to the trajectory
    pub fn push(&mut self, transition: Transition<O, A, S>) {
        self.total_reward += transition.reward.value();
        self.transitions.push(transition);
    }

    /// Get the length of the trajectory
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if trajectory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Compute returns (cumulative discounted rewards)
    #[must_use]
    pub fn returns(&self, gamma: f64) -> Vec<f64> {
        let mut returns = vec![0.0; self.len()];
        let mut running_return = 0.0;

        for i in (0..self.len()).rev() {
            if self.transitions[i].done {
                running_return = 0.0;
            }
            running_return = self.transitions[i].reward.value() + gamma * running_return;
            returns[i] = running_return;
        }

        returns
    }
}
