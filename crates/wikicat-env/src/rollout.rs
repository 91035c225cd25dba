//! Batched session rollouts

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};
use tracing::debug;

use wikicat_rl_core::Result;

use crate::environment::WikicatEnv;

/// Record of `n_steps` ticks for every session of the loaded batch
#[derive(Debug, Clone)]
pub struct SessionBatch {
    /// `[batch, time, n_actions]` states before each step
    pub states: Array3<u8>,
    /// `[batch, time]` actions taken
    pub actions: Array2<usize>,
    /// `[batch, time, observation]` observations produced by each step
    pub observations: Array3<f64>,
    /// `[batch, time]` per-step rewards
    pub rewards: Array2<f64>,
    /// `[batch, n_actions]` states after the last step
    pub final_states: Array2<u8>,
}

impl SessionBatch {
    /// Roll the loaded batch forward from fresh sessions.
    ///
    /// `policy` receives the tick and the current states and returns one
    /// action per session.
    pub fn record<F>(env: &WikicatEnv, n_steps: usize, mut policy: F) -> Result<Self>
    where
        F: FnMut(usize, ArrayView2<'_, u8>) -> Vec<usize>,
    {
        let batch_size = env.batch_size();
        let mut states = Array3::zeros((batch_size, n_steps, env.n_actions()));
        let mut actions = Array2::zeros((batch_size, n_steps));
        let mut observations = Array3::zeros((batch_size, n_steps, env.observation_size()));
        let mut state = env.initial_state();

        for t in 0..n_steps {
            let chosen = policy(t, state.view());
            let (next, observation) = env.get_action_results(state.view(), &chosen)?;

            states.index_axis_mut(Axis(1), t).assign(&state);
            actions.column_mut(t).assign(&ArrayView1::from(chosen.as_slice()));
            observations.index_axis_mut(Axis(1), t).assign(&observation);
            state = next;
        }

        let mut rewards = Array2::zeros((batch_size, n_steps));
        for b in 0..batch_size {
            let session_actions = actions.row(b).to_vec();
            let session_rewards =
                env.get_reward(states.index_axis(Axis(0), b), &session_actions, b)?;
            rewards.row_mut(b).assign(&session_rewards);
        }

        debug!(batch_size, n_steps, "recorded session batch");

        Ok(Self {
            states,
            actions,
            observations,
            rewards,
            final_states: state,
        })
    }

    /// Number of sessions
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.actions.nrows()
    }

    /// Number of recorded ticks
    #[must_use]
    pub fn n_steps(&self) -> usize {
        self.actions.ncols()
    }

    /// `[batch, time]` mask of ticks at which each session was still alive
    pub fn alive(&self, env: &WikicatEnv) -> Result<Array2<bool>> {
        env.get_whether_alive(self.observations.view())
    }

    /// Undiscounted return of every session
    #[must_use]
    pub fn total_rewards(&self) -> Array1<f64> {
        self.rewards.sum_axis(Axis(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn env() -> WikicatEnv {
        let mut env = WikicatEnv::default();
        // Actions: attributes 0, 1; category 2; end 3.
        env.load_data_batch(array![[1, 0], [0, 1]], array![[1], [0]])
            .unwrap();
        env
    }

    #[test]
    fn test_scripted_rollout() {
        let env = env();
        let script = [[0, 1], [2, 1], [3, 3], [0, 2]];
        let batch = SessionBatch::record(&env, script.len(), |t, _| script[t].to_vec()).unwrap();

        assert_eq!(batch.batch_size(), 2);
        assert_eq!(batch.n_steps(), 4);
        assert_eq!(batch.actions.row(0), array![0usize, 2, 3, 0]);

        // Session 0: attribute yes, category yes, end after category, frozen.
        assert_eq!(batch.rewards.row(0), array![1.0, 3.0, 0.0, 0.0]);
        // Session 1: attribute yes, repeat, end without category, frozen.
        assert_eq!(batch.rewards.row(1), array![1.0, -0.5, 0.0, 0.0]);
        assert_relative_eq!(batch.total_rewards()[0], 4.0);

        let alive = batch.alive(&env).unwrap();
        assert_eq!(alive.row(0), array![true, true, true, false]);

        assert_eq!(batch.final_states.row(0), array![1u8, 0, 1, 1]);
        assert_eq!(batch.states.index_axis(Axis(1), 0), env.initial_state());
    }

    #[test]
    fn test_policy_sees_current_state() {
        let env = env();
        let batch = SessionBatch::record(&env, 3, |_, state| {
            state
                .rows()
                .into_iter()
                .map(|row| row.iter().position(|&x| x == 0).unwrap_or(0))
                .collect()
        })
        .unwrap();

        // First untried action each tick: 0, 1, 2.
        assert_eq!(batch.actions.row(1), array![0usize, 1, 2]);
    }

    #[test]
    fn test_wrong_action_count_fails() {
        let env = env();
        assert!(SessionBatch::record(&env, 2, |_, _| vec![0]).is_err());
    }
}
