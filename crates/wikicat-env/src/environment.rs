//! The wikicat environment: batched state transitions and per-session rewards
//!
//! The environment holds one batch of musicians at a time. Each musician is a
//! row of boolean facts laid out in action-id order: attributes first, then
//! Wikipedia categories, then an always-zero column for the end action. A
//! session state is a row of flags recording which actions were already taken;
//! the last flag is the end marker and never clears once set.

use ndarray::{s, Array1, Array2, ArrayView2, ArrayView3, Axis};
use rand::Rng;
use std::ops::Range;
use tracing::debug;

use wikicat_rl_core::{EnvironmentConfig, RLError, Result};

use crate::dataset::Dataset;
use crate::rewards::{RewardTable, StepFacts};

/// Observation columns preceding the one-hot action encoding
pub const OBSERVATION_PREFIX: usize = 2;

/// Combined transition model and reward function for the musician quiz
#[derive(Debug, Clone)]
pub struct WikicatEnv {
    rewards: RewardTable,
    attributes: Array2<u8>,
    categories: Array2<u8>,
    /// `[batch, n_actions]`: attributes, categories, zero end column
    joint_data: Array2<u8>,
}

impl Default for WikicatEnv {
    fn default() -> Self {
        Self::new(RewardTable::default())
    }
}

impl WikicatEnv {
    /// Create an environment holding a 1x1 placeholder batch
    #[must_use]
    pub fn new(rewards: RewardTable) -> Self {
        let attributes = Array2::zeros((1, 1));
        let categories = Array2::zeros((1, 1));
        let joint_data = join(&attributes, &categories);
        Self {
            rewards,
            attributes,
            categories,
            joint_data,
        }
    }

    /// Create an environment, reading a partial reward table from `params["rewards"]`
    pub fn from_config(config: &EnvironmentConfig) -> Result<Self> {
        let rewards = config.param::<RewardTable>("rewards")?.unwrap_or_default();
        Ok(Self::new(rewards))
    }

    /// Reward constants in use
    #[must_use]
    pub fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    /// Replace the loaded batch.
    ///
    /// Any nonzero cell counts as a positive fact.
    pub fn load_data_batch(&mut self, attributes: Array2<u8>, categories: Array2<u8>) -> Result<()> {
        if attributes.nrows() != categories.nrows() {
            return Err(RLError::DimensionMismatch {
                expected: attributes.nrows(),
                actual: categories.nrows(),
            });
        }

        debug!(
            batch_size = attributes.nrows(),
            attributes = attributes.ncols(),
            categories = categories.ncols(),
            "loading data batch"
        );

        self.joint_data = join(&attributes, &categories);
        self.attributes = attributes;
        self.categories = categories;
        Ok(())
    }

    /// Load `batch_size` musicians drawn uniformly, with replacement, from `dataset`
    pub fn load_random_batch<R: Rng + ?Sized>(
        &mut self,
        dataset: &Dataset,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<()> {
        if dataset.is_empty() {
            return Err(RLError::Dataset(
                "cannot sample a batch from an empty dataset".to_string(),
            ));
        }

        let row_ids: Vec<usize> = (0..batch_size)
            .map(|_| rng.gen_range(0..dataset.len()))
            .collect();
        let (attributes, categories) = dataset.batch(&row_ids)?;
        self.load_data_batch(attributes, categories)
    }

    /// Number of sessions in the loaded batch
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.joint_data.nrows()
    }

    /// Number of attribute actions
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.attributes.ncols()
    }

    /// Number of category actions
    #[must_use]
    pub fn n_categories(&self) -> usize {
        self.categories.ncols()
    }

    /// Number of actions, end action included
    #[must_use]
    pub fn n_actions(&self) -> usize {
        self.joint_data.ncols()
    }

    /// Id of the action that ends a session
    #[must_use]
    pub fn end_action_id(&self) -> usize {
        self.n_actions() - 1
    }

    /// Ids of the category actions
    #[must_use]
    pub fn category_action_ids(&self) -> Range<usize> {
        self.n_attributes()..self.n_attributes() + self.n_categories()
    }

    /// Whether `action` polls a Wikipedia category
    #[must_use]
    pub fn is_category_action(&self, action: usize) -> bool {
        self.category_action_ids().contains(&action)
    }

    /// Length of one observation row
    #[must_use]
    pub fn observation_size(&self) -> usize {
        self.n_actions() + OBSERVATION_PREFIX
    }

    /// Length of one session state row
    #[must_use]
    pub fn state_size(&self) -> usize {
        self.n_actions()
    }

    /// Fresh session states for the whole batch
    #[must_use]
    pub fn initial_state(&self) -> Array2<u8> {
        Array2::zeros((self.batch_size(), self.n_actions()))
    }

    /// Ground-truth answer of session `batch_i` for `action`
    ///
    /// # Panics
    ///
    /// Panics if either index is outside the loaded batch.
    #[must_use]
    pub fn response(&self, batch_i: usize, action: usize) -> u8 {
        self.joint_data[[batch_i, action]]
    }

    /// Liveness mask over `[batch, time, observation]` observations.
    ///
    /// A session counts as alive on the tick where it commits the end action;
    /// only later ticks are marked dead.
    pub fn get_whether_alive(&self, observations: ArrayView3<'_, f64>) -> Result<Array2<bool>> {
        if observations.len_of(Axis(2)) < OBSERVATION_PREFIX {
            return Err(RLError::DimensionMismatch {
                expected: self.observation_size(),
                actual: observations.len_of(Axis(2)),
            });
        }

        #[allow(clippy::float_cmp)]
        let alive = observations.index_axis(Axis(2), 1).mapv(|ended| ended == 0.0);
        Ok(alive)
    }

    /// Apply one action per session.
    ///
    /// Returns the new states and one observation row per session:
    /// `[response, session_already_ended, one_hot(action)...]`. Sessions whose
    /// end flag is already set keep their state unchanged.
    pub fn get_action_results(
        &self,
        last_state: ArrayView2<'_, u8>,
        actions: &[usize],
    ) -> Result<(Array2<u8>, Array2<f64>)> {
        let batch_size = self.batch_size();
        if actions.len() != batch_size {
            return Err(RLError::DimensionMismatch {
                expected: batch_size,
                actual: actions.len(),
            });
        }
        self.check_states(last_state, batch_size)?;
        self.check_actions(actions)?;

        let end = self.end_action_id();
        let mut new_state = last_state.to_owned();
        let mut observation = Array2::zeros((batch_size, self.observation_size()));

        for (b, &action) in actions.iter().enumerate() {
            let ended = last_state[[b, end]] != 0;
            if !ended {
                new_state[[b, action]] = 1;
            }

            let mut row = observation.row_mut(b);
            row[0] = f64::from(self.response(b, action));
            row[1] = if ended { 1.0 } else { 0.0 };
            row[OBSERVATION_PREFIX + action] = 1.0;
        }

        Ok((new_state, observation))
    }

    /// Rewards for one whole session of the loaded batch.
    ///
    /// `session_states[t]` is the state before step `t` and `session_actions[t]`
    /// the action taken at it. The last step always counts as ending the
    /// session, and steps after the first end get nothing.
    pub fn get_reward(
        &self,
        session_states: ArrayView2<'_, u8>,
        session_actions: &[usize],
        batch_i: usize,
    ) -> Result<Array1<f64>> {
        if batch_i >= self.batch_size() {
            return Err(RLError::InvalidState(format!(
                "session {batch_i} out of range for batch of {}",
                self.batch_size()
            )));
        }
        let steps = session_actions.len();
        self.check_states(session_states, steps)?;
        self.check_actions(session_actions)?;

        let Some(last) = steps.checked_sub(1) else {
            return Ok(Array1::zeros(0));
        };

        let end = self.end_action_id();
        let end_tick = session_actions
            .iter()
            .position(|&a| a == end)
            .unwrap_or(last);
        let category_seen = session_actions[..end_tick]
            .iter()
            .any(|&a| self.is_category_action(a));

        let rewards = session_actions
            .iter()
            .enumerate()
            .map(|(t, &action)| {
                let facts = StepFacts {
                    active: session_states[[t, end]] == 0,
                    finished_now: action == end || t == last,
                    tried_already: session_states[[t, action]] != 0,
                    categorical: self.is_category_action(action),
                    response: self.response(batch_i, action) != 0,
                    category_seen,
                };
                self.rewards.value(facts.outcome())
            })
            .collect();

        Ok(rewards)
    }

    fn check_states(&self, states: ArrayView2<'_, u8>, rows: usize) -> Result<()> {
        if states.ncols() != self.n_actions() {
            return Err(RLError::DimensionMismatch {
                expected: self.n_actions(),
                actual: states.ncols(),
            });
        }
        if states.nrows() != rows {
            return Err(RLError::DimensionMismatch {
                expected: rows,
                actual: states.nrows(),
            });
        }
        Ok(())
    }

    fn check_actions(&self, actions: &[usize]) -> Result<()> {
        match actions.iter().find(|&&a| a >= self.n_actions()) {
            Some(bad) => Err(RLError::InvalidAction(format!(
                "action {bad} out of range for {} actions",
                self.n_actions()
            ))),
            None => Ok(()),
        }
    }
}

fn join(attributes: &Array2<u8>, categories: &Array2<u8>) -> Array2<u8> {
    let (n_attributes, n_categories) = (attributes.ncols(), categories.ncols());
    let mut joint = Array2::zeros((attributes.nrows(), n_attributes + n_categories + 1));
    joint.slice_mut(s![.., ..n_attributes]).assign(attributes);
    joint
        .slice_mut(s![.., n_attributes..n_attributes + n_categories])
        .assign(categories);
    joint
}
