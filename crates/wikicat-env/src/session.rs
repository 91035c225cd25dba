//! Interactive single-musician sessions
//!
//! [`WikicatSession`] exposes the quiz through the step-by-step
//! [`Environment`] trait. Rewards follow the same rules as
//! [`WikicatEnv::get_reward`], with the step that reaches `max_steps`
//! standing in for the last step of a recorded trajectory.

use async_trait::async_trait;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, trace};

use wikicat_rl_core::{
    ActionSpace, BinarySpace, BoxObservationSpace, DiscreteAction, DiscreteSpace, Environment,
    EnvironmentConfig, ObservationSpace, RLError, Result, Reward, StateSpace, Step, StepInfo,
    Terminal, VectorObservation, VectorState,
};

use crate::dataset::Dataset;
use crate::environment::WikicatEnv;
use crate::rewards::{RewardOutcome, StepFacts};

/// Session length used when the config sets no `max_steps`
pub const DEFAULT_MAX_STEPS: usize = 25;

/// One musician at a time, drawn at random on every reset
pub struct WikicatSession {
    env: WikicatEnv,
    dataset: Arc<Dataset>,
    rng: StdRng,
    max_steps: usize,
    state: Array2<u8>,
    steps: usize,
    category_seen: bool,
    musician: Option<usize>,
}

impl WikicatSession {
    /// Create a session environment over `dataset`.
    ///
    /// Reads `seed`, `max_steps` and `params["rewards"]` from `config`.
    pub fn new(dataset: Arc<Dataset>, config: &EnvironmentConfig) -> Result<Self> {
        if dataset.is_empty() {
            return Err(RLError::Dataset("no musicians to quiz".to_string()));
        }
        let max_steps = config.max_steps.unwrap_or(DEFAULT_MAX_STEPS);
        if max_steps == 0 {
            return Err(RLError::Environment("max_steps must be positive".to_string()));
        }

        let mut env = WikicatEnv::from_config(config)?;
        // Sizes the action space before the first reset.
        let (attributes, categories) = dataset.batch(&[0])?;
        env.load_data_batch(attributes, categories)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            state: env.initial_state(),
            env,
            dataset,
            rng,
            max_steps,
            steps: 0,
            category_seen: false,
            musician: None,
        })
    }

    /// Underlying batched environment, holding the current musician
    #[must_use]
    pub fn env(&self) -> &WikicatEnv {
        &self.env
    }

    /// Row of the current musician, if a session has started
    #[must_use]
    pub fn musician(&self) -> Option<usize> {
        self.musician
    }

    /// Name of the current musician, if a session has started
    #[must_use]
    pub fn musician_label(&self) -> Option<&str> {
        self.musician
            .map(|row| self.dataset.labels()[row].as_str())
    }

    /// Start a session with a specific musician
    pub fn reset_to(&mut self, row: usize) -> Result<VectorObservation> {
        let (attributes, categories) = self.dataset.batch(&[row])?;
        self.env.load_data_batch(attributes, categories)?;
        self.state = self.env.initial_state();
        self.steps = 0;
        self.category_seen = false;
        self.musician = Some(row);

        debug!(row, musician = ?self.musician_label(), "session reset");
        Ok(VectorObservation {
            data: vec![0.0; self.env.observation_size()],
        })
    }

    fn ended(&self) -> bool {
        self.state[[0, self.env.end_action_id()]] != 0
    }

    fn state_snapshot(&self) -> VectorState {
        let terminal = if self.ended() {
            Terminal::Yes
        } else if self.steps >= self.max_steps {
            Terminal::Truncated
        } else {
            Terminal::No
        };

        VectorState {
            data: self.state.row(0).iter().map(|&x| f64::from(x)).collect(),
            terminal,
        }
    }
}

#[async_trait]
impl Environment for WikicatSession {
    type Observation = VectorObservation;
    type Action = DiscreteAction;
    type State = VectorState;

    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation>> {
        Box::new(BoxObservationSpace::unit(self.env.observation_size()))
    }

    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>> {
        Box::new(DiscreteSpace::new(self.env.n_actions()))
    }

    fn state_space(&self) -> Option<Box<dyn StateSpace<State = Self::State>>> {
        Some(Box::new(BinarySpace::new(self.env.state_size())))
    }

    async fn reset(&mut self) -> Result<(Self::Observation, StepInfo)> {
        let row = self.rng.gen_range(0..self.dataset.len());
        let observation = self.reset_to(row)?;
        let info = StepInfo::default()
            .with("musician", self.dataset.labels()[row].clone())
            .with("row", row);
        Ok((observation, info))
    }

    async fn step(&mut self, action: Self::Action) -> Result<Step<Self::Observation, Self::State>> {
        if self.musician.is_none() {
            return Err(RLError::Environment("step called before reset".to_string()));
        }

        let action_id = action.0;
        let (next, observation) = self
            .env
            .get_action_results(self.state.view(), &[action_id])?;

        let end = self.env.end_action_id();
        let active = !self.ended() && self.steps < self.max_steps;
        let facts = StepFacts {
            active,
            finished_now: action_id == end || self.steps + 1 == self.max_steps,
            tried_already: self.state[[0, action_id]] != 0,
            categorical: self.env.is_category_action(action_id),
            response: self.env.response(0, action_id) != 0,
            category_seen: self.category_seen,
        };
        let outcome = facts.outcome();
        let reward = self.env.rewards().value(outcome);

        if active {
            self.state = next;
            self.steps += 1;
            if facts.categorical && !facts.finished_now {
                self.category_seen = true;
            }
        }

        trace!(action = action_id, ?outcome, reward, "session step");

        let done = self.ended() || self.steps >= self.max_steps;
        let truncated = done && !self.ended();
        let outcome_name = match outcome {
            RewardOutcome::Scored(kind) => kind.name(),
            RewardOutcome::Inactive => "inactive",
        };

        let mut data = observation.row(0).to_vec();
        // A truncated session never set its end flag.
        data[1] = if active { 0.0 } else { 1.0 };

        Ok(Step {
            observation: VectorObservation { data },
            reward: Reward(reward),
            done,
            truncated,
            info: StepInfo::default()
                .with("outcome", outcome_name)
                .with("response", facts.response),
            state: Some(self.state_snapshot()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use wikicat_rl_core::{Observation, State};

    // Actions: 0 plays_guitar, 1 active_1990s, 2 category:Jazz, 3 category:Rock, 4 end.
    const CSV: &str = "\
name,plays_guitar,active_1990s,category:Jazz,category:Rock
Miles,0,1,1,0
Jimi,1,0,0,1
";

    fn dataset() -> Arc<Dataset> {
        Arc::new(Dataset::from_reader(CSV.as_bytes(), 0).unwrap())
    }

    fn config(max_steps: Option<usize>) -> EnvironmentConfig {
        EnvironmentConfig {
            seed: Some(1),
            max_steps,
            ..EnvironmentConfig::default()
        }
    }

    async fn play(session: &mut WikicatSession, actions: &[usize]) -> Vec<Step<VectorObservation, VectorState>> {
        let mut steps = Vec::new();
        for &a in actions {
            steps.push(session.step(DiscreteAction(a)).await.unwrap());
        }
        steps
    }

    #[tokio::test]
    async fn test_step_before_reset_fails() {
        let mut session = WikicatSession::new(dataset(), &config(None)).unwrap();
        assert!(session.step(DiscreteAction(0)).await.is_err());
    }

    #[tokio::test]
    async fn test_spaces() {
        let session = WikicatSession::new(dataset(), &config(None)).unwrap();
        assert_eq!(session.action_space().dim(), Some(1));
        assert!(session.action_space().contains(&DiscreteAction(4)));
        assert!(!session.action_space().contains(&DiscreteAction(5)));
        assert_eq!(session.observation_space().shape(), vec![7]);
        assert_eq!(session.state_space().and_then(|s| s.dim()), Some(5));
    }

    #[tokio::test]
    async fn test_rewards_match_batched_rules() {
        let mut session = WikicatSession::new(dataset(), &config(None)).unwrap();
        session.reset_to(0).unwrap();
        assert_eq!(session.musician_label(), Some("Miles"));

        let steps = play(&mut session, &[1, 0, 2, 2, 4, 3]).await;
        let rewards: Vec<f64> = steps.iter().map(|s| s.reward.value()).collect();
        assert_eq!(rewards, vec![1.0, -1.0, 3.0, -0.5, 0.0, 0.0]);

        assert!(!steps[3].done);
        assert!(steps[4].done);
        assert!(!steps[4].truncated);
        assert_eq!(steps[4].info.fields["outcome"], "end_action");
        assert_eq!(steps[5].info.fields["outcome"], "inactive");

        let state = steps[5].state.as_ref().unwrap();
        assert!(state.is_terminal());
        assert_eq!(state.features(), vec![1.0, 1.0, 1.0, 0.0, 1.0]);
        // Observation flags the session as already over.
        assert_relative_eq!(steps[5].observation.to_vec()[1], 1.0);
    }

    #[tokio::test]
    async fn test_end_without_category() {
        let mut session = WikicatSession::new(dataset(), &config(None)).unwrap();
        session.reset_to(1).unwrap();

        let steps = play(&mut session, &[0, 4]).await;
        assert_eq!(steps[1].info.fields["outcome"], "end_action_if_no_category_predicted");
    }

    #[tokio::test]
    async fn test_max_steps_forces_end() {
        let mut session = WikicatSession::new(dataset(), &config(Some(2))).unwrap();
        session.reset_to(1).unwrap();

        let steps = play(&mut session, &[3, 0, 1]).await;
        let rewards: Vec<f64> = steps.iter().map(|s| s.reward.value()).collect();
        // Category yes, then the final step scores as an end after a category.
        assert_eq!(rewards, vec![3.0, 0.0, 0.0]);
        assert!(steps[1].done);
        assert!(steps[1].truncated);
        assert_eq!(steps[1].info.fields["outcome"], "end_action");
        assert_eq!(
            steps[1].state.as_ref().map(|s| s.terminal),
            Some(Terminal::Truncated)
        );
        assert_eq!(steps[2].info.fields["outcome"], "inactive");
        assert_relative_eq!(steps[2].observation.data[1], 1.0);
    }

    #[tokio::test]
    async fn test_reset_draws_from_dataset() {
        let mut session = WikicatSession::new(dataset(), &config(None)).unwrap();
        let (observation, info) = session.reset().await.unwrap();

        assert_eq!(observation.data, vec![0.0; 7]);
        let row = session.musician().unwrap();
        assert_eq!(info.fields["row"], row);
        assert_eq!(info.fields["musician"], session.dataset.labels()[row]);
    }

    #[test]
    fn test_invalid_config() {
        assert!(WikicatSession::new(dataset(), &config(Some(0))).is_err());

        let empty = Arc::new(Dataset::from_reader(CSV.as_bytes(), 10).unwrap());
        assert!(matches!(
            WikicatSession::new(empty, &config(None)),
            Err(RLError::Dataset(_))
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_action() {
        let mut session = WikicatSession::new(dataset(), &config(None)).unwrap();
        session.reset_to(0).unwrap();
        assert!(matches!(
            session.step(DiscreteAction(9)).await,
            Err(RLError::InvalidAction(_))
        ));
    }
}
