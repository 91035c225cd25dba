//! Environment traits and types

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Action, ActionSpace, Observation, ObservationSpace, Reward, State, StateSpace};

/// Result of a single environment step
#[derive(Debug, Clone)]
pub struct Step<O, S> {
    /// Observation from the environment
    pub observation: O,
    /// Reward signal
    pub reward: Reward,
    /// Whether the episode is done
    pub done: bool,
    /// Whether the episode was truncated (e.g., time limit)
    pub truncated: bool,
    /// Additional info from the environment
    pub info: StepInfo,
    /// Internal state (if available)
    pub state: Option<S>,
}

/// Additional information from a step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepInfo {
    /// Custom fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl StepInfo {
    /// Attach a field, replacing any previous value under `key`
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Episode information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Episode ID
    pub id: String,
    /// Total reward
    pub total_reward: f64,
    /// Number of steps
    pub steps: usize,
    /// Whether episode was truncated
    pub truncated: bool,
    /// Start time
    pub start_time: chrono::DateTime<chrono::Utc>,
    /// End time
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Configuration for environments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Random seed
    pub seed: Option<u64>,
    /// Maximum episode steps
    pub max_steps: Option<usize>,
    /// Additional parameters
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl EnvironmentConfig {
    /// Deserialize the extra parameter stored under `key`, if present
    pub fn param<T: DeserializeOwned>(&self, key: &str) -> crate::Result<Option<T>> {
        self.params
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(Into::into)
    }
}

/// Core environment trait
#[async_trait]
pub trait Environment: Send + Sync {
    /// Observation type
    type Observation: Observation;
    /// Action type
    type Action: Action;
    /// State type
    type State: State;

    /// Get the observation space
    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation>>;

    /// Get the action space
    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>>;

    /// Get the state space (if available)
    fn state_space(&self) -> Option<Box<dyn StateSpace<State = Self::State>>> {
        None
    }

    /// Reset the environment
    async fn reset(&mut self) -> crate::Result<(Self::Observation, StepInfo)>;

    /// Take a step in the environment
    async fn step(&mut self, action: Self::Action) -> crate::Result<Step<Self::Observation, Self::State>>;

    /// Render the environment (optional)
    async fn render(&self) -> crate::Result<()> {
        Ok(())
    }

    /// Close the environment
    async fn close(&mut self) -> crate::Result<()> {
        Ok(())
    }

    /// Get current episode info
    fn episode_info(&self) -> Option<Episode> {
        None
    }
}

/// Wrapper for environments that tracks episodes
pub struct TrackedEnvironment<E> {
    /// Inner environment
    pub env: E,
    /// Current episode
    pub episode: Option<Episode>,
    /// Step counter
    pub step_count: usize,
}

impl<E> TrackedEnvironment<E> {
    /// Create a new tracked environment
    pub fn new(env: E) -> Self {
        Self {
            env,
            episode: None,
            step_count: 0,
        }
    }
}

#[async_trait]
impl<E> Environment for TrackedEnvironment<E>
where
    E: Environment,
{
    type Observation = E::Observation;
    type Action = E::Action;
    type State = E::State;

    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation>> {
        self.env.observation_space()
    }

    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>> {
        self.env.action_space()
    }

    fn state_space(&self) -> Option<Box<dyn StateSpace<State = Self::State>>> {
        self.env.state_space()
    }

    async fn reset(&mut self) -> crate::Result<(Self::Observation, StepInfo)> {
        if let Some(ref mut episode) = self.episode {
            if episode.end_time.is_none() {
                episode.end_time = Some(chrono::Utc::now());
            }
        }

        let episode = Episode {
            id: uuid::Uuid::new_v4().to_string(),
            total_reward: 0.0,
            steps: 0,
            truncated: false,
            start_time: chrono::Utc::now(),
            end_time: None,
        };
        debug!(episode_id = %episode.id, "starting episode");
        self.episode = Some(episode);
        self.step_count = 0;

        self.env.reset().await
    }

    async fn step(&mut self, action: Self::Action) -> crate::Result<Step<Self::Observation, Self::State>> {
        let step = self.env.step(action).await?;

        self.step_count += 1;
        if let Some(ref mut episode) = self.episode {
            episode.total_reward += step.reward.value();
            episode.steps = self.step_count;

            if (step.done || step.truncated) && episode.end_time.is_none() {
                episode.truncated = step.truncated;
                episode.end_time = Some(chrono::Utc::now());
                debug!(
                    episode_id = %episode.id,
                    steps = episode.steps,
                    total_reward = episode.total_reward,
                    "episode finished"
                );
            }
        }

        Ok(step)
    }

    async fn render(&self) -> crate::Result<()> {
        self.env.render().await
    }

    async fn close(&mut self) -> crate::Result<()> {
        self.env.close().await
    }

    fn episode_info(&self) -> Option<Episode> {
        self.episode.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Terminal, VectorState};
    use crate::{BoxObservationSpace, DiscreteAction, DiscreteSpace, VectorObservation};
    use approx::assert_relative_eq;

    /// Counts down from three; every step pays 0.5.
    struct Countdown {
        left: usize,
    }

    #[async_trait]
    impl Environment for Countdown {
        type Observation = VectorObservation;
        type Action = DiscreteAction;
        type State = VectorState;

        fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation>> {
            Box::new(BoxObservationSpace::unit(1))
        }

        fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>> {
            Box::new(DiscreteSpace::new(1))
        }

        async fn reset(&mut self) -> crate::Result<(Self::Observation, StepInfo)> {
            self.left = 3;
            Ok((VectorObservation { data: vec![1.0] }, StepInfo::default()))
        }

        async fn step(&mut self, _action: Self::Action) -> crate::Result<Step<Self::Observation, Self::State>> {
            self.left -= 1;
            let done = self.left == 0;
            Ok(Step {
                observation: VectorObservation { data: vec![0.0] },
                reward: Reward(0.5),
                done,
                truncated: false,
                info: StepInfo::default(),
                state: Some(VectorState {
                    data: vec![],
                    terminal: if done { Terminal::Yes } else { Terminal::No },
                }),
            })
        }
    }

    #[tokio::test]
    async fn test_tracked_environment_accumulates_episode() {
        let mut env = TrackedEnvironment::new(Countdown { left: 0 });
        env.reset().await.unwrap();

        loop {
            let step = env.step(DiscreteAction(0)).await.unwrap();
            if step.done {
                break;
            }
        }

        let episode = env.episode_info().unwrap();
        assert_eq!(episode.steps, 3);
        assert_relative_eq!(episode.total_reward, 1.5);
        assert!(episode.end_time.is_some());
        assert!(!episode.truncated);
    }

    #[test]
    fn test_config_param() {
        let config: EnvironmentConfig = serde_json::from_value(serde_json::json!({
            "seed": 3,
            "rewards": { "repeated_poll": -2.0 },
        }))
        .unwrap();

        assert_eq!(config.seed, Some(3));
        let rewards: Option<serde_json::Value> = config.param("rewards").unwrap();
        assert!(rewards.is_some());
        let missing: Option<f64> = config.param("nope").unwrap();
        assert!(missing.is_none());
        assert!(config.param::<u32>("rewards").is_err());
    }

    #[test]
    fn test_config_extra_keys_land_in_params() {
        let config: EnvironmentConfig = serde_json::from_value(serde_json::json!({
            "max_steps": 10,
            "render_mode": "human",
        }))
        .unwrap();

        assert_eq!(config.max_steps, Some(10));
        assert_eq!(config.params.len(), 1);
        let mode: Option<String> = config.param("render_mode").unwrap();
        assert_eq!(mode.as_deref(), Some("human"));
    }

    #[test]
    fn test_step_info_with() {
        let info = StepInfo::default().with("action", 4);
        assert_eq!(info.fields["action"], 4);
    }
}
