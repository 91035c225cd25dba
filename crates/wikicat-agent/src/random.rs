//! Random agent for baseline comparisons

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;
use tracing::debug;

use wikicat_rl_core::{
    Agent, AgentConfig, DiscreteAction, DiscreteSpace, Observation, Policy, RLError,
};

/// Random agent that selects actions uniformly at random
pub struct RandomAgent<O> {
    /// Configuration
    config: AgentConfig,
    /// Random policy
    policy: RandomPolicy<O>,
}

/// Uniform policy over a discrete space
struct RandomPolicy<O> {
    action_space: DiscreteSpace,
    rng: Mutex<StdRng>,
    _observation: std::marker::PhantomData<fn(&O)>,
}

impl<O> RandomPolicy<O> {
    fn new(action_space: DiscreteSpace, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            action_space,
            rng: Mutex::new(rng),
            _observation: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<O: Observation> Policy for RandomPolicy<O> {
    type Observation = O;
    type Action = DiscreteAction;

    async fn act(&self, _observation: &Self::Observation) -> wikicat_rl_core::Result<Self::Action> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| RLError::Agent("random policy generator poisoned".to_string()))?;
        Ok(self.action_space.sample_with(&mut *rng))
    }
}

impl<O> RandomAgent<O> {
    /// Create a new random agent
    #[must_use]
    pub fn new(action_space: DiscreteSpace) -> Self {
        Self::with_config(action_space, AgentConfig::default())
    }

    /// Create a random agent; `config.seed` makes its choices reproducible
    #[must_use]
    pub fn with_config(action_space: DiscreteSpace, config: AgentConfig) -> Self {
        let policy = RandomPolicy::new(action_space, config.seed);
        Self { config, policy }
    }

    /// Agent configuration
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

#[async_trait]
impl<O: Observation + 'static> Agent for RandomAgent<O> {
    type Observation = O;
    type Action = DiscreteAction;

    fn policy(&self) -> &dyn Policy<Observation = Self::Observation, Action = Self::Action> {
        &self.policy
    }

    async fn save(&self, path: &std::path::Path) -> wikicat_rl_core::Result<()> {
        let json = serde_json::to_string_pretty(&self.config)?;
        tokio::fs::write(path, json).await?;
        debug!(path = %path.display(), "saved random agent config");
        Ok(())
    }

    async fn load(&mut self, path: &std::path::Path) -> wikicat_rl_core::Result<()> {
        let json = tokio::fs::read_to_string(path).await?;
        self.config = serde_json::from_str(&json)?;
        self.policy = RandomPolicy::new(self.policy.action_space.clone(), self.config.seed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikicat_rl_core::{ActionSpace, VectorObservation};

    fn seeded(seed: u64) -> RandomAgent<VectorObservation> {
        let config = AgentConfig {
            seed: Some(seed),
            ..AgentConfig::default()
        };
        RandomAgent::with_config(DiscreteSpace::new(6), config)
    }

    async fn draw(agent: &RandomAgent<VectorObservation>, n: usize) -> Vec<DiscreteAction> {
        let observation = VectorObservation { data: vec![] };
        let mut actions = Vec::with_capacity(n);
        for _ in 0..n {
            actions.push(agent.act(&observation).await.unwrap());
        }
        actions
    }

    #[tokio::test]
    async fn test_actions_in_space() {
        let agent = seeded(3);
        let space = DiscreteSpace::new(6);
        assert!(draw(&agent, 50).await.iter().all(|a| space.contains(a)));
    }

    #[tokio::test]
    async fn test_seed_is_reproducible() {
        assert_eq!(draw(&seeded(9), 20).await, draw(&seeded(9), 20).await);
    }

    #[tokio::test]
    async fn test_save_and_load_restore_seed() {
        let path = std::env::temp_dir().join(format!("wikicat-agent-{}.json", uuid::Uuid::new_v4()));
        seeded(42).save(&path).await.unwrap();

        let mut restored = RandomAgent::<VectorObservation>::new(DiscreteSpace::new(6));
        restored.load(&path).await.unwrap();
        assert_eq!(restored.config().seed, Some(42));
        assert_eq!(draw(&restored, 10).await, draw(&seeded(42), 10).await);

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
