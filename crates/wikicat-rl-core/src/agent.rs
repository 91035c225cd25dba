//! Agent traits and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Action, Observation, Policy};

/// Configuration for agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Random seed for stochastic agents
    pub seed: Option<u64>,
    /// Discount factor used when summarising returns
    pub gamma: f64,
    /// Additional parameters
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            seed: None,
            gamma: 0.99,
            params: serde_json::Map::new(),
        }
    }
}

/// Core agent trait
#[async_trait]
pub trait Agent: Send + Sync {
    /// Observation type
    type Observation: Observation;
    /// Action type
    type Action: Action;

    /// Get the agent's policy
    fn policy(&self) -> &dyn Policy<Observation = Self::Observation, Action = Self::Action>;

    /// Select an action given an observation
    async fn act(&self, observation: &Self::Observation) -> crate::Result<Self::Action> {
        self.policy().act(observation).await
    }

    /// Save the agent
    async fn save(&self, path: &std::path::Path) -> crate::Result<()>;

    /// Load the agent
    async fn load(&mut self, path: &std::path::Path) -> crate::Result<()>;
}
