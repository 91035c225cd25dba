//! Policy abstractions for action selection

use async_trait::async_trait;

use crate::{Action, Observation};

/// Core policy trait for selecting actions
#[async_trait]
pub trait Policy: Send + Sync {
    /// Observation type
    type Observation: Observation;
    /// Action type
    type Action: Action;

    /// Select an action given an observation
    async fn act(&self, observation: &Self::Observation) -> crate::Result<Self::Action>;
}
