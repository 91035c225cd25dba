//! Core reinforcement learning traits and types for wikicat
//!
//! This crate provides the foundational abstractions shared by the
//! wikicat environment and agents: spaces, steps, episodes and errors.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod agent;
pub mod environment;
pub mod error;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod state;
pub mod trajectory;

// Re-export core traits and types
pub use action::{Action, ActionSpace, DiscreteAction, DiscreteSpace};
pub use agent::{Agent, AgentConfig};
pub use environment::{Environment, EnvironmentConfig, Episode, Step, StepInfo, TrackedEnvironment};
pub use error::{RLError, Result};
pub use observation::{BoxObservationSpace, Observation, ObservationSpace, VectorObservation};
pub use policy::Policy;
pub use reward::Reward;
pub use state::{BinarySpace, State, StateSpace, Terminal, VectorState};
pub use trajectory::{Trajectory, Transition};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, ActionSpace, Agent, DiscreteAction, DiscreteSpace, Environment, Observation,
        ObservationSpace, Policy, Result, Reward, State, Step,
    };
}
