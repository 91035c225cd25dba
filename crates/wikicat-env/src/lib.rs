//! Wikicat: a "20 questions" environment over Wikipedia musicians
//!
//! An agent polls boolean facts about a hidden musician. Facts are generic
//! attributes (decade active, instrument played, ...) or Wikipedia category
//! memberships; the agent may also end the session. This crate provides:
//! - [`WikicatEnv`], the batched state transition and per-session reward
//! - [`SessionBatch`], batched rollouts under an arbitrary policy
//! - [`WikicatSession`], a step-by-step [`Environment`] over one musician
//! - [`Dataset`], the CSV loader for musician facts

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dataset;
pub mod environment;
pub mod rewards;
pub mod rollout;
pub mod session;

pub use dataset::{Dataset, CATEGORY_PREFIX, DEFAULT_MIN_OCCURRENCES, END_ACTION_NAME};
pub use environment::WikicatEnv;
pub use rewards::{RewardKind, RewardOutcome, RewardTable, StepFacts};
pub use rollout::SessionBatch;
pub use session::{WikicatSession, DEFAULT_MAX_STEPS};

// Re-export core types
pub use wikicat_rl_core::{
    Action, ActionSpace, Environment, EnvironmentConfig, Episode, Observation, ObservationSpace,
    Reward, State, StateSpace, Step,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Dataset, RewardTable, SessionBatch, WikicatEnv, WikicatSession};
    pub use wikicat_rl_core::prelude::*;
}
