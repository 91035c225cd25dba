//! Baseline agents for the wikicat environment
//!
//! Currently a uniform random agent, used as a reference point for the
//! rewards a learned questioner should beat.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod random;

pub use random::RandomAgent;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::RandomAgent;
    pub use wikicat_rl_core::prelude::*;
}
