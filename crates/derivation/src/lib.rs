//! Achievement status derivation.
//!
//! A small state machine that turns a goal's observation history into an
//! achievement status, invoked from the write path after each observation.

#![warn(missing_docs)]

pub mod rules;
mod engine;

pub use engine::{AchievementEngine, DerivationError};
pub use rules::{qualitative_status, quantitative_status};
