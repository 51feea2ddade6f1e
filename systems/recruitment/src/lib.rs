#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Recruitment system that samples combatant stats, rolls gear and plans
//! how new combatants are placed on the battlefield.

mod factory;
mod manual;
mod muster;
mod sampler;

use thiserror::Error;

pub use factory::{CombatantFactory, FactoryConfig};
pub use manual::{parse_flag, LineInput, ManualEntry, MAX_ATTEMPTS};
pub use muster::{rally_point, Muster, FORMATION_JITTER};
pub use sampler::{BoundedNormal, SamplerError};

/// Errors raised while configuring recruitment.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum RecruitmentError {
    /// A stat sampler could not be built.
    #[error(transparent)]
    Sampler(#[from] SamplerError),
    /// A trait probability lies outside `[0, 1]`.
    #[error("trait chance {chance} must lie within [0, 1]")]
    InvalidChance {
        /// Rejected probability.
        chance: f64,
    },
}
