//! Behaviour-space diverse planning over an SMT backend.
//!
//! Given a grounded planning task, a plan budget `k` and a quality bound
//! factor `q`, this crate enumerates up to `k` plans that are diverse along
//! user-selected behaviour features. The pipeline is: a bounded plan encoding
//! ([`encode`]), behaviour features layered on top of it ([`features`]), an
//! incremental behaviour space ([`space`]) and the forbidden-behaviour
//! iteration that drives the solver ([`fbi`]). The [`counter`] module offers
//! a model-free alternative that evaluates externally produced plans by
//! forward simulation.

pub mod counter;
pub mod encode;
pub mod env;
pub mod fbi;
pub mod features;
pub mod smt;
pub mod space;

use thiserror::Error;

/// Errors surfaced to the caller. Solver exhaustion and backend failures are
/// deliberately absent: they are logged and treated as unsat inside the
/// behaviour space.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),
    #[error("the optimal planner did not produce a seed plan")]
    NoSeedPlan,
    #[error("spec file parse error at line {line}: {msg}")]
    SpecParse { line: usize, msg: String },
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub use encode::EncoderKind;
pub use fbi::{Config, ForbidBehaviourIterative, SeedPlanner, UniformCostSeed};
pub use features::FeatureSpec;
pub use space::{BehaviourSpace, SmtPlan};
