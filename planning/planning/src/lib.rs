//! Data model for grounded planning tasks.
//!
//! This crate holds everything that exists *before* any symbolic reasoning
//! happens: typed objects, grounded actions with boolean and numeric effects,
//! concrete states, forward simulation of sequential plans, and a small
//! uniform-cost search used to obtain an optimal seed plan.

pub mod demo;
pub mod plan;
pub mod search;
pub mod simulate;
pub mod state;
pub mod task;

pub use plan::{ActionInstance, SequentialPlan};
pub use state::State;
pub use task::{GroundedTask, TaskBuilder};
