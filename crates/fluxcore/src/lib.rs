pub mod common;

pub mod client;
pub mod config;
pub mod events;
pub mod policy;
pub mod resources;
pub mod simulation;
pub mod stats;
pub mod task;

#[cfg(test)]
pub(crate) mod tests;

pub use crate::client::{ClientId, ClientKind, ClientRequest};
pub use crate::policy::{AbandonReason, AllocationMode, AllocationOutcome};
pub use crate::simulation::{Simulation, SimulationSummary};
pub use crate::stats::SimulationStats;

pub type Error = common::error::FluxError;
pub type Result<T> = std::result::Result<T, Error>;
