//! Experiment monitor - measurement and convergence detection for a
//! collective-perception run.
//!
//! This module is organized into submodules:
//! - `types`: Core type definitions (IDs, ticks, categories)
//! - `registry`: ObjectRegistry (ground truth, voted categories, coverage)
//! - `probe`: AgentProbe / Environment traits and the drain contract
//! - `aggregate`: Aggregator folding snapshots into tick summaries
//! - `output`: detail and histogram log streams
//! - `controller`: ExperimentController lifecycle and termination
//! - `scripted`: in-memory scripted population for tests and demos

mod aggregate;
mod controller;
mod output;
mod probe;
mod registry;
mod scripted;
pub mod types;


pub use aggregate::{AggregateError, Aggregator, TickSummary};
pub use controller::{ExperimentController, ExperimentPhase, MonitorError, TickReport};
pub use output::{DetailLog, HistogramLog};
pub use probe::{
    drain, AgentProbe, AgentSnapshot, Environment, StoredTuple, VoteTiming, VotingDecision,
};
pub use registry::{Coverage, ObjectRecord, ObjectRegistry, RegistryError, VoteOutcome};
pub use scripted::{ScriptedAgent, ScriptedEnvironment};
