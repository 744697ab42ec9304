pub mod config;
pub mod geometry;
pub mod monitor;

pub use config::{ConfigError, ExperimentConfig, DEFAULT_TICK_CEILING};
pub use geometry::{Location, LocationKey};
pub use monitor::types::{AgentId, Category, NodeId, ObjectId, Tick};

pub use monitor::{
    drain, AgentProbe, AgentSnapshot, AggregateError, Aggregator, Coverage, DetailLog,
    Environment, ExperimentController, ExperimentPhase, HistogramLog, MonitorError, ObjectRecord,
    ObjectRegistry, RegistryError, StoredTuple, TickReport, TickSummary, VoteOutcome, VoteTiming,
    VotingDecision,
};

// Scripted population (in-memory test/demo double)
pub use monitor::{ScriptedAgent, ScriptedEnvironment};
