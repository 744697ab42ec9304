//! Experiment controller: lifecycle, per-tick serialization, termination.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::{ConfigError, ExperimentConfig};
use super::aggregate::{AggregateError, Aggregator, TickSummary};
use super::output::{DetailLog, HistogramLog};
use super::probe::{drain, AgentSnapshot, Environment};
use super::registry::{Coverage, ObjectRegistry, RegistryError};
use super::types::{AgentId, Tick};

/// Lifecycle of a run. Setup constructs directly into `Running`; the
/// uninitialized state is simply the absence of a controller value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentPhase {
    Running,
    Finished,
    Closed,
}

/// Outcome of one tick, handed back to the external driver.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: Tick,
    pub summary: TickSummary,
    pub coverage: Coverage,
    /// Termination signal: when true the driver must stop advancing the
    /// environment; no further ticks are processed.
    pub finished: bool,
}

/// Drives the per-tick monitor loop: drains every agent once, aggregates,
/// serializes the tick's record sets, and evaluates the termination
/// predicate. Owns both output streams exclusively.
#[derive(Debug)]
pub struct ExperimentController<W: Write> {
    config: ExperimentConfig,
    registry: ObjectRegistry,
    aggregator: Aggregator,
    /// Fixed enumeration order for the whole run, captured at setup.
    agent_order: Vec<AgentId>,
    total_routing_capacity: u64,
    detail_log: DetailLog<W>,
    histogram_log: HistogramLog<W>,
    phase: ExperimentPhase,
}

impl ExperimentController<BufWriter<File>> {
    /// Sets up a run with file-backed logs in the current directory, named
    /// deterministically from the config and population size.
    pub fn setup(
        config: ExperimentConfig,
        env: &mut dyn Environment,
    ) -> Result<Self, MonitorError> {
        Self::setup_in(".", config, env)
    }

    /// Sets up a run with file-backed logs under `dir`.
    pub fn setup_in(
        dir: impl AsRef<Path>,
        config: ExperimentConfig,
        env: &mut dyn Environment,
    ) -> Result<Self, MonitorError> {
        let dir = dir.as_ref();
        let population = env.agent_ids().len();
        let detail_log = DetailLog::create(dir.join(config.detail_log_name(population)))?;
        let histogram_log =
            HistogramLog::create(dir.join(config.histogram_log_name(population)))?;
        Self::setup_with_sinks(config, env, detail_log, histogram_log)
    }
}

impl<W: Write> ExperimentController<W> {
    /// Sets up a run against caller-provided sinks. Tests use in-memory
    /// buffers here; the file-backed constructors delegate to this.
    pub fn setup_with_sinks(
        config: ExperimentConfig,
        env: &mut dyn Environment,
        detail_log: DetailLog<W>,
        histogram_log: HistogramLog<W>,
    ) -> Result<Self, MonitorError> {
        config.validate()?;

        let registry = ObjectRegistry::register_objects(env.objects())?;
        let agent_order = env.agent_ids();

        let mut total_storage_capacity = 0u64;
        let mut total_routing_capacity = 0u64;
        for agent_id in &agent_order {
            let probe = env
                .probe_mut(agent_id)
                .ok_or_else(|| MonitorError::AgentUnavailable {
                    agent_id: agent_id.clone(),
                })?;
            total_storage_capacity += u64::from(probe.storage_capacity());
            total_routing_capacity += u64::from(probe.routing_capacity());
            // Start the run from a clean slate, like the agents themselves
            // do between configurations.
            probe.reset_counters();
        }
        let aggregator = Aggregator::new(total_storage_capacity)?;

        let mut controller = Self {
            config,
            registry,
            aggregator,
            agent_order,
            total_routing_capacity,
            detail_log,
            histogram_log,
            phase: ExperimentPhase::Running,
        };
        controller
            .detail_log
            .write_header(controller.registry.object_count())?;
        controller
            .histogram_log
            .write_header(controller.agent_order.len())?;
        Ok(controller)
    }

    pub fn phase(&self) -> ExperimentPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase != ExperimentPhase::Running
    }

    pub fn population(&self) -> usize {
        self.agent_order.len()
    }

    pub fn coverage(&self) -> Coverage {
        self.registry.coverage()
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn total_storage_capacity(&self) -> u64 {
        self.aggregator.total_storage_capacity()
    }

    pub fn total_routing_capacity(&self) -> u64 {
        self.total_routing_capacity
    }

    /// Runs one tick: drain, aggregate, serialize, evaluate termination.
    ///
    /// Called by the external driver exactly once per simulation step,
    /// strictly after all agents have completed their own computation. Any
    /// failure inside the tick fails the whole run; there is no per-agent
    /// retry or skip.
    pub fn step(&mut self, env: &mut dyn Environment) -> Result<TickReport, MonitorError> {
        match self.phase {
            ExperimentPhase::Running => {}
            ExperimentPhase::Finished => return Err(MonitorError::ExperimentFinished),
            ExperimentPhase::Closed => return Err(MonitorError::StreamClosed),
        }

        let tick = env.clock();

        let mut snapshots: Vec<AgentSnapshot> = Vec::with_capacity(self.agent_order.len());
        for agent_id in &self.agent_order {
            let probe = env
                .probe_mut(agent_id)
                .ok_or_else(|| MonitorError::AgentUnavailable {
                    agent_id: agent_id.clone(),
                })?;
            snapshots.push(drain(probe));
        }

        let summary = self
            .aggregator
            .aggregate(tick, &snapshots, &mut self.registry);

        self.detail_log.begin_tick(tick, self.agent_order.len())?;
        self.histogram_log.begin_tick(tick)?;
        for snapshot in &snapshots {
            self.detail_log.write_agent(snapshot, &self.registry)?;
            self.histogram_log
                .write_agent(snapshot.node_id, &snapshot.stored_tuples)?;
        }
        self.detail_log
            .end_tick(summary.storage_load, summary.total_bytes_sent)?;

        let coverage = self.registry.coverage();
        let finished = coverage.is_complete() || tick > self.config.max_ticks;
        if finished {
            self.phase = ExperimentPhase::Finished;
        }

        Ok(TickReport {
            tick,
            summary,
            coverage,
            finished,
        })
    }

    /// Teardown: flushes and closes both streams. Any further step fails
    /// with `StreamClosed`.
    pub fn finish(&mut self) -> Result<(), MonitorError> {
        if self.phase == ExperimentPhase::Closed {
            return Err(MonitorError::StreamClosed);
        }
        self.detail_log.flush()?;
        self.histogram_log.flush()?;
        self.phase = ExperimentPhase::Closed;
        Ok(())
    }

    /// Consumes the controller and returns both log streams, for callers
    /// that need the underlying sinks back after teardown.
    pub fn into_logs(self) -> (DetailLog<W>, HistogramLog<W>) {
        (self.detail_log, self.histogram_log)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MonitorError {
    Config(ConfigError),
    Registry(RegistryError),
    Aggregate(AggregateError),
    Io(String),
    AgentUnavailable { agent_id: AgentId },
    ExperimentFinished,
    StreamClosed,
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::Config(err) => write!(f, "configuration error: {err}"),
            MonitorError::Registry(err) => write!(f, "registry error: {err}"),
            MonitorError::Aggregate(err) => write!(f, "configuration error: {err}"),
            MonitorError::Io(message) => write!(f, "log stream I/O failed: {message}"),
            MonitorError::AgentUnavailable { agent_id } => {
                write!(f, "agent unavailable: {agent_id}")
            }
            MonitorError::ExperimentFinished => {
                write!(f, "experiment already finished; no further ticks")
            }
            MonitorError::StreamClosed => write!(f, "log streams already closed"),
        }
    }
}

impl Error for MonitorError {}

impl From<ConfigError> for MonitorError {
    fn from(err: ConfigError) -> Self {
        MonitorError::Config(err)
    }
}

impl From<RegistryError> for MonitorError {
    fn from(err: RegistryError) -> Self {
        MonitorError::Registry(err)
    }
}

impl From<AggregateError> for MonitorError {
    fn from(err: AggregateError) -> Self {
        MonitorError::Aggregate(err)
    }
}

impl From<io::Error> for MonitorError {
    fn from(err: io::Error) -> Self {
        MonitorError::Io(err.to_string())
    }
}
