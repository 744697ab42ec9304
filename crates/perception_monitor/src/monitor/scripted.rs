//! In-memory scripted population for tests and demos.
//!
//! `ScriptedAgent` plays the role of the external per-agent controller: it
//! owns its counters and voting buffer, clears the buffer itself at the
//! start of each tick, and replays pre-scripted decisions.

use std::collections::BTreeMap;

use crate::geometry::Location;
use super::probe::{AgentProbe, AgentSnapshot, Environment, StoredTuple, VotingDecision};
use super::types::{AgentId, Category, NodeId, Tick};

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedAgent {
    agent_id: AgentId,
    node_id: NodeId,
    storage_capacity: u32,
    routing_capacity: u32,
    message_count: u32,
    stored_tuple_count: u32,
    bytes_sent: u64,
    voting_decisions: Vec<VotingDecision>,
    stored_tuples: Vec<StoredTuple>,
    script: BTreeMap<Tick, Vec<VotingDecision>>,
}

impl ScriptedAgent {
    pub fn new(
        agent_id: impl Into<String>,
        node_id: NodeId,
        storage_capacity: u32,
        routing_capacity: u32,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            node_id,
            storage_capacity,
            routing_capacity,
            message_count: 0,
            stored_tuple_count: 0,
            bytes_sent: 0,
            voting_decisions: Vec::new(),
            stored_tuples: Vec::new(),
            script: BTreeMap::new(),
        }
    }

    /// Schedules a voting decision to be reported in the given tick.
    pub fn script_vote(&mut self, tick: Tick, decision: VotingDecision) {
        self.script.entry(tick).or_default().push(decision);
    }

    /// Simulates per-tick traffic accumulation.
    pub fn record_traffic(&mut self, messages: u32, bytes_sent: u64) {
        self.message_count += messages;
        self.bytes_sent += bytes_sent;
    }

    /// Replaces the local tuple store and its drained count.
    pub fn set_stored_tuples(&mut self, tuples: Vec<StoredTuple>) {
        self.stored_tuple_count = tuples.len() as u32;
        self.stored_tuples = tuples;
    }

    /// The agent's own per-tick work: clears the previous voting buffer
    /// (consumer-clears protocol, agent side) and loads this tick's
    /// scripted decisions.
    pub fn advance(&mut self, tick: Tick) {
        self.voting_decisions = self.script.remove(&tick).unwrap_or_default();
    }
}

impl AgentProbe for ScriptedAgent {
    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    fn node_id(&self) -> NodeId {
        self.node_id
    }

    fn storage_capacity(&self) -> u32 {
        self.storage_capacity
    }

    fn routing_capacity(&self) -> u32 {
        self.routing_capacity
    }

    fn read(&self) -> AgentSnapshot {
        AgentSnapshot {
            agent_id: self.agent_id.clone(),
            node_id: self.node_id,
            message_count: self.message_count,
            stored_tuple_count: self.stored_tuple_count,
            bytes_sent: self.bytes_sent,
            voting_decisions: self.voting_decisions.clone(),
            stored_tuples: self.stored_tuples.clone(),
        }
    }

    fn reset_counters(&mut self) {
        self.message_count = 0;
        self.bytes_sent = 0;
        self.stored_tuple_count = 0;
    }
}

/// A self-contained environment: clock, static objects, and a population
/// of scripted agents in fixed insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptedEnvironment {
    clock: Tick,
    objects: Vec<(Location, Category)>,
    agents: Vec<ScriptedAgent>,
}

impl ScriptedEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, location: Location, category: impl Into<String>) {
        self.objects.push((location, category.into()));
    }

    pub fn add_agent(&mut self, agent: ScriptedAgent) {
        self.agents.push(agent);
    }

    pub fn agent_mut(&mut self, agent_id: &str) -> Option<&mut ScriptedAgent> {
        self.agents
            .iter_mut()
            .find(|agent| agent.agent_id == agent_id)
    }

    /// Drops an agent mid-run; subsequent probes for it fail.
    pub fn remove_agent(&mut self, agent_id: &str) -> Option<ScriptedAgent> {
        let index = self
            .agents
            .iter()
            .position(|agent| agent.agent_id == agent_id)?;
        Some(self.agents.remove(index))
    }

    /// Advances the clock one step and runs each agent's own per-tick
    /// work, mirroring the driver contract: agents act first, the monitor
    /// observes afterwards.
    pub fn advance(&mut self) {
        self.clock = self.clock.saturating_add(1);
        for agent in &mut self.agents {
            agent.advance(self.clock);
        }
    }
}

impl Environment for ScriptedEnvironment {
    fn clock(&self) -> Tick {
        self.clock
    }

    fn objects(&self) -> Vec<(Location, Category)> {
        self.objects.clone()
    }

    fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|agent| agent.agent_id.clone()).collect()
    }

    fn probe_mut(&mut self, agent_id: &str) -> Option<&mut dyn AgentProbe> {
        self.agents
            .iter_mut()
            .find(|agent| agent.agent_id == agent_id)
            .map(|agent| agent as &mut dyn AgentProbe)
    }
}
