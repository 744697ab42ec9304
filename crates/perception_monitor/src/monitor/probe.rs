//! Agent snapshot interface: the drain-and-zero contract between the
//! monitor and the per-agent controllers it observes.

use serde::{Deserialize, Serialize};

use crate::geometry::Location;
use super::types::{AgentId, Category, NodeId, Tick};

/// Timing of one opinion: when the agent first formed it and when it last
/// updated it before finalizing the vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTiming {
    pub start: Tick,
    pub last_update: Tick,
}

impl VoteTiming {
    pub fn elapsed(&self) -> Tick {
        self.last_update.saturating_sub(self.start)
    }
}

/// A finalized opinion about one object, reported by an agent in the tick
/// it was decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingDecision {
    pub location: Location,
    pub category: Category,
    pub radius: f64,
    pub timing: VoteTiming,
}

/// One opinion currently held in an agent's bounded local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTuple {
    pub identifier: u64,
    pub hash: u64,
}

/// Read-through copy of one agent's per-tick accumulators and buffers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: AgentId,
    pub node_id: NodeId,
    pub message_count: u32,
    pub stored_tuple_count: u32,
    pub bytes_sent: u64,
    /// Voting decisions since the last snapshot. The buffer itself is owned
    /// and cleared by the agent; this is a copy, and may be empty.
    pub voting_decisions: Vec<VotingDecision>,
    pub stored_tuples: Vec<StoredTuple>,
}

/// Read-and-reset access to one agent's per-tick state.
///
/// The read/reset split keeps the drain an explicit two-phase contract: an
/// implementer can make the pair atomic, or add a lock, if agents ever
/// become concurrently mutated.
pub trait AgentProbe {
    /// Stable identifier used in the detail log.
    fn agent_id(&self) -> &str;

    /// Stable node id used in the histogram log, distinct from the
    /// identifier above.
    fn node_id(&self) -> NodeId;

    /// Static storage capacity, fixed at setup.
    fn storage_capacity(&self) -> u32;

    /// Static routing capacity, fixed at setup.
    fn routing_capacity(&self) -> u32;

    /// Reads the current accumulators and buffers without mutating them.
    fn read(&self) -> AgentSnapshot;

    /// Zeroes the drainable counters: message count, bytes sent, and
    /// stored-tuple count. Event buffers are left to the agent.
    fn reset_counters(&mut self);
}

/// Read-then-reset. Must be called exactly once per agent per tick: a
/// second call in the same tick yields already-zeroed counters and a stale
/// event list.
pub fn drain(probe: &mut dyn AgentProbe) -> AgentSnapshot {
    let snapshot = probe.read();
    probe.reset_counters();
    snapshot
}

/// The simulation environment as the monitor consumes it: a monotonic
/// clock, one-shot object and agent enumeration, and per-tick probe access.
pub trait Environment {
    /// Current simulation clock value, read at the start of every tick.
    fn clock(&self) -> Tick;

    /// Static object descriptors, enumerated once at setup.
    fn objects(&self) -> Vec<(Location, Category)>;

    /// Agent handles, enumerated once at setup. The returned order is the
    /// fixed enumeration order for the whole run.
    fn agent_ids(&self) -> Vec<AgentId>;

    /// Probe for one agent, or `None` if the handle is no longer valid.
    fn probe_mut(&mut self, agent_id: &str) -> Option<&mut dyn AgentProbe>;
}
