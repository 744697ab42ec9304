//! Tick-level aggregation of drained agent snapshots.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

use super::probe::AgentSnapshot;
use super::registry::ObjectRegistry;
use super::types::Tick;

/// Totals for one tick across the whole population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    pub tick: Tick,
    pub total_messages: u64,
    pub total_stored_tuples: u64,
    pub total_bytes_sent: u64,
    /// Stored tuples over total storage capacity; in `[0, 1]` as long as
    /// no agent exceeds its own capacity.
    pub storage_load: f64,
}

/// Folds per-agent snapshots into tick totals and feeds voting decisions
/// into the registry. Pure aggregation; performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregator {
    total_storage_capacity: u64,
}

impl Aggregator {
    /// Total capacity is the setup-time sum of all agents' storage
    /// capacities. Zero is a configuration error, caught here so the tick
    /// loop never divides by zero.
    pub fn new(total_storage_capacity: u64) -> Result<Self, AggregateError> {
        if total_storage_capacity == 0 {
            return Err(AggregateError::ZeroStorageCapacity);
        }
        Ok(Self {
            total_storage_capacity,
        })
    }

    pub fn total_storage_capacity(&self) -> u64 {
        self.total_storage_capacity
    }

    /// Folds the snapshots of one tick. Votes are recorded in snapshot
    /// order, then event order within each snapshot; when several agents
    /// vote on the same location in one tick, the last in that order wins.
    pub fn aggregate(
        &self,
        tick: Tick,
        snapshots: &[AgentSnapshot],
        registry: &mut ObjectRegistry,
    ) -> TickSummary {
        let mut total_messages = 0u64;
        let mut total_stored_tuples = 0u64;
        let mut total_bytes_sent = 0u64;

        for snapshot in snapshots {
            total_messages += u64::from(snapshot.message_count);
            total_stored_tuples += u64::from(snapshot.stored_tuple_count);
            total_bytes_sent += snapshot.bytes_sent;

            for decision in &snapshot.voting_decisions {
                registry.record_vote(decision.location, decision.category.clone());
            }
        }

        TickSummary {
            tick,
            total_messages,
            total_stored_tuples,
            total_bytes_sent,
            storage_load: total_stored_tuples as f64 / self.total_storage_capacity as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateError {
    ZeroStorageCapacity,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateError::ZeroStorageCapacity => {
                write!(f, "total storage capacity is zero")
            }
        }
    }
}

impl Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Location;
    use crate::monitor::probe::{VoteTiming, VotingDecision};

    fn snapshot(agent_id: &str, votes: Vec<VotingDecision>) -> AgentSnapshot {
        AgentSnapshot {
            agent_id: agent_id.to_string(),
            node_id: 0,
            message_count: 2,
            stored_tuple_count: 3,
            bytes_sent: 10,
            voting_decisions: votes,
            stored_tuples: Vec::new(),
        }
    }

    fn vote(location: Location, category: &str) -> VotingDecision {
        VotingDecision {
            location,
            category: category.to_string(),
            radius: 0.5,
            timing: VoteTiming {
                start: 0,
                last_update: 4,
            },
        }
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            Aggregator::new(0).unwrap_err(),
            AggregateError::ZeroStorageCapacity
        );
    }

    #[test]
    fn totals_fold_across_snapshots() {
        let mut registry = ObjectRegistry::register_objects(vec![(
            Location::new(1.0, 0.0, 0.0),
            "A".to_string(),
        )])
        .unwrap();
        let aggregator = Aggregator::new(12).unwrap();
        let snapshots = vec![
            snapshot("agent-0", Vec::new()),
            snapshot("agent-1", Vec::new()),
        ];
        let summary = aggregator.aggregate(1, &snapshots, &mut registry);
        assert_eq!(summary.total_messages, 4);
        assert_eq!(summary.total_stored_tuples, 6);
        assert_eq!(summary.total_bytes_sent, 20);
        assert_eq!(summary.storage_load, 0.5);
    }

    #[test]
    fn enumeration_order_breaks_same_tick_vote_ties() {
        let location = Location::new(1.0, 0.0, 0.0);
        let mut registry =
            ObjectRegistry::register_objects(vec![(location, "A".to_string())]).unwrap();
        let aggregator = Aggregator::new(10).unwrap();
        let snapshots = vec![
            snapshot("agent-0", vec![vote(location, "A"), vote(location, "B")]),
            snapshot("agent-1", vec![vote(location, "C")]),
        ];
        aggregator.aggregate(1, &snapshots, &mut registry);
        // Last agent in enumeration order, last event in its list.
        assert_eq!(registry.voted_category(&location), Some("C"));
        assert_eq!(registry.coverage().voted, 1);
    }

    #[test]
    fn storage_load_stays_within_bounds_at_capacity() {
        let mut registry = ObjectRegistry::register_objects(Vec::new()).unwrap();
        let aggregator = Aggregator::new(6).unwrap();
        let snapshots = vec![
            snapshot("agent-0", Vec::new()),
            snapshot("agent-1", Vec::new()),
        ];
        let summary = aggregator.aggregate(1, &snapshots, &mut registry);
        assert_eq!(summary.storage_load, 1.0);
    }
}
