//! Core type definitions shared across the monitor.

pub type Tick = u64;
pub type AgentId = String;
pub type NodeId = u64;
pub type Category = String;

/// Registration identity of a perceivable object, assigned monotonically
/// when the registry is built. The physical `Location` is an attribute.
pub type ObjectId = u32;
