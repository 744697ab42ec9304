//! Append-only sequential log streams: the per-event detail log and the
//! per-agent histogram log.
//!
//! Both formats are flat whitespace-separated text, one record set per
//! tick, so convergence curves, load curves, and opinion-propagation
//! histograms can be reconstructed offline with line-oriented tooling.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::probe::{AgentSnapshot, StoredTuple};
use super::registry::ObjectRegistry;
use super::types::{NodeId, Tick};

/// Ground-truth field written when a vote references a location that was
/// never registered as an object.
const UNKNOWN_CATEGORY: &str = "-";

/// Detail log: header `<objectCount>`; per tick `<tick> <population>`, per
/// agent `<agentId> <eventCount>` plus one line per voting decision, then a
/// trailing `<storageLoad> <totalBytesSent>` line.
#[derive(Debug)]
pub struct DetailLog<W: Write> {
    out: W,
}

impl DetailLog<BufWriter<File>> {
    /// Opens the file truncate-on-open, so repeated runs with identical
    /// parameters overwrite the same artifact.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> DetailLog<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_header(&mut self, object_count: usize) -> io::Result<()> {
        writeln!(self.out, "{object_count}")
    }

    pub fn begin_tick(&mut self, tick: Tick, population: usize) -> io::Result<()> {
        writeln!(self.out, "{tick} {population}")
    }

    pub fn write_agent(
        &mut self,
        snapshot: &AgentSnapshot,
        registry: &ObjectRegistry,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            "{} {}",
            snapshot.agent_id,
            snapshot.voting_decisions.len()
        )?;
        for decision in &snapshot.voting_decisions {
            let true_category = registry
                .true_category(&decision.location)
                .unwrap_or(UNKNOWN_CATEGORY);
            writeln!(
                self.out,
                "{} {} {} {} {} {} {}",
                decision.category,
                true_category,
                decision.radius,
                decision.timing.elapsed(),
                decision.location.x,
                decision.location.y,
                decision.location.z
            )?;
        }
        Ok(())
    }

    pub fn end_tick(&mut self, storage_load: f64, total_bytes_sent: u64) -> io::Result<()> {
        writeln!(self.out, "{storage_load} {total_bytes_sent}")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Consumes the log and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Histogram log: header `<population>`; per tick `<tick>`, per agent
/// `<nodeId> <storedTupleCount>` plus one `<identifier> <hash>` line per
/// stored tuple.
#[derive(Debug)]
pub struct HistogramLog<W: Write> {
    out: W,
}

impl HistogramLog<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> HistogramLog<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_header(&mut self, population: usize) -> io::Result<()> {
        writeln!(self.out, "{population}")
    }

    pub fn begin_tick(&mut self, tick: Tick) -> io::Result<()> {
        writeln!(self.out, "{tick}")
    }

    pub fn write_agent(&mut self, node_id: NodeId, tuples: &[StoredTuple]) -> io::Result<()> {
        writeln!(self.out, "{} {}", node_id, tuples.len())?;
        for tuple in tuples {
            writeln!(self.out, "{} {}", tuple.identifier, tuple.hash)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Consumes the log and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}
