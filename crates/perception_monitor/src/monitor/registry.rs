//! Object registry: ground truth and the evolving voted-category map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use crate::geometry::{Location, LocationKey};
use super::types::{Category, ObjectId};

/// One registered object. Created at setup, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: ObjectId,
    pub location: Location,
    pub true_category: Category,
}

/// Coverage of the registered object set by recorded votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    /// Distinct registered objects that have received at least one vote.
    pub voted: usize,
    /// Total registered objects.
    pub registered: usize,
}

impl Coverage {
    pub fn is_complete(&self) -> bool {
        self.voted == self.registered
    }

    pub fn ratio(&self) -> f64 {
        if self.registered == 0 {
            return 1.0;
        }
        self.voted as f64 / self.registered as f64
    }
}

/// Where a recorded vote landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The location matched a registered object.
    Registered { object_id: ObjectId },
    /// The location was never registered; the vote is retained but does
    /// not count toward coverage.
    Stray,
}

/// Maps each object's capture-time location to its true category, and owns
/// the last-writer-wins map of voted categories.
///
/// Built once per experiment run; never a process-wide singleton, so batch
/// tests can run several experiments in one process.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRegistry {
    objects: Vec<ObjectRecord>,
    by_location: BTreeMap<LocationKey, ObjectId>,
    voted: BTreeMap<ObjectId, Category>,
    stray_votes: BTreeMap<LocationKey, Category>,
}

impl ObjectRegistry {
    /// Builds the registry from the environment's one-shot object
    /// enumeration. Two objects sharing an exact location are a setup
    /// error: the run could never attribute votes between them.
    pub fn register_objects(
        descriptors: Vec<(Location, Category)>,
    ) -> Result<Self, RegistryError> {
        let mut objects = Vec::with_capacity(descriptors.len());
        let mut by_location = BTreeMap::new();
        for (location, true_category) in descriptors {
            let id = objects.len() as ObjectId;
            if by_location.insert(location.key(), id).is_some() {
                return Err(RegistryError::DuplicateLocation { location });
            }
            objects.push(ObjectRecord {
                id,
                location,
                true_category,
            });
        }
        Ok(Self {
            objects,
            by_location,
            voted: BTreeMap::new(),
            stray_votes: BTreeMap::new(),
        })
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn objects(&self) -> &[ObjectRecord] {
        &self.objects
    }

    pub fn lookup(&self, location: &Location) -> Option<&ObjectRecord> {
        let id = self.by_location.get(&location.key())?;
        self.objects.get(*id as usize)
    }

    /// Ground-truth category for a location, if it was registered.
    pub fn true_category(&self, location: &Location) -> Option<&str> {
        self.lookup(location).map(|record| record.true_category.as_str())
    }

    /// Most recently voted category for a location, registered or stray.
    pub fn voted_category(&self, location: &Location) -> Option<&str> {
        let key = location.key();
        if let Some(id) = self.by_location.get(&key) {
            return self.voted.get(id).map(String::as_str);
        }
        self.stray_votes.get(&key).map(String::as_str)
    }

    /// Upsert, last writer wins. Votes for unregistered locations are
    /// retained as strays instead of failing the run mid-experiment.
    pub fn record_vote(&mut self, location: Location, category: Category) -> VoteOutcome {
        let key = location.key();
        match self.by_location.get(&key) {
            Some(&object_id) => {
                self.voted.insert(object_id, category);
                VoteOutcome::Registered { object_id }
            }
            None => {
                self.stray_votes.insert(key, category);
                VoteOutcome::Stray
            }
        }
    }

    /// Voted-over-registered ratio; the convergence signal. Entries are
    /// only ever added, so this is non-decreasing tick over tick.
    pub fn coverage(&self) -> Coverage {
        Coverage {
            voted: self.voted.len(),
            registered: self.objects.len(),
        }
    }

    pub fn stray_vote_count(&self) -> usize {
        self.stray_votes.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    DuplicateLocation { location: Location },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateLocation { location } => write!(
                f,
                "two objects registered at the same location ({}, {}, {})",
                location.x, location.y, location.z
            ),
        }
    }
}

impl Error for RegistryError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_two_objects() -> ObjectRegistry {
        ObjectRegistry::register_objects(vec![
            (Location::new(1.0, 0.0, 0.0), "A".to_string()),
            (Location::new(2.0, 0.0, 0.0), "B".to_string()),
        ])
        .unwrap()
    }

    #[test]
    fn registration_assigns_monotonic_ids() {
        let registry = registry_with_two_objects();
        assert_eq!(registry.object_count(), 2);
        assert_eq!(registry.objects()[0].id, 0);
        assert_eq!(registry.objects()[1].id, 1);
        assert_eq!(
            registry.true_category(&Location::new(2.0, 0.0, 0.0)),
            Some("B")
        );
    }

    #[test]
    fn duplicate_location_fails_at_setup() {
        let err = ObjectRegistry::register_objects(vec![
            (Location::new(1.0, 2.0, 3.0), "A".to_string()),
            (Location::new(1.0, 2.0, 3.0), "B".to_string()),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateLocation { .. }));
    }

    #[test]
    fn record_vote_is_last_writer_wins() {
        let mut registry = registry_with_two_objects();
        let location = Location::new(1.0, 0.0, 0.0);
        registry.record_vote(location, "B".to_string());
        registry.record_vote(location, "A".to_string());
        assert_eq!(registry.voted_category(&location), Some("A"));
        assert_eq!(registry.coverage().voted, 1);
    }

    #[test]
    fn stray_vote_is_retained_but_not_counted() {
        let mut registry = registry_with_two_objects();
        let elsewhere = Location::new(9.0, 9.0, 9.0);
        let outcome = registry.record_vote(elsewhere, "A".to_string());
        assert_eq!(outcome, VoteOutcome::Stray);
        assert_eq!(registry.coverage().voted, 0);
        assert_eq!(registry.stray_vote_count(), 1);
        assert_eq!(registry.voted_category(&elsewhere), Some("A"));
        assert_eq!(registry.true_category(&elsewhere), None);
    }

    #[test]
    fn coverage_completes_when_every_object_is_voted() {
        let mut registry = registry_with_two_objects();
        registry.record_vote(Location::new(1.0, 0.0, 0.0), "A".to_string());
        assert!(!registry.coverage().is_complete());
        registry.record_vote(Location::new(2.0, 0.0, 0.0), "B".to_string());
        let coverage = registry.coverage();
        assert!(coverage.is_complete());
        assert_eq!(coverage.ratio(), 1.0);
    }
}
