//! Profile Registry - Lazy Per-Node State
//!
//! Maps a node identifier to its [`SensorProfile`], creating the profile
//! on first observation of a previously unseen id. An unknown node id is
//! never an error. Entries are never removed: node populations are small
//! (tens of devices per base station) and a profile that falls silent is
//! itself diagnostic signal.
//!
//! The registry is owned by the dispatcher, the single logical writer,
//! so get-or-create is atomic by construction - no locking, no duplicate
//! profiles under concurrent first sight.

use alloc::collections::BTreeMap;

use crate::messages::NodeId;
use crate::profile::SensorProfile;

/// All known node profiles, keyed by node identifier.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<NodeId, SensorProfile>,
}

impl ProfileRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    /// Look up the profile for `node`, creating it on first sight.
    pub fn get_or_create(&mut self, node: NodeId) -> &mut SensorProfile {
        self.profiles
            .entry(node)
            .or_insert_with(|| SensorProfile::new(node))
    }

    /// Look up an existing profile without creating one.
    pub fn get(&self, node: NodeId) -> Option<&SensorProfile> {
        self.profiles.get(&node)
    }

    /// Number of nodes ever observed.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no node has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Iterate over profiles in node-id order.
    pub fn iter(&self) -> impl Iterator<Item = &SensorProfile> {
        self.profiles.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_on_first_sight() {
        let mut registry = ProfileRegistry::new();
        assert!(registry.get(NodeId(4)).is_none());

        registry.get_or_create(NodeId(4)).ingest_reading(1.0, 0, false);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(NodeId(4)).unwrap().received_count(), 1);
    }

    #[test]
    fn second_lookup_returns_same_profile() {
        let mut registry = ProfileRegistry::new();
        registry.get_or_create(NodeId(2)).ingest_reading(1.0, 0, false);
        registry.get_or_create(NodeId(2)).ingest_reading(2.0, 1, false);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(NodeId(2)).unwrap().received_count(), 2);
    }

    #[test]
    fn distinct_nodes_stay_isolated() {
        let mut registry = ProfileRegistry::new();
        registry.get_or_create(NodeId(1)).ingest_reading(1.0, 500, false);
        registry.get_or_create(NodeId(2)).ingest_reading(1.0, 0, false);

        assert!(registry.get(NodeId(1)).unwrap().gap_count() > 0);
        assert_eq!(registry.get(NodeId(2)).unwrap().gap_count(), 0);
    }
}
