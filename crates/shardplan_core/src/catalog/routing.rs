use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a node in the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(value.to_string())
    }
}

/// Shards of one index living on a node.
pub type IndexShards = BTreeMap<String, Vec<u32>>;

/// Which shards on which nodes hold the data relevant for a query.
///
/// Ordered maps keep plans deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Routing {
    pub locations: BTreeMap<NodeId, IndexShards>,
}

impl Routing {
    pub fn add_shard(&mut self, node: NodeId, index: impl Into<String>, shard_id: u32) {
        let shards = self
            .locations
            .entry(node)
            .or_default()
            .entry(index.into())
            .or_default();
        if !shards.contains(&shard_id) {
            shards.push(shard_id);
            shards.sort_unstable();
        }
    }

    pub fn nodes(&self) -> BTreeSet<NodeId> {
        self.locations.keys().cloned().collect()
    }

    pub fn has_locations(&self) -> bool {
        !self.locations.is_empty()
    }

    pub fn num_shards(&self) -> usize {
        self.locations
            .values()
            .flat_map(|indices| indices.values())
            .map(|shards| shards.len())
            .sum()
    }
}
