//! Identity helpers shared by both mapping directions.
//!
//! Both directions must derive the same display id for a network entity that
//! lacks one, so the fallback rule lives here and nowhere else.

use std::collections::HashSet;

use crate::network::{NetworkEdge, NetworkNode};

/// Hands out the smallest unused positive integer at or after a running cursor.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    used: HashSet<i64>,
    cursor: i64,
}

impl IdAllocator {
    pub fn new(used: impl IntoIterator<Item = i64>) -> Self {
        Self {
            used: used.into_iter().collect(),
            cursor: 1,
        }
    }

    pub fn next_id(&mut self) -> i64 {
        let mut candidate = self.cursor.max(1);
        while self.used.contains(&candidate) {
            candidate += 1;
        }
        self.used.insert(candidate);
        self.cursor = candidate + 1;
        candidate
    }
}

/// Deterministic display-id generator scoped to one document namespace
/// (nodes or edges). Never returns an id it has already seen.
#[derive(Debug, Clone, Default)]
pub struct SyntheticIds {
    taken: HashSet<String>,
    counter: u64,
}

impl SyntheticIds {
    pub fn reserve(&mut self, id: &str) {
        self.taken.insert(id.to_string());
    }

    pub fn reserve_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.reserve(id.as_ref());
        }
    }

    pub fn fresh(&mut self, prefix: &str) -> String {
        loop {
            self.counter += 1;
            let candidate = format!("{prefix}-{}", self.counter);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Explicit id if present, else the numeric id stringified, else a fresh one.
    /// A stringified numeric id that is already taken falls through to fresh.
    pub fn assign(&mut self, explicit: Option<&str>, numeric: Option<i64>, prefix: &str) -> String {
        if let Some(id) = explicit {
            self.reserve(id);
            return id.to_string();
        }
        if let Some(n) = numeric {
            let candidate = n.to_string();
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
        self.fresh(prefix)
    }
}

/// Display ids for `nodes`, in order, applying the fallback rule.
pub fn node_display_ids(nodes: &[NetworkNode], ids: &mut SyntheticIds) -> Vec<String> {
    ids.reserve_all(nodes.iter().filter_map(NetworkNode::display_id));
    nodes
        .iter()
        .map(|node| ids.assign(node.display_id(), node.node_id, "node"))
        .collect()
}

/// Display ids for `edges`, in order, applying the fallback rule.
pub fn edge_display_ids(edges: &[NetworkEdge], ids: &mut SyntheticIds) -> Vec<String> {
    let explicit: Vec<Option<String>> = edges.iter().map(NetworkEdge::display_id).collect();
    ids.reserve_all(explicit.iter().flatten());
    edges
        .iter()
        .zip(&explicit)
        .map(|(edge, id)| ids.assign(id.as_deref(), edge.edge_id, "edge"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_starts_at_one() {
        let mut a = IdAllocator::new([]);
        assert_eq!(a.next_id(), 1);
        assert_eq!(a.next_id(), 2);
    }

    #[test]
    fn allocator_skips_used_ids() {
        let mut a = IdAllocator::new([1, 3]);
        assert_eq!(a.next_id(), 2);
        assert_eq!(a.next_id(), 4);
        assert_eq!(a.next_id(), 5);
    }

    #[test]
    fn allocator_ignores_non_positive_ids() {
        let mut a = IdAllocator::new([0, -4]);
        assert_eq!(a.next_id(), 1);
    }

    #[test]
    fn fresh_skips_reserved() {
        let mut ids = SyntheticIds::default();
        ids.reserve("node-1");
        assert_eq!(ids.fresh("node"), "node-2");
        assert_eq!(ids.fresh("node"), "node-3");
    }

    #[test]
    fn numeric_fallback_yields_to_explicit_id() {
        let mut a = NetworkNode::new(2);
        a.display.id = None;
        let mut b = NetworkNode::new(9);
        b.display.id = Some("2".to_string());
        let mut ids = SyntheticIds::default();
        assert_eq!(node_display_ids(&[a, b], &mut ids), vec!["node-1", "2"]);
    }

    #[test]
    fn node_without_any_id_gets_fresh_id() {
        let node = NetworkNode::default();
        let mut ids = SyntheticIds::default();
        assert_eq!(node_display_ids(&[node], &mut ids), vec!["node-1"]);
    }
}
