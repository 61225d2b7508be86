//! Node removal and dangling-edge pruning for both schemas.

use std::collections::HashSet;

use medproto_core::models::clinical::ClinicalFlowchart;
use medproto_core::models::flowchart::Flowchart;
use tracing::debug;

/// Graph edits shared by both flowchart schemas.
pub trait GraphEdit {
    /// Remove a node and every edge touching it. Returns whether the node
    /// existed.
    fn remove_node(&mut self, id: &str) -> bool;

    /// Drop edges whose source or target is not a node. Returns how many
    /// edges were removed.
    fn prune_dangling_edges(&mut self) -> usize;
}

impl GraphEdit for Flowchart {
    fn remove_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        let removed = self.nodes.len() != before;
        self.edges.retain(|e| e.source != id && e.target != id);
        debug!(node_id = id, removed, "removed standard node");
        removed
    }

    fn prune_dangling_edges(&mut self) -> usize {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let before = self.edges.len();
        self.edges
            .retain(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()));
        before - self.edges.len()
    }
}

impl GraphEdit for ClinicalFlowchart {
    fn remove_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        let removed = self.nodes.len() != before;
        self.edges.retain(|e| e.source != id && e.target != id);
        debug!(node_id = id, removed, "removed clinical node");
        removed
    }

    fn prune_dangling_edges(&mut self) -> usize {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let before = self.edges.len();
        self.edges
            .retain(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()));
        before - self.edges.len()
    }
}
