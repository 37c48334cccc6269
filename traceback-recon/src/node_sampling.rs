use traceback_sim::WorkingGraph;
use traceback_topology::NodeId;

use crate::{check_victim, Reconstruct, ReconstructedPath, Result};

/// Node sampling reconstruction.
///
/// Because later routers overwrite earlier marks, routers close to the victim are marked most
/// often. Sorting marked routers by ascending mark count therefore orders them roughly from the
/// attackers towards the victim.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeSampling;

impl Reconstruct for NodeSampling {
    fn reconstruct(&self, graph: &WorkingGraph, victim: NodeId) -> Result<ReconstructedPath> {
        check_victim(graph, victim)?;
        Ok(ReconstructedPath::chained(reconstruct_node_sampling(graph, victim)))
    }
}

/// Every marked node other than the victim, sorted by ascending `times_marked` (ties keep id
/// order), followed by the victim. Consecutive nodes are not necessarily adjacent in the topology.
pub fn reconstruct_node_sampling(graph: &WorkingGraph, victim: NodeId) -> Vec<NodeId> {
    let mut marked: Vec<(NodeId, u64)> =
        graph.marked_nodes().filter(|(node, _)| *node != victim).collect();
    // Stable, so nodes with equal counts stay in enumeration order.
    marked.sort_by_key(|(_, count)| *count);

    marked.into_iter().map(|(node, _)| node).chain(std::iter::once(victim)).collect()
}
