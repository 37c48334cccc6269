use traceback_sim::WorkingGraph;
use traceback_topology::{NodeId, RouteTree};

use crate::{check_victim, Reconstruct, ReconstructedPath, Result};

/// An edge recovered from edge sampling marks.
///
/// A packet marked by router `start` carries the edge from `start` to the next router on its
/// route, plus the edge's distance from the victim. Routing is shortest-path and static, so the
/// marked router alone determines both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeFragment {
    pub start: NodeId,
    pub end: NodeId,
    /// Hops between `end` and the victim; `0` for edges adjacent to the victim.
    pub distance: u32,
    /// Number of packets carrying this edge.
    pub count: u64,
}

/// Edge sampling reconstruction.
///
/// Edges are assembled from their fragments by distance, farthest first, so the chain reads from
/// the attackers towards the victim. Fragments at the same distance are ordered by ascending mark
/// count, then by id.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeSampling;

impl EdgeSampling {
    /// Recovers the edge fragments of every marked router, in reconstruction order.
    pub fn fragments(&self, graph: &WorkingGraph, victim: NodeId) -> Result<Vec<EdgeFragment>> {
        check_victim(graph, victim)?;

        let routes = RouteTree::towards(graph.topology(), victim)?;

        let mut fragments = Vec::new();
        for (start, count) in graph.marked_nodes() {
            let (Some(hop), Some(distance)) = (routes.next_hop(start), routes.distance(start))
            else {
                tracing::warn!(node = start, victim, "marked node has no route to the victim");
                continue;
            };

            fragments.push(EdgeFragment { start, end: hop.next, distance: distance - 1, count });
        }

        fragments.sort_by(|a, b| b.distance.cmp(&a.distance).then(a.count.cmp(&b.count)));

        Ok(fragments)
    }
}

impl Reconstruct for EdgeSampling {
    fn reconstruct(&self, graph: &WorkingGraph, victim: NodeId) -> Result<ReconstructedPath> {
        let fragments = self.fragments(graph, victim)?;

        let mut chain: Vec<NodeId> = fragments.iter().map(|fragment| fragment.start).collect();
        chain.push(victim);
        let segments = fragments.iter().map(|fragment| (fragment.start, fragment.end)).collect();

        Ok(ReconstructedPath { chain, segments })
    }
}
