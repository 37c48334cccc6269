use traceback_sim::WorkingGraph;
use traceback_topology::{NodeId, RouteTree};

use crate::{check_victim, Reconstruct, ReconstructedPath, Result};

/// Node append reconstruction.
///
/// Every router appends itself to the packet, so the victim learns complete paths and the
/// traversal counts are exact evidence. The chain lists every used node by ascending
/// `times_used` (ties keep id order), which puts the busy routers next to the victim last. The
/// segments are the traversed topology edges, i.e. the union of all attack paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeAppend;

impl Reconstruct for NodeAppend {
    fn reconstruct(&self, graph: &WorkingGraph, victim: NodeId) -> Result<ReconstructedPath> {
        check_victim(graph, victim)?;

        let mut used: Vec<(NodeId, u64)> =
            graph.used_nodes().filter(|(node, _)| *node != victim).collect();
        used.sort_by_key(|(_, count)| *count);

        let mut chain: Vec<NodeId> = used.into_iter().map(|(node, _)| node).collect();
        chain.push(victim);

        let routes = RouteTree::towards(graph.topology(), victim)?;
        let segments = graph
            .edges()
            .filter(|(_, used)| *used != 0)
            .map(|(edge, _)| {
                let (a, b) = edge.endpoints();
                // Orient towards the victim: the far endpoint goes first.
                if routes.distance(a) < routes.distance(b) {
                    (b, a)
                } else {
                    (a, b)
                }
            })
            .collect();

        Ok(ReconstructedPath { chain, segments })
    }
}

#[cfg(test)]
mod tests {
    use traceback_sim::{Simulation, SimulationOptions};
    use traceback_topology::Topology;

    use super::*;

    #[test]
    fn path_graph_single_packet() {
        let topology = Topology::path(4);
        let options = SimulationOptions::default().with_packets(1).with_seed(1);
        let (graph, _) = Simulation::new(&topology, 3, [0], options).unwrap().run().unwrap();

        let path = NodeAppend.reconstruct(&graph, 3).unwrap();

        // times_used is {0: 2, 1: 1, 2: 1}.
        assert_eq!(path.chain, vec![1, 2, 0, 3]);
        assert_eq!(path.segments, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn segments_cover_every_traversed_edge() {
        // Star around the victim 0, with a tail 4 - 3.
        let topology = Topology::from_edges(5, [(0, 1), (0, 2), (0, 3), (3, 4)]).unwrap();
        let options = SimulationOptions::default().with_packets(200).with_seed(3);
        let (graph, _) = Simulation::new(&topology, 0, [1, 4], options).unwrap().run().unwrap();

        let path = NodeAppend.reconstruct(&graph, 0).unwrap();

        assert_eq!(path.segments, vec![(1, 0), (3, 0), (4, 3)]);
        assert_eq!(path.victim(), Some(0));
        assert!(!path.chain.contains(&2));
    }

    #[test]
    fn no_traffic_yields_victim_only() {
        let graph = WorkingGraph::new(&Topology::path(3));
        let path = NodeAppend.reconstruct(&graph, 1).unwrap();

        assert_eq!(path, ReconstructedPath { chain: vec![1], segments: Vec::new() });
    }
}
