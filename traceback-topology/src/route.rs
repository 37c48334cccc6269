//! Shortest-path routing towards a single destination.
//!
//! All simulated traffic converges on one victim, so instead of running a search per packet we
//! build a breadth-first tree rooted at the destination once. Every node then knows its next hop
//! and its hop distance to the root. Neighbours are explored in ascending id order, which makes
//! the chosen path deterministic when several shortest paths exist.

use std::collections::VecDeque;

use crate::{EdgeId, Error, NodeId, Result, Topology};

/// One step along a route: leave `node` over `edge` towards `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub node: NodeId,
    pub next: NodeId,
    pub edge: EdgeId,
}

/// Breadth-first shortest-path tree rooted at a destination node.
#[derive(Debug, Clone)]
pub struct RouteTree {
    root: NodeId,
    next: Vec<Option<(NodeId, EdgeId)>>,
    distance: Vec<Option<u32>>,
}

impl RouteTree {
    /// Builds the tree of shortest paths from every node towards `root`.
    pub fn towards(topology: &Topology, root: NodeId) -> Result<Self> {
        let nodes = topology.node_count();
        if root >= nodes {
            return Err(Error::NodeOutOfRange { node: root, nodes });
        }

        let mut next = vec![None; nodes];
        let mut distance = vec![None; nodes];
        let mut queue = VecDeque::with_capacity(nodes);

        distance[root] = Some(0);
        queue.push_back(root);

        while let Some(current) = queue.pop_front() {
            let Some(d) = distance[current] else { continue };

            for &(neighbor, edge) in topology.links(current) {
                if distance[neighbor].is_none() {
                    distance[neighbor] = Some(d + 1);
                    next[neighbor] = Some((current, edge));
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(Self { root, next, distance })
    }

    #[inline]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Hop count from `node` to the root, `None` if unreachable or unknown.
    #[inline]
    pub fn distance(&self, node: NodeId) -> Option<u32> {
        self.distance.get(node).copied().flatten()
    }

    #[inline]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.distance(node).is_some()
    }

    pub fn reachable_count(&self) -> usize {
        self.distance.iter().filter(|d| d.is_some()).count()
    }

    /// The first hop from `node` towards the root. `None` for the root itself and for nodes that
    /// cannot reach it.
    pub fn next_hop(&self, node: NodeId) -> Option<Hop> {
        self.next
            .get(node)
            .copied()
            .flatten()
            .map(|(next, edge)| Hop { node, next, edge })
    }

    /// Every hop from `from` to the root, in travel order. The root itself never appears as
    /// [`Hop::node`], so the result is empty when `from` is the root.
    pub fn hops(&self, from: NodeId) -> Result<Vec<Hop>> {
        let Some(distance) = self.distance(from) else {
            return Err(Error::Unreachable { from, to: self.root });
        };

        let mut hops = Vec::with_capacity(distance as usize);
        let mut current = from;
        while let Some(hop) = self.next_hop(current) {
            hops.push(hop);
            current = hop.next;
        }

        Ok(hops)
    }

    /// The node sequence from `from` to the root, both included.
    pub fn path(&self, from: NodeId) -> Result<Vec<NodeId>> {
        let hops = self.hops(from)?;

        let mut path: Vec<NodeId> = hops.iter().map(|hop| hop.node).collect();
        path.push(self.root);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_on_path_graph() {
        let topology = Topology::path(4);
        let tree = RouteTree::towards(&topology, 3).unwrap();

        assert_eq!(tree.distance(0), Some(3));
        assert_eq!(tree.distance(3), Some(0));
        assert_eq!(tree.next_hop(3), None);
        assert_eq!(
            tree.next_hop(1),
            Some(Hop { node: 1, next: 2, edge: topology.edge_id(1, 2).unwrap() })
        );
        assert_eq!(tree.path(0).unwrap(), vec![0, 1, 2, 3]);
        assert!(tree.hops(3).unwrap().is_empty());
    }

    #[test]
    fn ties_prefer_lowest_neighbor() {
        // 0 reaches 3 through either 1 or 2; the tree is built from 3 outwards, so 0 is first
        // discovered from whichever of 1 and 2 is dequeued first, which is 1.
        let topology = Topology::from_edges(4, [(0, 2), (0, 1), (1, 3), (2, 3)]).unwrap();
        let tree = RouteTree::towards(&topology, 3).unwrap();

        assert_eq!(tree.path(0).unwrap(), vec![0, 1, 3]);
    }

    #[test]
    fn unreachable_nodes() {
        let topology = Topology::from_edges(3, [(0, 1)]).unwrap();
        let tree = RouteTree::towards(&topology, 0).unwrap();

        assert!(!tree.is_reachable(2));
        assert_eq!(tree.reachable_count(), 2);
        assert!(matches!(tree.hops(2), Err(Error::Unreachable { from: 2, to: 0 })));
        assert!(matches!(
            RouteTree::towards(&topology, 7),
            Err(Error::NodeOutOfRange { node: 7, nodes: 3 })
        ));
    }
}
