use std::{fmt::Display, ops::Range};

use rustc_hash::FxHashMap;

use crate::{Error, Result, RouteTree};

pub type NodeId = usize;

/// Index of an [`Edge`] inside [`Topology::edges`].
pub type EdgeId = usize;

/// An undirected edge. The endpoints are stored in ascending order so that `(a, b)` and `(b, a)`
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge(NodeId, NodeId);

impl Edge {
    #[inline]
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    #[inline]
    pub const fn endpoints(self) -> (NodeId, NodeId) {
        (self.0, self.1)
    }

    /// Returns the endpoint opposite to `node`, or `None` if `node` is not on this edge.
    pub const fn opposite(self, node: NodeId) -> Option<NodeId> {
        if node == self.0 {
            Some(self.1)
        } else if node == self.1 {
            Some(self.0)
        } else {
            None
        }
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// An undirected graph with stable node identifiers `0..node_count()`.
///
/// Neighbours of every node are kept sorted by id, so every traversal over a topology (and in
/// particular shortest-path tie-breaking) is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    /// Per-node list of `(neighbour, edge)` pairs, sorted by neighbour.
    adjacency: Vec<Vec<(NodeId, EdgeId)>>,
    edges: Vec<Edge>,
    index: FxHashMap<Edge, EdgeId>,
}

impl Topology {
    /// Builds a topology with `nodes` nodes from a list of undirected edges.
    ///
    /// Duplicate edges (in either orientation) are collapsed. Self-loops and endpoints outside
    /// `0..nodes` are rejected.
    pub fn from_edges<I>(nodes: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut topology = Self {
            adjacency: vec![Vec::new(); nodes],
            edges: Vec::new(),
            index: FxHashMap::default(),
        };

        for (a, b) in edges {
            for node in [a, b] {
                if node >= nodes {
                    return Err(Error::NodeOutOfRange { node, nodes });
                }
            }

            if a == b {
                return Err(Error::SelfLoop(a));
            }

            let edge = Edge::new(a, b);
            if topology.index.contains_key(&edge) {
                continue;
            }

            let id = topology.edges.len();
            topology.edges.push(edge);
            topology.index.insert(edge, id);
            topology.adjacency[a].push((b, id));
            topology.adjacency[b].push((a, id));
        }

        for links in &mut topology.adjacency {
            links.sort_unstable_by_key(|(neighbor, _)| *neighbor);
        }

        Ok(topology)
    }

    /// The path graph `0 - 1 - ... - (nodes - 1)`.
    pub fn path(nodes: usize) -> Self {
        let mut topology = Self {
            adjacency: vec![Vec::new(); nodes],
            edges: Vec::with_capacity(nodes.saturating_sub(1)),
            index: FxHashMap::default(),
        };

        for a in 1..nodes {
            let edge = Edge::new(a - 1, a);
            let id = topology.edges.len();
            topology.edges.push(edge);
            topology.index.insert(edge, id);
            topology.adjacency[a - 1].push((a, id));
            topology.adjacency[a].push((a - 1, id));
        }

        topology
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn nodes(&self) -> Range<NodeId> {
        0..self.node_count()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node < self.node_count()
    }

    /// All edges, indexed by [`EdgeId`].
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<Edge> {
        self.edges.get(id).copied()
    }

    /// Looks up the id of the edge between `a` and `b`, in either orientation.
    pub fn edge_id(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.index.get(&Edge::new(a, b)).copied()
    }

    /// The `(neighbour, edge)` pairs of `node`, sorted by neighbour. Empty for unknown nodes.
    pub fn links(&self, node: NodeId) -> &[(NodeId, EdgeId)] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.links(node).iter().map(|(neighbor, _)| *neighbor)
    }

    #[inline]
    pub fn degree(&self, node: NodeId) -> usize {
        self.links(node).len()
    }

    /// Returns `true` if every node can reach every other node. The empty topology is not
    /// considered connected.
    pub fn is_connected(&self) -> bool {
        match RouteTree::towards(self, 0) {
            Ok(tree) => tree.reachable_count() == self.node_count(),
            Err(_) => false,
        }
    }

    /// The shortest path (by hop count) from `from` to `to`, both endpoints included.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> Result<Vec<NodeId>> {
        if !self.contains(from) {
            return Err(Error::NodeOutOfRange { node: from, nodes: self.node_count() });
        }

        RouteTree::towards(self, to)?.path(from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_edges_collapses_duplicates() {
        let topology = Topology::from_edges(3, [(0, 1), (1, 0), (2, 1)]).unwrap();

        assert_eq!(topology.edge_count(), 2);
        assert_eq!(topology.edge_id(1, 0), topology.edge_id(0, 1));
        assert_eq!(topology.neighbors(1).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(topology.edge(1), Some(Edge::new(1, 2)));
    }

    #[test]
    fn from_edges_rejects_invalid_edges() {
        assert!(matches!(
            Topology::from_edges(2, [(0, 2)]),
            Err(Error::NodeOutOfRange { node: 2, nodes: 2 })
        ));
        assert!(matches!(Topology::from_edges(2, [(1, 1)]), Err(Error::SelfLoop(1))));
    }

    #[test]
    fn path_graph() {
        let topology = Topology::path(4);

        assert_eq!(topology.node_count(), 4);
        assert_eq!(topology.edges(), &[Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 3)]);
        assert_eq!(topology.degree(0), 1);
        assert_eq!(topology.degree(1), 2);
        assert!(topology.is_connected());
        assert_eq!(topology.shortest_path(0, 3).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn connectivity() {
        let split = Topology::from_edges(4, [(0, 1), (2, 3)]).unwrap();
        assert!(!split.is_connected());
        assert!(matches!(split.shortest_path(0, 3), Err(Error::Unreachable { from: 0, to: 3 })));

        assert!(!Topology::path(0).is_connected());
        assert!(Topology::path(1).is_connected());
    }

    #[test]
    fn edge_display_is_normalized() {
        assert_eq!(Edge::new(5, 2).to_string(), "(2, 5)");
        assert_eq!(Edge::new(5, 2).opposite(5), Some(2));
        assert_eq!(Edge::new(5, 2).opposite(3), None);
    }
}
