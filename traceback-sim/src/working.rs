use traceback_topology::{Edge, EdgeId, Hop, NodeId, Topology};

use crate::{overhead, Error, Result, TrialStatistics};

/// A private copy of a [`Topology`] annotated with the traffic counters of one simulation run.
///
/// - `times_used(node)`: packet traversals touching the node. The attacker of a packet is
///   counted twice per packet, once as the source and once as the first hop.
/// - `times_used(edge)`: packet traversals crossing the edge.
/// - `times_marked(node)`: packets whose surviving mark was this node.
///
/// Counters are only ever written by the simulation engine; everything else reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingGraph {
    topology: Topology,
    node_used: Vec<u64>,
    node_marked: Vec<u64>,
    edge_used: Vec<u64>,
}

impl WorkingGraph {
    /// Copies `topology`, with all counters at zero.
    pub fn new(topology: &Topology) -> Self {
        Self {
            node_used: vec![0; topology.node_count()],
            node_marked: vec![0; topology.node_count()],
            edge_used: vec![0; topology.edge_count()],
            topology: topology.clone(),
        }
    }

    /// Rebuilds a working graph from counters recorded by an earlier run, indexed by node id and
    /// [`EdgeId`] respectively.
    pub fn from_counts(
        topology: &Topology,
        times_used: Vec<u64>,
        times_marked: Vec<u64>,
        edge_times_used: Vec<u64>,
    ) -> Result<Self> {
        for (expected, actual) in [
            (topology.node_count(), times_used.len()),
            (topology.node_count(), times_marked.len()),
            (topology.edge_count(), edge_times_used.len()),
        ] {
            if expected != actual {
                return Err(Error::CounterLength { expected, actual });
            }
        }

        Ok(Self {
            topology: topology.clone(),
            node_used: times_used,
            node_marked: times_marked,
            edge_used: edge_times_used,
        })
    }

    #[inline]
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    /// Packet traversals touching `node`; `0` for unknown nodes.
    #[inline]
    pub fn times_used(&self, node: NodeId) -> u64 {
        self.node_used.get(node).copied().unwrap_or_default()
    }

    /// Packets for which `node` was the surviving mark; `0` for unknown nodes.
    #[inline]
    pub fn times_marked(&self, node: NodeId) -> u64 {
        self.node_marked.get(node).copied().unwrap_or_default()
    }

    /// Packet traversals over the edge with the given id; `0` for unknown edges.
    #[inline]
    pub fn edge_times_used(&self, edge: EdgeId) -> u64 {
        self.edge_used.get(edge).copied().unwrap_or_default()
    }

    /// Packet traversals over the edge between `a` and `b`, `None` if they are not adjacent.
    pub fn edge_times_used_between(&self, a: NodeId, b: NodeId) -> Option<u64> {
        self.topology.edge_id(a, b).map(|edge| self.edge_times_used(edge))
    }

    /// Nodes with a non-zero mark count, in id order.
    pub fn marked_nodes(&self) -> impl Iterator<Item = (NodeId, u64)> + '_ {
        self.node_marked.iter().copied().enumerate().filter(|(_, count)| *count != 0)
    }

    /// Nodes with a non-zero traversal count, in id order.
    pub fn used_nodes(&self) -> impl Iterator<Item = (NodeId, u64)> + '_ {
        self.node_used.iter().copied().enumerate().filter(|(_, count)| *count != 0)
    }

    /// Every edge together with its traversal count, in [`EdgeId`] order.
    pub fn edges(&self) -> impl Iterator<Item = (Edge, u64)> + '_ {
        self.topology.edges().iter().copied().zip(self.edge_used.iter().copied())
    }

    pub fn total_marks(&self) -> u64 {
        self.node_marked.iter().sum()
    }

    /// Adds the counters of a finished batch.
    pub(crate) fn absorb(&mut self, tally: &Tally) {
        for (total, delta) in self.node_used.iter_mut().zip(&tally.node_used) {
            *total += delta;
        }
        for (total, delta) in self.node_marked.iter_mut().zip(&tally.node_marked) {
            *total += delta;
        }
        for (total, delta) in self.edge_used.iter_mut().zip(&tally.edge_used) {
            *total += delta;
        }
    }
}

/// Counters produced by one batch of packets, merged into a [`WorkingGraph`] once the batch is
/// done.
#[derive(Debug, Clone)]
pub(crate) struct Tally {
    node_used: Vec<u64>,
    node_marked: Vec<u64>,
    edge_used: Vec<u64>,
    pub(crate) packets: u64,
    pub(crate) intermediate_routers: u64,
    pub(crate) nappend_overhead: u64,
}

impl Tally {
    pub(crate) fn new(topology: &Topology) -> Self {
        Self {
            node_used: vec![0; topology.node_count()],
            node_marked: vec![0; topology.node_count()],
            edge_used: vec![0; topology.edge_count()],
            packets: 0,
            intermediate_routers: 0,
            nappend_overhead: 0,
        }
    }

    /// Counts a packet leaving `source`. This is on top of the first hop of its route, which
    /// counts the source again.
    #[inline]
    pub(crate) fn record_source(&mut self, source: NodeId) {
        self.packets += 1;
        self.node_used[source] += 1;
    }

    #[inline]
    pub(crate) fn record_hop(&mut self, hop: &Hop) {
        self.node_used[hop.node] += 1;
        self.edge_used[hop.edge] += 1;
        self.intermediate_routers += 1;
        self.nappend_overhead += overhead::NODE_APPEND_BYTES_PER_HOP;
    }

    #[inline]
    pub(crate) fn record_mark(&mut self, node: NodeId) {
        self.node_marked[node] += 1;
    }

    pub(crate) fn merge(&mut self, other: &Self) {
        for (total, delta) in self.node_used.iter_mut().zip(&other.node_used) {
            *total += delta;
        }
        for (total, delta) in self.node_marked.iter_mut().zip(&other.node_marked) {
            *total += delta;
        }
        for (total, delta) in self.edge_used.iter_mut().zip(&other.edge_used) {
            *total += delta;
        }
        self.packets += other.packets;
        self.intermediate_routers += other.intermediate_routers;
        self.nappend_overhead += other.nappend_overhead;
    }

    pub(crate) const fn statistics(&self) -> TrialStatistics {
        TrialStatistics::new(self.packets, self.intermediate_routers, self.nappend_overhead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_graph_is_zeroed() {
        let graph = WorkingGraph::new(&Topology::path(3));

        assert_eq!(graph.times_used(0), 0);
        assert_eq!(graph.times_marked(2), 0);
        assert_eq!(graph.times_used(99), 0);
        assert_eq!(graph.marked_nodes().count(), 0);
        assert_eq!(graph.edges().map(|(_, used)| used).sum::<u64>(), 0);
    }

    #[test]
    fn from_counts_checks_lengths() {
        let topology = Topology::path(3);

        let graph =
            WorkingGraph::from_counts(&topology, vec![2, 1, 0], vec![0, 1, 0], vec![1, 1]).unwrap();
        assert_eq!(graph.marked_nodes().collect::<Vec<_>>(), vec![(1, 1)]);
        assert_eq!(graph.edge_times_used_between(2, 1), Some(1));
        assert_eq!(graph.edge_times_used_between(0, 2), None);

        assert!(matches!(
            WorkingGraph::from_counts(&topology, vec![0; 3], vec![0; 3], vec![0; 3]),
            Err(Error::CounterLength { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn tallies_merge_by_summation() {
        let topology = Topology::path(3);
        let hop = Hop { node: 0, next: 1, edge: 0 };

        let mut a = Tally::new(&topology);
        a.record_source(0);
        a.record_hop(&hop);
        a.record_mark(0);

        let mut b = Tally::new(&topology);
        b.record_source(0);
        b.record_hop(&hop);

        a.merge(&b);
        let mut graph = WorkingGraph::new(&topology);
        graph.absorb(&a);

        assert_eq!(graph.times_used(0), 4);
        assert_eq!(graph.times_marked(0), 1);
        assert_eq!(graph.edge_times_used(0), 2);
        assert_eq!(a.statistics(), TrialStatistics::new(2, 2, 8));
    }
}
