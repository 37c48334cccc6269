//! Random small-world topology generation.

use std::collections::BTreeSet;

use rand::Rng;

use crate::{Error, NodeId, Result, Topology};

/// Parameters for a Watts-Strogatz small-world graph.
///
/// Generation starts from a ring lattice where each node is joined to its `neighbors / 2`
/// nearest neighbours on either side. Each lattice edge `(u, v)` is then rewired with
/// probability `rewire_probability` to `(u, w)`, with `w` drawn uniformly from the nodes not
/// yet adjacent to `u`.
///
/// # Example
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use traceback_topology::WattsStrogatz;
///
/// let params = WattsStrogatz { nodes: 30, neighbors: 4, ..Default::default() };
/// let topology = params.generate_connected(&mut StdRng::seed_from_u64(7)).unwrap();
///
/// assert_eq!(topology.node_count(), 30);
/// assert!(topology.is_connected());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WattsStrogatz {
    /// Number of nodes.
    pub nodes: usize,
    /// Each node is joined with this many nearest neighbours in the initial ring. Odd values
    /// are rounded down.
    pub neighbors: usize,
    /// Probability of rewiring each lattice edge.
    pub rewire_probability: f64,
    /// Upper bound on the number of graphs drawn by [`WattsStrogatz::generate_connected`].
    pub max_attempts: usize,
}

impl Default for WattsStrogatz {
    fn default() -> Self {
        Self { nodes: 20, neighbors: 2, rewire_probability: 0.75, max_attempts: 100 }
    }
}

impl WattsStrogatz {
    fn validate(&self) -> Result<()> {
        if self.nodes == 0 {
            return Err(Error::InvalidParameters("a topology needs at least one node".to_string()));
        }

        if self.neighbors > self.nodes {
            return Err(Error::InvalidParameters(format!(
                "cannot join {} neighbours in a graph of {} nodes",
                self.neighbors, self.nodes
            )));
        }

        Ok(())
    }

    /// Draws one graph. The result is not necessarily connected.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Topology> {
        self.validate()?;

        let n = self.nodes;
        let mut adjacency: Vec<BTreeSet<NodeId>> = vec![BTreeSet::new(); n];

        if self.neighbors == n {
            for u in 0..n {
                adjacency[u].extend((0..n).filter(|&v| v != u));
            }
            return Self::freeze(&adjacency);
        }

        let half = self.neighbors / 2;
        for j in 1..=half {
            for u in 0..n {
                let v = (u + j) % n;
                adjacency[u].insert(v);
                adjacency[v].insert(u);
            }
        }

        let p = self.rewire_probability.clamp(0.0, 1.0);
        for j in 1..=half {
            for u in 0..n {
                if rng.gen::<f64>() >= p {
                    continue;
                }

                let v = (u + j) % n;
                let candidates: Vec<NodeId> =
                    (0..n).filter(|&w| w != u && !adjacency[u].contains(&w)).collect();
                if candidates.is_empty() {
                    continue;
                }

                let w = candidates[rng.gen_range(0..candidates.len())];
                adjacency[u].remove(&v);
                adjacency[v].remove(&u);
                adjacency[u].insert(w);
                adjacency[w].insert(u);
            }
        }

        Self::freeze(&adjacency)
    }

    /// Draws graphs until one is connected, giving up after `max_attempts` draws.
    pub fn generate_connected<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Topology> {
        for attempt in 1..=self.max_attempts {
            let topology = self.generate(rng)?;
            if topology.is_connected() {
                tracing::debug!(
                    attempt,
                    nodes = self.nodes,
                    edges = topology.edge_count(),
                    "generated topology"
                );
                return Ok(topology);
            }

            tracing::warn!(attempt, "topology is not connected, regenerating");
        }

        Err(Error::Disconnected { attempts: self.max_attempts })
    }

    fn freeze(adjacency: &[BTreeSet<NodeId>]) -> Result<Topology> {
        let edges = adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, set)| set.iter().filter(move |&&v| u < v).map(move |&v| (u, v)));

        Topology::from_edges(adjacency.len(), edges)
    }
}
