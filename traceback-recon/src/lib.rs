#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Attack path reconstruction from the evidence a traceback scheme leaves behind.
//!
//! Every scheme turns an annotated [`WorkingGraph`] into a [`ReconstructedPath`]: a chain of nodes
//! ending at the victim plus the segments to draw for it. The result is meant for visualising
//! likely attack paths; it is an approximation, not a certified route.

mod edge_sampling;
mod node_append;
mod node_sampling;

pub use edge_sampling::{EdgeFragment, EdgeSampling};
pub use node_append::NodeAppend;
pub use node_sampling::{reconstruct_node_sampling, NodeSampling};

use traceback_sim::{Scheme, WorkingGraph};
use traceback_topology::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("victim {0} is not part of the working graph")]
    UnknownVictim(NodeId),
    #[error("topology error: {0}")]
    Topology(#[from] traceback_topology::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// An inferred attack path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconstructedPath {
    /// Inferred nodes, ending at the victim.
    pub chain: Vec<NodeId>,
    /// Segments to draw, each oriented towards the victim. Depending on the scheme these may or
    /// may not be edges of the topology.
    pub segments: Vec<(NodeId, NodeId)>,
}

impl ReconstructedPath {
    /// Builds a path whose segments join consecutive chain nodes.
    pub fn chained(chain: Vec<NodeId>) -> Self {
        let segments = chain.windows(2).map(|pair| (pair[0], pair[1])).collect();
        Self { chain, segments }
    }

    /// The last chain node.
    pub fn victim(&self) -> Option<NodeId> {
        self.chain.last().copied()
    }

    /// The inferred nodes, without the victim.
    pub fn suspects(&self) -> &[NodeId] {
        self.chain.split_last().map(|(_, rest)| rest).unwrap_or_default()
    }
}

/// A reconstruction algorithm.
pub trait Reconstruct {
    /// Infers an attack path towards `victim` from the counters of `graph`.
    fn reconstruct(&self, graph: &WorkingGraph, victim: NodeId) -> Result<ReconstructedPath>;
}

/// Runs the reconstruction matching `scheme`.
pub fn reconstruct(
    scheme: Scheme,
    graph: &WorkingGraph,
    victim: NodeId,
) -> Result<ReconstructedPath> {
    let _span = tracing::debug_span!("reconstruct", %scheme, victim).entered();

    let path = match scheme {
        Scheme::NodeAppend => NodeAppend.reconstruct(graph, victim),
        Scheme::NodeSampling => NodeSampling.reconstruct(graph, victim),
        Scheme::EdgeSampling => EdgeSampling.reconstruct(graph, victim),
    }?;

    tracing::debug!(chain = ?path.chain, segments = path.segments.len(), "reconstructed path");
    Ok(path)
}

fn check_victim(graph: &WorkingGraph, victim: NodeId) -> Result<()> {
    if victim < graph.node_count() {
        Ok(())
    } else {
        Err(Error::UnknownVictim(victim))
    }
}
