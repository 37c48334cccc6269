#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Immutable network topologies for traceback simulations.
//!
//! A [`Topology`] is an undirected graph whose nodes are contiguous integer ids
//! `0..n`. It is handed to the simulation engine as a read-only snapshot; the
//! engine never mutates it. Routing is always shortest-path by hop count, see
//! [`RouteTree`].

pub mod generate;
pub mod graph;
pub mod route;

pub use generate::WattsStrogatz;
pub use graph::{Edge, EdgeId, NodeId, Topology};
pub use route::{Hop, RouteTree};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node {node} out of range for topology with {nodes} nodes")]
    NodeOutOfRange { node: NodeId, nodes: usize },
    #[error("self-loop on node {0}")]
    SelfLoop(NodeId),
    #[error("invalid topology parameters: {0}")]
    InvalidParameters(String),
    #[error("no connected topology generated after {attempts} attempts")]
    Disconnected { attempts: usize },
    #[error("node {to} is unreachable from node {from}")]
    Unreachable { from: NodeId, to: NodeId },
}

pub type Result<T> = std::result::Result<T, Error>;
