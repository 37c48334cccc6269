#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Attack-traffic simulation for probabilistic IP traceback.
//!
//! A [`Simulation`] sends packets from a set of attackers to a single victim over a private
//! [`WorkingGraph`] copy of a [`Topology`]. Every packet follows the shortest path to the victim,
//! bumping traversal counters on the way, and each router on the path may overwrite the packet's
//! mark with probability `p`. The surviving mark is credited to that router when the packet
//! arrives.
//!
//! The engine itself does not know about traceback schemes. Schemes only differ in how the
//! resulting [`TrialStatistics`] are priced (see [`overhead`]) and in how the working graph is
//! turned back into a path (see the `traceback-recon` crate).

mod engine;
mod options;
pub mod overhead;
mod stats;
mod working;

pub use engine::{simulate, Simulation};
pub use options::SimulationOptions;
pub use overhead::Scheme;
pub use stats::TrialStatistics;
pub use working::WorkingGraph;

pub use tokio_util::sync::CancellationToken;
pub use traceback_topology::{Edge, EdgeId, NodeId, Topology};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no attackers left once the victim is excluded")]
    NoAttackers,
    #[error("node {0} is not part of the topology")]
    UnknownNode(NodeId),
    #[error("victim {victim} is unreachable from attacker {attacker}")]
    Unreachable { attacker: NodeId, victim: NodeId },
    #[error("simulation cancelled after {completed} packets")]
    Cancelled { completed: u64 },
    #[error("counter table has {actual} entries, expected {expected}")]
    CounterLength { expected: usize, actual: usize },
    #[error("topology error: {0}")]
    Topology(#[from] traceback_topology::Error),
    #[error("worker thread panicked: {0:?}")]
    Thread(Box<dyn std::any::Any + Send + 'static>),
}

pub type Result<T> = std::result::Result<T, Error>;
