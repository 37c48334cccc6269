#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! DDoS traceback explorer.
//!
//! Simulates attack traffic over a network topology and reconstructs likely attack paths with
//! one of three probabilistic traceback schemes: node append, node sampling and edge sampling.
//!
//! ```
//! use std::sync::Arc;
//!
//! use traceback::{Scenario, Scheme, SimulationOptions, Topology};
//!
//! let topology = Arc::new(Topology::path(4));
//! let outcome = Scenario::new(topology, 3, [0], Scheme::NodeSampling)
//!     .with_options(SimulationOptions::default().with_marking_probability(1.0).with_packets(1))
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(outcome.path.chain, vec![2, 3]);
//! assert_eq!(outcome.overhead(), 4);
//! ```

pub mod report;
mod scenario;

pub use report::{Report, Role};
pub use scenario::{Outcome, Scenario};

pub use traceback_recon::{
    reconstruct, reconstruct_node_sampling, EdgeFragment, EdgeSampling, NodeAppend, NodeSampling,
    Reconstruct, ReconstructedPath,
};
pub use traceback_sim::{
    overhead, simulate, CancellationToken, Scheme, Simulation, SimulationOptions, TrialStatistics,
    WorkingGraph,
};
pub use traceback_topology::{Edge, EdgeId, NodeId, RouteTree, Topology, WattsStrogatz};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("topology error: {0}")]
    Topology(#[from] traceback_topology::Error),
    #[error("simulation error: {0}")]
    Simulation(#[from] traceback_sim::Error),
    #[error("reconstruction error: {0}")]
    Reconstruction(#[from] traceback_recon::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
