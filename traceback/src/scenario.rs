use std::sync::Arc;

use traceback_recon::ReconstructedPath;
use traceback_sim::{
    CancellationToken, Scheme, Simulation, SimulationOptions, TrialStatistics, WorkingGraph,
};
use traceback_topology::{NodeId, Topology};

use crate::{Report, Result};

/// Everything needed to run one traceback experiment.
///
/// The topology is shared behind an [`Arc`]; every run works on its own [`WorkingGraph`] copy,
/// so any number of scenarios over the same topology can run at the same time.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub topology: Arc<Topology>,
    pub victim: NodeId,
    pub attackers: Vec<NodeId>,
    pub scheme: Scheme,
    pub options: SimulationOptions,
}

impl Scenario {
    /// A scenario with default options and the scheme's default marking probability.
    pub fn new<I>(topology: Arc<Topology>, victim: NodeId, attackers: I, scheme: Scheme) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let options = SimulationOptions::default()
            .with_marking_probability(scheme.default_marking_probability());

        Self { topology, victim, attackers: attackers.into_iter().collect(), scheme, options }
    }

    pub fn with_options(mut self, options: SimulationOptions) -> Self {
        self.options = options;
        self
    }

    /// Simulates the attack, then reconstructs the attack path with the scenario's scheme.
    pub fn run(&self) -> Result<Outcome> {
        self.run_with_cancellation(&CancellationToken::new())
    }

    /// Like [`Scenario::run`], stopping early with an error once `token` is cancelled.
    pub fn run_with_cancellation(&self, token: &CancellationToken) -> Result<Outcome> {
        let _span =
            tracing::debug_span!("scenario", scheme = %self.scheme, victim = self.victim).entered();

        let simulation = Simulation::new(
            &self.topology,
            self.victim,
            self.attackers.iter().copied(),
            self.options,
        )?;
        let attackers = simulation.attackers().to_vec();

        let (graph, stats) = simulation.run_with_cancellation(token)?;
        let path = traceback_recon::reconstruct(self.scheme, &graph, self.victim)?;
        tracing::info!(
            packets = stats.packets_sent,
            overhead = self.scheme.overhead(&stats),
            suspects = path.suspects().len(),
            "scenario complete"
        );

        Ok(Outcome { scheme: self.scheme, victim: self.victim, attackers, graph, stats, path })
    }
}

/// The result of a [`Scenario`] run.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub scheme: Scheme,
    pub victim: NodeId,
    /// The attackers that actually sent traffic: deduplicated, without the victim.
    pub attackers: Vec<NodeId>,
    pub graph: WorkingGraph,
    pub stats: TrialStatistics,
    pub path: ReconstructedPath,
}

impl Outcome {
    /// Overhead in bytes under the scenario's scheme.
    pub const fn overhead(&self) -> u64 {
        self.scheme.overhead(&self.stats)
    }

    /// Summary of the run, renderable as markdown.
    pub fn report(&self) -> Result<Report> {
        Report::new(self)
    }
}
