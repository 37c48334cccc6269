//! Markdown summaries of simulation outcomes.

use std::fmt::{self, Display};

use traceback_recon::EdgeSampling;
use traceback_sim::{Scheme, TrialStatistics, WorkingGraph};
use traceback_topology::{Edge, NodeId};

use crate::{Outcome, Result};

/// What a node did during a run, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Victim,
    Attacker,
    /// A router no attack packet went through.
    UnusedRouter,
    Router { times_used: u64 },
}

impl Role {
    /// The role of every node of `graph`, indexed by node id.
    pub fn of_nodes(graph: &WorkingGraph, victim: NodeId, attackers: &[NodeId]) -> Vec<Self> {
        graph
            .topology()
            .nodes()
            .map(|node| {
                if node == victim {
                    Self::Victim
                } else if attackers.contains(&node) {
                    Self::Attacker
                } else {
                    match graph.times_used(node) {
                        0 => Self::UnusedRouter,
                        times_used => Self::Router { times_used },
                    }
                }
            })
            .collect()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Victim => f.write_str("Victim"),
            Self::Attacker => f.write_str("Attacker"),
            Self::UnusedRouter => f.write_str("Unused router"),
            Self::Router { times_used } => write!(f, "Router (used {times_used} times)"),
        }
    }
}

/// One row of the edge sampling table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRow {
    /// The edge, in normalized `(lower, higher)` order.
    pub edge: Edge,
    /// Packets whose surviving mark was this edge.
    pub times_marked: u64,
    /// Packets that crossed this edge.
    pub times_used: u64,
}

/// Summary of an [`Outcome`].
///
/// Renders as a markdown list of the run's totals and the scheme's overhead. Edge sampling
/// reports additionally carry a table of every edge of the topology, most marked first, then most
/// used. Ties keep edge id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Scheme whose overhead is reported.
    pub scheme: Scheme,
    /// Totals of the run.
    pub stats: TrialStatistics,
    /// Edge table rows. Empty unless the scheme is edge sampling.
    pub edges: Vec<EdgeRow>,
}

impl Report {
    /// Builds the summary of `outcome`, recovering edge marks for edge sampling runs.
    pub fn new(outcome: &Outcome) -> Result<Self> {
        let edges = match outcome.scheme {
            Scheme::EdgeSampling => edge_rows(&outcome.graph, outcome.victim)?,
            Scheme::NodeAppend | Scheme::NodeSampling => Vec::new(),
        };

        Ok(Self { scheme: outcome.scheme, stats: outcome.stats, edges })
    }

    pub const fn overhead(&self) -> u64 {
        self.scheme.overhead(&self.stats)
    }
}

fn edge_rows(graph: &WorkingGraph, victim: NodeId) -> Result<Vec<EdgeRow>> {
    let topology = graph.topology();
    let mut marked = vec![0; topology.edge_count()];
    for fragment in EdgeSampling.fragments(graph, victim)? {
        if let Some(id) = topology.edge_id(fragment.start, fragment.end) {
            marked[id] += fragment.count;
        }
    }

    let mut rows: Vec<EdgeRow> = graph
        .edges()
        .zip(marked)
        .map(|((edge, times_used), times_marked)| EdgeRow { edge, times_marked, times_used })
        .collect();
    rows.sort_by(|a, b| {
        b.times_marked.cmp(&a.times_marked).then(b.times_used.cmp(&a.times_used))
    });

    Ok(rows)
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- Number of packets sent: {}", self.stats.packets_sent)?;
        writeln!(f, "- Total number of intermediate routers: {}", self.stats.intermediate_routers)?;

        match self.scheme {
            Scheme::EdgeSampling => writeln!(
                f,
                "- Additional bytes of overhead (naive implementation): {}",
                self.overhead()
            )?,
            Scheme::NodeAppend | Scheme::NodeSampling => {
                writeln!(f, "- Additional bytes of overhead: {}", self.overhead())?
            }
        }

        if self.scheme == Scheme::EdgeSampling {
            writeln!(f)?;
            writeln!(f, "| edge | times_marked | times_used |")?;
            writeln!(f, "|------|--------------|------------|")?;
            for row in &self.edges {
                writeln!(f, "| {} | {} | {} |", row.edge, row.times_marked, row.times_used)?;
            }
        }

        Ok(())
    }
}
