//! Synthetic per-scheme overhead accounting.
//!
//! These numbers describe a naive implementation of each scheme, without any of the header
//! packing tricks of real packet marking. They depend on packet and hop counts only, never on the
//! shape of the topology.

use std::{fmt::Display, str::FromStr};

use crate::TrialStatistics;

/// Bytes appended per router by node append: one IPv4 address.
pub const NODE_APPEND_BYTES_PER_HOP: u64 = 4;

/// Bytes reserved per packet by node sampling: one IPv4 address.
pub const NODE_SAMPLING_BYTES_PER_PACKET: u64 = 4;

/// Bytes reserved per packet by edge sampling: two IPv4 addresses and a distance byte.
pub const EDGE_SAMPLING_BYTES_PER_PACKET: u64 = 9;

#[inline]
pub const fn node_append(intermediate_routers: u64) -> u64 {
    NODE_APPEND_BYTES_PER_HOP * intermediate_routers
}

#[inline]
pub const fn node_sampling(packets_sent: u64) -> u64 {
    NODE_SAMPLING_BYTES_PER_PACKET * packets_sent
}

#[inline]
pub const fn edge_sampling(packets_sent: u64) -> u64 {
    EDGE_SAMPLING_BYTES_PER_PACKET * packets_sent
}

/// A traceback scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Every router appends its address, so the victim sees complete paths.
    NodeAppend,
    /// A single router address survives per packet.
    NodeSampling,
    /// A single edge (two addresses plus a distance) survives per packet.
    EdgeSampling,
}

impl Scheme {
    pub const ALL: [Self; 3] = [Self::NodeAppend, Self::NodeSampling, Self::EdgeSampling];

    pub const fn name(self) -> &'static str {
        match self {
            Self::NodeAppend => "node-append",
            Self::NodeSampling => "node-sampling",
            Self::EdgeSampling => "edge-sampling",
        }
    }

    /// The marking probability each scheme is usually explored with. Node append has every
    /// router write itself, node and edge sampling start from a fair coin.
    pub fn default_marking_probability(self) -> f64 {
        match self {
            Self::NodeAppend => 1.0,
            Self::NodeSampling | Self::EdgeSampling => 0.5,
        }
    }

    /// The total overhead in bytes this scheme adds for the given run.
    pub const fn overhead(self, stats: &TrialStatistics) -> u64 {
        match self {
            Self::NodeAppend => stats.nappend_overhead,
            Self::NodeSampling => stats.nsample_overhead,
            Self::EdgeSampling => stats.esample_overhead,
        }
    }
}

impl Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown traceback scheme: {0}")]
pub struct UnknownScheme(String);

impl FromStr for Scheme {
    type Err = UnknownScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownScheme(s.to_string()))
    }
}
