use crate::overhead;

/// Aggregate statistics of a simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrialStatistics {
    /// Number of packets sent, across all attackers.
    pub packets_sent: u64,
    /// Number of node traversals across all packets. The attacker counts once per packet, the
    /// victim never does.
    pub intermediate_routers: u64,
    /// Node append overhead in bytes, accumulated hop by hop while the packets were routed.
    pub nappend_overhead: u64,
    /// Node sampling overhead in bytes.
    pub nsample_overhead: u64,
    /// Edge sampling overhead in bytes.
    pub esample_overhead: u64,
}

impl TrialStatistics {
    /// Builds the statistics of a run from its raw totals. The per-packet sampling overheads are
    /// derived from `packets_sent`.
    pub const fn new(packets_sent: u64, intermediate_routers: u64, nappend_overhead: u64) -> Self {
        Self {
            packets_sent,
            intermediate_routers,
            nappend_overhead,
            nsample_overhead: overhead::node_sampling(packets_sent),
            esample_overhead: overhead::edge_sampling(packets_sent),
        }
    }

    /// Average number of traversed nodes per packet, `0.0` when nothing was sent.
    pub fn mean_path_length(&self) -> f64 {
        if self.packets_sent == 0 {
            return 0.0;
        }

        self.intermediate_routers as f64 / self.packets_sent as f64
    }
}
