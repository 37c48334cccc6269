/// Tuning knobs for a [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationOptions {
    /// Probability that a router overwrites the packet's mark with itself. Values outside
    /// `[0, 1]` are clamped, NaN is treated as `0`.
    pub marking_probability: f64,
    /// Number of packets to send.
    pub packets: u64,
    /// Seed for the packet random generators. When `None`, a fresh seed is drawn per run.
    pub seed: Option<u64>,
    /// Packets per batch. Every batch draws from its own random stream, and cancellation is
    /// checked between batches.
    pub batch_size: usize,
    /// Number of threads batches are spread over. The result only depends on the seed and the
    /// batch size, not on this value.
    pub workers: usize,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self { marking_probability: 0.5, packets: 100, seed: None, batch_size: 1024, workers: 1 }
    }
}

impl SimulationOptions {
    /// Sets the marking probability.
    pub fn with_marking_probability(mut self, p: f64) -> Self {
        self.marking_probability = p;
        self
    }

    /// Sets the number of packets to send.
    pub fn with_packets(mut self, packets: u64) -> Self {
        self.packets = packets;
        self
    }

    /// Fixes the seed, making runs reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the number of packets per batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the number of worker threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// The marking probability, clamped into `[0, 1]`.
    pub fn clamped_probability(&self) -> f64 {
        if self.marking_probability.is_nan() {
            return 0.0;
        }

        self.marking_probability.clamp(0.0, 1.0)
    }
}
