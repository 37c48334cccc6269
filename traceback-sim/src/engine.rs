use std::{
    collections::BTreeSet,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    thread,
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio_util::sync::CancellationToken;
use traceback_topology::{Hop, NodeId, RouteTree, Topology};

use crate::{
    working::{Tally, WorkingGraph},
    Error, Result, SimulationOptions, TrialStatistics,
};

/// Sends `num_packets` packets from `attackers` to `victim`, marking with probability `p`.
///
/// Shorthand for a [`Simulation`] with default options and a fresh random seed.
pub fn simulate<I>(
    topology: &Topology,
    victim: NodeId,
    attackers: I,
    p: f64,
    num_packets: u64,
) -> Result<(WorkingGraph, TrialStatistics)>
where
    I: IntoIterator<Item = NodeId>,
{
    let options =
        SimulationOptions::default().with_marking_probability(p).with_packets(num_packets);

    Simulation::new(topology, victim, attackers, options)?.run()
}

/// A DDoS simulation: many attackers, one victim, shortest-path routing.
///
/// For every packet:
///
/// 1. An attacker is drawn uniformly, with replacement.
/// 2. The attacker's `times_used` is bumped once as the packet source.
/// 3. The packet walks the shortest path to the victim. Each node on it except the victim,
///    starting with the attacker again, gets its `times_used` bumped, as does the edge towards the
///    next node. Each such node also draws `x` in `[0, 1)` and, if `x < p`, overwrites the
///    packet's mark with itself.
/// 4. On arrival, the surviving mark (if any) is credited to its node's `times_marked`.
///
/// Later marks always win, so the surviving mark is biased towards the routers closest to the
/// victim. That bias is what node sampling reconstruction relies on.
#[derive(Debug, Clone)]
pub struct Simulation<'a> {
    topology: &'a Topology,
    victim: NodeId,
    /// Deduplicated and sorted, never contains the victim.
    attackers: Vec<NodeId>,
    options: SimulationOptions,
}

impl<'a> Simulation<'a> {
    /// Validates the scenario. The victim is silently dropped from the attackers; an attacker set
    /// that ends up empty is an error.
    pub fn new<I>(
        topology: &'a Topology,
        victim: NodeId,
        attackers: I,
        options: SimulationOptions,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = NodeId>,
    {
        if !topology.contains(victim) {
            return Err(Error::UnknownNode(victim));
        }

        let mut set = BTreeSet::new();
        for attacker in attackers {
            if !topology.contains(attacker) {
                return Err(Error::UnknownNode(attacker));
            }
            set.insert(attacker);
        }
        set.remove(&victim);

        if set.is_empty() {
            return Err(Error::NoAttackers);
        }

        Ok(Self { topology, victim, attackers: set.into_iter().collect(), options })
    }

    #[inline]
    pub const fn victim(&self) -> NodeId {
        self.victim
    }

    #[inline]
    pub fn attackers(&self) -> &[NodeId] {
        &self.attackers
    }

    #[inline]
    pub const fn options(&self) -> &SimulationOptions {
        &self.options
    }

    /// Runs every packet and returns the annotated graph with the run's statistics.
    pub fn run(&self) -> Result<(WorkingGraph, TrialStatistics)> {
        self.run_with_cancellation(&CancellationToken::new())
    }

    /// Like [`Simulation::run`], but gives up with [`Error::Cancelled`] once `token` is
    /// cancelled. The token is checked between batches, so a batch that already started always
    /// completes first.
    pub fn run_with_cancellation(
        &self,
        token: &CancellationToken,
    ) -> Result<(WorkingGraph, TrialStatistics)> {
        let seed = self.options.seed.unwrap_or_else(rand::random);
        let p = self.options.clamped_probability();
        let packets = self.options.packets;
        let batch_size = self.options.batch_size.max(1) as u64;
        let batches = packets.div_ceil(batch_size);

        let _span = tracing::debug_span!("simulate", victim = self.victim, seed).entered();
        tracing::info!(attackers = ?self.attackers, p, packets, "starting simulation");

        let routes = RouteTree::towards(self.topology, self.victim)?;
        // Unreachable attackers only fail the run once they are picked.
        let routes: Vec<Option<Vec<Hop>>> =
            self.attackers.iter().map(|&attacker| routes.hops(attacker).ok()).collect();

        let batch = Batch { simulation: self, routes: &routes, seed, p, packets, batch_size };

        let workers = self.options.workers.clamp(1, batches.max(1) as usize);
        let tally = if workers == 1 {
            batch.run_sequential(batches, token)?
        } else {
            batch.run_parallel(batches, workers, token)?
        };

        let mut graph = WorkingGraph::new(self.topology);
        graph.absorb(&tally);
        let stats = tally.statistics();

        tracing::info!(
            packets_sent = stats.packets_sent,
            intermediate_routers = stats.intermediate_routers,
            marks = graph.total_marks(),
            "simulation complete"
        );

        Ok((graph, stats))
    }
}

/// Everything a batch of packets needs, shared read-only across workers.
struct Batch<'s, 'a> {
    simulation: &'s Simulation<'a>,
    routes: &'s [Option<Vec<Hop>>],
    seed: u64,
    p: f64,
    packets: u64,
    batch_size: u64,
}

impl Batch<'_, '_> {
    /// Sends the packets of batch `index`, drawing from random stream `index` of the run seed.
    fn send(&self, index: u64) -> Result<Tally> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(index);

        let start = index * self.batch_size;
        let count = self.batch_size.min(self.packets - start);

        let attackers = &self.simulation.attackers;
        let mut tally = Tally::new(self.simulation.topology);

        for _ in 0..count {
            let choice = rng.gen_range(0..attackers.len());
            let attacker = attackers[choice];
            let Some(hops) = &self.routes[choice] else {
                return Err(Error::Unreachable { attacker, victim: self.simulation.victim });
            };

            tally.record_source(attacker);

            let mut mark = None;
            for hop in hops {
                tally.record_hop(hop);
                if rng.gen::<f64>() < self.p {
                    mark = Some(hop.node);
                }
            }

            if let Some(node) = mark {
                tally.record_mark(node);
            }
        }

        tracing::debug!(batch = index, packets = count, "batch complete");

        Ok(tally)
    }

    fn run_sequential(&self, batches: u64, token: &CancellationToken) -> Result<Tally> {
        let mut total = Tally::new(self.simulation.topology);

        for index in 0..batches {
            if token.is_cancelled() {
                return Err(Error::Cancelled { completed: total.packets });
            }

            total.merge(&self.send(index)?);
        }

        Ok(total)
    }

    /// Workers claim batch indices in increasing order and sum their batches into a private
    /// tally. Summation commutes, so the merged counters only depend on which batches ran. When
    /// a batch fails, workers stop claiming new ones; every batch below the failing one still
    /// completes, so the lowest failing batch is the one a sequential run would have hit.
    fn run_parallel(
        &self,
        batches: u64,
        workers: usize,
        token: &CancellationToken,
    ) -> Result<Tally> {
        let next = &AtomicU64::new(0);
        let failed = &AtomicBool::new(false);

        let partials = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(move || {
                        let mut partial = Partial {
                            tally: Tally::new(self.simulation.topology),
                            batches: 0,
                            error: None,
                        };

                        while !failed.load(Ordering::Acquire) && !token.is_cancelled() {
                            let index = next.fetch_add(1, Ordering::AcqRel);
                            if index >= batches {
                                break;
                            }

                            match self.send(index) {
                                Ok(tally) => {
                                    partial.tally.merge(&tally);
                                    partial.batches += 1;
                                }
                                Err(e) => {
                                    failed.store(true, Ordering::Release);
                                    partial.error = Some((index, e));
                                    break;
                                }
                            }
                        }

                        partial
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().map_err(Error::Thread))
                .collect::<Result<Vec<_>>>()
        })?;

        let mut total = Tally::new(self.simulation.topology);
        let mut merged = 0;
        let mut first_error: Option<(u64, Error)> = None;
        for partial in partials {
            total.merge(&partial.tally);
            merged += partial.batches;

            if let Some((index, e)) = partial.error {
                if first_error.as_ref().map_or(true, |(first, _)| index < *first) {
                    first_error = Some((index, e));
                }
            }
        }

        if let Some((_, e)) = first_error {
            return Err(e);
        }

        if merged < batches {
            return Err(Error::Cancelled { completed: total.packets });
        }

        Ok(total)
    }
}

/// What one worker thread got through.
struct Partial {
    tally: Tally,
    batches: u64,
    error: Option<(u64, Error)>,
}
