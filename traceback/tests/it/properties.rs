use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use traceback::{RouteTree, Simulation, SimulationOptions, Topology, WattsStrogatz};

fn topology(seed: u64) -> Topology {
    let params =
        WattsStrogatz { nodes: 40, neighbors: 4, rewire_probability: 0.3, max_attempts: 50 };
    params.generate_connected(&mut ChaCha8Rng::seed_from_u64(seed)).unwrap()
}

#[test]
fn overhead_formulas_hold() {
    for seed in 0..5 {
        let topology = topology(seed);
        for p in [0.0, 0.25, 0.5, 1.0] {
            let options = SimulationOptions::default()
                .with_marking_probability(p)
                .with_packets(700)
                .with_seed(seed);
            let (_, stats) =
                Simulation::new(&topology, 0, [10, 20, 30], options).unwrap().run().unwrap();

            assert_eq!(stats.packets_sent, 700);
            assert_eq!(stats.nsample_overhead, 4 * stats.packets_sent);
            assert_eq!(stats.esample_overhead, 9 * stats.packets_sent);
            assert_eq!(stats.nappend_overhead, 4 * stats.intermediate_routers);
        }
    }
}

#[test]
fn traversal_counters_are_consistent() {
    for seed in 0..5 {
        let topology = topology(seed);
        let options = SimulationOptions::default().with_packets(1_000).with_seed(seed);
        let (graph, stats) =
            Simulation::new(&topology, 3, [12, 25, 38], options).unwrap().run().unwrap();

        let node_total: u64 = topology.nodes().map(|node| graph.times_used(node)).sum();
        let edge_total: u64 = graph.edges().map(|(_, used)| used).sum();

        // Every packet counts its source once more than its hops.
        assert_eq!(node_total, stats.intermediate_routers + stats.packets_sent);
        assert_eq!(edge_total, stats.intermediate_routers);
        assert_eq!(graph.times_used(3), 0);
        assert!(graph.total_marks() <= stats.packets_sent);
    }
}

#[test]
fn lone_attacker_is_counted_twice_per_packet() {
    let topology = topology(8);
    let options = SimulationOptions::default().with_packets(321).with_seed(1);
    let (graph, _) = Simulation::new(&topology, 0, [27], options).unwrap().run().unwrap();

    assert_eq!(graph.times_used(27), 642);
}

#[test]
fn certain_marking_hits_the_last_router() {
    let topology = topology(4);
    let routes = RouteTree::towards(&topology, 0).unwrap();
    let options =
        SimulationOptions::default().with_marking_probability(1.0).with_packets(900).with_seed(4);
    let (graph, stats) =
        Simulation::new(&topology, 0, [9, 19, 29, 39], options).unwrap().run().unwrap();

    assert_eq!(graph.total_marks(), stats.packets_sent);
    for (node, _) in graph.marked_nodes() {
        assert_eq!(routes.distance(node), Some(1));
    }
}

#[test]
fn out_of_range_probability_is_clamped() {
    let topology = Topology::path(5);

    let options =
        SimulationOptions::default().with_marking_probability(3.5).with_packets(40).with_seed(2);
    let (graph, stats) = Simulation::new(&topology, 4, [0], options).unwrap().run().unwrap();
    assert_eq!(graph.marked_nodes().collect::<Vec<_>>(), vec![(3, stats.packets_sent)]);

    let options =
        SimulationOptions::default().with_marking_probability(-1.0).with_packets(40).with_seed(2);
    let (graph, _) = Simulation::new(&topology, 4, [0], options).unwrap().run().unwrap();
    assert_eq!(graph.total_marks(), 0);
}
