use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use traceback::{
    reconstruct_node_sampling, simulate, Error, Scenario, Scheme, SimulationOptions, Topology,
    WattsStrogatz,
};

#[test]
fn single_packet_over_a_path() {
    let _ = tracing_subscriber::fmt::try_init();

    let topology = Topology::path(4);
    let (graph, stats) = simulate(&topology, 3, [0], 1.0, 1).unwrap();

    assert_eq!((0..4).map(|node| graph.times_used(node)).collect::<Vec<_>>(), vec![2, 1, 1, 0]);
    assert_eq!(graph.marked_nodes().collect::<Vec<_>>(), vec![(2, 1)]);
    assert_eq!(reconstruct_node_sampling(&graph, 3), vec![2, 3]);
    assert_eq!(stats.nappend_overhead, 12);
    assert_eq!(stats.nsample_overhead, 4);
    assert_eq!(stats.esample_overhead, 9);
}

#[test]
fn no_marks_without_probability() {
    let _ = tracing_subscriber::fmt::try_init();

    let topology = Topology::path(4);
    let (graph, stats) = simulate(&topology, 3, [0], 0.0, 5).unwrap();

    assert_eq!(graph.total_marks(), 0);
    assert_eq!(reconstruct_node_sampling(&graph, 3), vec![3]);
    assert_eq!(stats.nappend_overhead, 60);
    assert_eq!(stats.nsample_overhead, 20);
    assert_eq!(stats.esample_overhead, 45);
}

#[test]
fn every_scheme_on_a_generated_topology() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let topology = Arc::new(WattsStrogatz::default().generate_connected(&mut rng).unwrap());
    let options = SimulationOptions::default().with_packets(1_000).with_seed(17);

    for scheme in Scheme::ALL {
        let options = options.with_marking_probability(scheme.default_marking_probability());
        let outcome = Scenario::new(topology.clone(), 0, [5, 11, 17], scheme)
            .with_options(options)
            .run()
            .unwrap();

        assert_eq!(outcome.path.victim(), Some(0));
        assert_eq!(outcome.stats.packets_sent, 1_000);
        assert_eq!(outcome.graph.times_used(0), 0);
        assert!(!outcome.report().unwrap().to_string().is_empty());

        for &attacker in &outcome.attackers {
            assert!(outcome.graph.times_used(attacker) >= 2);
        }
    }
}

#[test]
fn concurrent_scenarios_share_a_topology() {
    let topology = Arc::new(Topology::path(8));
    let options = SimulationOptions::default().with_packets(500).with_seed(99);

    let outcomes: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let scenario = Scenario::new(topology.clone(), 7, [0, 3], Scheme::NodeSampling)
                    .with_options(options);
                scope.spawn(move || scenario.run().unwrap())
            })
            .collect();

        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    for outcome in &outcomes[1..] {
        assert_eq!(outcome.graph, outcomes[0].graph);
        assert_eq!(outcome.path, outcomes[0].path);
    }
}

#[test]
fn disconnected_topology_is_reported() {
    let topology = Arc::new(Topology::from_edges(5, [(0, 1), (1, 2), (3, 4)]).unwrap());
    let result = Scenario::new(topology, 2, [4], Scheme::EdgeSampling)
        .with_options(SimulationOptions::default().with_packets(3))
        .run();

    assert!(matches!(
        result,
        Err(Error::Simulation(traceback_sim::Error::Unreachable { attacker: 4, victim: 2 }))
    ));
}

#[test]
fn victim_only_attackers_are_rejected() {
    let topology = Arc::new(Topology::path(3));
    let result = Scenario::new(topology, 1, [1], Scheme::NodeAppend).run();

    assert!(matches!(result, Err(Error::Simulation(traceback_sim::Error::NoAttackers))));
}
