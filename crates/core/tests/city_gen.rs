use assert_approx_eq::assert_approx_eq;
use citygen::{
    quad_xz, City, CityConfig, RoadCollection, SegmentKind, StartSource,
    TurtleState,
};
use nalgebra::Point3;

fn config(seed: u64, iterations: u8) -> CityConfig {
    let mut config = CityConfig {
        seed: seed.into(),
        ..Default::default()
    };
    config.grammar.iterations = iterations;
    config
}

#[test]
fn test_single_pass_scenario() {
    let mut config = config(0, 1);
    config.grammar.axiom = "".into();
    config.turtle.step_length = 10.0;
    config.turtle.turn_angle = 45.0;
    let city = City::generate(config).unwrap();

    let trace = &city.traces()[0];
    let forward: Vec<_> = trace
        .segments
        .iter()
        .filter(|segment| segment.kind == SegmentKind::Forward)
        .collect();
    assert_eq!(forward.len(), 5);
    assert_eq!(trace.pushes, 4);
    assert_eq!(trace.pops, 4);

    // The trunk is 5 straight steps along +Z, since every branch is popped
    for (i, segment) in forward.iter().enumerate() {
        assert_approx_eq!(segment.a.z, 10.0 * i as f64);
        assert_approx_eq!(segment.b.z, 10.0 * (i + 1) as f64);
        assert_approx_eq!(segment.b.x, 0.0);
    }
    let end = trace.final_state.position;
    assert_approx_eq!(end.x, 0.0);
    assert_approx_eq!(end.y, 0.0);
    assert_approx_eq!(end.z, 50.0);
}

#[test]
fn test_deterministic() {
    let first = City::generate(config(77, 3)).unwrap();
    let second = City::generate(config(77, 3)).unwrap();
    assert_eq!(first.traces(), second.traces());
    assert_eq!(first.leaves(), second.leaves());
    let endpoints = |city: &City| {
        city.network()
            .roads()
            .map(|road| (road.point_a(), road.point_b()))
            .collect::<Vec<_>>()
    };
    assert_eq!(endpoints(&first), endpoints(&second));
}

#[test]
fn test_noise_start_is_seeded() {
    let noise_config = |seed| {
        let mut config = config(seed, 1);
        config.start.source = StartSource::NoiseField { limit: 2 };
        config.noise.threshold = 0.0;
        config.noise.grid_size = 8;
        config
    };
    let first = City::generate(noise_config(1)).unwrap();
    let again = City::generate(noise_config(1)).unwrap();
    assert_eq!(first.start_candidates(), again.start_candidates());
    assert_eq!(first.traces().len(), 2);
}

#[test]
fn test_leaves_growth() {
    // Every X in the program becomes a leaf, and with the default 45°
    // turns, no two land on the same spot after two passes
    let city = City::generate(config(3, 2)).unwrap();
    assert_eq!(city.leaves().len(), 16);
    let positions: Vec<Point3<f64>> =
        city.leaves().iter().map(|leaf| leaf.position).collect();
    assert!(positions.windows(2).all(|pair| pair[0].x <= pair[1].x));
}

#[test]
fn test_exclusion_zones_after_generation() {
    let mut config = config(9, 1);
    config.start.poses = vec![TurtleState::origin()];
    let mut city = City::generate(config).unwrap();
    let network = city.network();
    assert_eq!(network.zones().count(), network.len() * 2);

    // Right on top of the trunk
    let footprint = quad_xz([(-0.5, 4.0), (0.5, 4.0), (0.5, 5.0), (-0.5, 5.0)]);
    assert!(!network.is_footprint_clear(&footprint));
    let far_away = quad_xz([
        (500.0, 500.0),
        (501.0, 500.0),
        (501.0, 501.0),
        (500.0, 501.0),
    ]);
    assert!(network.is_footprint_clear(&far_away));

    // Removing every road clears the footprint
    let handles: Vec<_> = network.roads().map(|road| road.handle()).collect();
    for handle in handles {
        city.network_mut().remove_road(handle).unwrap();
    }
    assert!(city.network().is_footprint_clear(&footprint));
}
