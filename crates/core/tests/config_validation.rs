use citygen::{
    City, CityConfig, GrammarConfig, NoiseFieldConfig, NoiseFnType, RoadConfig,
    StartConfig, StartSource, TurtleConfig,
};
use validator::ValidationErrors;

fn error_fields(config: CityConfig) -> Vec<&'static str> {
    let err = City::generate(config).unwrap_err();
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    let mut error_fields = validation_errors
        .errors()
        .keys()
        .copied()
        .collect::<Vec<&str>>();
    error_fields.sort_unstable();
    error_fields
}

#[test]
fn test_config_validation() {
    let config = CityConfig {
        seed: 0.into(),
        grammar: GrammarConfig {
            axiom: "".into(), // valid (treated as X)
            iterations: 9,    // invalid (too big)
        },
        turtle: TurtleConfig {
            step_length: 0.0,  // invalid
            turn_angle: -30.0, // valid
        },
        road: RoadConfig {
            width: 0.01,     // valid (clamped)
            curve_sides: 15, // invalid (odd)
        },
        start: StartConfig {
            poses: vec![], // invalid
            source: StartSource::Explicit,
        },
        noise: NoiseFieldConfig {
            noise_type: NoiseFnType::RidgedMulti,
            octaves: 0,        // invalid
            frequency: 1.0,    // valid
            lacunarity: -1.0,  // valid (but weird)
            persistence: -1.0, // valid (but weird)
            grid_size: 16,     // valid
            cell_size: 10.0,   // valid
            threshold: 1.5,    // invalid
        },
    };

    assert_eq!(
        error_fields(config),
        vec!["grammar", "noise", "road", "start", "turtle"],
    );
}

#[test]
fn test_single_invalid_field() {
    let mut config = CityConfig {
        seed: 0.into(),
        ..Default::default()
    };
    config.road.curve_sides = 2;
    assert_eq!(error_fields(config), vec!["road"]);
}

#[test]
fn test_narrow_roads_are_valid() {
    let mut config = CityConfig {
        seed: 0.into(),
        ..Default::default()
    };
    config.grammar.iterations = 1;
    config.road.width = 0.0;
    let city = City::generate(config).unwrap();
    assert!(city.network().roads().all(|road| road.width() == 0.1));
}
