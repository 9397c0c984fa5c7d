pub mod grammar;
pub mod noise;
pub mod turtle;

use crate::{
    config::{CityConfig, StartSource},
    generate::{
        grammar::{expand, RuleSet},
        noise::NoiseField,
        turtle::{LeafSet, TurtleInterpreter, TurtleState, TurtleTrace},
    },
    network::RoadNetwork,
    timed,
};
use anyhow::Context;
use log::{debug, error, info, warn};
use nalgebra::Point3;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::Serialize;
use validator::Validate;

/// A generated city: the road network, plus everything needed to explain how
/// it was built.
#[derive(Clone, Debug, Serialize)]
pub struct City {
    config: CityConfig,
    network: RoadNetwork,
    leaves: LeafSet,
    start_candidates: Vec<Point3<f64>>,
    #[serde(skip)]
    traces: Vec<TurtleTrace>,
}

impl City {
    /// Generate a new city from the given config. Returns an error if the
    /// config is invalid. A start pose whose road tree fails to generate is
    /// logged and skipped; it doesn't fail the whole city.
    pub fn generate(config: CityConfig) -> anyhow::Result<Self> {
        info!("Generating city with config {:#?}", config);
        config.validate().context("invalid config")?;

        let city = timed!(
            "City generation",
            log::Level::Info,
            CityBuilder::new(config).generate()
        );
        info!(
            "Generated {} roads with {} leaves from {} tree(s)",
            city.network.len(),
            city.leaves.len(),
            city.traces.len()
        );
        Ok(city)
    }

    /// The config that defines this city
    pub fn config(&self) -> &CityConfig {
        &self.config
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Mutable access to the network, e.g. to remove or adjust roads after
    /// generation
    pub fn network_mut(&mut self) -> &mut RoadNetwork {
        &mut self.network
    }

    /// Tips of every road tree, merged across all start poses
    pub fn leaves(&self) -> &LeafSet {
        &self.leaves
    }

    /// Candidate start points from the noise field, strongest first. These
    /// are only used as start poses if the config asks for it.
    pub fn start_candidates(&self) -> &[Point3<f64>] {
        &self.start_candidates
    }

    /// One trace per road tree that generated successfully, in start pose
    /// order
    pub fn traces(&self) -> &[TurtleTrace] {
        &self.traces
    }

    /// Serialize a summary of this city (config, roads and leaves) to JSON
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> String {
        // Panic here indicates a bug in our data format
        serde_json::to_string(self).expect("error serializing city")
    }
}

/// The context for a single generation run. Everything random is driven off
/// the one RNG here, which is seeded from the config, so a run is fully
/// reproducible.
struct CityBuilder {
    config: CityConfig,
    rng: Pcg64,
    rules: RuleSet,
    network: RoadNetwork,
}

impl CityBuilder {
    fn new(config: CityConfig) -> Self {
        let rng = Pcg64::seed_from_u64(config.seed.to_u64());
        let network = RoadNetwork::new(config.road.curve_sides);
        Self {
            config,
            rng,
            rules: RuleSet::city_streets(),
            network,
        }
    }

    fn generate(mut self) -> City {
        let start_candidates = timed!("Noise field", {
            NoiseField::new(&mut self.rng, self.config.noise).candidates()
        });
        debug!("Noise field produced {} candidates", start_candidates.len());
        let start_poses = self.start_poses(&start_candidates);

        let program = timed!(
            "Grammar expansion",
            expand(
                &self.config.grammar.axiom,
                &self.rules,
                self.config.grammar.iterations,
            )
        );
        debug!("Expanded program has {} symbols", program.len());

        let interpreter = TurtleInterpreter::from_config(
            &self.config.turtle,
            &self.config.road,
        );
        let mut leaves = LeafSet::default();
        let mut traces = Vec::with_capacity(start_poses.len());
        for start in start_poses {
            let result = timed!(
                "Turtle interpretation",
                interpreter.interpret(&program, start, &mut self.network)
            );
            match result {
                Ok(trace) => {
                    leaves.extend(trace.leaves.iter().copied());
                    traces.push(trace);
                }
                Err(err) => {
                    error!("Abandoning road tree from {:?}: {}", start, err);
                    // The roads it got to stay in the network, and so do
                    // their leaves
                    leaves.extend(err.trace.leaves.iter().copied());
                }
            }
        }

        City {
            config: self.config,
            network: self.network,
            leaves,
            start_candidates,
            traces,
        }
    }

    fn start_poses(&self, candidates: &[Point3<f64>]) -> Vec<TurtleState> {
        match self.config.start.source {
            StartSource::Explicit => self.config.start.poses.clone(),
            StartSource::NoiseField { limit } if !candidates.is_empty() => {
                candidates
                    .iter()
                    .take(limit)
                    .map(|position| TurtleState::new(*position, 0.0))
                    .collect()
            }
            StartSource::NoiseField { .. } => {
                warn!("Noise field has no candidates, using explicit poses");
                self.config.start.poses.clone()
            }
        }
    }
}
