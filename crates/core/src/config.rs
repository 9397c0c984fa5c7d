mod seed;

pub use crate::config::seed::Seed;
use crate::generate::turtle::TurtleState;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use validator::{Validate, ValidationError};

/// Configuration that defines a city generation run. Two cities generated
/// with the same config will always be identical.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CityConfig {
    /// RNG seed for every randomized process during generation. See [Seed]
    /// for the formats this accepts.
    pub seed: Seed,

    /// Config for the L-system that produces the turtle program
    #[validate]
    pub grammar: GrammarConfig,

    /// Config for the turtle that walks the expanded program
    #[validate]
    pub turtle: TurtleConfig,

    /// Config for the geometry of each road segment
    #[validate]
    pub road: RoadConfig,

    /// Where the road trees start growing from
    #[validate]
    pub start: StartConfig,

    /// Config for the noise field that produces candidate start points
    #[validate]
    pub noise: NoiseFieldConfig,
}

/// Configuration for grammar expansion. The production rules themselves are
/// fixed, see [RuleSet::city_streets](crate::RuleSet::city_streets).
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GrammarConfig {
    /// Starting string for the L-system. An empty axiom is treated as `X`.
    pub axiom: String,

    /// Number of rewrite passes. Every `X` turns into 4 more each pass, so
    /// the output grows *fast*. 8 passes is already ~65k branches.
    #[validate(range(min = 0, max = 8))]
    pub iterations: u8,
}

/// Configuration for the turtle interpreter
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TurtleConfig {
    /// Distance the turtle moves on every forward step, in world units
    #[validate(range(min = 0.001))]
    pub step_length: f64,

    /// Angle the turtle turns on every `+`/`-`, in **degrees**
    pub turn_angle: f64,
}

/// Configuration for road segment geometry
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RoadConfig {
    /// Width of every road. Widths below
    /// [MIN_ROAD_WIDTH](crate::MIN_ROAD_WIDTH) are clamped rather than
    /// rejected.
    pub width: f64,

    /// Number of sides a full circle would have with the resolution used for
    /// the rounded end caps. Must be even and at least 4.
    #[validate(custom = "validate_curve_sides")]
    pub curve_sides: u32,
}

/// Configuration for where the road trees are rooted. Each start pose grows
/// an independent tree from the same expanded program.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StartConfig {
    /// Explicit start poses. Headings are in radians, with 0 facing +Z.
    #[validate(length(min = 1))]
    pub poses: Vec<TurtleState>,

    /// How the start poses are chosen
    pub source: StartSource,
}

/// Strategy for picking the turtle's start pose(s)
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum StartSource {
    /// Use [StartConfig::poses] as-is
    Explicit,
    /// Use up to `limit` candidate points from the noise field, each with
    /// heading 0. Falls back to the explicit poses if the field produces no
    /// candidates.
    NoiseField { limit: usize },
}

/// Config for the seeded 2D noise field. The field is sampled on a square
/// grid centered on the origin; every sample whose normalized value is at or
/// above `threshold` becomes a candidate start point.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NoiseFieldConfig {
    pub noise_type: NoiseFnType,

    /// Number of different frequencies to add together
    #[validate(range(min = 1))]
    pub octaves: usize,

    /// The frequency of the first (lowest) octave
    #[validate(range(min = 0.0))]
    pub frequency: f64,

    /// Frequency multiplier between successive octaves
    pub lacunarity: f64,

    /// Amplitude multiplier between successive octaves
    pub persistence: f64,

    /// Number of samples along each side of the grid
    #[validate(range(min = 1, max = 4096))]
    pub grid_size: u32,

    /// Distance between adjacent grid samples, in world units
    #[validate(range(min = 0.001))]
    pub cell_size: f64,

    /// Minimum normalized noise value for a sample to become a candidate
    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold: f64,
}

/// The supported noise function types. Both are seedable and multi-fractal.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NoiseFnType {
    Fbm,
    RidgedMulti,
}

fn validate_curve_sides(curve_sides: u32) -> Result<(), ValidationError> {
    if curve_sides >= 4 && curve_sides % 2 == 0 {
        Ok(())
    } else {
        Err(ValidationError::new("curve_sides must be even and at least 4"))
    }
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            // Danger! This means the default will vary between calls!
            seed: Seed::random(),
            grammar: GrammarConfig::default(),
            turtle: TurtleConfig::default(),
            road: RoadConfig::default(),
            start: StartConfig::default(),
            noise: NoiseFieldConfig::default(),
        }
    }
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            axiom: "X".into(),
            iterations: 3,
        }
    }
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            step_length: 10.0,
            turn_angle: 45.0,
        }
    }
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            width: 2.0,
            curve_sides: 16,
        }
    }
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            poses: vec![TurtleState::origin()],
            source: StartSource::Explicit,
        }
    }
}

impl Default for NoiseFieldConfig {
    fn default() -> Self {
        Self {
            noise_type: NoiseFnType::Fbm,
            octaves: 3,
            frequency: 0.5,
            lacunarity: 2.0,
            persistence: 0.5,
            grid_size: 64,
            cell_size: 10.0,
            threshold: 0.8,
        }
    }
}
