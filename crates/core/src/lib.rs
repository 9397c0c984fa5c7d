//! Citygen procedurally generates a city road network from a formal grammar.
//! This crate contains all the core generation logic: grammar expansion, a
//! turtle interpreter that lays out the roads, per-segment road geometry, and
//! the exclusion zones other placement logic uses to stay off the roads.
//! Presentation (GPU upload, drawing, UI) lives elsewhere.
//!
//! ```
//! use citygen::{City, CityConfig};
//!
//! let config = CityConfig {
//!     seed: 1234.into(),
//!     ..Default::default()
//! };
//! let city = City::generate(config).unwrap();
//! println!("{} roads", city.network().len());
//! // From here you can mesh/render/query the network however you like.
//! ```
//!
//! See [CityConfig] for details on how generation can be customized.

mod config;
mod generate;
mod geometry;
mod network;
mod render;
mod util;

pub use crate::{
    config::{
        CityConfig, GrammarConfig, NoiseFieldConfig, NoiseFnType, RoadConfig,
        Seed, StartConfig, StartSource, TurtleConfig,
    },
    generate::{
        grammar::{expand, ProductionRule, RuleSet},
        noise::NoiseField,
        turtle::{
            InterpretError, LeafSet, SegmentKind, SegmentSpec,
            TurtleInterpreter, TurtleState, TurtleTrace,
        },
        City,
    },
    geometry::{
        mesh::{DrawRange, MeshVertex, Primitive, RoadMesh},
        overlap::{perpendicular_xz, projection_overlap, quads_overlap},
        quad_xz,
        segment::{SegmentGeometry, MIN_ROAD_WIDTH},
        Quad,
    },
    network::{
        zone::ExclusionZone, RoadCollection, RoadHandle, RoadNetwork,
        RoadSegment,
    },
    render::{network_triangles, Bounds},
    util::range::NumRange,
};

#[cfg(feature = "stl")]
pub use crate::render::render_as_stl;
#[cfg(feature = "svg")]
pub use crate::render::render_as_svg;
