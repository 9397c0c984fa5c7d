//! Conversion of generated roads into formats that can be viewed outside of
//! this crate. Each output format is behind its own feature.

#[cfg(feature = "stl")]
mod stl;
#[cfg(feature = "svg")]
mod svg;

#[cfg(feature = "svg")]
use crate::City;
use crate::{geometry::mesh::MeshVertex, network::RoadNetwork};

/// An axis-aligned rectangle on the XZ plane
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

impl Bounds {
    /// The smallest rectangle covering every road, including its exclusion
    /// zones. `None` if the network is empty.
    pub fn of_network(network: &RoadNetwork) -> Option<Self> {
        let mut points = network.roads().flat_map(|road| {
            let zones = road.zones();
            road.obb()
                .iter()
                .chain(zones[0].vertices())
                .chain(zones[1].vertices())
                .copied()
                .collect::<Vec<_>>()
        });
        let first = points.next()?;
        let initial = Self {
            min_x: first.x,
            min_z: first.z,
            max_x: first.x,
            max_z: first.z,
        };
        Some(points.fold(initial, |bounds, point| Self {
            min_x: bounds.min_x.min(point.x),
            min_z: bounds.min_z.min(point.z),
            max_x: bounds.max_x.max(point.x),
            max_z: bounds.max_z.max(point.z),
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_z - self.min_z
    }

    /// Grow the rectangle by `margin` on every side
    pub fn pad(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_z: self.min_z - margin,
            max_x: self.max_x + margin,
            max_z: self.max_z + margin,
        }
    }
}

/// Every triangle of every road mesh, in network order. Triangles are wound
/// counter-clockwise when viewed from above.
pub fn network_triangles(network: &RoadNetwork) -> Vec<[MeshVertex; 3]> {
    network
        .roads()
        .flat_map(|road| road.mesh().triangles())
        .collect()
}

/// Render the road meshes as a binary STL model. Y is up.
#[cfg(feature = "stl")]
pub fn render_as_stl(network: &RoadNetwork) -> Vec<u8> {
    let mesh = stl::network_to_stl(network);
    let mut buffer = Vec::<u8>::new();
    // Panic here indicates a bug in our STL mesh format
    stl_io::write_stl(&mut buffer, mesh.iter())
        .expect("error serializing STL");
    buffer
}

/// Render the city as a 2D SVG, from a top-down perspective. Shows each
/// road's bounding box, exclusion zones and centerline, plus the leaves.
#[cfg(feature = "svg")]
pub fn render_as_svg(city: &City) -> String {
    svg::city_to_svg(city).to_string()
}
