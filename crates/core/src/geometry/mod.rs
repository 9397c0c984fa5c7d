//! Geometry for a single road segment, and the overlap tests used against
//! it. Everything here is pure math; ownership of segments lives in
//! [crate::network].
//!
//! ## Coordinate System
//! Y is up. Roads lie (roughly) in the XZ plane, and all 2D footprints (OBBs,
//! exclusion zones, building footprints) are quads in the XZ plane with
//! `y = 0`. A heading of 0 faces +Z.

pub mod mesh;
pub mod overlap;
pub mod segment;

use nalgebra::{Point3, Vector3};

/// Four points in the XZ plane (`y = 0`), in a consistent winding order.
/// Edges `0→1` and `1→2` are perpendicular for every quad this crate
/// produces, so those two edges define the quad's separating axes.
pub type Quad = [Point3<f64>; 4];

/// Drop a point onto the XZ plane
pub fn flatten(point: Point3<f64>) -> Point3<f64> {
    Point3::new(point.x, 0.0, point.z)
}

/// Drop the vertical component of a vector
pub fn horizontal(vector: Vector3<f64>) -> Vector3<f64> {
    Vector3::new(vector.x, 0.0, vector.z)
}

/// Build a quad from its XZ coordinates
pub fn quad_xz(points: [(f64, f64); 4]) -> Quad {
    let [p0, p1, p2, p3] = points;
    [
        Point3::new(p0.0, 0.0, p0.1),
        Point3::new(p1.0, 0.0, p1.1),
        Point3::new(p2.0, 0.0, p2.1),
        Point3::new(p3.0, 0.0, p3.1),
    ]
}
