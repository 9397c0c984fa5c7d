use crate::{
    geometry::{
        overlap::{axes_overlap, edge_axes},
        Quad,
    },
    network::RoadHandle,
};
use nalgebra::Vector3;

/// A region next to a road that other procedural content (buildings, trees,
/// etc.) must stay out of. Each road owns two of these, one per side.
///
/// The zone's own separating axes are cached, since a zone gets tested
/// against many candidate footprints but rarely moves.
#[derive(Clone, Debug, PartialEq)]
pub struct ExclusionZone {
    vertices: Quad,
    owner: RoadHandle,
    axes: [Vector3<f64>; 2],
}

impl ExclusionZone {
    pub fn new(vertices: Quad, owner: RoadHandle) -> Self {
        Self {
            vertices,
            owner,
            axes: edge_axes(&vertices),
        }
    }

    pub fn vertices(&self) -> &Quad {
        &self.vertices
    }

    /// The road this zone belongs to
    pub fn owner(&self) -> RoadHandle {
        self.owner
    }

    /// Replace this zone's shape. Cached axes are recomputed, so every
    /// subsequent query sees the new shape.
    pub fn update_vertices(&mut self, vertices: Quad) {
        self.vertices = vertices;
        self.axes = edge_axes(&vertices);
    }

    /// Does the given footprint intersect this zone? Runs a full separating
    /// axis test, using two axes from each quad.
    pub fn intersects(&self, other: &Quad) -> bool {
        axes_overlap(&self.vertices, &self.axes, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::quad_xz;

    fn rect(x1: f64, z1: f64, x2: f64, z2: f64) -> Quad {
        quad_xz([(x1, z1), (x2, z1), (x2, z2), (x1, z2)])
    }

    #[test]
    fn test_intersects() {
        let zone = ExclusionZone::new(rect(0.0, 0.0, 10.0, 2.0), RoadHandle(3));
        assert_eq!(zone.owner(), RoadHandle(3));
        assert!(zone.intersects(&rect(5.0, 1.0, 6.0, 3.0)));
        assert!(zone.intersects(&rect(-1.0, -1.0, 11.0, 3.0)));
        assert!(!zone.intersects(&rect(5.0, 2.5, 6.0, 3.0)));
        assert!(!zone.intersects(&rect(10.5, 0.0, 12.0, 2.0)));

        // A rotated footprint just past the end of the zone
        let diamond =
            quad_xz([(11.0, 2.5), (12.0, 1.5), (13.0, 2.5), (12.0, 3.5)]);
        assert!(!zone.intersects(&diamond));
    }

    #[test]
    fn test_update_vertices() {
        let mut zone =
            ExclusionZone::new(rect(0.0, 0.0, 10.0, 2.0), RoadHandle(0));
        let footprint = rect(20.0, 20.0, 21.0, 21.0);
        assert!(!zone.intersects(&footprint));

        zone.update_vertices(rect(15.0, 15.0, 25.0, 25.0));
        assert_eq!(zone.vertices(), &rect(15.0, 15.0, 25.0, 25.0));
        assert!(zone.intersects(&footprint));
        assert!(!zone.intersects(&rect(0.0, 0.0, 1.0, 1.0)));

        // Rotate the zone 45°, which changes its axes too. The old axes
        // would report overlap here.
        zone.update_vertices(quad_xz([
            (0.0, 0.0),
            (4.0, 4.0),
            (2.0, 6.0),
            (-2.0, 2.0),
        ]));
        assert!(!zone.intersects(&rect(2.8, 0.0, 4.0, 1.2)));
        assert!(zone.intersects(&rect(0.0, 1.0, 1.0, 2.0)));
    }
}
