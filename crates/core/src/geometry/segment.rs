use crate::geometry::{
    flatten, horizontal,
    mesh::{MeshVertex, RoadMesh},
    overlap::perpendicular_xz,
    Quad,
};
use anyhow::{anyhow, bail};
use log::trace;
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use std::f64::consts::PI;

/// Roads can't be any narrower than this. Narrower widths get clamped up to
/// it rather than rejected.
pub const MIN_ROAD_WIDTH: f64 = 0.1;

/// Endpoints closer than this in the XZ plane have no usable direction
const MIN_HORIZONTAL_LENGTH: f64 = 1e-9;

/// Everything derived from a road segment's endpoints and width. All of
/// these are computed together in [SegmentGeometry::compute], and there is no
/// way to update only some of them, so they can never disagree with each
/// other.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SegmentGeometry {
    /// Renderable road surface. See [RoadMesh] for the layout.
    pub mesh: RoadMesh,
    /// Rectangle that fully contains the rounded road, for coarse overlap
    /// tests
    pub obb: Quad,
    /// Reserved strip alongside the road on the `+n` side, where `n` is the
    /// road direction rotated 90° in the XZ plane
    pub left_zone: Quad,
    /// Reserved strip alongside the road on the `-n` side
    pub right_zone: Quad,
}

impl SegmentGeometry {
    /// Compute geometry for a road running from `a` to `b`.
    ///
    /// The road is a "stadium": a rectangle from A to B, with a semicircular
    /// cap on each end. The caps are sampled at `curve_sides / 2 + 1` points,
    /// so a full circle would have `curve_sides` sides.
    ///
    /// The road direction ignores Y, so sloped roads stay the same width.
    /// Returns an error if the endpoints have no horizontal separation, or if
    /// `curve_sides` isn't even and at least 4. `width` is clamped to
    /// [MIN_ROAD_WIDTH].
    pub fn compute(
        a: Point3<f64>,
        b: Point3<f64>,
        width: f64,
        curve_sides: u32,
    ) -> anyhow::Result<Self> {
        if curve_sides < 4 || curve_sides % 2 != 0 {
            bail!(
                "curve sides must be even and at least 4, got {}",
                curve_sides
            );
        }
        let width = clamp_width(width);
        let radius = width / 2.0;

        let flat_delta = horizontal(b - a);
        let length = flat_delta.norm();
        if length < MIN_HORIZONTAL_LENGTH {
            return Err(anyhow!(
                "degenerate road segment {} -> {} has no direction",
                a,
                b
            ));
        }
        // Road direction, and the lateral direction 90° from it
        let u = flat_delta / length;
        let n = perpendicular_xz(&u);

        // The body is inset from each endpoint by one radius, so the end
        // connectors are square with the caps. Short roads can't be inset
        // past their own midpoint.
        let inset = radius.min(length / 2.0);
        let shoulder_a = a + u * inset;
        let shoulder_b = b - u * inset;

        let half_sides = (curve_sides / 2) as usize;
        let step = 2.0 * PI / curve_sides as f64;
        // Cap A faces -u, cap B faces +u. Each sweeps a half circle
        // *clockwise* (decreasing angle) so the fans are wound CCW when viewed
        // from above.
        let cap_a = cap_fan(a, -n, -u, radius, half_sides, step);
        let cap_b = cap_fan(b, n, u, radius, half_sides, step);

        let body_normal = body_normal(shoulder_a, shoulder_b, n);
        let body = [
            MeshVertex::up(a - n * radius),
            MeshVertex::up(a + n * radius),
            MeshVertex::new(shoulder_a - n * radius, body_normal),
            MeshVertex::new(shoulder_a + n * radius, body_normal),
            MeshVertex::new(shoulder_b - n * radius, body_normal),
            MeshVertex::new(shoulder_b + n * radius, body_normal),
            MeshVertex::up(b - n * radius),
            MeshVertex::up(b + n * radius),
        ];

        // All the footprints are flat, and share a winding: edge 0→1 runs
        // along +u, edge 1→2 along +n
        let outer_a = a - u * radius;
        let outer_b = b + u * radius;
        let obb = [
            flatten(outer_a - n * radius),
            flatten(outer_b - n * radius),
            flatten(outer_b + n * radius),
            flatten(outer_a + n * radius),
        ];
        // Zones cover the body between the shoulders. A road no longer than
        // it is wide has no body, so its zones run the whole centerline
        // instead of collapsing to a line.
        let (zone_a, zone_b) = if length <= width {
            (a, b)
        } else {
            (shoulder_a, shoulder_b)
        };
        let left_zone = lateral_zone(zone_a, zone_b, n * radius, n * width);
        let right_zone =
            lateral_zone(zone_a, zone_b, -n * (radius + width), n * width);

        trace!("Computed geometry for road {} -> {} (width {})", a, b, width);
        Ok(Self {
            mesh: RoadMesh::new(cap_a, cap_b, body),
            obb,
            left_zone,
            right_zone,
        })
    }
}

/// Clamp a road width up to [MIN_ROAD_WIDTH]
pub fn clamp_width(width: f64) -> f64 {
    // NaN also ends up at the minimum
    if width >= MIN_ROAD_WIDTH {
        width
    } else {
        MIN_ROAD_WIDTH
    }
}

/// Build a half-circle triangle fan around `center`. The fan starts at the
/// `start` direction and sweeps clockwise through `outward`, ending opposite
/// of where it started.
fn cap_fan(
    center: Point3<f64>,
    start: Vector3<f64>,
    outward: Vector3<f64>,
    radius: f64,
    half_sides: usize,
    step: f64,
) -> Vec<MeshVertex> {
    let mut fan = Vec::with_capacity(half_sides + 2);
    fan.push(MeshVertex::up(center));
    for i in 0..=half_sides {
        // Angle is measured from `start`, toward `outward`
        let angle = step * i as f64;
        let offset = start * angle.cos() + outward * angle.sin();
        fan.push(MeshVertex::up(center + offset * radius));
    }
    fan
}

/// Normal for the main body quad. On sloped roads this tilts with the slope.
/// Always faces upward.
fn body_normal(
    shoulder_a: Point3<f64>,
    shoulder_b: Point3<f64>,
    n: Vector3<f64>,
) -> Vector3<f64> {
    let along = shoulder_b - shoulder_a;
    let normal = n.cross(&along);
    // The shoulders can be coincident on very short roads, leaving nothing
    // to take a cross product of
    match normal.try_normalize(f64::EPSILON) {
        Some(normal) if normal.y < 0.0 => -normal,
        Some(normal) => normal,
        None => Vector3::y(),
    }
}

/// Build a zone quad running alongside the road from `start` to `end`.
/// `offset` moves the inner edge off the centerline and `depth` spans the
/// quad outward along `+n`.
fn lateral_zone(
    start: Point3<f64>,
    end: Point3<f64>,
    offset: Vector3<f64>,
    depth: Vector3<f64>,
) -> Quad {
    [
        flatten(start + offset),
        flatten(end + offset),
        flatten(end + offset + depth),
        flatten(start + offset + depth),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{mesh::Primitive, overlap::quads_overlap, quad_xz};
    use assert_approx_eq::assert_approx_eq;

    fn point(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    fn position(vertex: &MeshVertex) -> Point3<f64> {
        let [x, y, z] = vertex.position;
        point(x as f64, y as f64, z as f64)
    }

    /// Distance from a point to the infinite XZ line through a and b
    fn distance_to_line(
        p: Point3<f64>,
        a: Point3<f64>,
        b: Point3<f64>,
    ) -> f64 {
        let u = horizontal(b - a).normalize();
        perpendicular_xz(&u).dot(&horizontal(p - a)).abs()
    }

    /// Segments heading in every direction, including straight along each
    /// axis and with point A on either side of point B
    fn all_directions() -> Vec<(Point3<f64>, Point3<f64>)> {
        vec![
            (point(0.0, 0.0, 0.0), point(10.0, 0.0, 0.0)),
            (point(10.0, 0.0, 0.0), point(0.0, 0.0, 0.0)),
            (point(0.0, 0.0, 0.0), point(0.0, 0.0, 10.0)),
            (point(0.0, 0.0, 10.0), point(0.0, 0.0, 0.0)),
            (point(1.0, 0.0, 2.0), point(8.0, 0.0, 9.0)),
            (point(8.0, 0.0, 9.0), point(1.0, 0.0, 2.0)),
            (point(-3.0, 0.0, 5.0), point(4.0, 0.0, -6.0)),
            (point(4.0, 2.0, -6.0), point(-3.0, 7.0, 5.0)),
        ]
    }

    #[test]
    fn test_layout() {
        let geometry = SegmentGeometry::compute(
            point(0.0, 0.0, 0.0),
            point(0.0, 0.0, 10.0),
            2.0,
            16,
        )
        .unwrap();
        let mesh = &geometry.mesh;
        assert_eq!(mesh.cap_a().len(), 10);
        assert_eq!(mesh.cap_b().len(), 10);
        assert_eq!(mesh.body().len(), 8);
        assert_eq!(mesh.vertices().len(), 28);
        assert_eq!(mesh.to_floats().len(), 28 * 6);

        let ranges = mesh.draw_ranges();
        assert_eq!(ranges[0].primitive, Primitive::TriangleFan);
        assert_eq!((ranges[0].first, ranges[0].count), (0, 10));
        assert_eq!(ranges[1].primitive, Primitive::TriangleFan);
        assert_eq!((ranges[1].first, ranges[1].count), (10, 10));
        assert_eq!(ranges[2].primitive, Primitive::TriangleStrip);
        assert_eq!((ranges[2].first, ranges[2].count), (20, 8));

        // 8 triangles per cap, 6 for the body
        assert_eq!(mesh.triangles().len(), 8 + 8 + 6);
    }

    #[test]
    fn test_caps_face_outward() {
        for (a, b) in all_directions() {
            let geometry = SegmentGeometry::compute(a, b, 2.0, 8).unwrap();
            let u = horizontal(b - a).normalize();
            for vertex in &geometry.mesh.cap_a()[1..] {
                let p = position(vertex);
                assert!(u.dot(&(p - a)) <= 1e-5, "{} -> {}: {}", a, b, p);
                assert_approx_eq!(horizontal(p - a).norm(), 1.0, 1e-5);
                assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
            }
            for vertex in &geometry.mesh.cap_b()[1..] {
                let p = position(vertex);
                assert!(u.dot(&(p - b)) >= -1e-5, "{} -> {}: {}", a, b, p);
                assert_approx_eq!(horizontal(p - b).norm(), 1.0, 1e-5);
            }
        }
    }

    #[test]
    fn test_triangles_face_up() {
        for (a, b) in all_directions() {
            let geometry = SegmentGeometry::compute(a, b, 3.0, 12).unwrap();
            for [v0, v1, v2] in geometry.mesh.triangles() {
                let p0 = position(&v0);
                let normal =
                    (position(&v1) - p0).cross(&(position(&v2) - p0));
                assert!(normal.y > 0.0, "{} -> {}: {:?}", a, b, normal);
            }
        }
    }

    #[test]
    fn test_sloped_body_normal() {
        let geometry = SegmentGeometry::compute(
            point(0.0, 0.0, 0.0),
            point(10.0, 10.0, 0.0),
            2.0,
            4,
        )
        .unwrap();
        let body = geometry.mesh.body();
        // End connectors are flat, the middle quad tilts back up the slope
        assert_eq!(body[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(body[7].normal, [0.0, 1.0, 0.0]);
        let [x, y, z] = body[3].normal;
        assert!(x < 0.0 && y > 0.0);
        assert_approx_eq!(z, 0.0);
        assert_approx_eq!(x * x + y * y + z * z, 1.0, 1e-5);
    }

    #[test]
    fn test_obb_contains_road() {
        for (a, b) in all_directions() {
            for &width in &[0.5, 2.0, 7.0] {
                let geometry =
                    SegmentGeometry::compute(a, b, width, 16).unwrap();
                for corner in &geometry.obb {
                    assert_eq!(corner.y, 0.0);
                    assert!(
                        distance_to_line(*corner, a, b) >= width / 2.0 - 1e-9
                    );
                }
                // Every cap point is inside the OBB
                let obb = geometry.obb;
                let origin = obb[0];
                let along = obb[1] - obb[0];
                let across = obb[3] - obb[0];
                for vertex in geometry.mesh.vertices() {
                    let p = flatten(position(vertex)) - origin;
                    let s = p.dot(&along) / along.norm_squared();
                    let t = p.dot(&across) / across.norm_squared();
                    assert!((-1e-5..=1.0 + 1e-5).contains(&s));
                    assert!((-1e-5..=1.0 + 1e-5).contains(&t));
                }
            }
        }
    }

    #[test]
    fn test_zones() {
        let a = point(0.0, 0.0, 0.0);
        let b = point(20.0, 0.0, 0.0);
        let geometry = SegmentGeometry::compute(a, b, 2.0, 8).unwrap();

        // u = +X, n = +Z
        let left = geometry.left_zone;
        assert_approx_eq!(left[0].x, 1.0);
        assert_approx_eq!(left[1].x, 19.0);
        assert_approx_eq!(left[0].z, 1.0);
        assert_approx_eq!(left[2].z, 3.0);
        let right = geometry.right_zone;
        assert_approx_eq!(right[0].z, -3.0);
        assert_approx_eq!(right[2].z, -1.0);

        // Zones sit beside the road, so they only graze the OBB and don't
        // overlap each other
        assert!(!quads_overlap(&left, &right));
        assert!(!quads_overlap(&left, &geometry.obb));
        assert!(!quads_overlap(&right, &geometry.obb));

        for zone in &[left, right] {
            for corner in zone {
                assert!(distance_to_line(*corner, a, b) >= 1.0 - 1e-9);
            }
        }
    }

    #[test]
    fn test_width_floor() {
        let geometry = SegmentGeometry::compute(
            point(0.0, 0.0, 0.0),
            point(5.0, 0.0, 0.0),
            0.01,
            4,
        )
        .unwrap();
        assert_approx_eq!(clamp_width(0.01), MIN_ROAD_WIDTH);
        assert_approx_eq!(clamp_width(f64::NAN), MIN_ROAD_WIDTH);
        assert_approx_eq!(clamp_width(3.0), 3.0);
        // OBB is a full width across
        assert_approx_eq!((geometry.obb[3] - geometry.obb[0]).norm(), 0.1);
    }

    #[test]
    fn test_short_segment() {
        // Shorter than it is wide, so the shoulders meet in the middle
        let geometry = SegmentGeometry::compute(
            point(0.0, 0.0, 0.0),
            point(1.0, 0.0, 0.0),
            4.0,
            8,
        )
        .unwrap();
        let body = geometry.mesh.body();
        assert_eq!(body[2].position, body[4].position);
        assert_eq!(body[3].normal, [0.0, 1.0, 0.0]);

        // The zones still have area, running the full length of the road
        let left = geometry.left_zone;
        assert_approx_eq!(left[0].x, 0.0);
        assert_approx_eq!(left[1].x, 1.0);
        assert_approx_eq!(left[0].z, 2.0);
        assert_approx_eq!(left[2].z, 6.0);
        let right = geometry.right_zone;
        assert_approx_eq!(right[0].z, -6.0);
        assert_approx_eq!(right[2].z, -2.0);
    }

    #[test]
    fn test_short_segment_zones_overlap() {
        // Exactly as long as it is wide, and a bit shorter
        for &length in &[2.0, 1.5] {
            let geometry = SegmentGeometry::compute(
                point(0.0, 0.0, 0.0),
                point(length, 0.0, 0.0),
                2.0,
                8,
            )
            .unwrap();
            // Footprints sitting squarely in the strip beside the road
            let left = quad_xz([
                (0.25, 1.5),
                (1.25, 1.5),
                (1.25, 2.5),
                (0.25, 2.5),
            ]);
            let right = quad_xz([
                (0.25, -2.5),
                (1.25, -2.5),
                (1.25, -1.5),
                (0.25, -1.5),
            ]);
            assert!(quads_overlap(&geometry.left_zone, &left));
            assert!(quads_overlap(&geometry.right_zone, &right));
            assert!(!quads_overlap(&geometry.left_zone, &right));
            // Neither footprint touches the road itself
            assert!(!quads_overlap(&geometry.obb, &left));
        }
    }

    #[test]
    fn test_invalid_input() {
        let a = point(1.0, 0.0, 1.0);
        assert!(SegmentGeometry::compute(a, a, 2.0, 8).is_err());
        // Straight up has no horizontal direction either
        assert!(
            SegmentGeometry::compute(a, point(1.0, 5.0, 1.0), 2.0, 8).is_err()
        );
        let b = point(5.0, 0.0, 1.0);
        assert!(SegmentGeometry::compute(a, b, 2.0, 2).is_err());
        assert!(SegmentGeometry::compute(a, b, 2.0, 9).is_err());
    }
}
