//! Separating axis overlap tests for quads in the XZ plane. If the
//! projections of two convex shapes are disjoint on *any* axis, the shapes
//! don't intersect. For rectangles, the edge normals are the only axes that
//! need to be checked, and opposite edges share a normal, so two axes per
//! quad is enough.

use crate::geometry::Quad;
use nalgebra::Vector3;

/// Two projected intervals must overlap by *more* than this (in world units)
/// to count as overlapping. Shapes that merely touch, or overlap by a hair,
/// are considered separated.
pub const OVERLAP_TOLERANCE: f64 = 0.05;

/// Rotate a vector 90° within the XZ plane, leaving Y alone
pub fn perpendicular_xz(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(-v.z, v.y, v.x)
}

/// Project every vertex of the quad onto the axis, and get the min and max
/// of the projections
fn project(quad: &Quad, axis: &Vector3<f64>) -> (f64, f64) {
    quad.iter().map(|point| point.coords.dot(axis)).fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(min, max), projected| (min.min(projected), max.max(projected)),
    )
}

/// Check if two quads overlap when projected onto a single axis. Returns
/// `false` only if the projections are separated (within
/// [OVERLAP_TOLERANCE]). The axis doesn't need to be normalized, but the
/// tolerance is only in world units if it is.
pub fn projection_overlap(a: &Quad, b: &Quad, axis: &Vector3<f64>) -> bool {
    let (min_a, max_a) = project(a, axis);
    let (min_b, max_b) = project(b, axis);
    !(max_a <= min_b + OVERLAP_TOLERANCE || max_b <= min_a + OVERLAP_TOLERANCE)
}

/// Get the two candidate separating axes for a quad, which are the normals
/// of its first two edges. Axes are normalized so the overlap tolerance is
/// measured in world units. A zero-length edge gives a zero axis, which
/// projects everything to 0 and so always separates: a quad with no area
/// can't overlap anything.
pub fn edge_axes(quad: &Quad) -> [Vector3<f64>; 2] {
    let axis = |edge: Vector3<f64>| {
        perpendicular_xz(&edge)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    };
    [axis(quad[1] - quad[0]), axis(quad[2] - quad[1])]
}

/// Full separating axis test between two quads. They overlap iff their
/// projections overlap on all four candidate axes.
pub fn quads_overlap(a: &Quad, b: &Quad) -> bool {
    axes_overlap(a, &edge_axes(a), b)
}

/// Same as [quads_overlap], but with the axes of `a` already computed. Lets
/// callers that test one quad many times cache its axes.
pub(crate) fn axes_overlap(
    a: &Quad,
    a_axes: &[Vector3<f64>; 2],
    b: &Quad,
) -> bool {
    a_axes
        .iter()
        .chain(edge_axes(b).iter())
        .all(|axis| projection_overlap(a, b, axis))
}
