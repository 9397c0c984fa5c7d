//! STL export of road meshes. Only available with the "stl" feature enabled.

use crate::{
    geometry::mesh::MeshVertex, network::RoadNetwork, render::network_triangles,
};
use nalgebra::Vector3;
use stl_io::{Normal, Triangle, Vertex};

/// Convert every road mesh in the network into STL triangles. STL only
/// carries geometry, so the per-vertex normals are replaced with one face
/// normal per triangle. Like the rest of this crate, **Y is up**.
pub fn network_to_stl(network: &RoadNetwork) -> Vec<Triangle> {
    network_triangles(network)
        .iter()
        .map(|[v0, v1, v2]| Triangle {
            normal: Normal::new(face_normal(v0, v1, v2)),
            vertices: [
                Vertex::new(v0.position),
                Vertex::new(v1.position),
                Vertex::new(v2.position),
            ],
        })
        .collect()
}

/// Normal of a counter-clockwise triangle. Degenerate triangles (which the
/// tips of a cap fan on a very narrow road can be) just face up.
fn face_normal(
    v0: &MeshVertex,
    v1: &MeshVertex,
    v2: &MeshVertex,
) -> [f32; 3] {
    let p0 = Vector3::from(v0.position);
    let edge1 = Vector3::from(v1.position) - p0;
    let edge2 = Vector3::from(v2.position) - p0;
    let normal = edge1
        .cross(&edge2)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::y);
    [normal.x, normal.y, normal.z]
}
