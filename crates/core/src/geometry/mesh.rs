use nalgebra::{Point3, Vector3};
use serde::Serialize;

/// A single vertex in a road mesh: 3 position floats followed by 3 normal
/// floats. This is the layout renderers upload directly.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    /// Number of floats each vertex takes up in an interleaved buffer
    pub const FLOATS: usize = 6;

    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position: [
                position.x as f32,
                position.y as f32,
                position.z as f32,
            ],
            normal: [normal.x as f32, normal.y as f32, normal.z as f32],
        }
    }

    /// A vertex with a normal facing straight up
    pub fn up(position: Point3<f64>) -> Self {
        Self::new(position, Vector3::y())
    }
}

/// The primitive a range of mesh vertices should be drawn with
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    TriangleFan,
    TriangleStrip,
}

/// A contiguous run of vertices in a [RoadMesh] that is drawn as one
/// primitive. No index buffer is needed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DrawRange {
    pub primitive: Primitive,
    /// Index of the first vertex in the range
    pub first: usize,
    /// Number of vertices in the range
    pub count: usize,
}

/// Vertex buffer for a single road segment. The layout is fixed:
/// 1. Cap A: a triangle fan of `curve_sides/2 + 2` vertices (center first)
/// 2. Cap B: another triangle fan of the same size
/// 3. Body: a triangle strip of 8 vertices
///
/// All triangles are wound counter-clockwise when viewed from above.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoadMesh {
    vertices: Vec<MeshVertex>,
    /// Vertices per end cap, including the center
    cap_len: usize,
}

impl RoadMesh {
    /// Number of vertices in the body strip
    pub const BODY_LEN: usize = 8;

    pub(crate) fn new(
        cap_a: Vec<MeshVertex>,
        cap_b: Vec<MeshVertex>,
        body: [MeshVertex; Self::BODY_LEN],
    ) -> Self {
        debug_assert_eq!(cap_a.len(), cap_b.len(), "caps must match in size");
        let cap_len = cap_a.len();
        let mut vertices = cap_a;
        vertices.extend(cap_b);
        vertices.extend_from_slice(&body);
        Self { vertices, cap_len }
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    /// Fan vertices for the cap around point A, center first
    pub fn cap_a(&self) -> &[MeshVertex] {
        &self.vertices[..self.cap_len]
    }

    /// Fan vertices for the cap around point B, center first
    pub fn cap_b(&self) -> &[MeshVertex] {
        &self.vertices[self.cap_len..self.cap_len * 2]
    }

    pub fn body(&self) -> &[MeshVertex] {
        &self.vertices[self.cap_len * 2..]
    }

    /// How to draw this mesh: two fans, then a strip
    pub fn draw_ranges(&self) -> [DrawRange; 3] {
        [
            DrawRange {
                primitive: Primitive::TriangleFan,
                first: 0,
                count: self.cap_len,
            },
            DrawRange {
                primitive: Primitive::TriangleFan,
                first: self.cap_len,
                count: self.cap_len,
            },
            DrawRange {
                primitive: Primitive::TriangleStrip,
                first: self.cap_len * 2,
                count: Self::BODY_LEN,
            },
        ]
    }

    /// Flatten the mesh into an interleaved `[pos, pos, pos, norm, norm,
    /// norm, ...]` buffer
    pub fn to_floats(&self) -> Vec<f32> {
        let mut buffer =
            Vec::with_capacity(self.vertices.len() * MeshVertex::FLOATS);
        for vertex in &self.vertices {
            buffer.extend_from_slice(&vertex.position);
            buffer.extend_from_slice(&vertex.normal);
        }
        buffer
    }

    /// Expand the fans and strip into a plain triangle list, for consumers
    /// that can't handle anything fancier. Winding is preserved.
    pub fn triangles(&self) -> Vec<[MeshVertex; 3]> {
        let mut triangles = Vec::new();
        for range in &self.draw_ranges() {
            let vertices =
                &self.vertices[range.first..range.first + range.count];
            match range.primitive {
                Primitive::TriangleFan => {
                    for pair in vertices[1..].windows(2) {
                        triangles.push([vertices[0], pair[0], pair[1]]);
                    }
                }
                Primitive::TriangleStrip => {
                    for (i, window) in vertices.windows(3).enumerate() {
                        // Every other triangle in a strip has flipped
                        // winding, so swap the first two to fix it
                        if i % 2 == 0 {
                            triangles.push([window[0], window[1], window[2]]);
                        } else {
                            triangles.push([window[1], window[0], window[2]]);
                        }
                    }
                }
            }
        }
        triangles
    }
}
