//! Indexed triangle mesh.

use crate::{Aabb, MeshBounds, MeshTopology, Triangle, Vertex};
use nalgebra::{Point3, Vector3};

/// An indexed triangle mesh.
///
/// Every pipeline stage produces one of these and hands it to the next
/// stage by value. Faces reference vertices by `u32` index and use
/// **counter-clockwise winding** viewed from outside.
///
/// # Example
///
/// ```
/// use insole_types::{IndexedMesh, MeshTopology, Vertex};
///
/// let mesh = IndexedMesh::from_parts(
///     vec![
///         Vertex::from_coords(0.0, 0.0, 0.0),
///         Vertex::from_coords(1.0, 0.0, 0.0),
///         Vertex::from_coords(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
/// assert_eq!(mesh.vertex_count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertices and faces.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from bare positions and faces.
    #[must_use]
    pub fn from_positions(positions: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices: positions.into_iter().map(Vertex::new).collect(),
            faces,
        }
    }

    /// Position of a vertex by `u32` index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of range (a face referencing a missing
    /// vertex is a construction bug, not recoverable input).
    #[inline]
    #[must_use]
    pub fn position(&self, index: u32) -> Point3<f64> {
        self.vertices[index as usize].position
    }

    /// Triangle for a face.
    #[inline]
    #[must_use]
    pub fn face_triangle(&self, face: [u32; 3]) -> Triangle {
        Triangle::new(
            self.position(face[0]),
            self.position(face[1]),
            self.position(face[2]),
        )
    }

    /// Translate mesh by the given vector.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }

    /// Mirror across the plane `y = mirror_y`, restoring outward winding.
    ///
    /// A reflection reverses orientation, so every face is flipped too.
    pub fn mirror_y(&mut self, mirror_y: f64) {
        for vertex in &mut self.vertices {
            vertex.position.y = 2.0f64.mul_add(mirror_y, -vertex.position.y);
            if let Some(ref mut normal) = vertex.normal {
                normal.y = -normal.y;
            }
        }
        for face in &mut self.faces {
            face.swap(1, 2);
        }
    }

    /// Compute the signed volume of the mesh.
    ///
    /// Sum of signed tetrahedra formed by each face and the origin. Positive
    /// for a closed mesh with outward normals, negative when inside out.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for &[i0, i1, i2] in &self.faces {
            let v0 = &self.vertices[i0 as usize].position;
            let v1 = &self.vertices[i1 as usize].position;
            let v2 = &self.vertices[i2 as usize].position;

            let cross = Vector3::new(
                v1.y.mul_add(v2.z, -(v1.z * v2.y)),
                v1.z.mul_add(v2.x, -(v1.x * v2.z)),
                v1.x.mul_add(v2.y, -(v1.y * v2.x)),
            );
            volume += v0.z.mul_add(cross.z, v0.x.mul_add(cross.x, v0.y * cross.y));
        }

        volume / 6.0
    }

    /// Absolute volume.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// A mesh is inside-out if its signed volume is negative.
    #[inline]
    #[must_use]
    pub fn is_inside_out(&self) -> bool {
        self.signed_volume() < 0.0
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }

    /// Flip all faces by reversing winding order.
    pub fn flip_normals(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
        for vertex in &mut self.vertices {
            if let Some(ref mut normal) = vertex.normal {
                *normal = -*normal;
            }
        }
    }

    /// Append another mesh, offsetting its face indices.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: mesh indices are u32; larger meshes are unsupported
    pub fn merge(&mut self, other: &Self) {
        let vertex_offset = self.vertices.len() as u32;

        self.vertices.extend(other.vertices.iter().cloned());
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + vertex_offset, f[1] + vertex_offset, f[2] + vertex_offset]),
        );
    }

    /// Concatenate many meshes in order.
    #[must_use]
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut out = Self::new();
        for part in parts {
            out.merge(part);
        }
        out
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    fn triangles(&self) -> impl Iterator<Item = Triangle> {
        self.faces.iter().map(|&f| self.face_triangle(f))
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }
}

/// Axis-aligned box mesh from `min` to `max` with outward-facing winding.
///
/// # Example
///
/// ```
/// use insole_types::{cuboid, MeshTopology, Point3};
///
/// let cube = cuboid(Point3::origin(), Point3::new(2.0, 2.0, 2.0));
/// assert_eq!(cube.face_count(), 12);
/// assert!((cube.signed_volume() - 8.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> IndexedMesh {
    let (a, b) = (min, max);
    let positions = vec![
        Point3::new(a.x, a.y, a.z), // 0
        Point3::new(b.x, a.y, a.z), // 1
        Point3::new(b.x, b.y, a.z), // 2
        Point3::new(a.x, b.y, a.z), // 3
        Point3::new(a.x, a.y, b.z), // 4
        Point3::new(b.x, a.y, b.z), // 5
        Point3::new(b.x, b.y, b.z), // 6
        Point3::new(a.x, b.y, b.z), // 7
    ];
    let faces = vec![
        // Bottom (-Z)
        [0, 2, 1],
        [0, 3, 2],
        // Top (+Z)
        [4, 5, 6],
        [4, 6, 7],
        // Front (-Y)
        [0, 1, 5],
        [0, 5, 4],
        // Back (+Y)
        [3, 7, 6],
        [3, 6, 2],
        // Left (-X)
        [0, 4, 7],
        [0, 7, 3],
        // Right (+X)
        [1, 2, 6],
        [1, 6, 5],
    ];
    IndexedMesh::from_positions(positions, faces)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cuboid_volume_and_area() {
        let cube = cuboid(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(cube.signed_volume(), 6.0, epsilon = 1e-12);
        assert_relative_eq!(cube.surface_area(), 22.0, epsilon = 1e-12);
        assert!(!cube.is_inside_out());
    }

    #[test]
    fn test_flip_normals_makes_inside_out() {
        let mut cube = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        cube.flip_normals();
        assert!(cube.is_inside_out());
        assert_relative_eq!(cube.volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mirror_keeps_outward_winding() {
        let mut cube = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        cube.mirror_y(2.0);
        let b = cube.bounds();
        assert_relative_eq!(b.min.y, 3.0);
        assert_relative_eq!(b.max.y, 4.0);
        assert!(cube.signed_volume() > 0.0);
    }

    #[test]
    fn test_merge_offsets_indices() {
        let a = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = cuboid(Point3::new(5.0, 0.0, 0.0), Point3::new(6.0, 1.0, 1.0));
        let merged = IndexedMesh::concat([&a, &b]);
        assert_eq!(merged.vertex_count(), 16);
        assert_eq!(merged.face_count(), 24);
        assert_eq!(merged.faces[12][0], 8);
        assert_relative_eq!(merged.signed_volume(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_mesh_bounds() {
        let mesh = IndexedMesh::new();
        assert!(mesh.is_empty());
        assert!(mesh.bounds_opt().is_none());
    }
}
