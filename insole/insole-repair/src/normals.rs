//! Vertex normal computation.

use insole_types::IndexedMesh;
use nalgebra::Vector3;

/// Recompute area-weighted vertex normals.
///
/// Each face adds its unnormalized normal (twice its area) to its three
/// vertices. Vertices with no faces, or whose contributions cancel, get no
/// normal.
pub fn compute_vertex_normals(mesh: &mut IndexedMesh) {
    let mut sums = vec![Vector3::zeros(); mesh.vertices.len()];
    for &face in &mesh.faces {
        let n = mesh.face_triangle(face).normal_unnormalized();
        for i in face {
            sums[i as usize] += n;
        }
    }
    for (vertex, sum) in mesh.vertices.iter_mut().zip(sums) {
        let len = sum.norm();
        vertex.normal = (len > f64::EPSILON).then(|| sum / len);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_types::{Point3, Vertex, cuboid};

    #[test]
    fn test_flat_triangle_normals() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(5.0, 5.0, 5.0));
        mesh.faces.push([0, 1, 2]);
        compute_vertex_normals(&mut mesh);
        for v in &mesh.vertices[..3] {
            assert_relative_eq!(v.normal.unwrap().z, 1.0);
        }
        assert!(mesh.vertices[3].normal.is_none());
    }

    #[test]
    fn test_cube_corner_normals_point_outward() {
        let mut cube = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        compute_vertex_normals(&mut cube);
        let center = Point3::new(0.5, 0.5, 0.5);
        for v in &cube.vertices {
            let n = v.normal.unwrap();
            assert!(n.dot(&(v.position - center)) > 0.0);
        }
    }
}
