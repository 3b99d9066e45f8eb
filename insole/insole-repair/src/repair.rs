//! Core cleanup operations.
//!
//! Vertex welding, degenerate and duplicate face removal and unreferenced
//! vertex compaction, plus the combined cleanup pass.

use hashbrown::{HashMap, HashSet};
use insole_types::IndexedMesh;
use nalgebra::Point3;
use tracing::debug;

use crate::normals::compute_vertex_normals;
use crate::{RepairError, RepairResult};

/// Configuration parameters for the cleanup pass.
///
/// All thresholds are in millimeters.
///
/// # Example
///
/// ```
/// use insole_repair::RepairParams;
///
/// let params = RepairParams::default().with_weld_epsilon(1e-4);
/// assert_eq!(params.weld_epsilon, 1e-4);
/// assert!(params.compute_normals);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RepairParams {
    /// Vertices closer than this are merged. Default: `1e-6`.
    pub weld_epsilon: f64,

    /// Triangles with area below this are removed. Default: `1e-12`.
    pub degenerate_area_threshold: f64,

    /// Whether to compact away unreferenced vertices. Default: `true`.
    pub remove_unreferenced: bool,

    /// Whether to recompute vertex normals at the end. Default: `true`.
    pub compute_normals: bool,
}

impl Default for RepairParams {
    fn default() -> Self {
        Self {
            weld_epsilon: 1e-6,
            degenerate_area_threshold: 1e-12,
            remove_unreferenced: true,
            compute_normals: true,
        }
    }
}

impl RepairParams {
    /// Set the vertex welding distance threshold.
    #[must_use]
    pub const fn with_weld_epsilon(mut self, epsilon: f64) -> Self {
        self.weld_epsilon = epsilon;
        self
    }

    /// Set the minimum triangle area threshold.
    #[must_use]
    pub const fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }

    /// Set whether to remove unreferenced vertices.
    #[must_use]
    pub const fn with_remove_unreferenced(mut self, remove: bool) -> Self {
        self.remove_unreferenced = remove;
        self
    }

    /// Set whether to recompute vertex normals.
    #[must_use]
    pub const fn with_compute_normals(mut self, compute: bool) -> Self {
        self.compute_normals = compute;
        self
    }
}

/// Check that every face index refers to an existing vertex.
///
/// # Errors
///
/// Returns [`RepairError::InvalidIndex`] for the first out-of-range index.
pub fn check_indices(mesh: &IndexedMesh) -> RepairResult<()> {
    let vertex_count = mesh.vertices.len();
    for (face, f) in mesh.faces.iter().enumerate() {
        if let Some(&index) = f.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(RepairError::InvalidIndex {
                face,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

/// Remove triangles with area below threshold, and faces repeating an index.
///
/// Returns the number of triangles removed.
///
/// # Example
///
/// ```
/// use insole_types::{IndexedMesh, Vertex};
/// use insole_repair::remove_degenerate_triangles;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(5.0, 0.0, 0.0)); // collinear
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(remove_degenerate_triangles(&mut mesh, 0.001), 1);
/// ```
pub fn remove_degenerate_triangles(mesh: &mut IndexedMesh, area_threshold: f64) -> usize {
    let original_count = mesh.faces.len();
    let vertices = &mesh.vertices;

    mesh.faces.retain(|&[i0, i1, i2]| {
        if i0 == i1 || i1 == i2 || i0 == i2 {
            return false;
        }
        let v0 = &vertices[i0 as usize].position;
        let v1 = &vertices[i1 as usize].position;
        let v2 = &vertices[i2 as usize].position;
        let area = (*v1 - *v0).cross(&(*v2 - *v0)).norm() * 0.5;
        area >= area_threshold
    });

    original_count - mesh.faces.len()
}

/// Weld vertices that are within epsilon distance of each other.
///
/// Uses spatial hashing for efficiency. Returns the number of vertices merged.
/// Faces collapsed by the merge are dropped.
///
/// # Example
///
/// ```
/// use insole_types::{IndexedMesh, Vertex};
/// use insole_repair::weld_vertices;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0001, 0.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([0, 3, 2]);
///
/// assert_eq!(weld_vertices(&mut mesh, 0.001), 1);
/// assert_eq!(mesh.faces[1], [0, 1, 2]);
/// ```
#[allow(clippy::cast_possible_truncation)]
// Truncation: mesh indices are u32
pub fn weld_vertices(mesh: &mut IndexedMesh, epsilon: f64) -> usize {
    if mesh.vertices.is_empty() || epsilon <= 0.0 {
        return 0;
    }
    let cell_size = epsilon * 2.0;

    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        spatial_hash
            .entry(pos_to_cell(&vertex.position, cell_size))
            .or_default()
            .push(idx as u32);
    }

    let mut remap: Vec<u32> = (0..mesh.vertices.len() as u32).collect();
    let mut merged_count = 0;

    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        let idx = idx as u32;
        if remap[idx as usize] != idx {
            continue;
        }
        let cell = pos_to_cell(&vertex.position, cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = spatial_hash.get(&(cell.0 + dx, cell.1 + dy, cell.2 + dz))
                    else {
                        continue;
                    };
                    for &other in candidates {
                        if other <= idx || remap[other as usize] != other {
                            continue;
                        }
                        let other_pos = &mesh.vertices[other as usize].position;
                        if (vertex.position - other_pos).norm() < epsilon {
                            remap[other as usize] = idx;
                            merged_count += 1;
                        }
                    }
                }
            }
        }
    }

    if merged_count == 0 {
        return 0;
    }

    for face in &mut mesh.faces {
        for i in face.iter_mut() {
            *i = remap[*i as usize];
        }
    }
    mesh.faces
        .retain(|&[i0, i1, i2]| i0 != i1 && i1 != i2 && i0 != i2);

    merged_count
}

#[allow(clippy::cast_possible_truncation)]
fn pos_to_cell(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}

/// Remove unreferenced vertices and compact the vertex array.
///
/// Returns the number of vertices removed.
#[allow(clippy::cast_possible_truncation)]
pub fn remove_unreferenced_vertices(mesh: &mut IndexedMesh) -> usize {
    let original_count = mesh.vertices.len();
    let mut referenced = vec![false; original_count];
    for face in &mesh.faces {
        for &i in face {
            referenced[i as usize] = true;
        }
    }
    if referenced.iter().all(|&r| r) {
        return 0;
    }

    let mut remap = vec![u32::MAX; original_count];
    let mut vertices = Vec::with_capacity(original_count);
    for (old, vertex) in mesh.vertices.drain(..).enumerate() {
        if referenced[old] {
            remap[old] = vertices.len() as u32;
            vertices.push(vertex);
        }
    }
    for face in &mut mesh.faces {
        for i in face.iter_mut() {
            *i = remap[*i as usize];
        }
    }
    mesh.vertices = vertices;
    original_count - mesh.vertices.len()
}

/// Remove duplicate faces, regardless of winding or starting vertex.
///
/// Coincident faces with opposite winding cancel in pairs: they are the
/// two sides of an internal membrane, such as the caps where two collinear
/// struts meet end to end, and keeping either would leave its edges shared
/// by three faces. Of what remains, the first face with the surviving
/// winding is kept. Returns
/// the number of faces removed.
///
/// # Example
///
/// ```
/// use insole_types::{IndexedMesh, Vertex};
/// use insole_repair::remove_duplicate_faces;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([1, 2, 0]);
/// mesh.faces.push([0, 2, 1]);
///
/// // One opposite pair cancels, leaving one copy.
/// assert_eq!(remove_duplicate_faces(&mut mesh), 2);
/// assert_eq!(mesh.faces, vec![[0, 1, 2]]);
/// ```
pub fn remove_duplicate_faces(mesh: &mut IndexedMesh) -> usize {
    let original_count = mesh.faces.len();
    // Net winding per face key: +1 per even copy, -1 per odd copy.
    let mut net: HashMap<[u32; 3], i64> = HashMap::with_capacity(original_count);
    for &face in &mesh.faces {
        *net.entry(face_key(face)).or_insert(0) += winding_sign(face);
    }

    let mut kept: HashSet<[u32; 3]> = HashSet::with_capacity(net.len());
    mesh.faces.retain(|&face| {
        let key = face_key(face);
        let sign = net.get(&key).copied().unwrap_or(0).signum();
        sign != 0 && sign == winding_sign(face) && kept.insert(key)
    });
    original_count - mesh.faces.len()
}

/// `1` when `face` is a rotation of its sorted vertex triple, else `-1`.
#[inline]
fn winding_sign(face: [u32; 3]) -> i64 {
    let [a, b, c] = face;
    if (a < b && b < c) || (b < c && c < a) || (c < a && a < b) {
        1
    } else {
        -1
    }
}

/// Count duplicate faces without modifying the mesh.
#[must_use]
pub fn count_duplicate_faces(faces: &[[u32; 3]]) -> usize {
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(faces.len());
    faces.iter().filter(|f| !seen.insert(face_key(**f))).count()
}

/// Winding-independent key: the sorted vertex triple.
#[inline]
fn face_key(mut face: [u32; 3]) -> [u32; 3] {
    face.sort_unstable();
    face
}

/// Run the cleanup pass on a mesh.
///
/// This performs:
/// 1. Weld nearby vertices
/// 2. Remove degenerate triangles
/// 3. Remove duplicate faces
/// 4. Remove unreferenced vertices
/// 5. Recompute vertex normals
///
/// # Errors
///
/// Returns [`RepairError::InvalidIndex`] if a face references a missing
/// vertex; the mesh is left untouched in that case.
///
/// # Example
///
/// ```
/// use insole_types::{cuboid, IndexedMesh, Point3};
/// use insole_repair::{repair_mesh, RepairParams};
///
/// let a = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let mut twice = IndexedMesh::concat([&a, &a]);
///
/// let summary = repair_mesh(&mut twice, &RepairParams::default()).unwrap();
/// assert_eq!(summary.vertices_welded, 8);
/// assert_eq!(summary.duplicates_removed, 12);
/// assert_eq!(twice.faces.len(), 12);
/// ```
pub fn repair_mesh(mesh: &mut IndexedMesh, params: &RepairParams) -> RepairResult<RepairSummary> {
    check_indices(mesh)?;
    let initial_vertices = mesh.vertices.len();
    let initial_faces = mesh.faces.len();

    let vertices_welded = weld_vertices(mesh, params.weld_epsilon);
    let degenerates_removed = remove_degenerate_triangles(mesh, params.degenerate_area_threshold);
    let duplicates_removed = remove_duplicate_faces(mesh);
    let unreferenced_removed = if params.remove_unreferenced {
        remove_unreferenced_vertices(mesh)
    } else {
        0
    };
    if params.compute_normals {
        compute_vertex_normals(mesh);
    }

    let summary = RepairSummary {
        initial_vertices,
        initial_faces,
        final_vertices: mesh.vertices.len(),
        final_faces: mesh.faces.len(),
        vertices_welded,
        degenerates_removed,
        duplicates_removed,
        unreferenced_removed,
    };
    debug!(
        welded = vertices_welded,
        degenerate = degenerates_removed,
        duplicate = duplicates_removed,
        unreferenced = unreferenced_removed,
        "Cleanup pass"
    );
    Ok(summary)
}

/// Result of a cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairSummary {
    /// Number of vertices before repair.
    pub initial_vertices: usize,
    /// Number of faces before repair.
    pub initial_faces: usize,
    /// Number of vertices after repair.
    pub final_vertices: usize,
    /// Number of faces after repair.
    pub final_faces: usize,
    /// Number of vertices merged by welding.
    pub vertices_welded: usize,
    /// Number of degenerate triangles removed.
    pub degenerates_removed: usize,
    /// Number of duplicate faces removed.
    pub duplicates_removed: usize,
    /// Number of unreferenced vertices removed.
    pub unreferenced_removed: usize,
}

impl RepairSummary {
    /// Check if any repairs were performed.
    #[must_use]
    pub const fn had_changes(&self) -> bool {
        self.vertices_welded > 0
            || self.degenerates_removed > 0
            || self.duplicates_removed > 0
            || self.unreferenced_removed > 0
    }
}

impl std::fmt::Display for RepairSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Repair: {} verts ({} welded, {} unreferenced), {} faces ({} degenerate, {} duplicate)",
            self.final_vertices,
            self.vertices_welded,
            self.unreferenced_removed,
            self.final_faces,
            self.degenerates_removed,
            self.duplicates_removed
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use insole_types::{Vertex, cuboid};

    fn simple_mesh() -> IndexedMesh {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 10.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh
    }

    #[test]
    fn test_remove_degenerate_keeps_valid() {
        let mut mesh = simple_mesh();
        assert_eq!(remove_degenerate_triangles(&mut mesh, 0.001), 0);
        assert_eq!(mesh.faces.len(), 1);
    }

    #[test]
    fn test_remove_degenerate_repeated_index() {
        let mut mesh = simple_mesh();
        mesh.faces.push([0, 0, 1]);
        assert_eq!(remove_degenerate_triangles(&mut mesh, 0.0), 1);
    }

    #[test]
    fn test_weld_empty_mesh() {
        let mut mesh = IndexedMesh::new();
        assert_eq!(weld_vertices(&mut mesh, 0.01), 0);
    }

    #[test]
    fn test_weld_collapses_faces() {
        let mut mesh = simple_mesh();
        mesh.vertices.push(Vertex::from_coords(1e-9, 0.0, 0.0));
        mesh.faces.push([0, 3, 2]);
        assert_eq!(weld_vertices(&mut mesh, 1e-6), 1);
        assert_eq!(mesh.faces.len(), 1);
    }

    #[test]
    fn test_remove_unreferenced() {
        let mut mesh = simple_mesh();
        mesh.vertices.insert(0, Vertex::from_coords(100.0, 100.0, 100.0));
        mesh.faces[0] = [1, 2, 3];
        assert_eq!(remove_unreferenced_vertices(&mut mesh), 1);
        assert_eq!(mesh.faces[0], [0, 1, 2]);
        assert_eq!(mesh.vertices[0].position.x, 0.0);
    }

    #[test]
    fn test_count_duplicates() {
        assert_eq!(count_duplicate_faces(&[[0, 1, 2], [2, 1, 0], [1, 2, 3]]), 1);
        assert_eq!(count_duplicate_faces(&[]), 0);
    }

    #[test]
    fn test_opposite_windings_cancel() {
        let mut mesh = simple_mesh();
        mesh.faces.push([0, 2, 1]);
        assert_eq!(remove_duplicate_faces(&mut mesh), 2);
        assert!(mesh.faces.is_empty());

        let mut mesh = simple_mesh();
        mesh.faces.extend([[2, 0, 1], [1, 0, 2], [0, 1, 2]]);
        assert_eq!(remove_duplicate_faces(&mut mesh), 3);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_touching_boxes_fuse() {
        let a = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = cuboid(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let mut mesh = IndexedMesh::concat([&a, &b]);

        let summary = repair_mesh(&mut mesh, &RepairParams::default()).unwrap();
        assert_eq!(summary.duplicates_removed, 4);
        assert_eq!(mesh.faces.len(), 20);
        assert_eq!(mesh.vertices.len(), 12);

        let report = crate::validate_mesh(&mesh);
        assert!(report.is_watertight);
        assert!(report.is_manifold);
        assert!((mesh.signed_volume() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_repair_rejects_bad_index() {
        let mut mesh = simple_mesh();
        mesh.faces.push([0, 1, 7]);
        let err = repair_mesh(&mut mesh, &RepairParams::default()).unwrap_err();
        assert!(matches!(err, RepairError::InvalidIndex { face: 1, index: 7, .. }));
        assert_eq!(mesh.faces.len(), 2);
    }

    #[test]
    fn test_repair_cube_soup() {
        // twelve disconnected triangles of a cube
        let cube = cuboid(Point3::origin(), Point3::new(2.0, 2.0, 2.0));
        let mut soup = IndexedMesh::new();
        for face in &cube.faces {
            let base = u32::try_from(soup.vertices.len()).unwrap();
            for &i in face {
                soup.vertices.push(cube.vertices[i as usize].clone());
            }
            soup.faces.push([base, base + 1, base + 2]);
        }
        let summary = repair_mesh(&mut soup, &RepairParams::default()).unwrap();
        assert_eq!(summary.final_vertices, 8);
        assert_eq!(summary.final_faces, 12);
        assert!(soup.vertices.iter().all(|v| v.normal.is_some()));
        assert!(summary.had_changes());
        assert!(summary.to_string().contains("12 faces"));
    }
}
