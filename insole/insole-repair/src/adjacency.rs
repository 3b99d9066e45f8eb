//! Mesh adjacency data structures.
//!
//! Provides lookups for edge-to-face and vertex-to-face relationships, and
//! counts the directed uses of each edge for winding checks.

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Faces around one undirected edge, with how often each direction is used.
#[derive(Debug, Clone, Default)]
struct EdgeUse {
    faces: SmallVec<[usize; 2]>,
    /// Uses as `(lo, hi)`.
    forward: u32,
    /// Uses as `(hi, lo)`.
    backward: u32,
}

/// Adjacency information for a mesh.
///
/// Provides lookups for:
/// - Faces adjacent to an edge
/// - Faces adjacent to a vertex
/// - Boundary edges (edges with only one adjacent face)
/// - Non-manifold edges (edges with more than two adjacent faces)
/// - Inconsistently wound edges (a manifold edge traversed twice in the same direction)
#[derive(Debug, Clone)]
pub struct MeshAdjacency {
    edges: HashMap<(u32, u32), EdgeUse>,
    vertex_to_faces: HashMap<u32, Vec<usize>>,
}

impl MeshAdjacency {
    /// Build adjacency information from a list of faces.
    ///
    /// # Example
    ///
    /// ```
    /// use insole_repair::MeshAdjacency;
    ///
    /// let faces = vec![[0, 1, 2], [1, 3, 2]];
    /// let adj = MeshAdjacency::build(&faces);
    ///
    /// assert_eq!(adj.boundary_edge_count(), 4);
    /// assert_eq!(adj.inconsistent_edge_count(), 0);
    /// ```
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edges: HashMap<(u32, u32), EdgeUse> = HashMap::with_capacity(faces.len() * 3 / 2);
        let mut vertex_to_faces: HashMap<u32, Vec<usize>> = HashMap::new();

        for (face_idx, face) in faces.iter().enumerate() {
            for &v in face {
                vertex_to_faces.entry(v).or_default().push(face_idx);
            }
            for (a, b) in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
                let entry = edges.entry(normalize_edge(a, b)).or_default();
                entry.faces.push(face_idx);
                if a < b {
                    entry.forward += 1;
                } else {
                    entry.backward += 1;
                }
            }
        }

        Self {
            edges,
            vertex_to_faces,
        }
    }

    /// Get faces adjacent to an edge.
    ///
    /// Returns `None` if the edge doesn't exist in the mesh.
    #[must_use]
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[usize]> {
        self.edges
            .get(&normalize_edge(v0, v1))
            .map(|e| e.faces.as_slice())
    }

    /// Get faces adjacent to a vertex.
    ///
    /// Returns an empty slice if the vertex has no adjacent faces.
    #[must_use]
    pub fn faces_for_vertex(&self, v: u32) -> &[usize] {
        self.vertex_to_faces.get(&v).map_or(&[], Vec::as_slice)
    }

    /// Iterate over all boundary edges (edges with exactly one adjacent face).
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edges
            .iter()
            .filter(|(_, e)| e.faces.len() == 1)
            .map(|(&edge, _)| edge)
    }

    /// Count the number of boundary edges.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edges.values().filter(|e| e.faces.len() == 1).count()
    }

    /// Count the number of non-manifold edges.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edges.values().filter(|e| e.faces.len() > 2).count()
    }

    /// Count two-face edges whose faces traverse them in the same direction.
    #[must_use]
    pub fn inconsistent_edge_count(&self) -> usize {
        self.edges
            .values()
            .filter(|e| e.faces.len() == 2 && e.forward != 1)
            .count()
    }

    /// Check if the mesh is manifold (all edges have at most 2 adjacent faces).
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edges.values().all(|e| e.faces.len() <= 2)
    }

    /// Check if the mesh is watertight (no boundary edges).
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edges.values().all(|e| e.faces.len() >= 2)
    }

    /// Get the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of referenced vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_to_faces.len()
    }
}

/// Normalize edge direction so v0 < v1.
#[inline]
pub(crate) const fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}
