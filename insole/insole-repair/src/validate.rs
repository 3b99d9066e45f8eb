//! Mesh validation and health reporting.

use insole_types::{IndexedMesh, MeshTopology};

use crate::adjacency::MeshAdjacency;
use crate::repair::count_duplicate_faces;

/// Report of mesh validation results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of faces.
    pub face_count: usize,
    /// Total number of edges.
    pub edge_count: usize,

    /// Number of boundary edges (edges with only one adjacent face).
    pub boundary_edge_count: usize,
    /// Number of non-manifold edges (edges with more than two adjacent faces).
    pub non_manifold_edge_count: usize,
    /// Number of degenerate faces (zero or near-zero area).
    pub degenerate_face_count: usize,
    /// Number of duplicate faces.
    pub duplicate_face_count: usize,
    /// Number of manifold edges whose two faces disagree on winding.
    pub inconsistent_winding_count: usize,

    /// Signed enclosed volume (mm³); negative when inside out.
    pub signed_volume: f64,
    /// Total surface area (mm²).
    pub surface_area: f64,

    /// Whether the mesh is watertight (no boundary edges).
    pub is_watertight: bool,
    /// Whether the mesh is manifold (no non-manifold edges).
    pub is_manifold: bool,
    /// Whether the mesh is inside out.
    pub is_inside_out: bool,
}

impl MeshReport {
    /// Ready for slicing: watertight, manifold, consistently and outwardly wound.
    #[must_use]
    pub fn is_printable(&self) -> bool {
        self.face_count > 0
            && self.is_watertight
            && self.is_manifold
            && self.inconsistent_winding_count == 0
            && !self.is_inside_out
    }

    /// Check if the mesh has any issues.
    #[must_use]
    pub const fn has_issues(&self) -> bool {
        self.issue_count() > 0
    }

    /// Get a count of total issues found.
    #[must_use]
    pub const fn issue_count(&self) -> usize {
        self.boundary_edge_count
            + self.non_manifold_edge_count
            + self.degenerate_face_count
            + self.duplicate_face_count
            + self.inconsistent_winding_count
    }
}

impl std::fmt::Display for MeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let yes_no = |b: bool| if b { "Yes" } else { "No" };
        writeln!(f, "Mesh Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(f, "  Volume: {:.3}", self.signed_volume)?;
        writeln!(f, "  Area: {:.3}", self.surface_area)?;
        writeln!(f)?;
        writeln!(f, "  Status:")?;
        writeln!(f, "    Watertight: {}", yes_no(self.is_watertight))?;
        writeln!(f, "    Manifold: {}", yes_no(self.is_manifold))?;
        writeln!(
            f,
            "    Winding: {}",
            if self.is_inside_out { "Inside-out" } else { "Correct" }
        )?;

        if self.has_issues() {
            writeln!(f)?;
            writeln!(f, "  Issues:")?;
            for (label, count) in [
                ("Boundary edges", self.boundary_edge_count),
                ("Non-manifold edges", self.non_manifold_edge_count),
                ("Degenerate faces", self.degenerate_face_count),
                ("Duplicate faces", self.duplicate_face_count),
                ("Inconsistent winding", self.inconsistent_winding_count),
            ] {
                if count > 0 {
                    writeln!(f, "    {label}: {count}")?;
                }
            }
        }
        Ok(())
    }
}

/// Options for mesh validation.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Area threshold below which a face is considered degenerate.
    pub degenerate_area_threshold: f64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            degenerate_area_threshold: 1e-12,
        }
    }
}

/// Validate a mesh and return a report of any issues.
///
/// # Example
///
/// ```
/// use insole_types::{cuboid, Point3};
/// use insole_repair::validate_mesh;
///
/// let cube = cuboid(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
/// let report = validate_mesh(&cube);
/// assert!(report.is_watertight);
/// assert!(report.is_printable());
/// assert!((report.signed_volume - 6.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn validate_mesh(mesh: &IndexedMesh) -> MeshReport {
    validate_mesh_with_options(mesh, &ValidationOptions::default())
}

/// Validate a mesh with custom options.
///
/// Faces with out-of-range indices are counted as degenerate and skipped for
/// the volume and area sums.
#[must_use]
pub fn validate_mesh_with_options(mesh: &IndexedMesh, options: &ValidationOptions) -> MeshReport {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let n = mesh.vertices.len();
    let in_range = |f: &[u32; 3]| f.iter().all(|&i| (i as usize) < n);

    let (valid, invalid): (Vec<[u32; 3]>, Vec<[u32; 3]>) =
        mesh.faces.iter().copied().partition(in_range);
    let degenerate_face_count = invalid.len()
        + valid
            .iter()
            .filter(|&&f| mesh.face_triangle(f).area() < options.degenerate_area_threshold)
            .count();

    let signed_volume = if invalid.is_empty() {
        mesh.signed_volume()
    } else {
        IndexedMesh::from_parts(mesh.vertices.clone(), valid.clone()).signed_volume()
    };
    let surface_area = if invalid.is_empty() {
        mesh.surface_area()
    } else {
        valid.iter().map(|&f| mesh.face_triangle(f).area()).sum()
    };

    MeshReport {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        edge_count: adjacency.edge_count(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        degenerate_face_count,
        duplicate_face_count: count_duplicate_faces(&mesh.faces),
        inconsistent_winding_count: adjacency.inconsistent_edge_count(),
        signed_volume,
        surface_area,
        is_watertight: !mesh.faces.is_empty() && adjacency.is_watertight(),
        is_manifold: adjacency.is_manifold(),
        is_inside_out: signed_volume < 0.0,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use insole_types::{Point3, Vertex, cuboid};

    fn simple_triangle() -> IndexedMesh {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 10.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh
    }

    #[test]
    fn test_validate_single_triangle() {
        let report = validate_mesh(&simple_triangle());
        assert_eq!(report.vertex_count, 3);
        assert_eq!(report.boundary_edge_count, 3);
        assert!(!report.is_watertight);
        assert!(!report.is_printable());
        assert_eq!(report.surface_area, 50.0);
    }

    #[test]
    fn test_empty_mesh_is_not_watertight() {
        let report = validate_mesh(&IndexedMesh::new());
        assert!(!report.is_watertight);
        assert!(!report.has_issues());
    }

    #[test]
    fn test_detect_duplicates_and_degenerates() {
        let mut mesh = simple_triangle();
        mesh.faces.push([0, 2, 1]);
        mesh.vertices.push(Vertex::from_coords(20.0, 0.0, 0.0));
        mesh.faces.push([0, 1, 3]);
        let report = validate_mesh(&mesh);
        assert_eq!(report.duplicate_face_count, 1);
        assert_eq!(report.degenerate_face_count, 1);
    }

    #[test]
    fn test_inside_out_cube() {
        let mut cube = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        cube.flip_normals();
        let report = validate_mesh(&cube);
        assert!(report.is_watertight);
        assert!(report.is_inside_out);
        assert!(!report.is_printable());
    }

    #[test]
    fn test_out_of_range_faces_are_degenerate() {
        let mut mesh = simple_triangle();
        mesh.faces.push([0, 1, 9]);
        let report = validate_mesh(&mesh);
        assert_eq!(report.degenerate_face_count, 1);
        assert_eq!(report.surface_area, 50.0);
    }

    #[test]
    fn test_report_display() {
        let report = validate_mesh(&simple_triangle());
        let display = report.to_string();
        assert!(display.contains("Vertices: 3"));
        assert!(display.contains("Watertight: No"));
        assert!(display.contains("Boundary edges: 3"));
    }
}
