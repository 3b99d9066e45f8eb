//! Unit cell geometry: a joint sphere at the cell center and eight struts
//! from the corners that stop on its surface.

// Index arithmetic on small primitive meshes
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use hashbrown::HashMap;
use insole_types::{IndexedMesh, Vertex};
use nalgebra::{Point3, Vector3};

/// Struts at or below this length are not emitted (mm).
pub const MIN_STRUT_LENGTH: f64 = 0.001;

/// Cells up to this size use the coarse detail level (mm).
const COARSE_CELL_SIZE: f64 = 2.5;

/// Tessellation of the primitives in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDetail {
    /// Icosahedron subdivision steps for spheres.
    pub sphere_subdivisions: u32,
    /// Segments around each strut.
    pub strut_sides: usize,
}

impl CellDetail {
    /// Detail for a cell pitch: coarser for small cells.
    #[must_use]
    pub fn for_cell_size(cell_size: f64) -> Self {
        if cell_size <= COARSE_CELL_SIZE {
            Self {
                sphere_subdivisions: 1,
                strut_sides: 10,
            }
        } else {
            Self {
                sphere_subdivisions: 2,
                strut_sides: 16,
            }
        }
    }
}

/// Length of a corner strut: the corner-to-center distance less the joint
/// radius, or `None` when that is at most [`MIN_STRUT_LENGTH`].
///
/// ```
/// use insole_lattice::strut_length;
///
/// let half_diagonal = 3.0_f64.sqrt() * 2.0;
/// assert!((strut_length(4.0, 0.2).unwrap() - (half_diagonal - 0.2)).abs() < 1e-12);
/// assert!(strut_length(0.2, 0.2).is_none());
/// ```
#[must_use]
pub fn strut_length(cell_size: f64, radius: f64) -> Option<f64> {
    let half_diagonal = 3.0_f64.sqrt() * cell_size * 0.5;
    let length = half_diagonal - radius;
    (length > MIN_STRUT_LENGTH).then_some(length)
}

/// The primitives of one unit cell, each a closed mesh.
#[derive(Debug, Clone)]
pub struct UnitCell {
    /// Cell center.
    pub center: Point3<f64>,
    /// Joint sphere, struts, then corner spheres.
    pub primitives: Vec<IndexedMesh>,
    /// Strut length, when struts were emitted.
    pub strut_length: Option<f64>,
}

impl UnitCell {
    /// Build the cell centered at `center`.
    #[must_use]
    pub fn new(center: Point3<f64>, cell_size: f64, radius: f64, corner_spheres: bool) -> Self {
        let detail = CellDetail::for_cell_size(cell_size);
        let half = cell_size * 0.5;
        let mut corners = Vec::with_capacity(8);
        for sx in [-1.0, 1.0] {
            for sy in [-1.0, 1.0] {
                for sz in [-1.0, 1.0] {
                    corners.push(center + Vector3::new(sx, sy, sz) * half);
                }
            }
        }

        let mut primitives = vec![icosphere(center, radius, detail.sphere_subdivisions)];
        let length = strut_length(cell_size, radius);
        if length.is_some() {
            for &corner in &corners {
                let towards = (center - corner).normalize();
                let end = center - towards * radius;
                primitives.extend(strut(corner, end, radius, detail.strut_sides));
            }
        }
        if corner_spheres {
            primitives.extend(
                corners
                    .iter()
                    .map(|&corner| icosphere(corner, radius, detail.sphere_subdivisions)),
            );
        }

        Self {
            center,
            primitives,
            strut_length: length,
        }
    }
}

/// A closed cylinder from `start` to `end` with `sides` segments.
///
/// Returns `None` for a zero-length axis or fewer than three sides.
#[must_use]
pub fn strut(start: Point3<f64>, end: Point3<f64>, radius: f64, sides: usize) -> Option<IndexedMesh> {
    let axis = end - start;
    let length = axis.norm();
    if length < f64::EPSILON || sides < 3 {
        return None;
    }
    let (u, v) = perpendicular_basis(axis / length);

    let mut vertices = Vec::with_capacity(2 * sides + 2);
    vertices.push(Vertex::new(start));
    vertices.push(Vertex::new(end));
    for i in 0..sides {
        let angle = std::f64::consts::TAU * i as f64 / sides as f64;
        let offset = (u * angle.cos() + v * angle.sin()) * radius;
        vertices.push(Vertex::new(start + offset));
        vertices.push(Vertex::new(end + offset));
    }

    let mut faces = Vec::with_capacity(4 * sides);
    for i in 0..sides {
        let next = (i + 1) % sides;
        let s0 = (2 + 2 * i) as u32;
        let e0 = s0 + 1;
        let s1 = (2 + 2 * next) as u32;
        let e1 = s1 + 1;
        faces.push([s0, s1, e0]);
        faces.push([s1, e1, e0]);
        faces.push([0, s1, s0]);
        faces.push([1, e0, e1]);
    }
    Some(IndexedMesh::from_parts(vertices, faces))
}

/// Orthonormal `(u, v)` with `u × v = axis`.
fn perpendicular_basis(axis: Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let up = if axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = axis.cross(&up).normalize();
    let v = axis.cross(&u);
    (u, v)
}

const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// A subdivided icosahedron with every vertex at `radius` from `center`.
///
/// Subdivision `n` gives `20 * 4^n` faces.
#[must_use]
pub fn icosphere(center: Point3<f64>, radius: f64, subdivisions: u32) -> IndexedMesh {
    let t = (1.0 + 5.0_f64.sqrt()) * 0.5;
    let mut directions: Vec<Vector3<f64>> = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Vector3::new(x, y, z).normalize())
    .collect();
    let mut faces = ICOSAHEDRON_FACES.to_vec();

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, directions: &mut Vec<Vector3<f64>>| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let mid = (directions[a as usize] + directions[b as usize]).normalize();
                directions.push(mid);
                (directions.len() - 1) as u32
            })
        };
        let mut next = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(a, b, &mut directions);
            let bc = midpoint(b, c, &mut directions);
            let ca = midpoint(c, a, &mut directions);
            next.extend([[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        faces = next;
    }

    let positions = directions.into_iter().map(|d| center + d * radius).collect();
    IndexedMesh::from_positions(positions, faces)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_repair::MeshAdjacency;

    fn is_closed(mesh: &IndexedMesh) -> bool {
        let adjacency = MeshAdjacency::build(&mesh.faces);
        adjacency.is_watertight() && adjacency.is_manifold() && adjacency.inconsistent_edge_count() == 0
    }

    #[test]
    fn test_icosphere_counts_and_radius() {
        let center = Point3::new(1.0, 2.0, 3.0);
        let sphere = icosphere(center, 0.5, 2);
        assert_eq!(sphere.faces.len(), 320);
        assert_eq!(sphere.vertices.len(), 162);
        for v in &sphere.vertices {
            assert_relative_eq!((v.position - center).norm(), 0.5, epsilon = 1e-12);
        }
        assert!(is_closed(&sphere));
        assert!(sphere.signed_volume() > 0.0);
    }

    #[test]
    fn test_strut_is_closed_and_outward() {
        let mesh = strut(Point3::origin(), Point3::new(0.0, 0.0, 2.0), 0.5, 16).unwrap();
        assert_eq!(mesh.faces.len(), 64);
        assert!(is_closed(&mesh));
        // Inscribed 16-gon prism.
        let polygon = 0.5 * 16.0 * 0.25 * (std::f64::consts::TAU / 16.0).sin();
        assert_relative_eq!(mesh.signed_volume(), polygon * 2.0, epsilon = 1e-9);
        assert!(strut(Point3::origin(), Point3::origin(), 0.5, 16).is_none());
    }

    #[test]
    fn test_detail_levels() {
        assert_eq!(CellDetail::for_cell_size(2.5).strut_sides, 10);
        assert_eq!(CellDetail::for_cell_size(2.5).sphere_subdivisions, 1);
        assert_eq!(CellDetail::for_cell_size(4.0).strut_sides, 16);
        assert_eq!(CellDetail::for_cell_size(4.0).sphere_subdivisions, 2);
    }

    #[test]
    fn test_struts_stop_at_joint_surface() {
        let center = Point3::new(2.0, 2.0, 2.0);
        let cell = UnitCell::new(center, 4.0, 0.2, false);
        assert_eq!(cell.primitives.len(), 9);
        let expected = 3.0_f64.sqrt() * 2.0 - 0.2;
        assert_relative_eq!(cell.strut_length.unwrap(), expected, epsilon = 1e-12);

        for strut in &cell.primitives[1..] {
            // Vertex 1 is the end cap center.
            let end = strut.vertices[1].position;
            assert_relative_eq!((end - center).norm(), 0.2, epsilon = 1e-12);
            let start = strut.vertices[0].position;
            assert_relative_eq!((end - start).norm(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_short_struts_are_skipped() {
        // Half diagonal of a 0.2 cell is 0.1732, below the 0.18 radius.
        let cell = UnitCell::new(Point3::origin(), 0.2, 0.18, false);
        assert_eq!(cell.primitives.len(), 1);
        assert!(cell.strut_length.is_none());

        let with_corners = UnitCell::new(Point3::origin(), 0.2, 0.18, true);
        assert_eq!(with_corners.primitives.len(), 9);
    }
}
