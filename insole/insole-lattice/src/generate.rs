//! Tiling unit cells over a clip volume.

// Grid indexing converts between cell counts and coordinates
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

use std::time::Instant;

use insole_boolean::{BooleanOp, EngineChain, Operand};
use insole_repair::{count_duplicate_faces, repair_mesh, weld_vertices};
use insole_types::{IndexedMesh, MeshBounds};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cell::UnitCell;
use crate::params::LatticeParams;
use crate::{LatticeError, LatticeResult};

/// Regular cell grid centered on a bounding box.
#[derive(Debug, Clone, Copy)]
struct CellGrid {
    origin: Point3<f64>,
    pitch: f64,
    counts: [usize; 3],
}

impl CellGrid {
    fn covering(min: Point3<f64>, max: Point3<f64>, pitch: f64) -> Self {
        let size = max - min;
        let center = min + size * 0.5;
        let counts = [size.x, size.y, size.z].map(|s| ((s / pitch).ceil() as usize).max(1));
        let extent = Vector3::new(counts[0] as f64, counts[1] as f64, counts[2] as f64) * pitch;
        Self {
            origin: center - extent * 0.5,
            pitch,
            counts,
        }
    }

    fn len(&self) -> usize {
        self.counts.iter().product()
    }

    /// Center of cell `index` in x-fastest order.
    fn center(&self, index: usize) -> Point3<f64> {
        let [nx, ny, _] = self.counts;
        let ix = index % nx;
        let iy = (index / nx) % ny;
        let iz = index / (nx * ny);
        self.origin
            + Vector3::new(ix as f64 + 0.5, iy as f64 + 0.5, iz as f64 + 0.5) * self.pitch
    }

    /// Center of the cell containing `p`, clamped to the grid.
    fn nearest_center(&self, p: &Point3<f64>) -> Point3<f64> {
        let local = (p - self.origin) / self.pitch;
        let mut cell = [0.0; 3];
        for (axis, slot) in cell.iter_mut().enumerate() {
            let max = (self.counts[axis] - 1) as f64;
            *slot = local[axis].floor().clamp(0.0, max) + 0.5;
        }
        self.origin + Vector3::new(cell[0], cell[1], cell[2]) * self.pitch
    }
}

/// Lattice mesh and its metrics.
#[derive(Debug)]
pub struct Lattice {
    /// Clipped, merged and cleaned lattice.
    pub mesh: IndexedMesh,
    /// Generation metrics.
    pub stats: LatticeStats,
}

/// Metrics of a lattice generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatticeStats {
    /// Cells in the grid.
    pub cell_count: usize,
    /// Cells with material left after clipping.
    pub cells_kept: usize,
    /// Primitives generated over all cells.
    pub primitives: usize,
    /// Primitives cut by the clip surface.
    pub primitives_clipped: usize,
    /// Primitives entirely outside the clip volume.
    pub primitives_dropped: usize,
    /// Strut length, when struts were emitted.
    pub strut_length: Option<f64>,
    /// Duplicate faces after merging cells, before cleanup.
    pub duplicate_faces_before: usize,
    /// Duplicate faces left after cleanup.
    pub duplicate_faces_after: usize,
    /// Final vertices on a joint sphere.
    pub joint_vertices: usize,
    /// Final vertex count.
    pub vertex_count: usize,
    /// Final face count.
    pub face_count: usize,
}

#[derive(Debug, Default)]
struct CellOutput {
    mesh: IndexedMesh,
    primitives: usize,
    clipped: usize,
    dropped: usize,
}

/// Fill `clip` with unit cells and clip every primitive to it.
///
/// Cells are tiled at `cell_size` pitch over the clip volume's bounding box,
/// centered on it. Each primitive of a cell is intersected with the clip
/// volume separately so every kept piece stays closed. Each cell is cleaned
/// up, then the merged lattice is cleaned again to remove the duplicate
/// geometry cells share.
///
/// # Errors
///
/// - [`LatticeError::InvalidParameter`] for bad parameters
/// - [`LatticeError::EmptyVolume`] when `clip` has no faces
/// - [`LatticeError::Clipping`] when every engine fails on a primitive
/// - [`LatticeError::Timeout`] when the deadline passes
///
/// # Example
///
/// ```
/// use insole_lattice::{generate_lattice, LatticeParams};
/// use insole_types::{cuboid, Point3};
///
/// let clip = cuboid(Point3::origin(), Point3::new(7.3, 7.5, 3.1));
/// let params = LatticeParams::default().with_cell_size(4.0);
/// let lattice = generate_lattice(&clip, &params).unwrap();
/// assert_eq!(lattice.stats.cell_count, 4);
/// assert_eq!(lattice.stats.duplicate_faces_after, 0);
/// ```
pub fn generate_lattice(clip: &IndexedMesh, params: &LatticeParams) -> LatticeResult<Lattice> {
    params.validate()?;
    let bounds = match clip.bounds_opt() {
        Some(b) if !clip.faces.is_empty() => b,
        _ => return Err(LatticeError::EmptyVolume),
    };

    let grid = CellGrid::covering(bounds.min, bounds.max, params.cell_size);
    let total = grid.len();
    let clip_operand = Operand::new(clip, &params.boolean)?;
    debug!(
        cells = total,
        nx = grid.counts[0],
        ny = grid.counts[1],
        nz = grid.counts[2],
        "Tiling lattice cells"
    );

    let run = |index: usize| build_cell(index, total, &grid, &clip_operand, params);
    let cells: Vec<CellOutput> = if params.parallel {
        (0..total).into_par_iter().map(run).collect::<LatticeResult<_>>()?
    } else {
        (0..total).map(run).collect::<LatticeResult<_>>()?
    };

    let mut stats = LatticeStats {
        cell_count: total,
        strut_length: crate::strut_length(params.cell_size, params.strut_radius),
        ..LatticeStats::default()
    };
    for cell in &cells {
        stats.primitives += cell.primitives;
        stats.primitives_clipped += cell.clipped;
        stats.primitives_dropped += cell.dropped;
        if !cell.mesh.faces.is_empty() {
            stats.cells_kept += 1;
        }
    }

    let mut mesh = IndexedMesh::concat(cells.iter().map(|c| &c.mesh));
    weld_vertices(&mut mesh, params.repair.weld_epsilon);
    stats.duplicate_faces_before = count_duplicate_faces(&mesh.faces);
    repair_mesh(&mut mesh, &params.repair)?;
    stats.duplicate_faces_after = count_duplicate_faces(&mesh.faces);

    let joint_limit = params.strut_radius * (1.0 + 1e-6);
    stats.joint_vertices = mesh
        .vertices
        .iter()
        .filter(|v| (v.position - grid.nearest_center(&v.position)).norm() <= joint_limit)
        .count();
    stats.vertex_count = mesh.vertices.len();
    stats.face_count = mesh.faces.len();

    info!(
        cells = stats.cell_count,
        kept = stats.cells_kept,
        faces = stats.face_count,
        duplicates_before = stats.duplicate_faces_before,
        duplicates_after = stats.duplicate_faces_after,
        "Lattice generated"
    );
    Ok(Lattice { mesh, stats })
}

fn build_cell(
    index: usize,
    total: usize,
    grid: &CellGrid,
    clip: &Operand<'_>,
    params: &LatticeParams,
) -> LatticeResult<CellOutput> {
    if params.deadline.is_some_and(|d| Instant::now() >= d) {
        return Err(LatticeError::Timeout { cell: index, total });
    }

    let cell = UnitCell::new(
        grid.center(index),
        params.cell_size,
        params.strut_radius,
        params.corner_spheres,
    );
    let chain = EngineChain::default();
    let mut out = CellOutput {
        primitives: cell.primitives.len(),
        ..CellOutput::default()
    };
    let mut pieces = Vec::with_capacity(cell.primitives.len());
    for primitive in &cell.primitives {
        let clipped = Operand::new(primitive, &params.boolean)
            .and_then(|operand| {
                chain.run(&operand, clip, BooleanOp::Intersection, &params.boolean)
            })
            .map_err(|source| LatticeError::Clipping {
                cell: index,
                source,
            })?;
        if clipped.mesh.faces.is_empty() {
            out.dropped += 1;
            continue;
        }
        if clipped.stats.meshes_intersected {
            out.clipped += 1;
        }
        pieces.push(clipped.mesh);
    }

    if !pieces.is_empty() {
        out.mesh = IndexedMesh::concat(&pieces);
        repair_mesh(&mut out.mesh, &params.repair)?;
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_repair::validate_mesh;
    use insole_types::cuboid;
    use std::time::Duration;

    #[test]
    fn test_grid_is_centered_on_bounds() {
        let grid = CellGrid::covering(Point3::origin(), Point3::new(10.0, 4.0, 3.0), 4.0);
        assert_eq!(grid.counts, [3, 1, 1]);
        assert_relative_eq!(grid.origin.x, -1.0);
        assert_relative_eq!(grid.origin.y, 0.0);
        assert_relative_eq!(grid.origin.z, -0.5);
        assert_eq!(grid.len(), 3);

        let c = grid.center(2);
        assert_relative_eq!(c.x, 9.0);
        assert_relative_eq!(c.z, 1.5);
        let near = grid.nearest_center(&Point3::new(100.0, 2.0, 1.0));
        assert_relative_eq!(near.x, 9.0);
    }

    #[test]
    fn test_struts_are_clipped_to_volume() {
        // 2x2x1 cells of 4 mm; the outer corners sit just outside the box.
        let clip = cuboid(Point3::origin(), Point3::new(7.3, 7.5, 3.1));
        let params = LatticeParams::default().with_cell_size(4.0).with_parallel(false);
        let lattice = generate_lattice(&clip, &params).unwrap();

        assert_eq!(lattice.stats.cell_count, 4);
        assert_eq!(lattice.stats.cells_kept, 4);
        assert_eq!(lattice.stats.primitives, 4 * 9);
        assert!(lattice.stats.primitives_clipped > 0);
        assert_eq!(lattice.stats.duplicate_faces_after, 0);
        assert!(lattice.stats.joint_vertices > 0);

        let report = validate_mesh(&lattice.mesh);
        assert!(report.is_watertight);
        let bounds = lattice.mesh.bounds();
        assert!(bounds.min.x >= -1e-6 && bounds.max.x <= 7.3 + 1e-6);
        assert!(bounds.min.z >= -1e-6 && bounds.max.z <= 3.1 + 1e-6);
    }

    #[test]
    fn test_shared_corner_spheres_are_deduplicated() {
        // Two cells; the corners lie 0.07 mm outside the box faces.
        let clip = cuboid(Point3::origin(), Point3::new(7.86, 3.86, 3.86));
        let params = LatticeParams::default()
            .with_cell_size(4.0)
            .with_corner_spheres(true)
            .with_parallel(false);
        let lattice = generate_lattice(&clip, &params).unwrap();
        assert_eq!(lattice.stats.cell_count, 2);
        assert!(lattice.stats.duplicate_faces_before > 0);
        assert_eq!(lattice.stats.duplicate_faces_after, 0);
        assert!(validate_mesh(&lattice.mesh).is_watertight);
    }

    #[test]
    fn test_collinear_struts_fuse_across_layers() {
        // 2x2x2 cells; four strut pairs meet cap to cap at the middle corner.
        let clip = cuboid(Point3::origin(), Point3::new(7.86, 7.86, 7.86));
        let params = LatticeParams::default().with_cell_size(4.0).with_parallel(false);
        let lattice = generate_lattice(&clip, &params).unwrap();
        assert_eq!(lattice.stats.cell_count, 8);
        assert!(lattice.stats.duplicate_faces_before >= 4 * 16);
        assert_eq!(lattice.stats.duplicate_faces_after, 0);

        let report = validate_mesh(&lattice.mesh);
        assert!(report.is_watertight);
        assert!(report.is_manifold);
        assert_eq!(report.non_manifold_edge_count, 0);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let clip = cuboid(Point3::origin(), Point3::new(8.7, 5.5, 2.75));
        let serial = generate_lattice(&clip, &LatticeParams::default().with_parallel(false)).unwrap();
        let parallel = generate_lattice(&clip, &LatticeParams::default()).unwrap();
        assert_eq!(serial.stats.cell_count, 6);
        assert_eq!(serial.stats, parallel.stats);
        assert_eq!(serial.mesh.faces, parallel.mesh.faces);
    }

    #[test]
    fn test_empty_volume_rejected() {
        let err = generate_lattice(&IndexedMesh::new(), &LatticeParams::default()).unwrap_err();
        assert!(matches!(err, LatticeError::EmptyVolume));
    }

    #[test]
    fn test_past_deadline_times_out() {
        let clip = cuboid(Point3::origin(), Point3::new(6.0, 6.0, 3.0));
        let deadline = Instant::now().checked_sub(Duration::from_millis(1)).unwrap_or_else(Instant::now);
        let params = LatticeParams::default().with_deadline(deadline);
        let err = generate_lattice(&clip, &params).unwrap_err();
        assert!(matches!(err, LatticeError::Timeout { total: 4, .. }));
    }
}
