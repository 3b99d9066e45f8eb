//! Mesh Finalizer: merge, clean, check, orient.

use insole_outline::{FootSide, Outline};
use insole_repair::{MeshReport, RepairParams, RepairSummary, repair_mesh, validate_mesh};
use insole_types::IndexedMesh;
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, GenerationError, GenerationResult, Stage};

/// A merged, cleaned and checked mesh.
#[derive(Debug, Clone)]
pub struct Finalized {
    /// The merged mesh.
    pub mesh: IndexedMesh,
    /// Health of the merged mesh.
    pub report: MeshReport,
    /// What the cleanup pass changed.
    pub cleanup: RepairSummary,
}

/// Merge `parts`, run the cleanup pass and require a closed result.
///
/// `solid_fallback` records whether the solid-only mesh was watertight; it is
/// attached to the error when the merged mesh is not.
///
/// # Errors
///
/// Returns a [`Stage::Finalize`] error of kind [`ErrorKind::NonWatertight`]
/// when the merged mesh has boundary edges or is empty.
///
/// # Example
///
/// ```
/// use insole::finalize_mesh;
/// use insole::types::{Point3, cuboid};
///
/// let a = cuboid(Point3::origin(), Point3::new(4.0, 4.0, 4.0));
/// let b = cuboid(Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 2.0, 2.0));
/// let done = finalize_mesh(&[&a, &b], None).unwrap();
/// assert!(done.report.is_watertight);
/// assert_eq!(done.mesh.faces.len(), 24);
/// ```
pub fn finalize_mesh(
    parts: &[&IndexedMesh],
    solid_fallback: Option<bool>,
) -> GenerationResult<Finalized> {
    let mut mesh = IndexedMesh::concat(parts.iter().copied());
    if mesh.faces.is_empty() {
        return Err(non_watertight("merged mesh is empty".to_string(), solid_fallback));
    }

    let cleanup = repair_mesh(&mut mesh, &RepairParams::default())
        .map_err(|e| GenerationError::repair(Stage::Finalize, e))?;
    debug!(
        parts = parts.len(),
        welded = cleanup.vertices_welded,
        degenerates = cleanup.degenerates_removed,
        duplicates = cleanup.duplicates_removed,
        "Merged mesh cleaned"
    );

    let report = validate_mesh(&mesh);
    if !report.is_watertight || !report.is_manifold {
        warn!(
            boundary_edges = report.boundary_edge_count,
            non_manifold_edges = report.non_manifold_edge_count,
            "Merged mesh is not closed"
        );
        return Err(non_watertight(
            format!(
                "merged mesh has {} boundary and {} non-manifold edges",
                report.boundary_edge_count, report.non_manifold_edge_count
            ),
            solid_fallback,
        ));
    }

    info!(
        vertices = report.vertex_count,
        faces = report.face_count,
        volume = report.signed_volume,
        "Mesh finalized"
    );
    Ok(Finalized {
        mesh,
        report,
        cleanup,
    })
}

fn non_watertight(message: String, solid_fallback: Option<bool>) -> GenerationError {
    let err = GenerationError::new(Stage::Finalize, ErrorKind::NonWatertight, message);
    match solid_fallback {
        Some(watertight) => err.with_solid_fallback(watertight),
        None => err,
    }
}

/// Bring a left-orientation mesh to `side`.
///
/// A right-foot mesh is mirrored across the outline's mid-width line; winding
/// stays outward.
pub fn orient_to_side(mesh: &mut IndexedMesh, outline: &Outline, side: FootSide) {
    if side.is_mirrored() {
        let mid = 0.5 * (outline.min().y + outline.max().y);
        mesh.mirror_y(mid);
        debug!(mirror_y = mid, "Mirrored mesh for right foot");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_outline::Point2;
    use insole_types::{MeshBounds, Point3, cuboid};

    #[test]
    fn test_merge_cleans_duplicates() {
        let a = cuboid(Point3::origin(), Point3::new(2.0, 2.0, 2.0));
        let done = finalize_mesh(&[&a, &a], Some(true)).unwrap();
        assert_eq!(done.mesh.faces.len(), 12);
        assert_eq!(done.mesh.vertices.len(), 8);
        assert_eq!(done.cleanup.duplicates_removed, 12);
        assert_relative_eq!(done.report.signed_volume, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_open_mesh_fails_with_fallback() {
        let mut open = cuboid(Point3::origin(), Point3::new(2.0, 2.0, 2.0));
        open.faces.truncate(10);
        let err = finalize_mesh(&[&open], Some(true)).unwrap_err();
        assert_eq!((err.stage, err.kind), (Stage::Finalize, ErrorKind::NonWatertight));
        assert_eq!(err.solid_fallback_watertight, Some(true));

        let err = finalize_mesh(&[], None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NonWatertight);
        assert_eq!(err.solid_fallback_watertight, None);
    }

    #[test]
    fn test_orient_right_foot() {
        let outline = Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(50.0, 0.0),
            Point2::new(50.0, 30.0),
            Point2::new(0.0, 30.0),
        ])
        .unwrap();
        let mut mesh = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 5.0, 2.0));
        let before = mesh.signed_volume();

        orient_to_side(&mut mesh, &outline, FootSide::Left);
        assert_relative_eq!(mesh.bounds().min.y, 0.0);

        orient_to_side(&mut mesh, &outline, FootSide::Right);
        let bounds = mesh.bounds();
        assert_relative_eq!(bounds.min.y, 25.0);
        assert_relative_eq!(bounds.max.y, 30.0);
        assert_relative_eq!(mesh.signed_volume(), before, epsilon = 1e-9);
    }
}
