//! Hollow shell construction.

use insole_boolean::{BooleanOp, EngineChain, Operand};
use insole_outline::Outline;
use insole_repair::validate_mesh;
use insole_solid::{BaseMeshParams, HeightMap, Offset, build_solid_from_height_maps};
use insole_types::IndexedMesh;
use tracing::{debug, info, warn};

use crate::params::ShellParams;
use crate::{ShellError, ShellResult};

/// Outer top lowered by the skin, kept at least `floor` above the bottom.
struct SkinnedTop<'a> {
    top: &'a dyn HeightMap,
    bottom: &'a dyn HeightMap,
    skin: f64,
    floor: f64,
}

impl HeightMap for SkinnedTop<'_> {
    fn height(&self, x: f64, y: f64) -> f64 {
        (self.top.height(x, y) - self.skin).max(self.bottom.height(x, y) + self.floor)
    }
}

/// A hollow shell and the cavity it encloses.
#[derive(Debug)]
pub struct HollowShell {
    /// Outer solid minus the inner solid.
    pub shell: IndexedMesh,
    /// The inner solid (the cavity volume).
    pub inner: IndexedMesh,
    /// Construction metrics.
    pub stats: ShellStats,
}

/// Metrics of a hollow shell.
#[derive(Debug, Clone, Default)]
pub struct ShellStats {
    /// Shell vertices.
    pub vertex_count: usize,
    /// Shell faces.
    pub face_count: usize,
    /// Whether the shell has no boundary edges.
    pub is_watertight: bool,
    /// Enclosed shell volume (mm³).
    pub volume: f64,
    /// Boolean engine that produced the shell.
    pub engine: &'static str,
    /// Engines that failed first.
    pub failed_engines: Vec<&'static str>,
    /// Whether a supplied outer solid was used.
    pub outer_reused: bool,
    /// Inner solid faces.
    pub inner_face_count: usize,
    /// Loops the wall inset split off and left solid, where the outline
    /// pinches narrower than two walls.
    pub dropped_inset_loops: usize,
}

/// Build the inner solid: outline inset by `wall`, heights pulled in by the
/// skins, the grid anchored at the outer outline's grid origin. Also returns
/// the number of inset loops dropped.
fn inset_solid(
    outline: &Outline,
    top: &dyn HeightMap,
    bottom: &dyn HeightMap,
    (wall, top_skin, bottom_skin): (f64, f64, f64),
    min_gap: f64,
    mesh: &BaseMeshParams,
) -> ShellResult<(IndexedMesh, usize)> {
    let inset = outline
        .inset_loops(wall)
        .map_err(|source| ShellError::OutlineCollapsed { wall, source })?;
    let inner_top = SkinnedTop {
        top,
        bottom,
        skin: top_skin,
        floor: bottom_skin + min_gap,
    };
    let inner_bottom = Offset::new(bottom, bottom_skin);
    let origin = mesh.grid_origin.unwrap_or_else(|| outline.min());
    let grid = mesh.clone().with_grid_origin(origin);
    let solid = build_solid_from_height_maps(&inset.outline, &inner_top, &inner_bottom, &grid)?;
    Ok((solid, inset.dropped_loops))
}

/// Build a hollow shell between two height maps over `outline`.
///
/// `outer` is the already built outer solid; it is used as is when given and
/// built from the maps otherwise. The inner solid sits `wall_thickness`
/// inside the outline, `top_skin` below the top and `bottom_skin` above the
/// bottom.
///
/// # Errors
///
/// - [`ShellError::InvalidParameter`] for bad parameters
/// - [`ShellError::OutlineCollapsed`] when the wall inset leaves nothing
/// - [`ShellError::Solid`] when a solid cannot be built
/// - [`ShellError::Boolean`] when every engine fails
/// - [`ShellError::EmptyResult`] / [`ShellError::NonWatertight`] for an
///   unusable shell
///
/// # Example
///
/// ```
/// use insole_outline::{Outline, Point2};
/// use insole_shell::{generate_hollow_shell, ShellParams};
///
/// let outline = Outline::new(vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(50.0, 0.0),
///     Point2::new(50.0, 30.0),
///     Point2::new(0.0, 30.0),
/// ])
/// .unwrap();
/// let hollow =
///     generate_hollow_shell(&outline, &5.0_f64, &0.0_f64, None, &ShellParams::default()).unwrap();
/// assert!(hollow.stats.is_watertight);
/// ```
pub fn generate_hollow_shell(
    outline: &Outline,
    top: &dyn HeightMap,
    bottom: &dyn HeightMap,
    outer: Option<&IndexedMesh>,
    params: &ShellParams,
) -> ShellResult<HollowShell> {
    params.validate()?;

    let built;
    let outer_solid = if let Some(mesh) = outer.filter(|m| !m.faces.is_empty()) {
        debug!(vertices = mesh.vertices.len(), "Using supplied outer solid");
        mesh
    } else {
        built = build_solid_from_height_maps(outline, top, bottom, &params.mesh)?;
        &built
    };

    let (inner, dropped_inset_loops) = inset_solid(
        outline,
        top,
        bottom,
        (params.wall_thickness, params.top_skin, params.bottom_skin),
        params.min_gap,
        &params.mesh,
    )?;
    debug!(
        vertices = inner.vertices.len(),
        faces = inner.faces.len(),
        "Built inner solid"
    );

    let config = &params.boolean;
    let a = Operand::new(outer_solid, config)?;
    let b = Operand::new(&inner, config)?;
    let outcome = EngineChain::default().run(&a, &b, BooleanOp::Difference, config)?;

    if outcome.mesh.faces.is_empty() {
        return Err(ShellError::EmptyResult);
    }
    let report = validate_mesh(&outcome.mesh);
    if !report.is_watertight || !report.is_manifold {
        return Err(ShellError::NonWatertight {
            boundary_edges: report.boundary_edge_count,
            non_manifold_edges: report.non_manifold_edge_count,
        });
    }

    let stats = ShellStats {
        vertex_count: report.vertex_count,
        face_count: report.face_count,
        is_watertight: report.is_watertight,
        volume: report.signed_volume,
        engine: outcome.engine,
        failed_engines: outcome.failed_engines,
        outer_reused: outer.is_some_and(|m| !m.faces.is_empty()),
        inner_face_count: inner.faces.len(),
        dropped_inset_loops,
    };
    if dropped_inset_loops > 0 {
        warn!(
            dropped = dropped_inset_loops,
            wall = params.wall_thickness,
            "Outline narrower than two walls in places; those parts stay solid"
        );
    }
    info!(
        vertices = stats.vertex_count,
        faces = stats.face_count,
        engine = stats.engine,
        "Hollow shell built"
    );
    Ok(HollowShell {
        shell: outcome.mesh,
        inner,
        stats,
    })
}

/// Build the volume lattice infill is clipped to.
///
/// It reaches halfway into the shell's walls and skins so clipped struts end
/// inside the shell material.
///
/// # Errors
///
/// As [`generate_hollow_shell`], without the boolean errors.
pub fn build_clip_volume(
    outline: &Outline,
    top: &dyn HeightMap,
    bottom: &dyn HeightMap,
    params: &ShellParams,
) -> ShellResult<IndexedMesh> {
    params.validate()?;
    let (clip, _) = inset_solid(
        outline,
        top,
        bottom,
        (
            params.wall_thickness * 0.5,
            params.top_skin * 0.5,
            params.bottom_skin * 0.5,
        ),
        params.min_gap,
        &params.mesh,
    )?;
    debug!(faces = clip.faces.len(), "Built lattice clip volume");
    Ok(clip)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_outline::Point2;

    fn rectangle(w: f64, h: f64) -> Outline {
        Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ])
        .unwrap()
    }

    #[test]
    fn test_flat_rectangle_shell_is_watertight() {
        let outline = rectangle(50.0, 30.0);
        let hollow =
            generate_hollow_shell(&outline, &5.0_f64, &0.0_f64, None, &ShellParams::default())
                .unwrap();

        assert!(hollow.stats.is_watertight);
        assert!(!hollow.stats.outer_reused);
        assert_eq!(hollow.stats.engine, "splitting");
        let cavity = 48.4 * 28.4 * 4.2;
        assert_relative_eq!(hollow.inner.volume(), cavity, epsilon = 1e-6);
        assert_relative_eq!(hollow.stats.volume, 7500.0 - cavity, epsilon = 1e-6);
        assert!(validate_mesh(&hollow.shell).is_printable());
    }

    #[test]
    fn test_supplied_outer_is_reused() {
        let outline = rectangle(50.0, 30.0);
        let params = ShellParams::default();
        let outer = build_solid_from_height_maps(&outline, &5.0_f64, &0.0_f64, &params.mesh).unwrap();
        let hollow =
            generate_hollow_shell(&outline, &5.0_f64, &0.0_f64, Some(&outer), &params).unwrap();
        assert!(hollow.stats.outer_reused);
        assert!(hollow.stats.face_count > outer.faces.len());
    }

    #[test]
    fn test_thin_insole_keeps_min_gap() {
        let outline = rectangle(40.0, 20.0);
        let params = ShellParams::default();
        let hollow = generate_hollow_shell(&outline, &0.6_f64, &0.0_f64, None, &params).unwrap();
        // Skins would overlap; the cavity is held at the minimum gap.
        let zs: Vec<f64> = hollow.inner.vertices.iter().map(|v| v.position.z).collect();
        let top = zs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let bottom = zs.iter().copied().fold(f64::INFINITY, f64::min);
        assert_relative_eq!(top - bottom, 0.05, epsilon = 1e-9);
    }

    #[test]
    fn test_wall_wider_than_outline_fails() {
        let outline = rectangle(50.0, 30.0);
        let params = ShellParams::default().with_wall_thickness(20.0);
        let err = generate_hollow_shell(&outline, &5.0_f64, &0.0_f64, None, &params).unwrap_err();
        assert!(matches!(err, ShellError::OutlineCollapsed { .. }));
    }

    #[test]
    fn test_pinched_outline_reports_solid_lobe() {
        // A 2 mm neck between a 20 x 20 and a 24 x 20 lobe.
        let dumbbell = Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(20.0, 0.0),
            Point2::new(20.0, 9.0),
            Point2::new(30.0, 9.0),
            Point2::new(30.0, 0.0),
            Point2::new(54.0, 0.0),
            Point2::new(54.0, 20.0),
            Point2::new(30.0, 20.0),
            Point2::new(30.0, 11.0),
            Point2::new(20.0, 11.0),
            Point2::new(20.0, 20.0),
            Point2::new(0.0, 20.0),
        ])
        .unwrap();
        let params = ShellParams::default().with_wall_thickness(1.5);
        let hollow = generate_hollow_shell(&dumbbell, &5.0_f64, &0.0_f64, None, &params).unwrap();

        assert_eq!(hollow.stats.dropped_inset_loops, 1);
        assert!(hollow.stats.is_watertight);
        // Only the right lobe is hollowed.
        let cavity = 21.0 * 17.0 * 4.2;
        assert_relative_eq!(hollow.stats.volume, 900.0 * 5.0 - cavity, epsilon = 1e-6);

        let plain = generate_hollow_shell(&rectangle(50.0, 30.0), &5.0_f64, &0.0_f64, None, &params)
            .unwrap();
        assert_eq!(plain.stats.dropped_inset_loops, 0);
    }

    #[test]
    fn test_clip_volume_reaches_into_skins() {
        let outline = rectangle(50.0, 30.0);
        let clip = build_clip_volume(&outline, &5.0_f64, &0.0_f64, &ShellParams::default()).unwrap();
        assert_relative_eq!(clip.volume(), 49.2 * 29.2 * 4.6, epsilon = 1e-6);
    }
}
