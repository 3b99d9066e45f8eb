//! The generation pipeline.
//!
//! outline → height field → base solid → (hollow shell → lattice) → finalize
//! → orient. Every stage runs to completion or fails the whole request.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use insole_field::{HeightField, HeightGrid};
use insole_io::{ExportStats, MeshFormat, export_mesh};
use insole_lattice::{Lattice, LatticeError, LatticeStats, generate_lattice};
use insole_outline::{FootSide, OrderViolation, Outline};
use insole_repair::{MeshReport, validate_mesh};
use insole_shell::{HollowShell, ShellStats, build_clip_volume, generate_hollow_shell};
use insole_solid::build_base_mesh;
use insole_types::IndexedMesh;
use tracing::{debug, info, warn};

use crate::error::{GenerationError, GenerationResult, Stage};
use crate::finalize::{finalize_mesh, orient_to_side};
use crate::request::GenerationRequest;

/// Wall-clock time spent in one stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageTiming {
    /// The stage.
    pub stage: Stage,
    /// Elapsed time in milliseconds.
    pub time_ms: f64,
}

/// Diagnostics reported with a generated mesh.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Vertices in the final mesh.
    pub vertex_count: usize,
    /// Faces in the final mesh.
    pub face_count: usize,
    /// Whether the final mesh has no boundary edges.
    pub is_watertight: bool,
    /// Enclosed volume (mm³).
    pub volume: f64,
    /// Foot side the mesh is oriented for.
    pub foot_side: FootSide,
    /// Full validation of the final mesh.
    pub validation: MeshReport,
    /// Hollow shell metrics, when the lattice path ran.
    pub shell: Option<ShellStats>,
    /// Lattice metrics, when the lattice path ran.
    pub lattice: Option<LatticeStats>,
    /// Landmarks found out of heel-to-toe order.
    pub landmark_order: Vec<OrderViolation>,
    /// Per-stage wall-clock time.
    pub timings: Vec<StageTiming>,
}

/// A finished insole mesh and its report.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The final mesh, oriented for the requested foot.
    pub mesh: IndexedMesh,
    /// Diagnostics.
    pub report: GenerationReport,
}

/// Files written by [`Generation::export`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFiles {
    /// Print-ready binary STL.
    pub print_path: PathBuf,
    /// Visualization PLY.
    pub preview_path: PathBuf,
    /// Statistics of the written mesh.
    pub stats: ExportStats,
}

impl Generation {
    /// Write `{stem}.stl` and `{stem}.ply` into `dir`.
    ///
    /// # Errors
    ///
    /// Returns a [`Stage::Export`] error when either file cannot be written.
    pub fn export<P: AsRef<Path>>(&self, dir: P, stem: &str) -> GenerationResult<ExportedFiles> {
        let dir = dir.as_ref();
        let print_path = dir.join(format!("{stem}.{}", MeshFormat::Stl.extension()));
        let preview_path = dir.join(format!("{stem}.{}", MeshFormat::Ply.extension()));

        let stats = export_mesh(&self.mesh, &print_path, MeshFormat::Stl)
            .map_err(GenerationError::export)?;
        export_mesh(&self.mesh, &preview_path, MeshFormat::Ply).map_err(GenerationError::export)?;
        Ok(ExportedFiles {
            print_path,
            preview_path,
            stats,
        })
    }
}

/// Tracks the request's time budget and per-stage timings.
struct Clock {
    start: Instant,
    stage_start: Instant,
    budget_ms: Option<u64>,
    timings: Vec<StageTiming>,
}

impl Clock {
    fn new(budget_ms: Option<u64>) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            stage_start: now,
            budget_ms,
            timings: Vec::new(),
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.budget_ms
            .and_then(|ms| self.start.checked_add(Duration::from_millis(ms)))
    }

    /// Close `stage` and fail if the budget is spent.
    fn finish(&mut self, stage: Stage) -> GenerationResult<()> {
        let now = Instant::now();
        let time_ms = now.duration_since(self.stage_start).as_secs_f64() * 1000.0;
        self.stage_start = now;
        self.timings.push(StageTiming { stage, time_ms });
        debug!(stage = stage.as_str(), time_ms, "Stage complete");

        match (self.budget_ms, self.deadline()) {
            (Some(ms), Some(deadline)) if now >= deadline => {
                Err(GenerationError::timeout(stage, ms))
            }
            _ => Ok(()),
        }
    }
}

/// Run a request end to end.
///
/// Without the lattice the result is the solid base mesh. With it, the base
/// becomes the outer operand of the hollow shell, the cavity is filled with
/// the clipped lattice, and both are merged. A right-foot result is mirrored
/// last.
///
/// # Errors
///
/// Returns the first stage failure as a [`GenerationError`]. A merged mesh
/// that is not watertight fails with
/// [`ErrorKind::NonWatertight`](crate::ErrorKind::NonWatertight), recording
/// whether the solid alone was watertight.
///
/// # Example
///
/// ```no_run
/// use insole::{GenerationRequest, generate};
///
/// let request = GenerationRequest::from_json_file("request.json").unwrap();
/// let generation = generate(&request).unwrap();
/// assert!(generation.report.is_watertight);
/// generation.export("out", "insole").unwrap();
/// ```
pub fn generate(request: &GenerationRequest) -> GenerationResult<Generation> {
    let mut clock = Clock::new(request.time_budget_ms);
    info!(
        points = request.outline_points.len(),
        lattice = request.enable_lattice,
        side = ?request.foot_side,
        "Generating insole"
    );

    let outline = request.outline()?;
    request
        .landmarks
        .validate()
        .map_err(GenerationError::outline)?;
    let landmark_order = request.landmarks.check_order();
    for violation in &landmark_order {
        warn!(
            earlier = violation.earlier,
            later = violation.later,
            earlier_value = violation.earlier_value,
            later_value = violation.later_value,
            "Landmarks out of heel-to-toe order"
        );
    }
    clock.finish(Stage::Input)?;

    let field = build_field(request, &outline)?;
    clock.finish(Stage::HeightField)?;

    let base = build_base_mesh(&field, &request.mesh_params())
        .map_err(|e| GenerationError::solid(Stage::BaseMesh, e))?;
    let base_report = validate_mesh(&base);
    info!(
        vertices = base_report.vertex_count,
        faces = base_report.face_count,
        watertight = base_report.is_watertight,
        "Base mesh built"
    );
    clock.finish(Stage::BaseMesh)?;

    let (finalized, shell_stats, lattice_stats) = if request.enable_lattice {
        let hollow = build_hollow(request, &outline, &field, &base, &mut clock)?;
        let finalized = finalize_mesh(
            &[&hollow.shell.shell, &hollow.lattice.mesh],
            Some(base_report.is_watertight),
        )?;
        (finalized, Some(hollow.shell.stats), Some(hollow.lattice.stats))
    } else {
        (finalize_mesh(&[&base], None)?, None, None)
    };
    clock.finish(Stage::Finalize)?;

    let mut mesh = finalized.mesh;
    orient_to_side(&mut mesh, &outline, request.foot_side);

    let validation = finalized.report;
    let report = GenerationReport {
        vertex_count: validation.vertex_count,
        face_count: validation.face_count,
        is_watertight: validation.is_watertight,
        volume: validation.signed_volume,
        foot_side: request.foot_side,
        validation,
        shell: shell_stats,
        lattice: lattice_stats,
        landmark_order,
        timings: clock.timings,
    };
    info!(
        vertices = report.vertex_count,
        faces = report.face_count,
        watertight = report.is_watertight,
        volume = report.volume,
        "Insole generated"
    );
    Ok(Generation { mesh, report })
}

struct Hollow {
    shell: HollowShell,
    lattice: Lattice,
}

/// Shell around the cavity and the lattice clipped into it.
fn build_hollow(
    request: &GenerationRequest,
    outline: &Outline,
    field: &HeightField,
    base: &IndexedMesh,
    clock: &mut Clock,
) -> GenerationResult<Hollow> {
    let shell_params = request.shell_params();
    let shell = generate_hollow_shell(outline, field, &0.0_f64, Some(base), &shell_params)
        .map_err(GenerationError::shell)?;
    clock.finish(Stage::ShellConstruction)?;

    let clip = build_clip_volume(outline, field, &0.0_f64, &shell_params)
        .map_err(GenerationError::shell)?;
    let mut lattice_params = request.lattice_params();
    if let Some(deadline) = clock.deadline() {
        lattice_params = lattice_params.with_deadline(deadline);
    }
    let lattice = generate_lattice(&clip, &lattice_params).map_err(|e| match e {
        LatticeError::Timeout { .. } => GenerationError::timeout(
            Stage::LatticeGeneration,
            request.time_budget_ms.unwrap_or_default(),
        ),
        other => GenerationError::lattice(other),
    })?;
    clock.finish(Stage::LatticeGeneration)?;
    Ok(Hollow { shell, lattice })
}

fn build_field(request: &GenerationRequest, outline: &Outline) -> GenerationResult<HeightField> {
    HeightField::new(
        outline,
        &request.landmarks,
        &request.arch_settings,
        &request.wall_params(),
        &request.curves(),
    )
    .map_err(GenerationError::field)
}

/// Sample the request's height field on a grid of step `spacing`.
///
/// Uses the same field as [`generate`], in left-foot orientation, covering
/// the normalized outline's bounding box.
///
/// # Errors
///
/// Returns an [`ErrorKind::InvalidInput`](crate::ErrorKind::InvalidInput)
/// error for a non-positive spacing,
/// and the input or field errors of [`generate`].
pub fn preview(request: &GenerationRequest, spacing: f64) -> GenerationResult<HeightGrid> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(GenerationError::invalid_input(format!(
            "preview spacing must be positive, got {spacing}"
        )));
    }
    let outline = request.outline()?;
    let field = build_field(request, &outline)?;
    let grid = field.sample_grid(
        &axis(outline.length(), spacing),
        &axis(outline.width(), spacing),
    );
    debug!(
        columns = grid.xs.len(),
        rows = grid.ys.len(),
        "Preview sampled"
    );
    Ok(grid)
}

/// Grid coordinates `0, spacing, 2·spacing, ...` up to `extent`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn axis(extent: f64, spacing: f64) -> Vec<f64> {
    let steps = (extent / spacing).floor() as usize;
    (0..=steps).map(|i| i as f64 * spacing).collect()
}
