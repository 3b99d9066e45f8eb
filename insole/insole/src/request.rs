//! The immutable generation request.

use std::path::Path;

use insole_curves::ArchCurveSet;
use insole_field::{ArchSettings, WallParams};
use insole_lattice::LatticeParams;
use insole_outline::{FootSide, Landmarks, Outline, Point2};
use insole_shell::ShellParams;
use insole_solid::BaseMeshParams;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, GenerationError, GenerationResult, Stage};

/// One outline vertex as supplied by the editor (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlinePoint {
    /// Heel-to-toe coordinate.
    pub x: f64,
    /// Lateral-to-medial coordinate.
    pub y: f64,
}

impl OutlinePoint {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Everything one generation needs, passed in whole.
///
/// Missing JSON fields take their defaults.
///
/// # Example
///
/// ```
/// use insole::GenerationRequest;
///
/// let request = GenerationRequest::from_json_str(
///     r#"{
///         "outline_points": [
///             {"x": 0, "y": 0}, {"x": 240, "y": 0},
///             {"x": 240, "y": 90}, {"x": 0, "y": 90}
///         ],
///         "base_thickness": 2.5,
///         "foot_side": "right"
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(request.base_thickness, 2.5);
/// assert_eq!(request.strut_radius, 0.2);
/// assert!(!request.enable_lattice);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    /// Flat base under the surface (mm).
    pub base_thickness: f64,
    /// Added to every nonzero wall height (mm).
    pub wall_height_offset_mm: f64,
    /// Heel-cup height multiplier.
    pub heel_cup_scale: f64,
    /// Arch height multiplier.
    pub arch_scale: f64,
    /// Absolute heel-cup height, overriding the scaled default (mm).
    pub heel_cup_height: Option<f64>,
    /// Medial wall peak height (mm).
    pub medial_wall_height: f64,
    /// Medial wall peak position (axis %); the navicular when absent.
    pub medial_wall_peak_x: Option<f64>,
    /// Lateral wall peak height (mm).
    pub lateral_wall_height: f64,
    /// Lateral wall peak position (axis %).
    pub lateral_wall_peak_x: f64,
    /// Per-arch positions, heights and overrides.
    pub arch_settings: ArchSettings,
    /// Build a hollow shell with lattice infill instead of a solid.
    pub enable_lattice: bool,
    /// Lattice pitch (mm).
    pub lattice_cell_size: f64,
    /// Lattice strut radius (mm).
    pub strut_radius: f64,
    /// Outline polygon, heel to toe along x.
    pub outline_points: Vec<OutlinePoint>,
    /// Landmark axis positions and width rays.
    #[serde(alias = "landmark_config")]
    pub landmarks: Landmarks,
    /// Edited arch curves; defaults are derived when absent.
    pub arch_curves: Option<ArchCurveSet>,
    /// Which foot the insole is for.
    pub foot_side: FootSide,
    /// Reverse the outline along its length before normalizing.
    pub flip_orientation: bool,
    /// Abort with a timeout once this much wall-clock time has passed.
    pub time_budget_ms: Option<u64>,
    /// Interior sampling step of the solids (mm).
    pub grid_spacing: f64,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        let wall = WallParams::default();
        Self {
            base_thickness: wall.base_thickness,
            wall_height_offset_mm: wall.wall_height_offset,
            heel_cup_scale: wall.heel_cup_scale,
            arch_scale: wall.arch_scale,
            heel_cup_height: wall.heel_cup_height,
            medial_wall_height: wall.medial_height,
            medial_wall_peak_x: wall.medial_peak_x,
            lateral_wall_height: wall.lateral_height,
            lateral_wall_peak_x: wall.lateral_peak_x,
            arch_settings: ArchSettings::default(),
            enable_lattice: false,
            lattice_cell_size: 3.0,
            strut_radius: 0.2,
            outline_points: Vec::new(),
            landmarks: Landmarks::default(),
            arch_curves: None,
            foot_side: FootSide::Left,
            flip_orientation: false,
            time_budget_ms: None,
            grid_spacing: 1.0,
        }
    }
}

impl GenerationRequest {
    /// Create a request for an outline with default parameters.
    #[must_use]
    pub fn new(outline_points: Vec<OutlinePoint>) -> Self {
        Self {
            outline_points,
            ..Self::default()
        }
    }

    /// Enable or disable the hollow shell and lattice path.
    #[must_use]
    pub const fn with_lattice(mut self, enable: bool) -> Self {
        self.enable_lattice = enable;
        self
    }

    /// Set the lattice pitch and strut radius.
    #[must_use]
    pub const fn with_lattice_cell(mut self, cell_size: f64, strut_radius: f64) -> Self {
        self.lattice_cell_size = cell_size;
        self.strut_radius = strut_radius;
        self
    }

    /// Set the foot side.
    #[must_use]
    pub const fn with_foot_side(mut self, side: FootSide) -> Self {
        self.foot_side = side;
        self
    }

    /// Set the base thickness.
    #[must_use]
    pub const fn with_base_thickness(mut self, mm: f64) -> Self {
        self.base_thickness = mm;
        self
    }

    /// Set the arch settings.
    #[must_use]
    pub fn with_arch_settings(mut self, settings: ArchSettings) -> Self {
        self.arch_settings = settings;
        self
    }

    /// Set the grid spacing.
    #[must_use]
    pub const fn with_grid_spacing(mut self, mm: f64) -> Self {
        self.grid_spacing = mm;
        self
    }

    /// Set the time budget.
    #[must_use]
    pub const fn with_time_budget_ms(mut self, ms: u64) -> Self {
        self.time_budget_ms = Some(ms);
        self
    }

    /// Parse a request from JSON.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::InvalidInput`] error for malformed JSON.
    pub fn from_json_str(json: &str) -> GenerationResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            GenerationError::invalid_input(format!("malformed request: {e}"))
        })
    }

    /// Read and parse a request file.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Io`] error when the file cannot be read and an
    /// [`ErrorKind::InvalidInput`] error for malformed JSON.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> GenerationResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            GenerationError::new(
                Stage::Input,
                ErrorKind::Io,
                format!("cannot read {}: {e}", path.display()),
            )
        })?;
        Self::from_json_str(&json)
    }

    /// The validated outline in pipeline orientation.
    ///
    /// Reversed along its length when `flip_orientation` is set, then shifted
    /// so its bounding box starts at the origin.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::InvalidInput`] error for fewer than three
    /// points, non-finite coordinates or a zero-area polygon.
    pub fn outline(&self) -> GenerationResult<Outline> {
        let points = self
            .outline_points
            .iter()
            .map(|p| Point2::new(p.x, p.y))
            .collect();
        let outline = Outline::new(points).map_err(GenerationError::outline)?;
        let outline = if self.flip_orientation {
            outline.flipped_x()
        } else {
            outline
        };
        Ok(outline.normalized())
    }

    /// Wall and heel parameters.
    #[must_use]
    pub fn wall_params(&self) -> WallParams {
        WallParams {
            base_thickness: self.base_thickness,
            wall_height_offset: self.wall_height_offset_mm,
            heel_cup_scale: self.heel_cup_scale,
            heel_cup_height: self.heel_cup_height,
            arch_scale: self.arch_scale,
            medial_height: self.medial_wall_height,
            medial_peak_x: self.medial_wall_peak_x,
            lateral_height: self.lateral_wall_height,
            lateral_peak_x: self.lateral_wall_peak_x,
        }
    }

    /// Grid parameters shared by every solid of the request.
    #[must_use]
    pub fn mesh_params(&self) -> BaseMeshParams {
        BaseMeshParams::default().with_grid_spacing(self.grid_spacing)
    }

    /// Hollow shell parameters.
    #[must_use]
    pub fn shell_params(&self) -> ShellParams {
        ShellParams::default().with_mesh(self.mesh_params())
    }

    /// Lattice parameters.
    #[must_use]
    pub fn lattice_params(&self) -> LatticeParams {
        LatticeParams::default()
            .with_cell_size(self.lattice_cell_size)
            .with_strut_radius(self.strut_radius)
    }

    /// The arch curves to resolve; empty when none were supplied.
    #[must_use]
    pub fn curves(&self) -> ArchCurveSet {
        self.arch_curves.clone().unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rectangle() -> Vec<OutlinePoint> {
        vec![
            OutlinePoint::new(10.0, 5.0),
            OutlinePoint::new(250.0, 5.0),
            OutlinePoint::new(250.0, 95.0),
            OutlinePoint::new(10.0, 95.0),
        ]
    }

    #[test]
    fn test_defaults() {
        let request = GenerationRequest::default();
        assert_eq!(request.base_thickness, 3.0);
        assert_eq!(request.medial_wall_height, 8.0);
        assert_eq!(request.lateral_wall_height, 4.3);
        assert_eq!(request.lateral_wall_peak_x, 30.0);
        assert_eq!(request.lattice_cell_size, 3.0);
        assert_eq!(request.strut_radius, 0.2);
        assert_eq!(request.foot_side, FootSide::Left);
        assert!(request.medial_wall_peak_x.is_none());
        assert!(request.wall_params().validate().is_ok());
        assert!(request.lattice_params().validate().is_ok());
    }

    #[test]
    fn test_json_fields_and_alias() {
        let request = GenerationRequest::from_json_str(
            r#"{
                "outline_points": [{"x": 0, "y": 0}, {"x": 10, "y": 0}, {"x": 0, "y": 10}],
                "landmark_config": {"navicular": 40.0},
                "wall_height_offset_mm": 1.5,
                "medial_wall_peak_x": 45.0,
                "enable_lattice": true,
                "lattice_cell_size": 4.0,
                "time_budget_ms": 60000
            }"#,
        )
        .unwrap();
        assert_eq!(request.outline_points.len(), 3);
        assert_eq!(request.landmarks.navicular, 40.0);
        assert_eq!(request.landmarks.arch_start, 15.0);
        assert_eq!(request.wall_params().wall_height_offset, 1.5);
        assert_eq!(request.wall_params().medial_peak_x, Some(45.0));
        assert!(request.enable_lattice);
        assert_eq!(request.lattice_params().cell_size, 4.0);
        assert_eq!(request.time_budget_ms, Some(60_000));
    }

    #[test]
    fn test_malformed_json() {
        let err = GenerationRequest::from_json_str(r#"{"base_thickness": "thick"}"#).unwrap_err();
        assert_eq!((err.stage, err.kind), (Stage::Input, ErrorKind::InvalidInput));

        let err = GenerationRequest::from_json_file("no_such_request_12345.json").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[test]
    fn test_outline_normalized() {
        let outline = GenerationRequest::new(rectangle()).outline().unwrap();
        assert_relative_eq!(outline.min().x, 0.0);
        assert_relative_eq!(outline.min().y, 0.0);
        assert_relative_eq!(outline.length(), 240.0);
        assert_relative_eq!(outline.width(), 90.0);
    }

    #[test]
    fn test_outline_flip_keeps_extent() {
        let mut points = rectangle();
        points.push(OutlinePoint::new(10.0, 50.0));
        let mut request = GenerationRequest::new(points);
        let plain = request.outline().unwrap();
        request.flip_orientation = true;
        let flipped = request.outline().unwrap();

        assert_relative_eq!(flipped.min().x, 0.0);
        assert_relative_eq!(flipped.length(), plain.length());
        // The extra heel point ends up at the toe.
        assert!(flipped.points().iter().any(|p| (p.x - 240.0).abs() < 1e-9 && (p.y - 45.0).abs() < 1e-9));
    }

    #[test]
    fn test_outline_too_few_points() {
        let err = GenerationRequest::new(rectangle()[..2].to_vec())
            .outline()
            .unwrap_err();
        assert_eq!((err.stage, err.kind), (Stage::Input, ErrorKind::InvalidInput));
    }

    #[test]
    fn test_round_trip_json() {
        let request = GenerationRequest::new(rectangle()).with_foot_side(FootSide::Right);
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"foot_side\":\"right\""));
        assert_eq!(GenerationRequest::from_json_str(&json).unwrap(), request);
    }
}
