//! Stage-tagged generation errors.

use std::fmt;

use insole_field::FieldError;
use insole_io::IoError;
use insole_lattice::LatticeError;
use insole_outline::OutlineError;
use insole_repair::RepairError;
use insole_shell::ShellError;
use insole_solid::SolidError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for generation.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Pipeline stage an error is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Request parsing and outline/landmark validation.
    Input,
    /// Arch curve resolution.
    Curves,
    /// Height field construction.
    HeightField,
    /// Base (solid) mesh construction.
    BaseMesh,
    /// Hollow shell subtraction.
    ShellConstruction,
    /// Unit cell tiling.
    LatticeGeneration,
    /// Clipping cells to the cavity.
    LatticeClipping,
    /// Merge and watertightness check.
    Finalize,
    /// Writing output files.
    Export,
}

impl Stage {
    /// Stable identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Curves => "curves",
            Self::HeightField => "height_field",
            Self::BaseMesh => "base_mesh",
            Self::ShellConstruction => "shell_construction",
            Self::LatticeGeneration => "lattice_generation",
            Self::LatticeClipping => "lattice_clipping",
            Self::Finalize => "finalize",
            Self::Export => "export",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request is malformed or out of range.
    InvalidInput,
    /// The geometry collapsed or degenerated.
    GeometricDegeneracy,
    /// Every boolean engine failed.
    BooleanFailure,
    /// A mesh that must be closed is not.
    NonWatertight,
    /// The time budget ran out.
    Timeout,
    /// Reading or writing files failed.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidInput => "invalid input",
            Self::GeometricDegeneracy => "geometric degeneracy",
            Self::BooleanFailure => "boolean failure",
            Self::NonWatertight => "non-watertight result",
            Self::Timeout => "timeout",
            Self::Io => "I/O error",
        })
    }
}

/// The single terminal failure of a generation request.
#[derive(Debug, Error)]
#[error("{stage} stage failed ({kind}): {message}")]
pub struct GenerationError {
    /// Stage that failed.
    pub stage: Stage,
    /// Failure category.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// For [`ErrorKind::NonWatertight`] on the hollow path: whether the
    /// solid-only mesh was watertight.
    pub solid_fallback_watertight: Option<bool>,
    /// Underlying error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GenerationError {
    /// Create an error without an underlying cause.
    #[must_use]
    pub fn new(stage: Stage, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
            solid_fallback_watertight: None,
            source: None,
        }
    }

    fn caused_by<E>(stage: Stage, kind: ErrorKind, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            stage,
            kind,
            message: err.to_string(),
            solid_fallback_watertight: None,
            source: Some(Box::new(err)),
        }
    }

    /// Record whether the solid-only path stayed watertight.
    #[must_use]
    pub const fn with_solid_fallback(mut self, watertight: bool) -> Self {
        self.solid_fallback_watertight = Some(watertight);
        self
    }

    /// Invalid request error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(Stage::Input, ErrorKind::InvalidInput, message)
    }

    /// Time budget exhausted while in `stage`.
    #[must_use]
    pub fn timeout(stage: Stage, budget_ms: u64) -> Self {
        Self::new(
            stage,
            ErrorKind::Timeout,
            format!("time budget of {budget_ms} ms exhausted"),
        )
    }

    pub(crate) fn outline(err: OutlineError) -> Self {
        let kind = match err {
            OutlineError::OffsetCollapsed { .. } => ErrorKind::GeometricDegeneracy,
            _ => ErrorKind::InvalidInput,
        };
        Self::caused_by(Stage::Input, kind, err)
    }

    pub(crate) fn field(err: FieldError) -> Self {
        match err {
            FieldError::Curves(_) => Self::caused_by(Stage::Curves, ErrorKind::InvalidInput, err),
            FieldError::InvalidParameter { .. } => {
                Self::caused_by(Stage::HeightField, ErrorKind::InvalidInput, err)
            }
        }
    }

    pub(crate) fn solid(stage: Stage, err: SolidError) -> Self {
        let kind = solid_kind(&err);
        Self::caused_by(stage, kind, err)
    }

    pub(crate) fn shell(err: ShellError) -> Self {
        let kind = match &err {
            ShellError::InvalidParameter { .. } => ErrorKind::InvalidInput,
            ShellError::OutlineCollapsed { .. } => ErrorKind::GeometricDegeneracy,
            ShellError::Solid(inner) => solid_kind(inner),
            ShellError::Boolean(_) | ShellError::EmptyResult => ErrorKind::BooleanFailure,
            ShellError::NonWatertight { .. } => ErrorKind::NonWatertight,
        };
        Self::caused_by(Stage::ShellConstruction, kind, err)
    }

    pub(crate) fn lattice(err: LatticeError) -> Self {
        let (stage, kind) = match &err {
            LatticeError::InvalidParameter { .. } => {
                (Stage::LatticeGeneration, ErrorKind::InvalidInput)
            }
            LatticeError::EmptyVolume | LatticeError::Repair(_) => {
                (Stage::LatticeGeneration, ErrorKind::GeometricDegeneracy)
            }
            LatticeError::Boolean(_) | LatticeError::Clipping { .. } => {
                (Stage::LatticeClipping, ErrorKind::BooleanFailure)
            }
            LatticeError::Timeout { .. } => (Stage::LatticeGeneration, ErrorKind::Timeout),
        };
        Self::caused_by(stage, kind, err)
    }

    pub(crate) fn repair(stage: Stage, err: RepairError) -> Self {
        Self::caused_by(stage, ErrorKind::GeometricDegeneracy, err)
    }

    pub(crate) fn export(err: IoError) -> Self {
        Self::caused_by(Stage::Export, ErrorKind::Io, err)
    }
}

fn solid_kind(err: &SolidError) -> ErrorKind {
    match err {
        SolidError::InvalidParameter { .. } => ErrorKind::InvalidInput,
        SolidError::Triangulation { .. }
        | SolidError::SelfIntersecting { .. }
        | SolidError::ZeroVolume => ErrorKind::GeometricDegeneracy,
        SolidError::NotClosed { .. } => ErrorKind::NonWatertight,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = GenerationError::invalid_input("outline needs at least 3 points, got 2");
        assert_eq!(
            err.to_string(),
            "input stage failed (invalid input): outline needs at least 3 points, got 2"
        );

        let err = GenerationError::timeout(Stage::LatticeGeneration, 500);
        assert_eq!(
            err.to_string(),
            "lattice_generation stage failed (timeout): time budget of 500 ms exhausted"
        );
    }

    #[test]
    fn test_stage_mapping() {
        let err = GenerationError::outline(OutlineError::TooFewPoints { count: 2 });
        assert_eq!((err.stage, err.kind), (Stage::Input, ErrorKind::InvalidInput));
        assert!(err.source().is_some());

        let err = GenerationError::shell(ShellError::EmptyResult);
        assert_eq!(
            (err.stage, err.kind),
            (Stage::ShellConstruction, ErrorKind::BooleanFailure)
        );

        let err = GenerationError::lattice(LatticeError::Timeout { cell: 1, total: 4 });
        assert_eq!(err.kind, ErrorKind::Timeout);

        let err = GenerationError::solid(Stage::BaseMesh, SolidError::ZeroVolume);
        assert_eq!(err.kind, ErrorKind::GeometricDegeneracy);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&Stage::LatticeClipping).unwrap();
        assert_eq!(json, "\"lattice_clipping\"");
        let json = serde_json::to_string(&ErrorKind::NonWatertight).unwrap();
        assert_eq!(json, "\"non_watertight\"");
    }
}
