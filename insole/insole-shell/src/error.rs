//! Error types for shell construction.

use insole_boolean::BooleanError;
use insole_outline::OutlineError;
use insole_solid::SolidError;
use thiserror::Error;

/// Result type alias for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;

/// Errors that can occur during hollow shell construction.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A parameter is out of range.
    #[error("invalid shell parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Insetting the outline by the wall thickness left nothing usable.
    #[error("wall thickness {wall} mm collapses the outline")]
    OutlineCollapsed {
        /// Requested inset.
        wall: f64,
        /// The offset failure.
        #[source]
        source: OutlineError,
    },

    /// Building the outer or inner solid failed.
    #[error("solid construction failed: {0}")]
    Solid(#[from] SolidError),

    /// Every boolean engine failed on the subtraction.
    #[error("shell subtraction failed: {0}")]
    Boolean(#[from] BooleanError),

    /// The subtraction removed everything.
    #[error("shell subtraction produced an empty mesh")]
    EmptyResult,

    /// The subtraction left an open or non-manifold surface.
    #[error(
        "hollow shell is not watertight ({boundary_edges} boundary edges, {non_manifold_edges} non-manifold edges)"
    )]
    NonWatertight {
        /// Edges used by one face.
        boundary_edges: usize,
        /// Edges used by more than two faces.
        non_manifold_edges: usize,
    },
}

impl ShellError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
