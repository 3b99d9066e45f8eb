//! Error types for lattice generation.

use insole_boolean::BooleanError;
use insole_repair::RepairError;
use thiserror::Error;

/// Result type alias for lattice operations.
pub type LatticeResult<T> = Result<T, LatticeError>;

/// Errors that can occur during lattice generation.
#[derive(Debug, Error)]
pub enum LatticeError {
    /// A parameter is out of range.
    #[error("invalid lattice parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The clip volume has no faces.
    #[error("lattice clip volume is empty")]
    EmptyVolume,

    /// The clip volume could not be indexed.
    #[error("lattice clip volume rejected: {0}")]
    Boolean(#[from] BooleanError),

    /// The cleanup pass rejected a mesh.
    #[error("lattice cleanup failed: {0}")]
    Repair(#[from] RepairError),

    /// Clipping a primitive of a unit cell failed in every engine.
    #[error("clipping unit cell {cell} failed: {source}")]
    Clipping {
        /// Cell index in grid order.
        cell: usize,
        /// The last engine failure.
        #[source]
        source: BooleanError,
    },

    /// The deadline passed before all cells were generated.
    #[error("lattice generation timed out at cell {cell} of {total}")]
    Timeout {
        /// Cell being started when the deadline was noticed.
        cell: usize,
        /// Cells in the grid.
        total: usize,
    },
}

impl LatticeError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
