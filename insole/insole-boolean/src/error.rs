//! Error types for boolean operations.

use thiserror::Error;

/// Errors that can occur during boolean operations.
#[derive(Debug, Error)]
pub enum BooleanError {
    /// One or both input meshes are empty.
    #[error("empty mesh: {details}")]
    EmptyMesh {
        /// Description of which mesh is empty.
        details: String,
    },

    /// A configuration value is out of range.
    #[error("invalid boolean config '{name}': {reason}")]
    InvalidConfig {
        /// Field name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Boolean operation failed due to numerical issues.
    #[error("numerical error: {details}")]
    NumericalError {
        /// Description of the numerical issue.
        details: String,
    },

    /// Overlapping coplanar triangles, which the splitting engine does not resolve.
    #[error("{pairs} coplanar triangle pairs overlap")]
    CoplanarOverlap {
        /// Number of overlapping coplanar pairs.
        pairs: usize,
    },

    /// The surfaces cross, and the engine only classifies whole components.
    #[error("{engine} engine cannot resolve {pairs} crossing triangle pairs")]
    SurfacesCross {
        /// Name of the engine.
        engine: &'static str,
        /// Triangle pairs in contact.
        pairs: usize,
    },

    /// A triangle could not be retriangulated along its cut segments.
    #[error("failed to split face {face}: {details}")]
    SplitFailed {
        /// Index of the face in its input mesh.
        face: usize,
        /// Description of the failure.
        details: String,
    },

    /// An engine produced an open or non-manifold mesh from closed inputs.
    #[error("{engine} engine produced a non-watertight result ({boundary_edges} boundary edges, {non_manifold_edges} non-manifold edges)")]
    NonWatertightResult {
        /// Name of the engine.
        engine: &'static str,
        /// Boundary edges in the result.
        boundary_edges: usize,
        /// Non-manifold edges in the result.
        non_manifold_edges: usize,
    },

    /// Every engine in the chain failed.
    #[error("all boolean engines failed for {op}: {attempts}")]
    AllEnginesFailed {
        /// The operation attempted.
        op: String,
        /// `engine: error` for each attempt, separated by `; `.
        attempts: String,
    },
}

/// Result type for boolean operations.
pub type BooleanResult<T> = Result<T, BooleanError>;
