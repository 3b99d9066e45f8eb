//! Error types for solid construction.

use thiserror::Error;

/// Result type alias for solid construction.
pub type SolidResult<T> = Result<T, SolidError>;

/// Errors that can occur while building a solid from an outline.
#[derive(Debug, Error)]
pub enum SolidError {
    /// A parameter is out of range.
    #[error("invalid solid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The Delaunay triangulation rejected a point.
    #[error("triangulation failed: {details}")]
    Triangulation {
        /// Description of the failure.
        details: String,
    },

    /// An outline edge crosses another outline edge.
    #[error("outline edge {edge} crosses another outline edge")]
    SelfIntersecting {
        /// Index of the first edge that could not be constrained.
        edge: usize,
    },

    /// The extruded mesh is not a closed manifold.
    #[error(
        "extruded solid is not closed ({boundary_edges} boundary edges, {non_manifold_edges} non-manifold edges)"
    )]
    NotClosed {
        /// Edges used by one face.
        boundary_edges: usize,
        /// Edges used by more than two faces.
        non_manifold_edges: usize,
    },

    /// Top and bottom coincide everywhere.
    #[error("extruded solid encloses no volume")]
    ZeroVolume,
}

impl SolidError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Create a triangulation error.
    #[must_use]
    pub fn triangulation(details: impl Into<String>) -> Self {
        Self::Triangulation {
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SolidError::invalid_parameter("grid_spacing", "must be positive");
        assert!(format!("{err}").contains("grid_spacing"));

        let err = SolidError::triangulation("point 3: too large");
        assert!(format!("{err}").contains("point 3"));

        let err = SolidError::SelfIntersecting { edge: 7 };
        assert!(format!("{err}").contains("edge 7"));

        let err = SolidError::NotClosed {
            boundary_edges: 4,
            non_manifold_edges: 0,
        };
        assert!(format!("{err}").contains("4 boundary edges"));

        assert!(format!("{}", SolidError::ZeroVolume).contains("no volume"));
    }
}
