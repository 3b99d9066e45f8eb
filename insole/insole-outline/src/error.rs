//! Error types for outline construction and polygon operations.

use thiserror::Error;

/// Result type alias for outline operations.
pub type OutlineResult<T> = Result<T, OutlineError>;

/// Errors that can occur while validating or transforming an outline.
#[derive(Debug, Error)]
pub enum OutlineError {
    /// Fewer than three distinct points were supplied.
    #[error("outline needs at least 3 points, got {count}")]
    TooFewPoints {
        /// Number of points after dropping a duplicated closing point.
        count: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("outline point {index} is not finite")]
    NonFinite {
        /// Index of the offending point.
        index: usize,
    },

    /// The polygon encloses (almost) no area.
    #[error("outline is degenerate (area {area:.6} mm^2)")]
    Degenerate {
        /// Absolute enclosed area.
        area: f64,
    },

    /// An inward offset consumed the whole polygon or turned it inside out.
    #[error("inward offset of {distance} mm collapsed the outline: {reason}")]
    OffsetCollapsed {
        /// Requested offset distance.
        distance: f64,
        /// What went wrong.
        reason: String,
    },

    /// A landmark or width ray lies outside 0..=100 percent.
    #[error("landmark '{name}' = {value} is outside 0..=100")]
    LandmarkOutOfRange {
        /// Landmark name.
        name: String,
        /// Offending value.
        value: f64,
    },
}

impl OutlineError {
    /// Create an offset collapse error.
    #[must_use]
    pub fn offset_collapsed(distance: f64, reason: impl Into<String>) -> Self {
        Self::OffsetCollapsed {
            distance,
            reason: reason.into(),
        }
    }
}
