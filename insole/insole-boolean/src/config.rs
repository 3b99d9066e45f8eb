//! Configuration for boolean operations.
//!
//! [`BooleanConfig`] controls tolerances, result cleanup and parallelism.
//! The defaults are tuned for millimetre-scale meshes such as insole shells
//! and lattice struts.
//!
//! # Example
//!
//! ```
//! use insole_boolean::{BooleanConfig, CleanupLevel};
//!
//! let config = BooleanConfig::default()
//!     .with_cleanup(CleanupLevel::Full)
//!     .with_parallel(false);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{BooleanError, BooleanResult};

/// Level of cleanup applied to boolean results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupLevel {
    /// Raw engine output; coincident cut vertices stay unwelded.
    None,

    /// Weld coincident vertices, drop collapsed faces and unreferenced vertices.
    #[default]
    Fast,

    /// [`CleanupLevel::Fast`] plus duplicate face removal and fresh vertex normals.
    Full,
}

/// Configuration for boolean operations.
#[derive(Debug, Clone)]
pub struct BooleanConfig {
    /// Vertices closer than this are merged.
    pub vertex_weld_tolerance: f64,

    /// Vertices closer than this to the other triangle's plane count as on it.
    pub coplanar_tolerance: f64,

    /// Cut points closer than this to a triangle edge are snapped onto it.
    pub edge_tolerance: f64,

    /// Minimum ray parameter counted by the inside test.
    pub classification_tolerance: f64,

    /// Level of cleanup to apply to results.
    pub cleanup: CleanupLevel,

    /// Whether to use rayon for large batches.
    pub parallel: bool,

    /// Batch size above which work is split across threads.
    pub parallel_threshold: usize,

    /// Maximum triangles per BVH leaf.
    pub bvh_leaf_size: usize,
}

impl Default for BooleanConfig {
    fn default() -> Self {
        Self {
            vertex_weld_tolerance: 1e-6,
            coplanar_tolerance: 1e-6,
            edge_tolerance: 1e-8,
            classification_tolerance: 1e-7,
            cleanup: CleanupLevel::default(),
            parallel: true,
            parallel_threshold: 512,
            bvh_leaf_size: 8,
        }
    }
}

impl BooleanConfig {
    /// Set the cleanup level.
    #[must_use]
    pub const fn with_cleanup(mut self, level: CleanupLevel) -> Self {
        self.cleanup = level;
        self
    }

    /// Enable or disable parallel processing.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the vertex weld tolerance.
    #[must_use]
    pub fn with_vertex_weld_tolerance(mut self, tolerance: f64) -> Self {
        self.vertex_weld_tolerance = tolerance.abs();
        self
    }

    /// Set the BVH leaf size (at least 1).
    #[must_use]
    pub fn with_bvh_leaf_size(mut self, size: usize) -> Self {
        self.bvh_leaf_size = size.max(1);
        self
    }

    /// Set the batch size above which work runs in parallel.
    #[must_use]
    pub const fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Whether a batch of `len` items should run on the rayon pool.
    #[must_use]
    pub const fn use_parallel(&self, len: usize) -> bool {
        self.parallel && len > self.parallel_threshold
    }

    /// Check that every tolerance is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`BooleanError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> BooleanResult<()> {
        for (name, value) in [
            ("vertex_weld_tolerance", self.vertex_weld_tolerance),
            ("coplanar_tolerance", self.coplanar_tolerance),
            ("edge_tolerance", self.edge_tolerance),
            ("classification_tolerance", self.classification_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BooleanError::InvalidConfig {
                    name,
                    reason: format!("must be finite and non-negative, got {value}"),
                });
            }
        }
        if self.bvh_leaf_size == 0 {
            return Err(BooleanError::InvalidConfig {
                name: "bvh_leaf_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Union: A ∪ B
    ///
    /// All of A outside B, plus all of B outside A.
    Union,

    /// Difference: A - B
    ///
    /// All of A outside B, plus all of B inside A (inverted).
    Difference,

    /// Intersection: A ∩ B
    ///
    /// All of A inside B, plus all of B inside A.
    Intersection,
}

impl BooleanOp {
    /// Whether faces of A inside B are kept.
    pub(crate) const fn keeps_a_inside(self) -> bool {
        matches!(self, Self::Intersection)
    }

    /// Whether faces of B inside A are kept.
    pub(crate) const fn keeps_b_inside(self) -> bool {
        !matches!(self, Self::Union)
    }

    /// Whether kept faces of B are reversed.
    pub(crate) const fn inverts_b(self) -> bool {
        matches!(self, Self::Difference)
    }
}

impl std::fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Union => write!(f, "union (A ∪ B)"),
            Self::Difference => write!(f, "difference (A - B)"),
            Self::Intersection => write!(f, "intersection (A ∩ B)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BooleanConfig::default();
        assert_eq!(config.cleanup, CleanupLevel::Fast);
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = BooleanConfig::default()
            .with_cleanup(CleanupLevel::Full)
            .with_parallel(false)
            .with_vertex_weld_tolerance(-1e-5)
            .with_bvh_leaf_size(0)
            .with_parallel_threshold(10);

        assert_eq!(config.cleanup, CleanupLevel::Full);
        assert!(!config.use_parallel(1000));
        assert!((config.vertex_weld_tolerance - 1e-5).abs() < 1e-12);
        assert_eq!(config.bvh_leaf_size, 1);
        assert!(config.with_parallel(true).use_parallel(11));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut config = BooleanConfig::default();
        config.edge_tolerance = f64::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("edge_tolerance"));
    }

    #[test]
    fn test_op_face_selection() {
        assert!(!BooleanOp::Union.keeps_a_inside());
        assert!(!BooleanOp::Union.keeps_b_inside());
        assert!(BooleanOp::Difference.keeps_b_inside());
        assert!(BooleanOp::Difference.inverts_b());
        assert!(BooleanOp::Intersection.keeps_a_inside());
        assert!(!BooleanOp::Intersection.inverts_b());
    }

    #[test]
    fn test_boolean_op_display() {
        assert_eq!(format!("{}", BooleanOp::Union), "union (A ∪ B)");
        assert_eq!(format!("{}", BooleanOp::Difference), "difference (A - B)");
        assert_eq!(format!("{}", BooleanOp::Intersection), "intersection (A ∩ B)");
    }
}
