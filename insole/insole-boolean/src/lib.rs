//! Boolean operations on closed triangle meshes.
//!
//! This crate provides:
//! - [`SplittingEngine`]: cuts both surfaces along their intersection curves
//!   (constrained Delaunay retriangulation of every crossing face) and
//!   classifies the resulting regions by ray casting
//! - [`ClassificationEngine`]: keeps or drops whole connected components,
//!   exact for nested and disjoint operands and an error when the surfaces
//!   touch
//! - [`EngineChain`]: tries engines in priority order and rejects open
//!   results from closed inputs
//!
//! # Example
//!
//! ```
//! use insole_boolean::{boolean_operation, BooleanConfig, BooleanOp};
//! use insole_types::{cuboid, Point3};
//!
//! let a = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
//! let b = cuboid(Point3::new(0.5, 0.3, 0.3), Point3::new(1.5, 0.7, 0.7));
//!
//! let outcome = boolean_operation(&a, &b, BooleanOp::Difference, &BooleanConfig::default())
//!     .unwrap();
//! println!("{} faces via {}", outcome.mesh.faces.len(), outcome.engine);
//! assert!((outcome.mesh.volume() - 0.92).abs() < 1e-6);
//! ```
//!
//! # Limitations
//!
//! Overlapping coplanar triangles are reported as
//! [`BooleanError::CoplanarOverlap`] rather than resolved.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(
    clippy::module_name_repetitions,
    clippy::suboptimal_flops,
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::cast_precision_loss
)]

mod bvh;
mod classify;
mod config;
mod engine;
mod error;
mod intersect;
mod split;

pub use bvh::Bvh;
pub use classify::{FaceLocation, point_in_mesh};
pub use config::{BooleanConfig, BooleanOp, CleanupLevel};
pub use engine::{
    BooleanEngine, BooleanOperationResult, BooleanOutcome, BooleanStats, ClassificationEngine,
    EngineChain, Operand, SplittingEngine, boolean_operation, difference, intersection, union,
};
pub use error::{BooleanError, BooleanResult};
pub use intersect::ray_triangle_intersect;
