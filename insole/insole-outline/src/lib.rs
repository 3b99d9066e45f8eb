//! Foot outline, anatomical landmarks and planar polygon utilities.
//!
//! The outline is the single 2D boundary every later stage works inside:
//!
//! - [`Outline`] - validated closed polygon with y-bounds, heel resampling and
//!   inward offset
//! - [`Landmarks`] - named axis percentages plus the two width rays
//! - [`FootSide`] - left/right, which decides post-generation mirroring
//! - [`polygon`] - batched inside tests and distance queries on point rings
//!
//! # Coordinates
//!
//! X runs from the heel (0 %) to the toe (100 %). The medial edge is the
//! low-y side; width percentages count from the lateral edge (0) to the
//! medial edge (100).
//!
//! # Example
//!
//! ```
//! use insole_outline::{Landmarks, Outline, Point2};
//!
//! let outline = Outline::new(vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(250.0, 10.0),
//!     Point2::new(250.0, 80.0),
//!     Point2::new(0.0, 70.0),
//! ])
//! .unwrap();
//!
//! let inner = outline.inset(0.8).unwrap();
//! assert!(inner.signed_area() < outline.signed_area());
//! assert!(Landmarks::default().check_order().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions, clippy::suboptimal_flops)]

mod error;
mod landmarks;
mod offset;
mod outline;
pub mod polygon;

pub use error::{OutlineError, OutlineResult};
pub use landmarks::{Landmarks, OrderViolation, WidthRays};
pub use offset::Inset;
pub use outline::{FootSide, Outline, YBounds, interp_extrapolate};

pub use nalgebra::{Point2, Vector2};
