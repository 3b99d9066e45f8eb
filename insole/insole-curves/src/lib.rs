//! Arch curve model for the insole height field.
//!
//! Each longitudinal arch is described by a pair of open curves: a *solid*
//! curve that bounds the full-height region and a *flat* curve between it and
//! the outline edge. The transverse arch is a closed polygon. Three *bridge*
//! curves join the arch endpoints and, with the outline edges, enclose the
//! arch pad where a minimum height floor applies.
//!
//! - [`ArchCurveSet`] - optional user-edited control points, keyed by
//!   [`CurveKey`]
//! - [`ArchCurveSet::resolve`] - fills in defaults and recomputes every
//!   derived curve from its source
//! - [`ResolvedCurves`] - densified curves ready for evaluation
//! - [`spline`] - Catmull-Rom densification and the clamped profile spline
//!
//! # Example
//!
//! ```
//! use insole_curves::{ArchCurveSet, ArchSpans};
//! use insole_outline::{Landmarks, Outline, Point2};
//!
//! let outline = Outline::new(vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(240.0, 0.0),
//!     Point2::new(240.0, 90.0),
//!     Point2::new(0.0, 90.0),
//! ])
//! .unwrap();
//!
//! let resolved = ArchCurveSet::default()
//!     .resolve(&outline, &Landmarks::default(), &ArchSpans::default())
//!     .unwrap();
//!
//! assert!(resolved.medial.is_some());
//! assert!(resolved.arch_pad.is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions, clippy::suboptimal_flops)]

mod curve;
mod defaults;
mod error;
mod frame;
mod resolve;
pub mod spline;

pub use curve::{ArchCurveSet, CurveKey, CurvePoint, DenseCurve};
pub use error::{CurveError, CurveResult};
pub use frame::{ArchSide, ArchSpan, ArchSpans, CurveFrame};
pub use resolve::{BandCurves, ResolvedCurves};
pub use spline::ProfileSpline;
