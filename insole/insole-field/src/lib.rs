//! Height field synthesis for parametric insoles.
//!
//! [`HeightField`] maps a planar point inside the outline to a surface height
//! by blending:
//!
//! - **Walls**: medial and lateral x-profiles mixed across the width, plus
//!   the heel cup
//! - **Arches**: medial and lateral longitudinal bands bounded by their
//!   solid/flat curves, and the transverse polygon
//! - **Arch pad**: a minimum floor between the arch lobes
//!
//! The same function serves mesh generation and preview sampling
//! ([`HeightField::sample_grid`]).
//!
//! # Example
//!
//! ```
//! use insole_curves::ArchCurveSet;
//! use insole_field::{ArchSettings, HeightField, WallParams};
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
//! let field = HeightField::new(
//!     &outline,
//!     &Landmarks::default(),
//!     &ArchSettings::default().with_medial_height(1.5),
//!     &WallParams::default(),
//!     &ArchCurveSet::default(),
//! )
//! .unwrap();
//!
//! let sample = field.sample(100.0, 30.0);
//! assert!(sample.height >= 3.0);
//! assert!(sample.blend >= 0.0 && sample.blend <= 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions, clippy::suboptimal_flops)]

mod error;
mod field;
mod profile;
mod settings;
mod wall;

pub use error::{FieldError, FieldResult};
pub use field::{HeightField, HeightGrid, HeightSample};
pub use profile::{bell, cosine_falloff, smoothstep};
pub use settings::{Arch, ArchSettings, DetailHeights, YBands};
pub use wall::WallParams;
