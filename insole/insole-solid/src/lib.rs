//! Closed insole solids from an outline and height maps.
//!
//! - [`triangulate_outline`]: constrained Delaunay triangulation of the
//!   outline ring plus the regular grid points inside it
//! - [`build_base_mesh`]: the base insole, flat bottom at `z = 0` and the
//!   height field on top, with heel rim smoothing and interior relaxation
//! - [`build_solid_from_height_maps`]: a solid between any two
//!   [`HeightMap`]s, used for the shell's inner volume
//!
//! Every solid is checked closed and oriented with positive volume before it
//! is returned.
//!
//! # Example
//!
//! ```
//! use insole_field::{ArchSettings, HeightField, WallParams};
//! use insole_outline::{Landmarks, Outline, Point2};
//! use insole_solid::{build_base_mesh, BaseMeshParams};
//!
//! let outline = Outline::new(vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(240.0, 0.0),
//!     Point2::new(240.0, 90.0),
//!     Point2::new(0.0, 90.0),
//! ])
//! .unwrap();
//! let field = HeightField::without_curves(
//!     &outline,
//!     &Landmarks::default(),
//!     &ArchSettings::default(),
//!     &WallParams::default(),
//! )
//! .unwrap();
//!
//! let params = BaseMeshParams::default().with_grid_spacing(3.0);
//! let solid = build_base_mesh(&field, &params).unwrap();
//! assert!(solid.signed_volume() > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions, clippy::suboptimal_flops)]

mod builder;
mod error;
mod height;
mod params;

pub use builder::{PlanarMesh, build_base_mesh, build_solid_from_height_maps, triangulate_outline};
pub use error::{SolidError, SolidResult};
pub use height::{HeightMap, Offset};
pub use params::BaseMeshParams;
