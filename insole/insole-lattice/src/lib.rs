//! Lattice infill for hollow insoles.
//!
//! A unit cell is a joint sphere at the cell center plus eight cylindrical
//! struts running from the cube corners to the sphere surface. The sphere
//! radius equals the strut radius and each strut stops at the sphere, so only
//! the joint overlaps at the center.
//!
//! Cells are tiled over the clip volume's bounding box. Each primitive is
//! intersected with the clip volume, then every cell and finally the merged
//! lattice go through the cleanup pass (weld, degenerate and duplicate face
//! removal, normals).
//!
//! # Example
//!
//! ```
//! use insole_lattice::{UnitCell, strut_length};
//! use insole_types::Point3;
//!
//! let cell = UnitCell::new(Point3::new(2.0, 2.0, 2.0), 4.0, 0.2, false);
//! assert_eq!(cell.primitives.len(), 9);
//! assert_eq!(cell.strut_length, strut_length(4.0, 0.2));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions, clippy::suboptimal_flops)]

mod cell;
mod error;
mod generate;
mod params;

pub use cell::{CellDetail, MIN_STRUT_LENGTH, UnitCell, icosphere, strut, strut_length};
pub use error::{LatticeError, LatticeResult};
pub use generate::{Lattice, LatticeStats, generate_lattice};
pub use params::LatticeParams;
