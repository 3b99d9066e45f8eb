//! Hollow insole shells.
//!
//! A hollow shell is the outer solid minus an inner solid built on the
//! outline inset by the wall thickness, lowered by the top skin and raised by
//! the bottom skin. The cavity is kept at least `min_gap` tall where the
//! insole is thin.
//!
//! [`build_clip_volume`] builds the matching volume lattice infill is
//! intersected with.
//!
//! # Example
//!
//! ```
//! use insole_outline::{Outline, Point2};
//! use insole_shell::{generate_hollow_shell, ShellParams};
//!
//! let outline = Outline::new(vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(60.0, 0.0),
//!     Point2::new(60.0, 30.0),
//!     Point2::new(0.0, 30.0),
//! ])
//! .unwrap();
//! let params = ShellParams::default().with_wall_thickness(1.2);
//! let hollow = generate_hollow_shell(&outline, &6.0_f64, &0.0_f64, None, &params).unwrap();
//! assert!(hollow.stats.volume < 60.0 * 30.0 * 6.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions, clippy::suboptimal_flops)]

mod error;
mod params;
mod shell;

pub use error::{ShellError, ShellResult};
pub use params::ShellParams;
pub use shell::{HollowShell, ShellStats, build_clip_volume, generate_hollow_shell};
