//! Orthotic insole geometry kernel.
//!
//! Turns a foot outline, anatomical landmarks and arch/wall parameters into a
//! printable, watertight insole mesh: either a solid, or a hollow shell filled
//! with a strut lattice.
//!
//! # Quick Start
//!
//! ```no_run
//! use insole::{GenerationRequest, generate};
//!
//! let request = GenerationRequest::from_json_file("request.json").unwrap();
//! let generation = generate(&request).unwrap();
//! println!(
//!     "{} faces, watertight: {}",
//!     generation.report.face_count, generation.report.is_watertight
//! );
//! generation.export("out", "insole").unwrap();
//! ```
//!
//! # Pipeline
//!
//! 1. [`GenerationRequest::outline`]: validate and normalize the outline
//! 2. [`field::HeightField`]: walls, heel cup, arches and arch pad blended
//!    into one height function
//! 3. [`solid::build_base_mesh`]: the closed solid under the height field
//! 4. [`shell::generate_hollow_shell`]: solid minus its inset (lattice only)
//! 5. [`lattice::generate_lattice`]: unit cells clipped to the cavity
//! 6. [`finalize_mesh`]: merge, cleanup, watertightness check
//! 7. [`orient_to_side`]: mirror for the right foot
//!
//! Failures carry the [`Stage`] they happened in and an [`ErrorKind`].
//!
//! # Module Organization
//!
//! - [`types`] - mesh data types
//! - [`outline`] - outline polygon, landmarks, foot side
//! - [`curves`] - arch curve model
//! - [`field`] - height field synthesis
//! - [`solid`] - base mesh builder
//! - [`boolean`] - boolean engines and fallback chain
//! - [`repair`] - cleanup passes and validation
//! - [`shell`] - hollow shell constructor
//! - [`lattice`] - strut lattice generator
//! - [`io`] - STL and PLY export

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod error;
mod finalize;
mod pipeline;
mod request;

pub use error::{ErrorKind, GenerationError, GenerationResult, Stage};
pub use finalize::{Finalized, finalize_mesh, orient_to_side};
pub use pipeline::{
    ExportedFiles, Generation, GenerationReport, StageTiming, generate, preview,
};
pub use request::{GenerationRequest, OutlinePoint};

// =============================================================================
// Re-exports
// =============================================================================

/// Mesh data types: `IndexedMesh`, `Vertex`, `Aabb`.
pub use insole_types as types;

/// Outline polygon, landmarks and foot side.
pub use insole_outline as outline;

/// Arch curve model.
pub use insole_curves as curves;

/// Height field synthesis.
pub use insole_field as field;

/// Base mesh builder.
pub use insole_solid as solid;

/// Boolean engines.
pub use insole_boolean as boolean;

/// Cleanup and validation.
pub use insole_repair as repair;

/// Hollow shell constructor.
pub use insole_shell as shell;

/// Strut lattice generator.
pub use insole_lattice as lattice;

/// Mesh export.
pub use insole_io as io;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for insole generation.
///
/// ```
/// use insole::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ErrorKind, Generation, GenerationError, GenerationRequest, Stage, generate, preview,
    };
    pub use insole_field::{ArchSettings, HeightField, WallParams};
    pub use insole_outline::{FootSide, Landmarks, Outline};
    pub use insole_repair::{MeshReport, validate_mesh};
    pub use insole_types::{IndexedMesh, MeshBounds};
}
