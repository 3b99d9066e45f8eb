//! Mesh cleanup and validation for the insole pipeline.
//!
//! This crate provides:
//! - Cleanup: vertex welding, degenerate and duplicate face removal,
//!   unreferenced vertex compaction, vertex normals ([`repair_mesh`])
//! - Orientation: consistent winding and outward orientation
//! - Validation: watertight, manifold and winding checks with counts
//!   ([`validate_mesh`])
//!
//! # Example
//!
//! ```
//! use insole_types::{cuboid, IndexedMesh, Point3};
//! use insole_repair::{repair_mesh, validate_mesh, RepairParams};
//!
//! let a = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
//! let mut merged = IndexedMesh::concat([&a, &a]);
//! assert_eq!(validate_mesh(&merged).duplicate_face_count, 0);
//!
//! let summary = repair_mesh(&mut merged, &RepairParams::default()).unwrap();
//! println!("{summary}");
//!
//! let report = validate_mesh(&merged);
//! assert!(report.is_watertight);
//! assert_eq!(report.duplicate_face_count, 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions, clippy::suboptimal_flops)]

mod adjacency;
mod error;
mod normals;
mod repair;
mod validate;
mod winding;

pub use adjacency::MeshAdjacency;
pub use error::{RepairError, RepairResult};
pub use normals::compute_vertex_normals;
pub use repair::{
    RepairParams, RepairSummary, check_indices, count_duplicate_faces, remove_degenerate_triangles,
    remove_duplicate_faces, remove_unreferenced_vertices, repair_mesh, weld_vertices,
};
pub use validate::{MeshReport, ValidationOptions, validate_mesh, validate_mesh_with_options};
pub use winding::{fix_winding_order, orient_outward};
