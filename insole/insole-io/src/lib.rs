//! Export representations of generated insoles.
//!
//! - **STL**: the print-ready solid, binary (default) or ASCII, facet normals
//!   computed from the winding
//! - **PLY**: the visualization mesh, binary little-endian with per-vertex
//!   normals
//!
//! [`export_mesh`] writes a file and returns the [`ExportStats`] reported
//! alongside it.
//!
//! # Example
//!
//! ```no_run
//! use insole_io::{export_mesh, MeshFormat};
//! use insole_types::{cuboid, Point3};
//!
//! let mesh = cuboid(Point3::origin(), Point3::new(50.0, 30.0, 5.0));
//! let stats = export_mesh(&mesh, "insole.stl", MeshFormat::Stl).unwrap();
//! assert!(stats.is_watertight);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod error;
mod ply;
mod stl;

pub use error::{IoError, IoResult};
pub use ply::{load_ply, save_ply, write_ply};
pub use stl::{StlFormat, load_stl, read_stl, save_stl, write_stl};

use std::path::Path;

use insole_repair::MeshAdjacency;
use insole_types::IndexedMesh;
use tracing::info;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Binary STL.
    Stl,
    /// ASCII STL.
    StlAscii,
    /// Binary little-endian PLY.
    Ply,
}

impl MeshFormat {
    /// Detect format from file extension; `.stl` maps to binary STL.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "stl" => Some(Self::Stl),
            "ply" => Some(Self::Ply),
            _ => None,
        }
    }

    /// Canonical file extension.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Stl | Self::StlAscii => "stl",
            Self::Ply => "ply",
        }
    }
}

/// Statistics reported with an exported mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportStats {
    /// Vertices written.
    pub vertex_count: usize,
    /// Faces written.
    pub face_count: usize,
    /// Whether the mesh has no boundary edges.
    pub is_watertight: bool,
    /// Enclosed volume (mm³).
    pub volume: f64,
}

impl ExportStats {
    /// Compute the statistics of a mesh.
    #[must_use]
    pub fn of(mesh: &IndexedMesh) -> Self {
        let adjacency = MeshAdjacency::build(&mesh.faces);
        Self {
            vertex_count: mesh.vertices.len(),
            face_count: mesh.faces.len(),
            is_watertight: !mesh.faces.is_empty() && adjacency.is_watertight(),
            volume: mesh.volume(),
        }
    }
}

/// Write `mesh` to `path` in `format`.
///
/// # Errors
///
/// Returns the writer's [`IoError`].
pub fn export_mesh<P: AsRef<Path>>(
    mesh: &IndexedMesh,
    path: P,
    format: MeshFormat,
) -> IoResult<ExportStats> {
    let path = path.as_ref();
    match format {
        MeshFormat::Stl => save_stl(mesh, path, StlFormat::Binary)?,
        MeshFormat::StlAscii => save_stl(mesh, path, StlFormat::Ascii)?,
        MeshFormat::Ply => save_ply(mesh, path)?,
    }
    let stats = ExportStats::of(mesh);
    info!(
        path = %path.display(),
        format = format.extension(),
        vertices = stats.vertex_count,
        faces = stats.face_count,
        watertight = stats.is_watertight,
        "Exported mesh"
    );
    Ok(stats)
}

/// Write `mesh` to `path`, detecting the format from the extension.
///
/// # Errors
///
/// Returns [`IoError::UnknownFormat`] for an unrecognized extension and the
/// writer's errors otherwise.
pub fn save_mesh<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<ExportStats> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;
    export_mesh(mesh, path, format)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_types::{Point3, cuboid};

    #[test]
    fn test_format_from_path() {
        assert_eq!(MeshFormat::from_path("a/b/insole.STL"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path("preview.ply"), Some(MeshFormat::Ply));
        assert_eq!(MeshFormat::from_path("insole.obj"), None);
        assert_eq!(MeshFormat::StlAscii.extension(), "stl");
    }

    #[test]
    fn test_export_both_representations() {
        let mesh = cuboid(Point3::origin(), Point3::new(50.0, 30.0, 5.0));
        let dir = tempfile::tempdir().unwrap();

        let print = export_mesh(&mesh, dir.path().join("insole.stl"), MeshFormat::Stl).unwrap();
        let view = save_mesh(&mesh, dir.path().join("insole.ply")).unwrap();
        assert_eq!(print, view);
        assert!(print.is_watertight);
        assert_eq!(print.face_count, 12);
        assert_relative_eq!(print.volume, 7500.0, epsilon = 1e-9);

        let err = save_mesh(&mesh, dir.path().join("insole.obj")).unwrap_err();
        assert!(matches!(err, IoError::UnknownFormat { .. }));
    }
}
