//! PLY output, the lightweight visualization representation.
//!
//! Written as binary little-endian with per-vertex positions and normals:
//!
//! ```text
//! element vertex N   float x y z nx ny nz
//! element face M     list uchar int vertex_indices
//! ```
//!
//! Reading goes through `ply-rs` and accepts any encoding.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use insole_repair::compute_vertex_normals;
use insole_types::{IndexedMesh, Vector3, Vertex};
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{IoError, IoResult};
use crate::stl::check_faces;

/// Write a mesh as binary little-endian PLY to any writer.
///
/// Vertex normals are computed when any vertex lacks one.
///
/// # Errors
///
/// Returns [`IoError::InvalidIndex`] for a face referencing a missing vertex
/// and any write error.
pub fn write_ply<W: Write>(mesh: &IndexedMesh, mut writer: W) -> IoResult<()> {
    check_faces(mesh)?;
    let computed;
    let mesh = if mesh.vertices.iter().any(|v| v.normal.is_none()) {
        let mut copy = mesh.clone();
        compute_vertex_normals(&mut copy);
        computed = copy;
        &computed
    } else {
        mesh
    };

    writeln!(writer, "ply")?;
    writeln!(writer, "format binary_little_endian 1.0")?;
    writeln!(writer, "comment written by insole-io")?;
    writeln!(writer, "element vertex {}", mesh.vertices.len())?;
    for name in ["x", "y", "z", "nx", "ny", "nz"] {
        writeln!(writer, "property float {name}")?;
    }
    writeln!(writer, "element face {}", mesh.faces.len())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for v in &mesh.vertices {
        let n = v.normal.unwrap_or_else(Vector3::zeros);
        for value in [v.position.x, v.position.y, v.position.z, n.x, n.y, n.z] {
            #[allow(clippy::cast_possible_truncation)]
            // Truncation: PLY floats are f32
            let value = value as f32;
            writer.write_all(&value.to_le_bytes())?;
        }
    }
    for face in &mesh.faces {
        writer.write_all(&[3u8])?;
        for &index in face {
            #[allow(clippy::cast_possible_wrap)]
            // Wrap: indices above i32::MAX are unsupported by the int list type
            let index = index as i32;
            writer.write_all(&index.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Save a mesh to a binary PLY file.
///
/// # Errors
///
/// As [`write_ply`], plus file creation errors.
pub fn save_ply<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_ply(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Load a PLY file of any encoding.
///
/// Normals are read when present. Polygons are fan triangulated.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] for a missing file and
/// [`IoError::InvalidContent`] for malformed data or out-of-range indices.
pub fn load_ply<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let header = parser
        .read_header(&mut reader)
        .map_err(|e| IoError::invalid_content(format!("failed to parse PLY header: {e}")))?;
    let payload = parser
        .read_payload(&mut reader, &header)
        .map_err(|e| IoError::invalid_content(format!("failed to read PLY payload: {e}")))?;

    let mut mesh = IndexedMesh::new();
    if let Some(elements) = payload.get("vertex") {
        mesh.vertices.reserve(elements.len());
        for element in elements {
            let get = |key: &str| float_property(element, key);
            let vertex = Vertex::from_coords(
                get("x").unwrap_or(0.0),
                get("y").unwrap_or(0.0),
                get("z").unwrap_or(0.0),
            );
            let vertex = match (get("nx"), get("ny"), get("nz")) {
                (Some(x), Some(y), Some(z)) => vertex.with_normal(Vector3::new(x, y, z)),
                _ => vertex,
            };
            mesh.vertices.push(vertex);
        }
    }

    if let Some(elements) = payload.get("face") {
        mesh.faces.reserve(elements.len());
        for element in elements {
            let indices = index_list(element)?;
            for i in 1..indices.len().saturating_sub(1) {
                mesh.faces.push([indices[0], indices[i], indices[i + 1]]);
            }
        }
    }
    check_faces(&mesh).map_err(|e| IoError::invalid_content(e.to_string()))?;
    Ok(mesh)
}

fn float_property(element: &DefaultElement, key: &str) -> Option<f64> {
    match element.get(key)? {
        Property::Float(v) => Some(f64::from(*v)),
        Property::Double(v) => Some(*v),
        _ => None,
    }
}

fn index_list(element: &DefaultElement) -> IoResult<Vec<u32>> {
    let negative = || IoError::invalid_content("negative vertex index");
    for key in ["vertex_indices", "vertex_index"] {
        let Some(property) = element.get(key) else {
            continue;
        };
        return match property {
            Property::ListInt(v) => v
                .iter()
                .map(|&i| u32::try_from(i).map_err(|_| negative()))
                .collect(),
            Property::ListUInt(v) => Ok(v.clone()),
            Property::ListUChar(v) => Ok(v.iter().map(|&i| u32::from(i)).collect()),
            Property::ListUShort(v) => Ok(v.iter().map(|&i| u32::from(i)).collect()),
            _ => Err(IoError::invalid_content(format!(
                "unsupported index list type for '{key}'"
            ))),
        };
    }
    Err(IoError::invalid_content("face without vertex indices"))
}
