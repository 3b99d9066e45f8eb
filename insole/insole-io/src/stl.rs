//! STL (Stereolithography) output, the print-ready representation.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Facet normal
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (0)
//! end
//! ```
//!
//! Facet normals are computed from the winding; the stored vertex normals
//! are not used.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use insole_types::{IndexedMesh, Point3, Vector3, Vertex};

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

const HEADER_TEXT: &[u8] = b"binary STL written by insole-io";

/// STL encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlFormat {
    /// Little-endian binary.
    #[default]
    Binary,
    /// Text.
    Ascii,
}

/// Check every face index before anything is written.
pub(crate) fn check_faces(mesh: &IndexedMesh) -> IoResult<()> {
    let vertex_count = mesh.vertices.len();
    for (face, indices) in mesh.faces.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(IoError::InvalidIndex {
                face,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

/// Unit facet normal, zero for degenerate faces.
fn facet_normal(v0: &Point3<f64>, v1: &Point3<f64>, v2: &Point3<f64>) -> Vector3<f64> {
    let normal = (v1 - v0).cross(&(v2 - v0));
    let len = normal.norm();
    if len > f64::EPSILON {
        normal / len
    } else {
        Vector3::zeros()
    }
}

/// Write a mesh as STL to any writer.
///
/// # Errors
///
/// Returns [`IoError::InvalidIndex`] for a face referencing a missing vertex,
/// [`IoError::TooManyFaces`] when a binary face count overflows `u32`, and
/// any write error.
pub fn write_stl<W: Write>(mesh: &IndexedMesh, writer: W, format: StlFormat) -> IoResult<()> {
    check_faces(mesh)?;
    match format {
        StlFormat::Binary => write_stl_binary(mesh, writer),
        StlFormat::Ascii => write_stl_ascii(mesh, writer),
    }
}

/// Save a mesh to an STL file.
///
/// # Errors
///
/// As [`write_stl`], plus file creation errors.
///
/// # Example
///
/// ```no_run
/// use insole_io::{save_stl, StlFormat};
/// use insole_types::{cuboid, Point3};
///
/// let mesh = cuboid(Point3::origin(), Point3::new(10.0, 10.0, 3.0));
/// save_stl(&mesh, "insole.stl", StlFormat::Binary).unwrap();
/// ```
pub fn save_stl<P: AsRef<Path>>(mesh: &IndexedMesh, path: P, format: StlFormat) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_stl(mesh, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

fn write_stl_binary<W: Write>(mesh: &IndexedMesh, mut writer: W) -> IoResult<()> {
    let face_count = u32::try_from(mesh.faces.len()).map_err(|_| IoError::TooManyFaces {
        faces: mesh.faces.len(),
    })?;

    let mut header = [b' '; HEADER_SIZE];
    header[..HEADER_TEXT.len()].copy_from_slice(HEADER_TEXT);
    writer.write_all(&header)?;
    writer.write_all(&face_count.to_le_bytes())?;

    let mut record = [0u8; TRIANGLE_SIZE];
    for &[i0, i1, i2] in &mesh.faces {
        let v0 = mesh.position(i0);
        let v1 = mesh.position(i1);
        let v2 = mesh.position(i2);
        let normal = facet_normal(&v0, &v1, &v2);

        let values = [
            normal.x, normal.y, normal.z, v0.x, v0.y, v0.z, v1.x, v1.y, v1.z, v2.x, v2.y, v2.z,
        ];
        for (slot, value) in record.chunks_exact_mut(4).zip(values) {
            #[allow(clippy::cast_possible_truncation)]
            // Truncation: STL stores f32
            let value = value as f32;
            slot.copy_from_slice(&value.to_le_bytes());
        }
        record[48..].copy_from_slice(&0u16.to_le_bytes());
        writer.write_all(&record)?;
    }
    Ok(())
}

fn write_stl_ascii<W: Write>(mesh: &IndexedMesh, mut writer: W) -> IoResult<()> {
    writeln!(writer, "solid insole")?;
    for &[i0, i1, i2] in &mesh.faces {
        let v0 = mesh.position(i0);
        let v1 = mesh.position(i1);
        let v2 = mesh.position(i2);
        let n = facet_normal(&v0, &v1, &v2);

        writeln!(writer, "  facet normal {:.6e} {:.6e} {:.6e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for v in [v0, v1, v2] {
            writeln!(writer, "      vertex {:.6e} {:.6e} {:.6e}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid insole")?;
    Ok(())
}

/// Load an STL file, detecting ASCII or binary.
///
/// Vertices are not shared between facets; weld them to recover topology.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] for a missing file and
/// [`IoError::InvalidContent`] for truncated or malformed data.
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
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
    let mut bytes = Vec::new();
    BufReader::new(file).read_to_end(&mut bytes)?;
    read_stl(&bytes)
}

/// Parse STL data held in memory.
///
/// # Errors
///
/// As [`load_stl`].
pub fn read_stl(bytes: &[u8]) -> IoResult<IndexedMesh> {
    if bytes.len() < 6 {
        return Err(IoError::invalid_content("file too small to be valid STL"));
    }
    let head = &bytes[..bytes.len().min(HEADER_SIZE)];
    let looks_ascii = String::from_utf8_lossy(head).trim_start().starts_with("solid")
        && !head.contains(&0);
    if looks_ascii && !binary_size_matches(bytes) {
        read_stl_ascii(bytes)
    } else {
        read_stl_binary(bytes)
    }
}

/// Whether the byte count is exactly what the binary face count implies.
fn binary_size_matches(bytes: &[u8]) -> bool {
    face_count(bytes).is_some_and(|n| bytes.len() == HEADER_SIZE + 4 + n * TRIANGLE_SIZE)
}

fn face_count(bytes: &[u8]) -> Option<usize> {
    let count: [u8; 4] = bytes.get(HEADER_SIZE..HEADER_SIZE + 4)?.try_into().ok()?;
    usize::try_from(u32::from_le_bytes(count)).ok()
}

fn read_stl_binary(bytes: &[u8]) -> IoResult<IndexedMesh> {
    let count = face_count(bytes)
        .ok_or_else(|| IoError::invalid_content("binary STL header is truncated"))?;
    let body = &bytes[HEADER_SIZE + 4..];
    if body.len() < count * TRIANGLE_SIZE {
        return Err(IoError::invalid_content(format!(
            "binary STL declares {count} triangles but holds {}",
            body.len() / TRIANGLE_SIZE
        )));
    }

    let mut mesh = IndexedMesh::with_capacity(count * 3, count);
    for record in body.chunks_exact(TRIANGLE_SIZE).take(count) {
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: mesh indices are u32
        let base = mesh.vertices.len() as u32;
        for offset in [12, 24, 36] {
            mesh.vertices.push(read_vertex(&record[offset..offset + 12]));
        }
        mesh.faces.push([base, base + 1, base + 2]);
    }
    Ok(mesh)
}

fn read_vertex(buf: &[u8]) -> Vertex {
    let f = |i: usize| f64::from(f32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]));
    Vertex::from_coords(f(0), f(4), f(8))
}

fn read_stl_ascii(bytes: &[u8]) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::new();
    let mut corners: Vec<Vertex> = Vec::with_capacity(3);

    for line in BufReader::new(bytes).lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("outer") => corners.clear(),
            Some("vertex") => {
                let mut coord = || -> IoResult<f64> {
                    Ok(parts
                        .next()
                        .ok_or_else(|| IoError::invalid_content("vertex with missing coordinate"))?
                        .parse()?)
                };
                let (x, y, z) = (coord()?, coord()?, coord()?);
                corners.push(Vertex::from_coords(x, y, z));
            }
            Some("endfacet") => {
                if corners.len() != 3 {
                    return Err(IoError::invalid_content(format!(
                        "facet with {} vertices",
                        corners.len()
                    )));
                }
                #[allow(clippy::cast_possible_truncation)]
                // Truncation: mesh indices are u32
                let base = mesh.vertices.len() as u32;
                mesh.vertices.append(&mut corners);
                mesh.faces.push([base, base + 1, base + 2]);
            }
            Some("endsolid") => break,
            _ => {}
        }
    }
    Ok(mesh)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_types::cuboid;

    fn slab() -> IndexedMesh {
        cuboid(Point3::origin(), Point3::new(50.0, 30.0, 5.0))
    }

    #[test]
    fn test_binary_layout() {
        let mesh = slab();
        let mut bytes = Vec::new();
        write_stl(&mesh, &mut bytes, StlFormat::Binary).unwrap();

        assert_eq!(bytes.len(), HEADER_SIZE + 4 + 12 * TRIANGLE_SIZE);
        assert!(bytes.starts_with(HEADER_TEXT));
        assert_eq!(face_count(&bytes), Some(12));

        // Every stored normal is a unit vector.
        for record in bytes[HEADER_SIZE + 4..].chunks_exact(TRIANGLE_SIZE) {
            let n = read_vertex(&record[..12]).position;
            assert_relative_eq!(n.coords.norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_binary_round_trip_keeps_volume() {
        let mesh = slab();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slab.stl");
        save_stl(&mesh, &path, StlFormat::Binary).unwrap();

        let loaded = load_stl(&path).unwrap();
        assert_eq!(loaded.faces.len(), 12);
        assert_eq!(loaded.vertices.len(), 36);
        assert_relative_eq!(loaded.signed_volume(), 7500.0, epsilon = 1e-3);
    }

    #[test]
    fn test_ascii_round_trip() {
        let mesh = slab();
        let mut bytes = Vec::new();
        write_stl(&mesh, &mut bytes, StlFormat::Ascii).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("solid insole"));
        assert_eq!(text.matches("facet normal").count(), 12);

        let loaded = read_stl(&bytes).unwrap();
        assert_eq!(loaded.faces.len(), 12);
        assert_relative_eq!(loaded.signed_volume(), 7500.0, epsilon = 1e-3);
    }

    #[test]
    fn test_bad_index_is_rejected() {
        let mut mesh = slab();
        mesh.faces.push([0, 1, 99]);
        let err = write_stl(&mesh, Vec::new(), StlFormat::Binary).unwrap_err();
        assert!(matches!(err, IoError::InvalidIndex { face: 12, index: 99, .. }));
    }

    #[test]
    fn test_truncated_binary_is_rejected() {
        let mut bytes = Vec::new();
        write_stl(&slab(), &mut bytes, StlFormat::Binary).unwrap();
        bytes.truncate(bytes.len() - 10);
        assert!(matches!(read_stl(&bytes), Err(IoError::InvalidContent { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = load_stl("no_such_insole_12345.stl");
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }
}
