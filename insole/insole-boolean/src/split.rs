//! Splitting both operands along their intersection curves.
//!
//! Every crossing triangle pair contributes a cut segment. Cut endpoints are
//! snapped to the corners and edges of both triangles, so that end points on a
//! shared edge reach both faces using it. Each touched face is then
//! retriangulated with a constrained Delaunay triangulation in its own plane.

use hashbrown::{HashMap, HashSet};
use insole_types::{Aabb, IndexedMesh, Point3};
use rayon::prelude::*;
use smallvec::SmallVec;
use spade::handles::FixedVertexHandle;
use spade::{ConstrainedDelaunayTriangulation, Point2 as SpadePoint2, Triangulation};
use tracing::debug;

use crate::bvh::Bvh;
use crate::classify::sorted_edge;
use crate::config::BooleanConfig;
use crate::error::{BooleanError, BooleanResult};
use crate::intersect::{Contact, Feature, edge_parameter, locate, triangle_contact, unit_normal};

/// Both operands cut along their intersection, sharing one vertex list.
///
/// Indices `0..a_len` are vertices of A, the next `b_len` are vertices of B,
/// the rest are cut points.
#[derive(Debug)]
pub(crate) struct SplitMeshes {
    pub positions: Vec<Point3<f64>>,
    pub faces_a: Vec<[u32; 3]>,
    pub faces_b: Vec<[u32; 3]>,
    /// Edges that lie on the other surface.
    pub barriers: HashSet<(u32, u32)>,
    pub crossing_pairs: usize,
    pub faces_split: usize,
    pub new_vertices: usize,
}

/// Welds cut points within a tolerance using a spatial hash.
struct PointRegistry {
    cell: f64,
    tolerance: f64,
    base: u32,
    points: Vec<Point3<f64>>,
    grid: HashMap<[i64; 3], SmallVec<[u32; 2]>>,
}

impl PointRegistry {
    fn new(base: u32, tolerance: f64) -> Self {
        let tolerance = tolerance.max(1e-12);
        Self {
            cell: tolerance * 4.0,
            tolerance,
            base,
            points: Vec::new(),
            grid: HashMap::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn key(&self, p: &Point3<f64>) -> [i64; 3] {
        [
            (p.x / self.cell).floor() as i64,
            (p.y / self.cell).floor() as i64,
            (p.z / self.cell).floor() as i64,
        ]
    }

    #[allow(clippy::cast_possible_truncation)]
    fn insert(&mut self, p: Point3<f64>) -> u32 {
        let [kx, ky, kz] = self.key(&p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.grid.get(&[kx + dx, ky + dy, kz + dz]) else {
                        continue;
                    };
                    if let Some(&local) = bucket
                        .iter()
                        .find(|&&i| (self.points[i as usize] - p).norm() <= self.tolerance)
                    {
                        return self.base + local;
                    }
                }
            }
        }
        let local = self.points.len() as u32;
        self.points.push(p);
        self.grid.entry([kx, ky, kz]).or_default().push(local);
        self.base + local
    }
}

/// Cut data gathered for one side.
#[derive(Default)]
struct SideCuts {
    /// Face → interior points.
    interior: HashMap<usize, Vec<u32>>,
    /// Sorted edge (global ids) → points on it.
    edges: HashMap<(u32, u32), Vec<u32>>,
    /// Face → cut segments.
    segments: HashMap<usize, Vec<(u32, u32)>>,
}

impl SideCuts {
    fn record(&mut self, face: usize, corners: [u32; 3], feature: Feature, id: u32) {
        match feature {
            Feature::Vertex(_) => {}
            Feature::Edge(k) => {
                let points = self.edges.entry(sorted_edge(corners[k], corners[(k + 1) % 3])).or_default();
                if !points.contains(&id) {
                    points.push(id);
                }
            }
            Feature::Interior => {
                let points = self.interior.entry(face).or_default();
                if !points.contains(&id) {
                    points.push(id);
                }
            }
        }
    }
}

/// Cut both meshes along their intersection.
///
/// Returns `Ok(None)` when the surfaces do not cross.
///
/// # Errors
///
/// [`BooleanError::CoplanarOverlap`] when overlapping triangles share a plane,
/// [`BooleanError::SplitFailed`] when a face cannot be retriangulated.
#[allow(clippy::cast_possible_truncation, clippy::too_many_lines)]
pub(crate) fn split_meshes(
    a: &IndexedMesh,
    b: &IndexedMesh,
    bvh_b: &Bvh,
    config: &BooleanConfig,
) -> BooleanResult<Option<SplitMeshes>> {
    let a_len = a.vertices.len() as u32;
    let tri_of = |mesh: &IndexedMesh, face: [u32; 3]| face.map(|i| mesh.position(i));

    let contacts_for = |ai: usize| -> Vec<(usize, usize, Contact)> {
        let tri_a = tri_of(a, a.faces[ai]);
        let query = Aabb::from_points(tri_a.iter()).expanded(config.coplanar_tolerance);
        let mut candidates = bvh_b.query(&query);
        candidates.sort_unstable();
        candidates
            .into_iter()
            .filter_map(|bi| {
                let tri_b = tri_of(b, b.faces[bi as usize]);
                match triangle_contact(&tri_a, &tri_b, config.coplanar_tolerance, config.edge_tolerance) {
                    Contact::None => None,
                    contact => Some((ai, bi as usize, contact)),
                }
            })
            .collect()
    };
    let contacts: Vec<(usize, usize, Contact)> = if config.use_parallel(a.faces.len()) {
        (0..a.faces.len()).into_par_iter().flat_map_iter(contacts_for).collect()
    } else {
        (0..a.faces.len()).flat_map(contacts_for).collect()
    };

    let coplanar = contacts.iter().filter(|c| c.2 == Contact::Coplanar).count();
    if coplanar > 0 {
        return Err(BooleanError::CoplanarOverlap { pairs: coplanar });
    }
    if contacts.is_empty() {
        return Ok(None);
    }

    let mut registry = PointRegistry::new(a_len + b.vertices.len() as u32, config.vertex_weld_tolerance);
    let mut cuts_a = SideCuts::default();
    let mut cuts_b = SideCuts::default();
    let mut barriers = HashSet::new();

    for (ai, bi, contact) in &contacts {
        let Contact::Segment(p, q) = contact else {
            continue;
        };
        let corners_a = a.faces[*ai];
        let corners_b = b.faces[*bi].map(|i| i + a_len);
        let tri_a = tri_of(a, a.faces[*ai]);
        let tri_b = tri_of(b, b.faces[*bi]);

        let mut ids = [0_u32; 2];
        for (slot, point) in ids.iter_mut().zip([p, q]) {
            let fa = locate(point, &tri_a, config.vertex_weld_tolerance, config.edge_tolerance);
            let fb = locate(point, &tri_b, config.vertex_weld_tolerance, config.edge_tolerance);
            let id = match (fa, fb) {
                (Feature::Vertex(k), _) => corners_a[k],
                (_, Feature::Vertex(k)) => corners_b[k],
                _ => registry.insert(*point),
            };
            cuts_a.record(*ai, corners_a, fa, id);
            cuts_b.record(*bi, corners_b, fb, id);
            *slot = id;
        }
        if ids[0] != ids[1] {
            cuts_a.segments.entry(*ai).or_default().push((ids[0], ids[1]));
            cuts_b.segments.entry(*bi).or_default().push((ids[0], ids[1]));
            barriers.insert(sorted_edge(ids[0], ids[1]));
        }
    }

    let mut positions: Vec<Point3<f64>> = Vec::with_capacity(
        a.vertices.len() + b.vertices.len() + registry.points.len(),
    );
    positions.extend(a.vertices.iter().map(|v| v.position));
    positions.extend(b.vertices.iter().map(|v| v.position));
    positions.extend(registry.points.iter().copied());

    let (faces_a, split_a, barriers_a) = split_side(&a.faces, 0, &cuts_a, &positions, config)?;
    let (faces_b, split_b, barriers_b) = split_side(&b.faces, a_len, &cuts_b, &positions, config)?;
    barriers.extend(barriers_a);
    barriers.extend(barriers_b);

    debug!(
        crossing_pairs = contacts.len(),
        faces_split = split_a + split_b,
        new_vertices = registry.points.len(),
        "Split meshes along intersection"
    );

    Ok(Some(SplitMeshes {
        positions,
        faces_a,
        faces_b,
        barriers,
        crossing_pairs: contacts.len(),
        faces_split: split_a + split_b,
        new_vertices: registry.points.len(),
    }))
}

/// Retriangulate every face of one side that carries cut data.
///
/// Returns the new faces in input order, the number of faces split and the
/// cut edges introduced by the triangulations.
fn split_side(
    faces: &[[u32; 3]],
    offset: u32,
    cuts: &SideCuts,
    positions: &[Point3<f64>],
    config: &BooleanConfig,
) -> BooleanResult<(Vec<[u32; 3]>, usize, Vec<(u32, u32)>)> {
    let no_segments: Vec<(u32, u32)> = Vec::new();
    let no_points: Vec<u32> = Vec::new();

    let job = |fi: usize| -> BooleanResult<Option<(Vec<[u32; 3]>, Vec<(u32, u32)>)>> {
        let corners = faces[fi].map(|i| i + offset);
        let edge_points: [&[u32]; 3] = std::array::from_fn(|k| {
            cuts.edges
                .get(&sorted_edge(corners[k], corners[(k + 1) % 3]))
                .map_or(&[][..], Vec::as_slice)
        });
        let interior = cuts.interior.get(&fi).unwrap_or(&no_points);
        let segments = cuts.segments.get(&fi).unwrap_or(&no_segments);
        if interior.is_empty() && segments.is_empty() && edge_points.iter().all(|e| e.is_empty()) {
            return Ok(None);
        }
        let piece = FacePiece {
            corners,
            edge_points,
            interior,
            segments,
        };
        piece.triangulate(positions).map(Some).map_err(|details| BooleanError::SplitFailed {
            face: fi,
            details,
        })
    };

    let results: Vec<BooleanResult<Option<(Vec<[u32; 3]>, Vec<(u32, u32)>)>>> =
        if config.use_parallel(faces.len()) {
            (0..faces.len()).into_par_iter().map(job).collect()
        } else {
            (0..faces.len()).map(job).collect()
        };

    let mut out = Vec::with_capacity(faces.len());
    let mut split = 0;
    let mut barriers = Vec::new();
    for (fi, result) in results.into_iter().enumerate() {
        match result? {
            None => out.push(faces[fi].map(|i| i + offset)),
            Some((pieces, cut_edges)) => {
                split += 1;
                out.extend(pieces);
                barriers.extend(cut_edges);
            }
        }
    }
    Ok((out, split, barriers))
}

/// One face with the cut data to embed in it.
struct FacePiece<'a> {
    corners: [u32; 3],
    edge_points: [&'a [u32]; 3],
    interior: &'a [u32],
    segments: &'a [(u32, u32)],
}

impl FacePiece<'_> {
    /// Constrained triangulation of the face in its dominant projection plane.
    fn triangulate(&self, positions: &[Point3<f64>]) -> Result<(Vec<[u32; 3]>, Vec<(u32, u32)>), String> {
        let tri = self.corners.map(|i| positions[i as usize]);
        let normal = unit_normal(&tri).ok_or_else(|| "zero-area face".to_string())?;
        let axis = (0..3)
            .max_by(|&i, &j| normal[i].abs().total_cmp(&normal[j].abs()))
            .unwrap_or(2);
        let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
        let flip = normal[axis] < 0.0;
        let project = |p: &Point3<f64>| SpadePoint2::new(p[u], p[v]);

        let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
        let mut by_id: HashMap<u32, FixedVertexHandle> = HashMap::new();
        let mut by_handle: HashMap<FixedVertexHandle, u32> = HashMap::new();
        // Bit k set when the vertex lies on edge k.
        let mut boundary_mask: HashMap<u32, u8> = HashMap::new();

        let mut insert = |cdt: &mut ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
                          id: u32|
         -> Result<FixedVertexHandle, String> {
            if let Some(&h) = by_id.get(&id) {
                return Ok(h);
            }
            let h = cdt
                .insert(project(&positions[id as usize]))
                .map_err(|e| format!("CDT insert: {e:?}"))?;
            by_handle.entry(h).or_insert(id);
            by_id.insert(id, h);
            Ok(h)
        };

        for (k, &corner) in self.corners.iter().enumerate() {
            insert(&mut cdt, corner)?;
            *boundary_mask.entry(corner).or_default() |= (1 << k) | (1 << ((k + 2) % 3));
        }

        for k in 0..3 {
            let (start, end) = (self.corners[k], self.corners[(k + 1) % 3]);
            let (pa, pb) = (positions[start as usize], positions[end as usize]);
            let mut chain: Vec<(f64, u32)> = self.edge_points[k]
                .iter()
                .filter(|&&id| id != start && id != end)
                .map(|&id| (edge_parameter(&positions[id as usize], &pa, &pb), id))
                .collect();
            chain.sort_by(|x, y| x.0.total_cmp(&y.0));

            let mut previous = insert(&mut cdt, start)?;
            for id in chain.iter().map(|c| c.1).chain(std::iter::once(end)) {
                *boundary_mask.entry(id).or_default() |= 1 << k;
                let handle = insert(&mut cdt, id)?;
                if handle != previous {
                    if !cdt.can_add_constraint(previous, handle) {
                        return Err("boundary constraint crosses a cut".to_string());
                    }
                    cdt.add_constraint(previous, handle);
                }
                previous = handle;
            }
        }

        for &id in self.interior {
            insert(&mut cdt, id)?;
        }

        for &(p, q) in self.segments {
            let hp = insert(&mut cdt, p)?;
            let hq = insert(&mut cdt, q)?;
            if hp == hq {
                continue;
            }
            if !cdt.can_add_constraint(hp, hq) {
                return Err("intersecting cut segments".to_string());
            }
            cdt.add_constraint(hp, hq);
        }

        let [p0, p1, p2] = tri.map(|p| project(&p));
        let face_area = ((p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y)).abs();
        let min_area = face_area * 1e-10;

        let id_of = |h: FixedVertexHandle| by_handle.get(&h).copied();
        let mut out = Vec::new();
        for face in cdt.inner_faces() {
            let [a, b, c] = face.vertices();
            let (pa, pb, pc) = (a.position(), b.position(), c.position());
            let area = (pb.x - pa.x) * (pc.y - pa.y) - (pc.x - pa.x) * (pb.y - pa.y);
            if area.abs() <= min_area {
                continue;
            }
            let (Some(ia), Some(ib), Some(ic)) = (id_of(a.fix()), id_of(b.fix()), id_of(c.fix())) else {
                return Err("triangulation vertex without an id".to_string());
            };
            out.push(if flip { [ia, ic, ib] } else { [ia, ib, ic] });
        }

        let mut cut_edges = Vec::new();
        for edge in cdt.undirected_edges() {
            if !cdt.is_constraint_edge(edge.fix()) {
                continue;
            }
            let [a, b] = edge.vertices();
            let (Some(ia), Some(ib)) = (id_of(a.fix()), id_of(b.fix())) else {
                continue;
            };
            let mask = |id: u32| boundary_mask.get(&id).copied().unwrap_or(0);
            if mask(ia) & mask(ib) == 0 {
                cut_edges.push(sorted_edge(ia, ib));
            }
        }
        Ok((out, cut_edges))
    }
}
