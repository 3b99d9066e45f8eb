//! Outline triangulation and extrusion into a closed solid.
//!
//! The outline ring and the grid points inside it are triangulated with a
//! constrained Delaunay triangulation whose constraints are the outline
//! edges, so the top surface boundary is exactly the outline. The bottom
//! mirrors the top topology and the side wall stitches the two rims.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};
use insole_field::HeightField;
use insole_outline::{Outline, Point2};
use insole_repair::MeshAdjacency;
use insole_types::{IndexedMesh, Point3};
use rayon::prelude::*;
use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, Point2 as SpadePoint2, Triangulation};
use tracing::{debug, info};

use crate::height::HeightMap;
use crate::params::BaseMeshParams;
use crate::{SolidError, SolidResult};

/// Grid points closer than this fraction of the spacing to an outline edge
/// are dropped.
const BOUNDARY_CLEARANCE: f64 = 0.3;
/// Heel resampling covers the first this many percent of the length.
const HEEL_END_PCT: f64 = 30.0;
/// Percent over which heel resampling blends back to the native spacing.
const HEEL_BLEND_PCT: f64 = 5.0;
/// Rim smoothing runs at full strength up to this axis percent.
const RIM_SMOOTH_END_PCT: f64 = 25.0;
/// Rim smoothing has faded out by this axis percent.
const RIM_SMOOTH_FADE_PCT: f64 = 35.0;
/// Length of outline the rim smoothing window covers (mm).
const RIM_SMOOTH_SPAN: f64 = 10.0;
/// Smallest rim smoothing window (points).
const MIN_RIM_WINDOW: usize = 7;
/// Enclosed volume (mm^3) below which a solid counts as flat.
const MIN_VOLUME: f64 = 1e-9;

/// Triangulated outline interior.
///
/// `points` holds the counter-clockwise outline ring first, then the
/// interior grid points. Faces are counter-clockwise.
#[derive(Debug, Clone)]
pub struct PlanarMesh {
    /// Boundary ring followed by interior points.
    pub points: Vec<Point2<f64>>,
    /// Number of leading boundary points.
    pub boundary_count: usize,
    /// Triangles over `points`.
    pub faces: Vec<[u32; 3]>,
}

impl PlanarMesh {
    /// Number of interior (grid) points.
    #[must_use]
    pub fn interior_count(&self) -> usize {
        self.points.len() - self.boundary_count
    }
}

/// Grid coordinates `origin + k * step` strictly inside `(min, max)`.
pub(crate) fn grid_axis(min: f64, max: f64, origin: f64, step: f64) -> Vec<f64> {
    let mut k = ((min - origin) / step).floor() + 1.0;
    let mut values = Vec::new();
    loop {
        let v = k.mul_add(step, origin);
        if v >= max {
            break;
        }
        if v > min {
            values.push(v);
        }
        k += 1.0;
    }
    values
}

/// Triangulate the outline interior on a regular grid.
///
/// Grid points are tested against the outline in one batched pass over the
/// grid rows; triangles are kept when the constraint ring encloses them.
///
/// # Errors
///
/// - [`SolidError::InvalidParameter`] for bad parameters
/// - [`SolidError::Triangulation`] when a point cannot be inserted or two
///   outline points coincide
/// - [`SolidError::SelfIntersecting`] when outline edges cross
#[allow(clippy::cast_possible_truncation)]
pub fn triangulate_outline(outline: &Outline, params: &BaseMeshParams) -> SolidResult<PlanarMesh> {
    params.validate()?;
    let ring = outline.to_ccw();
    let boundary = ring.points();
    let origin = params.grid_origin.unwrap_or_else(|| ring.min());
    let step = params.grid_spacing;

    let xs = grid_axis(ring.min().x, ring.max().x, origin.x, step);
    let ys = grid_axis(ring.min().y, ring.max().y, origin.y, step);
    let inside = ring.inside_grid(&xs, &ys);
    let clearance = step * BOUNDARY_CLEARANCE;

    let (xs_ref, inside_ref, ring_ref) = (&xs, &inside, &ring);
    let interior: Vec<Point2<f64>> = ys
        .par_iter()
        .enumerate()
        .flat_map_iter(move |(row, &y)| {
            xs_ref.iter().enumerate().filter_map(move |(col, &x)| {
                let p = Point2::new(x, y);
                (inside_ref[row * xs_ref.len() + col] && ring_ref.distance_to_edges(&p) > clearance)
                    .then_some(p)
            })
        })
        .collect();

    let mut points = Vec::with_capacity(boundary.len() + interior.len());
    points.extend_from_slice(boundary);
    points.extend(interior);

    let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
    let mut index_of: HashMap<usize, u32> = HashMap::with_capacity(points.len());
    let mut ring_handles = Vec::with_capacity(boundary.len());
    for (i, p) in points.iter().enumerate() {
        let handle = cdt
            .insert(SpadePoint2::new(p.x, p.y))
            .map_err(|e| SolidError::triangulation(format!("point {i}: {e}")))?;
        if index_of.insert(handle.index(), i as u32).is_some() {
            return Err(SolidError::triangulation(format!(
                "point {i} coincides with an earlier point"
            )));
        }
        if i < boundary.len() {
            ring_handles.push(handle);
        }
    }

    let n = ring_handles.len();
    for i in 0..n {
        let (from, to) = (ring_handles[i], ring_handles[(i + 1) % n]);
        if !cdt.can_add_constraint(from, to) {
            return Err(SolidError::SelfIntersecting { edge: i });
        }
        cdt.add_constraint(from, to);
    }

    let enclosed = interior_faces(&cdt);
    let faces: Vec<[u32; 3]> = cdt
        .inner_faces()
        .filter(|face| enclosed.contains(&face.fix().index()))
        .filter_map(|face| {
            let [a, b, c] = face.vertices();
            let ids = [
                *index_of.get(&a.fix().index())?,
                *index_of.get(&b.fix().index())?,
                *index_of.get(&c.fix().index())?,
            ];
            let [pa, pb, pc] = ids.map(|i| points[i as usize]);
            let cross = (pb - pa).perp(&(pc - pa));
            Some(if cross >= 0.0 { ids } else { [ids[0], ids[2], ids[1]] })
        })
        .collect();

    debug!(
        boundary = boundary.len(),
        interior = points.len() - boundary.len(),
        faces = faces.len(),
        "Triangulated outline"
    );
    Ok(PlanarMesh {
        points,
        boundary_count: boundary.len(),
        faces,
    })
}

/// Inner faces of `cdt` enclosed by its constraint ring.
///
/// Flood fill from the outer face; crossing a constraint edge adds one to
/// the depth and odd depths are inside. Every constraint edge therefore
/// keeps exactly one of its two faces, whatever the shape of slivers along
/// nearly collinear outline runs.
fn interior_faces(cdt: &ConstrainedDelaunayTriangulation<SpadePoint2<f64>>) -> HashSet<usize> {
    let mut depth: HashMap<usize, u32> = HashMap::with_capacity(cdt.num_inner_faces());
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer = cdt.outer_face().fix();
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let d = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            let best = depth.entry(inner.fix().index()).or_insert(u32::MAX);
            if d < *best {
                *best = d;
                queue.push_back((inner.fix(), d));
            }
        }
    }

    // 0-1 breadth first: same-depth neighbours go to the front.
    while let Some((fixed, d)) = queue.pop_front() {
        if depth.get(&fixed.index()).is_some_and(|&best| best < d) {
            continue;
        }
        for edge in cdt.face(fixed).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let crossing = cdt.is_constraint_edge(edge.as_undirected().fix());
            let next = d + u32::from(crossing);
            let best = depth.entry(neighbor.fix().index()).or_insert(u32::MAX);
            if next < *best {
                *best = next;
                if crossing {
                    queue.push_back((neighbor.fix(), next));
                } else {
                    queue.push_front((neighbor.fix(), next));
                }
            }
        }
    }

    depth
        .into_iter()
        .filter_map(|(index, d)| (d % 2 == 1).then_some(index))
        .collect()
}

/// Build a closed solid between two height maps over one outline.
///
/// Only the grid settings of `params` apply; the outline is used as given.
/// Where the top map falls below the bottom map the top is raised to it.
///
/// # Errors
///
/// The errors of [`triangulate_outline`], plus [`SolidError::NotClosed`]
/// and [`SolidError::ZeroVolume`] for an unusable result.
///
/// # Example
///
/// ```
/// use insole_outline::{Outline, Point2};
/// use insole_solid::{build_solid_from_height_maps, BaseMeshParams};
///
/// let outline = Outline::new(vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(50.0, 0.0),
///     Point2::new(50.0, 30.0),
///     Point2::new(0.0, 30.0),
/// ])
/// .unwrap();
/// let solid =
///     build_solid_from_height_maps(&outline, &5.0_f64, &0.0_f64, &BaseMeshParams::default()).unwrap();
/// assert!((solid.volume() - 7500.0).abs() < 1e-6);
/// ```
pub fn build_solid_from_height_maps(
    outline: &Outline,
    top: &dyn HeightMap,
    bottom: &dyn HeightMap,
    params: &BaseMeshParams,
) -> SolidResult<IndexedMesh> {
    let planar = triangulate_outline(outline, params)?;
    let bottom_z = sample(&planar, bottom);
    let top_z: Vec<f64> = sample(&planar, top)
        .into_iter()
        .zip(&bottom_z)
        .map(|(t, &b)| t.max(b))
        .collect();
    close(extrude(&planar, &top_z, &bottom_z))
}

/// Build the base insole solid: flat bottom at `z = 0`, top from the field.
///
/// Outline points take the field's rim height. The heel region of the
/// outline is resampled, rim heights are smoothed around the heel and the
/// interior top vertices are relaxed toward their neighbours, each as
/// configured in `params`.
///
/// # Errors
///
/// As [`build_solid_from_height_maps`].
pub fn build_base_mesh(field: &HeightField, params: &BaseMeshParams) -> SolidResult<IndexedMesh> {
    params.validate()?;
    let outline = match params.heel_spacing {
        Some(spacing) => field
            .outline()
            .resample_heel_region(spacing, HEEL_END_PCT, HEEL_BLEND_PCT),
        None => field.outline().clone(),
    };
    let planar = triangulate_outline(&outline, params)?;

    let mut top = sample(&planar, field);
    if params.rim_smoothing {
        smooth_rim(&planar, &mut top, outline.min().x, outline.length());
    }
    if params.relaxation > 0.0 {
        relax_interior(&planar, &mut top, params.relaxation);
    }
    let bottom = vec![0.0; planar.points.len()];

    let mesh = close(extrude(&planar, &top, &bottom))?;
    info!(
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        boundary = planar.boundary_count,
        "Built base mesh"
    );
    Ok(mesh)
}

fn sample(planar: &PlanarMesh, map: &(impl HeightMap + ?Sized)) -> Vec<f64> {
    let nb = planar.boundary_count;
    planar
        .points
        .par_iter()
        .enumerate()
        .map(|(i, p)| {
            if i < nb {
                map.rim_height(p.x, p.y)
            } else {
                map.height(p.x, p.y)
            }
        })
        .collect()
}

/// Top and bottom layers, bottom faces reversed, side wall along the rim.
#[allow(clippy::cast_possible_truncation)]
fn extrude(planar: &PlanarMesh, top: &[f64], bottom: &[f64]) -> IndexedMesh {
    let n = planar.points.len();
    let nb = planar.boundary_count;
    let mut positions = Vec::with_capacity(2 * n);
    positions.extend(planar.points.iter().zip(top).map(|(p, &z)| Point3::new(p.x, p.y, z)));
    positions.extend(planar.points.iter().zip(bottom).map(|(p, &z)| Point3::new(p.x, p.y, z)));

    let offset = n as u32;
    let mut faces = Vec::with_capacity(2 * planar.faces.len() + 2 * nb);
    faces.extend_from_slice(&planar.faces);
    faces.extend(planar.faces.iter().map(|f| [f[0] + offset, f[2] + offset, f[1] + offset]));
    for i in 0..nb {
        let next = ((i + 1) % nb) as u32;
        let i = i as u32;
        faces.push([i, i + offset, next]);
        faces.push([next, i + offset, next + offset]);
    }
    IndexedMesh::from_positions(positions, faces)
}

fn close(mut mesh: IndexedMesh) -> SolidResult<IndexedMesh> {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    if !adjacency.is_watertight() || !adjacency.is_manifold() {
        return Err(SolidError::NotClosed {
            boundary_edges: adjacency.boundary_edge_count(),
            non_manifold_edges: adjacency.non_manifold_edge_count(),
        });
    }
    let volume = mesh.signed_volume();
    if volume.abs() <= MIN_VOLUME {
        return Err(SolidError::ZeroVolume);
    }
    if volume < 0.0 {
        debug!("Flipping inside-out solid");
        mesh.flip_normals();
    }
    Ok(mesh)
}

/// Cyclic moving average of rim heights, full strength in the heel and
/// fading out toward the midfoot.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn smooth_rim(planar: &PlanarMesh, z: &mut [f64], x_min: f64, length: f64) {
    let nb = planar.boundary_count;
    let ring = &planar.points[..nb];
    let perimeter: f64 = (0..nb).map(|i| (ring[(i + 1) % nb] - ring[i]).norm()).sum();
    if perimeter <= 0.0 {
        return;
    }
    let spacing = perimeter / nb as f64;
    let mut window = ((RIM_SMOOTH_SPAN / spacing) as usize).max(MIN_RIM_WINDOW);
    if window % 2 == 0 {
        window += 1;
    }
    if nb < window {
        return;
    }

    let half = window / 2;
    let original = z[..nb].to_vec();
    let mut changed = 0_usize;
    for (i, point) in ring.iter().enumerate() {
        let x_pct = if length > 0.0 {
            (point.x - x_min) / length * 100.0
        } else {
            50.0
        };
        let alpha = if x_pct <= RIM_SMOOTH_END_PCT {
            1.0
        } else if x_pct <= RIM_SMOOTH_FADE_PCT {
            1.0 - (x_pct - RIM_SMOOTH_END_PCT) / (RIM_SMOOTH_FADE_PCT - RIM_SMOOTH_END_PCT)
        } else {
            0.0
        };
        if alpha <= 0.0 {
            continue;
        }
        let sum: f64 = (0..window).map(|j| original[(i + nb + j - half) % nb]).sum();
        let mean = sum / window as f64;
        z[i] = original[i] * (1.0 - alpha) + mean * alpha;
        changed += 1;
    }
    debug!(window, changed, "Smoothed rim heights");
}

/// One Jacobi pass moving interior top heights toward the mean of their
/// neighbours.
#[allow(clippy::cast_precision_loss)]
fn relax_interior(planar: &PlanarMesh, z: &mut [f64], weight: f64) {
    let n = planar.points.len();
    let mut edges: HashSet<(u32, u32)> = HashSet::with_capacity(planar.faces.len() * 2);
    for face in &planar.faces {
        for k in 0..3 {
            let (a, b) = (face[k], face[(k + 1) % 3]);
            edges.insert(if a < b { (a, b) } else { (b, a) });
        }
    }

    let mut sum = vec![0.0; n];
    let mut count = vec![0_usize; n];
    for &(a, b) in &edges {
        let (a, b) = (a as usize, b as usize);
        sum[a] += z[b];
        count[a] += 1;
        sum[b] += z[a];
        count[b] += 1;
    }
    for i in planar.boundary_count..n {
        if count[i] > 0 {
            let mean = sum[i] / count[i] as f64;
            z[i] = (1.0 - weight) * z[i] + weight * mean;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_field::{ArchSettings, WallParams};
    use insole_outline::Landmarks;

    fn rectangle(w: f64, h: f64) -> Outline {
        Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ])
        .unwrap()
    }

    #[test]
    fn test_grid_axis_starts_inside() {
        assert_eq!(grid_axis(0.0, 5.0, 0.0, 1.0), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(grid_axis(0.8, 3.2, 0.0, 1.0), vec![1.0, 2.0, 3.0]);
        assert!(grid_axis(0.0, 0.5, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_triangulation_is_ccw_and_covers_area() {
        let outline = rectangle(10.0, 6.0);
        let planar = triangulate_outline(&outline, &BaseMeshParams::default()).unwrap();
        assert_eq!(planar.boundary_count, 4);
        assert_eq!(planar.interior_count(), 9 * 5);

        let mut area = 0.0;
        for f in &planar.faces {
            let [a, b, c] = f.map(|i| planar.points[i as usize]);
            let cross = (b - a).perp(&(c - a));
            assert!(cross > 0.0);
            area += cross * 0.5;
        }
        assert_relative_eq!(area, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clearance_drops_points_near_edges() {
        let outline = rectangle(10.2, 6.0);
        let planar = triangulate_outline(&outline, &BaseMeshParams::default()).unwrap();
        // x = 10 sits 0.2 mm from the right edge.
        assert!(planar.points[4..].iter().all(|p| p.x < 9.5));
    }

    #[test]
    fn test_flat_box_solid() {
        let outline = rectangle(50.0, 30.0);
        let solid =
            build_solid_from_height_maps(&outline, &5.0_f64, &0.0_f64, &BaseMeshParams::default()).unwrap();
        let adjacency = MeshAdjacency::build(&solid.faces);
        assert!(adjacency.is_watertight());
        assert!(adjacency.is_manifold());
        assert_eq!(adjacency.inconsistent_edge_count(), 0);
        assert_relative_eq!(solid.signed_volume(), 7500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_concave_outline_solid() {
        let outline = Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(20.0, 0.0),
            Point2::new(20.0, 8.0),
            Point2::new(8.0, 8.0),
            Point2::new(8.0, 20.0),
            Point2::new(0.0, 20.0),
        ])
        .unwrap();
        let params = BaseMeshParams::default().with_grid_spacing(1.5);
        let solid = build_solid_from_height_maps(&outline, &2.0_f64, &0.5_f64, &params).unwrap();
        assert!(MeshAdjacency::build(&solid.faces).is_watertight());
        // Area 20*8 + 8*12 = 256, thickness 1.5.
        assert_relative_eq!(solid.signed_volume(), 384.0, epsilon = 1e-6);
    }

    fn rounded_heel() -> Outline {
        let mut points: Vec<Point2<f64>> = (0..=12)
            .map(|i| {
                let a = std::f64::consts::PI * (0.5 + f64::from(i) / 12.0);
                Point2::new(20.0 + 20.0 * a.cos(), 20.0 + 20.0 * a.sin())
            })
            .collect();
        points.extend([
            Point2::new(80.0, -4.0),
            Point2::new(112.0, 2.0),
            Point2::new(120.0, 22.0),
            Point2::new(110.0, 46.0),
            Point2::new(70.0, 44.0),
        ]);
        Outline::new(points).unwrap()
    }

    #[test]
    fn test_resampled_heel_keeps_every_outline_edge() {
        let outline = rounded_heel().resample_heel_region(0.5, 30.0, 5.0);
        let area = outline.signed_area().abs();
        for spacing in [1.0, 2.0, 2.5] {
            let params = BaseMeshParams::default().with_grid_spacing(spacing);
            let planar = triangulate_outline(&outline, &params).unwrap();

            let mut covered = 0.0;
            for f in &planar.faces {
                let [a, b, c] = f.map(|i| planar.points[i as usize]);
                covered += (b - a).perp(&(c - a)) * 0.5;
            }
            assert_relative_eq!(covered, area, epsilon = 1e-6);

            let solid = build_solid_from_height_maps(&outline, &5.0_f64, &0.0_f64, &params).unwrap();
            let adjacency = MeshAdjacency::build(&solid.faces);
            assert!(adjacency.is_watertight());
            assert!(adjacency.is_manifold());
            assert_relative_eq!(solid.signed_volume(), area * 5.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_clockwise_outline_is_oriented() {
        let outline = Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 0.0),
        ])
        .unwrap();
        let solid =
            build_solid_from_height_maps(&outline, &1.0_f64, &0.0_f64, &BaseMeshParams::default()).unwrap();
        assert_relative_eq!(solid.signed_volume(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_top_clamped_to_bottom_is_zero_volume() {
        let outline = rectangle(10.0, 10.0);
        let err = build_solid_from_height_maps(&outline, &1.0_f64, &2.0_f64, &BaseMeshParams::default())
            .unwrap_err();
        assert!(matches!(err, SolidError::ZeroVolume));
    }

    #[test]
    fn test_relaxation_moves_interior_only() {
        let planar = PlanarMesh {
            points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 2.0),
                Point2::new(0.0, 2.0),
                Point2::new(1.0, 1.0),
            ],
            boundary_count: 4,
            faces: vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]],
        };
        let mut z = vec![0.0, 0.0, 0.0, 0.0, 1.0];
        relax_interior(&planar, &mut z, 0.3);
        assert_eq!(&z[..4], &[0.0; 4]);
        assert_relative_eq!(z[4], 0.7);
    }

    #[test]
    fn test_rim_smoothing_keeps_constant_rim() {
        let outline = rectangle(100.0, 40.0).resample_heel_region(0.5, 30.0, 5.0);
        let planar = triangulate_outline(&outline, &BaseMeshParams::default()).unwrap();
        let mut z = vec![4.0; planar.points.len()];
        smooth_rim(&planar, &mut z, 0.0, 100.0);
        assert!(z.iter().all(|&v| (v - 4.0).abs() < 1e-12));
    }

    #[test]
    fn test_base_mesh_from_field() {
        let outline = rectangle(240.0, 90.0);
        let field = HeightField::without_curves(
            &outline,
            &Landmarks::default(),
            &ArchSettings::default(),
            &WallParams::default(),
        )
        .unwrap();
        let params = BaseMeshParams::default().with_grid_spacing(2.0);
        let mesh = build_base_mesh(&field, &params).unwrap();

        let adjacency = MeshAdjacency::build(&mesh.faces);
        assert!(adjacency.is_watertight());
        assert!(mesh.signed_volume() > 240.0 * 90.0 * 3.0);

        let n = mesh.vertices.len() / 2;
        assert!(mesh.vertices[..n].iter().all(|v| v.position.z >= 3.0 - 1e-9));
        assert!(mesh.vertices[n..].iter().all(|v| v.position.z == 0.0));
    }
}
