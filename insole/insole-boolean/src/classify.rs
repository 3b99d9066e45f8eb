//! Inside/outside classification of faces against a closed mesh.
//!
//! Faces are grouped into regions that cannot change side without crossing
//! the other surface, and one representative face per region is tested by
//! ray casting.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};
use insole_types::{IndexedMesh, Point3, Vector3};
use rayon::prelude::*;
use smallvec::SmallVec;

use crate::bvh::Bvh;
use crate::config::BooleanConfig;
use crate::intersect::ray_triangle_intersect;

/// Classification of a face relative to another mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceLocation {
    /// Face is inside the other mesh.
    Inside,
    /// Face is outside the other mesh.
    Outside,
}

/// Skewed so that rays rarely run along the axis-aligned grid edges of the
/// meshes this kernel builds.
const RAY_DIRECTIONS: [[f64; 3]; 3] = [
    [0.871_3, 0.352_9, 0.341_1],
    [-0.283_4, 0.917_6, 0.278_5],
    [0.223_1, -0.317_9, 0.921_5],
];

/// Test if a point is inside a closed mesh.
///
/// Three skewed rays count crossings; the majority parity wins.
///
/// # Example
///
/// ```
/// use insole_boolean::{Bvh, point_in_mesh};
/// use insole_types::{cuboid, Point3};
///
/// let cube = cuboid(Point3::origin(), Point3::new(2.0, 2.0, 2.0));
/// let bvh = Bvh::build(&cube, 8, usize::MAX);
/// assert!(point_in_mesh(&Point3::new(1.0, 1.0, 1.0), &cube, &bvh, 1e-9));
/// assert!(!point_in_mesh(&Point3::new(3.0, 1.0, 1.0), &cube, &bvh, 1e-9));
/// ```
#[must_use]
pub fn point_in_mesh(point: &Point3<f64>, mesh: &IndexedMesh, bvh: &Bvh, epsilon: f64) -> bool {
    let votes = RAY_DIRECTIONS
        .iter()
        .filter(|d| {
            let dir = Vector3::new(d[0], d[1], d[2]);
            count_crossings(point, &dir, mesh, bvh, epsilon) % 2 == 1
        })
        .count();
    votes >= 2
}

fn count_crossings(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    mesh: &IndexedMesh,
    bvh: &Bvh,
    epsilon: f64,
) -> usize {
    bvh.query_ray(origin, direction)
        .into_iter()
        .filter(|&fi| {
            let face = mesh.faces[fi as usize];
            let tri = face.map(|i| mesh.position(i));
            ray_triangle_intersect(origin, direction, &tri, epsilon).is_some()
        })
        .count()
}

/// Group faces into regions connected through edges not in `barriers`.
///
/// `barriers` holds sorted vertex pairs. Returns the region id of each face
/// and the region count.
pub(crate) fn face_regions(faces: &[[u32; 3]], barriers: &HashSet<(u32, u32)>) -> (Vec<usize>, usize) {
    let mut edge_faces: HashMap<(u32, u32), SmallVec<[usize; 2]>> = HashMap::new();
    for (fi, face) in faces.iter().enumerate() {
        for k in 0..3 {
            let edge = sorted_edge(face[k], face[(k + 1) % 3]);
            if !barriers.contains(&edge) {
                edge_faces.entry(edge).or_default().push(fi);
            }
        }
    }

    let mut region = vec![usize::MAX; faces.len()];
    let mut count = 0;
    let mut queue = VecDeque::new();
    for seed in 0..faces.len() {
        if region[seed] != usize::MAX {
            continue;
        }
        region[seed] = count;
        queue.push_back(seed);
        while let Some(fi) = queue.pop_front() {
            let face = faces[fi];
            for k in 0..3 {
                let edge = sorted_edge(face[k], face[(k + 1) % 3]);
                let Some(neighbors) = edge_faces.get(&edge) else {
                    continue;
                };
                for &other in neighbors {
                    if region[other] == usize::MAX {
                        region[other] = count;
                        queue.push_back(other);
                    }
                }
            }
        }
        count += 1;
    }
    (region, count)
}

/// Classify each face by testing the largest face of its region.
pub(crate) fn classify_regions(
    positions: &[Point3<f64>],
    faces: &[[u32; 3]],
    barriers: &HashSet<(u32, u32)>,
    other: &IndexedMesh,
    other_bvh: &Bvh,
    config: &BooleanConfig,
) -> (Vec<FaceLocation>, usize) {
    let (region, count) = face_regions(faces, barriers);

    let area = |f: &[u32; 3]| {
        let [a, b, c] = f.map(|i| positions[i as usize]);
        (b - a).cross(&(c - a)).norm()
    };
    let mut best: Vec<Option<(usize, f64)>> = vec![None; count];
    for (fi, face) in faces.iter().enumerate() {
        let a = area(face);
        let slot = &mut best[region[fi]];
        if slot.is_none_or(|(_, best_area)| a > best_area) {
            *slot = Some((fi, a));
        }
    }

    let test = |entry: &Option<(usize, f64)>| {
        let Some((fi, _)) = *entry else {
            return FaceLocation::Outside;
        };
        let [a, b, c] = faces[fi].map(|i| positions[i as usize]);
        let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
        if point_in_mesh(&centroid, other, other_bvh, config.classification_tolerance) {
            FaceLocation::Inside
        } else {
            FaceLocation::Outside
        }
    };
    let region_location: Vec<FaceLocation> = if config.use_parallel(count) {
        best.par_iter().map(test).collect()
    } else {
        best.iter().map(test).collect()
    };

    (region.iter().map(|&r| region_location[r]).collect(), count)
}

pub(crate) const fn sorted_edge(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}
