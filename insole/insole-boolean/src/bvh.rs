//! Bounding volume hierarchy over mesh triangles.
//!
//! Box queries find candidate triangle pairs between two meshes; ray queries
//! drive the inside test used for classification.

use insole_types::{Aabb, IndexedMesh, Point3, Vector3};
use smallvec::SmallVec;

/// BVH node containing either leaf triangles or child nodes.
#[derive(Debug)]
enum BvhNode {
    Leaf {
        bbox: Aabb,
        triangles: SmallVec<[u32; 8]>,
    },
    Internal {
        bbox: Aabb,
        left: Box<Self>,
        right: Box<Self>,
    },
}

impl BvhNode {
    const fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Bounding Volume Hierarchy for triangle meshes.
#[derive(Debug)]
pub struct Bvh {
    root: Option<BvhNode>,
    triangle_count: usize,
}

impl Bvh {
    /// Build a BVH from a mesh.
    ///
    /// Subtrees with at least `parallel_threshold` triangles are built with
    /// `rayon::join`; pass `usize::MAX` for a sequential build.
    ///
    /// # Example
    ///
    /// ```
    /// use insole_boolean::Bvh;
    /// use insole_types::{cuboid, Point3};
    ///
    /// let cube = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
    /// let bvh = Bvh::build(&cube, 4, usize::MAX);
    /// assert_eq!(bvh.triangle_count(), 12);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(mesh: &IndexedMesh, max_leaf_size: usize, parallel_threshold: usize) -> Self {
        if mesh.faces.is_empty() {
            return Self {
                root: None,
                triangle_count: 0,
            };
        }

        let triangles: Vec<(u32, Aabb, Point3<f64>)> = mesh
            .faces
            .iter()
            .enumerate()
            .map(|(i, &face)| {
                let tri = mesh.face_triangle(face);
                let bbox = Aabb::from_points([tri.v0, tri.v1, tri.v2].iter());
                (i as u32, bbox, bbox.center())
            })
            .collect();

        let indices: Vec<usize> = (0..triangles.len()).collect();
        let root = build_node(&triangles, indices, max_leaf_size.max(1), parallel_threshold);

        Self {
            root: Some(root),
            triangle_count: mesh.faces.len(),
        }
    }

    /// Indices of triangles whose boxes overlap `query`.
    #[must_use]
    pub fn query(&self, query: &Aabb) -> Vec<u32> {
        let mut result = Vec::new();
        if let Some(root) = &self.root {
            query_box(root, query, &mut result);
        }
        result
    }

    /// Indices of triangles whose boxes the ray `origin + t·direction`, `t ≥ 0`, hits.
    #[must_use]
    pub fn query_ray(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> Vec<u32> {
        let inv = Vector3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        let mut result = Vec::new();
        if let Some(root) = &self.root {
            query_ray(root, origin, &inv, &mut result);
        }
        result
    }

    /// Get the total number of triangles in the BVH.
    #[must_use]
    pub const fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Check if the BVH is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Box around every triangle, `None` for an empty mesh.
    #[must_use]
    pub fn root_bbox(&self) -> Option<&Aabb> {
        self.root.as_ref().map(BvhNode::bbox)
    }
}

fn build_node(
    triangles: &[(u32, Aabb, Point3<f64>)],
    indices: Vec<usize>,
    max_leaf_size: usize,
    parallel_threshold: usize,
) -> BvhNode {
    let mut bbox = Aabb::empty();
    for &i in &indices {
        bbox.union(&triangles[i].1);
    }

    if indices.len() <= max_leaf_size {
        return BvhNode::Leaf {
            bbox,
            triangles: indices.iter().map(|&i| triangles[i].0).collect(),
        };
    }

    // Median split along the longest axis.
    let size = bbox.size();
    let axis = if size.x >= size.y && size.x >= size.z {
        0
    } else if size.y >= size.z {
        1
    } else {
        2
    };
    let mut sorted = indices;
    sorted.sort_by(|&a, &b| triangles[a].2[axis].total_cmp(&triangles[b].2[axis]));
    let right_indices = sorted.split_off(sorted.len() / 2);
    let left_indices = sorted;

    let (left, right) = if right_indices.len() >= parallel_threshold {
        rayon::join(
            || build_node(triangles, left_indices, max_leaf_size, parallel_threshold),
            || build_node(triangles, right_indices, max_leaf_size, parallel_threshold),
        )
    } else {
        (
            build_node(triangles, left_indices, max_leaf_size, parallel_threshold),
            build_node(triangles, right_indices, max_leaf_size, parallel_threshold),
        )
    };

    BvhNode::Internal {
        bbox,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn query_box(node: &BvhNode, query: &Aabb, result: &mut Vec<u32>) {
    match node {
        BvhNode::Leaf { bbox, triangles } => {
            if bbox.intersects(query) {
                result.extend(triangles.iter().copied());
            }
        }
        BvhNode::Internal { bbox, left, right } => {
            if bbox.intersects(query) {
                query_box(left, query, result);
                query_box(right, query, result);
            }
        }
    }
}

fn query_ray(node: &BvhNode, origin: &Point3<f64>, inv_dir: &Vector3<f64>, result: &mut Vec<u32>) {
    if !ray_hits_box(node.bbox(), origin, inv_dir) {
        return;
    }
    match node {
        BvhNode::Leaf { triangles, .. } => result.extend(triangles.iter().copied()),
        BvhNode::Internal { left, right, .. } => {
            query_ray(left, origin, inv_dir, result);
            query_ray(right, origin, inv_dir, result);
        }
    }
}

/// Slab test for the ray `origin + t·dir`, `t ≥ 0`, given `1/dir` per axis.
fn ray_hits_box(bbox: &Aabb, origin: &Point3<f64>, inv_dir: &Vector3<f64>) -> bool {
    let mut t_min = 0.0_f64;
    let mut t_max = f64::INFINITY;
    for axis in 0..3 {
        let t1 = (bbox.min[axis] - origin[axis]) * inv_dir[axis];
        let t2 = (bbox.max[axis] - origin[axis]) * inv_dir[axis];
        // NaN (0 * inf) means the origin lies on a slab plane of a parallel ray.
        let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        if !lo.is_nan() {
            t_min = t_min.max(lo);
        }
        if !hi.is_nan() {
            t_max = t_max.min(hi);
        }
    }
    t_min <= t_max
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use insole_types::{Vertex, cuboid};

    fn unit_cube() -> IndexedMesh {
        cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_bvh_build_empty() {
        let bvh = Bvh::build(&IndexedMesh::new(), 8, usize::MAX);
        assert!(bvh.is_empty());
        assert_eq!(bvh.triangle_count(), 0);
        assert!(bvh.root_bbox().is_none());
    }

    #[test]
    fn test_bvh_build_single_triangle() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);

        let bvh = Bvh::build(&mesh, 8, usize::MAX);
        assert!(!bvh.is_empty());
        assert_eq!(bvh.query(&Aabb::new(Point3::origin(), Point3::new(0.1, 0.1, 0.1))), vec![0]);
    }

    #[test]
    fn test_bvh_query_box() {
        let bvh = Bvh::build(&unit_cube(), 1, usize::MAX);

        let all = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(2.0, 2.0, 2.0));
        assert_eq!(bvh.query(&all).len(), 12);

        let far = Aabb::new(Point3::new(10.0, 10.0, 10.0), Point3::new(11.0, 11.0, 11.0));
        assert!(bvh.query(&far).is_empty());

        let root = bvh.root_bbox().unwrap();
        assert_eq!(root.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_bvh_query_ray() {
        let bvh = Bvh::build(&unit_cube(), 1, usize::MAX);

        let hits = bvh.query_ray(&Point3::new(0.5, 0.5, -1.0), &Vector3::new(0.0, 0.0, 1.0));
        assert!(!hits.is_empty());
        assert!(hits.len() < 12);

        let misses = bvh.query_ray(&Point3::new(0.5, 0.5, 2.0), &Vector3::new(0.0, 0.0, 1.0));
        assert!(misses.is_empty());
    }

    #[test]
    fn test_bvh_parallel_build_matches() {
        let cube = unit_cube();
        let sequential = Bvh::build(&cube, 2, usize::MAX);
        let parallel = Bvh::build(&cube, 2, 1);
        let query = Aabb::new(Point3::new(0.9, -0.1, -0.1), Point3::new(1.1, 1.1, 1.1));
        let mut a = sequential.query(&query);
        let mut b = parallel.query(&query);
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }
}
