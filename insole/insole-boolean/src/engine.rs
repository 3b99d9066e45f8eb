//! Boolean engines and the ranked fallback chain.
//!
//! Engines share the [`BooleanEngine`] interface. [`EngineChain`] tries them
//! in order and rejects open results from closed inputs, so a failing engine
//! falls through to the next one instead of emitting broken geometry.

use hashbrown::{HashMap, HashSet};
use insole_repair::{
    MeshAdjacency, compute_vertex_normals, remove_degenerate_triangles, remove_duplicate_faces,
    remove_unreferenced_vertices, weld_vertices,
};
use insole_types::{Aabb, IndexedMesh, MeshTopology, Point3, Vertex};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::bvh::Bvh;
use crate::classify::{FaceLocation, classify_regions, face_regions, point_in_mesh};
use crate::config::{BooleanConfig, BooleanOp, CleanupLevel};
use crate::error::{BooleanError, BooleanResult};
use crate::intersect::{Contact, triangle_contact};
use crate::split::split_meshes;

/// A mesh prepared for boolean operations.
///
/// Holds the BVH and connected components so an operand used against many
/// others (such as a lattice clip volume) is indexed once.
#[derive(Debug)]
pub struct Operand<'a> {
    mesh: &'a IndexedMesh,
    bvh: Bvh,
    closed: bool,
    components: Vec<Component>,
}

#[derive(Debug)]
struct Component {
    faces: Vec<usize>,
    bounds: Aabb,
    /// Centroid of the largest face.
    probe: Point3<f64>,
}

impl<'a> Operand<'a> {
    /// Index a mesh for boolean operations.
    ///
    /// # Errors
    ///
    /// Returns [`BooleanError::EmptyMesh`] when the mesh has no faces.
    pub fn new(mesh: &'a IndexedMesh, config: &BooleanConfig) -> BooleanResult<Self> {
        if mesh.vertices.is_empty() || mesh.faces.is_empty() {
            return Err(BooleanError::EmptyMesh {
                details: format!("{} vertices, {} faces", mesh.vertex_count(), mesh.face_count()),
            });
        }
        let threshold = if config.parallel { config.parallel_threshold.max(1) } else { usize::MAX };
        let bvh = Bvh::build(mesh, config.bvh_leaf_size, threshold);

        let adjacency = MeshAdjacency::build(&mesh.faces);
        let closed = adjacency.is_watertight() && adjacency.is_manifold();

        let (region, count) = face_regions(&mesh.faces, &HashSet::new());
        let mut components: Vec<Component> = (0..count)
            .map(|_| Component {
                faces: Vec::new(),
                bounds: Aabb::empty(),
                probe: Point3::origin(),
            })
            .collect();
        let mut best_area = vec![-1.0_f64; count];
        for (fi, &face) in mesh.faces.iter().enumerate() {
            let tri = mesh.face_triangle(face);
            let c = &mut components[region[fi]];
            c.faces.push(fi);
            for p in [tri.v0, tri.v1, tri.v2] {
                c.bounds.expand_to_include(&p);
            }
            let area = tri.area();
            if area > best_area[region[fi]] {
                best_area[region[fi]] = area;
                c.probe = tri.centroid();
            }
        }

        Ok(Self {
            mesh,
            bvh,
            closed,
            components,
        })
    }

    /// The underlying mesh.
    #[must_use]
    pub const fn mesh(&self) -> &IndexedMesh {
        self.mesh
    }

    /// Whether the mesh is watertight and manifold.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of connected components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Bounding box of the mesh.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.bvh.root_bbox().copied().unwrap_or_default()
    }

    /// Whether `point` lies inside this mesh.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>, config: &BooleanConfig) -> bool {
        self.bounds().contains(point)
            && point_in_mesh(point, self.mesh, &self.bvh, config.classification_tolerance)
    }

    /// Number of triangle pairs of `self` and `other` that cross or overlap
    /// in a shared plane.
    fn contact_pairs(&self, other: &Operand<'_>, config: &BooleanConfig) -> usize {
        let tri_of = |mesh: &IndexedMesh, face: [u32; 3]| face.map(|i| mesh.position(i));
        let other_bounds = other.bounds();
        let contacts_of = |face: &[u32; 3]| -> usize {
            let tri = tri_of(self.mesh, *face);
            let query = Aabb::from_points(tri.iter()).expanded(config.coplanar_tolerance);
            if !other_bounds.intersects(&query) {
                return 0;
            }
            other
                .bvh
                .query(&query)
                .into_iter()
                .filter(|&bi| {
                    let tri_b = tri_of(other.mesh, other.mesh.faces[bi as usize]);
                    triangle_contact(&tri, &tri_b, config.coplanar_tolerance, config.edge_tolerance)
                        != Contact::None
                })
                .count()
        };
        if config.use_parallel(self.mesh.faces.len()) {
            self.mesh.faces.par_iter().map(contacts_of).sum()
        } else {
            self.mesh.faces.iter().map(contacts_of).sum()
        }
    }

    /// Location of every face, classifying whole components against `other`.
    fn component_locations(&self, other: &Operand<'_>, config: &BooleanConfig) -> Vec<FaceLocation> {
        let mut locations = vec![FaceLocation::Outside; self.mesh.faces.len()];
        let other_bounds = other.bounds();
        for component in &self.components {
            if !other_bounds.contains_box(&component.bounds) {
                continue;
            }
            if other.contains(&component.probe, config) {
                for &fi in &component.faces {
                    locations[fi] = FaceLocation::Inside;
                }
            }
        }
        locations
    }
}

/// Statistics from a boolean operation.
#[derive(Debug, Clone, Default)]
pub struct BooleanStats {
    /// Faces from mesh A in result.
    pub faces_from_a: usize,
    /// Faces from mesh B in result.
    pub faces_from_b: usize,
    /// Triangle pairs whose surfaces cross.
    pub crossing_pairs: usize,
    /// Number of faces retriangulated along cuts.
    pub faces_split: usize,
    /// Number of cut vertices created.
    pub new_vertices: usize,
    /// Number of regions classified by ray casting.
    pub regions: usize,
    /// Whether the surfaces actually crossed.
    pub meshes_intersected: bool,
}

/// Result of a boolean operation.
#[derive(Debug)]
pub struct BooleanOperationResult {
    /// The resulting mesh.
    pub mesh: IndexedMesh,
    /// Statistics about the operation.
    pub stats: BooleanStats,
}

/// A boolean operation backend.
pub trait BooleanEngine: Send + Sync + std::fmt::Debug {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Combine two prepared operands.
    ///
    /// # Errors
    ///
    /// Returns a [`BooleanError`] when the engine cannot handle the input.
    fn apply(
        &self,
        a: &Operand<'_>,
        b: &Operand<'_>,
        op: BooleanOp,
        config: &BooleanConfig,
    ) -> BooleanResult<BooleanOperationResult>;
}

/// Exact engine: splits both surfaces along their intersection curves.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplittingEngine;

impl BooleanEngine for SplittingEngine {
    fn name(&self) -> &'static str {
        "splitting"
    }

    fn apply(
        &self,
        a: &Operand<'_>,
        b: &Operand<'_>,
        op: BooleanOp,
        config: &BooleanConfig,
    ) -> BooleanResult<BooleanOperationResult> {
        if !a.bounds().intersects(&b.bounds()) {
            return Ok(non_overlapping(a.mesh, b.mesh, op));
        }
        let Some(split) = split_meshes(a.mesh, b.mesh, &b.bvh, config)? else {
            return Ok(by_components(a, b, op, config));
        };

        let (loc_a, regions_a) =
            classify_regions(&split.positions, &split.faces_a, &split.barriers, b.mesh, &b.bvh, config);
        let (loc_b, regions_b) =
            classify_regions(&split.positions, &split.faces_b, &split.barriers, a.mesh, &a.bvh, config);

        let (mesh, faces_from_a, faces_from_b) = assemble(
            |i| split.positions[i as usize],
            (&split.faces_a, &loc_a),
            (&split.faces_b, &loc_b),
            op,
            config,
        );
        Ok(BooleanOperationResult {
            mesh,
            stats: BooleanStats {
                faces_from_a,
                faces_from_b,
                crossing_pairs: split.crossing_pairs,
                faces_split: split.faces_split,
                new_vertices: split.new_vertices,
                regions: regions_a + regions_b,
                meshes_intersected: true,
            },
        })
    }
}

/// Fallback engine: keeps or drops whole connected components.
///
/// Exact for nested and disjoint operands. Operands whose surfaces touch
/// are rejected with [`BooleanError::SurfacesCross`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassificationEngine;

impl BooleanEngine for ClassificationEngine {
    fn name(&self) -> &'static str {
        "classification"
    }

    fn apply(
        &self,
        a: &Operand<'_>,
        b: &Operand<'_>,
        op: BooleanOp,
        config: &BooleanConfig,
    ) -> BooleanResult<BooleanOperationResult> {
        if !a.bounds().intersects(&b.bounds()) {
            return Ok(non_overlapping(a.mesh, b.mesh, op));
        }
        let pairs = a.contact_pairs(b, config);
        if pairs > 0 {
            return Err(BooleanError::SurfacesCross {
                engine: self.name(),
                pairs,
            });
        }
        Ok(by_components(a, b, op, config))
    }
}

fn non_overlapping(a: &IndexedMesh, b: &IndexedMesh, op: BooleanOp) -> BooleanOperationResult {
    let (mesh, faces_from_a, faces_from_b) = match op {
        BooleanOp::Union => (IndexedMesh::concat([a, b]), a.faces.len(), b.faces.len()),
        BooleanOp::Difference => (a.clone(), a.faces.len(), 0),
        BooleanOp::Intersection => (IndexedMesh::new(), 0, 0),
    };
    BooleanOperationResult {
        mesh,
        stats: BooleanStats {
            faces_from_a,
            faces_from_b,
            ..BooleanStats::default()
        },
    }
}

#[allow(clippy::cast_possible_truncation)]
fn by_components(
    a: &Operand<'_>,
    b: &Operand<'_>,
    op: BooleanOp,
    config: &BooleanConfig,
) -> BooleanOperationResult {
    let loc_a = a.component_locations(b, config);
    let loc_b = b.component_locations(a, config);
    let a_len = a.mesh.vertices.len() as u32;
    let faces_b: Vec<[u32; 3]> = b.mesh.faces.iter().map(|f| f.map(|i| i + a_len)).collect();

    let (mesh, faces_from_a, faces_from_b) = assemble(
        |i| {
            if i < a_len {
                a.mesh.position(i)
            } else {
                b.mesh.position(i - a_len)
            }
        },
        (&a.mesh.faces, &loc_a),
        (&faces_b, &loc_b),
        op,
        config,
    );
    BooleanOperationResult {
        mesh,
        stats: BooleanStats {
            faces_from_a,
            faces_from_b,
            regions: a.component_count() + b.component_count(),
            ..BooleanStats::default()
        },
    }
}

/// Gather kept faces into a compact mesh and apply the configured cleanup.
#[allow(clippy::cast_possible_truncation)]
fn assemble(
    position: impl Fn(u32) -> Point3<f64>,
    (faces_a, loc_a): (&[[u32; 3]], &[FaceLocation]),
    (faces_b, loc_b): (&[[u32; 3]], &[FaceLocation]),
    op: BooleanOp,
    config: &BooleanConfig,
) -> (IndexedMesh, usize, usize) {
    let mut mesh = IndexedMesh::new();
    let mut vertex_map: HashMap<u32, u32> = HashMap::new();
    let mut add = |mesh: &mut IndexedMesh, face: [u32; 3]| {
        let mapped = face.map(|i| {
            *vertex_map.entry(i).or_insert_with(|| {
                let idx = mesh.vertices.len() as u32;
                mesh.vertices.push(Vertex::new(position(i)));
                idx
            })
        });
        mesh.faces.push(mapped);
    };

    let want_a = if op.keeps_a_inside() { FaceLocation::Inside } else { FaceLocation::Outside };
    for (&face, &loc) in faces_a.iter().zip(loc_a) {
        if loc == want_a {
            add(&mut mesh, face);
        }
    }
    let from_a = mesh.faces.len();

    let want_b = if op.keeps_b_inside() { FaceLocation::Inside } else { FaceLocation::Outside };
    for (&face, &loc) in faces_b.iter().zip(loc_b) {
        if loc == want_b {
            add(&mut mesh, if op.inverts_b() { [face[0], face[2], face[1]] } else { face });
        }
    }
    let from_b = mesh.faces.len() - from_a;

    apply_cleanup(&mut mesh, config);
    (mesh, from_a, from_b)
}

fn apply_cleanup(mesh: &mut IndexedMesh, config: &BooleanConfig) {
    match config.cleanup {
        CleanupLevel::None => {}
        CleanupLevel::Fast => {
            weld_vertices(mesh, config.vertex_weld_tolerance);
            remove_degenerate_triangles(mesh, 0.0);
            remove_unreferenced_vertices(mesh);
        }
        CleanupLevel::Full => {
            weld_vertices(mesh, config.vertex_weld_tolerance);
            remove_degenerate_triangles(mesh, 0.0);
            remove_duplicate_faces(mesh);
            remove_unreferenced_vertices(mesh);
            compute_vertex_normals(mesh);
        }
    }
}

/// Result of running an [`EngineChain`].
#[derive(Debug)]
pub struct BooleanOutcome {
    /// The resulting mesh.
    pub mesh: IndexedMesh,
    /// Statistics from the engine that succeeded.
    pub stats: BooleanStats,
    /// Name of the engine that succeeded.
    pub engine: &'static str,
    /// Engines that failed before it.
    pub failed_engines: Vec<&'static str>,
}

/// Ordered list of boolean engines tried until one succeeds.
///
/// # Example
///
/// ```
/// use insole_boolean::{BooleanConfig, BooleanOp, EngineChain, Operand};
/// use insole_types::{cuboid, Point3};
///
/// let outer = cuboid(Point3::origin(), Point3::new(4.0, 4.0, 4.0));
/// let inner = cuboid(Point3::new(1.0, 1.0, 1.0), Point3::new(3.0, 3.0, 3.0));
/// let config = BooleanConfig::default();
///
/// let a = Operand::new(&outer, &config).unwrap();
/// let b = Operand::new(&inner, &config).unwrap();
/// let outcome = EngineChain::default().run(&a, &b, BooleanOp::Difference, &config).unwrap();
/// assert_eq!(outcome.mesh.faces.len(), 24);
/// assert!((outcome.mesh.volume() - 56.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct EngineChain {
    engines: Vec<Box<dyn BooleanEngine>>,
}

impl Default for EngineChain {
    fn default() -> Self {
        Self::new(vec![Box::new(SplittingEngine), Box::new(ClassificationEngine)])
    }
}

impl EngineChain {
    /// Chain the given engines in priority order.
    #[must_use]
    pub fn new(engines: Vec<Box<dyn BooleanEngine>>) -> Self {
        Self { engines }
    }

    /// Engine names in priority order.
    #[must_use]
    pub fn engine_names(&self) -> Vec<&'static str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    /// Run the engines in order until one returns an acceptable result.
    ///
    /// When both operands are closed, an open or non-manifold result counts as
    /// a failure. An empty result is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`BooleanError::InvalidConfig`] for a bad config and
    /// [`BooleanError::AllEnginesFailed`] when no engine succeeds.
    pub fn run(
        &self,
        a: &Operand<'_>,
        b: &Operand<'_>,
        op: BooleanOp,
        config: &BooleanConfig,
    ) -> BooleanResult<BooleanOutcome> {
        config.validate()?;
        let expect_closed = a.is_closed() && b.is_closed();
        let mut attempts = Vec::new();
        let mut failed_engines = Vec::new();

        for engine in &self.engines {
            let name = engine.name();
            let error = match engine.apply(a, b, op, config) {
                Ok(result) => match check_closed(name, &result.mesh, expect_closed) {
                    Ok(()) => {
                        debug!(
                            engine = name,
                            faces = result.mesh.faces.len(),
                            vertices = result.mesh.vertices.len(),
                            crossing_pairs = result.stats.crossing_pairs,
                            "Boolean {op} complete"
                        );
                        return Ok(BooleanOutcome {
                            mesh: result.mesh,
                            stats: result.stats,
                            engine: name,
                            failed_engines,
                        });
                    }
                    Err(e) => e,
                },
                Err(e) => e,
            };
            warn!(engine = name, error = %error, "Boolean engine failed, trying next");
            attempts.push(format!("{name}: {error}"));
            failed_engines.push(name);
        }

        Err(BooleanError::AllEnginesFailed {
            op: op.to_string(),
            attempts: attempts.join("; "),
        })
    }
}

fn check_closed(engine: &'static str, mesh: &IndexedMesh, expect_closed: bool) -> BooleanResult<()> {
    if !expect_closed || mesh.faces.is_empty() {
        return Ok(());
    }
    let adjacency = MeshAdjacency::build(&mesh.faces);
    if adjacency.is_watertight() && adjacency.is_manifold() {
        Ok(())
    } else {
        Err(BooleanError::NonWatertightResult {
            engine,
            boundary_edges: adjacency.boundary_edge_count(),
            non_manifold_edges: adjacency.non_manifold_edge_count(),
        })
    }
}

/// Run `op` on two meshes with the default engine chain.
///
/// # Errors
///
/// Returns a [`BooleanError`] when either mesh is empty or every engine fails.
pub fn boolean_operation(
    a: &IndexedMesh,
    b: &IndexedMesh,
    op: BooleanOp,
    config: &BooleanConfig,
) -> BooleanResult<BooleanOutcome> {
    let a = Operand::new(a, config)?;
    let b = Operand::new(b, config)?;
    EngineChain::default().run(&a, &b, op, config)
}

/// Subtract `b` from `a` with the default config.
///
/// # Errors
///
/// Returns a [`BooleanError`] when either mesh is empty or every engine fails.
pub fn difference(a: &IndexedMesh, b: &IndexedMesh) -> BooleanResult<IndexedMesh> {
    boolean_operation(a, b, BooleanOp::Difference, &BooleanConfig::default()).map(|o| o.mesh)
}

/// Intersect `a` and `b` with the default config.
///
/// # Errors
///
/// Returns a [`BooleanError`] when either mesh is empty or every engine fails.
pub fn intersection(a: &IndexedMesh, b: &IndexedMesh) -> BooleanResult<IndexedMesh> {
    boolean_operation(a, b, BooleanOp::Intersection, &BooleanConfig::default()).map(|o| o.mesh)
}

/// Unite `a` and `b` with the default config.
///
/// # Errors
///
/// Returns a [`BooleanError`] when either mesh is empty or every engine fails.
pub fn union(a: &IndexedMesh, b: &IndexedMesh) -> BooleanResult<IndexedMesh> {
    boolean_operation(a, b, BooleanOp::Union, &BooleanConfig::default()).map(|o| o.mesh)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_types::cuboid;

    fn boxed(min: [f64; 3], max: [f64; 3]) -> IndexedMesh {
        cuboid(Point3::from(min), Point3::from(max))
    }

    fn is_closed(mesh: &IndexedMesh) -> bool {
        let adjacency = MeshAdjacency::build(&mesh.faces);
        adjacency.is_watertight() && adjacency.is_manifold()
    }

    #[test]
    fn test_empty_operand_rejected() {
        let err = Operand::new(&IndexedMesh::new(), &BooleanConfig::default()).unwrap_err();
        assert!(matches!(err, BooleanError::EmptyMesh { .. }));
    }

    #[test]
    fn test_nested_difference_keeps_cavity() {
        let outer = boxed([0.0; 3], [4.0; 3]);
        let inner = boxed([1.0; 3], [3.0; 3]);
        let outcome = boolean_operation(&outer, &inner, BooleanOp::Difference, &BooleanConfig::default())
            .unwrap();
        assert_eq!(outcome.engine, "splitting");
        assert!(!outcome.stats.meshes_intersected);
        assert_eq!(outcome.stats.faces_from_b, 12);
        assert!(is_closed(&outcome.mesh));
        assert_relative_eq!(outcome.mesh.signed_volume(), 56.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nested_intersection_and_union() {
        let outer = boxed([0.0; 3], [4.0; 3]);
        let inner = boxed([1.0; 3], [3.0; 3]);
        let inside = intersection(&outer, &inner).unwrap();
        assert_relative_eq!(inside.signed_volume(), 8.0, epsilon = 1e-9);
        let all = union(&outer, &inner).unwrap();
        assert_relative_eq!(all.signed_volume(), 64.0, epsilon = 1e-9);
    }

    #[test]
    fn test_disjoint_operations() {
        let a = boxed([0.0; 3], [1.0; 3]);
        let b = boxed([5.0; 3], [6.0; 3]);
        assert!(intersection(&a, &b).unwrap().faces.is_empty());
        assert_eq!(difference(&a, &b).unwrap().faces.len(), 12);
        assert_eq!(union(&a, &b).unwrap().faces.len(), 24);
    }

    #[test]
    fn test_crossing_difference_is_closed() {
        let a = boxed([0.0; 3], [1.0; 3]);
        let b = boxed([0.5, 0.3, 0.3], [1.5, 0.7, 0.7]);
        let config = BooleanConfig::default().with_parallel(false);
        let outcome = boolean_operation(&a, &b, BooleanOp::Difference, &config).unwrap();
        assert_eq!(outcome.engine, "splitting");
        assert!(outcome.stats.meshes_intersected);
        assert!(is_closed(&outcome.mesh));
        assert_relative_eq!(outcome.mesh.signed_volume(), 1.0 - 0.5 * 0.4 * 0.4, epsilon = 1e-6);
    }

    #[test]
    fn test_crossing_intersection_volume() {
        let a = boxed([0.0; 3], [1.0; 3]);
        let b = boxed([0.5, 0.3, 0.3], [1.5, 0.7, 0.7]);
        let config = BooleanConfig::default().with_parallel(false);
        let outcome = boolean_operation(&a, &b, BooleanOp::Intersection, &config).unwrap();
        assert!(is_closed(&outcome.mesh));
        assert_relative_eq!(outcome.mesh.signed_volume(), 0.5 * 0.4 * 0.4, epsilon = 1e-6);
    }

    #[test]
    fn test_chain_falls_back() {
        // The classification engine alone cannot cut crossing operands.
        let a = boxed([0.0; 3], [1.0; 3]);
        let b = boxed([0.5, 0.3, 0.3], [1.5, 0.7, 0.7]);
        let config = BooleanConfig::default();
        let oa = Operand::new(&a, &config).unwrap();
        let ob = Operand::new(&b, &config).unwrap();

        let only_classification = EngineChain::new(vec![Box::new(ClassificationEngine)]);
        let err = only_classification
            .run(&oa, &ob, BooleanOp::Difference, &config)
            .unwrap_err();
        assert!(err.to_string().contains("classification"));

        let reversed = EngineChain::new(vec![Box::new(ClassificationEngine), Box::new(SplittingEngine)]);
        let outcome = reversed.run(&oa, &ob, BooleanOp::Difference, &config).unwrap();
        assert_eq!(outcome.engine, "splitting");
        assert_eq!(outcome.failed_engines, vec!["classification"]);
        assert_eq!(reversed.engine_names(), vec!["classification", "splitting"]);
    }

    #[test]
    fn test_classification_rejects_crossing_surfaces() {
        let a = boxed([0.0; 3], [1.0; 3]);
        let b = boxed([0.5, 0.3, 0.3], [1.5, 0.7, 0.7]);
        let config = BooleanConfig::default().with_parallel(false);
        let oa = Operand::new(&a, &config).unwrap();
        let ob = Operand::new(&b, &config).unwrap();

        let err = ClassificationEngine
            .apply(&oa, &ob, BooleanOp::Difference, &config)
            .unwrap_err();
        assert!(matches!(
            err,
            BooleanError::SurfacesCross { engine: "classification", pairs } if pairs > 0
        ));

        // Nested operands never touch, so whole components are exact.
        let outer = boxed([0.0; 3], [4.0; 3]);
        let inner = boxed([1.0; 3], [3.0; 3]);
        let (oo, oi) = (Operand::new(&outer, &config).unwrap(), Operand::new(&inner, &config).unwrap());
        let result = ClassificationEngine
            .apply(&oo, &oi, BooleanOp::Difference, &config)
            .unwrap();
        assert_relative_eq!(result.mesh.signed_volume(), 56.0, epsilon = 1e-9);
    }

    #[test]
    fn test_operand_contains() {
        let cube = boxed([0.0; 3], [2.0; 3]);
        let config = BooleanConfig::default();
        let operand = Operand::new(&cube, &config).unwrap();
        assert!(operand.is_closed());
        assert_eq!(operand.component_count(), 1);
        assert!(operand.contains(&Point3::new(1.0, 1.0, 1.0), &config));
        assert!(!operand.contains(&Point3::new(1.0, 1.0, 3.0), &config));
    }
}
