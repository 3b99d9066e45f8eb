//! Winding consistency and outward orientation.

use std::collections::VecDeque;

use insole_types::IndexedMesh;
use tracing::debug;

use crate::adjacency::MeshAdjacency;

/// Make face winding consistent within each connected component.
///
/// Faces are visited breadth-first across manifold edges; a neighbor that
/// traverses the shared edge in the same direction as the current face is
/// flipped. Non-manifold edges do not propagate. Returns the number of faces
/// flipped.
pub fn fix_winding_order(mesh: &mut IndexedMesh) -> usize {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut visited = vec![false; mesh.faces.len()];
    let mut queue = VecDeque::new();
    let mut flipped = 0;

    for seed in 0..mesh.faces.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        queue.push_back(seed);
        while let Some(current) = queue.pop_front() {
            let face = mesh.faces[current];
            for (a, b) in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
                let Some(neighbors) = adjacency.faces_for_edge(a, b) else {
                    continue;
                };
                if neighbors.len() != 2 {
                    continue;
                }
                let other = if neighbors[0] == current { neighbors[1] } else { neighbors[0] };
                if visited[other] {
                    continue;
                }
                visited[other] = true;
                if traverses(mesh.faces[other], a, b) {
                    mesh.faces[other].swap(1, 2);
                    flipped += 1;
                }
                queue.push_back(other);
            }
        }
    }
    if flipped > 0 {
        debug!(flipped, "Fixed inconsistent winding");
    }
    flipped
}

/// Whether `face` walks the directed edge `a -> b`.
fn traverses(face: [u32; 3], a: u32, b: u32) -> bool {
    (0..3).any(|i| face[i] == a && face[(i + 1) % 3] == b)
}

/// Flip the whole mesh if its signed volume is negative.
///
/// Returns `true` when the mesh was flipped.
pub fn orient_outward(mesh: &mut IndexedMesh) -> bool {
    if mesh.signed_volume() < 0.0 {
        mesh.flip_normals();
        true
    } else {
        false
    }
}
