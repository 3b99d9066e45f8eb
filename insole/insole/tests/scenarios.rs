//! Shell and lattice scenarios on a flat 50 x 30 mm insole.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::float_cmp)]

use approx::assert_relative_eq;
use insole::lattice::{LatticeParams, MIN_STRUT_LENGTH, UnitCell, generate_lattice, strut_length};
use insole::outline::{Outline, Point2};
use insole::repair::{count_duplicate_faces, validate_mesh};
use insole::shell::{ShellParams, build_clip_volume, generate_hollow_shell};
use insole::solid::BaseMeshParams;
use insole::types::{MeshBounds, Point3};

fn rectangle() -> Outline {
    Outline::new(vec![
        Point2::new(0.0, 0.0),
        Point2::new(50.0, 0.0),
        Point2::new(50.0, 30.0),
        Point2::new(0.0, 30.0),
    ])
    .unwrap()
}

fn params() -> ShellParams {
    ShellParams::default()
        .with_wall_thickness(0.8)
        .with_skins(0.4, 0.4)
        .with_mesh(BaseMeshParams::default().with_grid_spacing(2.0))
}

#[test]
fn flat_hollow_shell_is_watertight() {
    let shell = generate_hollow_shell(&rectangle(), &5.0_f64, &0.0_f64, None, &params()).unwrap();
    assert!(shell.stats.is_watertight);
    assert!(validate_mesh(&shell.shell).is_printable());
    assert_relative_eq!(
        shell.stats.volume,
        50.0 * 30.0 * 5.0 - 48.4 * 28.4 * 4.2,
        epsilon = 1e-6
    );
}

#[test]
fn lattice_in_flat_cavity_has_no_duplicate_faces() {
    let clip = build_clip_volume(&rectangle(), &5.0_f64, &0.0_f64, &params()).unwrap();
    let lattice = generate_lattice(
        &clip,
        &LatticeParams::default().with_cell_size(4.0).with_strut_radius(0.2),
    )
    .unwrap();

    assert_eq!(lattice.stats.cell_count, 13 * 8 * 2);
    assert_eq!(lattice.stats.duplicate_faces_after, 0);
    assert_eq!(count_duplicate_faces(&lattice.mesh.faces), 0);

    let report = validate_mesh(&lattice.mesh);
    assert!(report.is_watertight);
    assert!(report.is_manifold);

    let (b, c) = (lattice.mesh.bounds(), clip.bounds());
    assert!(b.min.x >= c.min.x - 1e-6 && b.max.x <= c.max.x + 1e-6);
    assert!(b.min.z >= c.min.z - 1e-6 && b.max.z <= c.max.z + 1e-6);
}

#[test]
fn unit_cell_struts_end_at_the_joint() {
    let cell = UnitCell::new(Point3::new(2.0, 2.0, 2.0), 4.0, 0.2, false);
    let expected = 3.0_f64.sqrt() * 4.0 / 2.0 - 0.2;
    assert_relative_eq!(cell.strut_length.unwrap(), expected, epsilon = 1e-12);
    // Joint sphere plus eight struts.
    assert_eq!(cell.primitives.len(), 9);

    // Corner-to-center distance barely above the radius: no struts.
    let corner_to_center = 3.0_f64.sqrt() * 0.2 / 2.0;
    let radius = corner_to_center - MIN_STRUT_LENGTH / 2.0;
    assert!(strut_length(0.2, radius).is_none());
    let cell = UnitCell::new(Point3::origin(), 0.2, radius, false);
    assert_eq!(cell.primitives.len(), 1);
}
