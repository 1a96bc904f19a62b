use super::super::*;
use approx::assert_relative_eq;

fn signed_volume(mesh: &GeomMesh) -> f64 {
    mesh.indices
        .chunks_exact(3)
        .map(|tri| {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(mesh.positions[i as usize]));
            a.dot(b.cross(c)) / 6.0
        })
        .sum()
}

#[test]
fn box_keeps_hard_edges() {
    let (mesh, diag) = build_box(1.0, 1.0, 1.0, Tolerance::WELD);

    assert!(mesh.validate().is_ok());
    assert_eq!(mesh.vertex_count(), 24);
    assert_eq!(mesh.triangle_count(), 12);
    // Split seams are not reported as open.
    assert_eq!(diag.open_edge_count, 0);
    assert!(diag.is_manifold());

    let bounds = mesh.bounds().expect("bounds");
    assert_relative_eq!(bounds.min.x, -0.5);
    assert_relative_eq!(bounds.max.y, 0.5);
    assert_relative_eq!(bounds.max.z, 0.5);
    assert_relative_eq!(signed_volume(&mesh), 1.0, epsilon = 1e-12);
}

#[test]
fn box_face_normals_are_axis_aligned() {
    let (mesh, _) = build_box(2.0, 1.0, 3.0, Tolerance::WELD);
    let normals = mesh.normals.as_ref().expect("normals");
    for (p, n) in mesh.positions.iter().zip(normals) {
        let axis = n.iter().position(|c| c.abs() > 0.5).expect("axis normal");
        assert_relative_eq!(n[axis].abs(), 1.0);
        assert!(p[axis] * n[axis] > 0.0, "normal {n:?} at {p:?}");
    }
}

#[test]
fn cylinder_is_closed() {
    let (mesh, diag) = build_cylinder(0.5, 0.5, 1.0, 32, Tolerance::WELD);

    // Side columns with a split seam, plus a center and ring per cap.
    assert_eq!(mesh.vertex_count(), 33 * 2 + 2 * 34);
    assert_eq!(mesh.triangle_count(), 32 * 2 + 2 * 32);
    assert!(diag.is_watertight());
    assert!(diag.is_manifold());
    assert!(signed_volume(&mesh) > 0.0);

    let bounds = mesh.bounds().expect("bounds");
    assert_relative_eq!(bounds.min.y, -0.5);
    assert_relative_eq!(bounds.max.y, 0.5);
}

#[test]
fn cone_drops_the_pointed_cap() {
    let (mesh, _) = build_cylinder(0.0, 0.5, 1.0, 16, Tolerance::WELD);
    assert_eq!(mesh.vertex_count(), 17 * 2 + 18);
    assert_eq!(mesh.triangle_count(), 16 * 2 + 16);
    let normals = mesh.normals.as_ref().expect("normals");
    assert!(normals.iter().all(|n| n[1] > -0.99 || *n == [0.0, -1.0, 0.0]));
    assert!(!normals.iter().any(|n| *n == [0.0, 1.0, 0.0]));
}

#[test]
fn sphere_welds_seam_and_poles() {
    let (mesh, diag) = build_sphere(0.5, 32, 16, Tolerance::WELD);

    assert!(mesh.validate().is_ok());
    assert_eq!(mesh.vertex_count(), 15 * 32 + 2);
    assert!(diag.is_watertight());
    assert!(diag.is_manifold());

    let normals = mesh.normals.as_ref().expect("normals");
    for (p, n) in mesh.positions.iter().zip(normals) {
        let outward = p[0] * n[0] + p[1] * n[1] + p[2] * n[2];
        assert!(outward > 0.0, "normal {n:?} at {p:?} points inward");
    }
}

#[test]
fn plane_faces_positive_z() {
    let (mesh, diag) = build_plane(2.0, 1.0, Tolerance::WELD);

    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(diag.open_edge_count, 4);
    for n in mesh.normals.as_ref().expect("normals") {
        assert_eq!(*n, [0.0, 0.0, 1.0]);
    }

    let bounds = mesh.bounds().expect("bounds");
    assert_relative_eq!(bounds.max.x, 1.0);
    assert_relative_eq!(bounds.max.y, 0.5);
    assert_relative_eq!(bounds.max.z, 0.0);
}

#[test]
fn scaling_stretches_bounds() {
    let (mesh, _) = build_box(1.0, 1.0, 1.0, Tolerance::WELD);
    let scaled = mesh.scaled(2.0, 3.0, 4.0);
    let size = scaled.bounds().expect("bounds").size();
    assert_relative_eq!(size.x, 2.0);
    assert_relative_eq!(size.y, 3.0);
    assert_relative_eq!(size.z, 4.0);
    assert_relative_eq!(signed_volume(&scaled), 24.0, epsilon = 1e-9);
}

#[test]
fn mirrored_scale_keeps_outward_winding() {
    let (mesh, _) = build_box(1.0, 1.0, 1.0, Tolerance::WELD);
    let mirrored = mesh.scaled(-1.0, 1.0, 1.0);
    assert!(signed_volume(&mirrored) > 0.0);
    assert_ne!(mirrored.indices, mesh.indices);
}
