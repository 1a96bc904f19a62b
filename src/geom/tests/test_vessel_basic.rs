use super::super::*;
use approx::assert_relative_eq;

fn reference_dims() -> VesselDimensions {
    VesselDimensions {
        radius_top: 0.4,
        radius_bottom: 1.0,
        height: 2.0,
        mid_radius: 0.8,
        rim_thickness: 0.1,
        neck_height: 0.8,
        neck_radius: 0.3,
    }
}

#[test]
fn profile_rings_follow_dimensions() {
    let mut diag = GeomMeshDiagnostics::default();
    let dims = reference_dims().sanitized(Tolerance::MIN_EXTENT, &mut diag);
    assert_eq!(diag.clamped_input_count, 0);

    let profile = VesselProfile::from_dimensions(&dims);
    let expected_heights = [0.0, 1.2, 1.2, 2.0];
    let expected_radii = [1.0, 0.8, 0.3, 0.5];
    for (got, want) in profile.heights().into_iter().zip(expected_heights) {
        assert_relative_eq!(got, want, epsilon = 1e-12);
    }
    for (got, want) in profile.radii().into_iter().zip(expected_radii) {
        assert_relative_eq!(got, want, epsilon = 1e-12);
    }
}

#[test]
fn vessel_is_open_at_rim_and_capped_at_base() {
    let (mesh, diag) = build_vessel(&reference_dims(), VesselOptions::default(), Tolerance::WELD);

    assert!(mesh.validate().is_ok());
    assert!(!diag.fallback_used);
    // Four rings of 32 samples plus the base center.
    assert_eq!(mesh.vertex_count(), 4 * 32 + 1);
    assert_eq!(mesh.triangle_count(), 3 * 32 * 2 + 32);
    assert_eq!(diag.open_edge_count, 32);
    assert_eq!(diag.non_manifold_edge_count, 0);

    let bounds = mesh.bounds().expect("bounds");
    assert_relative_eq!(bounds.min.y, 0.0, epsilon = 1e-12);
    assert_relative_eq!(bounds.max.y, 2.0, epsilon = 1e-12);
    assert_relative_eq!(bounds.max.x, 1.0, epsilon = 1e-9);
}

#[test]
fn vessel_without_base_cap_has_two_open_rings() {
    let options = VesselOptions::default().with_base_cap(false);
    let (mesh, diag) = build_vessel(&reference_dims(), options, Tolerance::WELD);
    assert_eq!(mesh.vertex_count(), 4 * 32);
    assert_eq!(diag.open_edge_count, 64);
}

#[test]
fn segment_count_is_configurable() {
    let options = VesselOptions::default().with_segments(12);
    let (mesh, _) = build_vessel(&VesselDimensions::default(), options, Tolerance::WELD);
    assert_eq!(mesh.vertex_count(), 4 * 12 + 1);
}

#[test]
fn degenerate_inputs_are_clamped() {
    let dims = VesselDimensions {
        radius_top: -1.0,
        radius_bottom: 0.0,
        height: -2.0,
        mid_radius: f64::NAN,
        rim_thickness: -0.5,
        neck_height: 10.0,
        neck_radius: f64::INFINITY,
    };
    let mut diag = GeomMeshDiagnostics::default();
    let clamped = dims.sanitized(Tolerance::MIN_EXTENT, &mut diag);

    assert_eq!(clamped.radius_top, Tolerance::MIN_EXTENT.eps);
    assert_eq!(clamped.radius_bottom, Tolerance::MIN_EXTENT.eps);
    assert_eq!(clamped.height, Tolerance::MIN_EXTENT.eps);
    assert_eq!(clamped.mid_radius, VesselDimensions::DEFAULT_MID_RADIUS);
    assert_eq!(clamped.rim_thickness, 0.0);
    assert_eq!(clamped.neck_radius, VesselDimensions::DEFAULT_NECK_RADIUS);
    assert!(clamped.neck_height <= clamped.height);
    assert_eq!(diag.clamped_input_count, diag.warnings.len());
    assert!(diag.clamped_input_count >= 7);
}

#[test]
fn neck_is_kept_below_rim() {
    let dims = VesselDimensions {
        neck_height: 3.5,
        ..VesselDimensions::default()
    };
    let mut diag = GeomMeshDiagnostics::default();
    let clamped = dims.sanitized(Tolerance::MIN_EXTENT, &mut diag);
    assert!(clamped.neck_height < clamped.height);
    assert_eq!(diag.clamped_input_count, 1);

    let profile = VesselProfile::from_dimensions(&clamped);
    assert!(profile.heights()[2] > 0.0);
}

#[test]
fn short_vessel_rings_never_fold() {
    let dims = VesselDimensions {
        height: 1.0,
        ..VesselDimensions::default()
    };
    let mut diag = GeomMeshDiagnostics::default();
    let clamped = dims.sanitized(Tolerance::MIN_EXTENT, &mut diag);
    assert_relative_eq!(clamped.neck_height, 0.4, epsilon = 1e-12);
    assert_eq!(diag.clamped_input_count, 1);
    assert!(diag.warnings[0].starts_with("neckHeight"));

    let heights = VesselProfile::from_dimensions(&clamped).heights();
    assert!(heights.windows(2).all(|w| w[0] <= w[1]), "{heights:?}");

    let (mesh, diag) = build_vessel(&dims, VesselOptions::default(), Tolerance::WELD);
    assert!(mesh.validate().is_ok());
    assert_eq!(diag.clamped_input_count, 1);
}

#[test]
fn ring_heights_are_ordered_for_any_neck() {
    for height in [0.5, 1.0, 2.0, 3.0] {
        for neck_height in [0.0, 0.2, 0.6, 1.5, 4.0] {
            let dims = VesselDimensions { height, neck_height, ..VesselDimensions::default() };
            let mut diag = GeomMeshDiagnostics::default();
            let heights = VesselProfile::from_dimensions(&dims.sanitized(Tolerance::MIN_EXTENT, &mut diag)).heights();
            assert!(heights.windows(2).all(|w| w[0] <= w[1]), "h={height} neck={neck_height}: {heights:?}");
        }
    }
}

#[test]
fn degenerate_vessel_still_builds() {
    let dims = VesselDimensions {
        height: 0.0,
        radius_bottom: -3.0,
        ..VesselDimensions::default()
    };
    let (mesh, diag) = build_vessel(&dims, VesselOptions::default(), Tolerance::WELD);
    assert!(mesh.validate().is_ok());
    assert!(!mesh.is_empty());
    assert!(diag.clamped_input_count >= 2);
}

#[test]
fn rebuilding_is_deterministic() {
    let (a, _) = build_vessel(&VesselDimensions::default(), VesselOptions::default(), Tolerance::WELD);
    let (b, _) = build_vessel(&VesselDimensions::default(), VesselOptions::default(), Tolerance::WELD);
    assert_eq!(a.positions, b.positions);
    assert_eq!(a.indices, b.indices);
}
