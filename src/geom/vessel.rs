//! Lathe-revolved vessel (vase) silhouette.
//!
//! The profile is four rings in fixed order: bottom, middle, neck and rim. It
//! is revolved a full turn about +Y and the base is closed with a disc; the rim
//! stays open.

use log::warn;

use super::diagnostics::GeomMeshDiagnostics;
use super::mesh::GeomMesh;
use super::primitives::build_cylinder;
use super::revolve::{RevolveCaps, RevolveOptions, revolve_polyline_with_options};
use super::{Point3, Tolerance, Transform, Vec3};

/// Middle ring sits at this fraction of the vessel height.
pub const MID_HEIGHT_FRACTION: f64 = 0.6;

/// Dimensions of a vessel. Every field is clamped by [`VesselDimensions::sanitized`]
/// before a profile is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VesselDimensions {
    pub radius_top: f64,
    pub radius_bottom: f64,
    pub height: f64,
    pub mid_radius: f64,
    pub rim_thickness: f64,
    pub neck_height: f64,
    pub neck_radius: f64,
}

impl VesselDimensions {
    pub const DEFAULT_RADIUS_TOP: f64 = 0.6;
    pub const DEFAULT_RADIUS_BOTTOM: f64 = 1.0;
    pub const DEFAULT_HEIGHT: f64 = 3.0;
    pub const DEFAULT_MID_RADIUS: f64 = 1.1;
    pub const DEFAULT_RIM_THICKNESS: f64 = 0.05;
    pub const DEFAULT_NECK_HEIGHT: f64 = 0.6;
    pub const DEFAULT_NECK_RADIUS: f64 = 0.45;

    /// Clamp every value to a usable range, recording each adjustment.
    ///
    /// Radii and height are clamped to at least `tol.eps`; non-finite values
    /// take their default. The neck ring may not drop below the middle ring,
    /// so `neck_height` is capped at `(1 - MID_HEIGHT_FRACTION) * height`.
    /// Rim thickness may be zero.
    #[must_use]
    pub fn sanitized(self, tol: Tolerance, diagnostics: &mut GeomMeshDiagnostics) -> Self {
        let radius_top = clamp_field("radiusTop", self.radius_top, Self::DEFAULT_RADIUS_TOP, tol, diagnostics);
        let radius_bottom =
            clamp_field("radiusBottom", self.radius_bottom, Self::DEFAULT_RADIUS_BOTTOM, tol, diagnostics);
        let height = clamp_field("height", self.height, Self::DEFAULT_HEIGHT, tol, diagnostics);
        let mid_radius = clamp_field("midRadius", self.mid_radius, Self::DEFAULT_MID_RADIUS, tol, diagnostics);
        let neck_radius = clamp_field("neckRadius", self.neck_radius, Self::DEFAULT_NECK_RADIUS, tol, diagnostics);

        let rim_thickness = if self.rim_thickness.is_finite() && self.rim_thickness >= 0.0 {
            self.rim_thickness
        } else {
            let clamped = if self.rim_thickness.is_finite() { 0.0 } else { Self::DEFAULT_RIM_THICKNESS };
            record("rimThickness", self.rim_thickness, clamped, diagnostics);
            clamped
        };

        // Ring heights must be non-decreasing: bottom, middle, neck, rim.
        let neck_limit = height - MID_HEIGHT_FRACTION * height;
        let neck_height = clamp_field("neckHeight", self.neck_height, Self::DEFAULT_NECK_HEIGHT, tol, diagnostics);
        let neck_height = if neck_height > neck_limit {
            record("neckHeight", neck_height, neck_limit, diagnostics);
            neck_limit
        } else {
            neck_height
        };

        Self {
            radius_top,
            radius_bottom,
            height,
            mid_radius,
            rim_thickness,
            neck_height,
            neck_radius,
        }
    }
}

fn clamp_field(
    field: &str,
    value: f64,
    fallback: f64,
    tol: Tolerance,
    diagnostics: &mut GeomMeshDiagnostics,
) -> f64 {
    let clamped = tol.clamp_extent(value, fallback);
    if clamped != value {
        record(field, value, clamped, diagnostics);
    }
    clamped
}

fn record(field: &str, value: f64, clamped: f64, diagnostics: &mut GeomMeshDiagnostics) {
    warn!("vessel {field} {value} clamped to {clamped}");
    diagnostics.record_clamp(field, value, clamped);
}

impl Default for VesselDimensions {
    fn default() -> Self {
        Self {
            radius_top: Self::DEFAULT_RADIUS_TOP,
            radius_bottom: Self::DEFAULT_RADIUS_BOTTOM,
            height: Self::DEFAULT_HEIGHT,
            mid_radius: Self::DEFAULT_MID_RADIUS,
            rim_thickness: Self::DEFAULT_RIM_THICKNESS,
            neck_height: Self::DEFAULT_NECK_HEIGHT,
            neck_radius: Self::DEFAULT_NECK_RADIUS,
        }
    }
}

/// One horizontal ring of the silhouette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileRing {
    pub height: f64,
    pub radius: f64,
}

/// The four-ring silhouette: bottom, middle, neck, rim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VesselProfile {
    rings: [ProfileRing; 4],
}

impl VesselProfile {
    /// Build the profile from already sanitized dimensions.
    #[must_use]
    pub fn from_dimensions(dims: &VesselDimensions) -> Self {
        Self {
            rings: [
                ProfileRing { height: 0.0, radius: dims.radius_bottom },
                ProfileRing { height: MID_HEIGHT_FRACTION * dims.height, radius: dims.mid_radius },
                ProfileRing { height: dims.height - dims.neck_height, radius: dims.neck_radius },
                ProfileRing { height: dims.height, radius: dims.radius_top + dims.rim_thickness },
            ],
        }
    }

    #[must_use]
    pub fn rings(&self) -> &[ProfileRing; 4] {
        &self.rings
    }

    #[must_use]
    pub fn heights(&self) -> [f64; 4] {
        self.rings.map(|r| r.height)
    }

    #[must_use]
    pub fn radii(&self) -> [f64; 4] {
        self.rings.map(|r| r.radius)
    }

    /// Profile polyline in the XY half-plane (x = radius).
    #[must_use]
    pub fn points(&self) -> Vec<Point3> {
        self.rings
            .iter()
            .map(|r| Point3::new(r.radius, r.height, 0.0))
            .collect()
    }
}

/// Options for vessel synthesis.
#[derive(Debug, Clone, Copy)]
pub struct VesselOptions {
    /// Angular samples per ring.
    pub segments: usize,
    /// Close the base with a disc.
    pub base_cap: bool,
}

impl VesselOptions {
    pub const DEFAULT_SEGMENTS: usize = 32;

    #[must_use]
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    #[must_use]
    pub fn with_base_cap(mut self, base_cap: bool) -> Self {
        self.base_cap = base_cap;
        self
    }
}

impl Default for VesselOptions {
    fn default() -> Self {
        Self {
            segments: Self::DEFAULT_SEGMENTS,
            base_cap: true,
        }
    }
}

/// Revolve the vessel profile. Never fails: if the lathe rejects the profile
/// a capped frustum of the same envelope is returned and flagged as a fallback.
#[must_use]
pub fn build_vessel(
    dims: &VesselDimensions,
    options: VesselOptions,
    tol: Tolerance,
) -> (GeomMesh, GeomMeshDiagnostics) {
    let mut clamp_diag = GeomMeshDiagnostics::default();
    let dims = dims.sanitized(Tolerance::MIN_EXTENT, &mut clamp_diag);
    let profile = VesselProfile::from_dimensions(&dims);

    let caps = if options.base_cap { RevolveCaps::START } else { RevolveCaps::NONE };
    let revolve = RevolveOptions::default()
        .with_steps(options.segments)
        .with_weld_seam(true);

    let (mesh, mut diagnostics) = match revolve_polyline_with_options(
        &profile.points(),
        Point3::ORIGIN,
        Point3::new(0.0, 1.0, 0.0),
        std::f64::consts::TAU,
        caps,
        revolve,
        tol,
    ) {
        Ok(result) => result,
        Err(err) => {
            warn!("vessel lathe failed ({err}); emitting frustum");
            let (mesh, mut diag) = build_cylinder(
                dims.radius_top,
                dims.radius_bottom,
                dims.height,
                options.segments,
                tol,
            );
            // Frustum is centered; lift it so the base rests on y = 0.
            let lift = Transform::translate(Vec3::new(0.0, dims.height * 0.5, 0.0));
            diag.fallback_used = true;
            diag.add_warning(format!("vessel lathe failed: {err}"));
            (mesh.transformed(lift), diag)
        }
    };

    diagnostics.merge_inputs(&clamp_diag);
    (mesh, diagnostics)
}
