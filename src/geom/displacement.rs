//! Pillow displacement for cushions.
//!
//! A subdivided box is puffed with a sine sag field over the normalized
//! footprint `(nx, nz) ∈ [-1, 1]²` and its outer corners are pushed out, then
//! welded and re-shaded.
//!
//! # Example
//!
//! ```ignore
//! let dims = CushionDimensions { width: 2.0, height: 0.8, depth: 2.0 };
//! let (mesh, diag) = build_cushion(&dims, CushionOptions::default(), Tolerance::WELD);
//! ```

use std::f64::consts::PI;

use log::warn;

use super::diagnostics::GeomMeshDiagnostics;
use super::mesh::{GeomMesh, finalize_mesh, weld_mesh_vertices};
use super::primitives::box_grid;
use super::{Point3, Tolerance};

/// Tunable constants of the pillow field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CushionOptions {
    /// Amplitude of the vertical sine sag.
    pub sag: f64,
    /// Mean of `|nx|` and `|nz|` above which a vertex counts as a corner.
    pub corner_threshold: f64,
    /// Horizontal scale applied to corner vertices.
    pub corner_scale: f64,
    /// Box subdivisions along `[x, y, z]`.
    pub segments: [usize; 3],
}

impl CushionOptions {
    pub const DEFAULT_SAG: f64 = 0.1;
    pub const DEFAULT_CORNER_THRESHOLD: f64 = 0.9;
    pub const DEFAULT_CORNER_SCALE: f64 = 1.2;
    pub const DEFAULT_SEGMENTS: [usize; 3] = [20, 10, 20];

    #[must_use]
    pub const fn sag(mut self, sag: f64) -> Self {
        self.sag = sag;
        self
    }

    #[must_use]
    pub const fn corner_threshold(mut self, threshold: f64) -> Self {
        self.corner_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn corner_scale(mut self, scale: f64) -> Self {
        self.corner_scale = scale;
        self
    }

    #[must_use]
    pub const fn segments(mut self, segments: [usize; 3]) -> Self {
        self.segments = segments;
        self
    }
}

impl Default for CushionOptions {
    fn default() -> Self {
        Self {
            sag: Self::DEFAULT_SAG,
            corner_threshold: Self::DEFAULT_CORNER_THRESHOLD,
            corner_scale: Self::DEFAULT_CORNER_SCALE,
            segments: Self::DEFAULT_SEGMENTS,
        }
    }
}

/// Displacement of one vertex at normalized footprint coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PillowDisplacement {
    /// Vertical offset added to `y`.
    pub dy: f64,
    /// Factor applied to `x` and `z` (1.0 away from the corners).
    pub horizontal_scale: f64,
    /// Whether the corner-sharpening branch fired.
    pub corner: bool,
}

/// `dy = sag · sin(π·nx) · sin(π·nz)`; corners where `(|nx| + |nz|) / 2`
/// exceeds the threshold are scaled horizontally.
#[must_use]
pub fn pillow_displacement(nx: f64, nz: f64, options: &CushionOptions) -> PillowDisplacement {
    let dy = options.sag * (PI * nx).sin() * (PI * nz).sin();
    let corner = (nx.abs() + nz.abs()) / 2.0 > options.corner_threshold;
    PillowDisplacement {
        dy,
        horizontal_scale: if corner { options.corner_scale } else { 1.0 },
        corner,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CushionDimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl CushionDimensions {
    pub const DEFAULT_WIDTH: f64 = 2.0;
    pub const DEFAULT_HEIGHT: f64 = 0.8;
    pub const DEFAULT_DEPTH: f64 = 2.0;
}

impl Default for CushionDimensions {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            depth: Self::DEFAULT_DEPTH,
        }
    }
}

/// Build the displaced cushion. Degenerate extents are clamped to
/// [`Tolerance::MIN_EXTENT`] first.
#[must_use]
pub fn build_cushion(
    dims: &CushionDimensions,
    options: CushionOptions,
    tol: Tolerance,
) -> (GeomMesh, GeomMeshDiagnostics) {
    let mut inputs = GeomMeshDiagnostics::default();
    let min = Tolerance::MIN_EXTENT;
    let mut extent = |field: &str, value: f64, fallback: f64| {
        let clamped = min.clamp_extent(value, fallback);
        if clamped != value {
            warn!("cushion {field} {value} clamped to {clamped}");
            inputs.record_clamp(field, value, clamped);
        }
        clamped
    };
    let width = extent("width", dims.width, CushionDimensions::DEFAULT_WIDTH);
    let height = extent("height", dims.height, CushionDimensions::DEFAULT_HEIGHT);
    let depth = extent("depth", dims.depth, CushionDimensions::DEFAULT_DEPTH);

    // Weld before displacing so vertices shared by two faces cannot land on
    // opposite sides of the corner threshold.
    let soup = box_grid(width, height, depth, options.segments);
    let (mut points, uvs, indices, welded) =
        weld_mesh_vertices(soup.points, Some(soup.uvs.as_slice()), soup.indices, tol);

    let half_w = width / 2.0;
    let half_d = depth / 2.0;
    for p in &mut points {
        *p = displace_point(*p, half_w, half_d, &options);
    }

    let (mesh, mut diagnostics) = finalize_mesh(points, uvs, indices, tol);
    diagnostics.welded_vertex_count += welded;
    diagnostics.merge_inputs(&inputs);
    (mesh, diagnostics)
}

fn displace_point(p: Point3, half_w: f64, half_d: f64, options: &CushionOptions) -> Point3 {
    let d = pillow_displacement(p.x / half_w, p.z / half_d, options);
    Point3::new(p.x * d.horizontal_scale, p.y + d.dy, p.z * d.horizontal_scale)
}
