//! Analytic primitives used by the literal part lists.
//!
//! Conventions follow common scene-graph primitives: boxes and cylinders are
//! centered on the origin, cylinders stand along +Y, planes lie in XY facing +Z,
//! and the angular parameter runs from +Z towards +X.

use std::f64::consts::{PI, TAU};

use super::diagnostics::GeomMeshDiagnostics;
use super::mesh::{GeomMesh, finalize_flat_mesh, finalize_mesh};
use super::{Point3, Tolerance, Vec3};

/// Raw triangle soup with per-vertex attributes, before welding.
#[derive(Debug, Clone, Default)]
pub struct TriangleSoup {
    pub points: Vec<Point3>,
    pub uvs: Vec<[f64; 2]>,
    pub normals: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
}

impl TriangleSoup {
    fn push_vertex(&mut self, p: Point3, uv: [f64; 2], n: Vec3) -> u32 {
        let idx = self.points.len() as u32;
        self.points.push(p);
        self.uvs.push(uv);
        self.normals.push(n.to_array());
        idx
    }

    /// Faceted mesh: split vertices and authored normals are preserved.
    #[must_use]
    pub fn into_flat_mesh(self, tol: Tolerance) -> (GeomMesh, GeomMeshDiagnostics) {
        let positions = self.points.into_iter().map(Point3::to_array).collect();
        finalize_flat_mesh(positions, self.uvs, self.normals, self.indices, tol)
    }

    /// Smooth mesh: vertices are welded and normals recomputed.
    #[must_use]
    pub fn into_smooth_mesh(self, tol: Tolerance) -> (GeomMesh, GeomMeshDiagnostics) {
        finalize_mesh(self.points, Some(self.uvs), self.indices, tol)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Box
// ─────────────────────────────────────────────────────────────────────────────

/// Face frames of an axis-aligned box: `(normal, u, v)` with `u × v = normal`.
const BOX_FACES: [([f64; 3], [f64; 3], [f64; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

fn axis_component(axis: [f64; 3], values: [f64; 3]) -> f64 {
    axis[0].abs() * values[0] + axis[1].abs() * values[1] + axis[2].abs() * values[2]
}

fn axis_segments(axis: [f64; 3], segments: [usize; 3]) -> usize {
    let idx = axis.iter().position(|c| c.abs() > 0.5).unwrap_or(0);
    segments[idx].max(1)
}

/// Box surface as six independent face grids, `segments = [x, y, z]`.
#[must_use]
pub fn box_grid(width: f64, height: f64, depth: f64, segments: [usize; 3]) -> TriangleSoup {
    let size = [width, height, depth];
    let mut soup = TriangleSoup::default();

    for (normal, u_axis, v_axis) in BOX_FACES {
        let n = Vec3::from_array(normal);
        let u = Vec3::from_array(u_axis);
        let v = Vec3::from_array(v_axis);

        let size_u = axis_component(u_axis, size);
        let size_v = axis_component(v_axis, size);
        let half_n = axis_component(normal, size) * 0.5;
        let su = axis_segments(u_axis, segments);
        let sv = axis_segments(v_axis, segments);

        let corner = Point3::ORIGIN
            .add_vec(n * half_n)
            .add_vec(u * (-0.5 * size_u))
            .add_vec(v * (-0.5 * size_v));

        let base = soup.points.len() as u32;
        for j in 0..=sv {
            let fv = j as f64 / sv as f64;
            for i in 0..=su {
                let fu = i as f64 / su as f64;
                let p = corner.add_vec(u * (fu * size_u)).add_vec(v * (fv * size_v));
                soup.push_vertex(p, [fu, fv], n);
            }
        }

        let row = (su + 1) as u32;
        for j in 0..sv as u32 {
            for i in 0..su as u32 {
                let a = base + j * row + i;
                let b = a + 1;
                let c = a + row + 1;
                let d = a + row;
                soup.indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }
    }

    soup
}

/// Axis-aligned box with hard edges.
#[must_use]
pub fn build_box(width: f64, height: f64, depth: f64, tol: Tolerance) -> (GeomMesh, GeomMeshDiagnostics) {
    box_grid(width, height, depth, [1, 1, 1]).into_flat_mesh(tol)
}

// ─────────────────────────────────────────────────────────────────────────────
// Cylinder / frustum
// ─────────────────────────────────────────────────────────────────────────────

/// Capped frustum along +Y. A radius at or below `tol.eps` drops that cap.
#[must_use]
pub fn build_cylinder(
    radius_top: f64,
    radius_bottom: f64,
    height: f64,
    radial_segments: usize,
    tol: Tolerance,
) -> (GeomMesh, GeomMeshDiagnostics) {
    let segments = radial_segments.max(3);
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;
    let mut soup = TriangleSoup::default();

    // Side: one extra column so the UV seam can be split.
    let side_base = soup.points.len() as u32;
    for j in 0..=segments {
        let u = j as f64 / segments as f64;
        let theta = u * TAU;
        let (sin, cos) = theta.sin_cos();
        let normal = Vec3::new(sin, slope, cos).normalized().unwrap_or(Vec3::Y);
        soup.push_vertex(
            Point3::new(radius_bottom * sin, -half, radius_bottom * cos),
            [u, 0.0],
            normal,
        );
        soup.push_vertex(
            Point3::new(radius_top * sin, half, radius_top * cos),
            [u, 1.0],
            normal,
        );
    }
    for j in 0..segments as u32 {
        let b0 = side_base + j * 2;
        let t0 = b0 + 1;
        let b1 = b0 + 2;
        let t1 = b0 + 3;
        soup.indices.extend_from_slice(&[b0, b1, t0, t0, b1, t1]);
    }

    if radius_top > tol.eps {
        push_cap(&mut soup, radius_top, half, segments, true);
    }
    if radius_bottom > tol.eps {
        push_cap(&mut soup, radius_bottom, -half, segments, false);
    }

    soup.into_flat_mesh(tol)
}

fn push_cap(soup: &mut TriangleSoup, radius: f64, y: f64, segments: usize, top: bool) {
    let normal = if top { Vec3::Y } else { -Vec3::Y };
    let center = soup.push_vertex(Point3::new(0.0, y, 0.0), [0.5, 0.5], normal);
    let ring = soup.points.len() as u32;
    for j in 0..=segments {
        let theta = j as f64 / segments as f64 * TAU;
        let (sin, cos) = theta.sin_cos();
        soup.push_vertex(
            Point3::new(radius * sin, y, radius * cos),
            [0.5 + 0.5 * sin, 0.5 + 0.5 * cos],
            normal,
        );
    }
    for j in 0..segments as u32 {
        let a = ring + j;
        let b = a + 1;
        if top {
            soup.indices.extend_from_slice(&[center, a, b]);
        } else {
            soup.indices.extend_from_slice(&[center, b, a]);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sphere / plane
// ─────────────────────────────────────────────────────────────────────────────

/// UV sphere centered on the origin. Seam and pole vertices are welded.
#[must_use]
pub fn build_sphere(
    radius: f64,
    width_segments: usize,
    height_segments: usize,
    tol: Tolerance,
) -> (GeomMesh, GeomMeshDiagnostics) {
    let w = width_segments.max(3);
    let h = height_segments.max(2);
    let mut soup = TriangleSoup::default();

    for i in 0..=h {
        let v = i as f64 / h as f64;
        let phi = v * PI;
        for j in 0..=w {
            let u = j as f64 / w as f64;
            let theta = u * TAU;
            let dir = Vec3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos());
            soup.push_vertex(Point3::ORIGIN.add_vec(dir * radius), [u, 1.0 - v], dir);
        }
    }

    let row = (w + 1) as u32;
    for i in 0..h as u32 {
        for j in 0..w as u32 {
            let a = i * row + j;
            let b = a + 1;
            let c = a + row;
            let d = c + 1;
            soup.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    soup.into_smooth_mesh(tol)
}

/// Single-sided plane in XY facing +Z.
#[must_use]
pub fn build_plane(width: f64, height: f64, tol: Tolerance) -> (GeomMesh, GeomMeshDiagnostics) {
    let hw = width * 0.5;
    let hh = height * 0.5;
    let n = Vec3::new(0.0, 0.0, 1.0);
    let mut soup = TriangleSoup::default();
    let a = soup.push_vertex(Point3::new(-hw, -hh, 0.0), [0.0, 0.0], n);
    let b = soup.push_vertex(Point3::new(hw, -hh, 0.0), [1.0, 0.0], n);
    let c = soup.push_vertex(Point3::new(hw, hh, 0.0), [1.0, 1.0], n);
    let d = soup.push_vertex(Point3::new(-hw, hh, 0.0), [0.0, 1.0], n);
    soup.indices.extend_from_slice(&[a, b, c, a, c, d]);
    soup.into_flat_mesh(tol)
}
