use super::diagnostics::GeomMeshDiagnostics;
use super::mesh::{GeomMesh, finalize_mesh};
use super::{Point3, Tolerance, Vec3};
use std::f64::consts::TAU;

/// Which ends of an open profile are closed with a disc fanned to the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevolveCaps {
    pub start: bool,
    pub end: bool,
}

impl RevolveCaps {
    pub const NONE: Self = Self { start: false, end: false };
    pub const START: Self = Self { start: true, end: false };
    pub const END: Self = Self { start: false, end: true };
    pub const BOTH: Self = Self { start: true, end: true };
}

/// Options for controlling revolve mesh generation.
#[derive(Debug, Clone, Copy)]
pub struct RevolveOptions {
    /// Number of angular steps around the axis.
    pub steps: usize,
    /// Whether to weld seam vertices for full 360° revolutions
    pub weld_seam: bool,
}

impl RevolveOptions {
    #[must_use]
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    #[must_use]
    pub fn with_weld_seam(mut self, weld_seam: bool) -> Self {
        self.weld_seam = weld_seam;
        self
    }
}

impl Default for RevolveOptions {
    fn default() -> Self {
        Self {
            steps: 32,
            weld_seam: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RevolveError {
    #[error("revolve axis must be finite and non-zero")]
    InvalidAxis,
    #[error("profile points must be finite")]
    NonFinitePoint,
    #[error("profile requires at least {min} unique points")]
    NotEnoughPoints { min: usize },
    #[error("revolve angle must be between 0 and 2π radians")]
    InvalidAngle,
    #[error("revolve requires at least 3 angular steps, got {steps}")]
    TooFewSteps { steps: usize },
    #[error("profile intersects axis of revolution")]
    ProfileIntersectsAxis,
}

/// Revolve an open polyline profile around an axis.
///
/// # Arguments
/// * `profile` - Points defining the profile, in order along the silhouette
/// * `axis_start` - Start point of the axis of revolution
/// * `axis_end` - End point of the axis of revolution
/// * `angle` - Angle of revolution in radians (0 < angle <= 2π)
/// * `caps` - Close the first and/or last profile point with a disc
///
/// Side triangles face away from the axis. Caps are oriented consistently
/// with the sides.
pub fn revolve_polyline_with_options(
    profile: &[Point3],
    axis_start: Point3,
    axis_end: Point3,
    angle: f64,
    caps: RevolveCaps,
    options: RevolveOptions,
    tol: Tolerance,
) -> Result<(GeomMesh, GeomMeshDiagnostics), RevolveError> {
    if !angle.is_finite() || angle <= 0.0 || angle > TAU + tol.eps {
        return Err(RevolveError::InvalidAngle);
    }
    let angle = angle.min(TAU);
    if options.steps < 3 {
        return Err(RevolveError::TooFewSteps { steps: options.steps });
    }

    let (axis_origin, axis_dir) = validate_axis(axis_start, axis_end)?;
    let cleaned = clean_profile(profile, tol)?;

    if profile_intersects_axis(&cleaned, axis_origin, axis_dir, tol) {
        return Err(RevolveError::ProfileIntersectsAxis);
    }

    let weld_seam = options.weld_seam && (angle - TAU).abs() < tol.eps;
    let mut soup = build_revolved_mesh_rodrigues(
        &cleaned,
        axis_origin,
        axis_dir,
        angle,
        options.steps,
        weld_seam,
    );
    orient_away_from_axis(&soup.points, &mut soup.indices, axis_origin, axis_dir);

    if caps.start {
        add_axis_cap(&mut soup, &cleaned, 0, axis_origin, axis_dir);
    }
    if caps.end {
        add_axis_cap(&mut soup, &cleaned, cleaned.len() - 1, axis_origin, axis_dir);
    }

    Ok(finalize_mesh(soup.points, Some(soup.uvs), soup.indices, tol))
}

fn validate_axis(axis_start: Point3, axis_end: Point3) -> Result<(Point3, Vec3), RevolveError> {
    if !axis_start.is_finite() || !axis_end.is_finite() {
        return Err(RevolveError::InvalidAxis);
    }
    let axis_dir = axis_end
        .sub_point(axis_start)
        .normalized()
        .ok_or(RevolveError::InvalidAxis)?;
    Ok((axis_start, axis_dir))
}

/// Drop consecutive duplicates; at least two distinct points must remain.
fn clean_profile(points: &[Point3], tol: Tolerance) -> Result<Vec<Point3>, RevolveError> {
    if points.iter().any(|p| !p.is_finite()) {
        return Err(RevolveError::NonFinitePoint);
    }

    let mut cleaned: Vec<Point3> = Vec::with_capacity(points.len());
    for p in points.iter().copied() {
        if cleaned.last().is_some_and(|&prev| tol.approx_eq_point3(prev, p)) {
            continue;
        }
        cleaned.push(p);
    }

    if cleaned.len() < 2 {
        return Err(RevolveError::NotEnoughPoints { min: 2 });
    }
    Ok(cleaned)
}

fn project_onto_axis(point: Point3, axis_origin: Point3, axis_dir: Vec3) -> Point3 {
    let t = point.sub_point(axis_origin).dot(axis_dir);
    axis_origin.add_vec(axis_dir * t)
}

/// Check if any profile point lies on or very close to the axis of revolution.
fn profile_intersects_axis(profile: &[Point3], axis_origin: Point3, axis_dir: Vec3, tol: Tolerance) -> bool {
    profile.iter().any(|&point| {
        let closest = project_onto_axis(point, axis_origin, axis_dir);
        point.sub_point(closest).length_squared() <= tol.eps_squared()
    })
}

/// Rodrigues' rotation of a point around an axis through `axis_origin`.
fn rotate_point_around_axis(point: Point3, axis_origin: Point3, axis_dir: Vec3, angle: f64) -> Point3 {
    let v = point.sub_point(axis_origin);
    let (sin_angle, cos_angle) = angle.sin_cos();

    let v_rot = v * cos_angle + axis_dir.cross(v) * sin_angle + axis_dir * (axis_dir.dot(v) * (1.0 - cos_angle));

    axis_origin.add_vec(v_rot)
}

struct RevolvedSoup {
    points: Vec<Point3>,
    uvs: Vec<[f64; 2]>,
    indices: Vec<u32>,
    /// Number of stored rings; with a welded seam the last step wraps to ring 0.
    ring_count: usize,
    steps: usize,
    weld_seam: bool,
}

impl RevolvedSoup {
    fn vertex(&self, ring: usize, profile_idx: usize, profile_len: usize) -> u32 {
        (ring * profile_len + profile_idx) as u32
    }

    fn next_ring(&self, ring: usize) -> usize {
        if self.weld_seam && ring + 1 == self.ring_count {
            0
        } else {
            ring + 1
        }
    }
}

fn build_revolved_mesh_rodrigues(
    profile: &[Point3],
    axis_origin: Point3,
    axis_dir: Vec3,
    total_angle: f64,
    steps: usize,
    weld_seam: bool,
) -> RevolvedSoup {
    let profile_len = profile.len();
    let ring_count = if weld_seam { steps } else { steps + 1 };

    let mut points = Vec::with_capacity(ring_count * profile_len);
    let mut uvs = Vec::with_capacity(ring_count * profile_len);
    for step in 0..ring_count {
        let u = step as f64 / steps as f64;
        for (profile_idx, &profile_point) in profile.iter().enumerate() {
            points.push(rotate_point_around_axis(
                profile_point,
                axis_origin,
                axis_dir,
                u * total_angle,
            ));
            uvs.push([u, profile_idx as f64 / (profile_len - 1) as f64]);
        }
    }

    let mut soup = RevolvedSoup {
        points,
        uvs,
        indices: Vec::with_capacity(steps * (profile_len - 1) * 6),
        ring_count,
        steps,
        weld_seam,
    };

    for step in 0..steps {
        let next = soup.next_ring(step);
        for i in 0..profile_len - 1 {
            let i0 = soup.vertex(step, i, profile_len);
            let i1 = soup.vertex(step, i + 1, profile_len);
            let i2 = soup.vertex(next, i + 1, profile_len);
            let i3 = soup.vertex(next, i, profile_len);
            soup.indices.extend_from_slice(&[i0, i1, i2, i0, i2, i3]);
        }
    }

    soup
}

/// Flip every triangle when the area-weighted normals point towards the axis.
fn orient_away_from_axis(points: &[Point3], indices: &mut [u32], axis_origin: Point3, axis_dir: Vec3) {
    let mut outwardness = 0.0;
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (
            points[tri[0] as usize],
            points[tri[1] as usize],
            points[tri[2] as usize],
        );
        let normal = b.sub_point(a).cross(c.sub_point(a));
        let centroid = Point3::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0, (a.z + b.z + c.z) / 3.0);
        let radial = centroid.sub_point(project_onto_axis(centroid, axis_origin, axis_dir));
        outwardness += normal.dot(radial);
    }
    if outwardness < 0.0 {
        for tri in indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }
}

/// Fan the ring of `profile_idx` to its projection on the axis.
fn add_axis_cap(
    soup: &mut RevolvedSoup,
    profile: &[Point3],
    profile_idx: usize,
    axis_origin: Point3,
    axis_dir: Vec3,
) {
    let profile_len = profile.len();
    let center = soup.points.len() as u32;
    soup.points.push(project_onto_axis(profile[profile_idx], axis_origin, axis_dir));
    soup.uvs.push([0.5, profile_idx as f64 / (profile_len - 1) as f64]);

    // Winding is settled by the consistency pass in `finalize_mesh`.
    for step in 0..soup.steps {
        let next = soup.next_ring(step);
        let a = soup.vertex(step, profile_idx, profile_len);
        let b = soup.vertex(next, profile_idx, profile_len);
        soup.indices.extend_from_slice(&[center, b, a]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_quarter_turn_about_y() {
        let p = rotate_point_around_axis(
            Point3::new(1.0, 0.0, 0.0),
            Point3::ORIGIN,
            Vec3::Y,
            std::f64::consts::FRAC_PI_2,
        );
        assert!(Tolerance::WELD.approx_eq_point3(p, Point3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn clean_profile_drops_consecutive_duplicates() {
        let cleaned = clean_profile(
            &[Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)],
            Tolerance::WELD,
        )
        .expect("two unique points");
        assert_eq!(cleaned.len(), 2);
    }
}
