use std::collections::HashMap;

use super::diagnostics::GeomMeshDiagnostics;
use super::{BBox, Point3, Tolerance, Transform, Vec3};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    pub uvs: Option<Vec<[f64; 2]>>,
    pub normals: Option<Vec<[f64; 3]>>,
}

impl GeomMesh {
    /// Create a new mesh with positions and indices only.
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            uvs: None,
            normals: None,
        }
    }

    #[must_use]
    pub fn with_attributes(
        positions: Vec<[f64; 3]>,
        indices: Vec<u32>,
        uvs: Option<Vec<[f64; 2]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Self {
        Self {
            positions,
            indices,
            uvs,
            normals,
        }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len() as u32;
        self.indices.iter().all(|&i| i < n)
    }

    #[must_use]
    pub fn has_triangle_indices(&self) -> bool {
        self.indices.len() % 3 == 0
    }

    /// Returns true if all optional vertex attribute buffers match `positions.len()`.
    #[must_use]
    pub fn has_valid_attribute_lengths(&self) -> bool {
        let n = self.positions.len();
        self.uvs.as_ref().is_none_or(|uvs| uvs.len() == n)
            && self.normals.as_ref().is_none_or(|normals| normals.len() == n)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.has_triangle_indices() {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if !self.has_valid_attribute_lengths() {
            return Err("mesh attribute buffers do not match vertex count".to_string());
        }
        Ok(())
    }

    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        BBox::from_points(self.positions.iter().copied().map(Point3::from_array))
    }

    /// Returns the position buffer as a flat slice: `[x0, y0, z0, x1, y1, z1, ...]`.
    ///
    /// Zero-copy view for wasm adapters that expect packed numeric buffers.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        flatten_f64_array_slice::<3>(&self.positions)
    }

    #[must_use]
    pub fn uvs_flat(&self) -> Option<&[f64]> {
        self.uvs.as_deref().map(flatten_f64_array_slice::<2>)
    }

    #[must_use]
    pub fn normals_flat(&self) -> Option<&[f64]> {
        self.normals.as_deref().map(flatten_f64_array_slice::<3>)
    }

    /// Non-uniform scale about the origin. Normals follow the inverse transpose
    /// and are renormalized.
    #[must_use]
    pub fn scaled(&self, sx: f64, sy: f64, sz: f64) -> Self {
        let positions = self
            .positions
            .iter()
            .map(|p| [p[0] * sx, p[1] * sy, p[2] * sz])
            .collect();
        let normals = self.normals.as_ref().map(|normals| {
            normals
                .iter()
                .map(|n| {
                    Vec3::new(n[0] / sx, n[1] / sy, n[2] / sz)
                        .normalized()
                        .map_or(*n, Vec3::to_array)
                })
                .collect()
        });
        let mut indices = self.indices.clone();
        // A negative determinant mirrors the mesh; restore outward winding.
        if sx * sy * sz < 0.0 {
            flip_all_triangles(&mut indices);
        }
        Self {
            positions,
            indices,
            uvs: self.uvs.clone(),
            normals,
        }
    }

    /// Apply a rigid transform (rotation + translation) to positions and normals.
    #[must_use]
    pub fn transformed(&self, transform: Transform) -> Self {
        let positions = self
            .positions
            .iter()
            .map(|p| transform.apply_point(Point3::from_array(*p)).to_array())
            .collect();
        let normals = self.normals.as_ref().map(|normals| {
            normals
                .iter()
                .map(|n| {
                    transform
                        .apply_vec(Vec3::from_array(*n))
                        .normalized()
                        .map_or(*n, Vec3::to_array)
                })
                .collect()
        });
        Self {
            positions,
            indices: self.indices.clone(),
            uvs: self.uvs.clone(),
            normals,
        }
    }

    /// Append another mesh, offsetting its indices. Attribute buffers are kept
    /// only when both meshes carry them.
    pub fn append(&mut self, other: &GeomMesh) {
        let was_empty = self.positions.is_empty();
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.indices.extend(other.indices.iter().map(|i| i + offset));

        if was_empty {
            self.uvs = other.uvs.clone();
            self.normals = other.normals.clone();
            return;
        }
        self.uvs = match (self.uvs.take(), other.uvs.as_ref()) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend_from_slice(theirs);
                Some(mine)
            }
            _ => None,
        };
        self.normals = match (self.normals.take(), other.normals.as_ref()) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend_from_slice(theirs);
                Some(mine)
            }
            _ => None,
        };
    }
}

fn flatten_f64_array_slice<const N: usize>(data: &[[f64; N]]) -> &[f64] {
    let count = data.len().checked_mul(N).unwrap_or(0);
    let ptr = data.as_ptr().cast::<f64>();
    // SAFETY: `[[f64; N]]` is stored contiguously, and we compute the element count as `len * N`.
    unsafe { std::slice::from_raw_parts(ptr, count) }
}

/// Weld, cull, orient and shade a freshly generated triangle soup.
///
/// Smooth normals are computed after welding, so coincident vertices share
/// shading. Closed meshes with negative signed volume are flipped outward.
pub(crate) fn finalize_mesh(
    points: Vec<Point3>,
    uvs: Option<Vec<[f64; 2]>>,
    indices: Vec<u32>,
    tol: Tolerance,
) -> (GeomMesh, GeomMeshDiagnostics) {
    let (repaired_points, repaired_uvs, repaired_indices, welded_vertex_count) =
        weld_mesh_vertices(points, uvs.as_deref(), indices, tol);

    let (mut repaired_indices, degenerate_triangle_count) =
        cull_degenerate_triangles(&repaired_points, &repaired_indices, tol);

    let flipped_triangle_count = fix_triangle_winding_consistency(&mut repaired_indices);
    let (open_edge_count, non_manifold_edge_count) = count_edge_topology(&repaired_indices);

    let mut warnings = Vec::new();
    if open_edge_count == 0 && non_manifold_edge_count == 0 {
        let volume = signed_volume(&repaired_points, &repaired_indices);
        if volume.is_finite() && volume < 0.0 {
            flip_all_triangles(&mut repaired_indices);
            warnings.push("mesh orientation flipped (outward)".to_string());
        }
    }
    if non_manifold_edge_count > 0 {
        warnings.push("mesh has non-manifold edges".to_string());
    }

    let normals = compute_smooth_normals(&repaired_points, &repaired_indices);

    let mesh = GeomMesh {
        positions: repaired_points.into_iter().map(Point3::to_array).collect(),
        indices: repaired_indices,
        uvs: repaired_uvs,
        normals: Some(normals),
    };

    let diagnostics = GeomMeshDiagnostics {
        vertex_count: mesh.positions.len(),
        triangle_count: mesh.triangle_count(),
        welded_vertex_count,
        flipped_triangle_count,
        degenerate_triangle_count,
        open_edge_count,
        non_manifold_edge_count,
        warnings,
        ..Default::default()
    };

    (mesh, diagnostics)
}

/// Package a faceted mesh whose vertices are deliberately split along hard
/// edges. Authored normals are kept; topology is measured on a welded copy so
/// split seams do not count as open edges.
pub(crate) fn finalize_flat_mesh(
    positions: Vec<[f64; 3]>,
    uvs: Vec<[f64; 2]>,
    normals: Vec<[f64; 3]>,
    indices: Vec<u32>,
    tol: Tolerance,
) -> (GeomMesh, GeomMeshDiagnostics) {
    let points: Vec<Point3> = positions.iter().copied().map(Point3::from_array).collect();
    let (_, _, welded_indices, _) = weld_mesh_vertices(points, None, indices.clone(), tol);
    let (open_edge_count, non_manifold_edge_count) = count_edge_topology(&welded_indices);

    let mut warnings = Vec::new();
    if non_manifold_edge_count > 0 {
        warnings.push("mesh has non-manifold edges".to_string());
    }

    let mesh = GeomMesh::with_attributes(positions, indices, Some(uvs), Some(normals));
    let diagnostics = GeomMeshDiagnostics {
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        open_edge_count,
        non_manifold_edge_count,
        warnings,
        ..Default::default()
    };
    (mesh, diagnostics)
}

pub(crate) fn weld_mesh_vertices(
    points: Vec<Point3>,
    uvs: Option<&[[f64; 2]]>,
    indices: Vec<u32>,
    tol: Tolerance,
) -> (Vec<Point3>, Option<Vec<[f64; 2]>>, Vec<u32>, usize) {
    if !tol.eps.is_finite() || tol.eps <= 0.0 {
        let uvs = uvs.map(<[[f64; 2]]>::to_vec);
        return (points, uvs, indices, 0);
    }

    let inv = 1.0 / tol.eps;

    /// Quantize a coordinate to a grid cell index; `None` for NaN/Inf.
    fn quantize(value: f64, inv: f64) -> Option<i64> {
        if !value.is_finite() {
            return None;
        }
        let q = (value * inv).floor();
        Some(q.clamp(i64::MIN as f64, i64::MAX as f64) as i64)
    }

    let mut buckets: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    let mut remap: Vec<u32> = Vec::with_capacity(points.len());
    let mut out_points: Vec<Point3> = Vec::with_capacity(points.len());
    let mut out_uvs: Option<Vec<[f64; 2]>> = uvs.map(|_| Vec::with_capacity(points.len()));

    for (i, p) in points.iter().copied().enumerate() {
        let key = match (quantize(p.x, inv), quantize(p.y, inv), quantize(p.z, inv)) {
            (Some(kx), Some(ky), Some(kz)) => Some((kx, ky, kz)),
            _ => None,
        };

        let mut found = None;
        if let Some(key) = key {
            'search: for dx in -1i64..=1 {
                for dy in -1i64..=1 {
                    for dz in -1i64..=1 {
                        let Some(candidates) = buckets.get(&(key.0 + dx, key.1 + dy, key.2 + dz))
                        else {
                            continue;
                        };
                        if let Some(&cand) = candidates
                            .iter()
                            .find(|&&cand| tol.approx_eq_point3(out_points[cand as usize], p))
                        {
                            found = Some(cand);
                            break 'search;
                        }
                    }
                }
            }
        }

        let out_idx = if let Some(existing) = found {
            existing
        } else {
            let new_idx = out_points.len() as u32;
            out_points.push(p);
            if let (Some(src), Some(dst)) = (uvs, out_uvs.as_mut()) {
                dst.push(src.get(i).copied().unwrap_or([0.0, 0.0]));
            }
            if let Some(key) = key {
                buckets.entry(key).or_default().push(new_idx);
            }
            new_idx
        };

        remap.push(out_idx);
    }

    let out_indices = indices
        .into_iter()
        .map(|idx| remap.get(idx as usize).copied().unwrap_or(idx))
        .collect();

    let welded = points.len().saturating_sub(out_points.len());
    (out_points, out_uvs, out_indices, welded)
}

fn cull_degenerate_triangles(points: &[Point3], indices: &[u32], tol: Tolerance) -> (Vec<u32>, usize) {
    let mut out = Vec::with_capacity(indices.len());
    let mut removed = 0usize;

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
        if i0 == i1 || i1 == i2 || i0 == i2 {
            removed += 1;
            continue;
        }

        let (Some(&a), Some(&b), Some(&c)) = (
            points.get(i0 as usize),
            points.get(i1 as usize),
            points.get(i2 as usize),
        ) else {
            removed += 1;
            continue;
        };

        let area2 = b.sub_point(a).cross(c.sub_point(a)).length_squared();
        if !area2.is_finite() || area2 <= tol.eps_squared() * tol.eps_squared() {
            removed += 1;
            continue;
        }

        out.extend_from_slice(&[i0, i1, i2]);
    }

    (out, removed)
}

/// Propagate the seed triangle's orientation across shared manifold edges.
/// Returns the number of triangles flipped.
pub(crate) fn fix_triangle_winding_consistency(indices: &mut [u32]) -> usize {
    let tri_count = indices.len() / 3;
    if tri_count == 0 {
        return 0;
    }

    let mut edges: HashMap<(u32, u32), Vec<(usize, bool)>> =
        HashMap::with_capacity(tri_count.saturating_mul(3));
    for t in 0..tri_count {
        let (i0, i1, i2) = (indices[t * 3], indices[t * 3 + 1], indices[t * 3 + 2]);
        for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
            let (lo, hi, dir) = if a <= b { (a, b, true) } else { (b, a, false) };
            edges.entry((lo, hi)).or_default().push((t, dir));
        }
    }

    let mut visited = vec![false; tri_count];
    let mut flipped = vec![false; tri_count];

    for seed in 0..tri_count {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut stack = vec![seed];

        while let Some(t) = stack.pop() {
            let (i0, i1, i2) = (indices[t * 3], indices[t * 3 + 1], indices[t * 3 + 2]);
            for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
                let (lo, hi, dir_t) = if a <= b { (a, b, true) } else { (b, a, false) };
                let Some(adj) = edges.get(&(lo, hi)) else {
                    continue;
                };
                if adj.len() != 2 {
                    continue;
                }
                let (other, dir_other) = if adj[0].0 == t {
                    adj[1]
                } else if adj[1].0 == t {
                    adj[0]
                } else {
                    continue;
                };

                // Neighbours agree when they traverse the shared edge in opposite directions.
                let desired = flipped[t] ^ dir_t ^ dir_other ^ true;
                if !visited[other] {
                    visited[other] = true;
                    flipped[other] = desired;
                    stack.push(other);
                }
            }
        }
    }

    let mut flipped_count = 0usize;
    for (t, &flip) in flipped.iter().enumerate() {
        if flip {
            indices.swap(t * 3 + 1, t * 3 + 2);
            flipped_count += 1;
        }
    }
    flipped_count
}

/// Returns `(open_edges, non_manifold_edges)`.
pub(crate) fn count_edge_topology(indices: &[u32]) -> (usize, usize) {
    let mut edge_counts: HashMap<(u32, u32), u32> = HashMap::new();

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
        if i0 == i1 || i1 == i2 || i0 == i2 {
            continue;
        }
        for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
            let key = if a <= b { (a, b) } else { (b, a) };
            *edge_counts.entry(key).or_insert(0) += 1;
        }
    }

    edge_counts.values().fold((0, 0), |(open, non_manifold), &count| match count {
        1 => (open + 1, non_manifold),
        2 => (open, non_manifold),
        _ => (open, non_manifold + 1),
    })
}

fn flip_all_triangles(indices: &mut [u32]) {
    for tri in indices.chunks_exact_mut(3) {
        tri.swap(1, 2);
    }
}

pub(crate) fn signed_volume(points: &[Point3], indices: &[u32]) -> f64 {
    let mut volume = 0.0;
    for tri in indices.chunks_exact(3) {
        let (Some(a), Some(b), Some(c)) = (
            points.get(tri[0] as usize),
            points.get(tri[1] as usize),
            points.get(tri[2] as usize),
        ) else {
            continue;
        };
        let av = Vec3::new(a.x, a.y, a.z);
        let bv = Vec3::new(b.x, b.y, b.z);
        let cv = Vec3::new(c.x, c.y, c.z);
        volume += av.dot(bv.cross(cv));
    }
    volume / 6.0
}

/// Area-weighted vertex normals. Isolated vertices default to +Y.
pub(crate) fn compute_smooth_normals(points: &[Point3], indices: &[u32]) -> Vec<[f64; 3]> {
    let mut acc = vec![Vec3::ZERO; points.len()];

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (Some(&a), Some(&b), Some(&c)) = (points.get(i0), points.get(i1), points.get(i2)) else {
            continue;
        };
        let face = b.sub_point(a).cross(c.sub_point(a));
        acc[i0] = acc[i0] + face;
        acc[i1] = acc[i1] + face;
        acc[i2] = acc[i2] + face;
    }

    acc.into_iter()
        .map(|n| n.normalized().unwrap_or(Vec3::Y).to_array())
        .collect()
}
