//! Mesh diagnostics for synthesized decor parts.
//!
//! Every geometry builder returns a [`GeomMeshDiagnostics`] alongside its mesh.
//! The synthesizer merges them per model so callers can log a single summary
//! line or inspect repairs and input clamping.
//!
//! # Example
//!
//! ```ignore
//! let (mesh, diagnostics) = build_vessel(&dims, VesselOptions::default(), Tolerance::WELD);
//! if !diagnostics.is_clean() {
//!     log::warn!("vessel: {}", diagnostics.summary());
//! }
//! ```

use std::fmt;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeomMeshDiagnostics {
    /// Total number of vertices in the final mesh.
    pub vertex_count: usize,

    /// Total number of triangles in the final mesh.
    pub triangle_count: usize,

    /// Vertices merged during tolerance-based welding.
    pub welded_vertex_count: usize,

    /// Triangles whose winding order was corrected for consistency.
    pub flipped_triangle_count: usize,

    /// Degenerate (zero-area) triangles removed.
    pub degenerate_triangle_count: usize,

    /// Boundary edges. An open vessel rim contributes one ring of these.
    pub open_edge_count: usize,

    /// Edges shared by more than two triangles.
    pub non_manifold_edge_count: usize,

    /// Dimension values that were missing, non-finite or non-positive and had
    /// to be clamped or defaulted before meshing.
    pub clamped_input_count: usize,

    /// Set when the preferred construction failed and a simpler primitive was
    /// emitted instead (e.g. a lathe profile that could not be revolved).
    pub fallback_used: bool,

    /// Human-readable warnings about repairs and fallbacks.
    pub warnings: Vec<String>,
}

impl GeomMeshDiagnostics {
    /// Returns `true` if the mesh is watertight (no open edges).
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edge_count == 0
    }

    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// No repairs, no clamping, no fallback, no warnings. Open edges are
    /// allowed: several archetypes are intentionally open surfaces.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.non_manifold_edge_count == 0
            && self.degenerate_triangle_count == 0
            && self.flipped_triangle_count == 0
            && self.clamped_input_count == 0
            && !self.fallback_used
            && self.warnings.is_empty()
    }

    /// Total repairs performed (welded + flipped + degenerates).
    #[must_use]
    pub fn repair_count(&self) -> usize {
        self.welded_vertex_count + self.flipped_triangle_count + self.degenerate_triangle_count
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Record a clamped input value together with a warning naming it.
    pub fn record_clamp(&mut self, field: &str, value: f64, clamped: f64) {
        self.clamped_input_count += 1;
        self.warnings
            .push(format!("{field} {value} clamped to {clamped}"));
    }

    /// Fold input clamping records into a mesh's diagnostics without touching
    /// its topology counts.
    pub fn merge_inputs(&mut self, inputs: &GeomMeshDiagnostics) {
        self.clamped_input_count += inputs.clamped_input_count;
        self.warnings.extend(inputs.warnings.iter().cloned());
    }

    /// Sum counts, append warnings and OR the fallback flag.
    pub fn merge(&mut self, other: &GeomMeshDiagnostics) {
        self.vertex_count += other.vertex_count;
        self.triangle_count += other.triangle_count;
        self.welded_vertex_count += other.welded_vertex_count;
        self.flipped_triangle_count += other.flipped_triangle_count;
        self.degenerate_triangle_count += other.degenerate_triangle_count;
        self.open_edge_count += other.open_edge_count;
        self.non_manifold_edge_count += other.non_manifold_edge_count;
        self.clamped_input_count += other.clamped_input_count;
        self.fallback_used = self.fallback_used || other.fallback_used;
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Short summary string suitable for logging.
    ///
    /// Format: `"V:{vertices} T:{triangles} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("V:{} T:{}", self.vertex_count, self.triangle_count)];

        if self.welded_vertex_count > 0 {
            parts.push(format!("welded:{}", self.welded_vertex_count));
        }
        if self.flipped_triangle_count > 0 {
            parts.push(format!("flipped:{}", self.flipped_triangle_count));
        }
        if self.degenerate_triangle_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_triangle_count));
        }
        if self.open_edge_count > 0 {
            parts.push(format!("open:{}", self.open_edge_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }
        if self.clamped_input_count > 0 {
            parts.push(format!("clamped:{}", self.clamped_input_count));
        }
        if self.fallback_used {
            parts.push("fallback".to_string());
        }

        parts.join(" ")
    }
}

impl fmt::Display for GeomMeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;

        if self.repair_count() > 0 {
            writeln!(f, "  Repairs:")?;
            if self.welded_vertex_count > 0 {
                writeln!(f, "    - Welded vertices: {}", self.welded_vertex_count)?;
            }
            if self.flipped_triangle_count > 0 {
                writeln!(f, "    - Flipped triangles: {}", self.flipped_triangle_count)?;
            }
            if self.degenerate_triangle_count > 0 {
                writeln!(f, "    - Degenerate triangles removed: {}", self.degenerate_triangle_count)?;
            }
        }

        if self.open_edge_count > 0 || self.non_manifold_edge_count > 0 {
            writeln!(f, "  Topology:")?;
            if self.open_edge_count > 0 {
                writeln!(f, "    - Open edges: {}", self.open_edge_count)?;
            }
            if self.non_manifold_edge_count > 0 {
                writeln!(f, "    - Non-manifold edges: {}", self.non_manifold_edge_count)?;
            }
        }

        if self.clamped_input_count > 0 {
            writeln!(f, "  Clamped inputs: {}", self.clamped_input_count)?;
        }
        if self.fallback_used {
            writeln!(f, "  Fallback geometry used")?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        let status = if self.is_clean() {
            "CLEAN"
        } else if self.is_manifold() && !self.fallback_used {
            "VALID (with repairs)"
        } else {
            "ISSUES DETECTED"
        };
        writeln!(f, "  Status: {status}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_clean() {
        let diag = GeomMeshDiagnostics::default();
        assert!(diag.is_clean());
        assert!(diag.is_watertight() && diag.is_manifold());
        assert!(diag.warnings.is_empty());
    }

    #[test]
    fn test_open_edges_are_still_clean() {
        let diag = GeomMeshDiagnostics {
            open_edge_count: 32,
            ..Default::default()
        };
        assert!(!diag.is_watertight());
        assert!(diag.is_clean());
    }

    #[test]
    fn test_record_clamp() {
        let mut diag = GeomMeshDiagnostics::default();
        diag.record_clamp("radiusTop", -1.0, 0.001);
        assert_eq!(diag.clamped_input_count, 1);
        assert_eq!(diag.warnings, vec!["radiusTop -1 clamped to 0.001".to_string()]);
        assert!(!diag.is_clean());
    }

    #[test]
    fn test_merge() {
        let mut a = GeomMeshDiagnostics {
            vertex_count: 100,
            triangle_count: 50,
            open_edge_count: 2,
            warnings: vec!["first".to_string()],
            ..Default::default()
        };
        let b = GeomMeshDiagnostics {
            vertex_count: 200,
            triangle_count: 100,
            fallback_used: true,
            warnings: vec!["second".to_string()],
            ..Default::default()
        };

        a.merge(&b);

        assert_eq!(a.vertex_count, 300);
        assert_eq!(a.triangle_count, 150);
        assert_eq!(a.open_edge_count, 2);
        assert!(a.fallback_used);
        assert_eq!(a.warnings.len(), 2);
    }

    #[test]
    fn test_summary_and_display() {
        let diag = GeomMeshDiagnostics {
            vertex_count: 100,
            triangle_count: 50,
            welded_vertex_count: 5,
            clamped_input_count: 1,
            warnings: vec!["height 0 clamped to 0.001".to_string()],
            ..Default::default()
        };

        let summary = diag.summary();
        assert!(summary.contains("V:100"));
        assert!(summary.contains("welded:5"));
        assert!(summary.contains("clamped:1"));

        let output = diag.to_string();
        assert!(output.contains("Welded vertices: 5"));
        assert!(output.contains("height 0 clamped"));
        assert!(output.contains("VALID (with repairs)"));
    }
}
