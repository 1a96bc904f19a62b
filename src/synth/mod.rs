//! Procedural geometry synthesis: one [`ModelSpec`] in, one [`DecorMesh`] out.
//!
//! Dispatch is over the closed [`Archetype`] enum. Vessels and cushions go
//! through the parametric builders in [`crate::geom`]; everything else is a
//! literal part list of boxes and cylinders.

mod archetype;
mod parts;

pub use archetype::{Archetype, PartExtent};
pub use parts::{CHAIR_PARTS, FRAME_PARTS, Finish, LAMP_PARTS, PartShape, PartTemplate, TABLE_PARTS, build_parts};

use log::{debug, warn};
use serde::Serialize;

use crate::catalog::{ArchetypeKind, Catalog};
use crate::geom::{
    BBox, CushionOptions, GeomMesh, GeomMeshDiagnostics, Tolerance, Transform, VesselOptions,
    build_box, build_cushion, build_cylinder, build_plane, build_sphere, build_vessel,
};
use crate::spec::{HexColor, ModelSpec};

/// Renderer-agnostic surface description of one part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialDescriptor {
    pub name: String,
    pub color: HexColor,
    pub roughness: f64,
    pub metalness: f64,
    pub opacity: f64,
}

impl MaterialDescriptor {
    pub const DEFAULT_ROUGHNESS: f64 = 1.0;
    pub const DEFAULT_METALNESS: f64 = 0.0;

    #[must_use]
    pub fn new(name: impl Into<String>, color: HexColor) -> Self {
        Self {
            name: name.into(),
            color,
            roughness: Self::DEFAULT_ROUGHNESS,
            metalness: Self::DEFAULT_METALNESS,
            opacity: 1.0,
        }
    }

    #[must_use]
    pub fn with_roughness(mut self, roughness: f64) -> Self {
        self.roughness = roughness;
        self
    }

    #[must_use]
    pub fn with_metalness(mut self, metalness: f64) -> Self {
        self.metalness = metalness;
        self
    }

    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Scene placement: translation plus XYZ Euler rotation in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Placement {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

impl Placement {
    #[must_use]
    pub fn at(position: [f64; 3]) -> Self {
        Self {
            position,
            rotation: [0.0; 3],
        }
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform::from_placement(self.position, self.rotation)
    }
}

/// One named, separately colored piece of a model. `mesh` is in part-local
/// coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    pub name: String,
    pub mesh: GeomMesh,
    pub material: MaterialDescriptor,
    pub placement: Placement,
    pub diagnostics: GeomMeshDiagnostics,
}

impl MeshPart {
    /// Part mesh moved into model space, then by `root`.
    #[must_use]
    pub fn world_mesh(&self, root: &Placement) -> GeomMesh {
        let transform = root.transform().compose(self.placement.transform());
        self.mesh.transformed(transform)
    }
}

/// Synthesized model. Owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorMesh {
    pub archetype: ArchetypeKind,
    pub parts: Vec<MeshPart>,
    /// Placement of the whole model in the scene.
    pub placement: Placement,
    /// Merged diagnostics of every part plus input clamping.
    pub diagnostics: GeomMeshDiagnostics,
}

impl DecorMesh {
    #[must_use]
    pub fn part(&self, name: &str) -> Option<&MeshPart> {
        self.parts.iter().find(|part| part.name == name)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|part| part.mesh.vertex_count()).sum()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|part| part.mesh.triangle_count()).sum()
    }

    /// Every part in world space, merged into one mesh.
    #[must_use]
    pub fn flattened(&self) -> GeomMesh {
        let mut merged = GeomMesh::default();
        for part in &self.parts {
            merged.append(&part.world_mesh(&self.placement));
        }
        merged
    }

    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        self.parts
            .iter()
            .filter_map(|part| part.world_mesh(&self.placement).bounds())
            .reduce(BBox::union)
    }
}

/// Unit primitive resolution. Matches common scene-graph defaults.
const SPHERE_WIDTH_SEGMENTS: usize = 32;
const SPHERE_HEIGHT_SEGMENTS: usize = 16;
const CYLINDER_SEGMENTS: usize = 32;

pub struct Synthesizer<'a> {
    catalog: &'a Catalog,
    tolerance: Tolerance,
    vessel: VesselOptions,
    cushion: CushionOptions,
}

impl Default for Synthesizer<'static> {
    fn default() -> Self {
        Self::new(Catalog::shared())
    }
}

impl<'a> Synthesizer<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            tolerance: Tolerance::WELD,
            vessel: VesselOptions::default(),
            cushion: CushionOptions::default(),
        }
    }

    #[must_use]
    pub fn with_vessel_options(mut self, options: VesselOptions) -> Self {
        self.vessel = options;
        self
    }

    #[must_use]
    pub fn with_cushion_options(mut self, options: CushionOptions) -> Self {
        self.cushion = options;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Build the mesh for `spec`. Never fails; degenerate dimensions are
    /// clamped and recorded in the diagnostics.
    #[must_use]
    pub fn build_mesh(&self, spec: &ModelSpec) -> DecorMesh {
        let mut inputs = GeomMeshDiagnostics::default();
        let archetype = Archetype::resolve(spec, self.catalog, &mut inputs);
        let parts = self.build_parts(archetype, spec);

        let mut diagnostics = GeomMeshDiagnostics::default();
        for part in &parts {
            diagnostics.merge(&part.diagnostics);
        }
        diagnostics.merge_inputs(&inputs);

        if diagnostics.fallback_used || diagnostics.non_manifold_edge_count > 0 {
            warn!("{} mesh: {}", archetype.kind(), diagnostics.summary());
        } else {
            debug!("{} mesh: {}", archetype.kind(), diagnostics.summary());
        }

        DecorMesh {
            archetype: archetype.kind(),
            parts,
            placement: Placement::at(spec.position.unwrap_or([0.0; 3])),
            diagnostics,
        }
    }

    fn build_parts(&self, archetype: Archetype, spec: &ModelSpec) -> Vec<MeshPart> {
        let tol = self.tolerance;
        match archetype {
            Archetype::Cube { size: [x, y, z] } => vec![single_part(spec, build_box(x, y, z, tol), 1.0)],
            Archetype::Sphere { size: [x, y, z] } => {
                let (mesh, diag) = build_sphere(0.5, SPHERE_WIDTH_SEGMENTS, SPHERE_HEIGHT_SEGMENTS, tol);
                vec![single_part(spec, (mesh.scaled(x, y, z), diag), 1.0)]
            }
            Archetype::Cylinder { size: [x, y, z] } => {
                let (mesh, diag) = build_cylinder(0.5, 0.5, 1.0, CYLINDER_SEGMENTS, tol);
                vec![single_part(spec, (mesh.scaled(x, y, z), diag), 1.0)]
            }
            Archetype::Plane { size: [x, y, _] } => vec![single_part(spec, build_plane(x, y, tol), 1.0)],
            Archetype::Chair(extent) => build_parts(CHAIR_PARTS, &extent, spec, tol),
            Archetype::Table(extent) => build_parts(TABLE_PARTS, &extent, spec, tol),
            Archetype::Lamp(extent) => build_parts(LAMP_PARTS, &extent, spec, tol),
            Archetype::Frame(extent) => build_parts(FRAME_PARTS, &extent, spec, tol),
            Archetype::Vase(dims) => {
                let mut part = single_part(spec, build_vessel(&dims, self.vessel, tol), 0.2);
                part.material = part.material.with_metalness(0.1);
                vec![part]
            }
            Archetype::Cushion(dims) => vec![single_part(spec, build_cushion(&dims, self.cushion, tol), 0.8)],
        }
    }
}

fn single_part(spec: &ModelSpec, (mesh, diagnostics): (GeomMesh, GeomMeshDiagnostics), roughness: f64) -> MeshPart {
    MeshPart {
        name: spec.geometry_kind.id().to_owned(),
        mesh,
        material: MaterialDescriptor::new(spec.material.clone(), spec.color).with_roughness(roughness),
        placement: Placement::default(),
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Dimensions;
    use approx::assert_relative_eq;

    fn template_spec(kind: ArchetypeKind) -> ModelSpec {
        Catalog::shared().template_or_default(kind).to_spec()
    }

    #[test]
    fn every_archetype_builds_valid_parts() {
        let synth = Synthesizer::default();
        for kind in ArchetypeKind::ALL {
            let model = synth.build_mesh(&template_spec(kind));
            assert_eq!(model.archetype, kind);
            assert!(!model.parts.is_empty(), "{kind} has no parts");
            for part in &model.parts {
                part.mesh.validate().unwrap_or_else(|err| panic!("{kind}/{}: {err}", part.name));
                assert!(!part.mesh.is_empty());
            }
            assert!(!model.diagnostics.fallback_used, "{kind} used a fallback");
        }
    }

    #[test]
    fn same_spec_yields_identical_positions() {
        let synth = Synthesizer::default();
        for kind in [ArchetypeKind::Vase, ArchetypeKind::Cushion, ArchetypeKind::Chair] {
            let spec = template_spec(kind);
            assert_eq!(synth.build_mesh(&spec).flattened().positions, synth.build_mesh(&spec).flattened().positions);
        }
    }

    #[test]
    fn lamp_parts_carry_their_finishes() {
        let model = Synthesizer::default().build_mesh(&template_spec(ArchetypeKind::Lamp));
        let names: Vec<_> = model.parts.iter().map(|part| part.name.as_str()).collect();
        assert_eq!(names, ["base", "stem", "shade"]);

        let base = model.part("base").expect("base");
        assert_eq!(base.material.color, HexColor::from_u32(0xF39C12));
        assert_eq!(base.material.metalness, 0.7);
        assert_eq!(base.material.roughness, 0.3);

        let stem = model.part("stem").expect("stem");
        assert_eq!(stem.material.color.to_string(), "#333333");
        assert_eq!(stem.placement.position, [0.0, 1.0, 0.0]);

        let shade = model.part("shade").expect("shade");
        assert!(shade.material.is_transparent());
        assert_eq!(shade.material.opacity, 0.8);
    }

    #[test]
    fn chair_has_four_brown_legs() {
        let model = Synthesizer::default().build_mesh(&template_spec(ArchetypeKind::Chair));
        let legs: Vec<_> = model.parts.iter().filter(|part| part.name.starts_with("leg_")).collect();
        assert_eq!(legs.len(), 4);
        assert!(legs.iter().all(|leg| leg.material.color.to_string() == "#654321"));
        assert_eq!(model.part("back").expect("back").placement.position, [0.0, 2.5, -0.9]);
    }

    #[test]
    fn part_lists_scale_with_dimensions() {
        let mut spec = template_spec(ArchetypeKind::Table);
        spec.dimensions = Some(Dimensions::new().with(Dimensions::HEIGHT, 6.0).with(Dimensions::WIDTH, 2.0));
        let model = Synthesizer::default().build_mesh(&spec);

        let top = model.part("top").expect("top");
        assert_relative_eq!(top.placement.position[1], 5.8, epsilon = 1e-12);
        let bounds = model.bounds().expect("bounds");
        assert_relative_eq!(bounds.size().y, 6.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.size().x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.size().z, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn frame_panel_is_white_and_behind_the_frame() {
        let model = Synthesizer::default().build_mesh(&template_spec(ArchetypeKind::Frame));
        let panel = model.part("panel").expect("panel");
        assert_eq!(panel.material.color, HexColor::WHITE);
        assert_eq!(model.part("frame").expect("frame").placement.position, [0.0, 0.0, 0.1]);
    }

    #[test]
    fn primitives_follow_size_and_position() {
        let mut spec = crate::mapper::default_spec();
        spec.size = Some([2.0, 3.0, 4.0]);
        spec.position = Some([1.0, 0.0, -1.0]);
        let model = Synthesizer::default().build_mesh(&spec);
        let bounds = model.bounds().expect("bounds");
        assert_relative_eq!(bounds.size().x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.size().y, 3.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.size().z, 4.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.center().x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.center().z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn vase_and_cushion_materials() {
        let synth = Synthesizer::default();
        let vase = synth.build_mesh(&template_spec(ArchetypeKind::Vase));
        assert_eq!(vase.parts[0].material.roughness, 0.2);
        assert_eq!(vase.parts[0].material.metalness, 0.1);
        let cushion = synth.build_mesh(&template_spec(ArchetypeKind::Cushion));
        assert_eq!(cushion.parts[0].material.roughness, 0.8);
    }

    #[test]
    fn degenerate_dimensions_are_clamped_not_fatal() {
        let mut spec = template_spec(ArchetypeKind::Vase);
        spec.dimensions = Some(
            Dimensions::new()
                .with(Dimensions::HEIGHT, 0.0)
                .with(Dimensions::RADIUS_BOTTOM, -1.0)
                .with(Dimensions::NECK_HEIGHT, 5.0),
        );
        let model = Synthesizer::default().build_mesh(&spec);
        assert!(model.diagnostics.clamped_input_count >= 2);
        assert!(model.flattened().validate().is_ok());
    }
}
