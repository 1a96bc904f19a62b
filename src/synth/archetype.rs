//! Closed set of synthesizable archetypes, each with its own dimension record.

use log::warn;

use crate::catalog::{ArchetypeKind, Catalog};
use crate::geom::{CushionDimensions, GeomMeshDiagnostics, Tolerance, VesselDimensions};
use crate::spec::{Dimensions, ModelSpec};

/// Width/height/depth of a part-list archetype, together with the template's
/// reference extents the literal part offsets were authored at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartExtent {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub reference: [f64; 3],
}

impl PartExtent {
    /// Per-axis `[x, y, z]` factor from the reference extents to these.
    #[must_use]
    pub fn scale(&self) -> [f64; 3] {
        [
            self.width / self.reference[0],
            self.height / self.reference[1],
            self.depth / self.reference[2],
        ]
    }
}

/// Archetype with its dimensions resolved from a spec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Archetype {
    /// Unit primitives, scaled by the spec's `size`.
    Cube { size: [f64; 3] },
    Sphere { size: [f64; 3] },
    Cylinder { size: [f64; 3] },
    Plane { size: [f64; 3] },
    Chair(PartExtent),
    Table(PartExtent),
    Lamp(PartExtent),
    Frame(PartExtent),
    Vase(VesselDimensions),
    Cushion(CushionDimensions),
}

impl Archetype {
    /// Resolve dimensions from `spec`, falling back to the catalog template's
    /// reference values for missing axes. Degenerate extents are clamped.
    #[must_use]
    pub fn from_spec(spec: &ModelSpec, catalog: &Catalog) -> Self {
        Self::resolve(spec, catalog, &mut GeomMeshDiagnostics::default())
    }

    /// As [`Archetype::from_spec`], recording every clamped extent in `inputs`.
    pub fn resolve(spec: &ModelSpec, catalog: &Catalog, inputs: &mut GeomMeshDiagnostics) -> Self {
        let empty = Dimensions::new();
        let dims = spec.dimensions.as_ref().unwrap_or(&empty);
        let template = catalog.template_or_default(spec.geometry_kind);
        let part_extent = |inputs: &mut GeomMeshDiagnostics| {
            let reference = [
                positive_or_one(template.reference(Dimensions::WIDTH)),
                positive_or_one(template.reference(Dimensions::HEIGHT)),
                positive_or_one(template.reference(Dimensions::DEPTH)),
            ];
            PartExtent {
                width: extent(Dimensions::WIDTH, dims, reference[0], inputs),
                height: extent(Dimensions::HEIGHT, dims, reference[1], inputs),
                depth: extent(Dimensions::DEPTH, dims, reference[2], inputs),
                reference,
            }
        };

        match spec.geometry_kind {
            ArchetypeKind::Cube => Self::Cube { size: primitive_size(spec, inputs) },
            ArchetypeKind::Sphere => Self::Sphere { size: primitive_size(spec, inputs) },
            ArchetypeKind::Cylinder => Self::Cylinder { size: primitive_size(spec, inputs) },
            ArchetypeKind::Plane => Self::Plane { size: primitive_size(spec, inputs) },
            ArchetypeKind::Chair => Self::Chair(part_extent(inputs)),
            ArchetypeKind::Table => Self::Table(part_extent(inputs)),
            ArchetypeKind::Lamp => Self::Lamp(part_extent(inputs)),
            ArchetypeKind::Frame => Self::Frame(part_extent(inputs)),
            ArchetypeKind::Vase => Self::Vase(vessel_dimensions(dims)),
            ArchetypeKind::Cushion => Self::Cushion(CushionDimensions {
                width: dims.get_or(Dimensions::WIDTH, CushionDimensions::DEFAULT_WIDTH),
                height: dims.get_or(Dimensions::HEIGHT, CushionDimensions::DEFAULT_HEIGHT),
                depth: dims.get_or(Dimensions::DEPTH, CushionDimensions::DEFAULT_DEPTH),
            }),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ArchetypeKind {
        match self {
            Self::Cube { .. } => ArchetypeKind::Cube,
            Self::Sphere { .. } => ArchetypeKind::Sphere,
            Self::Cylinder { .. } => ArchetypeKind::Cylinder,
            Self::Plane { .. } => ArchetypeKind::Plane,
            Self::Chair(_) => ArchetypeKind::Chair,
            Self::Table(_) => ArchetypeKind::Table,
            Self::Lamp(_) => ArchetypeKind::Lamp,
            Self::Frame(_) => ArchetypeKind::Frame,
            Self::Vase(_) => ArchetypeKind::Vase,
            Self::Cushion(_) => ArchetypeKind::Cushion,
        }
    }
}

fn positive_or_one(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 1.0 }
}

fn extent(axis: &str, dims: &Dimensions, reference: f64, inputs: &mut GeomMeshDiagnostics) -> f64 {
    let value = dims.get_or(axis, reference);
    clamp(axis, value, reference, inputs)
}

fn primitive_size(spec: &ModelSpec, inputs: &mut GeomMeshDiagnostics) -> [f64; 3] {
    let [x, y, z] = spec.size.unwrap_or([1.0, 1.0, 1.0]);
    [
        clamp("size.x", x, 1.0, inputs),
        clamp("size.y", y, 1.0, inputs),
        clamp("size.z", z, 1.0, inputs),
    ]
}

fn clamp(field: &str, value: f64, fallback: f64, inputs: &mut GeomMeshDiagnostics) -> f64 {
    let clamped = Tolerance::MIN_EXTENT.clamp_extent(value, fallback);
    if clamped != value {
        warn!("{field} {value} clamped to {clamped}");
        inputs.record_clamp(field, value, clamped);
    }
    clamped
}

fn vessel_dimensions(dims: &Dimensions) -> VesselDimensions {
    VesselDimensions {
        radius_top: dims.get_or(Dimensions::RADIUS_TOP, VesselDimensions::DEFAULT_RADIUS_TOP),
        radius_bottom: dims.get_or(Dimensions::RADIUS_BOTTOM, VesselDimensions::DEFAULT_RADIUS_BOTTOM),
        height: dims.get_or(Dimensions::HEIGHT, VesselDimensions::DEFAULT_HEIGHT),
        mid_radius: dims.get_or(Dimensions::MID_RADIUS, VesselDimensions::DEFAULT_MID_RADIUS),
        rim_thickness: dims.get_or(Dimensions::RIM_THICKNESS, VesselDimensions::DEFAULT_RIM_THICKNESS),
        neck_height: dims.get_or(Dimensions::NECK_HEIGHT, VesselDimensions::DEFAULT_NECK_HEIGHT),
        neck_radius: dims.get_or(Dimensions::NECK_RADIUS, VesselDimensions::DEFAULT_NECK_RADIUS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::HexColor;

    fn spec(kind: ArchetypeKind, dimensions: Option<Dimensions>) -> ModelSpec {
        ModelSpec {
            geometry_kind: kind,
            material: "basic".to_owned(),
            color: HexColor::WHITE,
            dimensions,
            position: None,
            size: None,
        }
    }

    #[test]
    fn template_dimensions_scale_by_one() {
        let catalog = Catalog::builtin();
        let chair = catalog.template_or_default(ArchetypeKind::Chair).to_spec();
        let Archetype::Chair(extent) = Archetype::from_spec(&chair, &catalog) else {
            panic!("expected chair");
        };
        assert_eq!(extent.scale(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn partial_dimensions_keep_reference_axes() {
        let catalog = Catalog::builtin();
        let dims = Dimensions::new().with(Dimensions::HEIGHT, 6.0);
        let Archetype::Table(extent) = Archetype::from_spec(&spec(ArchetypeKind::Table, Some(dims)), &catalog)
        else {
            panic!("expected table");
        };
        assert_eq!(extent.scale(), [1.0, 2.0, 1.0]);
    }

    #[test]
    fn degenerate_extent_is_clamped() {
        let catalog = Catalog::builtin();
        let dims = Dimensions::new().with(Dimensions::WIDTH, -3.0);
        let Archetype::Lamp(extent) = Archetype::from_spec(&spec(ArchetypeKind::Lamp, Some(dims)), &catalog) else {
            panic!("expected lamp");
        };
        assert_eq!(extent.width, Tolerance::MIN_EXTENT.eps);
    }

    #[test]
    fn clamped_size_is_recorded() {
        let mut cube = spec(ArchetypeKind::Cube, None);
        cube.size = Some([2.0, 0.0, f64::NAN]);
        let mut inputs = GeomMeshDiagnostics::default();
        let archetype = Archetype::resolve(&cube, &Catalog::builtin(), &mut inputs);
        assert_eq!(archetype, Archetype::Cube { size: [2.0, Tolerance::MIN_EXTENT.eps, 1.0] });
        assert_eq!(inputs.clamped_input_count, 2);
    }

    #[test]
    fn vase_reads_every_vessel_axis() {
        let dims = Dimensions::new()
            .with(Dimensions::HEIGHT, 2.0)
            .with(Dimensions::NECK_RADIUS, 0.3);
        let archetype = Archetype::from_spec(&spec(ArchetypeKind::Vase, Some(dims)), &Catalog::builtin());
        let Archetype::Vase(vessel) = archetype else {
            panic!("expected vase");
        };
        assert_eq!(vessel.height, 2.0);
        assert_eq!(vessel.neck_radius, 0.3);
        assert_eq!(vessel.radius_top, VesselDimensions::DEFAULT_RADIUS_TOP);
        assert_eq!(archetype.kind(), ArchetypeKind::Vase);
    }

    #[test]
    fn primitive_size_defaults_to_unit() {
        let archetype = Archetype::from_spec(&spec(ArchetypeKind::Sphere, None), &Catalog::builtin());
        assert_eq!(archetype, Archetype::Sphere { size: [1.0, 1.0, 1.0] });
    }
}
