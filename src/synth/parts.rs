//! Literal part lists for the composed archetypes.
//!
//! Offsets and sizes are authored at the template's reference dimensions and
//! scaled per axis when a spec asks for a different envelope.

use crate::geom::{GeomMesh, GeomMeshDiagnostics, Tolerance, build_box, build_cylinder};
use crate::spec::{HexColor, ModelSpec};

use super::archetype::PartExtent;
use super::{MaterialDescriptor, MeshPart, Placement};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartShape {
    Box {
        width: f64,
        height: f64,
        depth: f64,
    },
    Cylinder {
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        segments: usize,
    },
}

impl PartShape {
    fn build(self, tol: Tolerance) -> (GeomMesh, GeomMeshDiagnostics) {
        match self {
            Self::Box { width, height, depth } => build_box(width, height, depth, tol),
            Self::Cylinder {
                radius_top,
                radius_bottom,
                height,
                segments,
            } => build_cylinder(radius_top, radius_bottom, height, segments, tol),
        }
    }
}

/// Surface finish of one part. `color: None` paints the part with the
/// spec's color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finish {
    pub color: Option<u32>,
    pub roughness: f64,
    pub metalness: f64,
    pub opacity: f64,
}

impl Finish {
    pub const SPEC: Self = Self {
        color: None,
        roughness: MaterialDescriptor::DEFAULT_ROUGHNESS,
        metalness: MaterialDescriptor::DEFAULT_METALNESS,
        opacity: 1.0,
    };

    #[must_use]
    pub const fn painted(color: u32) -> Self {
        Self {
            color: Some(color),
            ..Self::SPEC
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PartTemplate {
    pub name: &'static str,
    pub shape: PartShape,
    pub position: [f64; 3],
    pub finish: Finish,
}

const fn cylinder(radius_top: f64, radius_bottom: f64, height: f64, segments: usize) -> PartShape {
    PartShape::Cylinder {
        radius_top,
        radius_bottom,
        height,
        segments,
    }
}

const fn cuboid(width: f64, height: f64, depth: f64) -> PartShape {
    PartShape::Box { width, height, depth }
}

const WOOD_BROWN: u32 = 0x654321;

pub const LAMP_PARTS: &[PartTemplate] = &[
    PartTemplate {
        name: "base",
        shape: cylinder(0.8, 1.2, 0.3, 8),
        position: [0.0, 0.0, 0.0],
        finish: Finish {
            color: None,
            roughness: 0.3,
            metalness: 0.7,
            opacity: 1.0,
        },
    },
    PartTemplate {
        name: "stem",
        shape: cylinder(0.1, 0.1, 2.0, 8),
        position: [0.0, 1.0, 0.0],
        finish: Finish::painted(0x333333),
    },
    PartTemplate {
        name: "shade",
        shape: cylinder(1.5, 1.2, 1.8, 16),
        position: [0.0, 2.5, 0.0],
        finish: Finish {
            opacity: 0.8,
            ..Finish::painted(0xF0F0F0)
        },
    },
];

const CHAIR_LEG: PartShape = cylinder(0.1, 0.1, 1.0, 8);

pub const CHAIR_PARTS: &[PartTemplate] = &[
    PartTemplate {
        name: "seat",
        shape: cuboid(2.0, 0.2, 2.0),
        position: [0.0, 1.0, 0.0],
        finish: Finish::SPEC,
    },
    PartTemplate {
        name: "back",
        shape: cuboid(2.0, 3.0, 0.2),
        position: [0.0, 2.5, -0.9],
        finish: Finish::SPEC,
    },
    PartTemplate {
        name: "leg_back_left",
        shape: CHAIR_LEG,
        position: [-0.9, 0.5, -0.9],
        finish: Finish::painted(WOOD_BROWN),
    },
    PartTemplate {
        name: "leg_back_right",
        shape: CHAIR_LEG,
        position: [0.9, 0.5, -0.9],
        finish: Finish::painted(WOOD_BROWN),
    },
    PartTemplate {
        name: "leg_front_left",
        shape: CHAIR_LEG,
        position: [-0.9, 0.5, 0.9],
        finish: Finish::painted(WOOD_BROWN),
    },
    PartTemplate {
        name: "leg_front_right",
        shape: CHAIR_LEG,
        position: [0.9, 0.5, 0.9],
        finish: Finish::painted(WOOD_BROWN),
    },
];

const TABLE_LEG: PartShape = cylinder(0.15, 0.15, 2.8, 8);

pub const TABLE_PARTS: &[PartTemplate] = &[
    PartTemplate {
        name: "top",
        shape: cuboid(4.0, 0.2, 4.0),
        position: [0.0, 2.9, 0.0],
        finish: Finish::SPEC,
    },
    PartTemplate {
        name: "leg_back_left",
        shape: TABLE_LEG,
        position: [-1.8, 1.4, -1.8],
        finish: Finish::SPEC,
    },
    PartTemplate {
        name: "leg_back_right",
        shape: TABLE_LEG,
        position: [1.8, 1.4, -1.8],
        finish: Finish::SPEC,
    },
    PartTemplate {
        name: "leg_front_left",
        shape: TABLE_LEG,
        position: [-1.8, 1.4, 1.8],
        finish: Finish::SPEC,
    },
    PartTemplate {
        name: "leg_front_right",
        shape: TABLE_LEG,
        position: [1.8, 1.4, 1.8],
        finish: Finish::SPEC,
    },
];

pub const FRAME_PARTS: &[PartTemplate] = &[
    PartTemplate {
        name: "frame",
        shape: cuboid(3.0, 4.0, 0.2),
        position: [0.0, 0.0, 0.1],
        finish: Finish::SPEC,
    },
    PartTemplate {
        name: "panel",
        shape: cuboid(2.6, 3.6, 0.1),
        position: [0.0, 0.0, 0.0],
        finish: Finish::painted(0xFFFFFF),
    },
];

/// Build every part of `parts`, scaled from the reference envelope to `extent`.
#[must_use]
pub fn build_parts(parts: &[PartTemplate], extent: &PartExtent, spec: &ModelSpec, tol: Tolerance) -> Vec<MeshPart> {
    let [sx, sy, sz] = extent.scale();
    parts
        .iter()
        .map(|part| {
            let (mesh, diagnostics) = part.shape.build(tol);
            let position = [part.position[0] * sx, part.position[1] * sy, part.position[2] * sz];
            MeshPart {
                name: part.name.to_owned(),
                mesh: mesh.scaled(sx, sy, sz),
                material: material_for(part.finish, spec),
                placement: Placement::at(position),
                diagnostics,
            }
        })
        .collect()
}

fn material_for(finish: Finish, spec: &ModelSpec) -> MaterialDescriptor {
    MaterialDescriptor {
        name: spec.material.clone(),
        color: finish.color.map_or(spec.color, HexColor::from_u32),
        roughness: finish.roughness,
        metalness: finish.metalness,
        opacity: finish.opacity,
    }
}
