mod core;
mod diagnostics;
mod displacement;
mod mesh;
mod primitives;
mod revolve;
mod vessel;

pub use core::{BBox, Point3, Tolerance, Transform, Vec3};
pub use diagnostics::GeomMeshDiagnostics;
pub use displacement::{
    CushionDimensions, CushionOptions, PillowDisplacement, build_cushion, pillow_displacement,
};
pub use mesh::GeomMesh;
pub use primitives::{TriangleSoup, box_grid, build_box, build_cylinder, build_plane, build_sphere};
pub use revolve::{RevolveCaps, RevolveError, RevolveOptions, revolve_polyline_with_options};
pub use vessel::{
    MID_HEIGHT_FRACTION, ProfileRing, VesselDimensions, VesselOptions, VesselProfile, build_vessel,
};

#[cfg(test)]
mod tests;
