//! Interchange output: Wavefront OBJ + MTL for synthesized models and the
//! pretty JSON "download" form of a spec.
//!
//! Every part becomes its own `o` group with a material of the same name, so
//! the part colors survive a round trip through DCC tools.

use std::io::{self, Write};

use crate::spec::ModelSpec;
use crate::synth::{DecorMesh, MaterialDescriptor};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("part `{part}` failed validation: {reason}")]
    InvalidMesh { part: String, reason: String },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

const HEADER: &str = "# decor-engine";

/// Write every part of `model` in world space. `mtllib` names the material
/// library to reference, if any.
pub fn write_obj<W: Write + ?Sized>(w: &mut W, model: &DecorMesh, mtllib: Option<&str>) -> Result<(), ExportError> {
    for part in &model.parts {
        part.mesh.validate().map_err(|reason| ExportError::InvalidMesh {
            part: part.name.clone(),
            reason,
        })?;
    }

    writeln!(w, "{HEADER} {}", model.archetype)?;
    if let Some(library) = mtllib {
        writeln!(w, "mtllib {library}")?;
    }

    // OBJ indices are global and 1-based.
    let mut v_base = 1u32;
    let mut vt_base = 1u32;
    let mut vn_base = 1u32;

    for part in &model.parts {
        let mesh = part.world_mesh(&model.placement);
        writeln!(w, "o {}", part.name)?;
        if mtllib.is_some() {
            writeln!(w, "usemtl {}", part.name)?;
        }

        for p in &mesh.positions {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2])?;
        }
        if let Some(uvs) = mesh.uvs.as_ref() {
            for uv in uvs {
                writeln!(w, "vt {} {}", uv[0], uv[1])?;
            }
        }
        if let Some(normals) = mesh.normals.as_ref() {
            for n in normals {
                writeln!(w, "vn {} {} {}", n[0], n[1], n[2])?;
            }
        }

        let has_uvs = mesh.uvs.is_some();
        let has_normals = mesh.normals.is_some();
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]];
            let (va, vb, vc) = (a + v_base, b + v_base, c + v_base);
            let (ta, tb, tc) = (a + vt_base, b + vt_base, c + vt_base);
            let (na, nb, nc) = (a + vn_base, b + vn_base, c + vn_base);
            match (has_uvs, has_normals) {
                (true, true) => writeln!(w, "f {va}/{ta}/{na} {vb}/{tb}/{nb} {vc}/{tc}/{nc}"),
                (true, false) => writeln!(w, "f {va}/{ta} {vb}/{tb} {vc}/{tc}"),
                (false, true) => writeln!(w, "f {va}//{na} {vb}//{nb} {vc}//{nc}"),
                (false, false) => writeln!(w, "f {va} {vb} {vc}"),
            }?;
        }

        let count = mesh.vertex_count() as u32;
        v_base += count;
        if has_uvs {
            vt_base += count;
        }
        if has_normals {
            vn_base += count;
        }
    }

    w.flush()?;
    Ok(())
}

/// One `newmtl` block per part. Roughness and metalness use the PBR
/// extension keys `Pr` / `Pm`.
pub fn write_mtl<W: Write + ?Sized>(w: &mut W, model: &DecorMesh) -> Result<(), ExportError> {
    writeln!(w, "{HEADER} {}", model.archetype)?;
    for part in &model.parts {
        writeln!(w)?;
        write_material(w, &part.name, &part.material)?;
    }
    w.flush()?;
    Ok(())
}

fn write_material<W: Write + ?Sized>(w: &mut W, name: &str, material: &MaterialDescriptor) -> io::Result<()> {
    let [r, g, b] = material.color.to_unit_rgb();
    writeln!(w, "newmtl {name}")?;
    writeln!(w, "# {} {}", material.name, material.color)?;
    writeln!(w, "Kd {r:.6} {g:.6} {b:.6}")?;
    writeln!(w, "d {}", material.opacity)?;
    writeln!(w, "Pr {}", material.roughness)?;
    writeln!(w, "Pm {}", material.metalness)?;
    writeln!(w, "illum 2")
}

pub fn obj_to_string(model: &DecorMesh, mtllib: Option<&str>) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_obj(&mut buffer, model, mtllib)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn mtl_to_string(model: &DecorMesh) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_mtl(&mut buffer, model)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Spec as two-space indented JSON with a trailing newline.
pub fn write_spec_json<W: Write + ?Sized>(w: &mut W, spec: &ModelSpec) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut *w, spec)?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}
