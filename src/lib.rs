#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod detection;
pub mod export;
pub mod geom;
pub mod mapper;
pub mod spec;
pub mod synth;

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use catalog::{ArchetypeKind, Catalog};
pub use detection::{AnalysisResponse, Detection, LabelAnnotation, collect_detections};
pub use export::ExportError;
pub use mapper::ModelGenerator;
pub use spec::{Dimensions, HexColor, ModelSpec, SpecError};
pub use synth::{DecorMesh, MaterialDescriptor, MeshPart, Placement, Synthesizer};

use geom::GeomMeshDiagnostics;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiagnosticsExport<'a> {
    vertex_count: usize,
    triangle_count: usize,
    welded_vertex_count: usize,
    open_edge_count: usize,
    non_manifold_edge_count: usize,
    clamped_input_count: usize,
    fallback_used: bool,
    warnings: &'a [String],
    summary: String,
}

impl<'a> From<&'a GeomMeshDiagnostics> for DiagnosticsExport<'a> {
    fn from(diag: &'a GeomMeshDiagnostics) -> Self {
        Self {
            vertex_count: diag.vertex_count,
            triangle_count: diag.triangle_count,
            welded_vertex_count: diag.welded_vertex_count,
            open_edge_count: diag.open_edge_count,
            non_manifold_edge_count: diag.non_manifold_edge_count,
            clamped_input_count: diag.clamped_input_count,
            fallback_used: diag.fallback_used,
            warnings: &diag.warnings,
            summary: diag.summary(),
        }
    }
}

/// Flat buffers ready for a `BufferGeometry`-style consumer.
#[derive(Debug, Serialize)]
struct PartExport<'a> {
    name: &'a str,
    positions: &'a [f64],
    #[serde(skip_serializing_if = "Option::is_none")]
    normals: Option<&'a [f64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uvs: Option<&'a [f64]>,
    indices: &'a [u32],
    material: &'a MaterialDescriptor,
    placement: Placement,
}

#[derive(Debug, Serialize)]
struct MeshExport<'a> {
    archetype: ArchetypeKind,
    placement: Placement,
    parts: Vec<PartExport<'a>>,
    diagnostics: DiagnosticsExport<'a>,
}

impl<'a> From<&'a DecorMesh> for MeshExport<'a> {
    fn from(model: &'a DecorMesh) -> Self {
        Self {
            archetype: model.archetype,
            placement: model.placement,
            parts: model
                .parts
                .iter()
                .map(|part| PartExport {
                    name: &part.name,
                    positions: part.mesh.positions_flat(),
                    normals: part.mesh.normals_flat(),
                    uvs: part.mesh.uvs_flat(),
                    indices: &part.mesh.indices,
                    material: &part.material,
                    placement: part.placement,
                })
                .collect(),
            diagnostics: DiagnosticsExport::from(&model.diagnostics),
        }
    }
}

#[derive(Debug, Serialize)]
struct ModelExport {
    obj: String,
    mtl: String,
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    catalog: &'static Catalog,
    rng: StdRng,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Engine {
            catalog: Catalog::shared(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Engine whose color picks are reproducible.
    #[wasm_bindgen]
    pub fn with_seed(seed: u64) -> Engine {
        Engine {
            catalog: Catalog::shared(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Known archetype ids, in declaration order.
    #[wasm_bindgen]
    pub fn archetypes(&self) -> Vec<String> {
        self.catalog.kinds().map(|kind| kind.id().to_owned()).collect()
    }

    /// Map an array of `{name, score}` detections to a model spec.
    #[wasm_bindgen]
    pub fn generate_model(&mut self, detections: JsValue) -> Result<JsValue, JsValue> {
        let detections = detections_from_js(detections)?;
        debug_log!("generate_model: {} detections", detections.len());
        let spec = self.generate(&detections);
        to_js(&spec)
    }

    /// Classifier payload in, `{objects, modelData}` out. Labels are used
    /// only when no object was localized.
    #[wasm_bindgen]
    pub fn analyze(&mut self, objects: JsValue, labels: JsValue) -> Result<JsValue, JsValue> {
        let objects = detections_from_js(objects)?;
        let labels: Vec<LabelAnnotation> = if labels.is_null() || labels.is_undefined() {
            Vec::new()
        } else {
            serde_wasm_bindgen::from_value(labels).map_err(to_js_error)?
        };

        let objects = collect_detections(&objects, &labels);
        let model_data = self.generate(&objects);
        to_js(&AnalysisResponse { objects, model_data })
    }

    /// Synthesize the mesh for a spec.
    #[wasm_bindgen]
    pub fn build_mesh(&self, spec: JsValue) -> Result<JsValue, JsValue> {
        let spec = spec_from_js(spec)?;
        let model = Synthesizer::new(self.catalog).build_mesh(&spec);
        debug_log!("build_mesh: {} {}", model.archetype, model.diagnostics.summary());
        to_js(&MeshExport::from(&model))
    }

    /// OBJ and MTL text for a spec, as `{obj, mtl}`.
    #[wasm_bindgen]
    pub fn export_obj(&self, spec: JsValue, mtllib: Option<String>) -> Result<JsValue, JsValue> {
        let spec = spec_from_js(spec)?;
        let model = Synthesizer::new(self.catalog).build_mesh(&spec);
        let obj = export::obj_to_string(&model, mtllib.as_deref()).map_err(to_js_error)?;
        let mtl = export::mtl_to_string(&model).map_err(to_js_error)?;
        to_js(&ModelExport { obj, mtl })
    }

    /// Pretty JSON of a spec, for "download model".
    #[wasm_bindgen]
    pub fn download_model(&self, spec: JsValue) -> Result<String, JsValue> {
        let spec = spec_from_js(spec)?;
        spec.to_json_pretty().map_err(to_js_error)
    }
}

impl Engine {
    fn generate(&mut self, detections: &[Detection]) -> ModelSpec {
        ModelGenerator::new(self.catalog).generate_model_from_objects_with_rng(detections, &mut self.rng)
    }
}

fn detections_from_js(value: JsValue) -> Result<Vec<Detection>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(Vec::new());
    }
    serde_wasm_bindgen::from_value(value).map_err(to_js_error)
}

fn spec_from_js(value: JsValue) -> Result<ModelSpec, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Err(js_error("no model spec given"));
    }
    serde_wasm_bindgen::from_value(value).map_err(to_js_error)
}

/// Plain JS objects rather than `Map`s for the dimension tables.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(to_js_error)
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen::JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_export_flattens_part_buffers() {
        let spec = Catalog::shared().template_or_default(ArchetypeKind::Frame).to_spec();
        let model = Synthesizer::default().build_mesh(&spec);
        let value = serde_json::to_value(MeshExport::from(&model)).expect("serializable");

        assert_eq!(value["archetype"], "frame");
        let parts = value["parts"].as_array().expect("parts");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["name"], "panel");
        assert_eq!(parts[1]["material"]["color"], "#FFFFFF");

        let positions = parts[0]["positions"].as_array().expect("positions");
        assert_eq!(positions.len(), model.parts[0].mesh.vertex_count() * 3);
        assert_eq!(parts[0]["placement"]["position"], serde_json::json!([0.0, 0.0, 0.1]));
        assert_eq!(value["diagnostics"]["fallbackUsed"], false);
    }

    #[test]
    fn seeded_engines_agree() {
        let detections = [Detection::new("Vase", 0.92), Detection::new("Cup", 0.6)];
        let first = Engine::with_seed(11).generate(&detections);
        let second = Engine::with_seed(11).generate(&detections);
        assert_eq!(first, second);
        assert_eq!(first.geometry_kind, ArchetypeKind::Vase);
    }

    #[test]
    fn engine_lists_every_archetype() {
        assert_eq!(Engine::with_seed(0).archetypes().len(), ArchetypeKind::ALL.len());
    }
}
