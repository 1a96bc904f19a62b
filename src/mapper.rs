//! Classifier-to-spec mapping.
//!
//! Turns an unordered batch of detections into one [`ModelSpec`]. The policy
//! is total: anything it cannot use is filtered, and an empty result maps to
//! the default cube spec.

use log::debug;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::catalog::{ArchetypeKind, Catalog, SUBSTRING_RULES};
use crate::detection::Detection;
use crate::spec::{HexColor, ModelSpec};

/// Detections must score strictly above this to be considered.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Spec returned when nothing usable was detected.
#[must_use]
pub fn default_spec() -> ModelSpec {
    ModelSpec {
        geometry_kind: ArchetypeKind::Cube,
        material: "basic".to_owned(),
        color: HexColor::from_u32(0x808080),
        dimensions: None,
        position: Some([0.0, 0.0, 0.0]),
        size: Some([1.0, 1.0, 1.0]),
    }
}

/// Highest-scoring usable detection above the threshold. Ties keep the
/// detection that came first.
#[must_use]
pub fn extract_primary(detections: &[Detection]) -> Option<(&str, f64)> {
    detections
        .iter()
        .filter_map(Detection::usable)
        .filter(|&(_, score)| score > CONFIDENCE_THRESHOLD)
        .fold(None, |best, candidate| match best {
            Some((_, best_score)) if candidate.1 <= best_score => best,
            _ => Some(candidate),
        })
}

/// Archetype for a detection name: exact id first, then the substring rules
/// in priority order, else cube.
#[must_use]
pub fn resolve_template(name: &str) -> ArchetypeKind {
    let key = name.to_lowercase();
    if let Some(kind) = ArchetypeKind::from_id(&key) {
        return kind;
    }
    SUBSTRING_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| key.contains(needle)))
        .map_or(ArchetypeKind::Cube, |&(_, kind)| kind)
}

pub struct ModelGenerator<'a> {
    catalog: &'a Catalog,
}

impl Default for ModelGenerator<'static> {
    fn default() -> Self {
        Self::new(Catalog::shared())
    }
}

impl<'a> ModelGenerator<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Map detections to a spec, drawing the color from the thread RNG.
    #[must_use]
    pub fn generate_model_from_objects(&self, detections: &[Detection]) -> ModelSpec {
        self.generate_model_from_objects_with_rng(detections, &mut rand::rng())
    }

    pub fn generate_model_from_objects_with_rng<R: Rng + ?Sized>(
        &self,
        detections: &[Detection],
        rng: &mut R,
    ) -> ModelSpec {
        let Some((name, score)) = extract_primary(detections) else {
            debug!("no detection above {CONFIDENCE_THRESHOLD} among {}", detections.len());
            return default_spec();
        };

        let kind = resolve_template(name);
        debug!("primary detection `{name}` ({score:.3}) resolved to {kind}");

        let mut spec = self.catalog.template_or_default(kind).to_spec();
        spec.color = self.pick_color_with_rng(name, rng);
        spec
    }

    /// Random color from the palette registered for `name`, else the
    /// default palette.
    #[must_use]
    pub fn pick_color(&self, name: &str) -> HexColor {
        self.pick_color_with_rng(name, &mut rand::rng())
    }

    pub fn pick_color_with_rng<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> HexColor {
        let palette = self.catalog.palette_or_default(name);
        match palette.choose(rng) {
            Some(color) => *color,
            None => {
                let kind = resolve_template(name);
                debug!("no palette for `{name}`, using the {kind} base color");
                self.catalog.template_or_default(kind).base_color
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Dimensions;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generate(detections: &[Detection]) -> ModelSpec {
        let mut rng = StdRng::seed_from_u64(7);
        ModelGenerator::default().generate_model_from_objects_with_rng(detections, &mut rng)
    }

    #[test]
    fn empty_and_low_confidence_map_to_default() {
        assert_eq!(generate(&[]), default_spec());
        let weak = [Detection::new("vase", 0.5), Detection::new("lamp", 0.2)];
        assert_eq!(generate(&weak), default_spec());
    }

    #[test]
    fn vase_keeps_template_dimensions() {
        let spec = generate(&[Detection::new("vase", 0.9)]);
        assert_eq!(spec.geometry_kind, ArchetypeKind::Vase);
        assert_eq!(spec.material, "ceramic");
        let dims = spec.dimensions.expect("vase dimensions");
        assert_eq!(dims.get(Dimensions::HEIGHT), Some(3.0));
        assert_eq!(dims.get(Dimensions::RADIUS_TOP), Some(0.6));
        assert_eq!(dims.get(Dimensions::RADIUS_BOTTOM), Some(1.0));
        assert!(Catalog::shared().palette_or_default("vase").contains(&spec.color));
    }

    #[test]
    fn substring_priority_is_fixed() {
        assert_eq!(resolve_template("floor lamp"), ArchetypeKind::Lamp);
        assert_eq!(resolve_template("lamp chair"), ArchetypeKind::Chair);
        assert_eq!(resolve_template("Table Lamp"), ArchetypeKind::Table);
        assert_eq!(resolve_template("throw pillow"), ArchetypeKind::Cushion);
        assert_eq!(resolve_template("Picture frame"), ArchetypeKind::Cube);
        assert_eq!(resolve_template("FRAME"), ArchetypeKind::Frame);
        assert_eq!(resolve_template("Houseplant"), ArchetypeKind::Cube);
    }

    #[test]
    fn ties_keep_first_seen() {
        let detections = [
            Detection::new("Chair", 0.8),
            Detection::new("Lamp", 0.8),
            Detection::new("Vase", 0.6),
        ];
        assert_eq!(extract_primary(&detections), Some(("Chair", 0.8)));
    }

    #[test]
    fn unusable_detections_are_skipped() {
        let detections = [
            Detection { name: None, score: Some(0.99), bounding_poly: None },
            Detection::new("", 0.95),
            Detection { name: Some("lamp".to_owned()), score: Some(f64::NAN), bounding_poly: None },
            Detection::new("cushion", 0.7),
        ];
        assert_eq!(generate(&detections).geometry_kind, ArchetypeKind::Cushion);
    }

    #[test]
    fn picks_stay_in_palette() {
        let generator = ModelGenerator::default();
        let palette = Catalog::shared().palette_or_default("lamp");
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let color = generator.pick_color_with_rng("Lamp", &mut rng);
            assert!(palette.contains(&color));
        }
    }

    #[test]
    fn seeded_pick_is_reproducible() {
        let generator = ModelGenerator::default();
        let first = generator.pick_color_with_rng("chair", &mut StdRng::seed_from_u64(2024));
        let second = generator.pick_color_with_rng("chair", &mut StdRng::seed_from_u64(2024));
        assert_eq!(first, second);
    }

    /// Source that always yields zero bits, so every draw takes index 0.
    struct ZeroRng;

    impl rand::RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    #[test]
    fn fixed_source_gives_exact_color() {
        let generator = ModelGenerator::default();
        assert_eq!(generator.pick_color_with_rng("cushion", &mut ZeroRng).to_string(), "#8E44AD");
        let spec = generator.generate_model_from_objects_with_rng(&[Detection::new("Sofa", 0.9)], &mut ZeroRng);
        assert_eq!(spec.geometry_kind, ArchetypeKind::Cube);
        assert_eq!(spec.color.to_string(), "#808000");
    }

    #[test]
    fn spec_color_comes_from_the_original_name() {
        // "floor lamp" has no palette of its own, so the vase palette applies.
        let spec = generate(&[Detection::new("floor lamp", 0.9)]);
        assert_eq!(spec.geometry_kind, ArchetypeKind::Lamp);
        assert!(Catalog::shared().palette_or_default("vase").contains(&spec.color));
    }

    #[test]
    fn empty_default_palette_uses_template_color() {
        let mut catalog = Catalog::new();
        catalog.register_template(Catalog::shared().template_or_default(ArchetypeKind::Lamp));
        let generator = ModelGenerator::new(&catalog);
        let color = generator.pick_color_with_rng("lamp", &mut StdRng::seed_from_u64(1));
        assert_eq!(color, HexColor::from_u32(0xF39C12));
    }
}
