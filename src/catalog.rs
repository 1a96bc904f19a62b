//! Built-in archetype templates and color palettes.
//!
//! The catalog is static configuration: it is built once from the
//! registration tables below and only read afterwards, so a single instance
//! can be shared between threads without locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::spec::{Dimensions, HexColor, ModelSpec};

/// Closed set of archetypes the engine can synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchetypeKind {
    Cube,
    Sphere,
    Cylinder,
    Plane,
    Chair,
    Table,
    Lamp,
    Vase,
    Cushion,
    Frame,
}

impl ArchetypeKind {
    pub const ALL: [Self; 10] = [
        Self::Cube,
        Self::Sphere,
        Self::Cylinder,
        Self::Plane,
        Self::Chair,
        Self::Table,
        Self::Lamp,
        Self::Vase,
        Self::Cushion,
        Self::Frame,
    ];

    /// Archetype used for geometry ids the engine does not know.
    pub const FALLBACK: Self = Self::Vase;

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
            Self::Plane => "plane",
            Self::Chair => "chair",
            Self::Table => "table",
            Self::Lamp => "lamp",
            Self::Vase => "vase",
            Self::Cushion => "cushion",
            Self::Frame => "frame",
        }
    }

    /// Exact, case-insensitive id lookup. Surrounding whitespace is not
    /// stripped: `" vase"` is not an id.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id().eq_ignore_ascii_case(id))
    }
}

impl fmt::Display for ArchetypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Read-only template for one archetype.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchetypeTemplate {
    pub kind: ArchetypeKind,
    pub material: &'static str,
    pub base_color: HexColor,
    pub dimensions: Option<Dimensions>,
}

impl ArchetypeTemplate {
    /// Fresh spec carrying this template's values. The template itself is
    /// never handed out mutably.
    #[must_use]
    pub fn to_spec(&self) -> ModelSpec {
        ModelSpec {
            geometry_kind: self.kind,
            material: self.material.to_owned(),
            color: self.base_color,
            dimensions: self.dimensions.clone(),
            position: None,
            size: None,
        }
    }

    /// Reference extent along `axis`, falling back to 1.0.
    #[must_use]
    pub fn reference(&self, axis: &str) -> f64 {
        self.dimensions
            .as_ref()
            .and_then(|dims| dims.get(axis))
            .unwrap_or(1.0)
    }
}

pub struct TemplateRegistration {
    pub kind: ArchetypeKind,
    pub material: &'static str,
    pub base_color: u32,
    pub dimensions: &'static [(&'static str, f64)],
}

pub struct PaletteRegistration {
    pub key: &'static str,
    pub colors: &'static [u32],
}

pub const TEMPLATES: &[TemplateRegistration] = &[
    TemplateRegistration { kind: ArchetypeKind::Cube, material: "basic", base_color: 0x808080, dimensions: &[] },
    TemplateRegistration { kind: ArchetypeKind::Sphere, material: "standard", base_color: 0xA52A2A, dimensions: &[] },
    TemplateRegistration { kind: ArchetypeKind::Cylinder, material: "lambert", base_color: 0xFFFF00, dimensions: &[] },
    TemplateRegistration { kind: ArchetypeKind::Plane, material: "basic", base_color: 0xFFFFFF, dimensions: &[] },
    TemplateRegistration {
        kind: ArchetypeKind::Chair,
        material: "fabric",
        base_color: 0x27AE60,
        dimensions: &[("height", 4.0), ("width", 2.0), ("depth", 2.0)],
    },
    TemplateRegistration {
        kind: ArchetypeKind::Table,
        material: "wood",
        base_color: 0xA0522D,
        dimensions: &[("height", 3.0), ("width", 4.0), ("depth", 4.0)],
    },
    TemplateRegistration {
        kind: ArchetypeKind::Lamp,
        material: "metal",
        base_color: 0xF39C12,
        dimensions: &[("height", 2.5), ("width", 0.5), ("depth", 0.5)],
    },
    TemplateRegistration {
        kind: ArchetypeKind::Vase,
        material: "ceramic",
        base_color: 0xE67E22,
        dimensions: &[("height", 3.0), ("radiusTop", 0.6), ("radiusBottom", 1.0)],
    },
    TemplateRegistration {
        kind: ArchetypeKind::Cushion,
        material: "fabric",
        base_color: 0xF39C12,
        dimensions: &[("width", 2.0), ("height", 0.8), ("depth", 2.0)],
    },
    TemplateRegistration {
        kind: ArchetypeKind::Frame,
        material: "wood",
        base_color: 0x8B4513,
        dimensions: &[("height", 4.0), ("width", 3.0), ("depth", 0.2)],
    },
];

pub const PALETTES: &[PaletteRegistration] = &[
    PaletteRegistration { key: "lamp", colors: &[0x4A90E2, 0x2C3E50, 0xF39C12] },
    PaletteRegistration { key: "vase", colors: &[0xE67E22, 0x8E44AD, 0x27AE60] },
    PaletteRegistration { key: "chair", colors: &[0x27AE60, 0x3498DB, 0xE74C3C] },
    PaletteRegistration { key: "cushion", colors: &[0x8E44AD, 0xF39C12, 0xE67E22] },
    PaletteRegistration { key: "frame", colors: &[0xD4AA7D, 0x8B4513, 0x2C3E50] },
    PaletteRegistration { key: "sofa", colors: &[0x808000, 0xD37095, 0xD2B48C] },
    PaletteRegistration { key: "table", colors: &[0xB8860B, 0xA0522D, 0xCD853F] },
];

/// Palette used when a name has no palette of its own.
pub const DEFAULT_PALETTE: &str = "vase";

/// Substring fallbacks, checked in order after an exact id miss.
pub const SUBSTRING_RULES: &[(&[&str], ArchetypeKind)] = &[
    (&["chair"], ArchetypeKind::Chair),
    (&["table"], ArchetypeKind::Table),
    (&["lamp"], ArchetypeKind::Lamp),
    (&["vase"], ArchetypeKind::Vase),
    (&["cushion", "pillow"], ArchetypeKind::Cushion),
];

static SHARED: LazyLock<Catalog> = LazyLock::new(Catalog::builtin);

#[derive(Debug, Clone)]
pub struct Catalog {
    templates: HashMap<ArchetypeKind, ArchetypeTemplate>,
    palettes: HashMap<String, Vec<HexColor>>,
    default_palette: Vec<HexColor>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            palettes: HashMap::new(),
            default_palette: Vec::new(),
        }
    }

    /// Catalog populated from [`TEMPLATES`] and [`PALETTES`].
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for registration in TEMPLATES {
            catalog.register_template(ArchetypeTemplate {
                kind: registration.kind,
                material: registration.material,
                base_color: HexColor::from_u32(registration.base_color),
                dimensions: (!registration.dimensions.is_empty())
                    .then(|| Dimensions::from_pairs(registration.dimensions)),
            });
        }
        for registration in PALETTES {
            let colors = registration.colors.iter().copied().map(HexColor::from_u32).collect();
            catalog.register_palette(registration.key, colors);
        }
        catalog.set_default_palette(DEFAULT_PALETTE);
        catalog
    }

    /// Process-wide built-in catalog.
    #[must_use]
    pub fn shared() -> &'static Catalog {
        &SHARED
    }

    pub fn register_template(&mut self, template: ArchetypeTemplate) {
        self.templates.insert(template.kind, template);
    }

    /// Register a palette. Empty palettes are ignored.
    pub fn register_palette(&mut self, key: &str, colors: Vec<HexColor>) {
        if colors.is_empty() {
            return;
        }
        self.palettes.insert(key.to_lowercase(), colors);
    }

    /// Use the palette registered under `key` as the default. Unknown keys
    /// leave the current default in place.
    pub fn set_default_palette(&mut self, key: &str) {
        if let Some(colors) = self.palettes.get(&key.to_lowercase()) {
            self.default_palette = colors.clone();
        }
    }

    #[must_use]
    pub fn template(&self, kind: ArchetypeKind) -> Option<&ArchetypeTemplate> {
        self.templates.get(&kind)
    }

    /// Template for `kind`, or a neutral one when the catalog lacks it.
    #[must_use]
    pub fn template_or_default(&self, kind: ArchetypeKind) -> ArchetypeTemplate {
        self.template(kind).cloned().unwrap_or(ArchetypeTemplate {
            kind,
            material: "basic",
            base_color: HexColor::from_u32(0x808080),
            dimensions: None,
        })
    }

    /// Palette registered under the lower-cased `name`, if any.
    #[must_use]
    pub fn palette(&self, name: &str) -> Option<&[HexColor]> {
        self.palettes.get(&name.to_lowercase()).map(Vec::as_slice)
    }

    /// Palette for `name`, else the default palette.
    #[must_use]
    pub fn palette_or_default(&self, name: &str) -> &[HexColor] {
        self.palette(name).unwrap_or(&self.default_palette)
    }

    /// Registered template kinds in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = ArchetypeKind> + '_ {
        ArchetypeKind::ALL
            .into_iter()
            .filter(|kind| self.templates.contains_key(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_archetype_has_a_template() {
        let catalog = Catalog::builtin();
        for kind in ArchetypeKind::ALL {
            let template = catalog.template(kind).expect("template registered");
            assert!(!template.material.is_empty());
            assert_eq!(template.kind, kind);
        }
    }

    #[test]
    fn vase_template_matches_table() {
        let template = Catalog::shared().template(ArchetypeKind::Vase).expect("vase");
        let dims = template.dimensions.as_ref().expect("vase dims");
        assert_eq!(dims.get("height"), Some(3.0));
        assert_eq!(dims.get("radiusTop"), Some(0.6));
        assert_eq!(dims.get("radiusBottom"), Some(1.0));
        assert_eq!(template.base_color.to_string(), "#E67E22");
    }

    #[test]
    fn unknown_palette_uses_vase_colors() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.palette_or_default("floor lamp"), catalog.palette_or_default("vase"));
        assert_eq!(catalog.palette_or_default("SOFA")[0].to_string(), "#808000");
    }

    #[test]
    fn from_id_is_exact_and_case_insensitive() {
        assert_eq!(ArchetypeKind::from_id("Frame"), Some(ArchetypeKind::Frame));
        assert_eq!(ArchetypeKind::from_id("picture frame"), None);
    }

    #[test]
    fn shared_catalog_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>(_: &T) {}
        assert_send_sync(Catalog::shared());
    }
}
