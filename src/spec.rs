//! Model specifications: the single value handed from the mapper to the
//! synthesizer, and the JSON shape exchanged with callers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::ArchetypeKind;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpecError {
    #[error("invalid hex color `{0}` (expected #RRGGBB)")]
    InvalidColor(String),
    #[error("dimension `{axis}` has invalid value {value}")]
    InvalidDimension { axis: String, value: f64 },
    #[error("{field} must contain three finite numbers")]
    InvalidVector { field: &'static str },
}

// ─────────────────────────────────────────────────────────────────────────────
// HexColor
// ─────────────────────────────────────────────────────────────────────────────

/// 24-bit sRGB color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const WHITE: Self = Self::from_u32(0xFFFFFF);

    /// Build from a packed `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_u32(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
        }
    }

    /// Channels as linear-agnostic floats in `[0, 1]`.
    #[must_use]
    pub fn to_unit_rgb(self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SpecError::InvalidColor(s.to_owned());
        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let rgb = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
        Ok(Self::from_u32(rgb))
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dimensions
// ─────────────────────────────────────────────────────────────────────────────

/// Semantic axis name → extent in abstract model units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dimensions(BTreeMap<String, f64>);

impl Dimensions {
    pub const HEIGHT: &'static str = "height";
    pub const WIDTH: &'static str = "width";
    pub const DEPTH: &'static str = "depth";
    pub const RADIUS_TOP: &'static str = "radiusTop";
    pub const RADIUS_BOTTOM: &'static str = "radiusBottom";
    pub const MID_RADIUS: &'static str = "midRadius";
    pub const RIM_THICKNESS: &'static str = "rimThickness";
    pub const NECK_HEIGHT: &'static str = "neckHeight";
    pub const NECK_RADIUS: &'static str = "neckRadius";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used for literal tables.
    #[must_use]
    pub fn with(mut self, axis: &str, value: f64) -> Self {
        self.0.insert(axis.to_owned(), value);
        self
    }

    #[must_use]
    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        pairs
            .iter()
            .fold(Self::new(), |dims, &(axis, value)| dims.with(axis, value))
    }

    #[must_use]
    pub fn get(&self, axis: &str) -> Option<f64> {
        self.0.get(axis).copied()
    }

    /// Value for `axis`, or `fallback` when absent.
    #[must_use]
    pub fn get_or(&self, axis: &str, fallback: f64) -> f64 {
        self.get(axis).unwrap_or(fallback)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Axis names must be non-empty. Values may be any number; the
    /// synthesizer clamps degenerate extents itself.
    pub fn validate(&self) -> Result<(), SpecError> {
        match self.0.iter().find(|(axis, _)| axis.trim().is_empty()) {
            Some((axis, value)) => Err(SpecError::InvalidDimension {
                axis: axis.clone(),
                value: *value,
            }),
            None => Ok(()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ModelSpec
// ─────────────────────────────────────────────────────────────────────────────

/// Concrete description of one decor model. Built once by the mapper (or
/// parsed from JSON) and consumed by the synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawModelSpec", rename_all = "camelCase")]
pub struct ModelSpec {
    pub geometry_kind: ArchetypeKind,
    pub material: String,
    pub color: HexColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<[f64; 3]>,
}

impl ModelSpec {
    /// Pretty JSON, the "download model" representation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Wire form accepted from external JSON. `geometry` is the legacy key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawModelSpec {
    #[serde(alias = "geometry")]
    geometry_kind: String,
    material: String,
    color: String,
    #[serde(default)]
    dimensions: Option<Dimensions>,
    #[serde(default)]
    position: Option<[f64; 3]>,
    #[serde(default)]
    size: Option<[f64; 3]>,
}

impl TryFrom<RawModelSpec> for ModelSpec {
    type Error = SpecError;

    fn try_from(raw: RawModelSpec) -> Result<Self, Self::Error> {
        let geometry_kind = ArchetypeKind::from_id(&raw.geometry_kind).unwrap_or_else(|| {
            warn!(
                "unknown geometry `{}`, falling back to {}",
                raw.geometry_kind,
                ArchetypeKind::FALLBACK.id()
            );
            ArchetypeKind::FALLBACK
        });

        let color = raw.color.trim().parse()?;
        if let Some(dimensions) = &raw.dimensions {
            dimensions.validate()?;
        }
        check_vector("position", raw.position)?;
        check_vector("size", raw.size)?;

        Ok(Self {
            geometry_kind,
            material: raw.material,
            color,
            dimensions: raw.dimensions,
            position: raw.position,
            size: raw.size,
        })
    }
}

fn check_vector(field: &'static str, value: Option<[f64; 3]>) -> Result<(), SpecError> {
    match value {
        Some(v) if v.iter().any(|c| !c.is_finite()) => Err(SpecError::InvalidVector { field }),
        _ => Ok(()),
    }
}
