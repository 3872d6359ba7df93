use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use slotmap::SlotMap;

use crate::math::Vector3;
use crate::render::shaders::{self, ShaderSource};

slotmap::new_key_type! {
    /// Unique identifier for a material shared between meshes.
    pub struct MaterialId;
}

/// 8-bit sRGB color, written as `#rrggbb` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to `[0, 1]`.
    #[must_use]
    pub fn to_unit(self) -> Vector3 {
        Vector3::new(
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }

    /// Inverse of [`to_unit`](Self::to_unit); channels are clamped.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_unit(v: &Vector3) -> Self {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(q(v.x), q(v.y), q(v.z))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error returned when a color string is not `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRgbError(String);

impl fmt::Display for ParseRgbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color {:?}, expected #rrggbb", self.0)
    }
}

impl std::error::Error for ParseRgbError {}

impl FromStr for Rgb {
    type Err = ParseRgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let err = || ParseRgbError(s.to_owned());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Surface appearance shared by meshes.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Blends `low` → `high` by `(z + offset) / span`, clamped.
    HeightGradient {
        low: Rgb,
        high: Rgb,
        offset: f64,
        span: f64,
    },
    Solid { color: Rgb },
}

impl Material {
    /// Blue at the base to teal at the top.
    #[must_use]
    pub fn height_gradient() -> Self {
        Self::HeightGradient {
            low: Rgb::new(0x00, 0x00, 0xff),
            high: Rgb::new(0x00, 0xff, 0xcc),
            offset: 20.0,
            span: 50.0,
        }
    }

    /// Custom program drawing this material, or `None` for a flat color
    /// the backend shades natively.
    #[must_use]
    pub fn shader_source(&self) -> Option<ShaderSource> {
        match self {
            Self::HeightGradient { .. } => Some(shaders::HEIGHT_GRADIENT),
            Self::Solid { .. } => None,
        }
    }

    /// Color at height `z`.
    #[must_use]
    pub fn color_at(&self, z: f64) -> Rgb {
        match self {
            Self::HeightGradient {
                low,
                high,
                offset,
                span,
            } => {
                let t = if *span > 0.0 {
                    ((z + offset) / span).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                Rgb::from_unit(&low.to_unit().lerp(&high.to_unit(), t))
            }
            Self::Solid { color } => *color,
        }
    }
}

/// Materials keyed by id, plus the category → material mapping used when
/// building meshes.
#[derive(Debug, Default)]
pub struct MaterialPalette {
    materials: SlotMap<MaterialId, Material>,
    by_category: HashMap<String, MaterialId>,
    fallback: Option<MaterialId>,
}

impl MaterialPalette {
    /// Palette whose fallback is `fallback`.
    #[must_use]
    pub fn new(fallback: Material) -> Self {
        let mut palette = Self::default();
        let id = palette.materials.insert(fallback);
        palette.fallback = Some(id);
        palette
    }

    /// Registers a material for `category`, replacing any previous one.
    pub fn assign(&mut self, category: impl Into<String>, material: Material) -> MaterialId {
        let id = self.materials.insert(material);
        self.by_category.insert(category.into(), id);
        id
    }

    /// Material for `category`, or the fallback.
    #[must_use]
    pub fn resolve(&self, category: &str) -> Option<MaterialId> {
        self.by_category.get(category).copied().or(self.fallback)
    }

    #[must_use]
    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_hex() {
        let c: Rgb = "#ffaa00".parse().unwrap();
        assert_eq!(c, Rgb::new(0xff, 0xaa, 0x00));
        assert_eq!(c.to_string(), "#ffaa00");
        assert_eq!("22090a".parse::<Rgb>().unwrap(), Rgb::new(0x22, 0x09, 0x0a));
    }

    #[test]
    fn rejects_bad_hex() {
        assert!("#fff".parse::<Rgb>().is_err());
        assert!("#gggggg".parse::<Rgb>().is_err());
        assert!("#ffé000".parse::<Rgb>().is_err());
    }

    #[test]
    fn height_gradient_blends_and_clamps() {
        let m = Material::height_gradient();
        assert_eq!(m.color_at(-20.0), Rgb::new(0x00, 0x00, 0xff));
        assert_eq!(m.color_at(30.0), Rgb::new(0x00, 0xff, 0xcc));
        assert_eq!(m.color_at(500.0), Rgb::new(0x00, 0xff, 0xcc));
        let mid = m.color_at(5.0);
        assert!(mid.g > 0x70 && mid.g < 0x90);
    }

    #[test]
    fn palette_falls_back_for_unknown_category() {
        let mut palette = MaterialPalette::new(Material::height_gradient());
        let dem = palette.assign("DEMOCRAT", Material::Solid { color: Rgb::new(0, 0x15, 0xbc) });
        assert_eq!(palette.resolve("DEMOCRAT"), Some(dem));
        let fallback = palette.resolve("NO_PARTY").unwrap();
        assert_ne!(fallback, dem);
        assert_eq!(palette.get(fallback), Some(&Material::height_gradient()));
    }

    #[test]
    fn only_gradient_needs_a_custom_program() {
        assert_eq!(Material::height_gradient().shader_source(), Some(shaders::HEIGHT_GRADIENT));
        assert_eq!(Material::Solid { color: Rgb::WHITE }.shader_source(), None);
    }
}
