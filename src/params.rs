//! Tunable reflection parameters.
//!
//! A flat record of everything an editing layer may tweak: the geometric
//! controls consumed by [`crate::rig::derive_view`] and the shader-facing
//! values copied verbatim into the water material. The rig only ever reads
//! these; mutation belongs to the host (inspector UI, TOML settings file,
//! plain code).
//!
//! Deserializes from TOML with per-field defaults, so a settings file only
//! needs the fields it overrides (same convention as any of our asset-backed
//! configs).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Tunable controls for one reflection rig.
#[derive(Asset, TypePath, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionParameters {
  /// Off-screen buffer resolution per world unit of surface.
  pub pixels_per_unit: u32,

  /// Vertical squeeze of the captured band. 1: none, > 1: smaller
  /// reflection, < 1: taller reflection. Must stay positive.
  pub vertical_squeeze_ratio: f32,

  /// Extra height added to the capture camera, which by default sits just
  /// above the surface.
  pub vertical_camera_offset: f32,

  /// Water tint, written as `#rrggbb` or `#rrggbbaa` in settings files.
  #[serde(with = "hex_color")]
  pub color: Color,

  /// Strength of the water's turbulences.
  pub turbulences_strength: f32,

  /// Scroll speed of the water pattern.
  pub water_speed: f32,

  /// How much refraction (> 0) or reflection (< 0) patterns are visible.
  /// Passed through signed and unclamped; the shader owns the
  /// interpretation.
  pub refraction: f32,

  /// Scale of the noise that moves and distorts turbulences.
  pub noise_scale: f32,

  /// Power given to that noise.
  pub noise_power: f32,

  /// Wave pattern inversed scale, written as `[x, y]` in settings files.
  #[serde(with = "vec2_array")]
  pub wave_inversed_scale: Vec2,
}

impl Default for ReflectionParameters {
  fn default() -> Self {
    Self {
      pixels_per_unit: 32,
      vertical_squeeze_ratio: 1.0,
      vertical_camera_offset: 0.0,
      color: Color::WHITE,
      turbulences_strength: 0.4,
      water_speed: 0.01,
      refraction: 0.5,
      noise_scale: 10.0,
      noise_power: 0.03,
      wave_inversed_scale: Vec2::ONE,
    }
  }
}

/// Array serde for [`Vec2`]; glam's own serde support sits behind a bevy
/// feature this crate doesn't require.
mod vec2_array {
  use bevy::prelude::*;
  use serde::{Deserialize, Deserializer, Serialize, Serializer};

  pub fn serialize<S: Serializer>(value: &Vec2, serializer: S) -> Result<S::Ok, S::Error> {
    value.to_array().serialize(serializer)
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec2, D::Error> {
    let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
    Ok(Vec2::new(x, y))
  }
}

/// Hex-string serde for [`Color`], so settings files can say
/// `color = "#3f72afcc"` without pulling in bevy's serialize feature.
mod hex_color {
  use bevy::prelude::*;
  use serde::{Deserialize, Deserializer, Serializer, de};

  pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
    let [r, g, b, a] = color.to_srgba().to_u8_array();
    serializer.serialize_str(&format!("#{r:02x}{g:02x}{b:02x}{a:02x}"))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
    let s: String = Deserialize::deserialize(deserializer)?;
    let s = s.trim_start_matches('#');
    if s.len() != 6 && s.len() != 8 {
      return Err(de::Error::custom("hex color must be 6 or 8 characters"));
    }
    let byte = |range| u8::from_str_radix(&s[range], 16).map_err(de::Error::custom);
    let r = byte(0..2)?;
    let g = byte(2..4)?;
    let b = byte(4..6)?;
    let a = if s.len() == 8 { byte(6..8)? } else { 255 };
    Ok(Color::srgba_u8(r, g, b, a))
  }
}
