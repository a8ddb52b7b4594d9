//! Water material: the binding between the reflection capture and the shader.
//!
//! Two texture slots (the tiling water pattern and the off-screen reflection
//! buffer) plus one uniform block carrying the shader-facing subset of
//! [`ReflectionParameters`]. The binding layout and names are the stable
//! contract with the shader; `shaders/water.wgsl` is just one consumer of it.
//! A material is rebuilt in full on every recompute, never patched in place.

use bevy::prelude::*;
use bevy::render::render_resource::{AsBindGroup, ShaderType};
use bevy::shader::ShaderRef;
use bevy::sprite_render::Material2d;

use crate::params::ReflectionParameters;

/// Scalar/vector shader inputs, copied verbatim from the parameters.
///
/// Field order matters for WGSL alignment - the vec4 leads, the vec2 trails
/// the scalars.
#[derive(Clone, Copy, Debug, PartialEq, ShaderType)]
pub struct WaterUniforms {
  /// Water tint (linear RGBA).
  pub color: Vec4,
  /// Strength of the water's turbulences.
  pub turbulences_strength: f32,
  /// Scroll speed of the water pattern.
  pub water_speed: f32,
  /// Refraction (> 0) vs reflection (< 0) visibility. Signed, unclamped.
  pub refraction: f32,
  /// Scale of the distortion noise.
  pub noise_scale: f32,
  /// Power of the distortion noise.
  pub noise_power: f32,
  /// Wave pattern inversed scale.
  pub pattern_size_reduction: Vec2,
}

impl From<&ReflectionParameters> for WaterUniforms {
  fn from(params: &ReflectionParameters) -> Self {
    Self {
      color: params.color.to_linear().to_vec4(),
      turbulences_strength: params.turbulences_strength,
      water_speed: params.water_speed,
      refraction: params.refraction,
      noise_scale: params.noise_scale,
      noise_power: params.noise_power,
      pattern_size_reduction: params.wave_inversed_scale,
    }
  }
}

/// Material applied to the reflection surface.
#[derive(Asset, TypePath, AsBindGroup, Clone)]
pub struct WaterMaterial {
  /// Tiling water pattern texture.
  #[texture(0)]
  #[sampler(1)]
  pub water_texture: Handle<Image>,

  /// Off-screen buffer the capture camera renders into.
  #[texture(2)]
  #[sampler(3)]
  pub reflection_texture: Handle<Image>,

  /// Shader parameters.
  #[uniform(4)]
  pub uniforms: WaterUniforms,
}

impl WaterMaterial {
  /// Builds the full binding for one recompute.
  pub fn new(
    params: &ReflectionParameters,
    water_texture: Handle<Image>,
    reflection_texture: Handle<Image>,
  ) -> Self {
    Self {
      water_texture,
      reflection_texture,
      uniforms: WaterUniforms::from(params),
    }
  }
}

impl Material2d for WaterMaterial {
  fn fragment_shader() -> ShaderRef {
    "embedded://bevy_water_reflection/shaders/water.wgsl".into()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn uniforms_copy_parameters_verbatim() {
    let params = ReflectionParameters {
      turbulences_strength: 0.7,
      water_speed: 0.05,
      noise_scale: 3.0,
      noise_power: 0.5,
      wave_inversed_scale: Vec2::new(2.0, 0.5),
      ..default()
    };
    let uniforms = WaterUniforms::from(&params);

    assert_eq!(uniforms.turbulences_strength, 0.7);
    assert_eq!(uniforms.water_speed, 0.05);
    assert_eq!(uniforms.noise_scale, 3.0);
    assert_eq!(uniforms.noise_power, 0.5);
    assert_eq!(uniforms.pattern_size_reduction, Vec2::new(2.0, 0.5));
  }

  #[test]
  fn negative_refraction_passes_through_unclamped() {
    let params = ReflectionParameters {
      refraction: -0.5,
      ..default()
    };

    assert_eq!(WaterUniforms::from(&params).refraction, -0.5);
  }

  #[test]
  fn color_is_converted_to_linear_rgba() {
    let params = ReflectionParameters {
      color: Color::linear_rgba(0.1, 0.2, 0.3, 0.4),
      ..default()
    };

    assert_eq!(
      WaterUniforms::from(&params).color,
      Vec4::new(0.1, 0.2, 0.3, 0.4)
    );
  }
}
