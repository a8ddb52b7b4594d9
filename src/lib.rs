//! Planar water reflection for 2D surfaces.
//!
//! An auxiliary orthographic camera captures the scene just above a surface
//! into an off-screen render target; a water material then samples that
//! target (plus a tiling water texture) on the surface itself. This crate
//! owns the camera/buffer/material derivation; the host owns the surface,
//! the capture camera entity, and when parameters change.
//!
//! # Usage
//!
//! ```ignore
//! use bevy_water_reflection::{
//!   ReflectionSurface, WaterReflection, WaterReflectionPlugin,
//! };
//!
//! app.add_plugins(WaterReflectionPlugin);
//!
//! let capture_camera = commands.spawn((Camera2d, Transform::default())).id();
//!
//! commands.spawn((
//!   ReflectionSurface::new(Vec2::new(4.0, 2.0)),
//!   WaterReflection {
//!     camera: Some(capture_camera),
//!     water_texture: Some(water_texture),
//!     ..default()
//!   },
//!   Mesh2d(quad),
//!   Transform::default(),
//! ));
//! ```
//!
//! Recompute happens when the rig or surface component changes, when a
//! settings asset reloads, or on an explicit [`RecomputeReflection`] message.
//! There is no per-frame work otherwise.

use bevy::prelude::*;
use bevy::sprite_render::Material2dPlugin;
use bevy::transform::TransformSystems;
use bevy_common_assets::toml::TomlAssetPlugin;

mod components;
mod material;
mod params;
mod rig;
mod systems;

pub use components::{
  RecomputeReflection, ReflectionOutput, ReflectionSettingsSource, ReflectionSurface,
  WaterReflection,
};
pub use material::{WaterMaterial, WaterUniforms};
pub use params::ReflectionParameters;
pub use rig::{ReflectionError, ReflectionView, SurfaceBounds, derive_view};

/// System set for reflection rig systems.
///
/// Runs in `PostUpdate` after `TransformSystems::Propagate`, so surface
/// movement from the same frame is already reflected in `GlobalTransform`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReflectionSet;

/// Plugin wiring the reflection rig into an `App`.
///
/// Works headless: material registration against the render world only
/// happens when `RenderPlugin` is present, everything else (recompute logic,
/// settings loading) is unconditional.
pub struct WaterReflectionPlugin;

impl Plugin for WaterReflectionPlugin {
  fn build(&self, app: &mut App) {
    if app.is_plugin_added::<bevy::render::RenderPlugin>() {
      bevy::asset::embedded_asset!(app, "shaders/water.wgsl");
      app.add_plugins(Material2dPlugin::<WaterMaterial>::default());
    } else {
      // Normally done by Material2dPlugin.
      app.init_asset::<WaterMaterial>();
    }

    app.add_plugins(TomlAssetPlugin::<ReflectionParameters>::new(&[
      "reflection.toml",
    ]));

    app.add_message::<RecomputeReflection>();

    app.configure_sets(PostUpdate, ReflectionSet.after(TransformSystems::Propagate));

    app.add_systems(Update, systems::apply_reflection_settings);
    app.add_systems(
      PostUpdate,
      systems::recompute_reflection.in_set(ReflectionSet),
    );
  }
}
