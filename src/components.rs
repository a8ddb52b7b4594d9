//! Components and messages for the reflection rig.

use bevy::prelude::*;

use crate::material::WaterMaterial;
use crate::params::ReflectionParameters;

/// Marks an entity as a reflection surface and records its world-space size.
///
/// The rig only ever reads this (and the entity's `GlobalTransform`); the
/// host owns the surface's geometry.
#[derive(Component, Clone, Copy, Debug)]
pub struct ReflectionSurface {
  /// World-space width and height of the surface.
  pub size: Vec2,
}

impl ReflectionSurface {
  pub fn new(size: Vec2) -> Self {
    Self { size }
  }
}

/// The reflection rig, placed on the surface entity.
///
/// References are optional because rigs are commonly configured
/// incrementally; while any of them is missing, recompute is a silent no-op
/// rather than an error. Editing any field triggers a recompute through
/// change detection, or send [`RecomputeReflection`] to force one.
#[derive(Component, Clone, Debug, Default)]
pub struct WaterReflection {
  /// Camera that captures the scene above the surface. The rig owns its
  /// projection, render target, and x/y position; everything else about the
  /// camera stays with the host.
  pub camera: Option<Entity>,

  /// Tiling water pattern texture.
  pub water_texture: Option<Handle<Image>>,

  /// Tunable controls, read-only to the rig.
  pub params: ReflectionParameters,
}

/// Core-owned output of the last successful recompute, inserted on the
/// surface entity. Replaced whole each time; the previous target image and
/// material assets are removed so repeated recomputes don't accumulate.
#[derive(Component, Clone, Debug)]
pub struct ReflectionOutput {
  /// Off-screen buffer the capture camera renders into.
  pub target: Handle<Image>,
  /// Material currently installed on the surface.
  pub material: Handle<WaterMaterial>,
  /// Resolution of `target`.
  pub buffer_size: UVec2,
}

/// Points a rig at a TOML settings asset (`*.reflection.toml`).
///
/// Whenever the asset loads or hot-reloads, its values are copied into
/// [`WaterReflection::params`], which triggers a recompute like any other
/// parameter edit.
#[derive(Component, Clone, Debug)]
pub struct ReflectionSettingsSource(pub Handle<ReflectionParameters>);

/// Forces a recompute of every rig on the next frame, even with unchanged
/// inputs. Recompute is idempotent, so this is only observable through fresh
/// asset identities.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct RecomputeReflection;
