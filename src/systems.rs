//! Recompute and settings-reload systems.

use bevy::asset::AssetEvent;
use bevy::camera::{RenderTarget, ScalingMode};
use bevy::ecs::message::MessageReader;
use bevy::image::ImageSampler;
use bevy::prelude::*;
use bevy::render::render_resource::{
  Extent3d, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
};

use crate::components::{
  RecomputeReflection, ReflectionOutput, ReflectionSettingsSource, ReflectionSurface,
  WaterReflection,
};
use crate::material::WaterMaterial;
use crate::params::ReflectionParameters;
use crate::rig::{SurfaceBounds, derive_view};

/// System: Rebuilds the capture camera, off-screen target, and water material
/// for every rig whose inputs changed (or for all rigs on a
/// [`RecomputeReflection`] request).
///
/// Runs after transform propagation so surface positions are current. Each
/// pass is all-or-nothing per rig: the geometry is derived first, and only a
/// successful derivation touches the camera, images, or materials. A rig with
/// a missing camera reference or water texture is skipped silently; rigs get
/// wired up incrementally and the gap is not an error.
#[allow(clippy::too_many_arguments)]
pub fn recompute_reflection(
  mut commands: Commands,
  mut requests: MessageReader<RecomputeReflection>,
  mut images: ResMut<Assets<Image>>,
  mut materials: ResMut<Assets<WaterMaterial>>,
  rigs: Query<(
    Entity,
    Ref<WaterReflection>,
    Ref<ReflectionSurface>,
    Ref<GlobalTransform>,
    Option<&ReflectionOutput>,
  )>,
  mut cameras: Query<(&mut Camera, &mut Projection, &mut Transform)>,
) {
  let forced = !requests.is_empty();
  requests.clear();

  for (entity, rig, surface, global_transform, previous) in rigs.iter() {
    if !(forced || rig.is_changed() || surface.is_changed() || global_transform.is_changed()) {
      continue;
    }

    let Some(camera_entity) = rig.camera else {
      debug!("reflection rig {entity} has no camera yet; skipping recompute");
      continue;
    };
    let Some(water_texture) = rig.water_texture.clone() else {
      debug!("reflection rig {entity} has no water texture yet; skipping recompute");
      continue;
    };
    let Ok((mut camera, mut projection, mut camera_transform)) = cameras.get_mut(camera_entity)
    else {
      debug!("reflection camera {camera_entity} not found; skipping recompute");
      continue;
    };

    let bounds = SurfaceBounds::new(global_transform.translation().truncate(), surface.size);
    let view = match derive_view(bounds, &rig.params) {
      Ok(view) => view,
      Err(err) => {
        error!("water reflection recompute for {entity} failed: {err}");
        continue;
      }
    };

    // Fresh target every pass; the previous one is released below.
    let target = images.add(create_reflection_target(view.buffer_size));

    if let Some(previous) = previous {
      images.remove(&previous.target);
      materials.remove(&previous.material);
    }

    camera.target = RenderTarget::Image(target.clone().into());

    // Re-assert the derived projection over whatever the host applied,
    // leaving near/far/scale alone when the projection is already
    // orthographic.
    let extent = view.projection_extent();
    match &mut *projection {
      Projection::Orthographic(ortho) => {
        ortho.scaling_mode = ScalingMode::Fixed {
          width: extent.x,
          height: extent.y,
        };
      }
      other => {
        warn!("reflection camera {camera_entity} was not orthographic; replacing projection");
        *other = Projection::Orthographic(OrthographicProjection {
          scaling_mode: ScalingMode::Fixed {
            width: extent.x,
            height: extent.y,
          },
          ..OrthographicProjection::default_2d()
        });
      }
    }

    // z belongs to the host.
    camera_transform.translation.x = view.camera_center.x;
    camera_transform.translation.y = view.camera_center.y;

    let material = materials.add(WaterMaterial::new(
      &rig.params,
      water_texture,
      target.clone(),
    ));

    debug!(
      "water reflection {entity}: {}x{} target, aspect {:.3}, half height {:.3}",
      view.buffer_size.x, view.buffer_size.y, view.aspect, view.ortho_half_height
    );

    commands.entity(entity).insert((
      MeshMaterial2d(material.clone()),
      ReflectionOutput {
        target,
        material,
        buffer_size: view.buffer_size,
      },
    ));
  }
}

/// System: Copies loaded or hot-reloaded settings assets into their rigs.
///
/// The parameter edit itself is what triggers the recompute, via ordinary
/// change detection on [`WaterReflection`].
pub fn apply_reflection_settings(
  mut messages: MessageReader<AssetEvent<ReflectionParameters>>,
  settings: Res<Assets<ReflectionParameters>>,
  mut rigs: Query<(&ReflectionSettingsSource, &mut WaterReflection)>,
) {
  for event in messages.read() {
    let id = match event {
      AssetEvent::Added { id } | AssetEvent::Modified { id } => *id,
      _ => continue,
    };
    for (source, mut rig) in rigs.iter_mut() {
      if source.0.id() != id {
        continue;
      }
      if let Some(params) = settings.get(id) {
        info!("reflection settings reloaded");
        rig.params = params.clone();
      }
    }
  }
}

/// Off-screen buffer the capture camera renders into.
fn create_reflection_target(size: UVec2) -> Image {
  let extent = Extent3d {
    width: size.x,
    height: size.y,
    depth_or_array_layers: 1,
  };

  let mut target = Image {
    texture_descriptor: TextureDescriptor {
      label: Some("water_reflection_target"),
      size: extent,
      dimension: TextureDimension::D2,
      format: TextureFormat::Rgba8UnormSrgb,
      mip_level_count: 1,
      sample_count: 1,
      usage: TextureUsages::TEXTURE_BINDING
        | TextureUsages::COPY_DST
        | TextureUsages::RENDER_ATTACHMENT,
      view_formats: &[],
    },
    sampler: ImageSampler::nearest(),
    ..default()
  };
  target.resize(extent);
  target
}
