//! Core reflection-camera geometry derivation.
//!
//! Given the surface bounds and the tunable parameters, derives everything the
//! ECS layer needs to rebuild the rig: the off-screen buffer resolution, the
//! capture camera's orthographic projection, and the camera center. The math
//! lives here as a pure function so it can be tested without an `App` or a
//! GPU; `systems::recompute_reflection` applies the result to the world.

use bevy::prelude::*;
use thiserror::Error;

use crate::params::ReflectionParameters;

/// Read-only snapshot of the reflection surface's world-space bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceBounds {
  /// World position of the surface's center.
  pub position: Vec2,
  /// World-space width and height of the surface.
  pub size: Vec2,
}

impl SurfaceBounds {
  pub fn new(position: Vec2, size: Vec2) -> Self {
    Self { position, size }
  }
}

/// Derived capture-camera configuration for one recompute.
///
/// Values are what the rig writes to the camera and render target; asset
/// identities are allocated later by the recompute system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReflectionView {
  /// Off-screen buffer resolution in pixels.
  pub buffer_size: UVec2,
  /// Capture camera aspect ratio (width / squeezed height).
  pub aspect: f32,
  /// Orthographic half-height of the capture camera, in world units.
  pub ortho_half_height: f32,
  /// World-space height covered by the capture camera (squeezed).
  pub camera_height: f32,
  /// Where the capture camera goes; z is left to the host.
  pub camera_center: Vec2,
}

impl ReflectionView {
  /// World-space extent of the capture projection, for
  /// `ScalingMode::Fixed { width, height }`.
  pub fn projection_extent(&self) -> Vec2 {
    Vec2::new(self.aspect * self.camera_height, self.camera_height)
  }
}

/// Failure of the geometry derivation. Produced before any mutation, so a
/// failed recompute commits nothing.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ReflectionError {
  /// Effective camera height would be zero or negative, which makes the
  /// aspect ratio undefined. The caller must keep surface height and squeeze
  /// ratio positive.
  #[error(
    "degenerate reflection geometry: surface height {surface_height} * squeeze ratio {squeeze_ratio} must be positive"
  )]
  DegenerateGeometry {
    surface_height: f32,
    squeeze_ratio: f32,
  },

  /// Derived buffer resolution has a zero dimension (surface narrower than
  /// one world unit after truncation, or `pixels_per_unit` is zero).
  #[error("reflection buffer would be {width}x{height}; both dimensions must be at least 1")]
  EmptyBuffer { width: u32, height: u32 },
}

/// Derives the capture-camera configuration for `surface` under `params`.
///
/// Buffer resolution truncates the surface size toward zero before scaling by
/// `pixels_per_unit`, so a sub-unit remainder of the surface is dropped. That
/// precision loss is intentional and kept; callers that need exact coverage
/// should use integer surface sizes.
///
/// The camera is centered horizontally on the surface and placed just above
/// it: half the surface height up to reach the top edge, then half the
/// squeezed camera height so the captured band sits entirely above the
/// surface, plus the configured vertical offset.
pub fn derive_view(
  surface: SurfaceBounds,
  params: &ReflectionParameters,
) -> Result<ReflectionView, ReflectionError> {
  let camera_height = surface.size.y * params.vertical_squeeze_ratio;
  if camera_height <= 0.0 {
    return Err(ReflectionError::DegenerateGeometry {
      surface_height: surface.size.y,
      squeeze_ratio: params.vertical_squeeze_ratio,
    });
  }

  // Truncation toward zero, matching integer pixel coverage of whole units.
  let width = surface.size.x.trunc() as u32 * params.pixels_per_unit;
  let height = surface.size.y.trunc() as u32 * params.pixels_per_unit;
  if width == 0 || height == 0 {
    return Err(ReflectionError::EmptyBuffer { width, height });
  }

  let aspect = surface.size.x / camera_height;
  let ortho_half_height = params.vertical_squeeze_ratio * surface.size.y / 2.0;

  let camera_center = Vec2::new(
    surface.position.x,
    params.vertical_camera_offset
      + surface.position.y
      + surface.size.y / 2.0
      + camera_height / 2.0,
  );

  Ok(ReflectionView {
    buffer_size: UVec2::new(width, height),
    aspect,
    ortho_half_height,
    camera_height,
    camera_center,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn params() -> ReflectionParameters {
    ReflectionParameters::default()
  }

  #[test]
  fn unsqueezed_view_matches_surface() {
    let view = derive_view(
      SurfaceBounds::new(Vec2::ZERO, Vec2::new(4.0, 2.0)),
      &params(),
    )
    .unwrap();

    assert_eq!(view.buffer_size, UVec2::new(128, 64));
    assert_eq!(view.aspect, 2.0);
    assert_eq!(view.ortho_half_height, 1.0);
    assert_eq!(view.camera_height, 2.0);
    assert_eq!(view.projection_extent(), Vec2::new(4.0, 2.0));
  }

  #[test]
  fn squeeze_scales_height_not_width() {
    let p = ReflectionParameters {
      vertical_squeeze_ratio: 2.0,
      ..params()
    };
    let view = derive_view(SurfaceBounds::new(Vec2::ZERO, Vec2::new(4.0, 2.0)), &p).unwrap();

    assert_eq!(view.camera_height, 4.0);
    assert_eq!(view.aspect, 1.0);
    assert_eq!(view.ortho_half_height, 2.0);
    // Half the squeezed height above the surface's top edge.
    assert_eq!(view.camera_center.y, 1.0 + 2.0);
    assert_eq!(view.projection_extent(), Vec2::new(4.0, 4.0));
  }

  #[test]
  fn camera_center_stacks_offset_surface_and_squeeze() {
    let p = ReflectionParameters {
      vertical_camera_offset: 5.0,
      ..params()
    };
    let view = derive_view(
      SurfaceBounds::new(Vec2::new(0.0, 10.0), Vec2::new(4.0, 2.0)),
      &p,
    )
    .unwrap();

    // 5 (offset) + 10 (surface y) + 1 (half surface) + 1 (half camera)
    assert_eq!(view.camera_center, Vec2::new(0.0, 17.0));
  }

  #[test]
  fn camera_center_follows_surface_x() {
    let view = derive_view(
      SurfaceBounds::new(Vec2::new(-3.5, 0.0), Vec2::new(4.0, 2.0)),
      &params(),
    )
    .unwrap();

    assert_eq!(view.camera_center.x, -3.5);
  }

  #[test]
  fn fractional_surface_sizes_truncate_toward_zero() {
    let view = derive_view(
      SurfaceBounds::new(Vec2::ZERO, Vec2::new(4.9, 2.9)),
      &params(),
    )
    .unwrap();

    // 4.9 -> 4 units, 2.9 -> 2 units; never rounded up.
    assert_eq!(view.buffer_size, UVec2::new(128, 64));
    // The projection still covers the true (fractional) surface extent.
    assert_eq!(view.projection_extent(), Vec2::new(4.9, 2.9));
  }

  #[test]
  fn zero_squeeze_ratio_is_rejected() {
    let p = ReflectionParameters {
      vertical_squeeze_ratio: 0.0,
      ..params()
    };
    let err = derive_view(SurfaceBounds::new(Vec2::ZERO, Vec2::new(4.0, 2.0)), &p).unwrap_err();

    assert_eq!(
      err,
      ReflectionError::DegenerateGeometry {
        surface_height: 2.0,
        squeeze_ratio: 0.0,
      }
    );
  }

  #[test]
  fn zero_surface_height_is_rejected() {
    let err = derive_view(
      SurfaceBounds::new(Vec2::ZERO, Vec2::new(4.0, 0.0)),
      &params(),
    )
    .unwrap_err();

    assert!(matches!(err, ReflectionError::DegenerateGeometry { .. }));
  }

  #[test]
  fn sub_unit_surface_yields_empty_buffer() {
    let err = derive_view(
      SurfaceBounds::new(Vec2::ZERO, Vec2::new(0.5, 2.0)),
      &params(),
    )
    .unwrap_err();

    assert_eq!(
      err,
      ReflectionError::EmptyBuffer {
        width: 0,
        height: 64,
      }
    );
  }

  #[test]
  fn derivation_is_deterministic() {
    let surface = SurfaceBounds::new(Vec2::new(1.0, 2.0), Vec2::new(6.0, 3.0));
    let p = ReflectionParameters {
      vertical_squeeze_ratio: 1.5,
      vertical_camera_offset: 0.25,
      ..params()
    };

    assert_eq!(derive_view(surface, &p), derive_view(surface, &p));
  }
}
