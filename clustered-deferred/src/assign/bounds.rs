use cluster_common::ClusterConfig;
use glam::Mat4;

use crate::camera::Camera;
use crate::light::PointLight;

/// Inclusive cluster-index range overlapped by one light
///
/// Every bound is clamped to `[0, slices - 1]` on its axis, so a range is
/// never empty: lights outside the frustum land on the boundary clusters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrustumBounds {
    pub x_min: usize,
    pub x_max: usize,
    pub y_min: usize,
    pub y_max: usize,
    pub z_min: usize,
    pub z_max: usize,
}

impl FrustumBounds {
    /// Whether cluster (`x`, `y`, `z`) lies inside the range
    #[inline]
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        (self.x_min..=self.x_max).contains(&x)
            && (self.y_min..=self.y_max).contains(&y)
            && (self.z_min..=self.z_max).contains(&z)
    }

    /// Number of clusters covered
    #[inline]
    pub fn cluster_count(&self) -> usize {
        (self.x_max - self.x_min + 1)
            * (self.y_max - self.y_min + 1)
            * (self.z_max - self.z_min + 1)
    }

    /// Covered clusters, z-major then y then x
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (self.z_min..=self.z_max).flat_map(move |z| {
            (self.y_min..=self.y_max)
                .flat_map(move |y| (self.x_min..=self.x_max).map(move |x| (x, y, z)))
        })
    }
}

/// Cluster range overlapped by `light`'s bounding sphere
///
/// X and Y are re-centered into `[0, extent]` before slicing; Z is measured
/// as view depth (`-view_z`) past the near plane, so index 0 is nearest the
/// camera. A negative or NaN radius collapses to the cell holding the light
/// center, and a NaN coordinate clamps to index 0.
pub fn compute_frustum_bounds(
    light: &PointLight,
    view: &Mat4,
    camera: &Camera,
    config: &ClusterConfig,
) -> FrustumBounds {
    let extent = camera.frustum_extent();
    let slice = camera.slice_size(config);

    let view_position = view.transform_point3(light.position);
    let depth = -view_position.z;
    let radius = light.radius.max(0.0);

    let x_offset = view_position.x + 0.5 * extent.x;
    let y_offset = view_position.y + 0.5 * extent.y;
    let z_offset = depth - camera.near;

    let (x_min, x_max) = axis_range(x_offset, radius, slice.x, config.x_slices);
    let (y_min, y_max) = axis_range(y_offset, radius, slice.y, config.y_slices);
    let (z_min, z_max) = axis_range(z_offset, radius, slice.z, config.z_slices);

    FrustumBounds {
        x_min,
        x_max,
        y_min,
        y_max,
        z_min,
        z_max,
    }
}

/// Ordered slice indices of `[offset - radius, offset + radius]`
///
/// Ordering only matters for degenerate cameras (`far < near`), where the
/// slice size is negative.
#[inline]
fn axis_range(offset: f32, radius: f32, slice_size: f32, slices: usize) -> (usize, usize) {
    let a = slice_index(offset - radius, slice_size, slices);
    let b = slice_index(offset + radius, slice_size, slices);
    (a.min(b), a.max(b))
}

/// `floor(offset / slice_size)` clamped to `[0, slices - 1]`
#[inline]
fn slice_index(offset: f32, slice_size: f32, slices: usize) -> usize {
    let last = slices.saturating_sub(1);
    // NaN survives clamp and saturates to 0 in the cast
    (offset / slice_size).floor().clamp(0.0, last as f32) as usize
}
