//! Camera parameters and per-frame shading uniforms

use cluster_common::ClusterConfig;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective camera parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Vertical field of view in degrees (default: 75)
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    /// Width / height (default: 16/9)
    #[serde(default = "default_aspect")]
    pub aspect: f32,
    /// Near plane distance (default: 0.1)
    #[serde(default = "default_near")]
    pub near: f32,
    /// Far plane distance (default: 1000)
    #[serde(default = "default_far")]
    pub far: f32,
}

fn default_fov() -> f32 {
    75.0
}
fn default_aspect() -> f32 {
    16.0 / 9.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    1000.0
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            aspect: default_aspect(),
            near: default_near(),
            far: default_far(),
        }
    }
}

impl Camera {
    pub const fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
        }
    }

    /// Reference frustum extent `(width, height, depth)`
    ///
    /// Width and height are the cross-section at unit distance and are not
    /// scaled per depth slice.
    pub fn frustum_extent(&self) -> Vec3 {
        let height = 2.0 * (self.fov_degrees.to_radians() * 0.5).tan();
        Vec3::new(self.aspect * height, height, self.far - self.near)
    }

    /// Size of one cluster along each axis of the reference extent
    pub fn slice_size(&self, config: &ClusterConfig) -> Vec3 {
        self.frustum_extent()
            / Vec3::new(
                config.x_slices as f32,
                config.y_slices as f32,
                config.z_slices as f32,
            )
    }

    /// View-space direction through normalized device coordinates `ndc`
    pub fn view_ray(&self, ndc: Vec2) -> Vec3 {
        let half_height = (self.fov_degrees.to_radians() * 0.5).tan();
        Vec3::new(ndc.x * half_height * self.aspect, ndc.y * half_height, -1.0).normalize()
    }
}

/// Per-frame constants consumed by the shading stage
///
/// Replaces values that would otherwise be baked into the shader source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingUniforms {
    pub screen_width: f32,
    pub screen_height: f32,
    /// World → view transform
    pub view: Mat4,
    pub near: f32,
    pub far: f32,
    /// World-space camera position
    pub camera_position: Vec3,
}

impl ShadingUniforms {
    pub fn new(camera: &Camera, view: Mat4, screen_width: u32, screen_height: u32) -> Self {
        Self {
            screen_width: screen_width as f32,
            screen_height: screen_height as f32,
            view,
            near: camera.near,
            far: camera.far,
            camera_position: view.inverse().w_axis.truncate(),
        }
    }
}
