use cluster_common::{ClusterConfig, extract_scalar};
use glam::{Vec2, Vec3};

use crate::camera::ShadingUniforms;
use crate::grid::ClusterGrid;
use crate::light::{LightBuffer, PointLight};

use super::falloff::cubic_gaussian;
use super::gbuffer::GBufferSample;

/// Constant ambient term, multiplied by albedo
pub const AMBIENT_LIGHT: Vec3 = Vec3::splat(0.025);
/// Blinn-Phong exponent
pub const SPECULAR_EXPONENT: f32 = 2.0;
/// Scale applied to each light's specular term
pub const SPECULAR_SCALE: f32 = 0.01;

/// Per-fragment lighting over the lights stored in the fragment's cluster
///
/// Reads the cluster and light buffers only through the guarded sampling
/// path, the same way a fragment shader would.
#[derive(Debug, Clone, Copy)]
pub struct ShadingEvaluator {
    config: ClusterConfig,
    uniforms: ShadingUniforms,
}

impl ShadingEvaluator {
    pub fn new(config: &ClusterConfig, uniforms: ShadingUniforms) -> Self {
        Self {
            config: *config,
            uniforms,
        }
    }

    #[inline]
    pub fn uniforms(&self) -> &ShadingUniforms {
        &self.uniforms
    }

    /// Cluster coordinates of a fragment
    ///
    /// `frag_coord` is in pixels with the origin at the bottom-left;
    /// `position` is the fragment's world position. Z uses the same linear
    /// depth bucketing as light assignment. Out-of-grid coordinates are
    /// clamped to the boundary cluster.
    pub fn cluster_coords(&self, frag_coord: Vec2, position: Vec3) -> (usize, usize, usize) {
        let u = &self.uniforms;
        let depth = -u.view.transform_point3(position).z;
        let x = frag_coord.x * self.config.x_slices as f32 / u.screen_width;
        let y = frag_coord.y * self.config.y_slices as f32 / u.screen_height;
        let z = (depth - u.near) * self.config.z_slices as f32 / (u.far - u.near);
        (
            bucket(x, self.config.x_slices),
            bucket(y, self.config.y_slices),
            bucket(z, self.config.z_slices),
        )
    }

    /// Linear cluster id of a fragment
    #[inline]
    pub fn cluster_of(&self, frag_coord: Vec2, position: Vec3) -> usize {
        let (x, y, z) = self.cluster_coords(frag_coord, position);
        self.config.cluster_id(x, y, z)
    }

    /// Diffuse plus specular contribution of one light
    ///
    /// Diffuse is attenuated by [`cubic_gaussian`]; the specular term is
    /// not, and uses directions from the camera rather than the fragment.
    pub fn light_contribution(
        &self,
        light: &PointLight,
        position: Vec3,
        normal: Vec3,
        albedo: Vec3,
    ) -> Vec3 {
        let to_light = light.position - position;
        let distance = to_light.length();
        let l = to_light.normalize_or_zero();

        let intensity = cubic_gaussian(2.0 * distance / light.radius);
        let lambert = l.dot(normal).max(0.0);
        let diffuse = albedo * lambert * light.color * intensity;

        let camera = self.uniforms.camera_position;
        let light_direction = (light.position - camera).normalize_or_zero();
        let view_direction = (position - camera).normalize_or_zero();
        let half_way = (light_direction + view_direction).normalize_or_zero();
        let specular = normal.dot(half_way).max(0.0).powf(SPECULAR_EXPONENT);

        diffuse + specular * light.color * SPECULAR_SCALE
    }

    /// Final color of one fragment
    pub fn shade(
        &self,
        grid: &ClusterGrid,
        lights: &LightBuffer,
        frag_coord: Vec2,
        sample: &GBufferSample,
    ) -> Vec3 {
        let normal = sample.normal();
        let cluster_id = self.cluster_of(frag_coord, sample.position);

        let texels = grid.texels();
        let layout = grid.layout();
        let count = extract_scalar(texels, layout, cluster_id, 0) as usize;

        let mut color = Vec3::ZERO;
        for i in 0..self.config.num_lights {
            if i >= count {
                break;
            }
            let light_id = extract_scalar(texels, layout, cluster_id, i + 1) as usize;
            let light = lights.unpack(light_id);
            color += self.light_contribution(&light, sample.position, normal, sample.albedo);
        }

        color + sample.albedo * AMBIENT_LIGHT
    }
}

/// `floor(value)` clamped to `[0, slices - 1]`; NaN maps to 0
#[inline]
fn bucket(value: f32, slices: usize) -> usize {
    value.floor().clamp(0.0, slices.saturating_sub(1) as f32) as usize
}
