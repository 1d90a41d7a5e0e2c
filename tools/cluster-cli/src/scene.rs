//! Synthetic light scene
//!
//! Lights are scattered uniformly inside an axis-aligned box and drift along
//! Y every frame, wrapping around when they leave the box.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use clustered_deferred::PointLight;

use crate::settings::SceneSettings;

#[derive(Debug, Clone)]
pub struct Scene {
    lights: Vec<PointLight>,
    min: Vec3,
    max: Vec3,
    dt: f32,
}

impl Scene {
    /// Spawn `count` lights from the settings' seed
    pub fn generate(settings: &SceneSettings, count: usize) -> Self {
        let min = Vec3::from(settings.light_min);
        let max = Vec3::from(settings.light_max);
        let lo = min.min(max);
        let hi = min.max(max);
        let mut rng = Pcg32::seed_from_u64(settings.seed);

        let lights = (0..count)
            .map(|_| {
                let t = Vec3::new(rng.random(), rng.random(), rng.random());
                let color = Vec3::new(rng.random(), rng.random(), rng.random());
                PointLight::new(lo + (hi - lo) * t, settings.light_radius, color)
            })
            .collect();

        tracing::debug!("Generated {} lights (seed {})", count, settings.seed);
        Self {
            lights,
            min: lo,
            max: hi,
            dt: settings.light_dt,
        }
    }

    #[inline]
    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// Advance one frame
    pub fn step(&mut self) {
        let span = self.max.y - self.min.y;
        for light in &mut self.lights {
            light.position.y += self.dt;
            if span <= 0.0 {
                light.position.y = self.min.y;
            } else if light.position.y < self.min.y {
                light.position.y += span;
            } else if light.position.y > self.max.y {
                light.position.y -= span;
            }
        }
    }
}
