//! Per-frame driver
//!
//! [`ClusteredRenderer`] owns the cluster grid and light buffer. Assignment
//! mutates them through `&mut self`; shading goes through a [`ClusterFrame`]
//! that borrows both read-only, so the two phases cannot overlap.

use cluster_common::{ClusterConfig, ConfigError};
use glam::{Mat4, Vec2, Vec3};
use rayon::prelude::*;

use crate::assign::{AssignmentMode, AssignmentStats, LightAssigner};
use crate::camera::{Camera, ShadingUniforms};
use crate::grid::ClusterGrid;
use crate::light::{LightBuffer, PointLight};
use crate::shading::{GBuffer, ShadingEvaluator};

/// Owns one renderer's cluster and light buffers
#[derive(Debug)]
pub struct ClusteredRenderer {
    config: ClusterConfig,
    grid: ClusterGrid,
    lights: LightBuffer,
    assigner: LightAssigner,
    mode: AssignmentMode,
    last_stats: AssignmentStats,
}

impl ClusteredRenderer {
    /// Create a renderer for a fixed configuration
    pub fn new(config: ClusterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::info!(
            "Clustered renderer: {}x{}x{} clusters, {} lights per cluster, {} lights",
            config.x_slices,
            config.y_slices,
            config.z_slices,
            config.max_lights_per_cluster,
            config.num_lights
        );
        Ok(Self {
            config,
            grid: ClusterGrid::new(&config),
            lights: LightBuffer::with_capacity(config.num_lights),
            assigner: LightAssigner::new(),
            mode: AssignmentMode::default(),
            last_stats: AssignmentStats::default(),
        })
    }

    pub fn with_mode(mut self, mode: AssignmentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn set_mode(&mut self, mode: AssignmentMode) {
        self.mode = mode;
    }

    #[inline]
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    #[inline]
    pub fn mode(&self) -> AssignmentMode {
        self.mode
    }

    /// Rebuild both buffers from this frame's camera and lights
    ///
    /// Lights past `num_lights` are ignored.
    pub fn update_clusters(
        &mut self,
        camera: &Camera,
        view: &Mat4,
        lights: &[PointLight],
    ) -> AssignmentStats {
        let lights = if lights.len() > self.config.num_lights {
            tracing::warn!(
                "{} lights supplied, only the first {} are assigned",
                lights.len(),
                self.config.num_lights
            );
            &lights[..self.config.num_lights]
        } else {
            lights
        };

        self.lights.pack(lights);
        let stats = self
            .assigner
            .assign_with_mode(self.mode, &mut self.grid, lights, view, camera);

        if stats.dropped > 0 {
            tracing::warn!(
                "Cluster capacity exceeded: {} assignments dropped across {} clusters \
                 (max {} per cluster)",
                stats.dropped,
                stats.overflow_clusters,
                self.config.max_lights_per_cluster
            );
        }
        self.last_stats = stats;
        stats
    }

    /// Statistics of the most recent [`ClusteredRenderer::update_clusters`]
    #[inline]
    pub fn last_stats(&self) -> &AssignmentStats {
        &self.last_stats
    }

    /// Read-only view of the finished buffers for shading
    pub fn frame(&self) -> ClusterFrame<'_> {
        ClusterFrame {
            config: &self.config,
            grid: &self.grid,
            lights: &self.lights,
        }
    }
}

/// Finished cluster and light buffers of one frame
#[derive(Debug, Clone, Copy)]
pub struct ClusterFrame<'a> {
    config: &'a ClusterConfig,
    grid: &'a ClusterGrid,
    lights: &'a LightBuffer,
}

impl<'a> ClusterFrame<'a> {
    #[inline]
    pub fn grid(&self) -> &'a ClusterGrid {
        self.grid
    }

    #[inline]
    pub fn lights(&self) -> &'a LightBuffer {
        self.lights
    }

    pub fn evaluator(&self, uniforms: ShadingUniforms) -> ShadingEvaluator {
        ShadingEvaluator::new(self.config, uniforms)
    }

    /// Shade every fragment of `gbuffer`
    ///
    /// Output is row-major with row 0 at the bottom, like the G-buffer.
    /// Fragment coordinates are pixel centers.
    pub fn shade_gbuffer(&self, gbuffer: &GBuffer, uniforms: &ShadingUniforms) -> Vec<Vec3> {
        let width = gbuffer.width();
        let mut output = vec![Vec3::ZERO; width * gbuffer.height()];
        if output.is_empty() {
            return output;
        }

        let evaluator = self.evaluator(*uniforms);
        output
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, color) in row.iter_mut().enumerate() {
                    let frag_coord = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let sample = gbuffer.sample(x, y);
                    *color = evaluator.shade(self.grid, self.lights, frag_coord, &sample);
                }
            });
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shading::{AMBIENT_LIGHT, GBufferSample};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Counts WARN events seen by the subscriber
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn camera() -> Camera {
        Camera::new(45.0, 1.0, 0.1, 100.0)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ClusterConfig::new(0, 4, 4, 10, 10);
        assert_eq!(
            ClusteredRenderer::new(config).err(),
            Some(ConfigError::ZeroSlices { axis: 'x' })
        );
    }

    #[test]
    fn test_update_truncates_to_num_lights() {
        let config = ClusterConfig::new(4, 4, 4, 100, 3);
        let mut renderer = ClusteredRenderer::new(config).unwrap();
        let lights = vec![PointLight::new(Vec3::new(0.0, 0.0, -5.0), 1.0e6, Vec3::ONE); 5];

        let stats = renderer.update_clusters(&camera(), &Mat4::IDENTITY, &lights);
        assert_eq!(stats.lights, 3);
        assert_eq!(renderer.frame().lights().len(), 3);
        assert_eq!(renderer.frame().grid().count(0), 3);
        assert_eq!(renderer.last_stats(), &stats);
    }

    #[test]
    fn test_overflow_warns_every_frame() {
        let mut renderer = ClusteredRenderer::new(ClusterConfig::new(4, 4, 4, 1, 10)).unwrap();
        let overflow = [PointLight::new(Vec3::new(0.0, 0.0, -5.0), 1.0e6, Vec3::ONE); 2];
        let single = &overflow[..1];

        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        tracing::subscriber::with_default(subscriber, || {
            renderer.update_clusters(&camera(), &Mat4::IDENTITY, &overflow);
            renderer.update_clusters(&camera(), &Mat4::IDENTITY, &overflow);
            assert_eq!(warnings.load(Ordering::SeqCst), 2);

            let stats = renderer.update_clusters(&camera(), &Mat4::IDENTITY, single);
            assert_eq!(stats.dropped, 0);
            assert_eq!(warnings.load(Ordering::SeqCst), 2);

            renderer.update_clusters(&camera(), &Mat4::IDENTITY, &overflow);
            assert_eq!(warnings.load(Ordering::SeqCst), 3);
        });
    }

    #[test]
    fn test_modes_produce_identical_buffers() {
        let config = ClusterConfig::new(5, 3, 6, 4, 32);
        let lights: Vec<_> = (0..32)
            .map(|i| {
                let f = i as f32;
                PointLight::new(Vec3::new(0.05 * f - 0.8, 0.3 - 0.02 * f, -3.0 * f), 2.0, Vec3::ONE)
            })
            .collect();

        let mut sequential = ClusteredRenderer::new(config).unwrap();
        let mut parallel = ClusteredRenderer::new(config)
            .unwrap()
            .with_mode(AssignmentMode::Parallel);
        assert_eq!(parallel.mode(), AssignmentMode::Parallel);

        let a = sequential.update_clusters(&camera(), &Mat4::IDENTITY, &lights);
        let b = parallel.update_clusters(&camera(), &Mat4::IDENTITY, &lights);
        assert_eq!(a, b);
        assert_eq!(sequential.frame().grid().texels(), parallel.frame().grid().texels());
    }

    #[test]
    fn test_shade_gbuffer_dimensions_and_ambient() {
        let mut renderer = ClusteredRenderer::new(ClusterConfig::new(4, 4, 4, 10, 10)).unwrap();
        renderer.update_clusters(&camera(), &Mat4::IDENTITY, &[]);

        let mut gbuffer = GBuffer::new(3, 2);
        let albedo = Vec3::new(0.4, 0.8, 1.0);
        for y in 0..2 {
            for x in 0..3 {
                gbuffer.set(x, y, &GBufferSample::new(Vec3::new(0.0, 0.0, -2.0), albedo, Vec3::Z));
            }
        }
        let uniforms = ShadingUniforms::new(&camera(), Mat4::IDENTITY, 3, 2);
        let colors = renderer.frame().shade_gbuffer(&gbuffer, &uniforms);
        assert_eq!(colors.len(), 6);
        for color in colors {
            assert!((color - albedo * AMBIENT_LIGHT).length() < 1e-6);
        }
    }

    #[test]
    fn test_shade_empty_gbuffer() {
        let renderer = ClusteredRenderer::new(ClusterConfig::default()).unwrap();
        let uniforms = ShadingUniforms::new(&camera(), Mat4::IDENTITY, 0, 0);
        assert!(renderer.frame().shade_gbuffer(&GBuffer::new(0, 0), &uniforms).is_empty());
    }
}
