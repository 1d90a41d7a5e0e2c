//! Parallel assignment must reproduce the sequential cluster lists exactly.

use clustered_deferred::{
    AssignmentMode, Camera, ClusterConfig, ClusterGrid, ClusteredRenderer, LightAssigner,
    PointLight,
};
use glam::{Mat4, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

fn scene(seed: u64, count: usize) -> Vec<PointLight> {
    let mut rng = Pcg32::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            PointLight::new(
                Vec3::new(
                    rng.random_range(-14.0..14.0),
                    rng.random_range(0.0..20.0),
                    rng.random_range(-6.0..6.0),
                ),
                rng.random_range(1.0..8.0),
                Vec3::new(rng.random(), rng.random(), rng.random()),
            )
        })
        .collect()
}

fn assert_same_lists(config: &ClusterConfig, a: &ClusterGrid, b: &ClusterGrid) {
    for cluster_id in 0..config.num_clusters() {
        assert_eq!(
            a.light_ids(cluster_id).collect::<Vec<_>>(),
            b.light_ids(cluster_id).collect::<Vec<_>>(),
            "cluster {cluster_id}"
        );
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let camera = Camera::new(75.0, 16.0 / 9.0, 0.1, 60.0);
    let view = Mat4::look_at_rh(Vec3::new(-10.0, 8.0, 0.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y);

    for (seed, config) in [
        (1, ClusterConfig::new(15, 15, 15, 100, 500)),
        (2, ClusterConfig::new(8, 4, 16, 5, 500)),
        (3, ClusterConfig::new(1, 1, 1, 3, 500)),
    ] {
        let lights = scene(seed, 500);
        let mut sequential = ClusterGrid::new(&config);
        let mut parallel = ClusterGrid::new(&config);

        let mut assigner = LightAssigner::new();
        let a = assigner.assign(&mut sequential, &lights, &view, &camera);
        let b = assigner.assign_parallel(&mut parallel, &lights, &view, &camera);

        assert_eq!(a, b, "seed {seed}");
        assert_same_lists(&config, &sequential, &parallel);
    }
}

#[test]
fn test_parallel_renderer_across_frames() {
    let config = ClusterConfig::new(10, 10, 10, 12, 200);
    let camera = Camera::default();
    let mut sequential = ClusteredRenderer::new(config).unwrap();
    let mut parallel = ClusteredRenderer::new(config)
        .unwrap()
        .with_mode(AssignmentMode::Parallel);

    let mut lights = scene(9, 200);
    for frame in 0..5 {
        let eye = Vec3::new(-10.0 + frame as f32, 8.0, 0.0);
        let view = Mat4::look_at_rh(eye, Vec3::new(0.0, 2.0, 0.0), Vec3::Y);

        let a = sequential.update_clusters(&camera, &view, &lights);
        let b = parallel.update_clusters(&camera, &view, &lights);
        assert_eq!(a, b, "frame {frame}");
        assert_same_lists(&config, sequential.frame().grid(), parallel.frame().grid());

        // Shrink the scene so stale entries from earlier frames would show up
        lights.truncate(lights.len() - 30);
    }
}
