//! Assign command - run light assignment over several frames and report stats

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use clustered_deferred::{AssignmentMode, AssignmentStats, ClusteredRenderer};

use crate::scene::Scene;
use crate::settings::CliConfig;

/// Arguments for the assign command
#[derive(Args)]
pub struct AssignArgs {
    /// Path to cluster.toml (defaults are used when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of lights to spawn (overrides [scene] lights)
    #[arg(short, long)]
    pub lights: Option<usize>,

    /// Scene RNG seed (overrides [scene] seed)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Frames to simulate
    #[arg(short, long, default_value_t = 1)]
    pub frames: usize,

    /// Use parallel assignment regardless of [scene] mode
    #[arg(long)]
    pub parallel: bool,
}

/// Load the config and apply command-line overrides shared by assign and render
pub fn resolve_config(
    path: Option<&Path>,
    lights: Option<usize>,
    seed: Option<u64>,
    parallel: bool,
) -> Result<CliConfig> {
    let mut config = CliConfig::load_or_default(path)?;
    if let Some(lights) = lights {
        config.scene.lights = Some(lights);
    }
    if let Some(seed) = seed {
        config.scene.seed = seed;
    }
    if parallel {
        config.scene.mode = AssignmentMode::Parallel;
    }

    let count = config.light_count();
    if count > config.cluster.num_lights {
        tracing::info!(
            "Raising num_lights from {} to {} to fit the scene",
            config.cluster.num_lights,
            count
        );
        config.cluster.num_lights = count;
        config.cluster.validate()?;
    }
    Ok(config)
}

/// Run the frames and return each frame's stats
pub fn run(config: &CliConfig, frames: usize) -> Result<Vec<AssignmentStats>> {
    let mut renderer = ClusteredRenderer::new(config.cluster)?.with_mode(config.scene.mode);
    let mut scene = Scene::generate(&config.scene, config.light_count());
    let camera = config.camera.lens;
    let view = config.camera.view();

    let mut history = Vec::with_capacity(frames);
    for frame in 0..frames {
        let stats = renderer.update_clusters(&camera, &view, scene.lights());
        tracing::debug!("Frame {}: {:?}", frame, stats);
        history.push(stats);
        scene.step();
    }
    Ok(history)
}

pub fn execute(args: AssignArgs) -> Result<()> {
    let config = resolve_config(args.config.as_deref(), args.lights, args.seed, args.parallel)?;
    let cluster = &config.cluster;

    println!(
        "Assigning {} lights to {}x{}x{} clusters ({:?}, cap {})",
        config.light_count(),
        cluster.x_slices,
        cluster.y_slices,
        cluster.z_slices,
        config.scene.mode,
        cluster.max_lights_per_cluster
    );

    let history = run(&config, args.frames)?;
    for (frame, stats) in history.iter().enumerate() {
        println!(
            "  frame {:>4}: {:>5}/{} active, {:>7} stored, {:>6} dropped, peak {:>4}, avg {:.2}",
            frame,
            stats.active_clusters,
            stats.total_clusters,
            stats.stored,
            stats.dropped,
            stats.peak_count,
            stats.average_per_active_cluster()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> CliConfig {
        CliConfig::parse(
            r#"
[cluster]
x_slices = 4
y_slices = 4
z_slices = 8
max_lights_per_cluster = 16
num_lights = 40
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cluster.toml");
        std::fs::write(&path, small_config().to_toml().unwrap()).unwrap();

        let config = resolve_config(Some(path.as_path()), Some(64), Some(9), true).unwrap();
        assert_eq!(config.light_count(), 64);
        assert_eq!(config.cluster.num_lights, 64);
        assert_eq!(config.scene.seed, 9);
        assert_eq!(config.scene.mode, AssignmentMode::Parallel);
    }

    #[test]
    fn test_run_reports_every_frame() {
        let history = run(&small_config(), 3).unwrap();
        assert_eq!(history.len(), 3);
        for stats in &history {
            assert_eq!(stats.lights, 40);
            assert_eq!(stats.total_clusters, 128);
            assert_eq!(stats.stored + stats.dropped, stats.overlaps);
            assert!(stats.peak_count <= 16);
        }
    }

    #[test]
    fn test_parallel_run_matches_sequential() {
        let sequential = small_config();
        let mut parallel = small_config();
        parallel.scene.mode = AssignmentMode::Parallel;
        assert_eq!(run(&sequential, 4).unwrap(), run(&parallel, 4).unwrap());
    }
}
