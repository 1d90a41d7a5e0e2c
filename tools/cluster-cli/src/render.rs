//! Render command - shade a synthetic floor G-buffer and save it as PNG

use anyhow::{Context, Result};
use clap::Args;
use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};
use std::path::PathBuf;

use clustered_deferred::{Camera, ClusteredRenderer, GBuffer, GBufferSample, ShadingUniforms};

use crate::assign::resolve_config;
use crate::scene::Scene;
use crate::settings::{CameraSettings, CliConfig};

/// Arguments for the render command
#[derive(Args)]
pub struct RenderArgs {
    /// Path to cluster.toml (defaults are used when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 360)]
    pub height: u32,

    /// Output PNG path
    #[arg(short, long, default_value = "render.png")]
    pub output: PathBuf,

    /// Scene RNG seed (overrides [scene] seed)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Frames to advance the scene before rendering
    #[arg(short, long, default_value_t = 0)]
    pub frames: usize,

    /// Use parallel assignment regardless of [scene] mode
    #[arg(long)]
    pub parallel: bool,
}

const FLOOR_LIGHT: Vec3 = Vec3::splat(0.8);
const FLOOR_DARK: Vec3 = Vec3::splat(0.45);

/// Floor plane `y = 0` seen through every pixel
///
/// Returns the G-buffer and a per-pixel hit mask; rows are bottom-up.
pub fn floor_gbuffer(
    camera: &Camera,
    placement: &CameraSettings,
    width: usize,
    height: usize,
) -> (GBuffer, Vec<bool>) {
    let mut gbuffer = GBuffer::new(width, height);
    let mut hits = vec![false; width * height];
    let inverse_view = placement.view().inverse();
    let eye = Vec3::from(placement.eye);

    for y in 0..height {
        for x in 0..width {
            let ndc = Vec2::new(
                (x as f32 + 0.5) / width as f32 * 2.0 - 1.0,
                (y as f32 + 0.5) / height as f32 * 2.0 - 1.0,
            );
            let direction = inverse_view.transform_vector3(camera.view_ray(ndc));
            if direction.y >= 0.0 {
                continue;
            }
            let t = -eye.y / direction.y;
            if t <= 0.0 || t > camera.far {
                continue;
            }

            let position = eye + direction * t;
            let checker = (position.x.floor() + position.z.floor()).rem_euclid(2.0) == 0.0;
            let albedo = if checker { FLOOR_LIGHT } else { FLOOR_DARK };
            gbuffer.set(x, y, &GBufferSample::new(position, albedo, Vec3::Y));
            hits[y * width + x] = true;
        }
    }
    (gbuffer, hits)
}

/// Assign, shade and convert to an image (top row first)
pub fn render(config: &CliConfig, width: u32, height: u32, frames: usize) -> Result<RgbImage> {
    let mut camera = config.camera.lens;
    camera.aspect = width as f32 / height.max(1) as f32;
    let view = config.camera.view();

    let mut renderer = ClusteredRenderer::new(config.cluster)?.with_mode(config.scene.mode);
    let mut scene = Scene::generate(&config.scene, config.light_count());
    for _ in 0..frames {
        scene.step();
    }
    let stats = renderer.update_clusters(&camera, &view, scene.lights());
    tracing::info!(
        "Assigned {} lights: {} active clusters, {} dropped",
        stats.lights,
        stats.active_clusters,
        stats.dropped
    );

    let (gbuffer, hits) = floor_gbuffer(&camera, &config.camera, width as usize, height as usize);
    let uniforms = ShadingUniforms::new(&camera, view, width, height);
    let colors = renderer.frame().shade_gbuffer(&gbuffer, &uniforms);

    let image = RgbImage::from_fn(width, height, |x, y| {
        let index = (height - 1 - y) as usize * width as usize + x as usize;
        if !hits[index] {
            return Rgb([0, 0, 0]);
        }
        let color = colors[index].clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
        Rgb([color.x.round() as u8, color.y.round() as u8, color.z.round() as u8])
    });
    Ok(image)
}

pub fn execute(args: RenderArgs) -> Result<()> {
    if args.width == 0 || args.height == 0 {
        anyhow::bail!("Image size must be non-zero ({}x{})", args.width, args.height);
    }
    let config = resolve_config(args.config.as_deref(), None, args.seed, args.parallel)?;

    println!(
        "Rendering {}x{} with {} lights...",
        args.width,
        args.height,
        config.light_count()
    );
    let image = render(&config, args.width, args.height, args.frames)?;
    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Saved {}", args.output.display());
    Ok(())
}
