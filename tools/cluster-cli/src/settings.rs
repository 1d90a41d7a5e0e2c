//! cluster.toml parsing
//!
//! ```toml
//! [cluster]
//! x_slices = 15
//! y_slices = 15
//! z_slices = 15
//! max_lights_per_cluster = 100
//! num_lights = 100
//!
//! [camera]
//! fov_degrees = 75.0
//! aspect = 1.7777778
//! near = 0.1
//! far = 1000.0
//! eye = [-10.0, 8.0, 0.0]
//! target = [0.0, 2.0, 0.0]
//!
//! [scene]
//! seed = 0
//! light_radius = 5.0
//! light_min = [-14.0, 0.0, -6.0]
//! light_max = [14.0, 20.0, 6.0]
//! light_dt = -0.03
//! mode = "sequential"
//! ```

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

use clustered_deferred::{AssignmentMode, Camera, ClusterConfig};

/// Default file name for `init` and `--config`
pub const DEFAULT_CONFIG_FILE: &str = "cluster.toml";

/// Complete CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub scene: SceneSettings,
}

/// Camera lens plus a look-at placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    #[serde(flatten)]
    pub lens: Camera,
    #[serde(default = "default_eye")]
    pub eye: [f32; 3],
    #[serde(default = "default_target")]
    pub target: [f32; 3],
}

fn default_eye() -> [f32; 3] {
    [-10.0, 8.0, 0.0]
}
fn default_target() -> [f32; 3] {
    [0.0, 2.0, 0.0]
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            lens: Camera::default(),
            eye: default_eye(),
            target: default_target(),
        }
    }
}

impl CameraSettings {
    /// World → view transform
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(Vec3::from(self.eye), Vec3::from(self.target), Vec3::Y)
    }
}

/// Synthetic scene parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSettings {
    /// RNG seed for light placement and color
    #[serde(default)]
    pub seed: u64,
    /// Lights to spawn; defaults to `cluster.num_lights`
    #[serde(default)]
    pub lights: Option<usize>,
    #[serde(default = "default_light_radius")]
    pub light_radius: f32,
    #[serde(default = "default_light_min")]
    pub light_min: [f32; 3],
    #[serde(default = "default_light_max")]
    pub light_max: [f32; 3],
    /// Per-frame Y movement; lights wrap between `light_min.y` and `light_max.y`
    #[serde(default = "default_light_dt")]
    pub light_dt: f32,
    #[serde(default)]
    pub mode: AssignmentMode,
}

fn default_light_radius() -> f32 {
    5.0
}
fn default_light_min() -> [f32; 3] {
    [-14.0, 0.0, -6.0]
}
fn default_light_max() -> [f32; 3] {
    [14.0, 20.0, 6.0]
}
fn default_light_dt() -> f32 {
    -0.03
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            lights: None,
            light_radius: default_light_radius(),
            light_min: default_light_min(),
            light_max: default_light_max(),
            light_dt: default_light_dt(),
            mode: AssignmentMode::default(),
        }
    }
}

impl CliConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Load `path` if given, otherwise fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("No config given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse cluster config")?;
        config.cluster.validate()?;
        if config.camera.lens.near >= config.camera.lens.far {
            anyhow::bail!(
                "camera near ({}) must be less than far ({})",
                config.camera.lens.near,
                config.camera.lens.far
            );
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize cluster config")
    }

    /// Number of lights the scene spawns
    pub fn light_count(&self) -> usize {
        self.scene.lights.unwrap_or(self.cluster.num_lights)
    }
}
