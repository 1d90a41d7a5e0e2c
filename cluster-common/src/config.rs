//! Cluster grid configuration
//!
//! Fixed at initialization and shared, unchanged, by the assignment and
//! shading stages. Every derived buffer dimension is computed here so the
//! writer and reader cannot disagree about the layout.

use serde::{Deserialize, Serialize};

use crate::packing::{TextureLayout, texel_rows_for};

/// Largest integer every `f32` channel can represent exactly (2^24)
pub const MAX_EXACT_SCALAR: usize = 1 << 24;

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A slice count was zero
    #[error("{axis} slice count must be at least 1")]
    ZeroSlices { axis: char },

    /// Cluster capacity was zero
    #[error("max_lights_per_cluster must be at least 1")]
    ZeroCapacity,

    /// A stored count or index would not survive the f32 round trip
    #[error("{field} = {value} exceeds the exactly representable limit 2^24")]
    NotRepresentable { field: &'static str, value: usize },

    /// TOML parsing failed
    #[error("failed to parse cluster config: {0}")]
    Parse(String),
}

/// Cluster grid configuration.
///
/// The recognized options are exactly the grid dimensions, the per-cluster
/// light capacity and the number of scene lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Slices along screen X (default: 15)
    #[serde(default = "default_slices")]
    pub x_slices: usize,
    /// Slices along screen Y (default: 15)
    #[serde(default = "default_slices")]
    pub y_slices: usize,
    /// Slices along view depth (default: 15)
    #[serde(default = "default_slices")]
    pub z_slices: usize,
    /// Capacity of each cluster's light list (default: 100)
    #[serde(default = "default_max_lights_per_cluster")]
    pub max_lights_per_cluster: usize,
    /// Upper bound on scene lights; also the shading loop's safety cap (default: 100)
    #[serde(default = "default_num_lights")]
    pub num_lights: usize,
}

fn default_slices() -> usize {
    15
}
fn default_max_lights_per_cluster() -> usize {
    100
}
fn default_num_lights() -> usize {
    100
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            x_slices: default_slices(),
            y_slices: default_slices(),
            z_slices: default_slices(),
            max_lights_per_cluster: default_max_lights_per_cluster(),
            num_lights: default_num_lights(),
        }
    }
}

impl ClusterConfig {
    pub const fn new(
        x_slices: usize,
        y_slices: usize,
        z_slices: usize,
        max_lights_per_cluster: usize,
        num_lights: usize,
    ) -> Self {
        Self {
            x_slices,
            y_slices,
            z_slices,
            max_lights_per_cluster,
            num_lights,
        }
    }

    /// Parse a config from TOML and validate it
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration can be packed without loss
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - any slice count is zero
    /// - the per-cluster capacity is zero
    /// - cluster ids, light ids or counts exceed [`MAX_EXACT_SCALAR`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, slices) in [('x', self.x_slices), ('y', self.y_slices), ('z', self.z_slices)] {
            if slices == 0 {
                return Err(ConfigError::ZeroSlices { axis });
            }
        }
        if self.max_lights_per_cluster == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let clusters = self
            .x_slices
            .checked_mul(self.y_slices)
            .and_then(|xy| xy.checked_mul(self.z_slices))
            .unwrap_or(usize::MAX);
        let checks = [
            ("num_clusters", clusters),
            ("max_lights_per_cluster", self.max_lights_per_cluster),
            ("num_lights", self.num_lights),
        ];
        for (field, value) in checks {
            if value > MAX_EXACT_SCALAR {
                return Err(ConfigError::NotRepresentable { field, value });
            }
        }
        Ok(())
    }

    /// Total clusters in the grid
    #[inline]
    pub const fn num_clusters(&self) -> usize {
        self.x_slices * self.y_slices * self.z_slices
    }

    /// Scalars stored per cluster (count + light ids)
    #[inline]
    pub const fn scalars_per_cluster(&self) -> usize {
        self.max_lights_per_cluster + 1
    }

    /// Texel rows per cluster
    #[inline]
    pub const fn cluster_texel_rows(&self) -> usize {
        texel_rows_for(self.scalars_per_cluster())
    }

    /// Layout of the cluster buffer: one column per cluster
    #[inline]
    pub const fn cluster_layout(&self) -> TextureLayout {
        TextureLayout::new(self.num_clusters(), self.cluster_texel_rows())
    }

    /// Linear cluster id of grid cell (`x`, `y`, `z`)
    #[inline]
    pub const fn cluster_id(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.x_slices + z * self.x_slices * self.y_slices
    }
}
