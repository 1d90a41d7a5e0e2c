//! Packed per-cluster light lists
//!
//! Each cluster owns one column of the cluster texture. Scalar 0 of the
//! column is the light count, scalars `1..=count` are the light ids in
//! insertion order. Values are stored as `f32` so the buffer can be
//! uploaded as an RGBA32F texture unchanged.

use cluster_common::{ClusterConfig, Texel, TextureLayout};

/// Fixed-resolution cluster grid and its packed buffer
#[derive(Debug, Clone)]
pub struct ClusterGrid {
    config: ClusterConfig,
    layout: TextureLayout,
    texels: Vec<Texel>,
}

impl ClusterGrid {
    /// Allocate the cluster buffer for `config`
    ///
    /// The config is expected to have passed [`ClusterConfig::validate`].
    pub fn new(config: &ClusterConfig) -> Self {
        let layout = config.cluster_layout();
        tracing::debug!(
            "Allocating cluster buffer: {} clusters x {} texel rows ({} bytes)",
            layout.width,
            layout.height,
            layout.texel_count() * std::mem::size_of::<Texel>()
        );
        Self {
            config: *config,
            layout,
            texels: vec![[0.0; 4]; layout.texel_count()],
        }
    }

    #[inline]
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    #[inline]
    pub fn layout(&self) -> TextureLayout {
        self.layout
    }

    #[inline]
    pub fn num_clusters(&self) -> usize {
        self.layout.width
    }

    /// Linear id of cluster (`x`, `y`, `z`)
    #[inline]
    pub fn cluster_id(&self, x: usize, y: usize, z: usize) -> usize {
        self.config.cluster_id(x, y, z)
    }

    /// Flat scalar offset of `element` in cluster `cluster_id`
    ///
    /// Element 0 is the count, element `k >= 1` the k-th stored light id.
    #[inline]
    pub fn address(&self, cluster_id: usize, element: usize) -> usize {
        self.layout.scalar_offset(cluster_id, element)
    }

    #[inline]
    fn scalars(&self) -> &[f32] {
        bytemuck::cast_slice(&self.texels)
    }

    #[inline]
    fn scalars_mut(&mut self) -> &mut [f32] {
        bytemuck::cast_slice_mut(&mut self.texels)
    }

    /// Set every cluster's count to zero
    ///
    /// Stored ids are left in place; they are unreachable once the count is 0.
    pub fn reset_counts(&mut self) {
        for cluster_id in 0..self.num_clusters() {
            let address = self.address(cluster_id, 0);
            self.scalars_mut()[address] = 0.0;
        }
    }

    /// Number of lights stored in `cluster_id`
    #[inline]
    pub fn count(&self, cluster_id: usize) -> usize {
        self.scalars()[self.address(cluster_id, 0)] as usize
    }

    /// Light id stored in `slot` (0-based) of `cluster_id`
    #[inline]
    pub fn light_id(&self, cluster_id: usize, slot: usize) -> u32 {
        self.scalars()[self.address(cluster_id, slot + 1)] as u32
    }

    /// Stored light ids of `cluster_id`, in insertion order
    pub fn light_ids(&self, cluster_id: usize) -> impl Iterator<Item = u32> + '_ {
        (0..self.count(cluster_id)).map(move |slot| self.light_id(cluster_id, slot))
    }

    /// Append `light_id` to the cluster's list
    ///
    /// Returns `false` without touching the buffer when the cluster already
    /// holds `max_lights_per_cluster` lights.
    pub fn try_push(&mut self, cluster_id: usize, light_id: u32) -> bool {
        let count = self.count(cluster_id);
        if count >= self.config.max_lights_per_cluster {
            return false;
        }
        let count_address = self.address(cluster_id, 0);
        let slot_address = self.address(cluster_id, count + 1);
        let scalars = self.scalars_mut();
        scalars[slot_address] = light_id as f32;
        scalars[count_address] = (count + 1) as f32;
        true
    }

    /// Packed texels, ready for upload
    #[inline]
    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }
}
