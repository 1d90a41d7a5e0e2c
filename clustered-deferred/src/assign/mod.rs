// ============================================================================
// Light Assignment Module
// ============================================================================
//
// Rebuilds the cluster grid from the frame's light list:
// - bounds: per-light frustum bounds (cluster index ranges)
// - stats: per-frame assignment counters
// - tests: assignment and bounds test suite
//
// Lights are inserted in index order. The parallel path builds per-Z-slab
// partial lists and merges them in slab order, so both paths produce
// identical cluster lists.

mod bounds;
mod stats;


pub use bounds::{FrustumBounds, compute_frustum_bounds};
pub use stats::AssignmentStats;

use cluster_common::ClusterConfig;
use glam::Mat4;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::grid::ClusterGrid;
use crate::light::PointLight;

/// How the assigner distributes work
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMode {
    /// One light at a time against the shared grid
    #[default]
    Sequential,
    /// Bounds and per-slab lists on the rayon pool, merged serially
    Parallel,
}

/// Assigns lights to clusters, reusing scratch storage across frames
#[derive(Debug, Default)]
pub struct LightAssigner {
    bounds: Vec<FrustumBounds>,
    overflowed: Vec<bool>,
}

impl LightAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild `grid` using the given mode
    pub fn assign_with_mode(
        &mut self,
        mode: AssignmentMode,
        grid: &mut ClusterGrid,
        lights: &[PointLight],
        view: &Mat4,
        camera: &Camera,
    ) -> AssignmentStats {
        match mode {
            AssignmentMode::Sequential => self.assign(grid, lights, view, camera),
            AssignmentMode::Parallel => self.assign_parallel(grid, lights, view, camera),
        }
    }

    /// Reset `grid` and insert every light into each cluster it overlaps
    ///
    /// A full cluster silently drops further lights; the first
    /// `max_lights_per_cluster` lights in index order are kept.
    pub fn assign(
        &mut self,
        grid: &mut ClusterGrid,
        lights: &[PointLight],
        view: &Mat4,
        camera: &Camera,
    ) -> AssignmentStats {
        let config = *grid.config();
        let mut stats = self.begin(grid, lights.len());

        for (light_id, light) in lights.iter().enumerate() {
            let bounds = compute_frustum_bounds(light, view, camera, &config);
            for (x, y, z) in bounds.cells() {
                let cluster_id = config.cluster_id(x, y, z);
                self.insert(grid, cluster_id, light_id as u32, &mut stats);
            }
        }

        self.finish(grid, stats)
    }

    /// Parallel equivalent of [`LightAssigner::assign`]
    pub fn assign_parallel(
        &mut self,
        grid: &mut ClusterGrid,
        lights: &[PointLight],
        view: &Mat4,
        camera: &Camera,
    ) -> AssignmentStats {
        let config = *grid.config();
        let mut stats = self.begin(grid, lights.len());

        lights
            .par_iter()
            .map(|light| compute_frustum_bounds(light, view, camera, &config))
            .collect_into_vec(&mut self.bounds);

        let bounds = &self.bounds;
        let slabs: Vec<Vec<Vec<u32>>> = (0..config.z_slices)
            .into_par_iter()
            .map(|z| slab_lists(bounds, &config, z))
            .collect();

        let slab_size = config.x_slices * config.y_slices;
        for (z, lists) in slabs.into_iter().enumerate() {
            for (local_id, light_ids) in lists.into_iter().enumerate() {
                let cluster_id = z * slab_size + local_id;
                for light_id in light_ids {
                    self.insert(grid, cluster_id, light_id, &mut stats);
                }
            }
        }

        self.finish(grid, stats)
    }

    fn begin(&mut self, grid: &mut ClusterGrid, lights: usize) -> AssignmentStats {
        grid.reset_counts();
        self.overflowed.clear();
        self.overflowed.resize(grid.num_clusters(), false);
        AssignmentStats {
            lights,
            total_clusters: grid.num_clusters(),
            ..Default::default()
        }
    }

    #[inline]
    fn insert(
        &mut self,
        grid: &mut ClusterGrid,
        cluster_id: usize,
        light_id: u32,
        stats: &mut AssignmentStats,
    ) {
        stats.overlaps += 1;
        if grid.try_push(cluster_id, light_id) {
            stats.stored += 1;
            return;
        }

        stats.dropped += 1;
        if !self.overflowed[cluster_id] {
            self.overflowed[cluster_id] = true;
            stats.overflow_clusters += 1;
        }
    }

    fn finish(&self, grid: &ClusterGrid, mut stats: AssignmentStats) -> AssignmentStats {
        for cluster_id in 0..grid.num_clusters() {
            let count = grid.count(cluster_id);
            if count > 0 {
                stats.active_clusters += 1;
            }
            stats.peak_count = stats.peak_count.max(count);
        }

        tracing::debug!(
            "Assigned {} lights to {}/{} clusters: {} stored, {} dropped, peak {}",
            stats.lights,
            stats.active_clusters,
            stats.total_clusters,
            stats.stored,
            stats.dropped,
            stats.peak_count
        );
        stats
    }
}

/// Light ids overlapping each cluster of Z slab `z`, in light order
///
/// Lists are not capped here; the cap applies when they are merged.
fn slab_lists(bounds: &[FrustumBounds], config: &ClusterConfig, z: usize) -> Vec<Vec<u32>> {
    let mut lists = vec![Vec::new(); config.x_slices * config.y_slices];
    for (light_id, light_bounds) in bounds.iter().enumerate() {
        if z < light_bounds.z_min || z > light_bounds.z_max {
            continue;
        }
        for y in light_bounds.y_min..=light_bounds.y_max {
            for x in light_bounds.x_min..=light_bounds.x_max {
                lists[x + y * config.x_slices].push(light_id as u32);
            }
        }
    }
    lists
}
