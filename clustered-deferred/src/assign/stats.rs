/// Per-frame assignment counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssignmentStats {
    /// Lights processed this frame
    pub lights: usize,
    /// (cluster, light) pairs produced by the frustum bounds
    pub overlaps: usize,
    /// Pairs written into a cluster list
    pub stored: usize,
    /// Pairs dropped because the cluster was full
    pub dropped: usize,
    /// Clusters that dropped at least one light
    pub overflow_clusters: usize,
    /// Clusters holding at least one light
    pub active_clusters: usize,
    /// Largest count of any cluster
    pub peak_count: usize,
    /// Total clusters in the grid
    pub total_clusters: usize,
}

impl AssignmentStats {
    /// Mean light count over clusters that hold any lights
    pub fn average_per_active_cluster(&self) -> f32 {
        if self.active_clusters == 0 {
            0.0
        } else {
            self.stored as f32 / self.active_clusters as f32
        }
    }
}
