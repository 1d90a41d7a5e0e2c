//! Clustered deferred shading core
//!
//! Splits the view frustum into an `x × y × z` grid of clusters, assigns each
//! point light to every cluster its bounding sphere overlaps, and shades
//! G-buffer fragments using only the lights stored in their cluster.
//!
//! A frame runs in two phases with a hard barrier between them:
//!
//! 1. [`ClusteredRenderer::update_clusters`] resets and rebuilds the packed
//!    cluster buffer and the light-attribute buffer (needs `&mut`).
//! 2. [`ClusteredRenderer::frame`] hands out a read-only [`ClusterFrame`]
//!    that shading borrows; no assignment can run while it is alive.
//!
//! # Modules
//!
//! - [`grid`] - Packed per-cluster light lists
//! - [`light`] - Point lights and the light-attribute buffer
//! - [`camera`] - Camera parameters, frustum extent, shading uniforms
//! - [`assign`] - Frustum bounds and light-to-cluster assignment
//! - [`shading`] - Falloff, G-buffer decoding and per-fragment lighting
//! - [`renderer`] - Per-frame driver tying the phases together

pub mod assign;
pub mod camera;
pub mod grid;
pub mod light;
pub mod renderer;
pub mod shading;

pub use cluster_common::{ClusterConfig, ConfigError};

pub use assign::{
    AssignmentMode, AssignmentStats, FrustumBounds, LightAssigner, compute_frustum_bounds,
};
pub use camera::{Camera, ShadingUniforms};
pub use grid::ClusterGrid;
pub use light::{LightBuffer, PointLight};
pub use renderer::{ClusterFrame, ClusteredRenderer};
pub use shading::{GBuffer, GBufferError, GBufferSample, ShadingEvaluator, cubic_gaussian};
