//! Shared types and utilities for clustered deferred shading
//!
//! This crate is the single encoding contract between the two halves of the
//! clustered lighting pipeline:
//! - light assignment (writes per-cluster light lists)
//! - deferred shading (reads them back per fragment)
//!
//! Both halves must address the packed buffers through the functions here.
//!
//! # Modules
//!
//! - [`config`] - Grid dimensions, per-cluster capacity and derived buffer layouts
//! - [`packing`] - Texel/channel codec, padding-guarded sampling, octahedral normals

pub mod config;
pub mod packing;

pub use config::{ClusterConfig, ConfigError, MAX_EXACT_SCALAR};

pub use packing::{
    CHANNELS_PER_TEXEL, ScalarAddress, Texel, TextureLayout, decode_octahedral_unorm,
    encode_octahedral_unorm, extract_scalar, texel_rows_for,
};
