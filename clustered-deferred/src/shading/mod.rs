// ============================================================================
// Shading Module
// ============================================================================
//
// Deferred lighting of G-buffer fragments against the cluster buffer:
// - falloff: cubic distance attenuation
// - gbuffer: G-buffer targets and per-fragment samples
// - evaluator: cluster lookup and per-light Lambert + Blinn-Phong
// - tests: evaluator test suite

mod evaluator;
mod falloff;
mod gbuffer;


pub use evaluator::{AMBIENT_LIGHT, SPECULAR_EXPONENT, SPECULAR_SCALE, ShadingEvaluator};
pub use falloff::cubic_gaussian;
pub use gbuffer::{GBuffer, GBufferError, GBufferSample};
