/// Cubic approximation of a gaussian over `h = 2 · distance / radius`
///
/// Reaches exactly zero at `h = 2` (the light radius) and stays zero beyond.
/// A NaN input (zero radius at zero distance) also yields zero.
#[inline]
pub fn cubic_gaussian(h: f32) -> f32 {
    if h < 1.0 {
        0.25 * (2.0 - h).powi(3) - (1.0 - h).powi(3)
    } else if h < 2.0 {
        0.25 * (2.0 - h).powi(3)
    } else {
        0.0
    }
}
