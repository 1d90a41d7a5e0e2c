//! Texel packing utilities
//!
//! Cluster light lists and light attributes are stored as flat arrays of
//! scalars inside 4-channel texel storage:
//! - scalar `i` of an element lives in texel row `i / 4`, channel `i % 4`
//! - elements are laid out along the texture width, one column each
//! - readers sample with a +1 guard on both axes so lookups never land on a texel edge
//!
//! Used by both the light assigner (writer) and the shading evaluator (reader).

use glam::{DVec2, Vec2, Vec3};

// ============================================================================
// Texel Layout
// ============================================================================

/// Scalars stored per texel (RGBA)
pub const CHANNELS_PER_TEXEL: usize = 4;

/// One RGBA32F texel
pub type Texel = [f32; CHANNELS_PER_TEXEL];

/// Number of texel rows needed to hold `scalars` values
#[inline]
pub const fn texel_rows_for(scalars: usize) -> usize {
    scalars.div_ceil(CHANNELS_PER_TEXEL)
}

/// Location of one logical scalar inside an element's texel column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScalarAddress {
    /// Texel row (`index / 4`)
    pub pixel: usize,
    /// Channel within the texel (`index % 4`)
    pub channel: usize,
}

impl ScalarAddress {
    /// Address of the `index`-th scalar of an element
    #[inline]
    pub const fn of(index: usize) -> Self {
        Self {
            pixel: index / CHANNELS_PER_TEXEL,
            channel: index % CHANNELS_PER_TEXEL,
        }
    }

    /// Inverse of [`ScalarAddress::of`]
    #[inline]
    pub const fn scalar_index(self) -> usize {
        self.pixel * CHANNELS_PER_TEXEL + self.channel
    }
}

/// Dimensions of a packed texel buffer
///
/// `width` is the number of elements (clusters or lights), `height` the
/// number of texel rows per element. Storage is row-major: all elements'
/// row 0 first, then row 1, and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureLayout {
    pub width: usize,
    pub height: usize,
}

impl TextureLayout {
    #[inline]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total texels backing this layout
    #[inline]
    pub const fn texel_count(&self) -> usize {
        self.width * self.height
    }

    /// Offset of texel (`column`, `row`) in the texel array
    #[inline]
    pub fn texel_offset(&self, column: usize, row: usize) -> usize {
        debug_assert!(column < self.width, "column {column} out of {}", self.width);
        debug_assert!(row < self.height, "row {row} out of {}", self.height);
        row * self.width + column
    }

    /// Offset of the `element`-th scalar of column `column` in the flat scalar array
    #[inline]
    pub fn scalar_offset(&self, column: usize, element: usize) -> usize {
        let address = ScalarAddress::of(element);
        self.texel_offset(column, address.pixel) * CHANNELS_PER_TEXEL + address.channel
    }

    /// Normalized sampling coordinates for texel (`column`, `row`)
    ///
    /// Both axes are divided by `size + 1` so the coordinate falls strictly
    /// inside the texel rather than on its boundary. The margin to the texel
    /// edge is `1 / (size + 1)`, so the math runs in `f64` to stay exact up
    /// to [`crate::MAX_EXACT_SCALAR`] columns.
    #[inline]
    pub fn sample_coords(&self, column: usize, row: usize) -> DVec2 {
        DVec2::new(
            (column + 1) as f64 / (self.width + 1) as f64,
            (row + 1) as f64 / (self.height + 1) as f64,
        )
    }

    /// Nearest-filtered texel for normalized coordinates (clamp-to-edge)
    #[inline]
    pub fn nearest_texel(&self, uv: DVec2) -> (usize, usize) {
        let x = (uv.x * self.width as f64).floor().max(0.0) as usize;
        let y = (uv.y * self.height as f64).floor().max(0.0) as usize;
        (
            x.min(self.width.saturating_sub(1)),
            y.min(self.height.saturating_sub(1)),
        )
    }
}

// ============================================================================
// Scalar Extraction
// ============================================================================

/// Read one scalar of an element through the padding-guarded sampling path
///
/// `element` selects the column, `component` the logical scalar within that
/// element's packed array. This is the read-side mirror of
/// [`TextureLayout::scalar_offset`].
#[inline]
pub fn extract_scalar(
    texels: &[Texel],
    layout: TextureLayout,
    element: usize,
    component: usize,
) -> f32 {
    debug_assert_eq!(texels.len(), layout.texel_count());
    let address = ScalarAddress::of(component);
    let uv = layout.sample_coords(element, address.pixel);
    let (x, y) = layout.nearest_texel(uv);
    texels[layout.texel_offset(x, y)][address.channel]
}

// ============================================================================
// Normal Packing
// ============================================================================

/// Encode a direction to octahedral coordinates in [0, 1]²
///
/// G-buffer producers store the result in the `.w` channels of the
/// position and albedo targets.
#[inline]
pub fn encode_octahedral_unorm(dir: Vec3) -> Vec2 {
    let dir = dir.normalize_or_zero();

    let l1_norm = dir.x.abs() + dir.y.abs() + dir.z.abs();
    if l1_norm == 0.0 {
        return Vec2::splat(0.5);
    }

    let mut u = dir.x / l1_norm;
    let mut v = dir.y / l1_norm;

    if dir.z < 0.0 {
        let u_abs = u.abs();
        let v_abs = v.abs();
        u = (1.0 - v_abs) * if u >= 0.0 { 1.0 } else { -1.0 };
        v = (1.0 - u_abs) * if v >= 0.0 { 1.0 } else { -1.0 };
    }

    Vec2::new(u, v) * 0.5 + Vec2::splat(0.5)
}

/// Decode octahedral coordinates in [0, 1]² back to a unit normal
///
/// Lower-hemisphere directions are folded back by `clamp(-z, 0, 1)` on each
/// of x and y before normalizing.
#[inline]
pub fn decode_octahedral_unorm(encoded: Vec2) -> Vec3 {
    let e = encoded * 2.0 - Vec2::ONE;
    let mut n = Vec3::new(e.x, e.y, 1.0 - e.x.abs() - e.y.abs());
    let t = (-n.z).clamp(0.0, 1.0);
    n.x += if n.x >= 0.0 { -t } else { t };
    n.y += if n.y >= 0.0 { -t } else { t };
    n.normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_address_roundtrip() {
        for i in 0..=100 {
            let address = ScalarAddress::of(i);
            assert_eq!(address.pixel, i / 4);
            assert_eq!(address.channel, i % 4);
            assert_eq!(address.scalar_index(), i);
        }
    }

    #[test]
    fn test_texel_rows() {
        assert_eq!(texel_rows_for(0), 0);
        assert_eq!(texel_rows_for(1), 1);
        assert_eq!(texel_rows_for(4), 1);
        assert_eq!(texel_rows_for(5), 2);
        assert_eq!(texel_rows_for(101), 26);
    }

    #[test]
    fn test_texel_offset_is_row_major() {
        let layout = TextureLayout::new(64, 26);
        assert_eq!(layout.texel_offset(0, 0), 0);
        assert_eq!(layout.texel_offset(63, 0), 63);
        assert_eq!(layout.texel_offset(0, 1), 64);
        assert_eq!(layout.texel_offset(5, 3), 3 * 64 + 5);
        assert_eq!(layout.texel_count(), 64 * 26);
    }

    #[test]
    fn test_scalar_offset() {
        let layout = TextureLayout::new(10, 3);
        // element 0 is channel 0 of row 0
        assert_eq!(layout.scalar_offset(2, 0), 2 * 4);
        // element 5 is channel 1 of row 1
        assert_eq!(layout.scalar_offset(2, 5), (10 + 2) * 4 + 1);
    }

    /// Guarded sampling must land on exactly the texel the writer addressed
    #[test]
    fn test_guarded_sampling_hits_written_texel() {
        for (width, height) in [(1, 1), (1, 2), (64, 26), (3375, 26), (100, 2), (7, 25)] {
            let layout = TextureLayout::new(width, height);
            for column in 0..width {
                for row in 0..height {
                    let uv = layout.sample_coords(column, row);
                    assert!(uv.x > 0.0 && uv.x < 1.0);
                    assert!(uv.y > 0.0 && uv.y < 1.0);
                    assert_eq!(
                        layout.nearest_texel(uv),
                        (column, row),
                        "layout {width}x{height}"
                    );
                }
            }
        }
    }

    /// Widths up to the validated limit still resolve to the addressed column
    #[test]
    fn test_guarded_sampling_at_max_width() {
        const EDGE: usize = 50_000;
        for width in [12_000_000, crate::MAX_EXACT_SCALAR - 1, crate::MAX_EXACT_SCALAR] {
            let layout = TextureLayout::new(width, 26);
            let columns = (0..EDGE)
                .chain((EDGE..width - EDGE).step_by(997))
                .chain(width - EDGE..width);
            for column in columns {
                for row in [0, 25] {
                    let uv = layout.sample_coords(column, row);
                    assert_eq!(
                        layout.nearest_texel(uv),
                        (column, row),
                        "layout {width}x26"
                    );
                }
            }
        }
    }

    #[test]
    fn test_nearest_texel_clamps_to_edge() {
        let layout = TextureLayout::new(4, 2);
        assert_eq!(layout.nearest_texel(DVec2::new(-0.5, -1.0)), (0, 0));
        assert_eq!(layout.nearest_texel(DVec2::new(1.0, 1.0)), (3, 1));
        assert_eq!(layout.nearest_texel(DVec2::new(7.0, 2.5)), (3, 1));
    }

    #[test]
    fn test_extract_scalar_matches_scalar_offset() {
        let layout = TextureLayout::new(5, 3);
        let mut texels = vec![[0.0f32; 4]; layout.texel_count()];
        let scalars: &mut [f32] = bytemuck::cast_slice_mut(&mut texels);
        for column in 0..5 {
            for element in 0..12 {
                scalars[layout.scalar_offset(column, element)] = (column * 100 + element) as f32;
            }
        }
        for column in 0..5 {
            for element in 0..12 {
                let value = extract_scalar(&texels, layout, column, element);
                assert_eq!(value, (column * 100 + element) as f32);
            }
        }
    }

    #[test]
    fn test_decode_center_is_up() {
        let n = decode_octahedral_unorm(Vec2::splat(0.5));
        assert!((n - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_decode_is_unit_length() {
        for i in 0..=10 {
            for j in 0..=10 {
                let n = decode_octahedral_unorm(Vec2::new(i as f32 / 10.0, j as f32 / 10.0));
                assert!((n.length() - 1.0).abs() < 1e-5, "{:?}", n);
            }
        }
    }

    #[test]
    fn test_octahedral_cardinals() {
        let tests = [
            Vec3::X,
            Vec3::NEG_X,
            Vec3::Y,
            Vec3::NEG_Y,
            Vec3::Z,
            Vec3::NEG_Z,
        ];

        for dir in tests {
            let encoded = encode_octahedral_unorm(dir);
            assert!((0.0..=1.0).contains(&encoded.x), "u out of range for {:?}", dir);
            assert!((0.0..=1.0).contains(&encoded.y), "v out of range for {:?}", dir);
            let decoded = decode_octahedral_unorm(encoded);
            assert!((decoded - dir).length() < 1e-5, "{:?} -> {:?}", dir, decoded);
        }
    }

    #[test]
    fn test_octahedral_both_hemispheres() {
        let dirs = [
            Vec3::new(0.3, 0.4, 0.866),
            Vec3::new(-0.5, 0.2, -0.7),
            Vec3::new(0.577, -0.577, -0.577),
            Vec3::new(-0.1, -0.9, 0.2),
        ];
        for dir in dirs {
            let dir = dir.normalize();
            let decoded = decode_octahedral_unorm(encode_octahedral_unorm(dir));
            assert!((decoded - dir).length() < 1e-4, "{:?} -> {:?}", dir, decoded);
        }
    }

    #[test]
    fn test_octahedral_zero_vector() {
        assert_eq!(encode_octahedral_unorm(Vec3::ZERO), Vec2::splat(0.5));
    }
}
