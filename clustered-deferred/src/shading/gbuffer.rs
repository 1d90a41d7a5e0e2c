use cluster_common::{decode_octahedral_unorm, encode_octahedral_unorm};
use glam::{Vec2, Vec3, Vec4};
use thiserror::Error;

/// One fragment's G-buffer contents
///
/// # Layout
///
/// Two RGBA targets:
/// - target 0: `(position.xyz, encoded_normal.x)`
/// - target 1: `(albedo.rgb, encoded_normal.y)`
///
/// `position` is in world space; the normal is octahedral-encoded in [0, 1]².
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GBufferSample {
    pub position: Vec3,
    pub albedo: Vec3,
    pub encoded_normal: Vec2,
}

impl GBufferSample {
    /// Build a sample from an unencoded normal
    pub fn new(position: Vec3, albedo: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            albedo,
            encoded_normal: encode_octahedral_unorm(normal),
        }
    }

    #[inline]
    pub fn from_texels(gb0: Vec4, gb1: Vec4) -> Self {
        Self {
            position: gb0.truncate(),
            albedo: gb1.truncate(),
            encoded_normal: Vec2::new(gb0.w, gb1.w),
        }
    }

    #[inline]
    pub fn to_texels(&self) -> (Vec4, Vec4) {
        (
            self.position.extend(self.encoded_normal.x),
            self.albedo.extend(self.encoded_normal.y),
        )
    }

    /// Decoded unit normal
    #[inline]
    pub fn normal(&self) -> Vec3 {
        decode_octahedral_unorm(self.encoded_normal)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GBufferError {
    #[error("G-buffer target {target} has {actual} texels, expected {expected} ({width}x{height})")]
    TargetSize {
        target: usize,
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

/// Screen-sized pair of G-buffer targets
///
/// Rows are stored bottom-up: row 0 is the bottom of the screen, matching
/// the fragment-coordinate origin used for cluster lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct GBuffer {
    width: usize,
    height: usize,
    gb0: Vec<Vec4>,
    gb1: Vec<Vec4>,
}

impl GBuffer {
    /// Zero-filled targets
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            gb0: vec![Vec4::ZERO; width * height],
            gb1: vec![Vec4::ZERO; width * height],
        }
    }

    /// Wrap targets produced elsewhere
    pub fn from_targets(
        width: usize,
        height: usize,
        gb0: Vec<Vec4>,
        gb1: Vec<Vec4>,
    ) -> Result<Self, GBufferError> {
        let expected = width * height;
        for (target, len) in [(0, gb0.len()), (1, gb1.len())] {
            if len != expected {
                return Err(GBufferError::TargetSize {
                    target,
                    width,
                    height,
                    expected,
                    actual: len,
                });
            }
        }
        Ok(Self {
            width,
            height,
            gb0,
            gb1,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn set(&mut self, x: usize, y: usize, sample: &GBufferSample) {
        let index = self.index(x, y);
        let (gb0, gb1) = sample.to_texels();
        self.gb0[index] = gb0;
        self.gb1[index] = gb1;
    }

    #[inline]
    pub fn sample(&self, x: usize, y: usize) -> GBufferSample {
        let index = self.index(x, y);
        GBufferSample::from_texels(self.gb0[index], self.gb1[index])
    }

    pub fn targets(&self) -> (&[Vec4], &[Vec4]) {
        (&self.gb0, &self.gb1)
    }
}
